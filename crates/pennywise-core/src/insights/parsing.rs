//! Turn free-text model replies into structured tips and recommendations

use regex::Regex;
use serde::Serialize;

use crate::error::Result;

/// Card colours, assigned in order and cycled
pub const TIP_COLORS: [&str; 4] = ["yellow", "purple", "green", "blue"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tip {
    pub id: String,
    pub title: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub color: String,
    pub potential_savings: u32,
    pub category: String,
}

/// Split a reply into blank-line separated blocks
///
/// The first line of a block is the title, with any `N. ` numbering removed.
/// Remaining lines are joined with spaces into the description. Ids are
/// `{id_prefix}-1`, `{id_prefix}-2`, and so on.
pub fn parse_tips(text: &str, id_prefix: &str) -> Result<Vec<Tip>> {
    let numbering = Regex::new(r"^\d+\.\s*")?;

    let tips = text
        .split("\n\n")
        .map(|block| block.trim_matches(|c| c == '\n' || c == '\r'))
        .filter(|block| !block.trim().is_empty())
        .enumerate()
        .map(|(index, block)| {
            let mut lines = block.lines();
            let first = lines.next().unwrap_or_default();
            let title = numbering.replace(first, "").trim().to_string();
            let description = lines.collect::<Vec<_>>().join(" ").trim().to_string();

            Tip {
                id: format!("{}-{}", id_prefix, index + 1),
                title,
                description,
                color: TIP_COLORS[index % TIP_COLORS.len()].to_string(),
            }
        })
        .collect();

    Ok(tips)
}

/// Bucket a recommendation by the first matching keyword group
pub fn recommendation_category(title: &str, description: &str) -> &'static str {
    let text = format!("{} {}", title, description).to_lowercase();

    if text.contains("subscription") || text.contains("service") {
        "subscriptions"
    } else if text.contains("grocery") || text.contains("food") || text.contains("restaurant") {
        "food"
    } else if text.contains("emergency fund") || text.contains("saving") {
        "savings"
    } else if text.contains("bill") || text.contains("utility") {
        "bills"
    } else {
        "general"
    }
}

/// Estimated monthly savings for a recommendation, in whole currency units
///
/// Fixed midpoints per kind of advice: subscriptions 25, food 80, saving
/// advice 0 since it moves money rather than freeing it, anything else 45.
pub fn estimate_potential_savings(description: &str) -> u32 {
    let text = description.to_lowercase();

    if text.contains("subscription") {
        25
    } else if text.contains("grocery") || text.contains("food") {
        80
    } else if text.contains("emergency fund") || text.contains("saving") {
        0
    } else {
        45
    }
}

/// Parse a recommendations reply and attach category and savings estimates
pub fn parse_recommendations(text: &str) -> Result<Vec<Recommendation>> {
    Ok(parse_tips(text, "rec")?
        .into_iter()
        .map(|tip| Recommendation {
            potential_savings: estimate_potential_savings(&tip.description),
            category: recommendation_category(&tip.title, &tip.description).to_string(),
            id: tip.id,
            title: tip.title,
            description: tip.description,
            color: tip.color,
        })
        .collect())
}
