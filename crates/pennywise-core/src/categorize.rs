//! Keyword categorization for descriptions without a category

/// Ordered rules; the first rule with a matching keyword wins
const RULES: &[(&[&str], &[&str])] = &[
    (&["grocery", "food", "restaurant"], &["Food & Dining"]),
    (&["gas", "uber", "lyft"], &["Transportation"]),
    (
        &["netflix", "spotify", "subscription"],
        &["Entertainment", "Subscriptions"],
    ),
    (&["salary", "deposit", "payroll"], &["Income"]),
    (&["rent", "mortgage", "housing"], &["Housing"]),
];

const UNCATEGORIZED: &str = "Uncategorized";

/// Category labels for a free-text description
///
/// Matching is a case-insensitive substring test.
pub fn categorize_description(description: &str) -> Vec<String> {
    let lower = description.to_lowercase();

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, labels)| labels.iter().map(|l| l.to_string()).collect())
        .unwrap_or_else(|| vec![UNCATEGORIZED.to_string()])
}
