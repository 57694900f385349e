//! Prediction and recommendation command implementations

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pennywise_core::{
    config::ForecastConfig, Error, InsightService, MemoryStore, Predictions, TextGenerator,
    TransactionStore,
};
use serde::Serialize;
use tracing::warn;

use super::import::import_transactions_file;
use super::truncate;

/// Options for `pennywise predict`
pub struct PredictOptions<'a> {
    pub file: Option<&'a Path>,
    pub json: bool,
    pub outlook: bool,
}

/// Predictions plus the optional written outlook
#[derive(Debug, Serialize)]
pub struct PredictionReport {
    pub predictions: Predictions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlook: Option<String>,
}

/// Compute predictions for a user, asking for an outlook if requested
///
/// A missing AI backend only drops the outlook.
pub async fn prediction_report(
    store: &dyn TransactionStore,
    ai: Option<&dyn TextGenerator>,
    forecast: &ForecastConfig,
    user_id: &str,
    today: NaiveDate,
    with_outlook: bool,
) -> Result<PredictionReport> {
    let service = InsightService::new(store, ai, forecast);
    let predictions = service.predictions(user_id, today)?;

    let outlook = if with_outlook {
        match service.prediction_outlook(user_id, today).await {
            Ok(text) => Some(text),
            Err(Error::AiNotConfigured) => {
                warn!("AI backend not configured, skipping outlook");
                None
            }
            Err(e) => return Err(e).context("Failed to generate outlook"),
        }
    } else {
        None
    };

    Ok(PredictionReport {
        predictions,
        outlook,
    })
}

/// Predictions over a CSV file instead of the stored history
///
/// The lookback window ends at the newest row in the file.
pub async fn file_prediction_report(
    file: &Path,
    ai: Option<&dyn TextGenerator>,
    forecast: &ForecastConfig,
    user_id: &str,
    today: NaiveDate,
    with_outlook: bool,
) -> Result<PredictionReport> {
    let scratch = MemoryStore::new();
    import_transactions_file(&scratch, user_id, file)?;

    let end = scratch
        .list_transactions(user_id, None, None)?
        .first()
        .map(|tx| tx.date)
        .unwrap_or(today);

    prediction_report(&scratch, ai, forecast, user_id, end, with_outlook).await
}

pub async fn cmd_predict(
    store: &dyn TransactionStore,
    ai: Option<&dyn TextGenerator>,
    forecast: &ForecastConfig,
    user_id: &str,
    today: NaiveDate,
    options: &PredictOptions<'_>,
) -> Result<()> {
    let report = match options.file {
        Some(file) => {
            file_prediction_report(file, ai, forecast, user_id, today, options.outlook).await?
        }
        None => prediction_report(store, ai, forecast, user_id, today, options.outlook).await?,
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &PredictionReport) {
    let next = &report.predictions.next_month;
    let six = &report.predictions.six_months;

    println!();
    println!("🔮 Next Month");
    println!("   ─────────────────────────────");
    println!("   Income:   ${:>8}", next.income);
    println!("   Expenses: ${:>8}", next.expenses);
    println!("   Savings:  ${:>8}", next.savings);
    println!();
    println!("   Expected spending by category:");
    for (category, amount) in &next.breakdown {
        println!("     {:<16} ${:>8}", category, amount);
    }

    println!();
    println!("📈 Next Six Months");
    println!("   ─────────────────────────────");
    println!("   Avg monthly income:   ${:>8}", six.average_monthly_income);
    println!("   Avg monthly expenses: ${:>8}", six.average_monthly_expenses);
    println!("   Total savings:        ${:>8}", six.total_savings);
    println!(
        "   Trends: income {}, expenses {}, savings {}",
        six.trends.income, six.trends.expenses, six.trends.savings
    );

    if let Some(outlook) = &report.outlook {
        println!();
        println!("🤖 Outlook");
        println!("   {}", outlook.trim().replace('\n', "\n   "));
    }

    if next.savings < 0 {
        println!();
        println!("⚠️  Expenses are on track to exceed income next month.");
    }
}

pub async fn cmd_recommend(
    store: &dyn TransactionStore,
    ai: Option<&dyn TextGenerator>,
    forecast: &ForecastConfig,
    user_id: &str,
    today: NaiveDate,
    tips: bool,
) -> Result<()> {
    if ai.is_none() {
        println!("💡 No AI backend configured.");
        println!("   Set OPENAI_COMPATIBLE_HOST (or AI_BACKEND=mock) to enable recommendations.");
        return Ok(());
    }

    let service = InsightService::new(store, ai, forecast);

    println!();
    if tips {
        let tips = service
            .savings_tips(user_id, today)
            .await
            .context("Failed to generate savings tips")?;

        println!("💰 Savings Tips");
        println!("   ─────────────────────────────");
        for tip in &tips {
            println!("   • {}", tip.title);
            if !tip.description.is_empty() {
                println!("     {}", truncate(&tip.description, 100));
            }
        }
    } else {
        let recommendations = service
            .recommendations(user_id, today)
            .await
            .context("Failed to generate recommendations")?;

        println!("🧭 Recommendations");
        println!("   ─────────────────────────────");
        for rec in &recommendations {
            if rec.potential_savings > 0 {
                println!(
                    "   • {} [{}] (save ~${}/mo)",
                    rec.title, rec.category, rec.potential_savings
                );
            } else {
                println!("   • {} [{}]", rec.title, rec.category);
            }
            if !rec.description.is_empty() {
                println!("     {}", truncate(&rec.description, 100));
            }
        }
    }

    Ok(())
}
