//! Transaction and account command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pennywise_core::{
    dates::{lookback_start, parse_transaction_date},
    import::{calculate_total_balance, manual_transaction},
    TransactionStore,
};

use super::{format_amount, truncate};

/// Add a transaction typed on the command line
///
/// Returns the new transaction id, or None if the same transaction was
/// already recorded.
pub fn add_transaction(
    store: &dyn TransactionStore,
    user_id: &str,
    description: &str,
    amount: f64,
    date: Option<&str>,
    category: Option<&str>,
    today: NaiveDate,
) -> Result<Option<String>> {
    let description = description.trim();
    if description.is_empty() {
        anyhow::bail!("Description must not be empty");
    }
    if !amount.is_finite() {
        anyhow::bail!("Invalid amount: {}", amount);
    }

    let date = match date {
        Some(d) => parse_transaction_date(d).with_context(|| format!("Invalid date: {}", d))?,
        None => today,
    };

    let tx = manual_transaction(user_id, date, description, amount, category, None);
    Ok(store.insert_transaction(user_id, &tx)?)
}

pub fn cmd_add(
    store: &dyn TransactionStore,
    user_id: &str,
    description: &str,
    amount: f64,
    date: Option<&str>,
    category: Option<&str>,
    today: NaiveDate,
) -> Result<()> {
    match add_transaction(store, user_id, description, amount, date, category, today)? {
        Some(id) => {
            println!("✅ Added transaction {}", id);
            println!("   {} │ {}", format_amount(amount), truncate(description, 40));
        }
        None => {
            println!("ℹ️  That transaction is already recorded, nothing added.");
        }
    }
    Ok(())
}

pub fn cmd_transactions_list(
    store: &dyn TransactionStore,
    user_id: &str,
    days: u32,
    today: NaiveDate,
) -> Result<()> {
    let transactions =
        store.list_transactions(user_id, Some(lookback_start(today, days)), Some(today))?;

    if transactions.is_empty() {
        println!("No transactions in the last {} days. Import some with:", days);
        println!("  pennywise import --file transactions.csv");
        return Ok(());
    }

    println!();
    println!("📝 Transactions (last {} days)", days);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        println!(
            "   {} │ {:>10} │ {:<18} │ {}",
            tx.date,
            format_amount(tx.amount),
            truncate(tx.primary_category(), 18),
            truncate(&tx.name, 40)
        );
    }

    Ok(())
}

pub fn cmd_accounts(store: &dyn TransactionStore, user_id: &str) -> Result<()> {
    let accounts = store.list_accounts(user_id)?;

    if accounts.is_empty() {
        println!("No accounts yet. Import some with:");
        println!("  pennywise import --accounts --file accounts.csv");
        return Ok(());
    }

    println!();
    println!("🏦 Accounts");
    println!("   ─────────────────────────────────────────────");

    for account in &accounts {
        let kind = account.subtype.as_deref().unwrap_or(&account.account_type);
        println!(
            "   {:<24} │ {:<12} │ {:>12}",
            truncate(&account.name, 24),
            kind,
            format!("${:.2}", account.balances.current)
        );
    }

    println!("   ─────────────────────────────────────────────");
    println!("   Total balance: ${:.2}", calculate_total_balance(&accounts));

    Ok(())
}
