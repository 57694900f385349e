//! CSV import command implementations

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use pennywise_core::{
    import::{parse_accounts_csv, parse_transactions_csv},
    ImportSummary, TransactionStore,
};
use tracing::info;

fn open_csv(file: &Path) -> Result<File> {
    File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))
}

/// Insert every row of a transactions CSV, skipping rows already imported
pub fn import_transactions_file(
    store: &dyn TransactionStore,
    user_id: &str,
    file: &Path,
) -> Result<ImportSummary> {
    let transactions = parse_transactions_csv(open_csv(file)?, user_id)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let summary = store
        .import_transactions(user_id, &transactions)
        .context("Failed to store imported transactions")?;

    info!(
        user_id,
        imported = summary.imported,
        skipped = summary.skipped,
        "Imported transactions"
    );
    Ok(summary)
}

pub fn cmd_import(store: &dyn TransactionStore, user_id: &str, file: &Path) -> Result<()> {
    println!("📥 Importing transactions from {}...", file.display());

    let summary = import_transactions_file(store, user_id, file)?;

    println!("✅ Import complete!");
    println!("   Imported: {}", summary.imported);
    println!("   Skipped (duplicates): {}", summary.skipped);

    if summary.imported > 0 {
        println!();
        println!("   Run 'pennywise predict' to see where your money is heading.");
    }

    Ok(())
}

pub fn cmd_import_accounts(store: &dyn TransactionStore, user_id: &str, file: &Path) -> Result<()> {
    println!("📥 Importing accounts from {}...", file.display());

    let accounts = parse_accounts_csv(open_csv(file)?)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    for account in &accounts {
        store.upsert_account(user_id, account)?;
        println!("   {} ({})", account.name, account.account_type);
    }

    println!("✅ Imported {} accounts", accounts.len());
    Ok(())
}
