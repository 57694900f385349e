//! Template command implementation

use anyhow::Result;
use pennywise_core::import::{accounts_template, transactions_template};

use crate::cli::TemplateKind;

pub fn template_text(kind: TemplateKind) -> Result<String> {
    let text = match kind {
        TemplateKind::Transactions => transactions_template()?,
        TemplateKind::Accounts => accounts_template()?,
    };
    Ok(text)
}

/// Print a sample CSV to stdout so it can be redirected to a file
pub fn cmd_template(kind: TemplateKind) -> Result<()> {
    print!("{}", template_text(kind)?);
    Ok(())
}
