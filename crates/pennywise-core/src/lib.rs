//! Pennywise Core Library
//!
//! Shared functionality for the Pennywise personal finance forecaster:
//! - Monthly aggregation and next-month / six-month projections
//! - Pluggable transaction stores (SQLite, in-memory demo)
//! - CSV import for transactions and accounts
//! - Keyword categorization
//! - Pluggable AI text backends (OpenAI-compatible, mock)
//! - Prompt building and reply parsing for recommendations and tips
//! - Layered configuration (defaults, TOML file, environment)

pub mod ai;
pub mod categorize;
pub mod config;
pub mod dates;
pub mod error;
pub mod forecast;
pub mod import;
pub mod insights;
pub mod models;
pub mod store;

/// Test utilities including mock chat completions server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIClient, GenerationRequest, MockBackend, OpenAICompatibleBackend, PromptKind, TextGenerator,
};
pub use config::{AiBackendKind, Config, StoreBackend};
pub use error::{Error, Result};
pub use forecast::{
    calculate_monthly_data, generate_next_month_prediction, generate_six_month_prediction,
    MonthBucket, MonthKey, MonthlyData, NextMonthPrediction, Predictions, SixMonthPrediction,
    Trend, TrendPolicy, Trends,
};
pub use insights::{InsightService, Recommendation, Tip};
pub use models::{Account, NewAccount, NewTransaction, Transaction, DEFAULT_USER_ID};
pub use store::{ImportSummary, MemoryStore, SqliteStore, StoreClient, TransactionStore};
