//! Predictions and AI-backed financial insights
//!
//! - `prompts` - system/user prompt pairs for each feature
//! - `parsing` - tips and recommendations from free-text replies
//! - `service` - `InsightService`, which loads transactions from a store and
//!   runs the projection engine or a text backend over them
//!
//! ## Usage
//!
//! ```rust,ignore
//! let service = InsightService::new(&store, ai.as_ref().map(|c| c as _), &config.forecast);
//! let predictions = service.predictions("local-dev", today)?;
//! let tips = service.savings_tips("local-dev", today).await?;
//! ```

pub mod parsing;
pub mod prompts;
pub mod service;

pub use parsing::{parse_recommendations, parse_tips, Recommendation, Tip};
pub use prompts::TransactionSummary;
pub use service::{timeframe_days, InsightService};
