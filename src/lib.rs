//! # Take-Bot
//!
//! Posts short, news-driven "takes" about fantasy football players to the
//! managers who roster them.
//!
//! ## Usage
//!
//! ```bash
//! take-bot [--config take-bot.toml] [--dry-run] [-v...]
//! ```
//!
//! ## Modules
//!
//! - `claude` - Text-generation backend (Anthropic Messages API) and prompts
//! - `config` - TOML + environment configuration
//! - `error` - Crate-wide error type
//! - `forum` - Discussion-forum client (Reddit) for the shared context
//! - `league` - Fantasy league client (ESPN) for rosters
//! - `notify` - Slack Block Kit rendering and webhook delivery
//! - `pipeline` - Roster/context loading, fan-out, take generation, aggregation, publishing
pub mod claude;
pub mod config;
pub mod error;
pub mod forum;
pub mod league;
pub mod notify;
pub mod pipeline;

pub use error::{Error, Result};
