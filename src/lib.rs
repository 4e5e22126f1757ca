//! urlsub - rule-based URL rewriting with regex patterns and templates.
//!
//! This library provides the core functionality for urlsub, including:
//! - Rule file parsing into an ordered, immutable rule set
//! - First-match-wins rule matching with capture groups
//! - Template substitution into a capacity-bounded output
//! - Load, unload and atomic reload of the live rule set
//! - Settings file parsing and discovery
//!
//! # Example
//!
//! ```no_run
//! use urlsub_cli::engine::RewriteEngine;
//! use urlsub_cli::rules::{PatternFlags, Rewrite};
//!
//! let engine = RewriteEngine::new("/etc/urlsub/rules", PatternFlags::default());
//! engine.load().unwrap();
//!
//! match engine.rewrite("http://ads.example.com/track?id=9", 2048) {
//!     Ok(Rewrite::Rewritten(url)) => println!("rewritten to {url}"),
//!     Ok(Rewrite::Unchanged) => println!("no rule matched"),
//!     Err(e) => eprintln!("rewrite failed: {e}"),
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod rules;

pub use engine::{LoadStatus, RewriteEngine};
pub use error::{ConfigError, Result, SubstitutionError};
