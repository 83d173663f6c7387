//! # Agent Usage
//!
//! A pull-based usage-accounting engine for agent session logs.
//!
//! ## Overview
//!
//! Every call re-scans `<agents-root>/<agent>/sessions/*.jsonl` from scratch
//! and derives:
//! - Per-model token, cost and call totals over a 5-hour and a 7-day window
//! - The 20 most recent calls and the 5-hour window reset countdown
//! - A burn rate (tokens and cost per minute) over the last 30 minutes
//! - Records that look like upstream rate limiting
//! - Trailing `totalTokens` sums with a provider/model breakdown
//!
//! Nothing is persisted between calls. Malformed lines and unreadable files
//! are skipped; only an unreadable agents root (or cancellation) fails a scan.

/// Leading-run burn rate estimation
pub mod burn;

/// Command-line argument parsing and configuration
pub mod cli;

/// Engine tunables and layout constants
pub mod config;

/// Scan deadline and cancellation
pub mod control;

/// Session log discovery under the agents root
pub mod discovery;

/// JSON report envelopes
pub mod display;

/// Scan error taxonomy
pub mod error;

/// Data models for log lines, records and reports
pub mod models;

/// Provider/model key normalization
pub mod normalize;

/// Line-by-line JSONL decoding
pub mod parser;

/// Rate-limit heuristics
pub mod ratelimit;

/// Trailing token totals
pub mod tokens;

/// Scan drivers
pub mod usage;

/// Utility functions for paths, formatting, and time
pub mod utils;

/// Active/historical window aggregation
pub mod window;
