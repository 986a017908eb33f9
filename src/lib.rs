//! Jobdesk - job status workflow, table views and bulk operations over a local job ledger
//!
//! This library provides the core functionality for Jobdesk, including:
//! - Database operations and migrations
//! - Data models for jobs, statuses, users and payment channels
//! - Repository layer and the `JobBackend` service boundary
//! - Status graph resolution and gated status changes
//! - List view state, shareable query strings and bulk selection
//! - A query cache kept consistent across mutations
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use jobdesk::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod backend;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod models;
pub mod repo;
pub mod utils;
pub mod view;
pub mod workflow;
