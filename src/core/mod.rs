//! Core modules: ledger, model seam, workflows, and terminal output.

pub mod config;
pub mod entry;
pub mod error;
pub mod llm;
pub mod store;
pub mod tui;
pub mod workflow;
