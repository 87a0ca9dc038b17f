//! Task Graph Workflow Engine Library
//!
//! This module exports the core components for embedding and testing.

pub mod api;
pub mod cli;
pub mod complexity;
pub mod config;
pub mod error;
pub mod format;
pub mod graph;
pub mod status;
pub mod store;
pub mod types;
