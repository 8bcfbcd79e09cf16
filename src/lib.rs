//! AI Tag Settings Library
//!
//! Resolves per-tag tagging behavior by layering a global baseline with
//! overrides from a user-edited `tag_settings.csv`. This module exports the
//! core components for the CLI, for embedding, and for testing.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod settings;
pub mod tags;
