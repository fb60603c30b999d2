// src/config/mod.rs

//! Configuration loading and validation for watchdeploy.
//!
//! Responsibilities:
//! - Define the setting records (`model.rs`).
//! - Layer CLI/env, the optional TOML file and defaults (`loader.rs`).
//! - Validate invariants such as `max_attempts >= 1` (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, merge};
pub use model::{Config, FileConfig, RawConfig};
pub use validate::validate_raw_config;
