//! Core domain logic for the wallet connection client.
//!
//! This crate provides:
//! - Connection and transfer-form state types (`types` module)
//! - The static network table (`networks` module)
//! - Minor/major unit conversion (`units` module)
//! - Transaction fee arithmetic (`fee` module)
//! - Address and amount validation (`validate` module)
//!
//! With the `config` feature enabled:
//! - Configuration file loading (`config` module)

pub mod fee;
pub mod networks;
pub mod types;
pub mod units;
pub mod validate;

#[cfg(feature = "config")]
pub mod config;

pub use fee::*;
pub use networks::*;
pub use types::*;
pub use units::*;
pub use validate::*;

pub use alloy_primitives::U256;

#[cfg(feature = "config")]
pub use config::{AppConfig, ConfigError, ThemeConfig, load_config, load_config_from};
