//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider behind a provider abstraction
//! - The search state reducer and the controller that drives it
//! - Shared domain models and the user-facing error taxonomy
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod notify;
pub mod provider;
pub mod state;

pub use config::Config;
pub use controller::{SearchOutcome, WeatherSearchController};
pub use error::SearchError;
pub use model::WeatherSnapshot;
pub use notify::NotificationSurface;
pub use provider::{WeatherProvider, provider_from_config};
pub use state::{SearchState, reduce};
