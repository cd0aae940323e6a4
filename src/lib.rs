#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod display;
pub mod error;
pub mod page;
pub mod socket;
pub mod telemetry;
pub mod toast;
pub mod types;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

pub type Result<T> = std::result::Result<T, error::Error>;
