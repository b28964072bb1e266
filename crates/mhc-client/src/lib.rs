#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// The generic client is used through DefaultCompanionClient and the
// CompanionApiPort trait; its backend bound stays crate-private.
#![allow(private_bounds)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod port;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::{CompanionClient, DefaultCompanionClient};

// Configuration
pub use config::{CompanionClientConfig, DEFAULT_TIMEOUT};

// Errors
pub use error::ClientError;
