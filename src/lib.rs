#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the bridge application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod bridge;
pub mod claims;
pub mod handlers;
pub mod minting;
pub mod models;
pub mod oauth;
pub mod settings;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use bridge::{BridgeFailure, BridgeService, OutcomeCode};
pub use handlers::configure_services;
pub use minting::{CredentialMinter, ServiceAccountSigner, SigningAuthority};
pub use settings::BridgeSettings;
pub use utils::throttle::{throttle_requests, RequestThrottle};
