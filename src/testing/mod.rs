//! Testing utilities for the bridge
//!
//! - [`fixtures`] - Pre-built identities, settings and wired services
//! - [`mock`] - Collaborator doubles with call counters and injectable delays
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kakao_bridge::testing::{fixtures::TestFixtures, mock::MockIdentityFetcher};
//! use std::sync::Arc;
//!
//! let fetcher = Arc::new(MockIdentityFetcher::succeeding(TestFixtures::identity("42")));
//! assert_eq!(fetcher.calls(), 0);
//! ```

pub mod fixtures;
pub mod mock;

pub use fixtures::TestFixtures;
pub use mock::{MockIdentityFetcher, MockSigningAuthority, MockTokenExchanger};

/// Common test constants
pub mod constants {
    /// Default provider name
    pub const TEST_PROVIDER: &str = "kakao";

    /// Default test email address
    pub const TEST_EMAIL: &str = "test@example.com";

    /// Default test nickname
    pub const TEST_DISPLAY_NAME: &str = "Test User";

    /// Default registered application credentials
    pub const TEST_CLIENT_ID: &str = "test-rest-api-key";
    pub const TEST_CLIENT_SECRET: &str = "test-client-secret";

    /// Redirect URI used by exchange tests
    pub const TEST_REDIRECT_URI: &str = "http://localhost:3000/auth/kakao/callback";
}
