//! # Livecast Testkit
//!
//! Testing utilities for Livecast.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known issuance inputs with the exact token they must produce
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A deterministic service and ready-made session descriptors
//!
//! ## Golden Vectors
//!
//! ```rust
//! use livecast_testkit::vectors::{all_vectors, token_from_vector};
//!
//! for vector in all_vectors() {
//!     let token = token_from_vector(&vector).unwrap();
//!     assert_eq!(token.as_str(), vector.expected_token);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use livecast_testkit::generators::{issue_from_params, IssueParams};
//!
//! proptest! {
//!     #[test]
//!     fn issuance_is_deterministic(params: IssueParams) {
//!         let a = issue_from_params(&params).unwrap();
//!         let b = issue_from_params(&params).unwrap();
//!         prop_assert_eq!(a.as_str(), b.as_str());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use livecast_testkit::fixtures::{descriptor, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let session = fixture.livecast.start(descriptor("u1", "ch1")).unwrap();
//! assert!(session.is_live());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{descriptor, multi_broadcaster_descriptors, TestFixture};
pub use generators::{issue_from_params, IssueParams};
pub use vectors::{all_vectors, token_from_vector, verify_all_vectors, GoldenVector};
