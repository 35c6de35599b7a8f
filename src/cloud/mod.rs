//! Tapo cloud API client.
//!
//! Provides:
//! - Request signing (sorted, percent-encoded, base64'd, HMAC-SHA256)
//! - Account login yielding a bearer token
//! - Device listing for the logged-in account
//!
//! ## Design Decisions
//! - Signing is a set of pure functions in [`signer`] so the byte-level
//!   transformation can be pinned down by fixed vectors.
//! - The client is blocking: one round trip per call, no retries.
//! - Failures are returned as [`CloudError`] and also logged via `tracing`;
//!   callers decide how loud to be.

pub mod client;
pub mod error;
pub mod signer;
pub mod types;

pub use client::{CloudClient, Session, DEVICE_LIST_PATH, LOGIN_PATH};
pub use error::{CloudError, Result};
pub use types::{ApiResponse, Device, DeviceStatus};
