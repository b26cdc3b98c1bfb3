//! HTTP adapter for the Staffroom client.
//!
//! One thin layer over `reqwest`: it resolves endpoint paths against the
//! configured base URL, carries the session cookie jar, and maps transport
//! and status failures onto [`staffroom_core::ApiError`]. It holds no cache
//! and no retry logic; everything above it works with plain
//! [`staffroom_core::RequestSpec`] values.

pub mod client;

pub use client::HttpClient;
