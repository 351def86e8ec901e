//! Fetch, decode and cache per-user project graphs from a remote JSON API.
//!
//! The crate is organised leaves first:
//!
//! - [`client`]: request building and async execution against the remote API.
//! - [`decode`]: pure transforms from `serde_json::Value` trees to [`models`].
//! - [`fetcher`]: the single-flight coordinator and per-key result cache.
//! - [`writer`]: create requests whose echoed bodies are decoded into entities.

pub mod client;
pub mod decode;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod writer;

pub use error::{DecodeError, Error, Result};
