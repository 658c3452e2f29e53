//! # ardoq-client
//!
//! [`Transport`](ardoq_core::Transport) implementations.
//!
//! - [`HttpTransport`]: the REST API over blocking `ureq`
//! - [`MemoryTransport`]: an in-process remote that records every call

pub mod http;
pub mod memory;

pub use http::HttpTransport;
pub use memory::{Call, MemoryTransport};
