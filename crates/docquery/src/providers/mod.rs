//! Transport abstractions for the document backend
//!
//! The workflow talks to the backend only through [`DocumentBackend`], so the
//! HTTP client can be swapped for an in-process double in tests.

pub mod backend;
pub mod http;

pub use backend::DocumentBackend;
pub use http::HttpBackend;
