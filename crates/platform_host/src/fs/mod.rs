//! Sandboxed filesystem domain: virtual paths, entry models, errors, and the store service.

pub mod error;
pub mod path;
pub mod sandbox;
pub mod service;
pub mod types;
