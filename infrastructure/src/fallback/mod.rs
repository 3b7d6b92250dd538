//! Local fallback stores.

mod json_store;

pub use json_store::{FallbackDocument, JsonFallbackStore};
