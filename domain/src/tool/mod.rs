//! Tool invocation module
//!
//! Types that cross the boundary to the remote tool-calling transport:
//!
//! - [`ToolCall`]: a tool name plus a snapshot of its arguments
//! - [`TransportError`]: why a call failed, classified by [`TransportErrorKind`]
//!
//! The transport port itself lives in the application layer
//! (`ToolTransport`); adapters live in infrastructure.

pub mod entities;
pub mod value_objects;

pub use entities::ToolCall;
pub use value_objects::{TransportError, TransportErrorKind};
