//! Connector domain module
//!
//! A connector is an external integration exposing zero or more remote
//! tools. This module answers two questions about a connector:
//!
//! - **Which tools does it expose?** [`resolve_tools`] applies a strict
//!   precedence chain (declared → metadata → synthesized) over a
//!   [`ConnectorEntry`].
//! - **What is a tool's canonical name?** [`normalize_tool_name`] maps
//!   drifting upstream names onto stable dotted identifiers and attaches the
//!   tool's tags and scopes.
//!
//! Both are pure functions; no I/O happens here.

pub mod entities;
pub mod normalizer;
pub mod resolver;

pub use entities::{ConnectorEntry, RemoteTool};
pub use normalizer::{NormalizedToolName, ToolNameTable, normalize_tool_name};
pub use resolver::{ResolvedTools, ToolSource, resolve_tools, resolve_tools_with_source};
