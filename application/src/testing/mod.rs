//! Test doubles substitutable anywhere a [`ToolTransport`](crate::ports::tool_transport::ToolTransport)
//! is expected.

pub mod call_tracking;

pub use call_tracking::{CallTrackingTransport, NO_MOCK_CONFIGURED, TrackedCall};
