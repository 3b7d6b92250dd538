//! Offline tool transports.

mod scripted;

pub use scripted::{FixtureError, ScriptedTransport, ToolFixture};
