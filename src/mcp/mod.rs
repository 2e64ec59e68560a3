//! Tool server
//!
//! Serves the `search` tool over stdin/stdout using newline-delimited
//! JSON-RPC 2.0 messages in the Model Context Protocol shape.

mod protocol;
mod server;
pub mod tool;

pub use protocol::*;
pub use server::ToolServer;
