//! Model Context Protocol surface
//!
//! - **protocol**: JSON-RPC 2.0 message types and error codes
//! - **tools**: tool schemas and argument validation
//! - **server**: method dispatch
//! - **transport**: stdio and HTTP

pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use server::McpServer;
pub use transport::{Transport, serve_http, serve_stdio};
