//! RPC transport for the tag stream bridge.
//!
//! Exposes the bridge's six routes to an external controller as
//! newline-delimited JSON over TCP. The transport owns framing and the
//! error envelope; route semantics live in `tagstream-service`.
//!
//! # Components
//!
//! - **RpcServer**: accept loop with a connection limit
//! - **protocol**: request/reply envelopes and line dispatch

pub mod protocol;
mod server;

pub use protocol::{Outcome, RpcReply, RpcRequest, respond};
pub use server::{MAX_LINE_LENGTH, Result, RpcServer, RpcServerConfig, RpcServerError};
