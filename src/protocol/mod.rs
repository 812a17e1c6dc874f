//! Wire protocol for the agent app-server
//!
//! The agent process speaks a line-delimited JSON-RPC-shaped protocol over its
//! standard streams: one JSON object per line, no length framing. This module
//! provides the codec, the typed message classification, and the pending
//! request correlator.

pub mod codec;
pub mod correlator;
pub mod messages;

pub use codec::{ApprovalDecision, decode, encode_decision, encode_request};
pub use correlator::RequestCorrelator;
pub use messages::{AgentNotification, IncomingMessage, ThreadItem, ThreadRecord};
