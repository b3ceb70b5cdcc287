//! Outbound half of a websocket endpoint.
//!
//! [`WsSender`] turns text, binary, ping, pong and close messages into RFC 6455 frames and
//! writes them, in call order, to any [`futures::io::AsyncWrite`] transport. Messages may be
//! fragmented across several sends and compressed with permessage-deflate (RFC 7692).

pub mod deflate;
pub mod frame;
pub mod connection;

pub use connection::*;
