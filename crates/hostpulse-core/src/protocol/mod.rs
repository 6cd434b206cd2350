//! Protocol module containing the JSON wire codec for telemetry frames.

pub mod codec;

pub use codec::{decode_frame, encode_frame, ProtocolError};
