//! Implements the receiver side of the Galileo E6-B High Accuracy Service (HAS),
//! including page reassembly, Reed-Solomon erasure decoding, and parsing of the Message
//! Type 1 mask/orbit/clock/bias correction payload.

pub mod assembler;
pub mod bits;
pub mod coding;
pub mod consts;
pub mod error;
pub mod message;
pub mod page;
pub mod receiver;
