//! Encoding and decoding of the Reed-Solomon outer code that protects HAS messages.

pub mod bmcf;
pub mod galois;
pub mod reed_solomon;
