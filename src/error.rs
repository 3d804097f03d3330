//! Standard errors that may occur when receiving HAS messages.

/// HAS runtime errors.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HasError {
    /// More erasure positions than parity symbols, so a Reed-Solomon decode wasn't
    /// attempted.
    TooManyErasures,
    /// Too many errors were detected when attempting a Reed-Solomon decode.
    RsUnrecoverable,
    /// A bit field read past the end of the message payload.
    InsufficientBits,
    /// A mask section declared no systems or selected no satellites.
    EmptyMask,
    /// The message omitted its mask and no mask is cached for its mask ID.
    MissingMask,
    /// The header time-of-hour exceeds one hour.
    TohOutOfRange,
    /// A correction section referenced a GNSS this receiver doesn't know.
    UnknownGnssId,
    /// A clock subset section declared no systems.
    EmptySubset,
}

/// Standard result using `HasError`.
pub type Result<T> = std::result::Result<T, HasError>;
