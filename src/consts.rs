/// Octets in one HAS page payload.
pub const PAGE_OCTETS: usize = 53;
/// Bits in one HAS page payload.
pub const PAGE_BITS: usize = PAGE_OCTETS * 8;
/// Symbols in a full Reed-Solomon encoded block, one per page.
pub const BLOCK_SYMBOLS: usize = 255;
/// Information symbols at the head of each encoded block.
pub const INFO_SYMBOLS: usize = 32;
/// Parity symbols in each encoded block, which bounds the number of erasures.
pub const PARITY_SYMBOLS: usize = BLOCK_SYMBOLS - INFO_SYMBOLS;
/// Number of message IDs cycled through by the broadcast.
pub const NUM_MESSAGE_IDS: usize = 32;
/// Number of mask IDs addressable by the MT1 header.
pub const NUM_MASK_IDS: usize = 32;
/// Bits in the fixed MT1 message header.
pub const MT1_HEADER_BITS: usize = 32;
/// Maximum valid time-of-hour in seconds.
pub const MAX_TOH: u16 = 3600;
/// Maximum number of GNSS systems referenced by one mask.
pub const MAX_SYSTEMS: usize = 16;
/// Bits in a per-system satellite mask, MSB = PRN 1.
pub const SATELLITE_MASK_BITS: usize = 40;
/// Bits in a per-system signal mask, MSB = slot 0.
pub const SIGNAL_MASK_BITS: usize = 16;
/// GNSS ID assigned to GPS in HAS masks.
pub const GNSS_GPS: u8 = 0;
/// GNSS ID assigned to Galileo in HAS masks.
pub const GNSS_GALILEO: u8 = 2;

/// Correction validity intervals in seconds, indexed by the 4-bit validity interval
/// index. Index 15 is reserved.
pub const VALIDITY_INTERVALS: [u16; 15] = [
    5, 10, 15, 20, 30, 60, 90, 120, 180, 240, 300, 600, 900, 1800, 3600,
];
