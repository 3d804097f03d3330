//! HAS page descriptor, the unit of input delivered by the E6-B telemetry decoder.

use bitvec::prelude::*;

use crate::consts::{PAGE_BITS, PAGE_OCTETS};

/// One 424-bit encoded page of a HAS message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct HasPage {
    /// HAS status broadcast alongside the page: 0 = test, 1 = operational, 2 and 3 are
    /// reserved/unusable.
    pub status: u8,
    /// HAS message type carried by the page.
    pub message_type: u8,
    /// Which in-flight message the page belongs to.
    pub message_id: u8,
    /// Announced number of pages in the message.
    pub message_size: u8,
    /// Position of the page within the encoded block, 1 to 255. 0 is reserved.
    pub message_page_id: u8,
    /// Page payload, one Reed-Solomon symbol per octet.
    pub payload: [u8; PAGE_OCTETS],
}

impl HasPage {
    /// Repack a payload delivered at the telemetry boundary as a string of '0'/'1'
    /// characters into octets. Return `None` unless the string is exactly 424 binary
    /// digits.
    pub fn payload_from_bits(bits: &str) -> Option<[u8; PAGE_OCTETS]> {
        if bits.len() != PAGE_BITS {
            return None;
        }

        let mut payload = [0; PAGE_OCTETS];
        let view = payload.view_bits_mut::<Msb0>();

        for (i, ch) in bits.chars().enumerate() {
            match ch {
                '0' => {}
                '1' => view.set(i, true),
                _ => return None,
            }
        }

        Some(payload)
    }
}
