//! Collects HAS pages per message ID and recovers completed messages through the
//! Reed-Solomon outer code.
//!
//! A transmitter encodes each 32×53-octet message column-wise into a 255×53 block and
//! broadcasts an arbitrary subset of its rows as pages. The assembler keeps one slot
//! per message ID, fills rows as their pages arrive, and once the unique page count
//! reaches the announced message size decodes every column with the missing rows marked
//! as erasures.

use bitvec::prelude::*;
use log::{debug, error};

use crate::coding::reed_solomon;
use crate::consts::{BLOCK_SYMBOLS, INFO_SYMBOLS, NUM_MESSAGE_IDS, PAGE_OCTETS, PARITY_SYMBOLS};
use crate::error::{HasError, Result};
use crate::page::HasPage;

/// Which codeword positions hold a received page.
type PageSet = BitArr!(for BLOCK_SYMBOLS, in u8);

/// A reassembled and error-corrected HAS message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedMessage {
    /// Message ID the pages were collected under.
    pub message_id: u8,
    /// Information octets: `message_size` rows of 53 octets each, in row-major order.
    pub octets: Vec<u8>,
}

/// Per-message-ID assembly state.
struct Slot {
    /// Which page IDs have been received for the in-flight message.
    received: PageSet,
    /// Announced page count, recorded from the first accepted page.
    size: u8,
    /// Code matrix: one row per codeword position, one column per payload octet.
    matrix: Vec<u8>,
}

impl Slot {
    fn new() -> Slot {
        Slot {
            received: PageSet::ZERO,
            size: 0,
            matrix: vec![0; BLOCK_SYMBOLS * PAGE_OCTETS],
        }
    }

    /// Drop the in-flight message so the slot can collect a fresh one.
    fn reset(&mut self) {
        self.received = PageSet::ZERO;
        self.size = 0;
        self.matrix.fill(0);
    }

    fn count(&self) -> usize {
        self.received.count_ones()
    }
}

/// Reassembles multi-page HAS messages, keyed by message ID.
pub struct PageAssembler {
    slots: Vec<Slot>,
}

impl PageAssembler {
    /// Create a new `PageAssembler` with every slot empty.
    pub fn new() -> PageAssembler {
        PageAssembler {
            slots: (0..NUM_MESSAGE_IDS).map(|_| Slot::new()).collect(),
        }
    }

    /// Feed in a received page, possibly completing the message it belongs to.
    ///
    /// Returns `None` while a message is still being collected (filtered and duplicate
    /// pages are silently dropped), and the outcome of the decode attempt once the
    /// unique page count for the message ID reaches the announced message size. Failed
    /// attempts drop the in-flight message; later pages with the same message ID start
    /// a fresh one.
    pub fn feed(&mut self, page: &HasPage) -> Option<Result<DecodedMessage>> {
        if page.status != 0 && page.status != 1 {
            debug!("ignoring page with status {}", page.status);
            return None;
        }

        if page.message_type != 1 {
            debug!("ignoring message type {} page", page.message_type);
            return None;
        }

        // PID 0 is reserved.
        if page.message_page_id == 0 {
            return None;
        }

        if page.message_id >= NUM_MESSAGE_IDS as u8 {
            return None;
        }

        if page.message_size == 0 || page.message_size as usize > INFO_SYMBOLS {
            debug!("ignoring page announcing message size {}", page.message_size);
            return None;
        }

        let slot = &mut self.slots[page.message_id as usize];
        let pos = page.message_page_id as usize - 1;

        if slot.received[pos] {
            return None;
        }

        if slot.count() == 0 {
            slot.size = page.message_size;
        }

        slot.received.set(pos, true);
        slot.matrix[pos * PAGE_OCTETS..][..PAGE_OCTETS].copy_from_slice(&page.payload);

        debug!("page recorded: mid {}, size {}, pid {}, {}/{} pages",
            page.message_id, slot.size, page.message_page_id, slot.count(), slot.size);

        if slot.count() != slot.size as usize {
            return None;
        }

        Some(Self::decode(slot, page.message_id))
    }

    /// Decode the completed message in the given slot, leaving the slot empty whatever
    /// the outcome.
    fn decode(slot: &mut Slot, mid: u8) -> Result<DecodedMessage> {
        let size = slot.size as usize;

        // Erasure positions: every missing page except those in the known-zero window
        // between the end of the message and the first parity page.
        let mut erasures = Vec::with_capacity(PARITY_SYMBOLS);

        for pos in 0..BLOCK_SYMBOLS {
            let pid = pos + 1;

            if !slot.received[pos] && (pid <= size || pid > INFO_SYMBOLS) {
                erasures.push(pos);
            }
        }

        if erasures.len() > PARITY_SYMBOLS {
            // Pages inside the padding window inflate the count without reducing the
            // erasures, so completion can be reached with an undecodable block.
            error!("mid {}: {} erasures from pages {:?}, size {}: not decodable",
                mid, erasures.len(), slot.received.iter_ones().map(|pos| pos + 1)
                    .collect::<Vec<usize>>(), size);
            slot.reset();
            return Err(HasError::TooManyErasures);
        }

        let mut octets = vec![0; size * PAGE_OCTETS];

        for col in 0..PAGE_OCTETS {
            let mut column = [0; BLOCK_SYMBOLS];

            for pos in slot.received.iter_ones() {
                column[pos] = slot.matrix[pos * PAGE_OCTETS + col];
            }

            if reed_solomon::decode(&mut column, &erasures).is_none() {
                error!("mid {}: Reed-Solomon decoding failed", mid);
                slot.reset();
                return Err(HasError::RsUnrecoverable);
            }

            for row in 0..size {
                octets[row * PAGE_OCTETS + col] = column[row];
            }
        }

        debug!("mid {}: decoded {}-page message", mid, size);
        slot.reset();

        Ok(DecodedMessage {
            message_id: mid,
            octets,
        })
    }
}

/// Encode a message into the full 255-page block it would be broadcast from.
#[cfg(test)]
pub(crate) fn encode_pages(mid: u8, octets: &[u8]) -> Vec<HasPage> {
    assert_eq!(octets.len() % PAGE_OCTETS, 0);
    let size = octets.len() / PAGE_OCTETS;
    let mut payloads = vec![[0; PAGE_OCTETS]; BLOCK_SYMBOLS];

    for col in 0..PAGE_OCTETS {
        let mut data = [0; INFO_SYMBOLS];

        for row in 0..size {
            data[row] = octets[row * PAGE_OCTETS + col];
        }

        let word = reed_solomon::encode(&data);

        for pos in 0..BLOCK_SYMBOLS {
            payloads[pos][col] = word[pos];
        }
    }

    payloads.into_iter().enumerate().map(|(pos, payload)| HasPage {
        status: 1,
        message_type: 1,
        message_id: mid,
        message_size: size as u8,
        message_page_id: pos as u8 + 1,
        payload,
    }).collect()
}
