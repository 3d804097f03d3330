//! High-level receiver tying page assembly and message parsing to egress events.

use bitvec::prelude::*;
use log::{info, warn};

use crate::assembler::PageAssembler;
use crate::message::{HasData, MessageParser};
use crate::page::HasPage;

/// Events published while receiving HAS pages.
#[derive(Clone, Debug, PartialEq)]
pub enum ReceiverEvent {
    /// A complete correction record, ready for the PVT consumer.
    Correction(HasData),
    /// Raw decoded message bits for the nav data monitor.
    NavMessage(NavMessagePacket),
}

/// Raw decoded nav message republished for an external monitor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NavMessagePacket {
    pub system: &'static str,
    pub signal: &'static str,
    pub prn: u8,
    pub tow_at_current_symbol_ms: u32,
    /// Decoded MT1 bits as '0'/'1' characters.
    pub nav_message: String,
}

/// Receives HAS pages and publishes decoded correction records.
pub struct Receiver {
    assembler: PageAssembler,
    parser: MessageParser,
    /// Whether to republish each successfully decoded message for the monitor.
    enable_navdata_monitor: bool,
}

impl Receiver {
    /// Create a new `Receiver` with empty assembly and mask state.
    pub fn new(enable_navdata_monitor: bool) -> Receiver {
        Receiver {
            assembler: PageAssembler::new(),
            parser: MessageParser::new(),
            enable_navdata_monitor,
        }
    }

    /// Feed in a received page, producing the events of any message it completes.
    ///
    /// Data errors never propagate: failed decodes and malformed messages are logged,
    /// their state dropped, and the receiver stays ready for the next page.
    pub fn feed(&mut self, page: &HasPage) -> Vec<ReceiverEvent> {
        let decoded = match self.assembler.feed(page) {
            Some(Ok(decoded)) => decoded,
            Some(Err(_)) => return Vec::new(),
            None => return Vec::new(),
        };

        info!("new HAS message (mid {}) received and successfully decoded",
            decoded.message_id);

        let mut events = Vec::new();

        if self.enable_navdata_monitor {
            events.push(ReceiverEvent::NavMessage(NavMessagePacket {
                system: "E",
                signal: "E6",
                prn: 0,
                tow_at_current_symbol_ms: 0,
                nav_message: bit_string(&decoded.octets),
            }));
        }

        match self.parser.parse(&decoded.octets) {
            Ok(data) => events.push(ReceiverEvent::Correction(data)),
            Err(err) => warn!("mid {} record dropped: {:?}", decoded.message_id, err),
        }

        events
    }
}

/// Render octets as a string of '0'/'1' characters, MSB first.
fn bit_string(octets: &[u8]) -> String {
    octets.view_bits::<Msb0>().iter()
        .map(|bit| if *bit { '1' } else { '0' })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assembler::encode_pages;
    use crate::bits::BitWriter;
    use crate::consts::{GNSS_GALILEO, PAGE_BITS};

    /// Build a one-page message: header, then a mask for Galileo PRN 11 on signal slot
    /// 0, then optionally one orbit correction.
    fn build_message(toh: u64, mask_id: u64, mask_flag: bool, orbit: Option<i64>)
        -> Vec<u8>
    {
        let mut w = BitWriter::new();

        w.push(toh, 12).push(mask_id, 5).push(0, 5);
        w.flag(mask_flag).flag(orbit.is_some());
        for _ in 0..5 {
            w.flag(false);
        }
        w.push(0, 3);

        if mask_flag {
            w.push(1, 4);
            w.push(GNSS_GALILEO as u64, 4);
            w.push(1 << 29, 40);
            w.push(1 << 15, 16);
            w.flag(false);
            w.push(1, 3);
            w.push(0, 6);
        }

        if let Some(delta_radial) = orbit {
            w.push(3, 4);
            w.push(0x2A, 10);
            w.push((delta_radial as u64) & 0x1FFF, 13);
            w.push(0, 12).push(0, 12);
        }

        w.finish(1)
    }

    fn correction(events: &[ReceiverEvent]) -> Option<&HasData> {
        events.iter().find_map(|event| match event {
            ReceiverEvent::Correction(data) => Some(data),
            _ => None,
        })
    }

    #[test]
    fn test_end_to_end() {
        let mut recv = Receiver::new(false);
        let pages = encode_pages(5, &build_message(60, 4, true, Some(-1)));

        // Deliver a single parity page: the only information page is recoverable from
        // it and the known-zero padding.
        let events = recv.feed(&pages[40 - 1]);
        assert_eq!(events.len(), 1);

        let data = correction(&events).unwrap();
        assert_eq!(data.header.toh, 60);
        assert_eq!(data.header.mask_id, 4);
        assert_eq!(data.mask.systems[0].prns().collect::<Vec<u8>>(), vec![11]);

        let orbit = data.orbit_corrections.as_ref().unwrap();
        assert_eq!(orbit.satellites[0].delta_radial, -1);
        assert_eq!(orbit.satellites[0].gnss_iod, 0x2A);
    }

    #[test]
    fn test_navdata_monitor() {
        let mut recv = Receiver::new(true);
        let message = build_message(600, 4, true, None);
        let pages = encode_pages(5, &message);

        let events = recv.feed(&pages[0]);
        assert_eq!(events.len(), 2);

        match &events[0] {
            ReceiverEvent::NavMessage(packet) => {
                assert_eq!(packet.system, "E");
                assert_eq!(packet.signal, "E6");
                assert_eq!(packet.prn, 0);
                assert_eq!(packet.tow_at_current_symbol_ms, 0);
                assert_eq!(packet.nav_message.len(), PAGE_BITS);
                // TOH 600 in the leading 12 bits.
                assert!(packet.nav_message.starts_with("001001011000"));
            }
            other => panic!("expected nav message packet, got {:?}", other),
        }

        assert!(correction(&events).is_some());
    }

    #[test]
    fn test_mask_reuse_across_messages() {
        let mut recv = Receiver::new(false);

        let first = encode_pages(4, &build_message(60, 4, true, Some(-1)));
        let data = correction(&recv.feed(&first[0])).cloned().unwrap();
        assert_eq!(data.orbit_corrections.unwrap().satellites[0].delta_radial, -1);

        // The follow-up omits its mask and must inherit the cached contents.
        let second = encode_pages(6, &build_message(90, 4, false, Some(5)));
        let events = recv.feed(&second[0]);
        let reused = correction(&events).unwrap();

        assert_eq!(reused.mask, data.mask);
        assert_eq!(reused.orbit_corrections.as_ref().unwrap().satellites[0].delta_radial, 5);
    }

    #[test]
    fn test_empty_mask_not_published() {
        let mut recv = Receiver::new(false);

        // Message whose mask section declares no systems, spread over three pages.
        let mut w = BitWriter::new();
        w.push(0, 12).push(0, 5).push(0, 5);
        w.flag(true);
        for _ in 0..6 {
            w.flag(false);
        }
        w.push(0, 3);
        w.push(0, 4);

        let pages = encode_pages(0, &w.finish(3));

        assert!(recv.feed(&pages[0]).is_empty());
        assert!(recv.feed(&pages[1]).is_empty());
        // The decode succeeds on the third page, but the record must be dropped.
        assert!(recv.feed(&pages[2]).is_empty());

        // And nothing was cached under mask ID 0.
        let followup = encode_pages(1, &build_message(30, 0, false, Some(2)));
        assert!(recv.feed(&followup[0]).is_empty());
    }

    #[test]
    fn test_toh_guard() {
        let mut recv = Receiver::new(false);

        let bad = encode_pages(7, &build_message(3601, 4, true, None));
        assert!(recv.feed(&bad[0]).is_empty());

        // The mask of the rejected message must not be available afterwards.
        let followup = encode_pages(8, &build_message(30, 4, false, Some(2)));
        assert!(recv.feed(&followup[0]).is_empty());

        // The slot is clear: a valid message on the same mid decodes.
        let good = encode_pages(7, &build_message(600, 4, true, None));
        assert_eq!(recv.feed(&good[0]).len(), 1);
    }

    #[test]
    fn test_filtered_pages_produce_nothing() {
        let mut recv = Receiver::new(true);
        let pages = encode_pages(3, &build_message(60, 4, true, None));

        let mut page = pages[0];
        page.status = 3;
        assert!(recv.feed(&page).is_empty());

        let mut page = pages[0];
        page.message_type = 2;
        assert!(recv.feed(&page).is_empty());

        // The real page still completes the message afterwards.
        assert_eq!(recv.feed(&pages[0]).len(), 2);
    }
}
