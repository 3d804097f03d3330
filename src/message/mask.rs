//! Masks describing which systems, satellites, and signals a correction record covers,
//! and the store that lets later messages omit them.

use crate::consts::{NUM_MASK_IDS, SATELLITE_MASK_BITS, SIGNAL_MASK_BITS};

/// Mask fields broadcast for a single GNSS system.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SystemMask {
    /// GNSS the masks apply to (0 = GPS, 2 = Galileo, others reserved).
    pub gnss_id: u8,
    /// Selected satellites, with PRN 1 at the mask's MSB.
    pub satellite_mask: u64,
    /// Selected signal slots, with slot 0 at the mask's MSB.
    pub signal_mask: u16,
    /// Per-(satellite, signal) selection, present only when the cell mask availability
    /// flag was set. Rows follow the satellite mask, columns the signal mask.
    pub cell_mask: Option<Vec<Vec<bool>>>,
    /// Nav message identifier for the system.
    pub nav_message: u8,
}

impl SystemMask {
    /// Number of satellites selected by the satellite mask.
    pub fn satellites(&self) -> usize {
        self.satellite_mask.count_ones() as usize
    }

    /// Number of signal slots selected by the signal mask.
    pub fn signals(&self) -> usize {
        self.signal_mask.count_ones() as usize
    }

    /// PRNs selected by the satellite mask, in mask (MSB-first) order.
    pub fn prns(&self) -> impl Iterator<Item = u8> + '_ {
        (0..SATELLITE_MASK_BITS as u32)
            .filter(move |&bit| {
                self.satellite_mask >> (SATELLITE_MASK_BITS as u32 - 1 - bit) & 1 == 1
            })
            .map(|bit| bit as u8 + 1)
    }

    /// Signal slots selected by the signal mask, in mask (MSB-first) order.
    pub fn signal_slots(&self) -> impl Iterator<Item = u8> + '_ {
        (0..SIGNAL_MASK_BITS as u32)
            .filter(move |&bit| {
                self.signal_mask >> (SIGNAL_MASK_BITS as u32 - 1 - bit) & 1 == 1
            })
            .map(|bit| bit as u8)
    }

    /// Whether the cell for the given satellite and signal, both indexed in mask order,
    /// receives biases. Without a cell mask every combination does.
    pub fn cell(&self, sat: usize, sig: usize) -> bool {
        match self.cell_mask {
            Some(ref cells) => cells[sat][sig],
            None => true,
        }
    }
}

/// Complete mask definition from an MT1 mask section.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HasMask {
    /// Per-system masks, in broadcast order.
    pub systems: Vec<SystemMask>,
}

impl HasMask {
    /// Number of systems in the mask.
    pub fn nsys(&self) -> usize {
        self.systems.len()
    }

    /// Total number of satellites selected across all systems.
    pub fn nsat(&self) -> usize {
        self.systems.iter().map(|sys| sys.satellites()).sum()
    }

    /// Find the mask for the given GNSS.
    pub fn system(&self, gnss_id: u8) -> Option<&SystemMask> {
        self.systems.iter().find(|sys| sys.gnss_id == gnss_id)
    }
}

/// Process-lifetime store of the most recent mask received under each mask ID.
pub struct MaskCache {
    masks: [Option<HasMask>; NUM_MASK_IDS],
}

impl MaskCache {
    /// Create a new `MaskCache` with every slot empty.
    pub fn new() -> MaskCache {
        MaskCache {
            masks: std::array::from_fn(|_| None),
        }
    }

    /// Record the given mask as current for the given mask ID, replacing any previous
    /// one.
    pub fn store(&mut self, mask_id: u8, mask: HasMask) {
        self.masks[mask_id as usize] = Some(mask);
    }

    /// Retrieve the most recent mask stored under the given mask ID.
    pub fn load(&self, mask_id: u8) -> Option<&HasMask> {
        self.masks[mask_id as usize].as_ref()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn galileo() -> SystemMask {
        SystemMask {
            gnss_id: 2,
            // PRNs 2, 11, and 40.
            satellite_mask: 1 << 38 | 1 << 29 | 1,
            // Slots 0 and 3.
            signal_mask: 1 << 15 | 1 << 12,
            cell_mask: None,
            nav_message: 1,
        }
    }

    #[test]
    fn test_enumeration_order() {
        let sys = galileo();

        assert_eq!(sys.satellites(), 3);
        assert_eq!(sys.signals(), 2);
        assert_eq!(sys.prns().collect::<Vec<u8>>(), vec![2, 11, 40]);
        assert_eq!(sys.signal_slots().collect::<Vec<u8>>(), vec![0, 3]);
    }

    #[test]
    fn test_cells() {
        let mut sys = galileo();

        // No cell mask selects everything.
        assert!(sys.cell(0, 0));
        assert!(sys.cell(2, 1));

        sys.cell_mask = Some(vec![
            vec![true, false],
            vec![false, true],
            vec![true, true],
        ]);

        assert!(sys.cell(0, 0));
        assert!(!sys.cell(0, 1));
        assert!(!sys.cell(1, 0));
        assert!(sys.cell(2, 1));
    }

    #[test]
    fn test_mask_totals() {
        let mask = HasMask {
            systems: vec![
                SystemMask { gnss_id: 0, satellite_mask: 0b111 << 20, ..galileo() },
                galileo(),
            ],
        };

        assert_eq!(mask.nsys(), 2);
        assert_eq!(mask.nsat(), 6);
        assert_eq!(mask.system(2).unwrap().satellites(), 3);
        assert!(mask.system(5).is_none());
    }

    #[test]
    fn test_cache() {
        let mut cache = MaskCache::new();

        assert!(cache.load(4).is_none());

        cache.store(4, HasMask { systems: vec![galileo()] });
        assert_eq!(cache.load(4).unwrap().nsat(), 3);
        assert!(cache.load(5).is_none());

        // A newer definition replaces the old one.
        let mut newer = galileo();
        newer.satellite_mask = 1 << 39;
        cache.store(4, HasMask { systems: vec![newer] });
        assert_eq!(cache.load(4).unwrap().nsat(), 1);
        assert_eq!(cache.load(4).unwrap().systems[0].prns().collect::<Vec<u8>>(), vec![1]);
    }
}
