//! Parsing of reassembled MT1 messages into correction records.
//!
//! The body is self-describing: which sections follow the header, and how wide each one
//! is, depends on the header flags and on the mask in force. A message may omit its
//! mask and refer back to the one most recently broadcast under its mask ID, so the
//! parser keeps every mask it has successfully read.

use log::debug;

use crate::bits::BitReader;
use crate::consts::{
    GNSS_GALILEO, GNSS_GPS, MAX_TOH, SATELLITE_MASK_BITS, SIGNAL_MASK_BITS,
};
use crate::error::{HasError, Result};

use super::mask::{HasMask, MaskCache, SystemMask};
use super::{
    ClockCorrection, ClockFullSet, ClockSubset, CodeBiases, HasData, HasHeader,
    OrbitCorrection, OrbitCorrections, PhaseBias, PhaseBiases, SubsetCorrections,
    UraLevels,
};

/// Parses MT1 messages, keeping the mask store that later messages may refer back to.
pub struct MessageParser {
    masks: MaskCache,
}

impl MessageParser {
    /// Create a new `MessageParser` with an empty mask store.
    pub fn new() -> MessageParser {
        MessageParser {
            masks: MaskCache::new(),
        }
    }

    /// Parse the given reassembled message into a correction record.
    ///
    /// On failure no partial record escapes, and the mask store is left untouched
    /// except by a fully parsed mask section.
    pub fn parse(&mut self, octets: &[u8]) -> Result<HasData> {
        let mut reader = BitReader::new(octets);

        let header = read_header(&mut reader)?;

        debug!("MT1 header: toh {}, mask_id {}, iod_id {}, flags [{} {} {} {} {} {} {}]",
            header.toh, header.mask_id, header.iod_id, header.mask_flag as u8,
            header.orbit_correction_flag as u8, header.clock_fullset_flag as u8,
            header.clock_subset_flag as u8, header.code_bias_flag as u8,
            header.phase_bias_flag as u8, header.ura_flag as u8);

        if header.toh > MAX_TOH {
            return Err(HasError::TohOutOfRange);
        }

        let mask = if header.mask_flag {
            let mask = read_mask(&mut reader)?;
            self.masks.store(header.mask_id, mask.clone());
            mask
        } else {
            match self.masks.load(header.mask_id) {
                Some(mask) => mask.clone(),
                None => return Err(HasError::MissingMask),
            }
        };

        let mut orbit_corrections = None;
        let mut clock_fullset = None;
        let mut clock_subset = None;
        let mut code_biases = None;
        let mut phase_biases = None;
        let mut ura_levels = None;

        if header.orbit_correction_flag {
            orbit_corrections = Some(read_orbit(&mut reader, &mask)?);
        }

        if header.clock_fullset_flag {
            clock_fullset = Some(read_clock_fullset(&mut reader, &mask)?);
        }

        if header.clock_subset_flag {
            clock_subset = Some(read_clock_subset(&mut reader, &mask)?);
        }

        if header.code_bias_flag {
            code_biases = Some(read_code_biases(&mut reader, &mask)?);
        }

        if header.phase_bias_flag {
            phase_biases = Some(read_phase_biases(&mut reader, &mask)?);
        }

        if header.ura_flag {
            ura_levels = Some(read_ura(&mut reader, &mask)?);
        }

        Ok(HasData {
            header,
            mask,
            orbit_corrections,
            clock_fullset,
            clock_subset,
            code_biases,
            phase_biases,
            ura_levels,
        })
    }
}

/// Read the fixed 32-bit MT1 header.
fn read_header(reader: &mut BitReader) -> Result<HasHeader> {
    let toh = reader.take_u(12)? as u16;
    let mask_id = reader.take_u(5)? as u8;
    let iod_id = reader.take_u(5)? as u8;
    let mask_flag = reader.take_bool()?;
    let orbit_correction_flag = reader.take_bool()?;
    let clock_fullset_flag = reader.take_bool()?;
    let clock_subset_flag = reader.take_bool()?;
    let code_bias_flag = reader.take_bool()?;
    let phase_bias_flag = reader.take_bool()?;
    let ura_flag = reader.take_bool()?;
    reader.skip(3)?;

    Ok(HasHeader {
        toh,
        mask_id,
        iod_id,
        mask_flag,
        orbit_correction_flag,
        clock_fullset_flag,
        clock_subset_flag,
        code_bias_flag,
        phase_bias_flag,
        ura_flag,
    })
}

/// Read the mask section: per-system satellite, signal, and cell masks.
fn read_mask(reader: &mut BitReader) -> Result<HasMask> {
    let nsys = reader.take_u(4)? as usize;

    if nsys == 0 {
        return Err(HasError::EmptyMask);
    }

    let mut systems = Vec::with_capacity(nsys);

    for _ in 0..nsys {
        let gnss_id = reader.take_u(4)? as u8;
        let satellite_mask = reader.take_u(SATELLITE_MASK_BITS)?;
        let signal_mask = reader.take_u(SIGNAL_MASK_BITS)? as u16;

        let sats = satellite_mask.count_ones() as usize;
        let sigs = signal_mask.count_ones() as usize;

        let cell_mask = if reader.take_bool()? {
            let mut cells = vec![vec![false; sigs]; sats];

            for row in cells.iter_mut() {
                for cell in row.iter_mut() {
                    *cell = reader.take_bool()?;
                }
            }

            Some(cells)
        } else {
            None
        };

        let nav_message = reader.take_u(3)? as u8;

        systems.push(SystemMask {
            gnss_id,
            satellite_mask,
            signal_mask,
            cell_mask,
            nav_message,
        });
    }

    reader.skip(6)?;

    let mask = HasMask { systems };

    // Downstream sections are sized by the satellite count, so a mask selecting
    // nothing leaves them uninterpretable.
    if mask.nsat() == 0 {
        return Err(HasError::EmptyMask);
    }

    Ok(mask)
}

/// Read the orbit correction section.
fn read_orbit(reader: &mut BitReader, mask: &HasMask) -> Result<OrbitCorrections> {
    let validity_interval_index = reader.take_u(4)? as u8;
    let mut satellites = Vec::with_capacity(mask.nsat());

    for sys in &mask.systems {
        let iod_bits = match sys.gnss_id {
            GNSS_GPS => 10,
            GNSS_GALILEO => 10,
            _ => return Err(HasError::UnknownGnssId),
        };

        for _ in 0..sys.satellites() {
            satellites.push(OrbitCorrection {
                gnss_iod: reader.take_u(iod_bits)? as u16,
                delta_radial: reader.take_i(13)? as i16,
                delta_along_track: reader.take_i(12)? as i16,
                delta_cross_track: reader.take_i(12)? as i16,
            });
        }
    }

    Ok(OrbitCorrections {
        validity_interval_index,
        satellites,
    })
}

/// Read the full-set clock correction section.
fn read_clock_fullset(reader: &mut BitReader, mask: &HasMask) -> Result<ClockFullSet> {
    let validity_interval_index = reader.take_u(4)? as u8;

    let mut multipliers = Vec::with_capacity(mask.nsys());

    for _ in 0..mask.nsys() {
        multipliers.push(reader.take_u(2)? as u8 + 1);
    }

    let mut satellites = Vec::with_capacity(mask.nsat());

    for _ in 0..mask.nsat() {
        satellites.push(ClockCorrection {
            iod_change: reader.take_bool()?,
            delta_clock_c0: reader.take_i(13)? as i16,
        });
    }

    Ok(ClockFullSet {
        validity_interval_index,
        multipliers,
        satellites,
    })
}

/// Read the subset clock correction section.
fn read_clock_subset(reader: &mut BitReader, mask: &HasMask) -> Result<ClockSubset> {
    let validity_interval_index = reader.take_u(4)? as u8;
    let nsys = reader.take_u(4)? as usize;

    if nsys == 0 {
        return Err(HasError::EmptySubset);
    }

    let mut systems = Vec::with_capacity(nsys);

    for _ in 0..nsys {
        let gnss_id = reader.take_u(4)? as u8;
        let multiplier = reader.take_u(2)? as u8 + 1;

        // The submask covers the satellites of the matching masked system.
        let masked = match mask.system(gnss_id) {
            Some(sys) => sys.satellites(),
            None => return Err(HasError::UnknownGnssId),
        };

        let mut submask = Vec::with_capacity(masked);

        for _ in 0..masked {
            submask.push(reader.take_bool()?);
        }

        let mut satellites = Vec::with_capacity(masked);

        for &selected in &submask {
            if selected {
                satellites.push(ClockCorrection {
                    iod_change: reader.take_bool()?,
                    delta_clock_c0: reader.take_i(13)? as i16,
                });
            }
        }

        systems.push(SubsetCorrections {
            gnss_id,
            multiplier,
            submask,
            satellites,
        });
    }

    Ok(ClockSubset {
        validity_interval_index,
        systems,
    })
}

/// Read the code bias section.
fn read_code_biases(reader: &mut BitReader, mask: &HasMask) -> Result<CodeBiases> {
    let validity_interval_index = reader.take_u(4)? as u8;
    let mut satellites = Vec::with_capacity(mask.nsat());

    for sys in &mask.systems {
        for sat in 0..sys.satellites() {
            let mut row = Vec::with_capacity(sys.signals());

            for sig in 0..sys.signals() {
                row.push(if sys.cell(sat, sig) {
                    Some(reader.take_i(11)? as i16)
                } else {
                    None
                });
            }

            satellites.push(row);
        }
    }

    Ok(CodeBiases {
        validity_interval_index,
        satellites,
    })
}

/// Read the phase bias section.
fn read_phase_biases(reader: &mut BitReader, mask: &HasMask) -> Result<PhaseBiases> {
    let validity_interval_index = reader.take_u(4)? as u8;
    let mut satellites = Vec::with_capacity(mask.nsat());

    for sys in &mask.systems {
        for sat in 0..sys.satellites() {
            let mut row = Vec::with_capacity(sys.signals());

            for sig in 0..sys.signals() {
                row.push(if sys.cell(sat, sig) {
                    Some(PhaseBias {
                        bias: reader.take_i(11)? as i16,
                        discontinuity_indicator: reader.take_u(2)? as u8,
                    })
                } else {
                    None
                });
            }

            satellites.push(row);
        }
    }

    Ok(PhaseBiases {
        validity_interval_index,
        satellites,
    })
}

/// Read the URA section.
fn read_ura(reader: &mut BitReader, mask: &HasMask) -> Result<UraLevels> {
    let validity_interval_index = reader.take_u(4)? as u8;
    let mut satellites = Vec::with_capacity(mask.nsat());

    for _ in 0..mask.nsat() {
        satellites.push(reader.take_u(4)? as u8);
    }

    Ok(UraLevels {
        validity_interval_index,
        satellites,
    })
}
