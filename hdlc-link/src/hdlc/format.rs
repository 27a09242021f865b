//! HDLC Type 3 frame format field

use hdlc_core::{HdlcError, HdlcResult};
use std::fmt;

/// Type nibble of the Type 3 frame format
pub const FORMAT_TYPE_3: u8 = 0x0A;

/// Largest value the 11-bit length subfield can carry
pub const MAX_FRAME_LENGTH: u16 = 0x07FF;

const SEGMENTATION_BIT: u16 = 0x0800;
const LENGTH_MASK: u16 = 0x07FF;

/// Two-octet frame format field
///
/// Packed big-endian as `1010 S LLL LLLLLLLL`: type nibble, segmentation bit
/// and the number of octets between the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameFormat {
    segmented: bool,
    length: u16,
}

impl FrameFormat {
    /// Build a Type 3 format field
    pub fn new(segmented: bool, length: u16) -> HdlcResult<Self> {
        if length > MAX_FRAME_LENGTH {
            return Err(HdlcError::RangeError(format!(
                "Frame length {} exceeds 11-bit maximum {}",
                length, MAX_FRAME_LENGTH
            )));
        }
        Ok(Self { segmented, length })
    }

    /// Parse the format field from the two octets following the opening flag
    pub fn from_wire(octets: [u8; 2]) -> HdlcResult<Self> {
        let raw = u16::from_be_bytes(octets);
        if (octets[0] >> 4) != FORMAT_TYPE_3 {
            return Err(HdlcError::BadFormat(raw));
        }
        Ok(Self {
            segmented: raw & SEGMENTATION_BIT != 0,
            length: raw & LENGTH_MASK,
        })
    }

    /// Encode to wire order
    pub fn to_wire(&self) -> [u8; 2] {
        let mut raw = (FORMAT_TYPE_3 as u16) << 12 | self.length;
        if self.segmented {
            raw |= SEGMENTATION_BIT;
        }
        raw.to_be_bytes()
    }

    /// Always [`FORMAT_TYPE_3`]
    pub fn type_nibble(&self) -> u8 {
        FORMAT_TYPE_3
    }

    /// Check if more segments of the same payload follow
    pub fn is_segmented(&self) -> bool {
        self.segmented
    }

    /// Octets between the opening and closing flag
    pub fn length(&self) -> u16 {
        self.length
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [hi, lo] = self.to_wire();
        write!(f, "{:02X}{:02X}", hi, lo)
    }
}
