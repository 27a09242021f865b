//! HDLC address types
//!
//! Each address octet carries seven payload bits in its high bits; bit 0 is
//! set only on the last octet. Legal encodings are one, two or four octets.

use hdlc_core::{HdlcError, HdlcResult};
use std::fmt;

/// Reserved HDLC addresses
pub mod reserved {
    /// Guaranteed to be received by no one
    pub const NO_STATION: u16 = 0x00;

    /// Client management process
    pub const CLIENT_MANAGEMENT_PROCESS: u16 = 0x01;

    /// Client public client
    pub const CLIENT_PUBLIC_CLIENT: u16 = 0x10;

    /// Client all station (broadcast)
    pub const CLIENT_ALL_STATION: u16 = 0x7F;

    /// Server upper management logical device
    pub const SERVER_UPPER_MANAGEMENT_LOGICAL_DEVICE: u16 = 0x01;

    /// Server upper all stations (1 byte)
    pub const SERVER_UPPER_ALL_STATIONS_1BYTE: u16 = 0x7F;

    /// Server upper all stations (2 byte)
    pub const SERVER_UPPER_ALL_STATIONS_2BYTE: u16 = 0x3FFF;

    /// Server lower calling (1 byte)
    pub const SERVER_LOWER_CALLING_1BYTE: u16 = 0x7E;

    /// Server lower calling (2 byte)
    pub const SERVER_LOWER_CALLING_2BYTE: u16 = 0x3FFE;
}

const ONE_BYTE_UPPER_BOUND: u16 = 0x7F;
const TWO_BYTE_UPPER_BOUND: u16 = 0x3FFF;
const END_BIT: u8 = 0x01;

/// HDLC address
///
/// The encoded octet string is the identity: a four-octet and a two-octet
/// address with the same logical values compare unequal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HdlcAddress {
    octets: [u8; 4],
    byte_length: usize,
    upper: u16,
    lower: Option<u16>,
}

impl HdlcAddress {
    /// Encode an address using the shortest legal form
    ///
    /// - no lower part and `upper <= 0x7F`: one octet
    /// - both parts `<= 0x7F`: two octets
    /// - otherwise four octets; a missing lower part is encoded as 0
    pub fn encode(upper: u16, lower: Option<u16>) -> HdlcResult<Self> {
        for (name, value) in [("upper", Some(upper)), ("lower", lower)] {
            if let Some(value) = value {
                if value > TWO_BYTE_UPPER_BOUND {
                    return Err(HdlcError::RangeError(format!(
                        "HDLC {} address 0x{:X} is out of upper bound 0x{:X}",
                        name, value, TWO_BYTE_UPPER_BOUND
                    )));
                }
            }
        }

        let mut octets = [0u8; 4];
        let wide = upper > ONE_BYTE_UPPER_BOUND || lower.is_some_and(|l| l > ONE_BYTE_UPPER_BOUND);
        let byte_length = match (wide, lower) {
            (false, None) => {
                octets[0] = (upper << 1) as u8 | END_BIT;
                1
            }
            (false, Some(lower)) => {
                octets[0] = (upper << 1) as u8;
                octets[1] = (lower << 1) as u8 | END_BIT;
                2
            }
            (true, lower) => {
                let lower = lower.unwrap_or(0);
                octets[0] = ((upper >> 7) << 1) as u8;
                octets[1] = ((upper & 0x7F) << 1) as u8;
                octets[2] = ((lower >> 7) << 1) as u8;
                octets[3] = ((lower & 0x7F) << 1) as u8 | END_BIT;
                4
            }
        };

        Ok(Self::from_parts(octets, byte_length))
    }

    /// Parse an address at the start of `data`
    ///
    /// Returns the address and the number of octets consumed. The terminator
    /// bit may only appear at position 0, 1 or 3.
    pub fn parse(data: &[u8]) -> HdlcResult<(Self, usize)> {
        let mut octets = [0u8; 4];
        let mut length = 0;

        while length < 4 {
            let current_byte = *data.get(length).ok_or_else(|| {
                HdlcError::AddressError(format!(
                    "Address truncated after {} octet(s)",
                    length
                ))
            })?;
            octets[length] = current_byte;
            length += 1;

            if (current_byte & END_BIT) != 0 {
                break;
            }
        }

        match length {
            1 | 2 | 4 if octets[length - 1] & END_BIT != 0 => {
                Ok((Self::from_parts(octets, length), length))
            }
            3 => Err(HdlcError::AddressError(
                "Terminator bit at illegal position 2".to_string(),
            )),
            _ => Err(HdlcError::AddressError(format!(
                "No terminator bit in address octets {:02X?}",
                &octets[..length]
            ))),
        }
    }

    fn from_parts(octets: [u8; 4], byte_length: usize) -> Self {
        let (upper, lower) = match byte_length {
            1 => ((octets[0] >> 1) as u16, None),
            2 => ((octets[0] >> 1) as u16, Some((octets[1] >> 1) as u16)),
            _ => (
                ((octets[0] >> 1) as u16) * 128 + (octets[1] >> 1) as u16,
                Some(((octets[2] >> 1) as u16) * 128 + (octets[3] >> 1) as u16),
            ),
        };
        Self {
            octets,
            byte_length,
            upper,
            lower,
        }
    }

    /// Upper HDLC address (logical device on the server side)
    pub fn upper(&self) -> u16 {
        self.upper
    }

    /// Lower HDLC address (physical device), absent for one-octet addresses
    pub fn lower(&self) -> Option<u16> {
        self.lower
    }

    /// Encoded octets
    pub fn octets(&self) -> &[u8] {
        &self.octets[..self.byte_length]
    }

    /// Get byte length
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// Check if this is an all-station (broadcast) address
    pub fn is_all_station(&self) -> bool {
        match self.byte_length {
            1 | 2 => self.upper == reserved::SERVER_UPPER_ALL_STATIONS_1BYTE,
            _ => self.upper == reserved::SERVER_UPPER_ALL_STATIONS_2BYTE,
        }
    }

    /// Check if this is a no-station address
    pub fn is_no_station(&self) -> bool {
        self.upper == reserved::NO_STATION && self.lower.unwrap_or(0) == reserved::NO_STATION
    }

    /// Check if this is a calling station address
    pub fn is_calling(&self) -> bool {
        match (self.byte_length, self.lower) {
            (2, Some(lower)) => lower == reserved::SERVER_LOWER_CALLING_1BYTE,
            (4, Some(lower)) => lower == reserved::SERVER_LOWER_CALLING_2BYTE,
            _ => false,
        }
    }
}

impl fmt::Display for HdlcAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = if self.byte_length == 4 { 4 } else { 2 };
        write!(f, "{:0width$X}", self.upper, width = width)?;
        if let Some(lower) = self.lower {
            write!(f, "-{:0width$X}", lower, width = width)?;
        }
        Ok(())
    }
}
