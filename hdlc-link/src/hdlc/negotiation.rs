//! HDLC parameter negotiation (SNRM/UA information field)
//!
//! ```text
//! 0x81 (format identifier) 0x80 (group identifier) <group length>
//!     [parameter identifier, parameter length, value (big-endian)]*
//! ```
//!
//! | Tag | Parameter |
//! |-----|-----------|
//! | 5   | maximum information field length, transmit |
//! | 6   | maximum information field length, receive |
//! | 7   | window size, transmit |
//! | 8   | window size, receive |
//!
//! Tags are always written from the sender's point of view, so a parser
//! stores tag 5 as its own receive limit and tag 6 as its own transmit limit.

use hdlc_core::{HdlcError, HdlcResult, Information};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ops::RangeInclusive;

/// Format identifier of the parameter negotiation field
pub const FORMAT_IDENTIFIER: u8 = 0x81;
/// Group identifier of the HDLC parameter group
pub const GROUP_IDENTIFIER: u8 = 0x80;

const TAG_MAX_INFO_TRANSMIT: u8 = 0x05;
const TAG_MAX_INFO_RECEIVE: u8 = 0x06;
const TAG_WINDOW_TRANSMIT: u8 = 0x07;
const TAG_WINDOW_RECEIVE: u8 = 0x08;

pub const DEFAULT_MAX_INFO_LENGTH: u16 = 128;
pub const DEFAULT_WINDOW_SIZE: u8 = 1;
pub const MAX_INFO_LENGTH_RANGE: RangeInclusive<u16> = 32..=2030;
pub const WINDOW_SIZE_RANGE: RangeInclusive<u8> = 1..=7;

/// HDLC connection parameters
///
/// These parameters are negotiated during the SNRM/UA handshake and define
/// the capabilities of the HDLC connection.
/// - **Window Size**: how many I frames may be outstanding before an
///   acknowledgment is required. Default is 1.
/// - **Maximum Information Field Length**: the largest information field a
///   single frame may carry. Default is 128 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HdlcParameters {
    pub max_information_field_length_tx: u16,
    pub max_information_field_length_rx: u16,
    pub window_size_tx: u8,
    pub window_size_rx: u8,
}

impl Default for HdlcParameters {
    fn default() -> Self {
        Self {
            max_information_field_length_tx: DEFAULT_MAX_INFO_LENGTH,
            max_information_field_length_rx: DEFAULT_MAX_INFO_LENGTH,
            window_size_tx: DEFAULT_WINDOW_SIZE,
            window_size_rx: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl HdlcParameters {
    /// Range-checked constructor
    pub fn new(
        max_information_field_length_tx: u16,
        max_information_field_length_rx: u16,
        window_size_tx: u8,
        window_size_rx: u8,
    ) -> HdlcResult<Self> {
        let parameters = Self {
            max_information_field_length_tx,
            max_information_field_length_rx,
            window_size_tx,
            window_size_rx,
        };
        parameters.validate()?;
        Ok(parameters)
    }

    /// Check every field against its legal range
    pub fn validate(&self) -> HdlcResult<()> {
        check_max_info("max_information_field_length_tx", self.max_information_field_length_tx)?;
        check_max_info("max_information_field_length_rx", self.max_information_field_length_rx)?;
        check_window("window_size_tx", self.window_size_tx)?;
        check_window("window_size_rx", self.window_size_rx)?;
        Ok(())
    }

    /// Same parameters seen from the peer (transmit and receive swapped)
    pub fn mirrored(&self) -> Self {
        Self {
            max_information_field_length_tx: self.max_information_field_length_rx,
            max_information_field_length_rx: self.max_information_field_length_tx,
            window_size_tx: self.window_size_rx,
            window_size_rx: self.window_size_tx,
        }
    }

    /// Agree on the smaller value of each field
    ///
    /// `proposal` is the peer's request already expressed from our side, i.e.
    /// the result of [`HdlcParameters::from_ua`] on its SNRM information field.
    pub fn negotiate(&self, proposal: &HdlcParameters) -> Self {
        Self {
            max_information_field_length_tx: self
                .max_information_field_length_tx
                .min(proposal.max_information_field_length_tx),
            max_information_field_length_rx: self
                .max_information_field_length_rx
                .min(proposal.max_information_field_length_rx),
            window_size_tx: self.window_size_tx.min(proposal.window_size_tx),
            window_size_rx: self.window_size_rx.min(proposal.window_size_rx),
        }
    }

    /// Encode the SNRM information field
    ///
    /// Fields equal to their default are omitted; an all-default set encodes
    /// to an empty information field.
    pub fn encode_snrm(&self) -> Vec<u8> {
        let mut parameters = Vec::with_capacity(20);

        for (tag, value) in [
            (TAG_MAX_INFO_TRANSMIT, self.max_information_field_length_tx),
            (TAG_MAX_INFO_RECEIVE, self.max_information_field_length_rx),
        ] {
            if value == DEFAULT_MAX_INFO_LENGTH {
                continue;
            }
            parameters.push(tag);
            if value < 0x100 {
                parameters.push(1);
                parameters.push(value as u8);
            } else {
                parameters.push(2);
                parameters.extend_from_slice(&value.to_be_bytes());
            }
        }

        for (tag, value) in [
            (TAG_WINDOW_TRANSMIT, self.window_size_tx),
            (TAG_WINDOW_RECEIVE, self.window_size_rx),
        ] {
            if value == DEFAULT_WINDOW_SIZE {
                continue;
            }
            parameters.push(tag);
            parameters.push(4);
            parameters.extend_from_slice(&(value as u32).to_be_bytes());
        }

        if parameters.is_empty() {
            return parameters;
        }

        let mut result = Vec::with_capacity(parameters.len() + 3);
        result.push(FORMAT_IDENTIFIER);
        result.push(GROUP_IDENTIFIER);
        result.push(parameters.len() as u8);
        result.extend_from_slice(&parameters);
        result
    }

    /// Decode the UA (or received SNRM) information field
    ///
    /// An empty field yields the defaults, as does any parameter the peer
    /// left out.
    pub fn from_ua(info_field: &[u8]) -> HdlcResult<Self> {
        let mut parameters = Self::default();
        if info_field.is_empty() {
            return Ok(parameters);
        }

        if info_field.len() < 3 {
            return Err(HdlcError::MalformedNegotiation(format!(
                "Parameter field too short: {} bytes",
                info_field.len()
            )));
        }
        if info_field[0] != FORMAT_IDENTIFIER {
            return Err(HdlcError::MalformedNegotiation(format!(
                "Invalid format identifier: expected 0x81, got 0x{:02X}",
                info_field[0]
            )));
        }
        if info_field[1] != GROUP_IDENTIFIER {
            return Err(HdlcError::MalformedNegotiation(format!(
                "Invalid group identifier: expected 0x80, got 0x{:02X}",
                info_field[1]
            )));
        }
        let group_length = info_field[2] as usize;
        if group_length != info_field.len() - 3 {
            return Err(HdlcError::MalformedNegotiation(format!(
                "Group length {} does not match {} parameter bytes",
                group_length,
                info_field.len() - 3
            )));
        }

        let mut pos = 3;
        while pos < info_field.len() {
            if pos + 2 > info_field.len() {
                return Err(HdlcError::MalformedNegotiation(format!(
                    "Truncated parameter header at offset {}",
                    pos
                )));
            }
            let tag = info_field[pos];
            let length = info_field[pos + 1] as usize;
            pos += 2;

            if length == 0 || length > 4 {
                return Err(HdlcError::MalformedNegotiation(format!(
                    "Parameter 0x{:02X} has unsupported length {}",
                    tag, length
                )));
            }
            let bytes = info_field.get(pos..pos + length).ok_or_else(|| {
                HdlcError::MalformedNegotiation(format!(
                    "Parameter 0x{:02X} truncated: need {} bytes",
                    tag, length
                ))
            })?;
            let value = bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
            pos += length;

            match tag {
                TAG_MAX_INFO_TRANSMIT => {
                    parameters.max_information_field_length_rx = max_info_value(tag, value)?;
                }
                TAG_MAX_INFO_RECEIVE => {
                    parameters.max_information_field_length_tx = max_info_value(tag, value)?;
                }
                TAG_WINDOW_TRANSMIT => {
                    parameters.window_size_rx = window_value(tag, value)?;
                }
                TAG_WINDOW_RECEIVE => {
                    parameters.window_size_tx = window_value(tag, value)?;
                }
                _ => {
                    return Err(HdlcError::MalformedNegotiation(format!(
                        "Unknown parameter identifier 0x{:02X}",
                        tag
                    )));
                }
            }
        }

        log::debug!("Negotiated HDLC parameters: {:?}", parameters);
        Ok(parameters)
    }

    /// Replace the state with the parameters carried by a UA frame
    ///
    /// The state is left untouched when the field is malformed.
    pub fn set_from_ua(&mut self, info_field: &[u8]) -> HdlcResult<()> {
        *self = Self::from_ua(info_field)?;
        Ok(())
    }
}

impl Information for HdlcParameters {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(self.encode_snrm())
    }
}

fn check_max_info(name: &str, value: u16) -> HdlcResult<()> {
    if !MAX_INFO_LENGTH_RANGE.contains(&value) {
        return Err(HdlcError::RangeError(format!(
            "{} must be in {}..={}, got {}",
            name,
            MAX_INFO_LENGTH_RANGE.start(),
            MAX_INFO_LENGTH_RANGE.end(),
            value
        )));
    }
    Ok(())
}

fn check_window(name: &str, value: u8) -> HdlcResult<()> {
    if !WINDOW_SIZE_RANGE.contains(&value) {
        return Err(HdlcError::RangeError(format!(
            "{} must be in {}..={}, got {}",
            name,
            WINDOW_SIZE_RANGE.start(),
            WINDOW_SIZE_RANGE.end(),
            value
        )));
    }
    Ok(())
}

fn max_info_value(tag: u8, value: u32) -> HdlcResult<u16> {
    u16::try_from(value)
        .ok()
        .filter(|v| MAX_INFO_LENGTH_RANGE.contains(v))
        .ok_or_else(|| {
            HdlcError::MalformedNegotiation(format!(
                "Parameter 0x{:02X}: maximum information length {} out of range",
                tag, value
            ))
        })
}

fn window_value(tag: u8, value: u32) -> HdlcResult<u8> {
    u8::try_from(value)
        .ok()
        .filter(|v| WINDOW_SIZE_RANGE.contains(v))
        .ok_or_else(|| {
            HdlcError::MalformedNegotiation(format!(
                "Parameter 0x{:02X}: window size {} out of range",
                tag, value
            ))
        })
}
