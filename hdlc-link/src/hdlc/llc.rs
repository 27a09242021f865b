//! LLC sub-layer header carried in front of DLMS APDUs

use hdlc_core::{HdlcError, HdlcResult, Information};
use std::borrow::Cow;

/// LSAP used by DLMS/COSEM
pub const DLMS_LSAP: u8 = 0xE6;
/// Destination LSAP for broadcast
pub const BROADCAST_LSAP: u8 = 0xFF;
/// Source LSAP of a response
pub const RESPONSE_LSAP: u8 = 0xE7;

/// Logical Link Control (LLC) Request
pub const LLC_REQUEST: [u8; 3] = [0xE6, 0xE6, 0x00];

/// Logical Link Control (LLC) Response
pub const LLC_RESPONSE: [u8; 3] = [0xE6, 0xE7, 0x00];

/// Three-octet LLC header: destination LSAP, source LSAP, quality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlcHeader {
    destination_lsap: u8,
    source_lsap: u8,
}

impl LlcHeader {
    pub const REQUEST: LlcHeader = LlcHeader {
        destination_lsap: DLMS_LSAP,
        source_lsap: DLMS_LSAP,
    };
    pub const RESPONSE: LlcHeader = LlcHeader {
        destination_lsap: DLMS_LSAP,
        source_lsap: RESPONSE_LSAP,
    };

    /// Split an information field into its LLC header and the APDU
    pub fn parse(input: &[u8]) -> HdlcResult<(Self, &[u8])> {
        let [destination_lsap, source_lsap, quality] = match input {
            [a, b, c, ..] => [*a, *b, *c],
            _ => {
                return Err(HdlcError::InvalidLlcHeader(format!(
                    "Need 3 bytes, got {}",
                    input.len()
                )));
            }
        };
        if quality != 0x00 {
            return Err(HdlcError::InvalidLlcHeader(format!(
                "Quality must be 0x00, got 0x{:02X}",
                quality
            )));
        }
        if destination_lsap != DLMS_LSAP && destination_lsap != BROADCAST_LSAP {
            return Err(HdlcError::InvalidLlcHeader(format!(
                "Unexpected destination LSAP 0x{:02X}",
                destination_lsap
            )));
        }
        if source_lsap != DLMS_LSAP && source_lsap != RESPONSE_LSAP {
            return Err(HdlcError::InvalidLlcHeader(format!(
                "Unexpected source LSAP 0x{:02X}",
                source_lsap
            )));
        }
        Ok((
            Self {
                destination_lsap,
                source_lsap,
            },
            &input[3..],
        ))
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        [self.destination_lsap, self.source_lsap, 0x00]
    }

    pub fn is_broadcast(&self) -> bool {
        self.destination_lsap == BROADCAST_LSAP
    }

    pub fn is_response(&self) -> bool {
        self.source_lsap == RESPONSE_LSAP
    }
}

/// APDU prefixed with an LLC header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlcPdu {
    pub header: LlcHeader,
    pub apdu: Vec<u8>,
}

impl LlcPdu {
    pub fn request(apdu: impl Into<Vec<u8>>) -> Self {
        Self {
            header: LlcHeader::REQUEST,
            apdu: apdu.into(),
        }
    }

    pub fn response(apdu: impl Into<Vec<u8>>) -> Self {
        Self {
            header: LlcHeader::RESPONSE,
            apdu: apdu.into(),
        }
    }

    /// Parse a reassembled information payload
    pub fn parse(input: &[u8]) -> HdlcResult<Self> {
        let (header, apdu) = LlcHeader::parse(input)?;
        Ok(Self {
            header,
            apdu: apdu.to_vec(),
        })
    }
}

impl Information for LlcPdu {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        let mut bytes = Vec::with_capacity(3 + self.apdu.len());
        bytes.extend_from_slice(&self.header.to_bytes());
        bytes.extend_from_slice(&self.apdu);
        Cow::Owned(bytes)
    }

    fn len(&self) -> usize {
        3 + self.apdu.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_llc_header_unicast_command() {
        let data = [0xE6, 0xE6, 0x00, 0x01, 0x02, 0x03];
        let (header, remaining) = LlcHeader::parse(&data).unwrap();
        assert_eq!(header, LlcHeader::REQUEST);
        assert_eq!(remaining, &[0x01, 0x02, 0x03]);
        assert!(!header.is_response());
    }

    #[test]
    fn test_parse_llc_header_response_and_broadcast() {
        let (header, remaining) = LlcHeader::parse(&[0xE6, 0xE7, 0x00, 0xAA]).unwrap();
        assert!(header.is_response());
        assert_eq!(remaining, &[0xAA]);

        let (header, _) = LlcHeader::parse(&[0xFF, 0xE6, 0x00]).unwrap();
        assert!(header.is_broadcast());
    }

    #[test]
    fn test_parse_llc_header_errors() {
        for data in [
            &[0xE6, 0xE6, 0x01][..],
            &[0xAA, 0xE6, 0x00][..],
            &[0xE6, 0xAA, 0x00][..],
            &[0xE6, 0xE6][..],
        ] {
            assert!(matches!(
                LlcHeader::parse(data),
                Err(HdlcError::InvalidLlcHeader(_))
            ));
        }
    }

    #[test]
    fn test_llc_pdu_information() {
        let pdu = LlcPdu::request(vec![0x60, 0x1D]);
        assert_eq!(Information::len(&pdu), 5);
        assert_eq!(&*pdu.as_bytes(), &[0xE6, 0xE6, 0x00, 0x60, 0x1D]);
        assert_eq!(LlcPdu::parse(&pdu.as_bytes()).unwrap(), pdu);
        assert_eq!(LLC_RESPONSE, LlcHeader::RESPONSE.to_bytes());
        assert_eq!(LLC_REQUEST, LlcHeader::REQUEST.to_bytes());
    }
}
