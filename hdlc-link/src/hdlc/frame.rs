//! HDLC frame structure and encoding/decoding
//!
//! ```text
//! 7E | format(2) | DA(1,2,4) | SA(1,2,4) | control | [HCS(2)] | info | FCS(2) | 7E
//! ```
//!
//! The HCS is present exactly when the information field is non-empty.
//! Decoded frames own a copy of their information field.

use crate::hdlc::address::HdlcAddress;
use crate::hdlc::control::{Control, SupervisoryKind};
use crate::hdlc::fcs::{self, FcsCalc};
use crate::hdlc::format::FrameFormat;
use crate::hdlc::negotiation::HdlcParameters;
use bytes::{BufMut, BytesMut};
use hdlc_core::{CheckSequence, HdlcError, HdlcResult, Information};
use std::fmt;

/// HDLC frame flag
pub const FLAG: u8 = 0x7E;

/// Smallest complete frame: flags, format, one-octet addresses, control, FCS
pub const MIN_FRAME_SIZE: usize = 9;

const FORMAT_SIZE: usize = 2;
const CONTROL_SIZE: usize = 1;
const CHECK_SIZE: usize = 2;

/// HDLC frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdlcFrame {
    format: FrameFormat,
    destination: HdlcAddress,
    source: HdlcAddress,
    control: Control,
    hcs: Option<[u8; 2]>,
    information_field: Vec<u8>,
    fcs: [u8; 2],
}

impl HdlcFrame {
    /// Create a new HDLC frame
    ///
    /// Computes the length, HCS and FCS up front. Fails with
    /// [`HdlcError::RangeError`] when the frame would not fit the 11-bit
    /// length field.
    pub fn new(
        destination: HdlcAddress,
        source: HdlcAddress,
        control: Control,
        information: &[u8],
        segmented: bool,
    ) -> HdlcResult<Self> {
        let information_field = information.to_vec();

        let mut length = FORMAT_SIZE
            + destination.byte_length()
            + source.byte_length()
            + CONTROL_SIZE
            + CHECK_SIZE;
        if !information_field.is_empty() {
            length += CHECK_SIZE + information_field.len();
        }
        let length = u16::try_from(length).map_err(|_| {
            HdlcError::RangeError(format!("Frame length {} does not fit 11 bits", length))
        })?;
        let format = FrameFormat::new(segmented, length)?;

        let mut calc = FcsCalc::new();
        calc.update_bytes(&format.to_wire());
        calc.update_bytes(destination.octets());
        calc.update_bytes(source.octets());
        calc.update(control.to_octet());

        let hcs = if information_field.is_empty() {
            None
        } else {
            let hcs = calc.fcs_value_bytes();
            calc.update_bytes(&hcs);
            calc.update_bytes(&information_field);
            Some(hcs)
        };
        let fcs = calc.fcs_value_bytes();

        Ok(Self {
            format,
            destination,
            source,
            control,
            hcs,
            information_field,
            fcs,
        })
    }

    /// Create a frame from any [`Information`] payload
    pub fn with_information<I: Information + ?Sized>(
        destination: HdlcAddress,
        source: HdlcAddress,
        control: Control,
        information: &I,
        segmented: bool,
    ) -> HdlcResult<Self> {
        Self::new(destination, source, control, &information.as_bytes(), segmented)
    }

    /// Create a new information frame with sequence numbers
    pub fn information(
        destination: HdlcAddress,
        source: HdlcAddress,
        send_sequence: u8,
        receive_sequence: u8,
        poll_final: bool,
        information: &[u8],
        segmented: bool,
    ) -> HdlcResult<Self> {
        let control = Control::information(send_sequence, receive_sequence, poll_final)?;
        Self::new(destination, source, control, information, segmented)
    }

    /// SNRM command proposing `parameters`
    ///
    /// Parameters equal to the defaults are omitted, so a default proposal
    /// yields an SNRM without information field.
    pub fn snrm(
        destination: HdlcAddress,
        source: HdlcAddress,
        parameters: &HdlcParameters,
    ) -> HdlcResult<Self> {
        Self::with_information(destination, source, Control::SNRM, parameters, false)
    }

    /// UA response carrying the responder's parameters
    pub fn ua(
        destination: HdlcAddress,
        source: HdlcAddress,
        parameters: &HdlcParameters,
    ) -> HdlcResult<Self> {
        Self::with_information(destination, source, Control::UA, parameters, false)
    }

    /// DISC command
    pub fn disc(destination: HdlcAddress, source: HdlcAddress) -> HdlcResult<Self> {
        Self::new(destination, source, Control::DISC, &[], false)
    }

    /// RR acknowledging everything up to `receive_sequence - 1`
    pub fn receive_ready(
        destination: HdlcAddress,
        source: HdlcAddress,
        receive_sequence: u8,
    ) -> HdlcResult<Self> {
        let control = Control::supervisory(SupervisoryKind::ReceiveReady, receive_sequence, true)?;
        Self::new(destination, source, control, &[], false)
    }

    /// Decode one HDLC frame from the start of `buf`
    ///
    /// `buf[0]` must be the opening flag. Returns the frame and the number of
    /// octets it occupies including both flags. [`HdlcError::NotEnoughData`]
    /// means the frame may still be completed by more input; every other
    /// error means `buf[0]` did not open a valid frame.
    pub fn decode(buf: &[u8]) -> HdlcResult<(Self, usize)> {
        if buf.len() < 1 + FORMAT_SIZE {
            return Err(HdlcError::NotEnoughData {
                needed: MIN_FRAME_SIZE,
                available: buf.len(),
            });
        }
        if buf[0] != FLAG {
            return Err(HdlcError::BadFormat(u16::from_be_bytes([buf[0], buf[1]])));
        }
        let format = FrameFormat::from_wire([buf[1], buf[2]])?;

        let length = format.length() as usize;
        let total = length + 2;
        if total > buf.len() {
            return Err(HdlcError::NotEnoughData {
                needed: total,
                available: buf.len(),
            });
        }
        if buf[length + 1] != FLAG || length < MIN_FRAME_SIZE - 2 {
            return Err(HdlcError::BadLengthOrTrailingFlag {
                length,
                found: buf[length + 1],
            });
        }

        let body = &buf[1..=length];
        let mut pos = FORMAT_SIZE;

        let (destination, used) = HdlcAddress::parse(&body[pos..])?;
        pos += used;
        let (source, used) = HdlcAddress::parse(&body[pos..])?;
        pos += used;

        let control = match body.get(pos) {
            Some(&octet) if pos + CONTROL_SIZE + CHECK_SIZE <= body.len() => {
                Control::from_octet(octet)
            }
            _ => {
                return Err(HdlcError::BadLengthOrTrailingFlag {
                    length,
                    found: buf[length + 1],
                });
            }
        };
        pos += CONTROL_SIZE;

        let header = &body[..pos];
        let remaining = body.len() - pos;

        let (hcs, information_field) = match remaining {
            CHECK_SIZE => (None, Vec::new()),
            r if r > 2 * CHECK_SIZE => {
                let hcs = [body[pos], body[pos + 1]];
                check(CheckSequence::Hcs, header, hcs)?;
                let information = &body[pos + CHECK_SIZE..body.len() - CHECK_SIZE];
                (Some(hcs), information.to_vec())
            }
            _ => {
                return Err(HdlcError::BadLengthOrTrailingFlag {
                    length,
                    found: buf[length + 1],
                });
            }
        };

        let fcs = [body[body.len() - 2], body[body.len() - 1]];
        check(CheckSequence::Fcs, &body[..body.len() - CHECK_SIZE], fcs)?;

        let frame = Self {
            format,
            destination,
            source,
            control,
            hcs,
            information_field,
            fcs,
        };
        log::trace!("Decoded {} from {:02X?}", frame, &buf[..total]);
        Ok((frame, total))
    }

    /// Encode frame to bytes, flags included
    pub fn encode(&self) -> Vec<u8> {
        let mut result = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut result);
        result.to_vec()
    }

    /// Append the encoded frame to `buf`
    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        buf.put_u8(FLAG);
        buf.put_slice(&self.format.to_wire());
        buf.put_slice(self.destination.octets());
        buf.put_slice(self.source.octets());
        buf.put_u8(self.control.to_octet());
        if let Some(hcs) = self.hcs {
            buf.put_slice(&hcs);
            buf.put_slice(&self.information_field);
        }
        buf.put_slice(&self.fcs);
        buf.put_u8(FLAG);
    }

    /// Octets on the wire including both flags
    pub fn encoded_len(&self) -> usize {
        self.format.length() as usize + 2
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Get destination address
    pub fn destination(&self) -> HdlcAddress {
        self.destination
    }

    /// Get source address
    pub fn source(&self) -> HdlcAddress {
        self.source
    }

    pub fn control(&self) -> Control {
        self.control
    }

    /// Get information field
    pub fn information_field(&self) -> &[u8] {
        &self.information_field
    }

    /// Take ownership of the information field
    pub fn into_information_field(self) -> Vec<u8> {
        self.information_field
    }

    /// Check if frame is segmented
    pub fn is_segmented(&self) -> bool {
        self.format.is_segmented()
    }

    /// Declared frame length (octets between the flags)
    pub fn length(&self) -> usize {
        self.format.length() as usize
    }

    /// Header check sequence in wire order, absent without information field
    pub fn hcs(&self) -> Option<[u8; 2]> {
        self.hcs
    }

    /// Frame check sequence in wire order
    pub fn fcs(&self) -> [u8; 2] {
        self.fcs
    }
}

impl fmt::Display for HdlcFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HDLC Frame: control={}, src={}, dst={}, len={}{}",
            self.control,
            self.source,
            self.destination,
            self.length(),
            if self.is_segmented() { ", segmented" } else { "" }
        )
    }
}

fn check(kind: CheckSequence, data: &[u8], received: [u8; 2]) -> HdlcResult<()> {
    if fcs::verify(data, received) {
        return Ok(());
    }
    Err(HdlcError::CrcError {
        kind,
        computed: fcs::crc(data),
        received: u16::from_le_bytes(received),
    })
}
