//! HDLC receive stream decoder
//!
//! Turns an append-only byte stream into frames. Octets that cannot start a
//! Type 3 frame are dropped; a candidate flag that fails to decode is skipped
//! and the search resumes at the next 0x7E, so a corrupted frame never takes
//! the following one down with it.

use crate::hdlc::format::FORMAT_TYPE_3;
use crate::hdlc::frame::{HdlcFrame, FLAG, MIN_FRAME_SIZE};
use crate::hdlc::statistics::HdlcStatistics;
use bytes::{Buf, BufMut, BytesMut};
use hdlc_core::HdlcError;

/// Outcome of one decode attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A complete frame was removed from the buffer
    Frame(HdlcFrame),
    /// The buffer holds no complete frame yet; nothing was consumed
    Incomplete,
    /// A candidate frame was rejected and its opening flag dropped
    Discarded(HdlcError),
}

/// HDLC stream decoder
///
/// Never blocks and performs no I/O: the transport pushes received octets
/// with [`HdlcStreamDecoder::push_bytes`] and the session pops frames.
#[derive(Debug, Default)]
pub struct HdlcStreamDecoder {
    buffer: BytesMut,
    statistics: HdlcStatistics,
    // The closing flag of the last frame may double as the next opening flag
    shared_flag: bool,
}

impl HdlcStreamDecoder {
    /// Create a new decoder with an empty receive buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with room for `capacity` octets
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Append received octets
    pub fn push_bytes(&mut self, data: &[u8]) {
        log::trace!("HDLC rx {:02X?}", data);
        self.buffer.extend_from_slice(data);
    }

    /// Octets not yet consumed
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Drop everything buffered, e.g. after the transport reconnects
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.shared_flag = false;
    }

    /// Get statistics
    pub fn statistics(&self) -> &HdlcStatistics {
        &self.statistics
    }

    /// Clear statistics
    pub fn clear_statistics(&mut self) {
        self.statistics.clear();
    }

    /// Try to take the next frame off the buffer
    pub fn poll(&mut self) -> Decoded {
        if let Some(decoded) = self.poll_shared_flag() {
            return decoded;
        }

        loop {
            self.skip_to_flag();
            if self.buffer.len() < MIN_FRAME_SIZE {
                return Decoded::Incomplete;
            }

            match HdlcFrame::decode(&self.buffer) {
                Ok((frame, used)) => {
                    self.buffer.advance(used);
                    return self.accept(frame);
                }
                Err(e) if e.is_incomplete() => return Decoded::Incomplete,
                Err(e @ HdlcError::BadFormat(_)) => {
                    log::debug!("Skipping false HDLC flag: {}", e);
                    self.statistics.record_rejection(&e);
                    self.buffer.advance(1);
                }
                Err(e) => {
                    log::info!("Discarding HDLC frame candidate: {}", e);
                    self.statistics.record_rejection(&e);
                    self.buffer.advance(1);
                    return Decoded::Discarded(e);
                }
            }
        }
    }

    /// Next frame, or `None` when no complete frame is available right now
    pub fn next_frame(&mut self) -> Option<HdlcFrame> {
        match self.poll() {
            Decoded::Frame(frame) => Some(frame),
            Decoded::Incomplete | Decoded::Discarded(_) => None,
        }
    }

    /// Decode every complete frame currently buffered
    pub fn drain_frames(&mut self) -> Vec<HdlcFrame> {
        let mut frames = Vec::new();
        loop {
            match self.poll() {
                Decoded::Frame(frame) => frames.push(frame),
                Decoded::Discarded(_) => continue,
                Decoded::Incomplete => return frames,
            }
        }
    }

    fn accept(&mut self, frame: HdlcFrame) -> Decoded {
        log::debug!("Received {}", frame);
        self.statistics.increment_frames_received();
        self.shared_flag = true;
        Decoded::Frame(frame)
    }

    // Drops octets before the next flag and collapses runs of flags
    fn skip_to_flag(&mut self) {
        let start = self
            .buffer
            .iter()
            .position(|&b| b == FLAG)
            .unwrap_or(self.buffer.len());
        let mut skip = start;
        while skip + 1 < self.buffer.len() && self.buffer[skip + 1] == FLAG {
            skip += 1;
        }
        if start > 0 {
            log::debug!("Dropping {} octet(s) before HDLC flag", start);
            self.statistics.add_octets_discarded(start);
            self.shared_flag = false;
        }
        self.buffer.advance(skip);
    }

    // A frame that directly follows the previous closing flag
    fn poll_shared_flag(&mut self) -> Option<Decoded> {
        if !self.shared_flag {
            return None;
        }
        let first = *self.buffer.first()?;
        if first == FLAG || first >> 4 != FORMAT_TYPE_3 {
            self.shared_flag = false;
            return None;
        }

        let mut candidate = BytesMut::with_capacity(self.buffer.len() + 1);
        candidate.put_u8(FLAG);
        candidate.extend_from_slice(&self.buffer);
        if candidate.len() < MIN_FRAME_SIZE {
            return Some(Decoded::Incomplete);
        }

        match HdlcFrame::decode(&candidate) {
            Ok((frame, used)) => {
                self.buffer.advance(used - 1);
                Some(self.accept(frame))
            }
            // A flag already waiting behind the candidate wins over a
            // candidate that still needs more input
            Err(e) if e.is_incomplete() && !self.buffer.contains(&FLAG) => {
                Some(Decoded::Incomplete)
            }
            Err(_) => {
                self.shared_flag = false;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNRM: [u8; 9] = [0x7E, 0xA0, 0x07, 0x03, 0x21, 0x93, 0x0F, 0x01, 0x7E];

    #[test]
    fn test_single_frame() {
        let mut decoder = HdlcStreamDecoder::new();
        decoder.push_bytes(&SNRM);
        let frame = decoder.next_frame().unwrap();
        assert_eq!(frame.control().to_octet(), 0x93);
        assert!(decoder.buffered().is_empty());
        assert_eq!(decoder.statistics().frames_received, 1);
    }

    #[test]
    fn test_partial_frame() {
        let mut decoder = HdlcStreamDecoder::new();
        decoder.push_bytes(&SNRM[..5]);
        assert_eq!(decoder.poll(), Decoded::Incomplete);
        assert_eq!(decoder.buffered(), &SNRM[..5]);
        decoder.push_bytes(&SNRM[5..]);
        assert!(decoder.next_frame().is_some());
    }

    #[test]
    fn test_leading_garbage() {
        let mut decoder = HdlcStreamDecoder::new();
        decoder.push_bytes(&[0x00, 0x13, 0xA0]);
        decoder.push_bytes(&SNRM);
        assert!(decoder.next_frame().is_some());
        assert!(decoder.buffered().is_empty());
        assert_eq!(decoder.statistics().octets_discarded, 3);
    }

    #[test]
    fn test_only_garbage() {
        let mut decoder = HdlcStreamDecoder::new();
        decoder.push_bytes(&[0x01; 32]);
        assert_eq!(decoder.poll(), Decoded::Incomplete);
        assert!(decoder.buffered().is_empty());
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut decoder = HdlcStreamDecoder::new();
        decoder.push_bytes(&SNRM);
        decoder.push_bytes(&SNRM);
        assert_eq!(decoder.drain_frames().len(), 2);
        assert!(decoder.buffered().is_empty());
    }

    #[test]
    fn test_shared_flag() {
        let mut decoder = HdlcStreamDecoder::new();
        decoder.push_bytes(&SNRM);
        decoder.push_bytes(&SNRM[1..]);
        let frames = decoder.drain_frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], frames[1]);
        assert!(decoder.buffered().is_empty());
    }

    #[test]
    fn test_noise_octet_between_frames() {
        let mut decoder = HdlcStreamDecoder::new();
        decoder.push_bytes(&SNRM);
        decoder.push_bytes(&[0xA5]);
        decoder.push_bytes(&SNRM);
        assert_eq!(decoder.drain_frames().len(), 2);
        assert!(decoder.buffered().is_empty());
        assert_eq!(decoder.statistics().octets_discarded, 1);
    }

    #[test]
    fn test_noise_octet_before_late_frame() {
        let mut decoder = HdlcStreamDecoder::new();
        decoder.push_bytes(&SNRM);
        decoder.push_bytes(&[0xA5]);
        assert!(decoder.next_frame().is_some());
        assert_eq!(decoder.poll(), Decoded::Incomplete);

        decoder.push_bytes(&SNRM[..4]);
        assert_eq!(decoder.poll(), Decoded::Incomplete);
        decoder.push_bytes(&SNRM[4..]);
        assert!(decoder.next_frame().is_some());
        assert!(decoder.buffered().is_empty());
    }

    #[test]
    fn test_flag_fill_between_frames() {
        let mut decoder = HdlcStreamDecoder::new();
        decoder.push_bytes(&[0x7E, 0x7E, 0x7E]);
        decoder.push_bytes(&SNRM);
        assert!(decoder.next_frame().is_some());
        assert_eq!(decoder.statistics().format_errors, 0);
    }

    #[test]
    fn test_crc_error_then_recovery() {
        let mut corrupted = SNRM;
        corrupted[6] ^= 0x01;
        let mut decoder = HdlcStreamDecoder::new();
        decoder.push_bytes(&corrupted);
        decoder.push_bytes(&SNRM);

        assert!(matches!(
            decoder.poll(),
            Decoded::Discarded(HdlcError::CrcError { .. })
        ));
        assert!(decoder.next_frame().is_some());
        assert!(decoder.buffered().is_empty());
        assert_eq!(decoder.statistics().fcs_errors, 1);
        assert_eq!(decoder.statistics().frames_rejected, 1);
    }

    #[test]
    fn test_clear() {
        let mut decoder = HdlcStreamDecoder::with_capacity(64);
        decoder.push_bytes(&SNRM[..4]);
        decoder.clear();
        assert!(decoder.buffered().is_empty());
        decoder.clear_statistics();
        assert_eq!(decoder.statistics(), &HdlcStatistics::default());
    }
}
