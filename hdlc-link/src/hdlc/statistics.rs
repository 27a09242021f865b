//! HDLC statistics collection

use hdlc_core::{CheckSequence, HdlcError};

/// HDLC receive statistics
///
/// Link-quality counters maintained by the stream decoder. CRC failures are
/// split by check sequence so a noisy line (FCS errors on long frames) can be
/// told apart from false flags (HCS errors right after a spurious 0x7E).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HdlcStatistics {
    /// Total number of frames decoded
    pub frames_received: u64,
    /// Number of candidate frames rejected due to errors
    pub frames_rejected: u64,
    /// Number of FCS (Frame Check Sequence) errors
    pub fcs_errors: u64,
    /// Number of HCS (Header Check Sequence) errors
    pub hcs_errors: u64,
    /// Number of candidate flags not followed by a Type 3 format field
    pub format_errors: u64,
    /// Octets dropped while searching for an opening flag
    pub octets_discarded: u64,
}

impl HdlcStatistics {
    /// Create new statistics with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all statistics counters
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn increment_frames_received(&mut self) {
        self.frames_received = self.frames_received.saturating_add(1);
    }

    pub fn add_octets_discarded(&mut self, count: usize) {
        self.octets_discarded = self.octets_discarded.saturating_add(count as u64);
    }

    /// Count a rejected candidate frame under its error class
    pub fn record_rejection(&mut self, error: &HdlcError) {
        match error {
            HdlcError::BadFormat(_) => {
                self.format_errors = self.format_errors.saturating_add(1);
                return;
            }
            HdlcError::CrcError {
                kind: CheckSequence::Hcs,
                ..
            } => self.hcs_errors = self.hcs_errors.saturating_add(1),
            HdlcError::CrcError {
                kind: CheckSequence::Fcs,
                ..
            } => self.fcs_errors = self.fcs_errors.saturating_add(1),
            _ => {}
        }
        self.frames_rejected = self.frames_rejected.saturating_add(1);
    }

    /// Fraction of candidate frames that failed a check sequence
    pub fn crc_error_rate(&self) -> f64 {
        let total = self.frames_received + self.frames_rejected;
        if total == 0 {
            0.0
        } else {
            (self.fcs_errors + self.hcs_errors) as f64 / total as f64
        }
    }
}
