use std::fmt;
use thiserror::Error;

/// Which of the two CRC-protected regions failed verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckSequence {
    /// Header check sequence (format, addresses, control)
    Hcs,
    /// Frame check sequence (everything between the flags except itself)
    Fcs,
}

impl fmt::Display for CheckSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckSequence::Hcs => f.write_str("HCS"),
            CheckSequence::Fcs => f.write_str("FCS"),
        }
    }
}

/// Main error type for HDLC link layer operations
///
/// Decode errors fall into two groups:
/// - [`HdlcError::NotEnoughData`] never consumes input; the caller reads more
///   bytes and retries.
/// - [`HdlcError::BadFormat`], [`HdlcError::BadLengthOrTrailingFlag`],
///   [`HdlcError::CrcError`] and [`HdlcError::AddressError`] mean the candidate
///   opening flag did not start a valid frame and the stream must advance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HdlcError {
    #[error("Not enough data: need {needed} bytes, have {available}")]
    NotEnoughData { needed: usize, available: usize },

    #[error("Bad frame format field: 0x{0:04X}")]
    BadFormat(u16),

    #[error("Bad frame length or trailing flag: declared length {length}, found 0x{found:02X}")]
    BadLengthOrTrailingFlag { length: usize, found: u8 },

    #[error("{kind} mismatch: computed 0x{computed:04X}, received 0x{received:04X}")]
    CrcError {
        kind: CheckSequence,
        computed: u16,
        received: u16,
    },

    #[error("Address error: {0}")]
    AddressError(String),

    #[error("Value out of range: {0}")]
    RangeError(String),

    #[error("Malformed negotiation: {0}")]
    MalformedNegotiation(String),

    #[error("Incomplete segmentation: {frames} segment(s) received, last one still segmented")]
    IncompleteSegmentation { frames: usize },

    #[error("Invalid LLC header: {0}")]
    InvalidLlcHeader(String),
}

impl HdlcError {
    /// `true` only for [`HdlcError::NotEnoughData`]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, HdlcError::NotEnoughData { .. })
    }

    /// `true` when the receive stream has to skip the current opening flag
    pub fn requires_resync(&self) -> bool {
        matches!(
            self,
            HdlcError::BadFormat(_)
                | HdlcError::BadLengthOrTrailingFlag { .. }
                | HdlcError::CrcError { .. }
                | HdlcError::AddressError(_)
        )
    }
}

/// Result type alias for HDLC link layer operations
pub type HdlcResult<T> = Result<T, HdlcError>;
