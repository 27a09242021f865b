//! HDLC link layer module

pub mod address;
pub mod config;
pub mod control;
pub mod fcs;
pub mod format;
pub mod frame;
pub mod llc;
pub mod negotiation;
pub mod reassembly;
pub mod statistics;
pub mod stream;

pub use address::{reserved, HdlcAddress};
pub use config::LinkConfig;
pub use control::{Control, FrameCategory, SupervisoryKind, UnnumberedCommand, UnnumberedResponse};
pub use fcs::FcsCalc;
pub use format::FrameFormat;
pub use frame::{HdlcFrame, FLAG, MIN_FRAME_SIZE};
pub use llc::{LlcHeader, LlcPdu, LLC_REQUEST, LLC_RESPONSE};
pub use negotiation::HdlcParameters;
pub use reassembly::{reassemble, split_information, SegmentReassembler};
pub use statistics::HdlcStatistics;
pub use stream::{Decoded, HdlcStreamDecoder};
