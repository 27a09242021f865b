//! Core types for the DLMS/COSEM HDLC link layer
//!
//! This crate provides the error taxonomy shared by every HDLC component and
//! the [`Information`] contract implemented by anything that can occupy the
//! information field of a frame.

pub mod error;
pub mod info;

pub use error::{CheckSequence, HdlcError, HdlcResult};
pub use info::Information;
