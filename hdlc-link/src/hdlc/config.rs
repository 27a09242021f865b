//! Link configuration
//!
//! Everything a client needs to open an HDLC link: the address pair, the
//! parameters to propose in SNRM and whether APDUs travel behind an LLC
//! header. Deserializable so it can sit inside an application config file.

use crate::hdlc::address::{reserved, HdlcAddress};
use crate::hdlc::control::Control;
use crate::hdlc::frame::HdlcFrame;
use crate::hdlc::llc::LLC_REQUEST;
use crate::hdlc::negotiation::HdlcParameters;
use hdlc_core::{HdlcError, HdlcResult};
use serde::{Deserialize, Serialize};

const MAX_CLIENT_ADDRESS: u16 = 0x7F;
const MAX_SERVER_ADDRESS: u16 = 0x3FFF;

/// HDLC link configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Client (SAP) address, always one octet on the wire
    pub client_address: u16,
    /// Server upper address (logical device)
    pub server_upper_address: u16,
    /// Server lower address (physical device), omitted when `None`
    pub server_lower_address: Option<u16>,
    /// Parameters proposed in SNRM
    pub parameters: HdlcParameters,
    /// Prefix APDUs with the LLC request header
    pub use_llc_header: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            client_address: reserved::CLIENT_PUBLIC_CLIENT,
            server_upper_address: reserved::SERVER_UPPER_MANAGEMENT_LOGICAL_DEVICE,
            server_lower_address: None,
            parameters: HdlcParameters::default(),
            use_llc_header: true,
        }
    }
}

impl LinkConfig {
    /// Check addresses and proposed parameters
    pub fn validate(&self) -> HdlcResult<()> {
        if self.client_address > MAX_CLIENT_ADDRESS {
            return Err(HdlcError::RangeError(format!(
                "Client address 0x{:X} exceeds 0x{:X}",
                self.client_address, MAX_CLIENT_ADDRESS
            )));
        }
        if self.server_upper_address > MAX_SERVER_ADDRESS {
            return Err(HdlcError::RangeError(format!(
                "Server upper address 0x{:X} exceeds 0x{:X}",
                self.server_upper_address, MAX_SERVER_ADDRESS
            )));
        }
        if let Some(lower) = self.server_lower_address {
            if lower > MAX_SERVER_ADDRESS {
                return Err(HdlcError::RangeError(format!(
                    "Server lower address 0x{:X} exceeds 0x{:X}",
                    lower, MAX_SERVER_ADDRESS
                )));
            }
        }
        self.parameters.validate()
    }

    pub fn client_address(&self) -> HdlcResult<HdlcAddress> {
        if self.client_address > MAX_CLIENT_ADDRESS {
            return Err(HdlcError::RangeError(format!(
                "Client address 0x{:X} exceeds 0x{:X}",
                self.client_address, MAX_CLIENT_ADDRESS
            )));
        }
        HdlcAddress::encode(self.client_address, None)
    }

    pub fn server_address(&self) -> HdlcResult<HdlcAddress> {
        HdlcAddress::encode(self.server_upper_address, self.server_lower_address)
    }

    /// SNRM command (P set) proposing the configured parameters
    pub fn snrm_frame(&self) -> HdlcResult<HdlcFrame> {
        self.validate()?;
        HdlcFrame::snrm(self.server_address()?, self.client_address()?, &self.parameters)
    }

    /// DISC command (P set)
    pub fn disc_frame(&self) -> HdlcResult<HdlcFrame> {
        HdlcFrame::disc(self.server_address()?, self.client_address()?)
    }

    /// Information field for an outgoing APDU
    pub fn wrap_information(&self, apdu: &[u8]) -> Vec<u8> {
        if !self.use_llc_header {
            return apdu.to_vec();
        }
        let mut info = Vec::with_capacity(LLC_REQUEST.len() + apdu.len());
        info.extend_from_slice(&LLC_REQUEST);
        info.extend_from_slice(apdu);
        info
    }

    /// Single I frame carrying `apdu` with the given sequence numbers
    pub fn information_frame(
        &self,
        send_sequence: u8,
        receive_sequence: u8,
        apdu: &[u8],
    ) -> HdlcResult<HdlcFrame> {
        HdlcFrame::new(
            self.server_address()?,
            self.client_address()?,
            Control::information(send_sequence, receive_sequence, true)?,
            &self.wrap_information(apdu),
            false,
        )
    }
}
