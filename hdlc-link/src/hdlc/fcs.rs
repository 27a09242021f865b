//! Frame Check Sequence (FCS) calculation for HDLC
//!
//! CRC-16/X-25 as used by ISO/IEC 13239: polynomial 0x1021 processed
//! bit-reversed, initial value 0xFFFF, complemented result. The same engine
//! produces both the HCS and the FCS; on the wire the low octet goes first.

/// FCS calculation constants
const INITIAL_FCS: u16 = 0xFFFF;
const GOOD_FCS: u16 = 0xF0B8;
const KEY: u16 = 0x8408; // Bit-reversed 1021

/// Precomputed FCS table
static FCS_TABLE: once_cell::sync::Lazy<[u16; 256]> = once_cell::sync::Lazy::new(|| {
    let mut table = [0u16; 256];
    for (b, entry) in table.iter_mut().enumerate() {
        let mut v = b as u16;
        for _ in 0..8 {
            if (v & 1) == 1 {
                v = (v >> 1) ^ KEY;
            } else {
                v >>= 1;
            }
        }
        *entry = v;
    }
    table
});

/// Frame Check Sequence calculator
#[derive(Debug, Clone)]
pub struct FcsCalc {
    fcs_value: u16,
}

impl FcsCalc {
    /// Create a new FCS calculator
    pub fn new() -> Self {
        Self {
            fcs_value: INITIAL_FCS,
        }
    }

    /// Reset the FCS value to initial state
    pub fn reset(&mut self) {
        self.fcs_value = INITIAL_FCS;
    }

    /// Update the FCS value with a single byte
    pub fn update(&mut self, data: u8) {
        self.fcs_value =
            (self.fcs_value >> 8) ^ FCS_TABLE[((self.fcs_value ^ data as u16) & 0xFF) as usize];
    }

    /// Update the FCS value with multiple bytes
    pub fn update_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.update(byte);
        }
    }

    /// Finished check sequence (complemented register)
    pub fn value(&self) -> u16 {
        self.fcs_value ^ 0xFFFF
    }

    /// Get the FCS value as bytes (little-endian, as transmitted)
    pub fn fcs_value_bytes(&self) -> [u8; 2] {
        self.value().to_le_bytes()
    }

    /// Residue check after the received check sequence itself was fed in
    pub fn is_good(&self) -> bool {
        self.fcs_value == GOOD_FCS
    }
}

impl Default for FcsCalc {
    fn default() -> Self {
        Self::new()
    }
}

/// CRC-16/X-25 of `data`
pub fn crc(data: &[u8]) -> u16 {
    let mut calc = FcsCalc::new();
    calc.update_bytes(data);
    calc.value()
}

/// Check `data` against a check sequence in wire (little-endian) order
pub fn verify(data: &[u8], expected_le: [u8; 2]) -> bool {
    crc(data) == u16::from_le_bytes(expected_le)
}
