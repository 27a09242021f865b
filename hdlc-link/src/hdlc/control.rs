//! HDLC control field
//!
//! ```text
//! I frame:  N(R) N(R) N(R) P/F N(S) N(S) N(S) 0
//! S frame:  N(R) N(R) N(R) P/F S    S    0    1
//! U frame:  M    M    M    P/F M    M    1    1
//! ```

use hdlc_core::{HdlcError, HdlcResult};
use std::fmt;

const PF_BIT: u8 = 0x10;
const NS_MASK: u8 = 0x0E;
const NR_MASK: u8 = 0xE0;

/// Frame category selected by the low bits of the control octet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameCategory {
    Information,
    Supervisory,
    Unnumbered,
}

/// Supervisory function (bits 2..3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupervisoryKind {
    ReceiveReady,
    ReceiveNotReady,
    Reject,
    SelectiveReject,
}

impl SupervisoryKind {
    fn from_bits(control: u8) -> Self {
        match control & 0x0F {
            0x01 => SupervisoryKind::ReceiveReady,
            0x05 => SupervisoryKind::ReceiveNotReady,
            0x09 => SupervisoryKind::Reject,
            _ => SupervisoryKind::SelectiveReject,
        }
    }

    fn bits(&self) -> u8 {
        match self {
            SupervisoryKind::ReceiveReady => 0x01,
            SupervisoryKind::ReceiveNotReady => 0x05,
            SupervisoryKind::Reject => 0x09,
            SupervisoryKind::SelectiveReject => 0x0D,
        }
    }
}

/// Unnumbered commands (modifier codes with the P bit clear)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnnumberedCommand {
    Snrm,
    Snrme,
    Sarm,
    Sarme,
    Sabm,
    Sabme,
    Disc,
    Up,
    Sim,
    Sm,
    Rset,
    Ui,
    Xid,
    Test,
    Uih,
}

impl UnnumberedCommand {
    /// Control octet with the poll bit clear
    pub fn code(&self) -> u8 {
        match self {
            UnnumberedCommand::Ui => 0x03,
            UnnumberedCommand::Sim => 0x07,
            UnnumberedCommand::Sarm => 0x0F,
            UnnumberedCommand::Up => 0x23,
            UnnumberedCommand::Sabm => 0x2F,
            UnnumberedCommand::Disc => 0x43,
            UnnumberedCommand::Sarme => 0x4F,
            UnnumberedCommand::Sabme => 0x6F,
            UnnumberedCommand::Snrm => 0x83,
            UnnumberedCommand::Rset => 0x8F,
            UnnumberedCommand::Xid => 0xAF,
            UnnumberedCommand::Sm => 0xC3,
            UnnumberedCommand::Snrme => 0xCF,
            UnnumberedCommand::Test => 0xE3,
            UnnumberedCommand::Uih => 0xEF,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x03 => UnnumberedCommand::Ui,
            0x07 => UnnumberedCommand::Sim,
            0x0F => UnnumberedCommand::Sarm,
            0x23 => UnnumberedCommand::Up,
            0x2F => UnnumberedCommand::Sabm,
            0x43 => UnnumberedCommand::Disc,
            0x4F => UnnumberedCommand::Sarme,
            0x6F => UnnumberedCommand::Sabme,
            0x83 => UnnumberedCommand::Snrm,
            0x8F => UnnumberedCommand::Rset,
            0xAF => UnnumberedCommand::Xid,
            0xC3 => UnnumberedCommand::Sm,
            0xCF => UnnumberedCommand::Snrme,
            0xE3 => UnnumberedCommand::Test,
            0xEF => UnnumberedCommand::Uih,
            _ => return None,
        })
    }
}

/// Unnumbered responses (modifier codes with the F bit clear)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnnumberedResponse {
    Ua,
    Frmr,
    Dm,
    Rd,
    Rim,
    Ui,
    Xid,
    Test,
    Uih,
}

impl UnnumberedResponse {
    /// Control octet with the final bit clear
    pub fn code(&self) -> u8 {
        match self {
            UnnumberedResponse::Ui => 0x03,
            UnnumberedResponse::Rim => 0x07,
            UnnumberedResponse::Dm => 0x0F,
            UnnumberedResponse::Rd => 0x43,
            UnnumberedResponse::Ua => 0x63,
            UnnumberedResponse::Frmr => 0x87,
            UnnumberedResponse::Xid => 0xAF,
            UnnumberedResponse::Test => 0xE3,
            UnnumberedResponse::Uih => 0xEF,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x03 => UnnumberedResponse::Ui,
            0x07 => UnnumberedResponse::Rim,
            0x0F => UnnumberedResponse::Dm,
            0x43 => UnnumberedResponse::Rd,
            0x63 => UnnumberedResponse::Ua,
            0x87 => UnnumberedResponse::Frmr,
            0xAF => UnnumberedResponse::Xid,
            0xE3 => UnnumberedResponse::Test,
            0xEF => UnnumberedResponse::Uih,
            _ => return None,
        })
    }
}

/// HDLC control field
///
/// Every octet maps to exactly one variant, so `from_octet` / `to_octet`
/// round-trip for all 256 values. Unnumbered frames keep their raw modifier
/// (the octet with P/F cleared) because SIM/RIM, SARM/DM and DISC/RD share
/// codes and only the frame direction tells them apart.
///
/// Variants can be matched but not built outside this crate; use
/// [`Control::information`], [`Control::supervisory`], [`Control::command`]
/// or [`Control::response`], which keep every field in range.
///
/// ```compile_fail
/// use hdlc_link::Control;
///
/// let control = Control::Information { ns: 9, nr: 0, pf: false };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    #[non_exhaustive]
    Information { ns: u8, nr: u8, pf: bool },
    #[non_exhaustive]
    Supervisory { kind: SupervisoryKind, nr: u8, pf: bool },
    #[non_exhaustive]
    Unnumbered { modifier: u8, pf: bool },
}

impl Control {
    /// SNRM with the poll bit set (0x93)
    pub const SNRM: Control = Control::Unnumbered {
        modifier: 0x83,
        pf: true,
    };
    /// UA with the final bit set (0x73)
    pub const UA: Control = Control::Unnumbered {
        modifier: 0x63,
        pf: true,
    };
    /// DISC with the poll bit set (0x53)
    pub const DISC: Control = Control::Unnumbered {
        modifier: 0x43,
        pf: true,
    };
    /// DM with the final bit set (0x1F)
    pub const DM: Control = Control::Unnumbered {
        modifier: 0x0F,
        pf: true,
    };

    /// Classify a control octet
    pub fn from_octet(control: u8) -> Self {
        let pf = control & PF_BIT != 0;
        if control & 0x01 == 0 {
            Control::Information {
                ns: (control >> 1) & 0x07,
                nr: (control >> 5) & 0x07,
                pf,
            }
        } else if control & 0x03 == 0x01 {
            Control::Supervisory {
                kind: SupervisoryKind::from_bits(control),
                nr: (control >> 5) & 0x07,
                pf,
            }
        } else {
            Control::Unnumbered {
                modifier: control & !PF_BIT,
                pf,
            }
        }
    }

    /// Encode to the wire octet
    pub fn to_octet(&self) -> u8 {
        match *self {
            Control::Information { ns, nr, pf } => {
                ((nr & 0x07) << 5) | pf_bit(pf) | ((ns & 0x07) << 1)
            }
            Control::Supervisory { kind, nr, pf } => ((nr & 0x07) << 5) | pf_bit(pf) | kind.bits(),
            Control::Unnumbered { modifier, pf } => (modifier & !PF_BIT) | 0x03 | pf_bit(pf),
        }
    }

    /// Information frame control, sequence numbers modulo 8
    pub fn information(ns: u8, nr: u8, pf: bool) -> HdlcResult<Self> {
        check_sequence("N(S)", ns)?;
        check_sequence("N(R)", nr)?;
        Ok(Control::Information { ns, nr, pf })
    }

    /// Supervisory frame control
    pub fn supervisory(kind: SupervisoryKind, nr: u8, pf: bool) -> HdlcResult<Self> {
        check_sequence("N(R)", nr)?;
        Ok(Control::Supervisory { kind, nr, pf })
    }

    /// Unnumbered command control
    pub fn command(command: UnnumberedCommand, poll: bool) -> Self {
        Control::Unnumbered {
            modifier: command.code(),
            pf: poll,
        }
    }

    /// Unnumbered response control
    pub fn response(response: UnnumberedResponse, final_bit: bool) -> Self {
        Control::Unnumbered {
            modifier: response.code(),
            pf: final_bit,
        }
    }

    pub fn category(&self) -> FrameCategory {
        match self {
            Control::Information { .. } => FrameCategory::Information,
            Control::Supervisory { .. } => FrameCategory::Supervisory,
            Control::Unnumbered { .. } => FrameCategory::Unnumbered,
        }
    }

    /// I frames and UI/UIH frames carry application data
    pub fn is_information_bearing(&self) -> bool {
        match self {
            Control::Information { .. } => true,
            Control::Unnumbered { modifier, .. } => {
                *modifier == UnnumberedCommand::Ui.code()
                    || *modifier == UnnumberedCommand::Uih.code()
            }
            Control::Supervisory { .. } => false,
        }
    }

    /// Poll/final bit; unassigned unnumbered modifiers report `false`
    pub fn p_f_set(&self) -> bool {
        match *self {
            Control::Information { pf, .. } | Control::Supervisory { pf, .. } => pf,
            Control::Unnumbered { pf, .. } => {
                pf && (self.as_command().is_some() || self.as_response().is_some())
            }
        }
    }

    /// Send sequence number of an I frame
    pub fn ns(&self) -> Option<u8> {
        match self {
            Control::Information { ns, .. } => Some(*ns),
            _ => None,
        }
    }

    /// Receive sequence number of an I or S frame
    pub fn nr(&self) -> Option<u8> {
        match self {
            Control::Information { nr, .. } | Control::Supervisory { nr, .. } => Some(*nr),
            Control::Unnumbered { .. } => None,
        }
    }

    pub fn supervisory_kind(&self) -> Option<SupervisoryKind> {
        match self {
            Control::Supervisory { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Interpret an unnumbered control as a command
    pub fn as_command(&self) -> Option<UnnumberedCommand> {
        match self {
            Control::Unnumbered { modifier, .. } => UnnumberedCommand::from_code(*modifier),
            _ => None,
        }
    }

    /// Interpret an unnumbered control as a response
    pub fn as_response(&self) -> Option<UnnumberedResponse> {
        match self {
            Control::Unnumbered { modifier, .. } => UnnumberedResponse::from_code(*modifier),
            _ => None,
        }
    }

    /// N(S) incremented modulo 8, every other bit unchanged
    ///
    /// Only meaningful for I frames; other categories get the same bit-level
    /// transform and callers are expected to gate on [`Control::category`].
    pub fn next_send(&self) -> Self {
        let c = self.to_octet();
        Control::from_octet((c & 0xF0) | (c.wrapping_add(0x02) & NS_MASK) | (c & 0x01))
    }

    /// N(R) incremented modulo 8 with the P/F bit forced on
    pub fn next_receive(&self) -> Self {
        let c = self.to_octet();
        Control::from_octet((c.wrapping_add(0x20) & NR_MASK) | PF_BIT | (c & 0x0F))
    }
}

impl From<u8> for Control {
    fn from(control: u8) -> Self {
        Control::from_octet(control)
    }
}

impl From<Control> for u8 {
    fn from(control: Control) -> Self {
        control.to_octet()
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Information { ns, nr, pf } => {
                write!(f, "I(ns={}, nr={}{})", ns, nr, if *pf { ", P/F" } else { "" })
            }
            Control::Supervisory { kind, nr, pf } => {
                write!(f, "{:?}(nr={}{})", kind, nr, if *pf { ", P/F" } else { "" })
            }
            Control::Unnumbered { .. } => match (self.as_command(), self.as_response()) {
                (Some(command), Some(response)) if shares_code_across_directions(command) => {
                    write!(f, "{:?}/{:?}(0x{:02X})", command, response, self.to_octet())
                }
                (Some(command), _) => write!(f, "{:?}(0x{:02X})", command, self.to_octet()),
                (None, Some(response)) => write!(f, "{:?}(0x{:02X})", response, self.to_octet()),
                (None, None) => write!(f, "U(0x{:02X})", self.to_octet()),
            },
        }
    }
}

// SIM/RIM, SARM/DM and DISC/RD
fn shares_code_across_directions(command: UnnumberedCommand) -> bool {
    matches!(
        command,
        UnnumberedCommand::Sim | UnnumberedCommand::Sarm | UnnumberedCommand::Disc
    )
}

fn pf_bit(pf: bool) -> u8 {
    if pf { PF_BIT } else { 0 }
}

fn check_sequence(name: &str, value: u8) -> HdlcResult<()> {
    if value > 7 {
        return Err(HdlcError::RangeError(format!(
            "{} must be in 0..=7, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_controls_as_set_keys() {
        let mut seen = HashSet::new();
        for value in 0..=u8::MAX {
            assert!(seen.insert(Control::from_octet(value)));
        }
        assert!(seen.contains(
            &Control::supervisory(SupervisoryKind::Reject, 3, false).unwrap()
        ));
        assert!(!seen.insert(Control::SNRM));

        let kinds: HashSet<_> = [
            SupervisoryKind::ReceiveReady,
            SupervisoryKind::ReceiveNotReady,
            SupervisoryKind::Reject,
            SupervisoryKind::SelectiveReject,
        ]
        .into_iter()
        .collect();
        assert_eq!(kinds.len(), 4);
        let commands: HashSet<_> = [UnnumberedCommand::Snrm, UnnumberedCommand::Disc].into();
        let responses: HashSet<_> = [UnnumberedResponse::Ua, UnnumberedResponse::Dm].into();
        assert_eq!(commands.len() + responses.len(), 4);
    }

    #[test]
    fn test_constructors_keep_round_trip() {
        assert!(matches!(
            Control::information(9, 0, false),
            Err(HdlcError::RangeError(_))
        ));
        assert!(matches!(
            Control::supervisory(SupervisoryKind::ReceiveReady, 8, true),
            Err(HdlcError::RangeError(_))
        ));
        for ns in 0..8 {
            for nr in 0..8 {
                let control = Control::information(ns, nr, ns % 2 == 0).unwrap();
                assert_eq!(Control::from_octet(control.to_octet()), control);
            }
        }
        for command in [UnnumberedCommand::Snrm, UnnumberedCommand::Ui, UnnumberedCommand::Uih] {
            let control = Control::command(command, true);
            assert_eq!(Control::from_octet(control.to_octet()), control);
        }
    }

    #[test]
    fn test_octet_round_trip() {
        for value in 0..=u8::MAX {
            assert_eq!(Control::from_octet(value).to_octet(), value);
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(Control::from_octet(0x10).category(), FrameCategory::Information);
        assert_eq!(Control::from_octet(0x51).category(), FrameCategory::Supervisory);
        assert_eq!(Control::from_octet(0x93).category(), FrameCategory::Unnumbered);
    }

    #[test]
    fn test_information_fields() {
        let control = Control::from_octet(0x32);
        assert_eq!(control.ns(), Some(1));
        assert_eq!(control.nr(), Some(1));
        assert!(control.p_f_set());
        assert_eq!(Control::information(1, 1, true).unwrap(), control);
        assert!(matches!(
            Control::information(8, 0, false),
            Err(HdlcError::RangeError(_))
        ));
    }

    #[test]
    fn test_supervisory_kinds() {
        assert_eq!(
            Control::from_octet(0x51).supervisory_kind(),
            Some(SupervisoryKind::ReceiveReady)
        );
        assert_eq!(
            Control::from_octet(0x05).supervisory_kind(),
            Some(SupervisoryKind::ReceiveNotReady)
        );
        assert_eq!(
            Control::from_octet(0x09).supervisory_kind(),
            Some(SupervisoryKind::Reject)
        );
        assert_eq!(
            Control::from_octet(0x0D).supervisory_kind(),
            Some(SupervisoryKind::SelectiveReject)
        );
        assert_eq!(Control::from_octet(0x51).nr(), Some(2));
    }

    #[test]
    fn test_unnumbered_codes() {
        assert_eq!(Control::SNRM.to_octet(), 0x93);
        assert_eq!(Control::UA.to_octet(), 0x73);
        assert_eq!(Control::DISC.to_octet(), 0x53);
        assert_eq!(Control::DM.to_octet(), 0x1F);

        assert_eq!(Control::from_octet(0x93).as_command(), Some(UnnumberedCommand::Snrm));
        assert_eq!(Control::from_octet(0x73).as_response(), Some(UnnumberedResponse::Ua));
        assert_eq!(Control::from_octet(0x1F).as_command(), Some(UnnumberedCommand::Sarm));
        assert_eq!(Control::from_octet(0x1F).as_response(), Some(UnnumberedResponse::Dm));
        assert_eq!(Control::from_octet(0x93).as_response(), None);
        assert_eq!(
            Control::command(UnnumberedCommand::Disc, false).to_octet(),
            0x43
        );
        assert_eq!(
            Control::response(UnnumberedResponse::Frmr, true).to_octet(),
            0x97
        );
    }

    #[test]
    fn test_information_bearing() {
        assert!(Control::from_octet(0x10).is_information_bearing());
        assert!(Control::from_octet(0x03).is_information_bearing());
        assert!(Control::from_octet(0x13).is_information_bearing());
        assert!(Control::from_octet(0xEF).is_information_bearing());
        assert!(Control::from_octet(0xFF).is_information_bearing());
        assert!(!Control::from_octet(0x93).is_information_bearing());
        assert!(!Control::from_octet(0x51).is_information_bearing());
    }

    #[test]
    fn test_p_f_unassigned() {
        // 0xB3 has P/F set but 0xA3 is not an assigned modifier
        assert!(!Control::from_octet(0xB3).p_f_set());
        assert!(Control::from_octet(0x93).p_f_set());
        assert!(!Control::from_octet(0x83).p_f_set());
    }

    #[test]
    fn test_next_send() {
        let control = Control::from_octet(0x10);
        let next = control.next_send();
        assert_eq!(next.to_octet(), 0x12);
        assert_eq!(Control::from_octet(0xFE).next_send().to_octet(), 0xF0);
        for value in (0..=u8::MAX).filter(|v| v & 0x01 == 0) {
            let next = Control::from_octet(value).next_send().to_octet();
            assert_eq!(next & !NS_MASK, value & !NS_MASK);
            assert_eq!((next >> 1) & 0x07, (((value >> 1) & 0x07) + 1) % 8);
        }
    }

    #[test]
    fn test_next_receive() {
        assert_eq!(Control::from_octet(0x10).next_receive().to_octet(), 0x30);
        assert_eq!(Control::from_octet(0xE0).next_receive().to_octet(), 0x10);
        assert_eq!(Control::from_octet(0x01).next_receive().to_octet(), 0x31);
        for value in 0..=u8::MAX {
            let next = Control::from_octet(value).next_receive().to_octet();
            assert_eq!(next & 0x0F, value & 0x0F);
            assert!(next & PF_BIT != 0);
            assert_eq!(next >> 5, ((value >> 5) + 1) % 8);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Control::from_octet(0x32).to_string(), "I(ns=1, nr=1, P/F)");
        assert_eq!(Control::SNRM.to_string(), "Snrm(0x93)");
        assert_eq!(Control::from_octet(0x1F).to_string(), "Sarm/Dm(0x1F)");
    }
}
