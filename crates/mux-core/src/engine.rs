//! Switching protocol engine
//!
//! Executes the minimal correct pin-write sequence to select a channel.
//! The engine is protocol-pure: it receives an already-validated,
//! already-encoded bit code and a timing policy, and never fails (pin
//! writes are infallible by the `mux-hal` contract). Precondition checks
//! live in the device layer so that nothing here runs on a rejected
//! request.

use mux_hal::{Clock, DigitalIo, Level, PinId};
use serde::{Deserialize, Serialize};

use crate::error::SwitchError;

/// Maximum supported select lines (32 channels)
pub const MAX_SELECT_LINES: usize = 5;

/// Timing policy for a channel switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SwitchPolicy {
    /// Write all select bits at once. Transient intermediate codes reach
    /// the chip; use when its internal hold time tolerates them.
    #[default]
    DirectWrite,
    /// Disable the output stage, settle, write the select bits, settle,
    /// re-enable. Prevents momentarily connecting two channels while a
    /// multi-bit code changes. Degrades to a direct write when no enable
    /// line is bound.
    BreakBeforeMake,
    /// Write the select bits while the load line idles high, then pulse
    /// it low to latch them into the chip's address register. Latched
    /// chips switch glitch-free on the latch edge, so no enable cycle is
    /// performed around the pulse.
    WritePulse,
}

/// Fixed-capacity list of select-line pins, LSB first
///
/// Inline storage sized for [`MAX_SELECT_LINES`]; select-line counts are
/// small, compile-time-bounded quantities, so there is no allocation (and
/// no allocation failure path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PinId>", into = "Vec<PinId>")]
pub struct SelectLines {
    pins: [PinId; MAX_SELECT_LINES],
    len: u8,
}

impl SelectLines {
    /// Build from a slice of pins, bit 0 first
    pub fn new(pins: &[PinId]) -> Result<Self, SwitchError> {
        if pins.len() > MAX_SELECT_LINES {
            return Err(SwitchError::Init("too many select lines"));
        }
        let mut stored = [PinId(0); MAX_SELECT_LINES];
        stored[..pins.len()].copy_from_slice(pins);
        Ok(SelectLines {
            pins: stored,
            len: pins.len() as u8,
        })
    }

    /// Number of select lines
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// True when no select lines are bound
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bound pins, bit 0 first
    pub fn pins(&self) -> &[PinId] {
        &self.pins[..self.len()]
    }
}

macro_rules! select_lines_from_array {
    ($($n:literal),*) => {$(
        impl From<[PinId; $n]> for SelectLines {
            fn from(pins: [PinId; $n]) -> Self {
                let mut stored = [PinId(0); MAX_SELECT_LINES];
                stored[..$n].copy_from_slice(&pins);
                SelectLines { pins: stored, len: $n }
            }
        }
    )*};
}

select_lines_from_array!(1, 2, 3, 4, 5);

impl TryFrom<Vec<PinId>> for SelectLines {
    type Error = SwitchError;

    fn try_from(pins: Vec<PinId>) -> Result<Self, Self::Error> {
        SelectLines::new(&pins)
    }
}

impl From<SelectLines> for Vec<PinId> {
    fn from(lines: SelectLines) -> Self {
        lines.pins().to_vec()
    }
}

/// Drive the select lines to `code` under the given timing policy
///
/// `enable` is the active-low output-enable line (break-before-make);
/// `load` is the active-low write/load line (write-pulse). Lines that a
/// policy does not use are ignored.
pub fn drive_select<P: DigitalIo + Clock>(
    io: &mut P,
    select: &SelectLines,
    enable: Option<PinId>,
    load: Option<PinId>,
    policy: SwitchPolicy,
    code: u8,
) {
    match policy {
        SwitchPolicy::DirectWrite => {
            write_code(io, select, code);
        }
        SwitchPolicy::BreakBeforeMake => {
            if let Some(en) = enable {
                io.write(en, Level::High);
                io.delay_us(1);
                write_code(io, select, code);
                io.delay_us(1);
                io.write(en, Level::Low);
            } else {
                write_code(io, select, code);
            }
        }
        SwitchPolicy::WritePulse => {
            write_code(io, select, code);
            if let Some(wr) = load {
                io.write(wr, Level::Low);
                io.delay_us(1);
                io.write(wr, Level::High);
            }
        }
    }
}

fn write_code<P: DigitalIo>(io: &mut P, select: &SelectLines, code: u8) {
    for (bit, &pin) in select.pins().iter().enumerate() {
        io.write(pin, Level::from_bit((code >> bit) & 0x01 == 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mux_sim::{SimBoard, SimEvent};

    fn lines() -> SelectLines {
        SelectLines::new(&[PinId(2), PinId(3), PinId(4)]).unwrap()
    }

    #[test]
    fn select_lines_reject_more_than_five() {
        let pins: Vec<PinId> = (0..6).map(PinId).collect();
        assert_eq!(
            SelectLines::new(&pins),
            Err(SwitchError::Init("too many select lines"))
        );
    }

    #[test]
    fn direct_write_drives_all_bits() {
        let mut board = SimBoard::new();
        drive_select(&mut board, &lines(), None, None, SwitchPolicy::DirectWrite, 0b101);

        assert_eq!(board.pin_level(PinId(2)), Some(Level::High));
        assert_eq!(board.pin_level(PinId(3)), Some(Level::Low));
        assert_eq!(board.pin_level(PinId(4)), Some(Level::High));
    }

    #[test]
    fn break_before_make_disables_before_select_writes() {
        let mut board = SimBoard::new();
        let en = PinId(7);
        drive_select(
            &mut board,
            &lines(),
            Some(en),
            None,
            SwitchPolicy::BreakBeforeMake,
            0b011,
        );

        let events = board.events();
        let disable_at = events
            .iter()
            .position(|e| matches!(e, SimEvent::Write { pin, level: Level::High } if *pin == en))
            .expect("enable line never disabled");
        let first_select = events
            .iter()
            .position(|e| matches!(e, SimEvent::Write { pin, .. } if *pin != en))
            .expect("select lines never written");
        let reenable_at = events
            .iter()
            .rposition(|e| matches!(e, SimEvent::Write { pin, level: Level::Low } if *pin == en))
            .expect("enable line never re-enabled");

        assert!(disable_at < first_select);
        assert!(reenable_at > first_select);
    }

    #[test]
    fn break_before_make_without_enable_degrades_to_direct() {
        let mut board = SimBoard::new();
        drive_select(
            &mut board,
            &lines(),
            None,
            None,
            SwitchPolicy::BreakBeforeMake,
            0b111,
        );

        // Only the three select writes, no delays
        assert_eq!(board.events().len(), 3);
    }

    #[test]
    fn write_pulse_latches_after_address_setup() {
        let mut board = SimBoard::new();
        let wr = PinId(9);
        drive_select(
            &mut board,
            &lines(),
            None,
            Some(wr),
            SwitchPolicy::WritePulse,
            0b110,
        );

        let events = board.events();
        let last_select = events
            .iter()
            .rposition(|e| matches!(e, SimEvent::Write { pin, .. } if *pin != wr))
            .unwrap();
        let pulse_low = events
            .iter()
            .position(|e| matches!(e, SimEvent::Write { pin, level: Level::Low } if *pin == wr))
            .expect("load line never pulsed");

        assert!(pulse_low > last_select);
        // Pulse returns high
        assert_eq!(board.pin_level(wr), Some(Level::High));
    }
}
