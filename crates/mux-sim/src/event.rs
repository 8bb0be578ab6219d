//! Recorded hardware interactions

use mux_hal::{Direction, Level, PinId, TriggerMode};
use serde::Serialize;

/// One hardware interaction, in the order the driver performed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SimEvent {
    Configure { pin: PinId, direction: Direction },
    Write { pin: PinId, level: Level },
    Read { pin: PinId, level: Level },
    Sample { pin: PinId, value: u16 },
    Delay { us: u32 },
    BusWrite { address: u8, payload: Vec<u8>, ok: bool },
    Register { pin: PinId, mode: TriggerMode },
    Unregister { pin: PinId },
}
