//! Digital and analog pin capabilities

/// Logical identifier for a pin
///
/// This is the platform's numbering, not a physical package pin. The
/// drivers treat it as an opaque token; only the platform interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PinId(pub u8);

impl From<u8> for PinId {
    fn from(raw: u8) -> Self {
        PinId(raw)
    }
}

/// Digital pin level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Level for a single select-code bit (1 = high)
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Pin direction for `DigitalIo::configure`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Input,
    Output,
}

/// Digital pin I/O capability
///
/// All three operations are infallible: the platform owns pin allocation
/// and a driver only touches pins it was constructed with.
pub trait DigitalIo {
    /// Set a pin's direction
    fn configure(&mut self, pin: PinId, direction: Direction);

    /// Drive an output pin to a level
    fn write(&mut self, pin: PinId, level: Level);

    /// Read the level of a pin
    fn read(&mut self, pin: PinId) -> Level;
}

/// Raw analog sampling capability
///
/// Resolution is platform-defined; drivers pass samples through untouched
/// (apart from the optional per-channel linear correction in `mux-core`).
pub trait AnalogInput {
    /// Sample a signal pin, returning raw converter units
    fn sample(&mut self, pin: PinId) -> u16;
}
