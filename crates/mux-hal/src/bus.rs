//! Addressed bus write capability

use thiserror::Error;

/// A bus transaction that did not complete
///
/// Carries the controller's non-zero completion code verbatim. What the
/// code means (NACK on address, NACK on data, arbitration loss) is
/// platform-specific; drivers only care that the write did not land.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("bus transaction failed with completion code {code}")]
pub struct BusFault {
    /// Non-zero completion code from the bus controller
    pub code: u8,
}

impl BusFault {
    /// Wrap a controller completion code
    pub fn new(code: u8) -> Self {
        BusFault { code }
    }
}

/// Addressed write-transaction capability (I2C-style)
///
/// Byte-level framing, addressing phases and clock stretching are the
/// platform's problem; drivers hand over a payload and get a completion
/// result. An empty payload is a pure address probe.
pub trait BusMaster {
    /// Write `payload` to the device at `address`
    fn transaction(&mut self, address: u8, payload: &[u8]) -> Result<(), BusFault>;
}
