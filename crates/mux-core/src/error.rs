//! Error types for multiplexer devices

use thiserror::Error;

/// Errors returned by device operations
///
/// Every mutating operation validates its preconditions before touching
/// any pin or bus, so an `Err` means no hardware state changed (with the
/// one exception of a bus transaction that NAKed mid-flight, which the
/// chip itself discards).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SwitchError {
    /// The configuration cannot support the request: required resources
    /// were unavailable at `begin()`, or an operation needs wiring (a
    /// signal path, a GPIO binding) the device was built without. Not
    /// recoverable without reconfiguring the device.
    #[error("initialization failed: {0}")]
    Init(&'static str),

    /// Bus transaction did not complete; retrying is the caller's call
    #[error("bus communication failed with completion code {code}")]
    Communication { code: u8 },

    /// Requested channel is out of range for this device
    #[error("channel {channel} invalid (device has {max} channels)")]
    ChannelInvalid { channel: u8, max: u8 },

    /// Operation attempted while the device output stage is disabled
    #[error("device not enabled")]
    NotEnabled,

    /// Batch capture buffer is full; flush or clear before continuing
    #[error("batch buffer overflow (capacity {capacity})")]
    Overflow { capacity: usize },
}

impl From<mux_hal::BusFault> for SwitchError {
    fn from(fault: mux_hal::BusFault) -> Self {
        SwitchError::Communication { code: fault.code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_fault_maps_to_communication() {
        let err: SwitchError = mux_hal::BusFault::new(3).into();
        assert_eq!(err, SwitchError::Communication { code: 3 });
    }

    #[test]
    fn display_messages() {
        let err = SwitchError::ChannelInvalid { channel: 9, max: 8 };
        assert_eq!(err.to_string(), "channel 9 invalid (device has 8 channels)");
    }
}
