//! Serially addressed multiplexers

use mux_core::{Binding, ChannelEncoding, DeviceConfig, MuxDevice, SpiBinding, SwitchPolicy};
use mux_hal::{PinId, Platform};

/// ADG731: 32-channel analog switch addressed over a serial interface
///
/// The select word is bit-banged MSB first over `data` with `clk` pulses
/// while `cs` is low, the same shift any pin-capable platform can do.
pub fn adg731<P: Platform>(platform: P, cs: PinId, clk: PinId, data: PinId) -> MuxDevice<P> {
    MuxDevice::new(
        platform,
        DeviceConfig {
            binding: Binding::SoftSpi(SpiBinding { cs, clk, data }),
            policy: SwitchPolicy::DirectWrite,
            encoding: ChannelEncoding::Identity,
            max_channels: 32,
            settling_time_us: 10,
        },
    )
}
