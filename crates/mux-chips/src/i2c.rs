//! Bus-addressed multiplexer banks

use mux_core::{Binding, BusBinding, BusCode, ChannelEncoding, DeviceConfig, MuxDevice, SwitchPolicy};
use mux_hal::{Direction, Level, PinId, Platform};

fn bus_device<P: Platform>(platform: P, address: u8, code: BusCode, channels: u8) -> MuxDevice<P> {
    MuxDevice::new(
        platform,
        DeviceConfig {
            binding: Binding::Bus(BusBinding { address, code }),
            policy: SwitchPolicy::DirectWrite,
            encoding: ChannelEncoding::Identity,
            max_channels: channels,
            settling_time_us: 0,
        },
    )
}

/// TCA9548A: 8-channel bus switch, one control-register bit per channel
///
/// The usual address is 0x70 plus the three strap pins.
pub fn tca9548a<P: Platform>(platform: P, address: u8) -> MuxDevice<P> {
    bus_device(platform, address, BusCode::OneHot, 8)
}

/// PCA9547: 8-channel bus multiplexer
///
/// The control register takes the channel number directly with bit 3 as
/// the enable bit. Parts with the reset line wired can be recovered with
/// [`pulse_reset`].
pub fn pca9547<P: Platform>(platform: P, address: u8) -> MuxDevice<P> {
    bus_device(platform, address, BusCode::Direct { enable_bit: 0x08 }, 8)
}

/// PCA9646: 4-channel bus switch with voltage-level translation
///
/// The translation level is strapped in hardware; nothing about it is
/// controllable from here.
pub fn pca9646<P: Platform>(platform: P, address: u8) -> MuxDevice<P> {
    bus_device(platform, address, BusCode::OneHot, 4)
}

/// Pulse a bus multiplexer's active-low reset line
///
/// For parts with the reset pin wired to a GPIO (PCA9547, PCA9646).
/// Leaves the line high. The chip's control register is cleared by the
/// pulse, so re-select a channel afterwards.
pub fn pulse_reset<P: Platform>(device: &mut MuxDevice<P>, reset: PinId) {
    let io = device.platform_mut();
    io.configure(reset, Direction::Output);
    io.write(reset, Level::Low);
    io.delay_us(1);
    io.write(reset, Level::High);
    io.delay_us(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mux_sim::SimBoard;

    #[test]
    fn tca9548a_writes_one_hot_codes() {
        let board = SimBoard::new();
        let mut dev = tca9548a(board.clone(), 0x70);
        dev.begin().unwrap();

        dev.set_channel(0).unwrap();
        dev.set_channel(5).unwrap();

        // First write is the begin() probe
        assert_eq!(
            board.bus_writes(0x70),
            vec![vec![], vec![0b0000_0001], vec![0b0010_0000]]
        );
    }

    #[test]
    fn pca9547_sets_the_enable_bit() {
        let board = SimBoard::new();
        let mut dev = pca9547(board.clone(), 0x71);
        dev.begin().unwrap();

        dev.set_channel(5).unwrap();

        assert_eq!(board.bus_writes(0x71).last().unwrap(), &vec![0x0D]);
    }

    #[test]
    fn pca9646_has_four_channels() {
        let board = SimBoard::new();
        let mut dev = pca9646(board.clone(), 0x72);
        dev.begin().unwrap();

        assert!(dev.set_channel(3).is_ok());
        assert!(dev.set_channel(4).is_err());
    }

    #[test]
    fn reset_pulse_returns_high() {
        let board = SimBoard::new();
        let mut dev = pca9547(board.clone(), 0x70);
        dev.begin().unwrap();

        pulse_reset(&mut dev, PinId(9));

        assert_eq!(board.pin_level(PinId(9)), Some(Level::High));
        assert_eq!(board.pin_direction(PinId(9)), Some(Direction::Output));
    }
}
