//! Parallel-select analog multiplexers

use mux_core::{Binding, ChannelEncoding, DeviceConfig, GpioBinding, MuxDevice, SwitchPolicy};
use mux_hal::{PinId, Platform};

fn parallel<P: Platform>(
    platform: P,
    binding: GpioBinding,
    policy: SwitchPolicy,
    encoding: ChannelEncoding,
    max_channels: u8,
    settling_time_us: u16,
) -> MuxDevice<P> {
    MuxDevice::new(
        platform,
        DeviceConfig {
            binding: Binding::Gpio(binding),
            policy,
            encoding,
            max_channels,
            settling_time_us,
        },
    )
}

/// 74HC4051: 8-channel analog multiplexer, break-before-make switching
pub fn hc4051<P: Platform>(
    platform: P,
    select: [PinId; 3],
    signal: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    parallel(
        platform,
        GpioBinding {
            select: select.into(),
            enable,
            load: None,
            signal: Some(signal),
            signal_b: None,
        },
        SwitchPolicy::BreakBeforeMake,
        ChannelEncoding::Identity,
        8,
        10,
    )
}

/// 74HC4067: 16-channel analog multiplexer
pub fn hc4067<P: Platform>(
    platform: P,
    select: [PinId; 4],
    signal: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    parallel(
        platform,
        GpioBinding {
            select: select.into(),
            enable,
            load: None,
            signal: Some(signal),
            signal_b: None,
        },
        SwitchPolicy::BreakBeforeMake,
        ChannelEncoding::Identity,
        16,
        10,
    )
}

/// 74HC4052: dual 4-channel analog multiplexer
///
/// The two halves share the select lines; `read_channel` samples the
/// first signal path and
/// [`read_channel_b`](mux_core::MuxDevice::read_channel_b) the second.
pub fn hc4052<P: Platform>(
    platform: P,
    select: [PinId; 2],
    signal_a: PinId,
    signal_b: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    parallel(
        platform,
        GpioBinding {
            select: select.into(),
            enable,
            load: None,
            signal: Some(signal_a),
            signal_b: Some(signal_b),
        },
        SwitchPolicy::BreakBeforeMake,
        ChannelEncoding::Identity,
        4,
        10,
    )
}

/// 74HC4053: triple independent 2-state switches
///
/// Drive the three switches with
/// [`set_switches`](mux_core::MuxDevice::set_switches); the integer
/// channel model also works and treats the switch states as bits 0..2.
pub fn hc4053<P: Platform>(
    platform: P,
    select: [PinId; 3],
    signal_a: Option<PinId>,
    signal_b: Option<PinId>,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    parallel(
        platform,
        GpioBinding {
            select: select.into(),
            enable,
            load: None,
            signal: signal_a,
            signal_b,
        },
        SwitchPolicy::BreakBeforeMake,
        ChannelEncoding::Identity,
        8,
        10,
    )
}

/// ADG508A: 8-channel analog multiplexer
pub fn adg508a<P: Platform>(
    platform: P,
    select: [PinId; 3],
    signal: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    parallel(
        platform,
        GpioBinding {
            select: select.into(),
            enable,
            load: None,
            signal: Some(signal),
            signal_b: None,
        },
        SwitchPolicy::BreakBeforeMake,
        ChannelEncoding::Identity,
        8,
        10,
    )
}

/// ADG509A: differential variant of the ADG508A
///
/// Both signal paths switch together;
/// [`read_differential`](mux_core::MuxDevice::read_differential) returns
/// their signed difference.
pub fn adg509a<P: Platform>(
    platform: P,
    select: [PinId; 3],
    signal_a: PinId,
    signal_b: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    parallel(
        platform,
        GpioBinding {
            select: select.into(),
            enable,
            load: None,
            signal: Some(signal_a),
            signal_b: Some(signal_b),
        },
        SwitchPolicy::BreakBeforeMake,
        ChannelEncoding::Identity,
        8,
        10,
    )
}

/// ADG706: 16-channel multiplexer with a latched address register
///
/// The address bits are latched by a pulse on the write line, so the
/// device uses the write-pulse policy instead of break-before-make.
pub fn adg706<P: Platform>(
    platform: P,
    select: [PinId; 4],
    signal: PinId,
    load: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    parallel(
        platform,
        GpioBinding {
            select: select.into(),
            enable,
            load: Some(load),
            signal: Some(signal),
            signal_b: None,
        },
        SwitchPolicy::WritePulse,
        ChannelEncoding::Identity,
        16,
        10,
    )
}

/// ADG707: differential variant of the ADG706
pub fn adg707<P: Platform>(
    platform: P,
    select: [PinId; 4],
    signal_a: PinId,
    signal_b: PinId,
    load: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    parallel(
        platform,
        GpioBinding {
            select: select.into(),
            enable,
            load: Some(load),
            signal: Some(signal_a),
            signal_b: Some(signal_b),
        },
        SwitchPolicy::WritePulse,
        ChannelEncoding::Identity,
        16,
        10,
    )
}

/// ADG506A: 16-channel analog multiplexer
pub fn adg506a<P: Platform>(
    platform: P,
    select: [PinId; 4],
    signal: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    parallel(
        platform,
        GpioBinding {
            select: select.into(),
            enable,
            load: None,
            signal: Some(signal),
            signal_b: None,
        },
        SwitchPolicy::BreakBeforeMake,
        ChannelEncoding::Identity,
        16,
        10,
    )
}

/// ADG507A: 8-channel differential sibling of the ADG506A
pub fn adg507a<P: Platform>(
    platform: P,
    select: [PinId; 3],
    signal_a: PinId,
    signal_b: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    parallel(
        platform,
        GpioBinding {
            select: select.into(),
            enable,
            load: None,
            signal: Some(signal_a),
            signal_b: Some(signal_b),
        },
        SwitchPolicy::BreakBeforeMake,
        ChannelEncoding::Identity,
        8,
        10,
    )
}

/// MPC506A: pin-compatible with the ADG506A but slower to settle
pub fn mpc506a<P: Platform>(
    platform: P,
    select: [PinId; 4],
    signal: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    let mut dev = adg506a(platform, select, signal, enable);
    dev.set_settling_time(20);
    dev
}

/// MPC507A: pin-compatible with the ADG507A but slower to settle
pub fn mpc507a<P: Platform>(
    platform: P,
    select: [PinId; 3],
    signal_a: PinId,
    signal_b: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    let mut dev = adg507a(platform, select, signal_a, signal_b, enable);
    dev.set_settling_time(20);
    dev
}

/// DG408: 8-channel differential multiplexer, 150 us settling
pub fn dg408<P: Platform>(
    platform: P,
    select: [PinId; 3],
    signal_a: PinId,
    signal_b: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    parallel(
        platform,
        GpioBinding {
            select: select.into(),
            enable,
            load: None,
            signal: Some(signal_a),
            signal_b: Some(signal_b),
        },
        SwitchPolicy::DirectWrite,
        ChannelEncoding::Identity,
        8,
        150,
    )
}

/// DG409: like the DG408 but with address bits 0 and 1 swapped on the
/// package, so channels go through the swap-low-pair encoding
pub fn dg409<P: Platform>(
    platform: P,
    select: [PinId; 3],
    signal_a: PinId,
    signal_b: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    parallel(
        platform,
        GpioBinding {
            select: select.into(),
            enable,
            load: None,
            signal: Some(signal_a),
            signal_b: Some(signal_b),
        },
        SwitchPolicy::DirectWrite,
        ChannelEncoding::SwapLowPair,
        8,
        150,
    )
}

/// MAX4051A: drop-in HC4051 replacement with low on-resistance
pub fn max4051a<P: Platform>(
    platform: P,
    select: [PinId; 3],
    signal: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    let mut dev = hc4051(platform, select, signal, enable);
    dev.set_settling_time(5);
    dev
}

/// MAX4582: precision 8:1 multiplexer with a synchronous load pin
pub fn max4582<P: Platform>(
    platform: P,
    select: [PinId; 3],
    signal: PinId,
    load: PinId,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    parallel(
        platform,
        GpioBinding {
            select: select.into(),
            enable,
            load: Some(load),
            signal: Some(signal),
            signal_b: None,
        },
        SwitchPolicy::WritePulse,
        ChannelEncoding::Identity,
        8,
        15,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mux_core::SwitchError;
    use mux_hal::Level;
    use mux_sim::{SimBoard, SimEvent};

    #[test]
    fn hc4051_walks_channels_break_before_make() {
        let board = SimBoard::new();
        let mut dev = hc4051(
            board.clone(),
            [PinId(2), PinId(3), PinId(4)],
            PinId(14),
            Some(PinId(7)),
        );
        dev.begin().unwrap();
        board.clear_events();

        dev.set_channel(6).unwrap();

        let events = board.events();
        // Enable goes high (off) before any select line moves
        assert!(matches!(
            events[0],
            SimEvent::Write { pin: PinId(7), level: Level::High }
        ));
        assert_eq!(board.pin_level(PinId(2)), Some(Level::Low));
        assert_eq!(board.pin_level(PinId(3)), Some(Level::High));
        assert_eq!(board.pin_level(PinId(4)), Some(Level::High));
        assert_eq!(board.pin_level(PinId(7)), Some(Level::Low));
    }

    #[test]
    fn hc4052_samples_second_signal_path() {
        let board = SimBoard::new();
        board.set_analog(PinId(15), 700);
        let mut dev = hc4052(
            board.clone(),
            [PinId(2), PinId(3)],
            PinId(14),
            PinId(15),
            None,
        );
        dev.begin().unwrap();

        assert_eq!(dev.read_channel_b(2), 700);
        assert_eq!(dev.read_channel_b(4), 0); // out of range for 4 channels
    }

    #[test]
    fn hc4053_drives_three_switches_independently() {
        let board = SimBoard::new();
        let en = PinId(7);
        let mut dev = hc4053(
            board.clone(),
            [PinId(2), PinId(3), PinId(4)],
            None,
            None,
            Some(en),
        );
        dev.begin().unwrap();
        board.clear_events();

        dev.set_switches(true, false, true).unwrap();

        let events = board.events();
        // Break-before-make brackets the three switch writes
        assert!(matches!(
            events.first(),
            Some(SimEvent::Write { pin, level: Level::High }) if *pin == en
        ));
        assert!(matches!(
            events.last(),
            Some(SimEvent::Write { pin, level: Level::Low }) if *pin == en
        ));
        assert_eq!(board.pin_level(PinId(2)), Some(Level::High));
        assert_eq!(board.pin_level(PinId(3)), Some(Level::Low));
        assert_eq!(board.pin_level(PinId(4)), Some(Level::High));
    }

    #[test]
    fn hc4053_switches_require_an_enabled_device() {
        let board = SimBoard::new();
        let mut dev = hc4053(
            board.clone(),
            [PinId(2), PinId(3), PinId(4)],
            None,
            None,
            None,
        );
        dev.begin().unwrap();
        dev.disable();

        assert_eq!(
            dev.set_switches(false, true, false),
            Err(SwitchError::NotEnabled)
        );
    }

    #[test]
    fn adg706_latches_with_a_load_pulse() {
        let board = SimBoard::new();
        let wr = PinId(8);
        let mut dev = adg706(
            board.clone(),
            [PinId(2), PinId(3), PinId(4), PinId(5)],
            PinId(14),
            wr,
            None,
        );
        dev.begin().unwrap();
        board.clear_events();

        dev.set_channel(11).unwrap();

        let events = board.events();
        let pulse_low = events
            .iter()
            .position(|e| matches!(e, SimEvent::Write { pin, level: Level::Low } if *pin == wr))
            .expect("load never pulsed");
        let last_select = events
            .iter()
            .rposition(|e| matches!(e, SimEvent::Write { pin, .. } if *pin != wr))
            .unwrap();
        assert!(pulse_low > last_select);
        assert_eq!(board.pin_level(wr), Some(Level::High));
    }

    #[test]
    fn dg409_permutes_low_address_bits() {
        let board = SimBoard::new();
        let mut dev = dg409(
            board.clone(),
            [PinId(2), PinId(3), PinId(4)],
            PinId(14),
            PinId(15),
            None,
        );
        dev.begin().unwrap();

        // Channel 1 lands on address line 1, not line 0
        dev.set_channel(1).unwrap();
        assert_eq!(board.pin_level(PinId(2)), Some(Level::Low));
        assert_eq!(board.pin_level(PinId(3)), Some(Level::High));
        assert_eq!(dev.channel(), 1);
    }

    #[test]
    fn settling_overrides_take() {
        let board = SimBoard::new();
        let m = mpc506a(
            board.clone(),
            [PinId(2), PinId(3), PinId(4), PinId(5)],
            PinId(14),
            None,
        );
        assert_eq!(m.settling_time_us(), 20);

        let m = max4051a(board.clone(), [PinId(2), PinId(3), PinId(4)], PinId(14), None);
        assert_eq!(m.settling_time_us(), 5);

        let m = dg408(
            board,
            [PinId(2), PinId(3), PinId(4)],
            PinId(14),
            PinId(15),
            None,
        );
        assert_eq!(m.settling_time_us(), 150);
    }

    #[test]
    fn differential_read_subtracts_paths() {
        let board = SimBoard::new();
        board.set_analog(PinId(14), 900);
        board.set_analog(PinId(15), 350);
        let mut dev = adg509a(
            board.clone(),
            [PinId(2), PinId(3), PinId(4)],
            PinId(14),
            PinId(15),
            None,
        );
        dev.begin().unwrap();

        assert_eq!(dev.read_differential(3), 550);
    }

    #[test]
    fn differential_read_saturates_at_the_i16_rails() {
        let board = SimBoard::new();
        board.set_analog(PinId(14), u16::MAX);
        board.set_analog(PinId(15), 0);
        let mut dev = adg509a(
            board.clone(),
            [PinId(2), PinId(3), PinId(4)],
            PinId(14),
            PinId(15),
            None,
        );
        dev.begin().unwrap();

        assert_eq!(dev.read_differential(0), i16::MAX);

        board.set_analog(PinId(14), 0);
        board.set_analog(PinId(15), u16::MAX);
        assert_eq!(dev.read_differential(0), i16::MIN);
    }
}
