//! Parallel-select digital multiplexers

use mux_core::{
    Binding, ChannelEncoding, DeviceConfig, GpioBinding, MuxDevice, SelectLines, SwitchError,
    SwitchPolicy,
};
use mux_hal::{PinId, Platform};

/// Which member of the 74HC405x family is on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hc405xKind {
    /// 8 channels, 3 select lines
    Hc4051,
    /// Dual 4 channels, 2 select lines
    Hc4052,
    /// 2 channels, 1 select line
    Hc4053,
}

impl Hc405xKind {
    /// Select lines the part decodes
    pub fn select_lines(&self) -> usize {
        match self {
            Hc405xKind::Hc4051 => 3,
            Hc405xKind::Hc4052 => 2,
            Hc405xKind::Hc4053 => 1,
        }
    }

    /// Channels per decoded bank
    pub fn channels(&self) -> u8 {
        match self {
            Hc405xKind::Hc4051 => 8,
            Hc405xKind::Hc4052 => 4,
            Hc405xKind::Hc4053 => 2,
        }
    }
}

/// 74HC405x used as a digital signal router
///
/// Fails with `Init` when the select list does not match the part's line
/// count. Digital routing has no settling requirement, so the settling
/// time is zero.
pub fn hc405x<P: Platform>(
    platform: P,
    kind: Hc405xKind,
    select: &[PinId],
    enable: Option<PinId>,
) -> Result<MuxDevice<P>, SwitchError> {
    if select.len() != kind.select_lines() {
        return Err(SwitchError::Init("select line count does not match part"));
    }
    Ok(MuxDevice::new(
        platform,
        DeviceConfig {
            binding: Binding::Gpio(GpioBinding {
                select: SelectLines::new(select)?,
                enable,
                load: None,
                signal: None,
                signal_b: None,
            }),
            policy: SwitchPolicy::DirectWrite,
            encoding: ChannelEncoding::Identity,
            max_channels: kind.channels(),
            settling_time_us: 0,
        },
    ))
}

/// CD74HC4067: 16-channel multiplexer, direct-write switching
pub fn cd74hc4067<P: Platform>(
    platform: P,
    select: [PinId; 4],
    signal: Option<PinId>,
    enable: Option<PinId>,
) -> MuxDevice<P> {
    MuxDevice::new(
        platform,
        DeviceConfig {
            binding: Binding::Gpio(GpioBinding {
                select: select.into(),
                enable,
                load: None,
                signal,
                signal_b: None,
            }),
            policy: SwitchPolicy::DirectWrite,
            encoding: ChannelEncoding::Identity,
            max_channels: 16,
            settling_time_us: 50,
        },
    )
}
