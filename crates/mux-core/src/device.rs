//! Generic multiplexer device
//!
//! One `MuxDevice` type replaces the per-chip class hierarchy of older
//! mux libraries: chip-specific behavior is data (a [`DeviceConfig`] with
//! pin layout, timing policy, channel encoding and channel count) handed
//! to one generic driver. The `mux-chips` crate provides the per-part
//! constructors that fill these configs in.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use mux_hal::{Direction, Level, PinId, Platform, TriggerMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::batch::BatchBuffer;
use crate::calibration::CalTable;
use crate::channel::{is_valid_channel, ChannelEncoding};
use crate::engine::{drive_select, SelectLines, SwitchPolicy};
use crate::error::SwitchError;
use crate::interrupt::InterruptRelay;
use crate::scan::ScanState;
use crate::util::required_select_lines;

/// Pin layout for a GPIO-driven multiplexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpioBinding {
    /// Select/address lines, bit 0 first
    pub select: SelectLines,
    /// Active-low output enable, if the chip has one
    pub enable: Option<PinId>,
    /// Active-low write/load line (latched chips)
    pub load: Option<PinId>,
    /// Primary signal path
    pub signal: Option<PinId>,
    /// Second signal path (dual and differential variants)
    pub signal_b: Option<PinId>,
}

impl GpioBinding {
    /// Binding with only select lines wired
    pub fn select_only(select: SelectLines) -> Self {
        GpioBinding {
            select,
            enable: None,
            load: None,
            signal: None,
            signal_b: None,
        }
    }
}

/// How a bus-addressed chip encodes its select byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusCode {
    /// `1 << channel`, one bank bit per channel (TCA9548A family)
    OneHot,
    /// `channel | enable_bit`, direct code with a fixed enable bit
    /// (PCA9547 family)
    Direct { enable_bit: u8 },
}

impl BusCode {
    /// Select byte for a validated channel
    pub fn select_byte(&self, channel: u8) -> u8 {
        match self {
            BusCode::OneHot => 1 << (channel & 0x07),
            BusCode::Direct { enable_bit } => channel | enable_bit,
        }
    }
}

/// Address and code style for a bus-addressed multiplexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusBinding {
    pub address: u8,
    pub code: BusCode,
}

/// Pin layout for a serially clocked (software-SPI) multiplexer
///
/// The select code is shifted out MSB first on `data` with `clk` pulses
/// while `cs` is held low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiBinding {
    pub cs: PinId,
    pub clk: PinId,
    pub data: PinId,
}

/// How a device reaches its hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Binding {
    Gpio(GpioBinding),
    Bus(BusBinding),
    SoftSpi(SpiBinding),
}

/// Most channels any supported binding can address (5 select lines)
pub const MAX_DEVICE_CHANNELS: usize = 32;

/// Busy-wait fade executed on both sides of a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FadeProfile {
    steps: u8,
    delay_us: u16,
}

/// Complete static description of one multiplexer chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub binding: Binding,
    pub policy: SwitchPolicy,
    pub encoding: ChannelEncoding,
    /// Fixed at construction, never mutated
    pub max_channels: u8,
    /// Delay after a switch before a sample on the signal path is valid
    pub settling_time_us: u16,
}

/// A multiplexer device instance
///
/// Owns its platform handle and all per-channel state. All foreground
/// operations happen on one thread of control; the only asynchronous
/// access is the interrupt hook's atomic read of the published channel.
pub struct MuxDevice<P: Platform> {
    platform: P,
    config: DeviceConfig,
    enabled: bool,
    /// Channel cell shared with the interrupt hook. Stored once, after
    /// the hardware sequence completes, so no reader observes a
    /// half-written switch.
    published: Arc<AtomicU8>,
    scan: ScanState,
    batch: BatchBuffer,
    calibration: CalTable,
    relay: InterruptRelay,
    /// Input pin that must read low before a switch may proceed
    gate: Option<PinId>,
    fade: Option<FadeProfile>,
    auto_read: bool,
    samples: [u16; MAX_DEVICE_CHANNELS],
}

impl<P: Platform> MuxDevice<P> {
    /// Create a device from its static configuration
    ///
    /// No hardware is touched until [`begin`](Self::begin).
    pub fn new(platform: P, config: DeviceConfig) -> Self {
        MuxDevice {
            platform,
            config,
            enabled: false,
            published: Arc::new(AtomicU8::new(0)),
            scan: ScanState::new(),
            batch: BatchBuffer::new(),
            calibration: CalTable::new(),
            relay: InterruptRelay::new(),
            gate: None,
            fade: None,
            auto_read: false,
            samples: [0; MAX_DEVICE_CHANNELS],
        }
    }

    /// Transition the hardware into its driven state and enable output
    ///
    /// Control lines become outputs at their idle level, signal lines
    /// become inputs, bus devices probe their address. Fails with `Init`
    /// when the bound resources cannot support the configuration.
    pub fn begin(&mut self) -> Result<(), SwitchError> {
        match &self.config.binding {
            Binding::Gpio(gpio) => {
                if usize::from(required_select_lines(self.config.max_channels))
                    > gpio.select.len()
                {
                    return Err(SwitchError::Init(
                        "insufficient select lines for channel count",
                    ));
                }
                for &pin in gpio.select.pins() {
                    self.platform.configure(pin, Direction::Output);
                    self.platform.write(pin, Level::Low);
                }
                if let Some(en) = gpio.enable {
                    self.platform.configure(en, Direction::Output);
                    self.platform.write(en, Level::High);
                }
                if let Some(wr) = gpio.load {
                    self.platform.configure(wr, Direction::Output);
                    self.platform.write(wr, Level::High);
                }
                for pin in [gpio.signal, gpio.signal_b].into_iter().flatten() {
                    self.platform.configure(pin, Direction::Input);
                }
            }
            Binding::Bus(bus) => {
                if self.platform.transaction(bus.address, &[]).is_err() {
                    warn!(address = bus.address, "bus address probe failed");
                    return Err(SwitchError::Init("bus address probe failed"));
                }
            }
            Binding::SoftSpi(spi) => {
                self.platform.configure(spi.cs, Direction::Output);
                self.platform.write(spi.cs, Level::High);
                self.platform.configure(spi.clk, Direction::Output);
                self.platform.write(spi.clk, Level::Low);
                self.platform.configure(spi.data, Direction::Output);
                self.platform.write(spi.data, Level::Low);
            }
        }
        self.enable();
        info!(
            max_channels = self.config.max_channels,
            policy = ?self.config.policy,
            "device initialized"
        );
        Ok(())
    }

    /// Select a channel
    ///
    /// Validates first; nothing reaches the hardware on a rejected
    /// request. In batch-capture mode the validated request is recorded
    /// for later replay instead of driven.
    pub fn set_channel(&mut self, channel: u8) -> Result<(), SwitchError> {
        if !is_valid_channel(channel, self.config.max_channels) {
            return Err(SwitchError::ChannelInvalid {
                channel,
                max: self.config.max_channels,
            });
        }
        if !self.enabled {
            return Err(SwitchError::NotEnabled);
        }
        if self.batch.is_capturing() {
            return self.batch.capture(channel);
        }
        self.drive(channel)
    }

    /// Execute the hardware sequence for a validated channel
    fn drive(&mut self, channel: u8) -> Result<(), SwitchError> {
        if let Some(gate) = self.gate {
            while self.platform.read(gate) == Level::High {
                self.platform.delay_us(1);
            }
        }
        if let Some(fade) = self.fade {
            self.run_fade(fade);
        }
        match &self.config.binding {
            Binding::Gpio(gpio) => {
                let code = self.config.encoding.encode(channel);
                drive_select(
                    &mut self.platform,
                    &gpio.select,
                    gpio.enable,
                    gpio.load,
                    self.config.policy,
                    code,
                );
            }
            Binding::Bus(bus) => {
                self.platform
                    .transaction(bus.address, &[bus.code.select_byte(channel)])?;
            }
            Binding::SoftSpi(spi) => {
                let spi = *spi;
                let word = self.config.encoding.encode(channel);
                self.platform.write(spi.cs, Level::Low);
                for bit in (0..8).rev() {
                    self.platform
                        .write(spi.data, Level::from_bit((word >> bit) & 0x01 == 1));
                    self.platform.write(spi.clk, Level::High);
                    self.platform.delay_us(1);
                    self.platform.write(spi.clk, Level::Low);
                    self.platform.delay_us(1);
                }
                self.platform.write(spi.cs, Level::High);
            }
        }
        if let Some(fade) = self.fade {
            self.run_fade(fade);
        }
        self.published.store(channel, Ordering::Release);
        if self.auto_read && usize::from(channel) < MAX_DEVICE_CHANNELS {
            if let Some(signal) = self.gpio_binding().and_then(|g| g.signal) {
                self.platform
                    .delay_us(u32::from(self.config.settling_time_us));
                self.samples[usize::from(channel)] = self.platform.sample(signal);
            }
        }
        debug!(channel, "channel selected");
        Ok(())
    }

    fn run_fade(&mut self, fade: FadeProfile) {
        for _ in 0..fade.steps {
            self.platform.delay_us(u32::from(fade.delay_us));
        }
    }

    /// The most recently selected channel
    ///
    /// Meaningful once a successful switch has occurred; 0 before that.
    pub fn channel(&self) -> u8 {
        self.published.load(Ordering::Acquire)
    }

    /// Drive the output stage active
    pub fn enable(&mut self) {
        if let Binding::Gpio(gpio) = &self.config.binding {
            if let Some(en) = gpio.enable {
                self.platform.write(en, Level::Low);
            }
        }
        self.enabled = true;
    }

    /// Suspend the output stage without losing configuration
    pub fn disable(&mut self) {
        if let Binding::Gpio(gpio) = &self.config.binding {
            if let Some(en) = gpio.enable {
                self.platform.write(en, Level::High);
            }
        }
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Select, settle, sample the primary signal path
    pub fn try_read_channel(&mut self, channel: u8) -> Result<u16, SwitchError> {
        let signal = self.signal_pin()?;
        self.switch_for_read(channel)?;
        self.platform
            .delay_us(u32::from(self.config.settling_time_us));
        Ok(self.platform.sample(signal))
    }

    /// Like [`try_read_channel`](Self::try_read_channel) but degrades to
    /// the 0 sentinel on failure, for call sites that cannot express a
    /// status inline. Callers that must distinguish "zero" from "failed"
    /// use the `try_` form.
    pub fn read_channel(&mut self, channel: u8) -> u16 {
        self.try_read_channel(channel).unwrap_or(0)
    }

    /// Select, settle, sample the second signal path (dual variants)
    pub fn read_channel_b(&mut self, channel: u8) -> u16 {
        let Some(signal_b) = self.gpio_binding().and_then(|g| g.signal_b) else {
            return 0;
        };
        if self.switch_for_read(channel).is_err() {
            return 0;
        }
        self.platform
            .delay_us(u32::from(self.config.settling_time_us));
        self.platform.sample(signal_b)
    }

    /// Sample both signal paths and return the signed difference
    pub fn try_read_differential(&mut self, channel: u8) -> Result<i16, SwitchError> {
        let gpio = self
            .gpio_binding()
            .copied()
            .ok_or(SwitchError::Init("no signal path bound"))?;
        let (Some(a), Some(b)) = (gpio.signal, gpio.signal_b) else {
            return Err(SwitchError::Init("no signal path bound"));
        };
        self.switch_for_read(channel)?;
        self.platform
            .delay_us(u32::from(self.config.settling_time_us));
        let diff = i32::from(self.platform.sample(a)) - i32::from(self.platform.sample(b));
        // Full-scale u16 differences exceed i16; saturate at the rails
        Ok(diff.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16)
    }

    /// Sentinel-0 form of [`try_read_differential`](Self::try_read_differential)
    pub fn read_differential(&mut self, channel: u8) -> i16 {
        self.try_read_differential(channel).unwrap_or(0)
    }

    /// Drive three independent 2-state switches directly
    ///
    /// Bypasses the single-integer channel model (triple-switch chips like
    /// the HC4053); the published channel is untouched. Honors the
    /// device's timing policy, including break-before-make when an enable
    /// line is bound.
    pub fn set_switches(&mut self, s1: bool, s2: bool, s3: bool) -> Result<(), SwitchError> {
        let gpio = self
            .gpio_binding()
            .copied()
            .ok_or(SwitchError::Init("triple-switch mode needs a GPIO binding"))?;
        if gpio.select.len() < 3 {
            return Err(SwitchError::Init(
                "triple-switch mode needs three select lines",
            ));
        }
        if !self.enabled {
            return Err(SwitchError::NotEnabled);
        }
        let code = u8::from(s1) | u8::from(s2) << 1 | u8::from(s3) << 2;
        drive_select(
            &mut self.platform,
            &gpio.select,
            gpio.enable,
            gpio.load,
            self.config.policy,
            code,
        );
        Ok(())
    }

    // --- switch conditioning ----------------------------------------------

    /// Hold every switch until `pin` reads low
    ///
    /// For signals that must only be rerouted inside a quiet window, like
    /// a video mux waiting out the active scanline on a sync input. The
    /// wait is a busy poll; `None` removes the gate.
    pub fn set_switch_gate(&mut self, pin: Option<PinId>) {
        if let Some(gate) = pin {
            self.platform.configure(gate, Direction::Input);
        }
        self.gate = pin;
    }

    /// Busy-wait `steps` periods of `delay_us` on both sides of every
    /// switch (audio-style fade out / fade in)
    pub fn set_fade(&mut self, steps: u8, delay_us: u16) {
        self.fade = Some(FadeProfile { steps, delay_us });
    }

    /// Switch without fade delays again
    pub fn clear_fade(&mut self) {
        self.fade = None;
    }

    /// Sample and cache the signal path after every successful switch
    ///
    /// A no-op request on devices without a signal path.
    pub fn set_auto_read(&mut self, enabled: bool) {
        self.auto_read = enabled && self.gpio_binding().and_then(|g| g.signal).is_some();
    }

    /// Last cached sample for `channel`; 0 until auto-read stored one
    pub fn channel_value(&self, channel: u8) -> u16 {
        if !is_valid_channel(channel, self.config.max_channels) {
            return 0;
        }
        self.samples
            .get(usize::from(channel))
            .copied()
            .unwrap_or(0)
    }

    // --- scanning ---------------------------------------------------------

    /// Begin scanning `[start, end]`; false if either bound is invalid
    pub fn start_scan(&mut self, start: u8, end: u8) -> bool {
        let now = self.platform.now_ms();
        let started = self.scan.start(start, end, self.config.max_channels, now);
        if started {
            debug!(start, end, "scan started");
        }
        started
    }

    /// Stop scanning; the current channel stays where the last tick left it
    pub fn stop_scan(&mut self) {
        self.scan.stop();
    }

    pub fn is_scanning(&self) -> bool {
        self.scan.is_active()
    }

    /// Milliseconds between scan steps
    pub fn set_scan_interval(&mut self, interval_ms: u64) {
        self.scan.set_interval_ms(interval_ms);
    }

    /// Advance the scan if a step is due; call periodically from the
    /// foreground loop
    pub fn poll_scan(&mut self) -> Result<(), SwitchError> {
        let now = self.platform.now_ms();
        match self.scan.tick(now) {
            Some(channel) => self.set_channel(channel),
            None => Ok(()),
        }
    }

    // --- interrupts -------------------------------------------------------

    /// Bind `callback` to trigger conditions on `pin`
    ///
    /// The callback receives the channel active at trigger time. At most
    /// one binding per device; attaching again overwrites.
    pub fn attach_interrupt<F>(&mut self, pin: PinId, mode: TriggerMode, callback: F)
    where
        F: FnMut(u8) + Send + 'static,
    {
        self.platform.configure(pin, Direction::Input);
        self.relay.attach(
            &mut self.platform,
            pin,
            mode,
            Arc::clone(&self.published),
            callback,
        );
    }

    /// Revoke the trigger binding; safe to call when none exists
    pub fn detach_interrupt(&mut self) {
        self.relay.detach(&mut self.platform);
    }

    pub fn has_interrupt(&self) -> bool {
        self.relay.is_attached()
    }

    // --- batching ---------------------------------------------------------

    /// Start capturing `set_channel` calls instead of driving them
    pub fn begin_batch(&mut self) {
        self.batch.begin();
    }

    /// Replay the captured sequence in capture order
    ///
    /// Stops at the first failing entry; the buffer is cleared only after
    /// a fully successful replay.
    pub fn flush_batch(&mut self) -> Result<(), SwitchError> {
        let entries = self.batch.end_capture();
        let len = self.batch.len();
        for &channel in &entries[..len] {
            self.set_channel(channel)?;
            self.platform.delay_us(1);
        }
        self.batch.clear();
        Ok(())
    }

    /// Drop any captured entries and leave capture mode
    pub fn clear_batch(&mut self) {
        self.batch.clear();
    }

    /// Entries currently captured
    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    // --- calibration ------------------------------------------------------

    /// Store a channel's linear correction (gain 1024 = unity)
    pub fn set_calibration(&mut self, channel: u8, offset: i16, gain: u16) {
        self.calibration
            .set(channel, self.config.max_channels, offset, gain);
    }

    /// Apply a channel's correction to a raw value
    pub fn apply_calibration(&self, channel: u8, raw: i16) -> i16 {
        self.calibration
            .apply(channel, self.config.max_channels, raw)
    }

    // --- power & diagnostics ----------------------------------------------

    /// Enter low-power state; a no-op for chips without one
    pub fn sleep(&mut self) {
        debug!("sleep requested (no-op for this device)");
    }

    /// Leave low-power state
    pub fn wake(&mut self) {
        debug!("wake requested (no-op for this device)");
    }

    /// Basic liveness check: bus devices re-probe their address, GPIO
    /// devices have nothing to check and pass
    pub fn self_test(&mut self) -> bool {
        match &self.config.binding {
            Binding::Gpio(_) | Binding::SoftSpi(_) => true,
            Binding::Bus(bus) => {
                let address = bus.address;
                self.platform.transaction(address, &[]).is_ok()
            }
        }
    }

    /// Diagnostic word; 0 for devices without diagnostics
    pub fn read_diagnostics(&self) -> u16 {
        0
    }

    // --- configuration ----------------------------------------------------

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn max_channels(&self) -> u8 {
        self.config.max_channels
    }

    pub fn settling_time_us(&self) -> u16 {
        self.config.settling_time_us
    }

    pub fn set_settling_time(&mut self, microseconds: u16) {
        self.config.settling_time_us = microseconds;
    }

    // --- internals --------------------------------------------------------

    /// The platform handle, for platform-specific side channels (reset
    /// pulses, scripting in tests)
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    fn gpio_binding(&self) -> Option<&GpioBinding> {
        match &self.config.binding {
            Binding::Gpio(gpio) => Some(gpio),
            _ => None,
        }
    }

    fn signal_pin(&self) -> Result<PinId, SwitchError> {
        self.gpio_binding()
            .and_then(|g| g.signal)
            .ok_or(SwitchError::Init("no signal path bound"))
    }

    /// Validated switch for read paths; never captured into a batch
    fn switch_for_read(&mut self, channel: u8) -> Result<(), SwitchError> {
        if !is_valid_channel(channel, self.config.max_channels) {
            return Err(SwitchError::ChannelInvalid {
                channel,
                max: self.config.max_channels,
            });
        }
        if !self.enabled {
            return Err(SwitchError::NotEnabled);
        }
        self.drive(channel)
    }
}

impl<P: Platform> Drop for MuxDevice<P> {
    /// Detach the interrupt binding before any other state goes away, so
    /// no hook can observe a partially destroyed device
    fn drop(&mut self) {
        self.relay.detach(&mut self.platform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mux_sim::SimBoard;

    fn three_line_config(enable: Option<PinId>) -> DeviceConfig {
        DeviceConfig {
            binding: Binding::Gpio(GpioBinding {
                select: SelectLines::new(&[PinId(2), PinId(3), PinId(4)]).unwrap(),
                enable,
                load: None,
                signal: Some(PinId(14)),
                signal_b: None,
            }),
            policy: SwitchPolicy::DirectWrite,
            encoding: ChannelEncoding::Identity,
            max_channels: 8,
            settling_time_us: 10,
        }
    }

    #[test]
    fn direct_write_walk() {
        let board = SimBoard::new();
        let mut dev = MuxDevice::new(board.clone(), three_line_config(None));

        dev.begin().unwrap();
        dev.set_channel(5).unwrap();

        assert_eq!(board.pin_level(PinId(2)), Some(Level::High));
        assert_eq!(board.pin_level(PinId(3)), Some(Level::Low));
        assert_eq!(board.pin_level(PinId(4)), Some(Level::High));
        assert_eq!(dev.channel(), 5);
    }

    #[test]
    fn invalid_channel_rejected_without_side_effects() {
        let board = SimBoard::new();
        let mut dev = MuxDevice::new(board.clone(), three_line_config(None));
        dev.begin().unwrap();
        dev.set_channel(5).unwrap();
        let before = board.events().len();

        assert_eq!(
            dev.set_channel(9),
            Err(SwitchError::ChannelInvalid { channel: 9, max: 8 })
        );
        assert_eq!(dev.channel(), 5);
        assert_eq!(board.events().len(), before);
    }

    #[test]
    fn disabled_device_rejects_switch() {
        let board = SimBoard::new();
        let mut dev = MuxDevice::new(board.clone(), three_line_config(None));
        dev.begin().unwrap();
        dev.disable();
        let before = board.events().len();

        assert_eq!(dev.set_channel(1), Err(SwitchError::NotEnabled));
        assert_eq!(board.events().len(), before);
    }

    #[test]
    fn begin_rejects_short_select_list() {
        let board = SimBoard::new();
        let mut config = three_line_config(None);
        config.max_channels = 16; // needs 4 lines, only 3 bound
        let mut dev = MuxDevice::new(board, config);

        assert_eq!(
            dev.begin(),
            Err(SwitchError::Init("insufficient select lines for channel count"))
        );
    }

    #[test]
    fn one_hot_select_byte() {
        assert_eq!(BusCode::OneHot.select_byte(0), 0b0000_0001);
        assert_eq!(BusCode::OneHot.select_byte(7), 0b1000_0000);
    }

    #[test]
    fn direct_select_byte_ors_enable_bit() {
        let code = BusCode::Direct { enable_bit: 0x08 };
        assert_eq!(code.select_byte(5), 0x0D);
    }

    #[test]
    fn bus_device_switches_over_bus() {
        let board = SimBoard::new();
        let config = DeviceConfig {
            binding: Binding::Bus(BusBinding {
                address: 0x70,
                code: BusCode::OneHot,
            }),
            policy: SwitchPolicy::DirectWrite,
            encoding: ChannelEncoding::Identity,
            max_channels: 8,
            settling_time_us: 0,
        };
        let mut dev = MuxDevice::new(board.clone(), config);

        dev.begin().unwrap();
        dev.set_channel(3).unwrap();

        let writes = board.bus_writes(0x70);
        assert_eq!(writes.last().unwrap(), &vec![0b0000_1000]);
    }

    fn bus_config() -> DeviceConfig {
        DeviceConfig {
            binding: Binding::Bus(BusBinding {
                address: 0x70,
                code: BusCode::OneHot,
            }),
            policy: SwitchPolicy::DirectWrite,
            encoding: ChannelEncoding::Identity,
            max_channels: 8,
            settling_time_us: 0,
        }
    }

    #[test]
    fn fade_delays_bracket_the_select_writes() {
        let board = SimBoard::new();
        let mut dev = MuxDevice::new(board.clone(), three_line_config(None));
        dev.begin().unwrap();
        dev.set_fade(2, 3);
        board.clear_events();

        dev.set_channel(1).unwrap();

        let events = board.events();
        assert_eq!(events.len(), 7); // 2 fade-out, 3 selects, 2 fade-in
        assert!(matches!(events[0], mux_sim::SimEvent::Delay { us: 3 }));
        assert!(matches!(events[1], mux_sim::SimEvent::Delay { us: 3 }));
        assert!(matches!(events[5], mux_sim::SimEvent::Delay { us: 3 }));
        assert!(matches!(events[6], mux_sim::SimEvent::Delay { us: 3 }));

        dev.clear_fade();
        board.clear_events();
        dev.set_channel(2).unwrap();
        assert_eq!(board.events().len(), 3);
    }

    #[test]
    fn gated_switch_polls_the_gate_before_driving() {
        let board = SimBoard::new();
        let mut dev = MuxDevice::new(board.clone(), three_line_config(None));
        dev.begin().unwrap();
        dev.set_switch_gate(Some(PinId(9)));
        assert_eq!(board.pin_direction(PinId(9)), Some(Direction::Input));
        board.clear_events();

        dev.set_channel(3).unwrap();

        // Gate idles low on the sim board, so one poll and straight through
        let events = board.events();
        assert!(matches!(
            events[0],
            mux_sim::SimEvent::Read { pin: PinId(9), level: Level::Low }
        ));
        assert_eq!(dev.channel(), 3);
    }

    #[test]
    fn auto_read_caches_each_selected_channel() {
        let board = SimBoard::new();
        let mut dev = MuxDevice::new(board.clone(), three_line_config(None));
        dev.begin().unwrap();
        dev.set_auto_read(true);

        board.set_analog(PinId(14), 432);
        dev.set_channel(2).unwrap();
        board.set_analog(PinId(14), 901);
        dev.set_channel(6).unwrap();

        assert_eq!(dev.channel_value(2), 432);
        assert_eq!(dev.channel_value(6), 901);
        assert_eq!(dev.channel_value(3), 0); // never selected
        assert_eq!(dev.channel_value(9), 0); // out of range
    }

    #[test]
    fn auto_read_stays_off_without_a_signal_path() {
        let board = SimBoard::new();
        let mut dev = MuxDevice::new(board.clone(), bus_config());
        dev.begin().unwrap();
        dev.set_auto_read(true);

        dev.set_channel(1).unwrap();

        assert_eq!(dev.channel_value(1), 0);
    }

    #[test]
    fn switch_bypass_needs_gpio_wiring() {
        let board = SimBoard::new();
        let mut dev = MuxDevice::new(board, bus_config());
        dev.begin().unwrap();

        assert_eq!(
            dev.set_switches(true, true, true),
            Err(SwitchError::Init("triple-switch mode needs a GPIO binding"))
        );
    }

    #[test]
    fn bus_probe_failure_is_init_error() {
        let board = SimBoard::new();
        board.fail_address(0x70, 2);
        let config = DeviceConfig {
            binding: Binding::Bus(BusBinding {
                address: 0x70,
                code: BusCode::OneHot,
            }),
            policy: SwitchPolicy::DirectWrite,
            encoding: ChannelEncoding::Identity,
            max_channels: 8,
            settling_time_us: 0,
        };
        let mut dev = MuxDevice::new(board, config);

        assert_eq!(dev.begin(), Err(SwitchError::Init("bus address probe failed")));
        assert!(!dev.is_enabled());
    }
}
