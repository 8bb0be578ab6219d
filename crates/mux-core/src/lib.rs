//! Multiplexer Channel-Selection Engine
//!
//! This crate provides the core logic for driving multi-channel
//! multiplexer chips (analog switches, GPIO-selected muxes, latched
//! address switches, I2C-addressed switch banks) from a single generic
//! device abstraction.
//!
//! # Architecture
//!
//! A [`MuxDevice`] binds a [`DeviceConfig`] (pin layout or bus address,
//! switching policy, channel encoding, channel count, settling time) to
//! a platform implementing the `mux-hal` capability traits. Chip-specific
//! behavior is data, not a subclass: every supported part number in
//! `mux-chips` is just a different config handed to the same driver.
//!
//! The switching sequence itself lives in the protocol-pure
//! [`engine`] module and comes in three timing policies:
//!
//! - **Direct write**: all select bits at once
//! - **Break-before-make**: disable, settle, write, settle, re-enable
//! - **Write pulse**: address setup, then a latch pulse
//!
//! # Example
//!
//! ```rust,no_run
//! use mux_core::{Binding, ChannelEncoding, DeviceConfig, GpioBinding,
//!                MuxDevice, SelectLines, SwitchPolicy};
//! use mux_hal::PinId;
//! use mux_sim::SimBoard;
//!
//! let config = DeviceConfig {
//!     binding: Binding::Gpio(GpioBinding::select_only(
//!         SelectLines::new(&[PinId(2), PinId(3), PinId(4)]).unwrap(),
//!     )),
//!     policy: SwitchPolicy::BreakBeforeMake,
//!     encoding: ChannelEncoding::Identity,
//!     max_channels: 8,
//!     settling_time_us: 10,
//! };
//!
//! let mut mux = MuxDevice::new(SimBoard::new(), config);
//! mux.begin().unwrap();
//! mux.set_channel(5).unwrap();
//! assert_eq!(mux.channel(), 5);
//! ```

pub mod batch;
pub mod calibration;
pub mod channel;
pub mod device;
pub mod engine;
pub mod error;
pub mod interrupt;
pub mod scan;
pub mod util;

pub use batch::{BatchBuffer, BATCH_CAPACITY};
pub use calibration::{CalEntry, CalTable, MAX_CAL_CHANNELS, UNITY_GAIN};
pub use channel::{is_valid_channel, ChannelEncoding};
pub use device::{
    Binding, BusBinding, BusCode, DeviceConfig, GpioBinding, MuxDevice, SpiBinding,
    MAX_DEVICE_CHANNELS,
};
pub use engine::{drive_select, SelectLines, SwitchPolicy, MAX_SELECT_LINES};
pub use error::SwitchError;
pub use interrupt::InterruptRelay;
pub use scan::{ScanState, DEFAULT_SCAN_INTERVAL_MS};
