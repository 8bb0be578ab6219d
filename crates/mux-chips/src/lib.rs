//! Chip Catalog
//!
//! One constructor per supported part number. Each constructor is a thin
//! data binding: it fills in a `mux_core::DeviceConfig` with the part's
//! pin layout, switching policy, channel encoding, channel count and
//! datasheet settling time, then hands it to the generic
//! [`MuxDevice`](mux_core::MuxDevice) driver. No chip gets its own
//! driver type.
//!
//! Constructors never touch the hardware; call
//! [`begin`](mux_core::MuxDevice::begin) on the returned device first.

pub mod analog;
pub mod digital;
pub mod i2c;
pub mod spi;

pub use analog::{
    adg506a, adg507a, adg508a, adg509a, adg706, adg707, dg408, dg409, hc4051, hc4052, hc4053,
    hc4067, max4051a, max4582, mpc506a, mpc507a,
};
pub use digital::{cd74hc4067, hc405x, Hc405xKind};
pub use i2c::{pca9547, pca9646, pulse_reset, tca9548a};
pub use spi::adg731;
