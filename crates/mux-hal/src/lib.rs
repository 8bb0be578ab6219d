//! Platform Capability Traits
//!
//! This crate defines the hardware capability surface that multiplexer
//! drivers are written against. The drivers in `mux-core` never touch a
//! register or a bus directly; they ask an abstract platform to:
//!
//! - drive and read digital pins ([`DigitalIo`])
//! - take raw analog samples ([`AnalogInput`])
//! - run addressed bus write transactions ([`BusMaster`])
//! - busy-wait for microseconds and read a millisecond clock ([`Clock`])
//! - register and revoke pin-trigger hooks ([`InterruptRegistry`])
//!
//! A platform (a microcontroller HAL shim, or the simulated board in
//! `mux-sim`) implements all five; the [`Platform`] umbrella trait is
//! blanket-implemented for any such type.
//!
//! Pin writes and reads are infallible by contract: a driver validates its
//! own preconditions before touching any pin, and the platform is a
//! trusted, already-tested service. Only bus transactions can fail, and
//! they report the controller's completion code through [`BusFault`].

pub mod bus;
pub mod pin;
pub mod trigger;

pub use bus::{BusFault, BusMaster};
pub use pin::{AnalogInput, DigitalIo, Direction, Level, PinId};
pub use trigger::{InterruptRegistry, TriggerHook, TriggerMode};

/// Millisecond/microsecond timing capability
///
/// `delay_us` is a bounded busy wait, never a scheduler yield; drivers use
/// it for settle and latch timing in the tens-of-microseconds range.
/// `now_ms` is a monotonic wall-clock counter used by the scan controller.
pub trait Clock {
    /// Busy-wait for `us` microseconds
    fn delay_us(&mut self, us: u32);

    /// Monotonic millisecond counter
    fn now_ms(&mut self) -> u64;
}

/// Umbrella trait for a complete platform
///
/// Blanket-implemented for anything that provides all five capabilities,
/// so device drivers can take a single `P: Platform` parameter.
pub trait Platform: DigitalIo + AnalogInput + BusMaster + Clock + InterruptRegistry {}

impl<T> Platform for T where T: DigitalIo + AnalogInput + BusMaster + Clock + InterruptRegistry {}
