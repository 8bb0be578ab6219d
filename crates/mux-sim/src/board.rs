//! The simulated board

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use mux_hal::{
    AnalogInput, BusFault, BusMaster, Clock, DigitalIo, Direction, InterruptRegistry, Level,
    PinId, TriggerHook, TriggerMode,
};
use tracing::debug;

use crate::event::SimEvent;

#[derive(Default)]
struct BoardInner {
    levels: HashMap<PinId, Level>,
    directions: HashMap<PinId, Direction>,
    analog: HashMap<PinId, u16>,
    events: Vec<SimEvent>,
    bus_log: HashMap<u8, Vec<Vec<u8>>>,
    bus_faults: HashMap<u8, u8>,
    hooks: HashMap<PinId, TriggerHook>,
    now_ms: u64,
    waited_us: u64,
}

/// In-memory platform with an inspectable event log
///
/// Cloning yields another handle to the same board, so a test can hand
/// one handle to a device and keep another for scripting and assertions.
#[derive(Clone, Default)]
pub struct SimBoard {
    inner: Arc<Mutex<BoardInner>>,
}

impl SimBoard {
    pub fn new() -> Self {
        SimBoard::default()
    }

    fn inner(&self) -> MutexGuard<'_, BoardInner> {
        self.inner.lock().expect("sim board lock poisoned")
    }

    // --- scripting --------------------------------------------------------

    /// Set the raw value a signal pin samples at
    pub fn set_analog(&self, pin: PinId, value: u16) {
        self.inner().analog.insert(pin, value);
    }

    /// Drive an input pin from "outside" (does not log a driver event)
    pub fn set_level(&self, pin: PinId, level: Level) {
        self.inner().levels.insert(pin, level);
    }

    /// Make transactions to `address` fail with `code`
    pub fn fail_address(&self, address: u8, code: u8) {
        self.inner().bus_faults.insert(address, code);
    }

    /// Let transactions to `address` succeed again
    pub fn heal_address(&self, address: u8) {
        self.inner().bus_faults.remove(&address);
    }

    /// Advance the millisecond clock
    pub fn advance(&self, ms: u64) {
        self.inner().now_ms += ms;
    }

    /// Fire the hook registered on `pin`, if any
    ///
    /// Runs the hook outside the board lock, the way a real interrupt
    /// runs outside the foreground thread's control flow.
    pub fn trigger(&self, pin: PinId) {
        let hook = self.inner().hooks.remove(&pin);
        if let Some(mut hook) = hook {
            hook();
            // Keep the registration unless the hook re-registered itself
            self.inner().hooks.entry(pin).or_insert(hook);
        }
    }

    // --- inspection -------------------------------------------------------

    /// Snapshot of the event log
    pub fn events(&self) -> Vec<SimEvent> {
        self.inner().events.clone()
    }

    /// Forget recorded events (pin state and clock are kept)
    pub fn clear_events(&self) {
        self.inner().events.clear();
    }

    /// Last driven or scripted level of a pin
    pub fn pin_level(&self, pin: PinId) -> Option<Level> {
        self.inner().levels.get(&pin).copied()
    }

    /// Configured direction of a pin
    pub fn pin_direction(&self, pin: PinId) -> Option<Direction> {
        self.inner().directions.get(&pin).copied()
    }

    /// Payloads written to a bus address, oldest first
    pub fn bus_writes(&self, address: u8) -> Vec<Vec<u8>> {
        self.inner().bus_log.get(&address).cloned().unwrap_or_default()
    }

    /// Whether a hook is currently registered on `pin`
    pub fn has_hook(&self, pin: PinId) -> bool {
        self.inner().hooks.contains_key(&pin)
    }

    /// Total microseconds of busy waiting the driver requested
    pub fn waited_us(&self) -> u64 {
        self.inner().waited_us
    }
}

impl DigitalIo for SimBoard {
    fn configure(&mut self, pin: PinId, direction: Direction) {
        let mut inner = self.inner();
        inner.directions.insert(pin, direction);
        inner.events.push(SimEvent::Configure { pin, direction });
    }

    fn write(&mut self, pin: PinId, level: Level) {
        let mut inner = self.inner();
        inner.levels.insert(pin, level);
        inner.events.push(SimEvent::Write { pin, level });
    }

    fn read(&mut self, pin: PinId) -> Level {
        let mut inner = self.inner();
        let level = inner.levels.get(&pin).copied().unwrap_or(Level::Low);
        inner.events.push(SimEvent::Read { pin, level });
        level
    }
}

impl AnalogInput for SimBoard {
    fn sample(&mut self, pin: PinId) -> u16 {
        let mut inner = self.inner();
        let value = inner.analog.get(&pin).copied().unwrap_or(0);
        inner.events.push(SimEvent::Sample { pin, value });
        value
    }
}

impl BusMaster for SimBoard {
    fn transaction(&mut self, address: u8, payload: &[u8]) -> Result<(), BusFault> {
        let mut inner = self.inner();
        let fault = inner.bus_faults.get(&address).copied();
        inner.events.push(SimEvent::BusWrite {
            address,
            payload: payload.to_vec(),
            ok: fault.is_none(),
        });
        match fault {
            Some(code) => {
                debug!(address, code, "simulated bus NAK");
                Err(BusFault::new(code))
            }
            None => {
                inner.bus_log.entry(address).or_default().push(payload.to_vec());
                Ok(())
            }
        }
    }
}

impl Clock for SimBoard {
    fn delay_us(&mut self, us: u32) {
        let mut inner = self.inner();
        inner.waited_us += u64::from(us);
        inner.events.push(SimEvent::Delay { us });
    }

    fn now_ms(&mut self) -> u64 {
        self.inner().now_ms
    }
}

impl InterruptRegistry for SimBoard {
    fn register(&mut self, pin: PinId, mode: TriggerMode, hook: TriggerHook) {
        let mut inner = self.inner();
        inner.hooks.insert(pin, hook);
        inner.events.push(SimEvent::Register { pin, mode });
        debug!(pin = pin.0, ?mode, "hook registered");
    }

    fn unregister(&mut self, pin: PinId) {
        let mut inner = self.inner();
        inner.hooks.remove(&pin);
        inner.events.push(SimEvent::Unregister { pin });
    }
}
