//! Interrupt relay: trigger-pin to callback binding
//!
//! The relay registers a hook through the platform's [`InterruptRegistry`]
//! and hands the user callback the channel that was active at trigger
//! time. The channel travels through a shared `AtomicU8` cell, the only
//! state the asynchronous context ever touches, read with a single-word
//! atomic load. The hook never mutates device state and never calls back
//! into the switching path.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use mux_hal::{InterruptRegistry, PinId, TriggerMode};
use tracing::debug;

/// At-most-one trigger binding for a device
///
/// An explicit registration (pin handle kept here, hook handed to the
/// platform) instead of a file-scope instance pointer, so multiple devices
/// can each carry their own binding and revoking one cannot orphan
/// another's hook.
#[derive(Debug, Default)]
pub struct InterruptRelay {
    bound: Option<PinId>,
}

impl InterruptRelay {
    pub fn new() -> Self {
        InterruptRelay { bound: None }
    }

    /// Bind `callback` to trigger conditions on `pin`
    ///
    /// Overwrites any existing binding. `channel_cell` is the device's
    /// published-channel cell; the hook loads it at trigger time.
    pub fn attach<R, F>(
        &mut self,
        registry: &mut R,
        pin: PinId,
        mode: TriggerMode,
        channel_cell: Arc<AtomicU8>,
        mut callback: F,
    ) where
        R: InterruptRegistry,
        F: FnMut(u8) + Send + 'static,
    {
        self.detach(registry);
        registry.register(
            pin,
            mode,
            Box::new(move || callback(channel_cell.load(Ordering::Acquire))),
        );
        self.bound = Some(pin);
        debug!(pin = pin.0, ?mode, "interrupt attached");
    }

    /// Revoke the current binding, if any. Idempotent.
    pub fn detach<R: InterruptRegistry>(&mut self, registry: &mut R) {
        if let Some(pin) = self.bound.take() {
            registry.unregister(pin);
            debug!(pin = pin.0, "interrupt detached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.bound.is_some()
    }

    /// Pin of the current binding
    pub fn pin(&self) -> Option<PinId> {
        self.bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use mux_sim::SimBoard;

    #[test]
    fn hook_reports_published_channel() {
        let mut board = SimBoard::new();
        let mut relay = InterruptRelay::new();
        let cell = Arc::new(AtomicU8::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        relay.attach(&mut board, PinId(5), TriggerMode::FallingEdge, Arc::clone(&cell), {
            move |ch| sink.lock().unwrap().push(ch)
        });

        cell.store(6, Ordering::Release);
        board.trigger(PinId(5));
        cell.store(2, Ordering::Release);
        board.trigger(PinId(5));

        assert_eq!(*seen.lock().unwrap(), vec![6, 2]);
    }

    #[test]
    fn detach_is_idempotent() {
        let mut board = SimBoard::new();
        let mut relay = InterruptRelay::new();

        relay.detach(&mut board);
        relay.detach(&mut board);
        assert!(!relay.is_attached());
    }

    #[test]
    fn attach_overwrites_previous_binding() {
        let mut board = SimBoard::new();
        let mut relay = InterruptRelay::new();
        let cell = Arc::new(AtomicU8::new(4));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        relay.attach(&mut board, PinId(5), TriggerMode::Change, Arc::clone(&cell), {
            move |_| first.lock().unwrap().push("first")
        });
        let second = Arc::clone(&seen);
        relay.attach(&mut board, PinId(6), TriggerMode::Change, Arc::clone(&cell), {
            move |_| second.lock().unwrap().push("second")
        });

        // Old pin hook was revoked along with the rebind
        board.trigger(PinId(5));
        board.trigger(PinId(6));

        assert_eq!(*seen.lock().unwrap(), vec!["second"]);
    }

    #[test]
    fn detached_hook_never_fires() {
        let mut board = SimBoard::new();
        let mut relay = InterruptRelay::new();
        let cell = Arc::new(AtomicU8::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        relay.attach(&mut board, PinId(3), TriggerMode::RisingEdge, cell, {
            move |ch| sink.lock().unwrap().push(ch)
        });
        relay.detach(&mut board);

        board.trigger(PinId(3));
        assert!(seen.lock().unwrap().is_empty());
    }
}
