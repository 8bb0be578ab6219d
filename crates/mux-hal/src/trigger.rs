//! Pin-trigger (interrupt) registration capability

use crate::pin::PinId;

/// Edge or level condition that fires a registered hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerMode {
    LowLevel,
    HighLevel,
    FallingEdge,
    RisingEdge,
    /// Either edge
    Change,
}

/// Hook invoked by the platform when a trigger condition fires
///
/// May run preemptively relative to the foreground thread; hooks must
/// restrict themselves to single-word atomic reads of shared state.
pub type TriggerHook = Box<dyn FnMut() + Send>;

/// Interrupt registration capability
///
/// One hook per pin. Registering a pin that already has a hook replaces
/// it; unregistering a pin with no hook is a no-op. `unregister` must drop
/// the hook so it can never fire again.
pub trait InterruptRegistry {
    /// Register `hook` to fire on `mode` conditions of `pin`
    fn register(&mut self, pin: PinId, mode: TriggerMode, hook: TriggerHook);

    /// Revoke any hook registered for `pin`
    fn unregister(&mut self, pin: PinId);
}
