//! Scan controller: clock-driven cyclic advance through a channel range

use serde::{Deserialize, Serialize};

use crate::channel::is_valid_channel;

/// Default milliseconds between scan steps
pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 100;

/// State machine for automatic channel scanning
///
/// `Idle -> Scanning -> Idle`. The cursor is primed one step before the
/// range start so the first due tick lands exactly on `range_start`; the
/// device's published channel is untouched until that tick actually
/// switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanState {
    active: bool,
    range_start: u8,
    range_end: u8,
    interval_ms: u64,
    last_tick_ms: u64,
    /// Channel selected by the previous tick; `None` right after `start`
    cursor: Option<u8>,
}

impl ScanState {
    pub fn new() -> Self {
        ScanState {
            active: false,
            range_start: 0,
            range_end: 0,
            interval_ms: DEFAULT_SCAN_INTERVAL_MS,
            last_tick_ms: 0,
            cursor: None,
        }
    }

    /// Enter `Scanning` over `[start, end]`
    ///
    /// Both bounds are validated against `max_channels`; an invalid bound
    /// rejects the request and leaves any scan in progress untouched.
    /// Starting while already scanning overwrites the range (last call
    /// wins). An inverted range (`start > end`) is accepted and pins the
    /// scan to `start`: every advance trips the wrap rule immediately.
    /// Callers wanting a rejection must order the bounds themselves.
    pub fn start(&mut self, start: u8, end: u8, max_channels: u8, now_ms: u64) -> bool {
        if !is_valid_channel(start, max_channels) || !is_valid_channel(end, max_channels) {
            return false;
        }
        self.active = true;
        self.range_start = start;
        self.range_end = end;
        self.last_tick_ms = now_ms;
        self.cursor = None;
        true
    }

    /// Return to `Idle`; the device keeps whatever channel the last tick
    /// selected
    pub fn stop(&mut self) {
        self.active = false;
        self.cursor = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn set_interval_ms(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms;
    }

    /// Advance the state machine to `now_ms`
    ///
    /// Returns the channel to select when a step is due, `None` otherwise.
    /// Advances by one per due tick, wrapping to `range_start` past
    /// `range_end`.
    pub fn tick(&mut self, now_ms: u64) -> Option<u8> {
        if !self.active || now_ms.saturating_sub(self.last_tick_ms) < self.interval_ms {
            return None;
        }
        let next = match self.cursor {
            None => self.range_start,
            Some(current) => {
                let candidate = current.wrapping_add(1);
                if candidate > self.range_end || candidate < self.range_start {
                    self.range_start
                } else {
                    candidate
                }
            }
        };
        self.cursor = Some(next);
        self.last_tick_ms = now_ms;
        Some(next)
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}
