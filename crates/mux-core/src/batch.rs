//! Batch capture buffer for deferred channel switching

use crate::error::SwitchError;

/// Fixed capture capacity
pub const BATCH_CAPACITY: usize = 32;

/// Fixed-capacity buffer that records channel requests for later replay
///
/// While capturing, the device routes `set_channel` calls here instead of
/// the hardware; replay happens in exact capture order with per-entry
/// status. The buffer survives a failed replay so the caller can inspect
/// or clear it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchBuffer {
    entries: [u8; BATCH_CAPACITY],
    len: usize,
    capturing: bool,
}

impl BatchBuffer {
    pub fn new() -> Self {
        BatchBuffer {
            entries: [0; BATCH_CAPACITY],
            len: 0,
            capturing: false,
        }
    }

    /// Begin capturing; discards anything previously captured
    pub fn begin(&mut self) {
        self.capturing = true;
        self.len = 0;
    }

    /// Whether `set_channel` calls are currently captured
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Record one channel request
    pub fn capture(&mut self, channel: u8) -> Result<(), SwitchError> {
        if self.len >= BATCH_CAPACITY {
            return Err(SwitchError::Overflow {
                capacity: BATCH_CAPACITY,
            });
        }
        self.entries[self.len] = channel;
        self.len += 1;
        Ok(())
    }

    /// Stop capturing and expose the recorded sequence for replay
    pub fn end_capture(&mut self) -> [u8; BATCH_CAPACITY] {
        self.capturing = false;
        self.entries
    }

    /// Number of captured entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop all captured entries and leave capture mode
    pub fn clear(&mut self) {
        self.capturing = false;
        self.len = 0;
        self.entries = [0; BATCH_CAPACITY];
    }
}

impl Default for BatchBuffer {
    fn default() -> Self {
        Self::new()
    }
}
