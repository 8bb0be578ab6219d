//! Per-channel linear correction for precision variants

use serde::{Deserialize, Serialize};

use crate::channel::is_valid_channel;

/// Maximum channels a calibration table covers
pub const MAX_CAL_CHANNELS: usize = 32;

/// Fixed-point gain scale: 1024 == unity
pub const UNITY_GAIN: u16 = 1024;

/// One channel's correction: `(raw + offset) * gain >> 10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalEntry {
    pub offset: i16,
    /// Fixed-point multiplier, [`UNITY_GAIN`] == 1.0
    pub gain: u16,
}

impl Default for CalEntry {
    fn default() -> Self {
        CalEntry {
            offset: 0,
            gain: UNITY_GAIN,
        }
    }
}

/// Inline per-channel calibration table
///
/// Until the first `set` call the table is transparent: `apply` returns
/// the raw value for every channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalTable {
    entries: [CalEntry; MAX_CAL_CHANNELS],
    calibrated: bool,
}

impl CalTable {
    pub fn new() -> Self {
        CalTable {
            entries: [CalEntry::default(); MAX_CAL_CHANNELS],
            calibrated: false,
        }
    }

    /// Store a channel's correction; invalid channels are ignored
    pub fn set(&mut self, channel: u8, max_channels: u8, offset: i16, gain: u16) {
        if !is_valid_channel(channel, max_channels) || usize::from(channel) >= MAX_CAL_CHANNELS {
            return;
        }
        self.entries[usize::from(channel)] = CalEntry { offset, gain };
        self.calibrated = true;
    }

    /// Apply a channel's correction to a raw sample
    ///
    /// Passes the value through untouched when nothing was ever calibrated
    /// or the channel is invalid. The result clamps to the i16 range
    /// rather than wrapping.
    pub fn apply(&self, channel: u8, max_channels: u8, raw: i16) -> i16 {
        if !self.calibrated
            || !is_valid_channel(channel, max_channels)
            || usize::from(channel) >= MAX_CAL_CHANNELS
        {
            return raw;
        }
        let entry = &self.entries[usize::from(channel)];
        // Worst case is (i16::MAX + i16::MAX) * u16::MAX, which exceeds
        // i32, so the intermediate runs in i64
        let corrected =
            (i64::from(raw) + i64::from(entry.offset)) * i64::from(entry.gain) >> 10;
        corrected.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
    }
}

impl Default for CalTable {
    fn default() -> Self {
        Self::new()
    }
}
