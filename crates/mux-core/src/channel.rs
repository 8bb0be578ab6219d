//! Channel validation and chip-specific channel encodings

use serde::{Deserialize, Serialize};

/// Bounds check for a requested channel
///
/// Strictly `channel < max_channels`. Pure; callers decide what error (if
/// any) an invalid channel becomes.
pub fn is_valid_channel(channel: u8, max_channels: u8) -> bool {
    channel < max_channels
}

/// Mapping from a logical channel to the select-line bit code
///
/// Most chips use the identity mapping (`bit i of code = (channel >> i) & 1`).
/// The DG409 family permutes its address pins: bits 0 and 1 swap while
/// bit 2 stays put. The device applies the encoding before handing the
/// code to the switching engine, which stays protocol-pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelEncoding {
    /// `code == channel`
    #[default]
    Identity,
    /// Bits 0 and 1 swapped, bit 2 preserved (DG409 addressing)
    SwapLowPair,
}

impl ChannelEncoding {
    /// Encode a validated channel into a select-line bit code
    pub fn encode(&self, channel: u8) -> u8 {
        match self {
            ChannelEncoding::Identity => channel,
            ChannelEncoding::SwapLowPair => {
                (channel & 0x04) | ((channel & 0x02) >> 1) | ((channel & 0x01) << 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_is_strict() {
        assert!(is_valid_channel(0, 8));
        assert!(is_valid_channel(7, 8));
        assert!(!is_valid_channel(8, 8));
        assert!(!is_valid_channel(255, 8));
        assert!(!is_valid_channel(0, 0));
    }

    #[test]
    fn identity_encoding() {
        for ch in 0..16 {
            assert_eq!(ChannelEncoding::Identity.encode(ch), ch);
        }
    }

    #[test]
    fn swap_low_pair_permutes_bits_0_and_1() {
        let enc = ChannelEncoding::SwapLowPair;
        assert_eq!(enc.encode(0b000), 0b000);
        assert_eq!(enc.encode(0b001), 0b010);
        assert_eq!(enc.encode(0b010), 0b001);
        assert_eq!(enc.encode(0b011), 0b011);
        assert_eq!(enc.encode(0b100), 0b100);
        assert_eq!(enc.encode(0b101), 0b110);
        assert_eq!(enc.encode(0b110), 0b101);
        assert_eq!(enc.encode(0b111), 0b111);
    }

    #[test]
    fn swap_low_pair_is_an_involution() {
        let enc = ChannelEncoding::SwapLowPair;
        for ch in 0..8 {
            assert_eq!(enc.encode(enc.encode(ch)), ch);
        }
    }
}
