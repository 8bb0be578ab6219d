//! Bit-manipulation helpers shared across chip families
//!
//! Free functions with no device-state dependency.

/// Reverse the bit order of a byte
pub fn reverse_bits(mut b: u8) -> u8 {
    b = (b & 0xF0) >> 4 | (b & 0x0F) << 4;
    b = (b & 0xCC) >> 2 | (b & 0x33) << 2;
    b = (b & 0xAA) >> 1 | (b & 0x55) << 1;
    b
}

/// CRC-16 with the reflected 0xA001 polynomial (Modbus)
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Number of select lines needed to address `channels` channels
pub fn required_select_lines(channels: u8) -> u8 {
    let mut lines = 0;
    while (1u16 << lines) < u16::from(channels) {
        lines += 1;
    }
    lines
}
