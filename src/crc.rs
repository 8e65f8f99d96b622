//! CRC-32 checksum used to validate USB-PD packet payloads.
//!
//! This is the same reflected CRC-32 as Ethernet/zip (polynomial
//! `0x04C11DB7`, reflected to `0xEDB88320`, init `0xFFFFFFFF`, final XOR
//! `0xFFFFFFFF`), computed over the header and data objects, excluding the
//! CRC field itself.

/// Reflected CRC-32 polynomial (`0xEDB88320`).
const POLY: u32 = 0xEDB8_8320;

fn crc32_update_byte(crc: u32, byte: u8) -> u32 {
    let mut crc = crc ^ byte as u32;
    for _ in 0..8 {
        crc = if crc & 1 != 0 {
            (crc >> 1) ^ POLY
        } else {
            crc >> 1
        };
    }
    crc
}

/// Computes the USB-PD CRC-32 over `data`.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &b in data {
        crc = crc32_update_byte(crc, b);
    }
    crc ^ 0xFFFF_FFFF
}

/// Incremental CRC-32 accumulator, for streaming callers that do not have
/// the whole payload in one contiguous buffer (e.g. the TX encoder, which
/// streams header then PDOs).
#[derive(Debug, Clone, Copy)]
pub struct Crc32Builder {
    crc: u32,
}

impl Default for Crc32Builder {
    fn default() -> Self {
        Crc32Builder { crc: 0xFFFF_FFFF }
    }
}

impl Crc32Builder {
    /// Starts a new accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds in one byte.
    pub fn update(&mut self, byte: u8) -> &mut Self {
        self.crc = crc32_update_byte(self.crc, byte);
        self
    }

    /// Folds in a byte slice.
    pub fn update_slice(&mut self, data: &[u8]) -> &mut Self {
        for &b in data {
            self.update(b);
        }
        self
    }

    /// Finalizes the accumulator into a CRC-32 value.
    pub fn finish(self) -> u32 {
        self.crc ^ 0xFFFF_FFFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_of_empty_slice_is_reflected_identity() {
        assert_eq!(crc32(&[]), 0x0000_0000);
    }

    #[test]
    fn crc32_matches_known_ascii_vector() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn builder_matches_one_shot_computation() {
        let data = [0x61u8, 0x42, 0x01, 0x00, 0x90, 0x64];
        let one_shot = crc32(&data);
        let mut builder = Crc32Builder::new();
        builder.update_slice(&data[..3]).update_slice(&data[3..]);
        assert_eq!(builder.finish(), one_shot);
    }

    #[test]
    fn single_bit_difference_changes_crc() {
        let a = crc32(&[0x00, 0x00, 0x00, 0x00]);
        let b = crc32(&[0x01, 0x00, 0x00, 0x00]);
        assert_ne!(a, b);
    }
}
