//! PCM (Pulse Code Modulation) audio format handling.
//!
//! All audio in this crate is 16-bit signed, little-endian when serialized.

mod format;

pub use format::Format;

/// Converts i16 samples to raw PCM bytes (little-endian).
pub fn int16_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        data.extend_from_slice(&s.to_le_bytes());
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int16_to_bytes() {
        let samples = [0i16, 1, -1, i16::MAX, i16::MIN];
        let bytes = int16_to_bytes(&samples);
        assert_eq!(bytes.len(), 10);
        assert_eq!(&bytes[2..4], &[1, 0]);
        assert_eq!(&bytes[4..6], &[0xff, 0xff]);
        assert_eq!(&bytes[8..10], &[0x00, 0x80]);
    }
}
