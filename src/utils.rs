//! Small helpers for framing the compressed artifact.

/// The artifact signature and file extension.
pub mod signatures {
    /// Identifies a predictive-compression artifact.
    pub const PREDICT_SIG: [u8; 4] = [0x49, 0x57, 0x01, 0x9d];
    pub const FILE_EXTENSION: &str = ".iw";

    /// Return True if 'input' starts with 'signature'.
    pub fn match_signature(input: &[u8], signature: &[u8]) -> bool {
        input.starts_with(signature)
    }
}

/// Implements encoding and decoding of the fixed-width header numbers.
pub mod number_encoding {
    pub fn encode32(num: u32, stream: &mut Vec<u8>) -> usize {
        stream.extend_from_slice(&num.to_be_bytes());
        4
    }

    pub fn decode32(stream: &[u8]) -> Option<(usize, u32)> {
        if stream.len() < 4 {
            return None;
        }
        let bytes: [u8; 4] = stream[0..4].try_into().ok()?;
        Some((4, u32::from_be_bytes(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::number_encoding::{decode32, encode32};

    #[test]
    fn test_number_round_trip() {
        for num in [0, 1, 255, 256, 65536, u32::MAX] {
            let mut stream = Vec::new();
            assert_eq!(encode32(num, &mut stream), 4);
            assert_eq!(decode32(&stream), Some((4, num)));
        }
        assert_eq!(decode32(&[1, 2, 3]), None);
    }
}
