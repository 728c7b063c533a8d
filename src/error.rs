/// Errors raised when turning untyped byte slices into fixed-size keys and ciphertexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid length for {what}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Copy `src` into a fixed array, reporting a length mismatch for `what`.
pub(crate) fn to_array<const N: usize>(what: &'static str, src: &[u8]) -> Result<[u8; N], Error> {
    src.try_into().map_err(|_| Error::InvalidLength {
        what,
        expected: N,
        actual: src.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_array() {
        let ok: [u8; 4] = to_array("seed", &[1, 2, 3, 4]).unwrap();
        assert_eq!(ok, [1, 2, 3, 4]);

        let err = to_array::<4>("seed", &[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidLength {
                what: "seed",
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(
            err.to_string(),
            "invalid length for seed: expected 4 bytes, got 3"
        );
    }
}
