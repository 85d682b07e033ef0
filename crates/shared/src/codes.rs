//! Event share-code generation.
//!
//! Share codes are the human-typeable handle guests use to join an event:
//! six uppercase alphanumeric characters. Visually ambiguous characters are
//! not excluded; the original product used the full A-Z0-9 alphabet and
//! existing printed QR cards depend on it. Collisions are not checked here,
//! the UNIQUE constraint on `events.code` rejects them at insert time.

use rand::Rng;

/// Length of an event share code.
pub const EVENT_CODE_LEN: usize = 6;

/// Alphabet used for share codes.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a random 6-character uppercase alphanumeric share code.
pub fn generate_event_code() -> String {
    let mut rng = rand::thread_rng();
    (0..EVENT_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_has_expected_length() {
        assert_eq!(generate_event_code().len(), EVENT_CODE_LEN);
    }

    #[test]
    fn test_code_is_uppercase_alphanumeric() {
        for _ in 0..100 {
            let code = generate_event_code();
            assert!(code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_codes_are_not_constant() {
        // Not a distribution test, just a sanity check that the generator
        // is actually random.
        let codes: std::collections::HashSet<String> =
            (0..50).map(|_| generate_event_code()).collect();
        assert!(codes.len() > 1);
    }
}
