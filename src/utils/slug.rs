//! Slug generation.
//!
//! Slugs are opaque base62 identifiers drawn from a cryptographically secure
//! random source. Collisions are possible and handled by the create path,
//! which retries with freshly generated slugs.

const BASE62_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const MIN_SLUG_LENGTH: usize = 4;
pub const MAX_SLUG_LENGTH: usize = 32;
pub const DEFAULT_SLUG_LENGTH: usize = 6;

/// Generates a random base62 slug of `length` characters.
///
/// Out-of-range lengths fall back to [`DEFAULT_SLUG_LENGTH`]; configuration
/// validation rejects them earlier, this is a last line of defense.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn generate_slug(length: usize) -> String {
    let length = if (MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH).contains(&length) {
        length
    } else {
        DEFAULT_SLUG_LENGTH
    };

    let mut buffer = vec![0u8; length];
    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    buffer
        .iter()
        .map(|b| BASE62_ALPHABET[*b as usize % BASE62_ALPHABET.len()] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_slug_has_requested_length() {
        assert_eq!(generate_slug(6).len(), 6);
        assert_eq!(generate_slug(4).len(), 4);
        assert_eq!(generate_slug(32).len(), 32);
    }

    #[test]
    fn test_generate_slug_only_base62_characters() {
        let slug = generate_slug(32);
        assert!(slug.bytes().all(|b| BASE62_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_generate_slug_out_of_range_falls_back_to_default() {
        assert_eq!(generate_slug(0).len(), DEFAULT_SLUG_LENGTH);
        assert_eq!(generate_slug(3).len(), DEFAULT_SLUG_LENGTH);
        assert_eq!(generate_slug(33).len(), DEFAULT_SLUG_LENGTH);
    }

    #[test]
    fn test_generate_slug_produces_unique_values() {
        let mut slugs = HashSet::new();
        for _ in 0..1000 {
            slugs.insert(generate_slug(8));
        }
        assert_eq!(slugs.len(), 1000);
    }
}
