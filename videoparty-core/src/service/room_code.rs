//! Short shareable room codes

/// Uppercase letters and digits
pub const ALPHABET: [char; 36] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Random fixed-length codes.
///
/// Collisions are possible and are resolved by the store's uniqueness check,
/// not here.
#[derive(Debug, Clone, Copy)]
pub struct RoomCodeGenerator {
    length: usize,
}

impl RoomCodeGenerator {
    #[must_use]
    pub const fn new(length: usize) -> Self {
        Self { length }
    }

    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn generate(&self) -> String {
        nanoid::format(nanoid::rngs::default, &ALPHABET, self.length)
    }
}

impl Default for RoomCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uses_alphabet_and_length() {
        let generator = RoomCodeGenerator::default();
        for _ in 0..200 {
            let code = generator.generate();
            assert_eq!(code.len(), DEFAULT_CODE_LENGTH);
            assert!(code.chars().all(|c| ALPHABET.contains(&c)), "bad code {code}");
        }
    }

    #[test]
    fn test_custom_length() {
        let generator = RoomCodeGenerator::new(10);
        assert_eq!(generator.generate().len(), 10);
        assert_eq!(generator.length(), 10);
    }

    #[test]
    fn test_codes_vary() {
        let generator = RoomCodeGenerator::default();
        let codes: std::collections::HashSet<_> = (0..50).map(|_| generator.generate()).collect();
        assert!(codes.len() > 1);
    }
}
