use serde::{Deserialize, Serialize};

use crate::errors::GeneratorError;
use crate::{DIGITS, LOWERCASE, MAX_LENGTH, MIN_LENGTH, SYMBOLS, UPPERCASE};

/// Character composition and length of a generated password.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorPolicy {
    pub length: usize,
    pub include_numbers: bool,
    pub include_symbols: bool,
}

impl Default for GeneratorPolicy {
    fn default() -> Self {
        Self {
            length: 16,
            include_numbers: true,
            include_symbols: true,
        }
    }
}

impl GeneratorPolicy {
    pub fn letters_only(length: usize) -> Self {
        Self {
            length,
            include_numbers: false,
            include_symbols: false,
        }
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.length < MIN_LENGTH || self.length > MAX_LENGTH {
            return Err(GeneratorError::InvalidPolicy(format!(
                "length {} outside {MIN_LENGTH}..={MAX_LENGTH}",
                self.length
            )));
        }
        Ok(())
    }

    /// Characters a password may be drawn from. Letters are always present.
    pub fn universe(&self) -> Vec<u8> {
        let mut chars = Vec::with_capacity(LOWERCASE.len() + UPPERCASE.len() + 20);
        chars.extend_from_slice(LOWERCASE.as_bytes());
        chars.extend_from_slice(UPPERCASE.as_bytes());
        if self.include_numbers {
            chars.extend_from_slice(DIGITS.as_bytes());
        }
        if self.include_symbols {
            chars.extend_from_slice(SYMBOLS.as_bytes());
        }
        chars
    }
}
