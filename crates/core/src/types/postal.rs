//! Postal code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    /// Fewer digits than a postal code needs.
    #[error("postal code must contain at least {min} digits (got {got})")]
    TooFewDigits {
        /// Minimum number of digits.
        min: usize,
        /// Digits found in the input.
        got: usize,
    },
}

/// A postal code reduced to its digits.
///
/// Input is normalized by discarding every non-digit character, so
/// `"C1425"`, `"1425"` and `"14-25"` all parse to the same code.
///
/// ## Constraints
///
/// - At least 4 digits after normalization
///
/// ## Examples
///
/// ```
/// use metafora_core::PostalCode;
///
/// assert_eq!(PostalCode::parse("C1425").expect("valid").as_str(), "1425");
/// assert!(PostalCode::parse("ab").is_err());
/// assert!(PostalCode::parse("123").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 4;

    /// Parse a `PostalCode` from free-form input.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than [`Self::MIN_DIGITS`] digits remain
    /// after stripping non-digit characters.
    pub fn parse(s: &str) -> Result<Self, PostalCodeError> {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();

        if digits.len() < Self::MIN_DIGITS {
            return Err(PostalCodeError::TooFewDigits {
                min: Self::MIN_DIGITS,
                got: digits.len(),
            });
        }

        Ok(Self(digits))
    }

    /// Returns the digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The digits as a number, or `None` when they overflow `u64`.
    #[must_use]
    pub fn number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
