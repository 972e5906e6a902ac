use thiserror::Error;

/// Errors raised while loading the bank directory feed.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A record is shorter than the fixed-width layout requires.
    #[error("invalid entry at line {line}: expected at least {expected} characters, got {actual}")]
    InvalidEntry {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("failed to read bank directory: {0}")]
    Read(#[from] std::io::Error),
}

/// Errors raised while generating an IBAN.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Caller supplied a bank code of the wrong length for the country.
    #[error("bank code must be {expected} characters for {country}")]
    BankCodeLength { country: String, expected: usize },

    /// Caller supplied a bank code containing something other than ASCII digits.
    #[error("bank code must contain only digits, got \"{bank_code}\"")]
    BankCodeDigits { bank_code: String },

    /// The assembled digit string is not a decimal number.
    #[error("failed to convert bank account number \"{bank_code}\" to big integer")]
    NumericConversion { bank_code: String },
}

impl ValidationError {
    /// True when the failure stems from caller input rather than an internal fault.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            ValidationError::BankCodeLength { .. } | ValidationError::BankCodeDigits { .. }
        )
    }
}
