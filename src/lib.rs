//! Synthetic German IBANs and a BIC index over the Bundesbank bank code directory.
//!
//! [`BankDirectory`] resolves a BIC to its bank code; [`IbanGenerator`]
//! turns a bank code (or a random one) into an IBAN with valid
//! MOD 97-10 check digits.

pub mod directory;
pub mod error;
pub mod iban;
pub mod logging;
pub mod reference;
pub mod util;

pub use directory::{BankDirectory, BankRecord, FeedLayout, Field, BUNDESBANK_LAYOUT};
pub use error::{ParseError, ValidationError};
pub use iban::{check_digits, Iban, IbanGenerator};
pub use reference::{COUNTRY_CODE_DE, SUPPORTED_COUNTRIES};
