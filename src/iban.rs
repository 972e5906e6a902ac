use crate::error::ValidationError;
use crate::reference::{
    bank_code_length, numeric_country_code, ACCOUNT_NUMBER_LENGTH, RANDOM_BANK_CODE_LENGTH,
};
use crate::util::{mod97, random_digits};

use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// A generated IBAN. Only [`IbanGenerator`] constructs these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iban {
    country_code: String,
    bank_code: String,
    account_number: String,
    check_digits: String,
}

impl Iban {
    fn assemble(
        country_code: &str,
        bank_code: String,
        account_number: String,
    ) -> Result<Self, ValidationError> {
        let check_digits = check_digits(country_code, &bank_code, &account_number)?;
        Ok(Iban {
            country_code: country_code.to_string(),
            bank_code,
            account_number,
            check_digits,
        })
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn bank_code(&self) -> &str {
        &self.bank_code
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn check_digits(&self) -> &str {
        &self.check_digits
    }

    /// Recomputes the rearranged numeric form and checks it is 1 mod 97.
    pub fn verify_checksum(&self) -> bool {
        let numeric = format!(
            "{}{}{}{}",
            self.bank_code,
            self.account_number,
            numeric_country_code(&self.country_code),
            self.check_digits
        );
        mod97(&numeric) == Some(1)
    }
}

impl fmt::Display for Iban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.country_code, self.check_digits, self.bank_code, self.account_number
        )
    }
}

/// ISO 7064 MOD 97-10 check digits over bank code, account number and country.
pub fn check_digits(
    country_code: &str,
    bank_code: &str,
    account_number: &str,
) -> Result<String, ValidationError> {
    let combined = format!(
        "{}{}{}00",
        bank_code,
        account_number,
        numeric_country_code(country_code)
    );
    let remainder = mod97(&combined).ok_or_else(|| ValidationError::NumericConversion {
        bank_code: bank_code.to_string(),
    })?;
    Ok(format!("{:02}", 98 - remainder))
}

/// Source of synthetic IBANs.
///
/// The random state sits behind a mutex so one generator can be shared
/// across threads.
pub struct IbanGenerator {
    rng: Mutex<ChaCha8Rng>,
}

impl IbanGenerator {
    /// Seeds from the current Unix time in seconds.
    pub fn from_time() -> Self {
        Self::with_seed(Utc::now().timestamp().unsigned_abs())
    }

    pub fn with_seed(seed: u64) -> Self {
        log::debug!("seeding IBAN generator with {}", seed);
        IbanGenerator {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Generates an IBAN for a random bank code in the given country.
    pub fn generate_for_country(&self, country_code: &str) -> Result<Iban, ValidationError> {
        let bank_code = random_digits(&mut *self.lock_rng(), RANDOM_BANK_CODE_LENGTH);
        self.generate_from_bank_code(country_code, &bank_code)
    }

    /// Generates an IBAN with a random account number at the given bank.
    ///
    /// Bank code length is only enforced for countries listed in the
    /// reference table; the digits-only rule applies everywhere.
    pub fn generate_from_bank_code(
        &self,
        country_code: &str,
        bank_code: &str,
    ) -> Result<Iban, ValidationError> {
        if let Some(expected) = bank_code_length(country_code) {
            if bank_code.chars().count() != expected {
                return Err(ValidationError::BankCodeLength {
                    country: country_code.to_string(),
                    expected,
                });
            }
        }
        if !bank_code.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ValidationError::BankCodeDigits {
                bank_code: bank_code.to_string(),
            });
        }
        let account_number = random_digits(&mut *self.lock_rng(), ACCOUNT_NUMBER_LENGTH);
        let iban = Iban::assemble(country_code, bank_code.to_string(), account_number)?;
        log::debug!("generated {} for bank code {}", iban, bank_code);
        Ok(iban)
    }

    fn lock_rng(&self) -> MutexGuard<'_, ChaCha8Rng> {
        // Digit generation cannot leave the rng half-updated, so a poisoned lock is still usable.
        self.rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for IbanGenerator {
    fn default() -> Self {
        Self::from_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn known_check_digits() {
        let check = check_digits("DE", "10090000", "0000000001").unwrap();
        assert_eq!(check, "72");

        let iban = Iban::assemble("DE", "10090000".to_string(), "0000000001".to_string()).unwrap();
        assert_eq!(iban.to_string(), "DE72100900000000000001");
        assert!(iban.verify_checksum());
    }

    #[test]
    fn generate_for_country_shapes() {
        let generator = IbanGenerator::with_seed(1);
        for _ in 0..200 {
            let iban = generator.generate_for_country("DE").unwrap();
            assert_eq!(iban.country_code(), "DE");
            assert_eq!(iban.bank_code().len(), 8);
            assert_eq!(iban.account_number().len(), 10);
            assert!(iban.bank_code().chars().all(|ch| ch.is_ascii_digit()));
            assert!(iban.account_number().chars().all(|ch| ch.is_ascii_digit()));
            assert_eq!(iban.check_digits().len(), 2);
            assert_eq!(iban.to_string().len(), 22);
            assert!(iban.verify_checksum());
        }
    }

    #[test]
    fn rejects_wrong_bank_code_length_for_germany() {
        let generator = IbanGenerator::with_seed(2);
        for bank_code in ["", "1009000", "100900000", "1234567890"] {
            let err = generator.generate_from_bank_code("DE", bank_code).unwrap_err();
            assert_eq!(
                err,
                ValidationError::BankCodeLength {
                    country: "DE".to_string(),
                    expected: 8,
                }
            );
        }
    }

    #[test]
    fn other_countries_skip_length_check() {
        let generator = IbanGenerator::with_seed(3);
        let iban = generator.generate_from_bank_code("XX", "123").unwrap();
        assert_eq!(iban.bank_code(), "123");
        assert!(iban.to_string().starts_with("XX"));
    }

    #[test]
    fn non_digit_bank_code_is_rejected_as_input() {
        let generator = IbanGenerator::with_seed(4);
        for bank_code in ["1009000A", "1234567Ü", "+1234567"] {
            let err = generator.generate_from_bank_code("DE", bank_code).unwrap_err();
            assert_eq!(
                err,
                ValidationError::BankCodeDigits {
                    bank_code: bank_code.to_string(),
                }
            );
            assert!(err.is_bad_input());
        }
        let err = generator.generate_from_bank_code("XX", "12AB").unwrap_err();
        assert!(err.is_bad_input());
    }

    #[test]
    fn check_digits_reject_non_numeric_input() {
        let err = check_digits("DE", "1009000A", "0000000001").unwrap_err();
        assert_eq!(
            err,
            ValidationError::NumericConversion {
                bank_code: "1009000A".to_string(),
            }
        );
    }

    #[test]
    fn repeated_generation_stays_consistent() {
        let generator = IbanGenerator::with_seed(5);
        let a = generator.generate_from_bank_code("DE", "37040044").unwrap();
        let b = generator.generate_from_bank_code("DE", "37040044").unwrap();
        assert_ne!(a.account_number(), b.account_number());
        assert!(a.verify_checksum());
        assert!(b.verify_checksum());
        assert_eq!(
            a.check_digits(),
            check_digits("DE", a.bank_code(), a.account_number()).unwrap()
        );
    }

    #[test]
    fn same_seed_same_output() {
        let a = IbanGenerator::with_seed(42);
        let b = IbanGenerator::with_seed(42);
        for _ in 0..10 {
            assert_eq!(
                a.generate_for_country("DE").unwrap(),
                b.generate_for_country("DE").unwrap()
            );
        }
    }

    #[test]
    fn concurrent_generation() {
        let generator = Arc::new(IbanGenerator::with_seed(9));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = Arc::clone(&generator);
                thread::spawn(move || {
                    (0..100)
                        .map(|_| generator.generate_for_country("DE"))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            for iban in handle.join().unwrap() {
                assert!(iban.unwrap().verify_checksum());
            }
        }
    }

    proptest! {
        #[test]
        fn checksum_property_holds(bank_code in "[0-9]{8}", account_number in "[0-9]{10}") {
            let iban = Iban::assemble("DE", bank_code.clone(), account_number.clone()).unwrap();
            let rearranged = format!("{}{}1314{}", bank_code, account_number, iban.check_digits());
            prop_assert_eq!(mod97(&rearranged), Some(1));
            prop_assert_eq!(iban.check_digits().len(), 2);
        }
    }
}
