pub const COUNTRY_CODE_DE: &str = "DE";

pub const SUPPORTED_COUNTRIES: &[&str] = &[COUNTRY_CODE_DE];

/// Required bank code length per country. Countries missing here are not length-checked.
pub const BANK_CODE_LENGTHS: &[(&str, usize)] = &[(COUNTRY_CODE_DE, 8)];

pub const ACCOUNT_NUMBER_LENGTH: usize = 10;

pub const RANDOM_BANK_CODE_LENGTH: usize = 8;

// "DE" with D=13, E=14.
const NUMERIC_COUNTRY_CODE_DE: &str = "1314";

pub fn bank_code_length(country: &str) -> Option<usize> {
    BANK_CODE_LENGTHS
        .iter()
        .find(|(code, _)| *code == country)
        .map(|(_, len)| *len)
}

pub fn is_supported_country(code: &str) -> bool {
    SUPPORTED_COUNTRIES.iter().any(|supported| *supported == code)
}

/// Numeric replacement of the country code used in the check digit arithmetic.
///
/// Only German values are produced; every input maps to `1314`. Adding a
/// country means replacing this with a base-36 letter table.
pub fn numeric_country_code(_country: &str) -> &'static str {
    NUMERIC_COUNTRY_CODE_DE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn germany_requires_eight_digit_bank_codes() {
        assert_eq!(bank_code_length("DE"), Some(8));
        assert_eq!(bank_code_length("FR"), None);
    }

    #[test]
    fn numeric_code_ignores_input() {
        assert_eq!(numeric_country_code("DE"), "1314");
        assert_eq!(numeric_country_code("NL"), "1314");
    }

    #[test]
    fn only_germany_is_supported() {
        assert!(is_supported_country("DE"));
        assert!(!is_supported_country("de"));
        assert!(!is_supported_country("AT"));
    }
}
