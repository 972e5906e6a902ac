use rand::Rng;

pub fn random_digits<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        let digit = rng.gen_range(0..10);
        out.push(char::from(b'0' + digit as u8));
    }
    out
}

/// Remainder of a decimal digit string modulo 97, reduced one digit at a time.
///
/// Returns `None` for an empty string or any non-digit character.
pub fn mod97(digits: &str) -> Option<u32> {
    if digits.is_empty() {
        return None;
    }
    let mut remainder: u32 = 0;
    for ch in digits.chars() {
        let d = ch.to_digit(10)?;
        remainder = (remainder * 10 + d) % 97;
    }
    Some(remainder)
}
