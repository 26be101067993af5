//! Tax-ID (CPF) utilities: progressive input masking, cleaning and the
//! two-check-digit weighted modulo-11 validation.

use serde::Serialize;

const DIGITS: usize = 11;

/// Strips everything except ASCII digits.
pub fn clean(display: &str) -> String {
    display.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Masks partial input as `000.000.000-00`, growing with each typed digit.
/// Digits beyond the eleventh are dropped.
pub fn format(raw: &str) -> String {
    let mut out = String::with_capacity(14);
    for (i, digit) in clean(raw).chars().take(DIGITS).enumerate() {
        match i {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(digit);
    }
    out
}

/// Validates a digits-only tax id.
pub fn is_valid(digits: &str) -> bool {
    if digits.len() != DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let values: Vec<u32> = digits.bytes().map(|b| u32::from(b - b'0')).collect();

    if values.iter().all(|&d| d == values[0]) {
        return false;
    }

    check_digit(&values[..9]) == values[9] && check_digit(&values[..10]) == values[10]
}

/// Weights run from `len + 1` down to 2; a remainder of 10 maps to 0.
fn check_digit(prefix: &[u32]) -> u32 {
    let top = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();
    match (sum * 10) % 11 {
        10 => 0,
        r => r,
    }
}

/// Result of checking a tax id as typed, used for live form feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxIdCheck {
    pub display: String,
    pub digits: String,
    pub complete: bool,
    pub valid: bool,
}

pub fn check(raw: &str) -> TaxIdCheck {
    let digits: String = clean(raw).chars().take(DIGITS).collect();
    TaxIdCheck {
        display: format(&digits),
        complete: digits.len() == DIGITS,
        valid: is_valid(&digits),
        digits,
    }
}
