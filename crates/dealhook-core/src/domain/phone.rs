const COUNTRY_CODE: char = '7';
const TRUNK_PREFIX: char = '8';
const MOBILE_PREFIX: char = '9';

/// Canonicalizes a raw phone into a dialable international digit string
/// (country code first, no `+`, no separators).
pub fn normalize_phone(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let digits: String = raw.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    if digits.len() == 11 && digits.starts_with(TRUNK_PREFIX) {
        let mut out = String::with_capacity(11);
        out.push(COUNTRY_CODE);
        out.push_str(&digits[1..]);
        return Some(out);
    }

    if digits.len() == 10 && digits.starts_with(MOBILE_PREFIX) {
        let mut out = String::with_capacity(11);
        out.push(COUNTRY_CODE);
        out.push_str(&digits);
        return Some(out);
    }

    Some(digits)
}
