//! Number and unit splitting.

/// A numeric prefix and the unit text that follows it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Unit<'a> {
    pub number: &'a str,
    pub unit: &'a str,
}

/// Whether `bytes` starts like a CSS number.
fn starts_number(bytes: &[u8]) -> bool {
    let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
    match bytes.first() {
        Some(b'+' | b'-') => digit_at(1) || (bytes.get(1) == Some(&b'.') && digit_at(2)),
        Some(b'.') => digit_at(1),
        Some(b) => b.is_ascii_digit(),
        None => false,
    }
}

/// Split `value` into its leading number and the rest.
///
/// The number follows the CSS grammar: an optional sign, digits, an
/// optional fraction, and an optional exponent. Returns `None` when the
/// value does not start like a number.
pub fn unit(value: &str) -> Option<Unit<'_>> {
    let bytes = value.as_bytes();
    if !starts_number(bytes) {
        return None;
    }
    let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
    let skip_digits = |mut pos: usize| {
        while digit_at(pos) {
            pos += 1;
        }
        pos
    };

    let mut pos = usize::from(matches!(bytes[0], b'+' | b'-'));
    pos = skip_digits(pos);

    if bytes.get(pos) == Some(&b'.') && digit_at(pos + 1) {
        pos = skip_digits(pos + 2);
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let signed = matches!(bytes.get(pos + 1), Some(b'+' | b'-'));
        if digit_at(pos + 1) || (signed && digit_at(pos + 2)) {
            pos = skip_digits(pos + if signed { 3 } else { 2 });
        }
    }

    Some(Unit {
        number: &value[..pos],
        unit: &value[pos..],
    })
}

#[cfg(test)]
mod tests;
