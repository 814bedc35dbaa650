use std::sync::LazyLock;

use regex::Regex;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"));

/// Replaces the last run of digits in `name` with `number`, or appends it when there is none.
pub fn with_trailing_number(name: &str, number: u64) -> String {
    match DIGITS.find_iter(name).last() {
        Some(digits) => format!(
            "{}{}{}",
            &name[..digits.start()],
            number,
            &name[digits.end()..]
        ),
        None => format!("{}{}", name, number),
    }
}

/// Adds one to the last run of digits in `name`; a name without digits gets a `1` appended.
pub fn bump_trailing_number(name: &str) -> String {
    match DIGITS.find_iter(name).last() {
        Some(digits) => format!(
            "{}{}{}",
            &name[..digits.start()],
            increment(digits.as_str()),
            &name[digits.end()..]
        ),
        None => format!("{}1", name),
    }
}

/* Works on the digit string itself, so leading zeros survive and length is unbounded. */
fn increment(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();

    for byte in bytes.iter_mut().rev() {
        if *byte == b'9' {
            *byte = b'0';
        } else {
            *byte += 1;
            return String::from_utf8(bytes).unwrap_or_default();
        }
    }

    format!("1{}", String::from_utf8(bytes).unwrap_or_default())
}
