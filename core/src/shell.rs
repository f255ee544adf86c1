//! POSIX single-quote escaping for debug command lines.

/// Wraps `raw` in single quotes so a POSIX shell reads it back verbatim.
///
/// Embedded quotes become `'\''` (close, escaped quote, reopen). Returns
/// `None` when `raw` contains a NUL byte, which no shell argument can carry.
pub fn single_quote(raw: &str) -> Option<String> {
    if raw.contains('\0') {
        return None;
    }
    Some(format!("'{}'", raw.replace('\'', r"'\''")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_are_wrapped() {
        assert_eq!(single_quote("http://a.test/x?y=1&z").unwrap(), "'http://a.test/x?y=1&z'");
    }

    #[test]
    fn embedded_quotes_cannot_close_the_string() {
        assert_eq!(single_quote("X-Name:O'Brien").unwrap(), r"'X-Name:O'\''Brien'");
    }

    #[test]
    fn shell_metacharacters_stay_literal() {
        assert_eq!(single_quote("$(rm -rf /) `x` \"y\"").unwrap(), "'$(rm -rf /) `x` \"y\"'");
    }

    #[test]
    fn nul_bytes_are_unrepresentable() {
        assert_eq!(single_quote("a\0b"), None);
    }
}
