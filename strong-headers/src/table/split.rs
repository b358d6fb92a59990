//! Splitting of comma-joined header values

/// Iterates over comma-separated tokens of a raw header value.
///
/// Commas inside double-quoted strings do not split, a backslash escapes the
/// next character inside quotes. Tokens are trimmed, one pair of surrounding
/// quotes is removed, and tokens left empty are skipped.
#[derive(Debug)]
pub(crate) struct CommaSeparated<'a> {
    rest: &'a str,
}

impl<'a> CommaSeparated<'a> {
    #[inline]
    pub(crate) fn new(value: &'a str) -> Self {
        Self { rest: value }
    }
}

impl<'a> Iterator for CommaSeparated<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.rest.is_empty() {
            let end = token_end(self.rest);
            let token = unquote(self.rest[..end].trim());
            self.rest = match self.rest.get(end + 1..) {
                Some(rest) => rest,
                None => "",
            };
            if !token.is_empty() {
                return Some(token);
            }
        }
        None
    }
}

/// Removes one pair of surrounding double quotes, if present
#[inline]
fn unquote(token: &str) -> &str {
    token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(token)
}

/// Returns the byte index of the first comma outside of quotes,
/// or the length of `value` when there is none.
fn token_end(value: &str) -> usize {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, b) in value.bytes().enumerate() {
        match b {
            _ if escaped => escaped = false,
            b'\\' if in_quotes => escaped = true,
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => return i,
            _ => {}
        }
    }
    value.len()
}

#[cfg(test)]
mod tests {
    use super::CommaSeparated;

    fn split(value: &str) -> Vec<&str> {
        CommaSeparated::new(value).collect()
    }

    #[test]
    fn it_splits_plain_values() {
        assert_eq!(split("a,b, c ,d"), ["a", "b", "c", "d"]);
    }

    #[test]
    fn it_skips_empty_tokens() {
        assert_eq!(split(" , a,,b ,"), ["a", "b"]);
        assert!(split("").is_empty());
        assert!(split("   ").is_empty());
    }

    #[test]
    fn it_keeps_quoted_commas() {
        assert_eq!(split("\"a,b\", c"), ["a,b", "c"]);
    }

    #[test]
    fn it_respects_escaped_quotes() {
        assert_eq!(split(r#""a\",b", c"#), [r#"a\",b"#, "c"]);
    }

    #[test]
    fn it_removes_surrounding_quotes() {
        assert_eq!(split(r#""abc", "d,e", f"#), ["abc", "d,e", "f"]);
        assert_eq!(split(r#" "x" "#), ["x"]);
    }

    #[test]
    fn it_skips_tokens_empty_after_unquoting() {
        assert_eq!(split(r#""", a, "" "#), ["a"]);
    }

    #[test]
    fn it_keeps_lone_quote() {
        assert_eq!(split(r#"a, ""#), ["a", "\""]);
    }

    #[test]
    fn it_keeps_unterminated_quote_as_single_token() {
        assert_eq!(split("\"a, b"), ["\"a, b"]);
    }

    #[test]
    fn it_handles_multibyte_values() {
        assert_eq!(split("ключ, значение"), ["ключ", "значение"]);
    }
}
