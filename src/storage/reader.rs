use std::borrow::Cow;

use tracing::warn;

use crate::storage::ParseError;

/// The UTF-8 encoding of U+FEFF.
pub(crate) const BYTE_ORDER_MARK: &[u8] = b"\xEF\xBB\xBF";

/// Decoded source text.
#[derive(Debug)]
pub(crate) struct Source<'a> {
    pub(crate) text: Cow<'a, str>,
    pub(crate) byte_order_mark: bool,
}

/// Strips an optional byte order mark and decodes the rest as UTF-8.
///
/// In strict mode invalid UTF-8 is an error naming the line it occurs on;
/// otherwise it is replaced with U+FFFD.
pub(crate) fn decode(bytes: &[u8], strict: bool) -> Result<Source<'_>, ParseError> {
    let (bytes, byte_order_mark) = match bytes.strip_prefix(BYTE_ORDER_MARK) {
        Some(rest) => (rest, true),
        None => (bytes, false),
    };

    let text = match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(error) => {
            let line = line_number_at(&bytes[..error.valid_up_to()]);
            if strict {
                return Err(ParseError::Encoding { line });
            }
            warn!(line, "replacing invalid UTF-8");
            String::from_utf8_lossy(bytes)
        }
    };

    Ok(Source {
        text,
        byte_order_mark,
    })
}

/// The 1-based number of the line that starts after `prefix`.
fn line_number_at(prefix: &[u8]) -> usize {
    let mut line = 1;
    let mut bytes = prefix.iter().peekable();
    while let Some(&byte) = bytes.next() {
        match byte {
            b'\n' => line += 1,
            b'\r' if bytes.peek() != Some(&&b'\n') => line += 1,
            _ => {}
        }
    }
    line
}

/// Splits text into lines, each keeping its terminator.
///
/// `\r\n`, `\n` and a lone `\r` all end a line. A final line without a
/// terminator is still returned.
pub(crate) fn lines(text: &str) -> Lines<'_> {
    Lines { rest: text }
}

pub(crate) struct Lines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let end = match self.rest.find(['\r', '\n']) {
            None => self.rest.len(),
            Some(i) if self.rest[i..].starts_with("\r\n") => i + 2,
            Some(i) => i + 1,
        };

        let (line, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("a\nb\n", &["a\n", "b\n"]; "line feeds")]
    #[test_case("a\r\nb\rc", &["a\r\n", "b\r", "c"]; "mixed and unterminated")]
    #[test_case("\n\r\n", &["\n", "\r\n"]; "empty lines")]
    #[test_case("", &[]; "empty input")]
    fn splits_lines(text: &str, expected: &[&str]) {
        assert_eq!(lines(text).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn strips_byte_order_mark() {
        let source = decode(b"\xEF\xBB\xBF0 HEAD\n", true).unwrap();
        assert!(source.byte_order_mark);
        assert_eq!(source.text, "0 HEAD\n");
    }

    #[test]
    fn invalid_utf8_names_the_line() {
        let bytes = b"0 HEAD\r\n1 NOTE caf\xE9\n";
        let error = decode(bytes, true).unwrap_err();
        assert!(matches!(error, ParseError::Encoding { line: 2 }));

        let source = decode(bytes, false).unwrap();
        assert_eq!(source.text, "0 HEAD\r\n1 NOTE caf\u{FFFD}\n");
    }
}
