//! Decoding of quoted string tokens.

use alloc::vec::Vec;

use bstr::BString;

use crate::ParseErrorKind;

fn hex4(digits: &[u8]) -> Option<u32> {
    let digits = digits.get(..4)?;
    digits.iter().try_fold(0, |acc, &d| {
        char::from(d).to_digit(16).map(|n| (acc << 4) | n)
    })
}

/// Appends the UTF-8 form of `code`. Surrogates are encoded like any other
/// BMP code point, and U+0000 uses the two-byte form so strings never
/// contain a NUL byte.
#[allow(clippy::cast_possible_truncation)]
fn push_code_point(out: &mut Vec<u8>, code: u32) {
    match code {
        0x01..=0x7F => out.push(code as u8),
        0 | 0x80..=0x7FF => {
            out.extend_from_slice(&[0xC0 | (code >> 6) as u8, 0x80 | (code & 0x3F) as u8]);
        }
        0x800..=0xFFFF => out.extend_from_slice(&[
            0xE0 | (code >> 12) as u8,
            0x80 | ((code >> 6) & 0x3F) as u8,
            0x80 | (code & 0x3F) as u8,
        ]),
        _ => out.extend_from_slice(&[
            0xF0 | (code >> 18) as u8,
            0x80 | ((code >> 12) & 0x3F) as u8,
            0x80 | ((code >> 6) & 0x3F) as u8,
            0x80 | (code & 0x3F) as u8,
        ]),
    }
}

/// Decodes a string token, quotes included.
///
/// With `interpolating` set, `%%` stands for a literal `%` and any other `%`
/// is rejected, since placeholders cannot appear inside strings.
pub(crate) fn decode(token: &[u8], interpolating: bool) -> Result<BString, ParseErrorKind> {
    let (quote, body) = match token {
        [quote @ (b'"' | b'\''), body @ .., last] if last == quote => (*quote, body),
        _ => return Err(ParseErrorKind::UnterminatedString),
    };
    let mut out = Vec::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        let b = body[i];
        i += 1;
        match b {
            b'\\' => {
                let escape = *body
                    .get(i)
                    .ok_or(ParseErrorKind::UnterminatedEscapeSequence)?;
                i += 1;
                match escape {
                    b'"' | b'\'' | b'\\' | b'/' => out.push(escape),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0C),
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'u' => {
                        let mut code =
                            hex4(&body[i..]).ok_or(ParseErrorKind::InvalidUnicodeEscape)?;
                        i += 4;
                        if (0xD800..=0xDBFF).contains(&code) {
                            if let Some(low) = body[i..]
                                .strip_prefix(b"\\u")
                                .and_then(hex4)
                                .filter(|low| (0xDC00..=0xDFFF).contains(low))
                            {
                                code = 0x1_0000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                                i += 6;
                            }
                        }
                        push_code_point(&mut out, code);
                    }
                    other => return Err(ParseErrorKind::InvalidEscape(other)),
                }
            }
            b'%' if interpolating => {
                if body.get(i) == Some(&b'%') {
                    out.push(b'%');
                    i += 1;
                } else {
                    return Err(ParseErrorKind::InterpolationInString);
                }
            }
            b if b == quote => return Err(ParseErrorKind::UnterminatedString),
            _ => out.push(b),
        }
    }
    Ok(BString::from(out))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(br#""\b\f\n\r\t\\\"""#, b"\x08\x0c\n\r\t\\\"")]
    #[case(br#""\/\'""#, b"/'")]
    #[case(br#"'\"'"#, b"\"")]
    #[case(br#""a'b""#, b"a'b")]
    #[case(br#"'a"b'"#, b"a\"b")]
    #[case(br#""single byte \u0020""#, b"single byte  ")]
    #[case(br#""\u00A2""#, b"\xc2\xa2")]
    #[case(br#""\u20AC""#, b"\xe2\x82\xac")]
    #[case(br#""\uD834\uDD1E""#, b"\xf0\x9d\x84\x9e")]
    #[case(br#""\u12345""#, b"\xe1\x88\xb45")]
    #[case(br#""\u0000x""#, b"\xc0\x80x")]
    #[case(br#""\uD800""#, b"\xed\xa0\x80")]
    #[case(br#""\uD800A""#, b"\xed\xa0\x80A")]
    #[case(br#""\uDC00""#, b"\xed\xb0\x80")]
    #[case(br#""100%""#, b"100%")]
    fn decodes(#[case] token: &[u8], #[case] expected: &[u8]) {
        assert_eq!(decode(token, false).unwrap(), expected);
    }

    #[rstest]
    #[case(br#""abc"#, ParseErrorKind::UnterminatedString)]
    #[case(br#""abc'"#, ParseErrorKind::UnterminatedString)]
    #[case(br#""a"b""#, ParseErrorKind::UnterminatedString)]
    #[case(br#""\""#, ParseErrorKind::UnterminatedEscapeSequence)]
    #[case(br#""\ ""#, ParseErrorKind::InvalidEscape(b' '))]
    #[case(br#""\z""#, ParseErrorKind::InvalidEscape(b'z'))]
    #[case(br#""\ux""#, ParseErrorKind::InvalidUnicodeEscape)]
    #[case(br#""\u123x""#, ParseErrorKind::InvalidUnicodeEscape)]
    #[case(br#""\u12""#, ParseErrorKind::InvalidUnicodeEscape)]
    fn rejects(#[case] token: &[u8], #[case] expected: ParseErrorKind) {
        assert_eq!(decode(token, false), Err(expected));
    }

    #[test]
    fn percent_rules_depend_on_interpolation() {
        assert_eq!(decode(b"'100%%'", true).unwrap(), "100%");
        assert_eq!(decode(b"'100%%'", false).unwrap(), "100%%");
        assert_eq!(
            decode(b"'%s'", true),
            Err(ParseErrorKind::InterpolationInString)
        );
        assert_eq!(
            decode(b"'50%'", true),
            Err(ParseErrorKind::InterpolationInString)
        );
    }

    #[test]
    fn escaped_backslash_before_quote() {
        // the second backslash is escaped, so the quote closes the string
        assert_eq!(decode(br#""a\\""#, false).unwrap(), "a\\");
    }
}
