use alloc::{format, string::ToString};

use rstest::rstest;

use crate::{
    Arg, LexErrorKind, NestingErrorKind, ParseError, ParseErrorKind, Value, parse, parse_bytes,
    parse_with_args, qjson,
};

fn kind(result: Result<Value, ParseError>) -> ParseErrorKind {
    result.unwrap_err().kind
}

#[rstest]
#[case("", ParseErrorKind::EmptyInput)]
#[case("\n ", ParseErrorKind::EmptyInput)]
#[case("\"abc", ParseErrorKind::UnterminatedString)]
#[case("'abc", ParseErrorKind::UnterminatedString)]
#[case("\"abc\\\"", ParseErrorKind::UnterminatedString)]
#[case("\"\\u12", ParseErrorKind::UnterminatedEscapeSequence)]
#[case("\"\\x\"", ParseErrorKind::InvalidEscape(b'x'))]
#[case("\"\\u12g4\"", ParseErrorKind::InvalidUnicodeEscape)]
#[case("[32", ParseErrorKind::UnexpectedEndOfInput)]
#[case("[32,", ParseErrorKind::UnexpectedEndOfInput)]
#[case("[32,]", ParseErrorKind::TrailingComma)]
#[case("{'abc':32", ParseErrorKind::UnexpectedEndOfInput)]
#[case("{'abc':32,", ParseErrorKind::UnexpectedEndOfInput)]
#[case("{'abc':32,}", ParseErrorKind::TrailingComma)]
#[case("{'abc'}", ParseErrorKind::UnexpectedToken { expected: "':'", found: "}".into() })]
#[case("{32: 'abc'}", ParseErrorKind::KeyNotString)]
#[case("nul", ParseErrorKind::UnknownKeyword("nul".into()))]
#[case("truer", ParseErrorKind::UnknownKeyword("truer".into()))]
#[case("null", ParseErrorKind::UnknownKeyword("null".into()))]
#[case("00", ParseErrorKind::MultipleValues)]
#[case("false true", ParseErrorKind::MultipleValues)]
#[case("[1] [2]", ParseErrorKind::MultipleValues)]
#[case("} true", ParseErrorKind::Nesting(NestingErrorKind::UnmatchedClose(b'}')))]
#[case("[32,}", ParseErrorKind::Nesting(NestingErrorKind::UnmatchedClose(b'}')))]
#[case("@", ParseErrorKind::Lex(LexErrorKind::InvalidCharacter(b'@')))]
#[case("{\x01", ParseErrorKind::Lex(LexErrorKind::InvalidCharacter(0x01)))]
#[case("[1e", ParseErrorKind::Lex(LexErrorKind::UnterminatedToken))]
#[case("-", ParseErrorKind::Lex(LexErrorKind::UnterminatedToken))]
#[case("1.x", ParseErrorKind::Lex(LexErrorKind::InvalidCharacter(b'x')))]
#[case("%x", ParseErrorKind::InvalidInterpolation("%x".into()))]
#[case("%d", ParseErrorKind::MissingArgument)]
#[case("99999999999999999999", ParseErrorKind::IntegerOverflow)]
#[case("1e400", ParseErrorKind::FloatOverflow)]
#[case("-1e400", ParseErrorKind::FloatOverflow)]
#[case("%lux", ParseErrorKind::Lex(LexErrorKind::InvalidCharacter(b'x')))]
fn test_rejected(#[case] input: &str, #[case] expected: ParseErrorKind) {
    assert_eq!(kind(parse(input)), expected);
}

#[test]
fn test_invalid_bytes() {
    assert_eq!(
        kind(parse_bytes(b"[0\xff]")),
        ParseErrorKind::Lex(LexErrorKind::InvalidCharacter(0xFF))
    );
    assert_eq!(
        kind(parse_bytes(b"\"a\x00b\"")),
        ParseErrorKind::Lex(LexErrorKind::InvalidCharacter(0))
    );
}

#[test]
fn test_error_positions() {
    let err = parse("[1,\n 2,\n @]").unwrap_err();
    assert_eq!((err.line, err.column), (3, 2));
    let err = parse("[1, 2").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedEndOfInput);
    assert_eq!((err.line, err.column), (1, 6));
    assert_eq!(
        err.to_string(),
        "unexpected end of input at 1:6"
    );
}

#[test]
fn test_interpolation_errors() {
    let err = parse_with_args("['%s', %s]", &[Arg::Str("a")]).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InterpolationInString);

    let err = parse_with_args("%%", &[Arg::Int(1)]).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidInterpolation("%%".into()));

    let err = qjson!("[%d]").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingArgument);

    let err = qjson!("[%d]", 1, 2).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnusedArguments(1));

    let err = qjson!("%f", 1).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::ArgumentMismatch {
            escape: "%f",
            found: "int",
        }
    );
    assert_eq!(
        format!("{err}"),
        "argument int does not match '%f' at 1:1"
    );

    let err = qjson!("%d", 1_i64).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::ArgumentMismatch { .. }));

    let err = qjson!("%p", 1).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::ArgumentMismatch { escape: "%p", .. }));
}

#[test]
fn test_nesting_over_the_limit() {
    let text = "[".repeat(1024) + "{}" + &"]".repeat(1024);
    let err = parse(&text).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::Nesting(NestingErrorKind::TooDeep { limit: 1024 })
    );
    assert_eq!(err.column, 1025);
}
