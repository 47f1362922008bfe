use alloc::{vec, vec::Vec};

use super::*;

fn tok(kind: TokenKind, text: &str) -> Token {
    Token::new(kind, text, 1, 1)
}

fn op(text: &str) -> Token {
    tok(TokenKind::Operator, text)
}

fn tokens_of(text: &str) -> Vec<Token> {
    let mut lexer = crate::Lexer::new();
    let mut tokens = Vec::new();
    let mut sink = |t: Result<Token, crate::LexError>| -> Result<(), crate::LexError> {
        tokens.push(t?);
        Ok(())
    };
    lexer.feed(text.as_bytes(), &mut sink).unwrap();
    lexer.flush(&mut sink).unwrap();
    tokens
}

fn kind_of(text: &str) -> ParseErrorKind {
    parse_tokens(&tokens_of(text)).unwrap_err().kind
}

#[test]
fn skip_tokens_are_ignored() {
    let tokens = tokens_of(" [ 1 ,\n\t2 ] ");
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Skip));
    assert_eq!(
        parse_tokens(&tokens).unwrap(),
        Value::from(vec![Value::Int(1), Value::Int(2)])
    );
}

#[test]
fn hand_built_batches() {
    let tokens = [
        op("{"),
        tok(TokenKind::String, "'k'"),
        op(":"),
        tok(TokenKind::Float, "-0.25"),
        op("}"),
    ];
    let value = parse_tokens(&tokens).unwrap();
    assert_eq!(value.as_dict().unwrap().get_float("k"), Ok(-0.25));
}

#[test]
fn only_whitespace_is_empty() {
    assert_eq!(kind_of(" \n"), ParseErrorKind::EmptyInput);
    assert_eq!(parse_tokens(&[]).unwrap_err().kind, ParseErrorKind::EmptyInput);
}

#[test]
fn trailing_commas() {
    assert_eq!(kind_of("[32,]"), ParseErrorKind::TrailingComma);
    assert_eq!(kind_of("{'a': 1,}"), ParseErrorKind::TrailingComma);
    // a mismatched close after the comma is not a trailing comma
    assert_eq!(
        kind_of("[32,}"),
        ParseErrorKind::UnexpectedToken {
            expected: "a value",
            found: "}".into(),
        }
    );
}

#[test]
fn structural_errors_name_what_was_expected() {
    assert_eq!(
        kind_of("{'a' 1}"),
        ParseErrorKind::UnexpectedToken {
            expected: "':'",
            found: "1".into(),
        }
    );
    assert_eq!(
        kind_of("[1 2]"),
        ParseErrorKind::UnexpectedToken {
            expected: "',' or ']'",
            found: "2".into(),
        }
    );
    assert_eq!(
        kind_of("{'a': 1 'b': 2}"),
        ParseErrorKind::UnexpectedToken {
            expected: "',' or '}'",
            found: "'b'".into(),
        }
    );
    assert_eq!(
        kind_of(":"),
        ParseErrorKind::UnexpectedToken {
            expected: "a value",
            found: ":".into(),
        }
    );
    assert_eq!(kind_of("[1,"), ParseErrorKind::UnexpectedEndOfInput);
    assert_eq!(kind_of("{'a':"), ParseErrorKind::UnexpectedEndOfInput);
}

#[test]
fn keys_must_be_strings() {
    let err = parse_tokens(&tokens_of("{\n 1: 2}")).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::KeyNotString);
    assert_eq!((err.line, err.column), (2, 2));
    assert_eq!(kind_of("{[]: 2}"), ParseErrorKind::KeyNotString);
}

#[test]
fn duplicate_keys_keep_the_last_value() {
    let value = parse_tokens(&tokens_of("{'a': 1, 'b': 2, 'a': 3}")).unwrap();
    let dict = value.as_dict().unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict.get_int("a"), Ok(3));
}

#[test]
fn leftover_tokens_are_extra_values() {
    let err = parse_tokens(&tokens_of("[1] 2")).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MultipleValues);
    assert_eq!(err.column, 5);
}

#[test]
fn numbers() {
    assert_eq!(
        parse_tokens(&tokens_of("-9223372036854775808")).unwrap(),
        Value::Int(i64::MIN)
    );
    assert_eq!(kind_of("9223372036854775808"), ParseErrorKind::IntegerOverflow);
    assert_eq!(kind_of("-9223372036854775809"), ParseErrorKind::IntegerOverflow);
    assert_eq!(
        parse_tokens(&[tok(TokenKind::Integer, "1x")]).unwrap_err().kind,
        ParseErrorKind::InvalidNumber
    );
    assert_eq!(
        parse_tokens(&[tok(TokenKind::Float, "inf")]).unwrap_err().kind,
        ParseErrorKind::InvalidNumber
    );
    assert_eq!(
        parse_tokens(&tokens_of("-32.20e-10")).unwrap(),
        Value::Float(-32.20e-10)
    );
    assert_eq!(kind_of("1e400"), ParseErrorKind::FloatOverflow);
    assert_eq!(kind_of("[0, -1.5e309]"), ParseErrorKind::FloatOverflow);
    assert_eq!(parse_tokens(&tokens_of("1e-400")).unwrap(), Value::Float(0.0));
}

#[test]
fn keywords() {
    assert_eq!(parse_tokens(&tokens_of("true")).unwrap(), Value::Bool(true));
    assert_eq!(parse_tokens(&tokens_of("false")).unwrap(), Value::Bool(false));
    assert_eq!(kind_of("nul"), ParseErrorKind::UnknownKeyword("nul".into()));
    assert_eq!(kind_of("null"), ParseErrorKind::UnknownKeyword("null".into()));
}

#[test]
fn depth_limit_applies_to_hand_built_batches() {
    let tokens = tokens_of("[[[1]]]");
    let shallow = ParserOptions { max_depth: 2 };
    let err = Parser::new(&tokens).options(shallow).parse().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::NestingTooDeep { limit: 2 });
    assert_eq!(err.column, 3);
    assert!(Parser::new(&tokens)
        .options(ParserOptions { max_depth: 3 })
        .parse()
        .is_ok());
}

#[test]
fn placeholders_without_arguments() {
    assert_eq!(kind_of("[%d]"), ParseErrorKind::MissingArgument);
    let tokens = tokens_of("[%d, %d]");
    let err = Parser::with_args(&tokens, &[Arg::Int(1)]).parse().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingArgument);
    assert_eq!(err.column, 6);
}

#[test]
fn argument_types_are_checked() {
    let tokens = tokens_of("%d");
    let err = Parser::with_args(&tokens, &[Arg::Str("x")]).parse().unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::ArgumentMismatch {
            escape: "%d",
            found: "string",
        }
    );
    let tokens = tokens_of("%s");
    let err = Parser::with_args(&tokens, &[Arg::Long(1)]).parse().unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::ArgumentMismatch {
            escape: "%s",
            found: "long",
        }
    );
}

#[test]
#[allow(clippy::cast_precision_loss)]
fn unsigned_arguments() {
    let tokens = tokens_of("[%u, %lu, %llu, %I64u]");
    let args = [
        Arg::UInt(u32::MAX),
        Arg::UInt(1),
        Arg::ULong(9_223_372_036_854_775_807),
        Arg::ULong(u64::MAX),
    ];
    let value = Parser::with_args(&tokens, &args).parse().unwrap();
    assert_eq!(
        *value,
        Value::from(vec![
            Value::Int(i64::from(u32::MAX)),
            Value::Int(1),
            Value::Int(i64::MAX),
            Value::Float(u64::MAX as f64),
        ])
    );

    let tokens = tokens_of("%u");
    let err = Parser::with_args(&tokens, &[Arg::ULong(1)]).parse().unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::ArgumentMismatch {
            escape: "%u",
            found: "ulong",
        }
    );
    let err = Parser::with_args(&tokens, &[Arg::Int(1)]).parse().unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::ArgumentMismatch {
            escape: "%u",
            found: "int",
        }
    );
}

#[test]
fn unused_arguments() {
    let tokens = tokens_of("[%d]");
    let err = Parser::with_args(&tokens, &[Arg::Int(1), Arg::Int(2), Arg::Int(3)])
        .parse()
        .unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnusedArguments(2));
}

#[test]
fn literal_percent_sign() {
    let tokens = tokens_of("%%");
    let err = Parser::with_args(&tokens, &[]).parse().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidInterpolation("%%".into()));
}
