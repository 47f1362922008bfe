#![allow(missing_docs)]

use qjson::{
    Lit, NestingErrorKind, ParseError, ParseErrorKind, StreamError, StreamerOptions, Value,
    ValueStream,
};

const TRANSCRIPT: &str = concat!(
    "{\"QMP\": {\"version\": {\"qemu\": {\"micro\": 0, \"minor\": 1, \"major\": 8}, ",
    "\"package\": \"\"}, \"capabilities\": []}}\r\n",
    "{\"return\": {}}\r\n",
    "{\"return\": [{\"name\": \"drive0\", \"ro\": false}, {\"name\": \"cd\\u00e9\", \"ro\": true}]}\r\n",
    "{\"timestamp\": {\"seconds\": 1700000000, \"microseconds\": 5}, \"event\": \"STOP\"}\r\n",
    "{'execute': 'query-status', 'id': 'x-1'}\r\n",
);

fn collect(chunks: &[&[u8]]) -> Vec<Result<Value, ParseError>> {
    let mut out = Vec::new();
    let mut stream = ValueStream::new(|v| out.push(v));
    for chunk in chunks {
        stream.feed(chunk).expect("no lexical or nesting error");
    }
    stream.flush().expect("no lexical error at end of input");
    drop(stream);
    out
}

fn values(chunks: &[&[u8]]) -> Vec<Value> {
    collect(chunks)
        .into_iter()
        .map(|v| v.expect("parse error"))
        .collect()
}

#[test]
fn transcript_in_one_chunk() {
    let out = values(&[TRANSCRIPT.as_bytes()]);
    assert_eq!(out.len(), 5);
    assert_eq!(out[1], Lit::Dict(&[("return", Lit::Dict(&[]))]));
    assert_eq!(
        out[2],
        Lit::Dict(&[(
            "return",
            Lit::List(&[
                Lit::Dict(&[("name", Lit::Str("drive0")), ("ro", Lit::Bool(false))]),
                Lit::Dict(&[("name", Lit::Str("cd\u{e9}")), ("ro", Lit::Bool(true))]),
            ])
        )])
    );
    let cmd = out[4].as_dict().unwrap();
    assert_eq!(cmd.get_str("execute").unwrap(), "query-status");
}

#[test]
fn every_split_point_gives_the_same_values() {
    let bytes = TRANSCRIPT.as_bytes();
    let whole = values(&[bytes]);
    for at in 0..=bytes.len() {
        let (a, b) = bytes.split_at(at);
        assert_eq!(values(&[a, b]), whole, "split at {at}");
    }
}

#[test]
fn byte_at_a_time() {
    let bytes = TRANSCRIPT.as_bytes();
    let chunks: Vec<&[u8]> = bytes.chunks(1).collect();
    assert_eq!(values(&chunks), values(&[bytes]));
}

#[test]
fn malformed_values_are_reported_in_order() {
    let out = collect(&[b"{\"a\": 1}\n{\"b\": }\n[1,,2]\n{\"c\": true}\n"]);
    assert_eq!(out.len(), 4);
    assert!(out[0].is_ok());
    assert!(matches!(
        out[1].as_ref().unwrap_err().kind,
        ParseErrorKind::UnexpectedToken { .. }
    ));
    let err = out[2].as_ref().unwrap_err();
    assert_eq!((err.line, err.column), (3, 4));
    assert_eq!(out[3], Ok(Lit::Dict(&[("c", Lit::Bool(true))]).to_value()));
}

#[test]
fn recovers_after_stream_errors() {
    let mut out = Vec::new();
    let mut stream = ValueStream::with_options(
        StreamerOptions {
            max_nesting: 2,
            ..Default::default()
        },
        |v| out.push(v),
    );

    let err = stream.feed(b"[[[1]]]").unwrap_err();
    assert!(matches!(
        err,
        StreamError::Nesting(qjson::NestingError {
            kind: NestingErrorKind::TooDeep { limit: 2 },
            ..
        })
    ));
    stream.feed(b"\n[[1]]").unwrap();

    assert!(matches!(stream.feed(b"{\"a\": #}"), Err(StreamError::Lex(_))));
    stream.feed(b"\n{\"a\": 2}").unwrap();
    stream.flush().unwrap();
    drop(stream);

    let out: Vec<Value> = out.into_iter().map(Result::unwrap).collect();
    assert_eq!(
        out,
        [
            Lit::List(&[Lit::List(&[Lit::Int(1)])]).to_value(),
            Lit::Dict(&[("a", Lit::Int(2))]).to_value(),
        ]
    );
}

/// Feeds `chunks`, ignoring stream errors, and returns the parsed values.
fn values_past_errors(options: StreamerOptions, chunks: &[&[u8]]) -> Vec<Value> {
    let mut out = Vec::new();
    let mut stream = ValueStream::with_options(options, |v| out.push(v));
    for chunk in chunks {
        let _ = stream.feed(chunk);
    }
    let _ = stream.flush();
    drop(stream);
    out.into_iter().map(|v| v.expect("parse error")).collect()
}

#[test]
fn errors_do_not_depend_on_chunking() {
    let input: &[u8] = b"{\"a\": #}\n{\"execute\": \"stop\"}\n";
    let whole = values_past_errors(StreamerOptions::default(), &[input]);
    assert_eq!(whole, [Lit::Dict(&[("execute", Lit::Str("stop"))]).to_value()]);
    for at in 0..=input.len() {
        let (a, b) = input.split_at(at);
        let split = values_past_errors(StreamerOptions::default(), &[a, b]);
        assert_eq!(split, whole, "split at {at}");
    }
}

#[test]
fn nothing_inside_a_rejected_value_is_delivered() {
    let options = StreamerOptions {
        max_nesting: 2,
        ..Default::default()
    };
    let input: &[u8] = b"[[[{\"execute\": \"quit\"}]]] 5\n[[1]]\n";
    let whole = values_past_errors(options, &[input]);
    assert_eq!(whole, [Lit::List(&[Lit::List(&[Lit::Int(1)])]).to_value()]);
    let bytes: Vec<&[u8]> = input.chunks(1).collect();
    assert_eq!(values_past_errors(options, &bytes), whole);
}

#[test]
fn handler_can_be_recovered() {
    let mut stream = ValueStream::new(|v: Result<Value, ParseError>| {
        assert!(v.is_ok());
    });
    stream.feed(b"1 2 3").unwrap();
    stream.flush().unwrap();
    let _handler = stream.into_handler();
}
