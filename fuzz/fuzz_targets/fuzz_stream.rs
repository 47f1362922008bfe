#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use qjson::{Arg, ParseError, StreamerOptions, Value, ValueStream};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::Map;

const HEADER: usize = 5; // 1 flag + 4-byte seed

thread_local! {
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[&[u8]] = &[
    b" ",
    b"\t",
    b"\n",
    b"\r",
    b"\r\n",
    // not whitespace to the lexer
    b"\x0b",
    "\u{a0}".as_bytes(),
];

static TEMPLATE_TABLE: &[&[u8]] = &[
    b"%d", b"%ld", b"%lld", b"%I64d", b"%u", b"%lu", b"%llu", b"%I64u", b"%i", b"%f", b"%s",
    b"%p", b"%%",
];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8 & 0x0F);
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;
        while prefix < size {
            let limit = max_size - prefix;
            prefix += append_from(WS_TABLE, &mut data[prefix..], limit);
            prefix += append_value(&mut data[prefix..], size, limit);
            if seed.is_multiple_of(3) {
                prefix += append_from(TEMPLATE_TABLE, &mut data[prefix..], max_size - prefix);
            }
        }
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Appends 1 to 8 random entries of `table` without exceeding `limit`.
fn append_from(table: &[&[u8]], buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }
        let n = rng.random_range(1..=limit.min(8));
        let mut written = 0;
        for _ in 0..n {
            let w = table[rng.random_range(0..table.len())];
            if written + w.len() > limit {
                break;
            }
            buf[written..written + w.len()].copy_from_slice(w);
            written += w.len();
        }
        written
    })
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };

    let serialized = serde_json::to_vec(&value.0).expect("Failed to serialize arbitrary value");
    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(serde_json::Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        use serde_json::Value as J;

        let value = match u.choose_index(21)? {
            0 => J::Bool(u.arbitrary()?),
            1 => J::from(u.arbitrary::<i64>()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                J::Number(serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?)
            }
            3..=10 => J::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                J::Array(elems.into_iter().map(|v| v.0).collect())
            }
            16..=20 => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                J::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
            _ => Err(arbitrary::Error::IncorrectFormat)?,
        };
        Ok(ArbitraryValue(value))
    }
}

/// Streams `chunks`, returning every handler result. Lexical and nesting
/// errors are skipped past.
fn stream(chunks: &[&[u8]], options: StreamerOptions) -> Vec<Result<Value, ParseError>> {
    let mut out = Vec::new();
    let mut stream = ValueStream::with_options(options, |v| out.push(v));
    for chunk in chunks {
        let _ = stream.feed(chunk);
    }
    let _ = stream.flush();
    drop(stream);
    out
}

fn target(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }
    let flags = data[0];
    let split_seed = u32::from_le_bytes([data[1], data[2], data[3], data[4]]) as usize;
    let data = &data[HEADER..];
    if data.is_empty() {
        return;
    }

    let options = StreamerOptions {
        max_nesting: if flags & 1 != 0 { 16 } else { 1024 },
        max_batch_size: if flags & 2 != 0 { 256 } else { 64 << 20 },
    };

    let whole = stream(&[data], options);
    let chunks = split_into_chunks(data, split_seed);
    let split = stream(&chunks, options);
    assert_eq!(whole, split, "chunking changed the result");

    // one-shot entry points must never panic
    let _ = qjson::parse_bytes(data);
    if flags & 4 != 0 {
        if let Ok(text) = std::str::from_utf8(data) {
            let embedded = Value::Int(1).shared();
            let args = [
                Arg::Int(1),
                Arg::Long(-1),
                Arg::UInt(2),
                Arg::ULong(u64::MAX),
                Arg::Bool(true),
                Arg::Double(0.5),
                Arg::Str("s"),
                Arg::Value(&embedded),
            ];
            let _ = qjson::parse_with_args(text, &args[..(split_seed % (args.len() + 1))]);
        }
    }
    if flags & 8 != 0 {
        if let Ok(value) = qjson::parse_bytes(data) {
            let _ = value.to_json_pretty();
        }
    }
}

fuzz_target!(|data: &[u8]| target(data));

/// Splits `data` into chunks of at least one byte whose sizes derive from
/// `split_seed`.
fn split_into_chunks(data: &[u8], split_seed: usize) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut seed = split_seed;
    while start < data.len() {
        let remaining = data.len() - start;
        let size = seed % remaining + 1;
        chunks.push(&data[start..start + size]);
        start += size;
        seed = seed.rotate_left(7) ^ size;
    }
    chunks
}
