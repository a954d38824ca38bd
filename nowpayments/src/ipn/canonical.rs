//! Canonical JSON serialization for IPN payloads.
//!
//! The gateway signs `json.dumps(payload, separators=(',', ':'), sort_keys=True)`, so both sides
//! must produce byte-identical text for the same logical payload:
//!
//! - object keys sorted by raw string order at every nesting level (arrays keep their order)
//! - no whitespace between tokens
//! - in [`Canonicalization::AsciiEscaped`] mode, every character outside printable ASCII is written
//!   as a lowercase `\uXXXX` escape (surrogate pairs above U+FFFF) and floats use the reference
//!   signer's notation (`0.17`, `100.0`, `1e-05`, `1e+16`)
//!
//! Key ordering is applied here explicitly rather than relying on the iteration order of
//! `serde_json::Map`, which changes when the `preserve_order` feature is enabled anywhere in the
//! dependency graph.
//!
//! Integers outside the `i64`/`u64` range cannot be reproduced. serde_json parses them as `f64`,
//! so `18446744073709551616` is rendered as `1.8446744073709552e+19` while the reference signer
//! keeps every digit, and a payload carrying such a number will not verify. Gateway ids and
//! amounts stay well inside that range.

use std::io;

use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Value, ser::Formatter};

/// How strings and floats are rendered in the canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Canonicalization {
    /// Byte-compatible with the gateway's reference signer.
    #[default]
    AsciiEscaped,
    /// Non-ASCII written as raw UTF-8 and floats in serde_json's shortest notation.
    Utf8,
}

/// Canonical JSON text for `value` using the default [`Canonicalization`].
pub fn canonicalize(value: &Value) -> serde_json::Result<String> {
    canonicalize_with(value, Canonicalization::default())
}

pub fn canonicalize_with(value: &Value, mode: Canonicalization) -> serde_json::Result<String> {
    let bytes = canonical_bytes(value, mode)?;
    String::from_utf8(bytes).map_err(serde_json::Error::custom)
}

/// Canonical form as the exact bytes fed to the MAC.
pub fn canonical_bytes(value: &Value, mode: Canonicalization) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(256);
    match mode {
        Canonicalization::AsciiEscaped => {
            let mut ser = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
            Sorted(value).serialize(&mut ser)?;
        }
        Canonicalization::Utf8 => {
            let mut ser = serde_json::Serializer::new(&mut out);
            Sorted(value).serialize(&mut ser)?;
        }
    }
    Ok(out)
}

/// Serializes a [`Value`] with object keys in sorted order at every level.
struct Sorted<'a>(&'a Value);

impl Serialize for Sorted<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

                let mut ser = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    ser.serialize_entry(key, &Sorted(value))?;
                }
                ser.end()
            }
            Value::Array(items) => {
                let mut ser = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    ser.serialize_element(&Sorted(item))?;
                }
                ser.end()
            }
            scalar => scalar.serialize(serializer),
        }
    }
}

/// Compact formatter that escapes non-ASCII and prints floats like the reference signer.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let bytes = fragment.as_bytes();
        let mut start = 0;

        for (idx, ch) in fragment.char_indices() {
            // serde_json has already escaped quotes, backslashes and C0 controls
            if ch.is_ascii() && ch != '\x7f' {
                continue;
            }
            writer.write_all(&bytes[start..idx])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = idx + ch.len_utf8();
        }

        writer.write_all(&bytes[start..])
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(float_repr(value)?.as_bytes())
    }

    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.write_f64(writer, f64::from(value))
    }
}

/// Shortest round-trip float text in the reference signer's layout.
///
/// Positional when the decimal exponent is in `-4..16` (always with a fractional part),
/// scientific otherwise with an explicit sign and at least two exponent digits.
fn float_repr(value: f64) -> io::Result<String> {
    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, format!("unexpected float format: {scientific}")))?;
    let exponent: i32 = exponent
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if (-4..16).contains(&exponent) {
        let positional = value.to_string();
        if positional.contains('.') {
            Ok(positional)
        } else {
            Ok(format!("{positional}.0"))
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        Ok(format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs()))
    }
}
