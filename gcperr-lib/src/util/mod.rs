use serde::Serialize;
use serde_json::{Serializer, Value, ser::PrettyFormatter};

/// Reindent compact JSON text with one tab per nesting level.
///
/// Field order is kept as written (`serde_json` is built with
/// `preserve_order`), so only whitespace differs from the input.
pub(crate) fn indent_json(raw: &str) -> Result<String, serde_json::Error> {
    let value: Value = serde_json::from_str(raw)?;
    let mut out = Vec::with_capacity(raw.len() * 2);
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}
