//! Literal-to-value coercion.
//!
//! Condition text carries no type annotations. The intended type of an operand
//! is taken from the value actually found in the record under test, so the same
//! literal may become an integer for one record and stay text for another.

use crate::value::Value;

/// Removes one layer of matching `"` or `'` quotes.
pub fn strip_quotes(literal: &str) -> &str {
    let bytes = literal.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &literal[1..literal.len() - 1];
        }
    }
    literal
}

/// Converts `literal` to the type of `reference`.
///
/// - bool reference: `true`, `1`, `yes` (any case) are true, anything else false
/// - int reference: parsed as `i64`
/// - float reference: parsed as `f64`
/// - anything else: the text itself
///
/// Unparseable numbers fall back to text, which then fails to compare with the
/// numeric record value and so counts as no match.
pub fn coerce(literal: &str, reference: &Value) -> Value {
    let text = strip_quotes(literal);
    match reference {
        Value::Bool(_) => Value::Bool(parse_bool(text)),
        Value::Int(_) => text
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(text.to_string())),
        Value::Float(_) => text
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::Text(text.to_string())),
        _ => Value::Text(text.to_string()),
    }
}

fn parse_bool(text: &str) -> bool {
    text.eq_ignore_ascii_case("true") || text == "1" || text.eq_ignore_ascii_case("yes")
}
