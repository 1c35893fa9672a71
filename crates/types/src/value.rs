use std::fmt;

/// Cell spellings treated as "no value" when inferring a value from text.
pub const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One cell of a tabular record.
///
/// `Missing` is distinct from an empty string: an empty `String` is a value
/// that binds as blank text, `Missing` means the source had nothing there.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    String(String),
    Number(f64),
    #[default]
    Missing,
}

impl Value {
    /// Infers a value from raw cell text: missing markers become `Missing`,
    /// anything that parses as a float becomes `Number`, the rest stays text.
    pub fn infer(raw: &str) -> Self {
        if MISSING_MARKERS.contains(&raw) {
            return Value::Missing;
        }
        match raw.trim().parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::String(raw.to_string()),
        }
    }

    /// True for `Missing` and for a number that is NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(n) => n.is_nan(),
            Value::String(_) => false,
        }
    }

    /// The text this value binds as, or `None` when it is missing.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) => Some(n.to_string()),
            Value::Missing => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(&text),
            None => f.write_str("<missing>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer() {
        assert_eq!(Value::infer(""), Value::Missing);
        assert_eq!(Value::infer("NaN"), Value::Missing);
        assert_eq!(Value::infer("42"), Value::Number(42.0));
        assert_eq!(Value::infer(" 2.5 "), Value::Number(2.5));
        assert_eq!(Value::infer("Alice"), Value::String("Alice".into()));
        assert_eq!(Value::infer("2024-01-01"), Value::String("2024-01-01".into()));
    }

    #[test]
    fn test_missing_is_not_empty_string() {
        assert!(Value::Missing.is_missing());
        assert!(!Value::String(String::new()).is_missing());
        assert_eq!(Value::String(String::new()).as_text(), Some(String::new()));
    }

    #[test]
    fn test_nan_is_missing() {
        let nan = Value::Number(f64::NAN);
        assert!(nan.is_missing());
        assert_eq!(nan.as_text(), None);
    }

    #[test]
    fn test_number_text() {
        assert_eq!(Value::Number(42.0).as_text().as_deref(), Some("42"));
        assert_eq!(Value::Number(0.1).as_text().as_deref(), Some("0.1"));
        assert_eq!(Value::Number(-3.5).as_text().as_deref(), Some("-3.5"));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<&str>), Value::Missing);
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
    }
}
