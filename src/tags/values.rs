//! Tolerant cell value parsing.
//!
//! Cells arrive as JSON values so that typed callers (booleans, numbers) and
//! CSV text share one path. Anything absent or unparsable becomes `None`
//! ("no opinion") instead of an error. The `try_*` variants report the raw
//! text of an unparsable cell for strict validation.

use serde_json::Value;
use tracing::warn;

const TRUE_WORDS: [&str; 4] = ["1", "true", "yes", "y"];
const FALSE_WORDS: [&str; 4] = ["0", "false", "no", "n"];

/// Parse a boolean cell. Unknown words and empty text give `None`.
pub fn parse_bool(value: &Value) -> Option<bool> {
    try_parse_bool(value).unwrap_or(None)
}

/// Parse a boolean cell, returning the offending text for non-empty garbage.
pub fn try_parse_bool(value: &Value) -> Result<Option<bool>, String> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::Bool(b) => return Ok(Some(*b)),
        Value::String(s) => s.trim().to_lowercase(),
        other => other.to_string(),
    };
    if TRUE_WORDS.contains(&text.as_str()) {
        Ok(Some(true))
    } else if FALSE_WORDS.contains(&text.as_str()) {
        Ok(Some(false))
    } else if text.is_empty() {
        Ok(None)
    } else {
        Err(text)
    }
}

/// Parse a numeric cell. Unparsable text is logged and gives `None`.
pub fn parse_float(value: &Value) -> Option<f64> {
    match try_parse_float(value) {
        Ok(parsed) => parsed,
        Err(raw) => {
            warn!(value = %raw, "Unable to parse numeric value in tag configuration");
            None
        }
    }
}

/// Parse a numeric cell, returning the offending text for non-empty garbage.
pub fn try_parse_float(value: &Value) -> Result<Option<f64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
        Value::Number(n) => n.as_f64().map(Some).ok_or_else(|| n.to_string()),
        Value::String(s) => {
            let text = s.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>().map(Some).map_err(|_| text.to_string())
        }
        other => Err(other.to_string()),
    }
}

/// Trim a text cell. Non-text and whitespace-only cells give `None`.
pub fn normalize_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

/// Canonicalize a header: lower-case with spaces, hyphens and underscores removed.
///
/// `"Markers Enabled"`, `"markers_enabled"` and `"MARKERS-ENABLED"` all map
/// to `"markersenabled"`.
pub fn normalize_header_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bool_words() {
        for word in ["1", "true", "YES", " y ", "True"] {
            assert_eq!(parse_bool(&json!(word)), Some(true), "{word}");
        }
        for word in ["0", "false", "No", "N "] {
            assert_eq!(parse_bool(&json!(word)), Some(false), "{word}");
        }
    }

    #[test]
    fn test_parse_bool_no_opinion() {
        assert_eq!(parse_bool(&json!("")), None);
        assert_eq!(parse_bool(&json!("   ")), None);
        assert_eq!(parse_bool(&json!("maybe")), None);
        assert_eq!(parse_bool(&Value::Null), None);
    }

    #[test]
    fn test_parse_bool_typed_input() {
        assert_eq!(parse_bool(&json!(true)), Some(true));
        assert_eq!(parse_bool(&json!(false)), Some(false));
        assert_eq!(parse_bool(&json!(1)), Some(true));
        assert_eq!(parse_bool(&json!(0)), Some(false));
        assert_eq!(parse_bool(&json!(2)), None);
    }

    #[test]
    fn test_try_parse_bool_reports_garbage() {
        assert_eq!(try_parse_bool(&json!("maybe")), Err("maybe".to_string()));
        assert_eq!(try_parse_bool(&json!("")), Ok(None));
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float(&json!("1.5")), Some(1.5));
        assert_eq!(parse_float(&json!("  -2 ")), Some(-2.0));
        assert_eq!(parse_float(&json!("1e3")), Some(1000.0));
        assert_eq!(parse_float(&json!(3)), Some(3.0));
        assert_eq!(parse_float(&json!(0.25)), Some(0.25));
        assert_eq!(parse_float(&json!("")), None);
        assert_eq!(parse_float(&json!("abc")), None);
        assert_eq!(parse_float(&Value::Null), None);
    }

    #[test]
    fn test_try_parse_float_reports_garbage() {
        assert_eq!(try_parse_float(&json!(" 1,5 ")), Err("1,5".to_string()));
        assert_eq!(try_parse_float(&json!("0")), Ok(Some(0.0)));
    }

    #[test]
    fn test_normalize_string() {
        assert_eq!(normalize_string(&json!("  Blonde ")), Some("Blonde".to_string()));
        assert_eq!(normalize_string(&json!("   ")), None);
        assert_eq!(normalize_string(&json!(5)), None);
        assert_eq!(normalize_string(&Value::Null), None);
    }

    #[test]
    fn test_normalize_header_key() {
        assert_eq!(normalize_header_key("Markers Enabled"), "markersenabled");
        assert_eq!(normalize_header_key("markers_enabled"), "markersenabled");
        assert_eq!(normalize_header_key("MARKERS-ENABLED"), "markersenabled");
        assert_eq!(normalize_header_key(" Marker Merge Param 3 "), "markermergeparam3");
    }
}
