use serde::Deserialize;
use winavg_core::{AvgError, Result};

/// JSON shape returned by every test-server route: `{"numbers": [2, 3, 5]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NumbersResponse {
    #[serde(default)]
    pub numbers: Vec<i64>,
}

/// Decode a response body. A body without a `numbers` field is an empty batch.
pub fn parse_numbers(body: &str) -> Result<Vec<i64>> {
    serde_json::from_str::<NumbersResponse>(body)
        .map(|r| r.numbers)
        .map_err(|e| AvgError::Fetch(format!("parse numbers: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_field() {
        assert_eq!(parse_numbers(r#"{"numbers":[2,3,5,7]}"#).unwrap(), vec![2, 3, 5, 7]);
    }

    #[test]
    fn missing_field_is_empty() {
        assert!(parse_numbers(r#"{"other":1}"#).unwrap().is_empty());
    }

    #[test]
    fn non_integer_values_are_rejected() {
        assert!(matches!(
            parse_numbers(r#"{"numbers":["a"]}"#),
            Err(AvgError::Fetch(_))
        ));
    }

    #[test]
    fn garbage_is_a_fetch_error() {
        assert!(matches!(parse_numbers("<html>"), Err(AvgError::Fetch(_))));
    }
}
