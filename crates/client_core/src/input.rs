//! Conversion of free-form user text into request payloads.

use serde_json::{Number, Value};
use shared::error::InputError;

/// Single-prediction input: a JSON document, or failing that a
/// whitespace-separated list of numbers.
pub fn normalize_single_input(raw: &str) -> Result<Value, InputError> {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Ok(value);
    }

    let numbers = raw
        .split_whitespace()
        .map(parse_number)
        .collect::<Result<Vec<_>, _>>()?;
    if numbers.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(Value::Array(numbers))
}

/// Batch input is strict JSON and must be an array of inputs.
pub fn parse_batch_input(raw: &str) -> Result<Value, InputError> {
    if raw.trim().is_empty() {
        return Err(InputError::Empty);
    }
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_array() {
        return Err(InputError::NotASequence);
    }
    Ok(value)
}

fn parse_number(token: &str) -> Result<Value, InputError> {
    if let Ok(int) = token.parse::<i64>() {
        return Ok(Value::Number(int.into()));
    }
    token
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| InputError::InvalidNumber {
            token: token.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_input_is_passed_through_unchanged() {
        let docs = [
            json!([1, 2, 3]),
            json!([[0.5, -1.25], [3, 4]]),
            json!({"features": [1, 2], "label": null}),
            json!(42),
            json!("text"),
        ];
        for doc in docs {
            let raw = serde_json::to_string(&doc).expect("serialize");
            assert_eq!(normalize_single_input(&raw).expect("normalize"), doc);
        }
    }

    #[test]
    fn whitespace_separated_numbers_become_an_array() {
        assert_eq!(
            normalize_single_input("1 2 3").expect("normalize"),
            json!([1, 2, 3])
        );
        assert_eq!(
            normalize_single_input("  0.5\t-2\n1e3 ").expect("normalize"),
            json!([0.5, -2, 1000.0])
        );
    }

    #[test]
    fn non_numeric_token_is_rejected() {
        let err = normalize_single_input("1 two 3").expect_err("must fail");
        assert!(matches!(err, InputError::InvalidNumber { ref token } if token == "two"));
    }

    #[test]
    fn non_finite_token_is_rejected() {
        for raw in ["1 NaN", "inf 2", "1 -infinity"] {
            assert!(matches!(
                normalize_single_input(raw),
                Err(InputError::InvalidNumber { .. })
            ));
        }
    }

    #[test]
    fn blank_single_input_is_rejected() {
        assert!(matches!(
            normalize_single_input("   \n"),
            Err(InputError::Empty)
        ));
    }

    #[test]
    fn batch_input_requires_json_array() {
        assert_eq!(
            parse_batch_input("[[1,2],[3,4]]").expect("parse"),
            json!([[1, 2], [3, 4]])
        );
        assert!(matches!(
            parse_batch_input("1 2 3"),
            Err(InputError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_batch_input("{\"a\": 1}"),
            Err(InputError::NotASequence)
        ));
        assert!(matches!(parse_batch_input(""), Err(InputError::Empty)));
    }
}
