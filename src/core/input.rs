//! Parsing of user-typed custom arrays.

use crate::types::Value;

use super::sink::SinkError;

/// Parses comma-separated positive integers such as `"50,20,80,10"`.
///
/// Blank parts between commas are skipped. Any non-numeric or non-positive
/// part rejects the whole input.
pub fn parse_custom(input: &str) -> Result<Vec<Value>, SinkError> {
    let mut values = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let value: Value = part
            .parse()
            .map_err(|_| SinkError::InvalidInput(format!("not an integer: {part:?}")))?;
        if value <= 0 {
            return Err(SinkError::InvalidInput(format!("value must be positive: {value}")));
        }
        values.push(value);
    }
    if values.is_empty() {
        return Err(SinkError::EmptyInput);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_values() {
        assert_eq!(parse_custom(" 50, 20 ,80,10 ").expect("parse"), vec![50, 20, 80, 10]);
    }

    #[test]
    fn rejects_non_numeric_and_non_positive() {
        assert!(matches!(parse_custom("1,x,3"), Err(SinkError::InvalidInput(_))));
        assert!(matches!(parse_custom("1,0,3"), Err(SinkError::InvalidInput(_))));
        assert!(matches!(parse_custom("-4"), Err(SinkError::InvalidInput(_))));
    }

    #[test]
    fn rejects_empty_after_parsing() {
        assert_eq!(parse_custom(" , ,"), Err(SinkError::EmptyInput));
        assert_eq!(parse_custom(""), Err(SinkError::EmptyInput));
    }
}
