use crate::table::Value;
use crate::timestamp::AdaptiveDateParser;

/// Target types for best-effort coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Number,
    Date,
}

/// Parse a numeric cell, `None` for anything that is not a number.
///
/// Surrounding whitespace is ignored and NaN counts as not a number.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    match s.parse::<f64>() {
        Ok(n) if !n.is_nan() => Some(n),
        _ => None,
    }
}

/// Coerce a value to the target type.
///
/// Never fails: a value that cannot be represented in the target type
/// becomes `Value::Missing`.
pub fn convert_value_to_type(
    value: Value,
    field_type: FieldType,
    dates: &mut AdaptiveDateParser,
) -> Value {
    match field_type {
        FieldType::Number => match value {
            Value::Number(_) => value,
            Value::Text(s) => parse_number(&s).map(Value::Number).unwrap_or_default(),
            Value::Missing | Value::Date(_) => Value::Missing,
        },
        FieldType::Date => match value {
            Value::Date(_) => value,
            Value::Text(s) => dates.parse_date(&s).map(Value::Date).unwrap_or_default(),
            Value::Missing | Value::Number(_) => Value::Missing,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1.5"), Some(1.5));
        assert_eq!(parse_number(" 2 "), Some(2.0));
        assert_eq!(parse_number("-0.25"), Some(-0.25));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("bad"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1,5"), None);
    }

    #[test]
    fn test_convert_number() {
        let mut dates = AdaptiveDateParser::new();
        assert_eq!(
            convert_value_to_type(Value::text("0.37"), FieldType::Number, &mut dates),
            Value::Number(0.37)
        );
        assert_eq!(
            convert_value_to_type(Value::text("bad"), FieldType::Number, &mut dates),
            Value::Missing
        );
        assert_eq!(
            convert_value_to_type(Value::Number(4.0), FieldType::Number, &mut dates),
            Value::Number(4.0)
        );
        assert_eq!(
            convert_value_to_type(Value::Missing, FieldType::Number, &mut dates),
            Value::Missing
        );
    }

    #[test]
    fn test_convert_date() {
        let mut dates = AdaptiveDateParser::new();
        let expected = NaiveDate::from_ymd_opt(2002, 3, 1).unwrap();
        assert_eq!(
            convert_value_to_type(Value::text("2002-03-01"), FieldType::Date, &mut dates),
            Value::Date(expected)
        );
        assert_eq!(
            convert_value_to_type(Value::text("soon"), FieldType::Date, &mut dates),
            Value::Missing
        );
        assert_eq!(
            convert_value_to_type(Value::Number(2002.0), FieldType::Date, &mut dates),
            Value::Missing
        );
    }
}
