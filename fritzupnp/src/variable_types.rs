//! Conversion of textual SOAP values into typed values.
//!
//! Only the datatypes needed by read-only status queries are supported:
//! `string`, `boolean`, `ui1`, `ui2` and `ui4`. Anything else is rejected
//! rather than coerced.

use std::fmt;

use crate::errors::ConversionError;
use crate::state_variables::StateVariable;

/// A converted action output value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateValue {
    Text(String),
    Boolean(bool),
    /// `ui1`, `ui2` and `ui4` values. Devices report `ui4` counters beyond
    /// 2^32, so every unsigned type lands in a `u64`.
    UnsignedInteger(u64),
}

impl StateValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            StateValue::UnsignedInteger(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Text(s) => write!(f, "{}", s),
            StateValue::Boolean(true) => write!(f, "1"),
            StateValue::Boolean(false) => write!(f, "0"),
            StateValue::UnsignedInteger(n) => write!(f, "{}", n),
        }
    }
}

/// Convert a raw SOAP value according to the datatype declared by `variable`.
pub fn convert_value(raw: &str, variable: &StateVariable) -> Result<StateValue, ConversionError> {
    match variable.data_type.as_str() {
        "string" => Ok(StateValue::Text(raw.to_string())),
        "boolean" => Ok(StateValue::Boolean(raw == "1")),
        "ui1" | "ui2" | "ui4" => raw
            .parse::<u64>()
            .map(StateValue::UnsignedInteger)
            .map_err(|source| ConversionError::InvalidUnsigned {
                value: raw.to_string(),
                data_type: variable.data_type.clone(),
                source,
            }),
        other => Err(ConversionError::UnknownDataType(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(data_type: &str) -> StateVariable {
        StateVariable {
            name: "NewValue".to_string(),
            data_type: data_type.to_string(),
            default_value: String::new(),
        }
    }

    #[test]
    fn test_boolean_only_accepts_one() {
        let var = variable("boolean");
        assert_eq!(convert_value("1", &var).unwrap(), StateValue::Boolean(true));
        assert_eq!(convert_value("0", &var).unwrap(), StateValue::Boolean(false));
        assert_eq!(convert_value("true", &var).unwrap(), StateValue::Boolean(false));
        assert_eq!(convert_value("", &var).unwrap(), StateValue::Boolean(false));
    }

    #[test]
    fn test_ui4_keeps_values_beyond_32_bits() {
        let var = variable("ui4");
        assert_eq!(
            convert_value("4294967296", &var).unwrap(),
            StateValue::UnsignedInteger(4_294_967_296)
        );
        assert_eq!(
            convert_value("42", &variable("ui1")).unwrap(),
            StateValue::UnsignedInteger(42)
        );
    }

    #[test]
    fn test_unsigned_parse_failure() {
        let err = convert_value("-3", &variable("ui2")).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidUnsigned { ref value, .. } if value == "-3"));
    }

    #[test]
    fn test_string_is_unchanged() {
        assert_eq!(
            convert_value(" FRITZ!Box ", &variable("string")).unwrap(),
            StateValue::Text(" FRITZ!Box ".to_string())
        );
    }

    #[test]
    fn test_unknown_datatype_is_rejected() {
        let err = convert_value("2016-01-01T00:00:00", &variable("dateTime")).unwrap_err();
        assert_eq!(err, ConversionError::UnknownDataType("dateTime".to_string()));
    }

    #[test]
    fn test_display_matches_wire_form() {
        assert_eq!(StateValue::Boolean(true).to_string(), "1");
        assert_eq!(StateValue::UnsignedInteger(7).to_string(), "7");
        assert_eq!(StateValue::Text("Up".to_string()).to_string(), "Up");
    }
}
