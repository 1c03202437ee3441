//! Local input checks that run before any remote call

use crate::bridge::outcome::{BridgeFailure, OutcomeCode};
use serde_json::Value;

/// `null`, `false`, `0` and `""` count as absent, like a missing key
pub(crate) fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => !flag,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
        Some(Value::Array(_) | Value::Object(_)) => false,
    }
}

/// Validate the bridge input and return the access token
///
/// # Errors
///
/// `MISSING_ACCESS_TOKEN` when absent, `INVALID_ACCESS_TOKEN_FORMAT` when it is
/// not a string or only whitespace
pub fn access_token(value: Option<&Value>) -> Result<&str, BridgeFailure> {
    if is_absent(value) {
        return Err(BridgeFailure::from_code(OutcomeCode::MissingAccessToken));
    }
    match value {
        Some(Value::String(token)) if !token.trim().is_empty() => Ok(token.as_str()),
        _ => Err(BridgeFailure::from_code(
            OutcomeCode::InvalidAccessTokenFormat,
        )),
    }
}

/// Validate a required text field of the exchange input
///
/// Numbers are accepted in their string form.
///
/// # Errors
///
/// Returns `missing` when the value is absent or not representable as text
pub fn required_text(value: Option<&Value>, missing: OutcomeCode) -> Result<String, BridgeFailure> {
    if is_absent(value) {
        return Err(BridgeFailure::from_code(missing));
    }
    match value {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Number(number)) => Ok(number.to_string()),
        _ => Err(BridgeFailure::new(
            missing,
            "value is present but is not a string",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_access_token_values() {
        for value in [None, Some(json!(null)), Some(json!("")), Some(json!(false)), Some(json!(0))] {
            let err = access_token(value.as_ref()).unwrap_err();
            assert_eq!(err.code, OutcomeCode::MissingAccessToken, "{value:?}");
        }
    }

    #[test]
    fn test_malformed_access_token_values() {
        for value in [json!("   "), json!(42), json!(true), json!(["t"]), json!({"t": 1})] {
            let err = access_token(Some(&value)).unwrap_err();
            assert_eq!(err.code, OutcomeCode::InvalidAccessTokenFormat, "{value}");
        }
    }

    #[test]
    fn test_access_token_is_passed_through_untrimmed() {
        let value = json!(" token ");
        assert_eq!(access_token(Some(&value)).unwrap(), " token ");
    }

    #[test]
    fn test_required_text() {
        let code = json!("abc");
        assert_eq!(
            required_text(Some(&code), OutcomeCode::MissingAuthorizationCode).unwrap(),
            "abc"
        );
        let number = json!(1234);
        assert_eq!(
            required_text(Some(&number), OutcomeCode::MissingAuthorizationCode).unwrap(),
            "1234"
        );
        let err = required_text(None, OutcomeCode::MissingRedirectUri).unwrap_err();
        assert_eq!(err.code, OutcomeCode::MissingRedirectUri);
        let err = required_text(Some(&json!("")), OutcomeCode::MissingRedirectUri).unwrap_err();
        assert_eq!(err.code, OutcomeCode::MissingRedirectUri);
    }
}
