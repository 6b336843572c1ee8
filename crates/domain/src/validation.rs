//! Field validation for submitted employee bodies.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::entities::OperationResult;

pub const MAX_FIELD_LENGTH: usize = 50;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// JSON values that count as "not provided".
fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

/// Checks every submitted field and collects one sentence per violation.
///
/// A field fails when it is absent or falsy (`""`, `0`, `false`, `null`),
/// when it holds something other than a string, when it is longer than
/// [`MAX_FIELD_LENGTH`] characters, or, for `email`, when it does not look like
/// `local@domain.tld`. Violations are joined with single spaces.
pub fn validate<'a, I>(fields: I) -> OperationResult
where
    I: IntoIterator<Item = (&'a str, Option<&'a Value>)>,
{
    let mut violations = Vec::new();

    for (key, value) in fields {
        let text = value.and_then(Value::as_str);

        if is_falsy(value) {
            violations.push(format!("Field '{}' cannot be empty.", key));
        } else if text.is_none() {
            violations.push(format!("Field '{}' must be a string.", key));
        }

        if text.is_some_and(|text| text.chars().count() > MAX_FIELD_LENGTH) {
            violations.push(format!(
                "Field '{}' cannot be longer than {} characters.",
                key, MAX_FIELD_LENGTH
            ));
        }

        if key == "email" && !text.is_some_and(is_valid_email) {
            violations.push(format!("Field '{}' invalid format.", key));
        }
    }

    if violations.is_empty() {
        OperationResult::ok()
    } else {
        OperationResult::failure(violations.join(" "))
    }
}
