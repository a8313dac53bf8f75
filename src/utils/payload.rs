//! Presence checks and coercions for loosely typed JSON request bodies.

use catalog_http::error::AppError;
use catalog_kernel::settings::ValidationSettings;
use serde_json::{Map, Number, Value};

pub const MISSING_FIELDS: &str = "Missing fields";

/// A JSON object body with field accessors that report validation errors.
pub struct Payload<'a> {
    fields: &'a Map<String, Value>,
    zero_is_missing: bool,
}

impl<'a> Payload<'a> {
    pub fn new(body: &'a Value, validation: &ValidationSettings) -> Result<Self, AppError> {
        let fields = body
            .as_object()
            .ok_or_else(|| AppError::bad_request("request body must be a JSON object"))?;
        Ok(Self {
            fields,
            zero_is_missing: validation.zero_is_missing,
        })
    }

    /// Empty strings, empty collections, `false` and `null` count as absent.
    /// Numeric zero does too when `zero_is_missing` is set.
    fn is_present(&self, value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !(self.zero_is_missing && n.as_f64() == Some(0.0)),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
        }
    }

    /// Fail with every absent field named, before any field is interpreted.
    pub fn require(&self, names: &[&'static str]) -> Result<(), AppError> {
        let missing: Vec<&'static str> = names
            .iter()
            .copied()
            .filter(|name| !self.fields.get(*name).is_some_and(|v| self.is_present(v)))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(missing, MISSING_FIELDS))
        }
    }

    fn get(&self, name: &'static str) -> Result<&'a Value, AppError> {
        self.fields
            .get(name)
            .ok_or_else(|| AppError::validation(vec![name], MISSING_FIELDS))
    }

    pub fn text(&self, name: &'static str) -> Result<String, AppError> {
        match self.get(name)? {
            Value::String(s) => Ok(s.clone()),
            _ => Err(AppError::validation(
                vec![name],
                format!("{name} must be a string"),
            )),
        }
    }

    /// Integers, whole floats and numeric strings are accepted. Values outside
    /// the `i64` range are rejected rather than saturated.
    pub fn integer(&self, name: &'static str) -> Result<i64, AppError> {
        let invalid = || AppError::validation(vec![name], format!("{name} must be an integer"));

        match self.get(name)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| is_whole_i64(*f)).map(|f| f as i64))
                .ok_or_else(invalid),
            Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }

    /// Numbers and numeric strings are accepted.
    pub fn number(&self, name: &'static str) -> Result<Number, AppError> {
        let invalid = || AppError::validation(vec![name], format!("{name} must be a number"));

        match self.get(name)? {
            Value::Number(n) => Ok(n.clone()),
            Value::String(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    Ok(Number::from(i))
                } else {
                    s.parse::<f64>()
                        .ok()
                        .and_then(Number::from_f64)
                        .ok_or_else(invalid)
                }
            }
            _ => Err(invalid()),
        }
    }
}

// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
fn is_whole_i64(f: f64) -> bool {
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strict() -> ValidationSettings {
        ValidationSettings {
            zero_is_missing: true,
        }
    }

    fn lenient() -> ValidationSettings {
        ValidationSettings {
            zero_is_missing: false,
        }
    }

    fn missing_fields(err: AppError) -> Vec<&'static str> {
        match err {
            AppError::Validation { fields, .. } => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn names_every_missing_field() {
        let body = json!({"title": "", "extra": 1});
        let payload = Payload::new(&body, &strict()).unwrap();
        let err = payload.require(&["title", "publication_year"]).unwrap_err();
        assert_eq!(missing_fields(err), vec!["title", "publication_year"]);
    }

    #[test]
    fn zero_counts_as_missing_only_when_configured() {
        let body = json!({"rating": 0});
        let strict_settings = strict();
        let payload = Payload::new(&body, &strict_settings).unwrap();
        assert!(payload.require(&["rating"]).is_err());

        let lenient_settings = lenient();
        let payload = Payload::new(&body, &lenient_settings).unwrap();
        assert!(payload.require(&["rating"]).is_ok());
        assert_eq!(payload.number("rating").unwrap(), Number::from(0));
    }

    #[test]
    fn integer_coerces_numeric_strings() {
        let body = json!({"a": "42", "b": 7, "c": 3.0, "d": "abc", "e": 2.5});
        let settings = strict();
        let payload = Payload::new(&body, &settings).unwrap();
        assert_eq!(payload.integer("a").unwrap(), 42);
        assert_eq!(payload.integer("b").unwrap(), 7);
        assert_eq!(payload.integer("c").unwrap(), 3);

        let err = payload.integer("d").unwrap_err();
        assert_eq!(err.to_string(), "d must be an integer");
        assert!(payload.integer("e").is_err());
    }

    #[test]
    fn integer_rejects_values_outside_i64() {
        let body = json!({"big": u64::MAX, "huge": 1e300, "tiny": -1e300, "edge": i64::MIN});
        let settings = strict();
        let payload = Payload::new(&body, &settings).unwrap();
        assert_eq!(
            payload.integer("big").unwrap_err().to_string(),
            "big must be an integer"
        );
        assert!(payload.integer("huge").is_err());
        assert!(payload.integer("tiny").is_err());
        assert_eq!(payload.integer("edge").unwrap(), i64::MIN);
    }

    #[test]
    fn number_keeps_integers_integral() {
        let body = json!({"int": 5, "float": 4.5, "str": "3", "bad": [1]});
        let settings = strict();
        let payload = Payload::new(&body, &settings).unwrap();
        assert_eq!(payload.number("int").unwrap(), Number::from(5));
        assert_eq!(payload.number("float").unwrap().as_f64(), Some(4.5));
        assert_eq!(payload.number("str").unwrap(), Number::from(3));
        assert!(payload.number("bad").is_err());
    }

    #[test]
    fn text_rejects_non_strings() {
        let body = json!({"user": 12});
        let settings = strict();
        let payload = Payload::new(&body, &settings).unwrap();
        assert_eq!(
            payload.text("user").unwrap_err().to_string(),
            "user must be a string"
        );
    }

    #[test]
    fn non_object_body_is_bad_request() {
        let body = json!(["title"]);
        assert!(matches!(
            Payload::new(&body, &strict()),
            Err(AppError::BadRequest { .. })
        ));
    }
}
