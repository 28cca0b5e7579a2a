//! Number validation and the `selector:key=value,...` override mini-language
//! shared by gap, dock and layout overrides.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseNumberError {
    #[error("Invalid number")]
    Invalid,
    #[error("Number must be greater than or equal to {0}")]
    TooSmall(f64),
    #[error("Number must be less than or equal to {0}")]
    TooLarge(f64),
}

pub fn validate_number(
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<f64, ParseNumberError> {
    if !value.is_finite() {
        return Err(ParseNumberError::Invalid);
    }
    if let Some(min) = min {
        if value < min {
            return Err(ParseNumberError::TooSmall(min));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(ParseNumberError::TooLarge(max));
        }
    }
    Ok(value)
}

pub fn parse_number(
    value: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<f64, ParseNumberError> {
    let value: f64 = value.trim().parse().map_err(|_| ParseNumberError::Invalid)?;
    validate_number(value, min, max)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverrideError {
    #[error("\"{0}\" can have only one equal sign")]
    EqualSign(String),
    #[error("\"{0}\" can not have empty name or value")]
    Empty(String),
    #[error("\"{0}\" has duplicate name")]
    Duplicate(String),
    #[error("\"{0}\" has unknown name")]
    UnknownKey(String),
    #[error("\"{part}\": {source}")]
    Number {
        part: String,
        #[source]
        source: ParseNumberError,
    },
    #[error("\"{part}\" value can be {expected}")]
    Value { part: String, expected: &'static str },
}

/// Every problem found in one override line. The line is dropped as a whole.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct OverrideErrors(pub Vec<OverrideError>);

impl fmt::Display for OverrideErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

/// A whole override line that was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverrideLineError {
    #[error("\"{line}\" must have {expected} fields separated by colons")]
    Fields { line: String, expected: &'static str },
    #[error("\"{line}\": {errors}")]
    Override { line: String, errors: OverrideErrors },
}

/// One `key=value` item of an override body, lower-cased and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue<'a> {
    pub part: &'a str,
    pub key: String,
    pub value: String,
}

impl KeyValue<'_> {
    pub fn number(&self, min: Option<f64>, max: Option<f64>) -> Result<f64, OverrideError> {
        parse_number(&self.value, min, max).map_err(|source| OverrideError::Number {
            part: self.part.to_string(),
            source,
        })
    }
}

/// Splits `a=1,b=2` into key/value items. Malformed items come back as
/// errors in place so callers can keep collecting.
pub fn key_values(body: &str) -> impl Iterator<Item = Result<KeyValue<'_>, OverrideError>> {
    body.split(',').map(str::trim).map(|part| {
        let mut pieces = part.split('=');
        let (Some(key), Some(value), None) = (pieces.next(), pieces.next(), pieces.next()) else {
            return Err(OverrideError::EqualSign(part.to_string()));
        };
        let key = key.trim().to_lowercase();
        let value = value.trim().to_lowercase();
        if key.is_empty() || value.is_empty() {
            return Err(OverrideError::Empty(part.to_string()));
        }
        Ok(KeyValue { part, key, value })
    })
}

pub fn split_fields(line: &str) -> Vec<&str> { line.split(':').map(str::trim).collect() }

/// Matches surfaces by output, activity and desktop. Empty fields match
/// anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceSelector {
    pub output: String,
    pub activity: String,
    pub desktop: String,
}

impl SurfaceSelector {
    pub fn new(output: &str, activity: &str, desktop: &str) -> Self {
        Self {
            output: output.to_string(),
            activity: activity.to_string(),
            desktop: desktop.to_string(),
        }
    }

    pub fn matches(&self, output: &str, activity: &str, desktop: &str) -> bool {
        (self.output.is_empty() || self.output == output)
            && (self.activity.is_empty() || self.activity == activity)
            && (self.desktop.is_empty() || self.desktop == desktop)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn numbers_are_range_checked() {
        assert_eq!(parse_number("12", Some(1.0), Some(50.0)), Ok(12.0));
        assert_eq!(parse_number("abc", None, None), Err(ParseNumberError::Invalid));
        assert_eq!(
            parse_number("0", Some(1.0), None),
            Err(ParseNumberError::TooSmall(1.0))
        );
        assert_eq!(
            parse_number("51", None, Some(50.0)),
            Err(ParseNumberError::TooLarge(50.0))
        );
        assert_eq!(
            ParseNumberError::TooSmall(1.0).to_string(),
            "Number must be greater than or equal to 1"
        );
    }

    #[test]
    fn key_values_report_each_bad_item() {
        let items: Vec<_> = key_values("L=5, r==3, =4,t=2").collect();
        assert_eq!(items.len(), 4);
        let first = items[0].as_ref().unwrap();
        assert_eq!((first.key.as_str(), first.value.as_str()), ("l", "5"));
        assert_eq!(items[1], Err(OverrideError::EqualSign("r==3".into())));
        assert_eq!(items[2], Err(OverrideError::Empty("=4".into())));
        assert!(items[3].is_ok());
    }

    #[test]
    fn empty_selector_fields_are_wildcards() {
        let sel = SurfaceSelector::new("HDMI-1", "", "2");
        assert!(sel.matches("HDMI-1", "work", "2"));
        assert!(!sel.matches("HDMI-1", "work", "1"));
        assert!(!sel.matches("DP-1", "work", "2"));
        assert!(SurfaceSelector::default().matches("any", "thing", "here"));
    }
}
