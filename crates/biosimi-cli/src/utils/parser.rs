use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid pair '{0}'. Expected 'KEY=VALUE'.")]
    InvalidPair(String),

    #[error("Component '{component}' cannot be empty in '{input}'.")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },

    #[error("Invalid number '{value}' in '{input}'.")]
    InvalidNumber { input: String, value: String },

    #[error("Invalid schema '{0}'. Expected 'LEVEL.VERSION' (e.g., '3.1').")]
    InvalidSchema(String),
}

/// Splits `left=right` at the first `=`, trimming both sides. Neither side
/// may be empty.
pub fn parse_pair<'a>(
    input: &'a str,
    left: &'static str,
    right: &'static str,
) -> Result<(&'a str, &'a str), ParseError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidPair(input.to_string()))?;
    let (key, value) = (key.trim(), value.trim());
    for (component, text) in [(left, key), (right, value)] {
        if text.is_empty() {
            return Err(ParseError::EmptyComponent {
                component,
                input: input.to_string(),
            });
        }
    }
    Ok((key, value))
}

pub fn parse_amount(input: &str) -> Result<(String, f64), ParseError> {
    let (name, value) = parse_pair(input, "name", "amount")?;
    let amount = value.parse().map_err(|_| ParseError::InvalidNumber {
        input: input.to_string(),
        value: value.to_string(),
    })?;
    Ok((name.to_string(), amount))
}

pub fn parse_schema(input: &str) -> Result<(u32, u32), ParseError> {
    let invalid = || ParseError::InvalidSchema(input.to_string());
    let (level, version) = input.trim().split_once('.').ok_or_else(invalid)?;
    let level = level.parse().map_err(|_| invalid())?;
    let version = version.parse().map_err(|_| invalid())?;
    Ok((level, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pair_splits_at_first_equals_sign() {
        assert_eq!(parse_pair("IPTG = IPTG_ext", "name", "connected"), Ok(("IPTG", "IPTG_ext")));
        assert_eq!(parse_pair("k=a=b", "key", "value"), Ok(("k", "a=b")));
    }

    #[test]
    fn parse_pair_rejects_missing_or_empty_sides() {
        assert_eq!(
            parse_pair("IPTG", "name", "connected"),
            Err(ParseError::InvalidPair("IPTG".into()))
        );
        assert_eq!(
            parse_pair("=IPTG", "name", "connected"),
            Err(ParseError::EmptyComponent {
                component: "name",
                input: "=IPTG".into()
            })
        );
        assert!(matches!(
            parse_pair("IPTG= ", "name", "connected"),
            Err(ParseError::EmptyComponent {
                component: "connected",
                ..
            })
        ));
    }

    #[test]
    fn parse_amount_reads_floats() {
        assert_eq!(parse_amount("RNAP=100"), Ok(("RNAP".into(), 100.0)));
        assert!(matches!(
            parse_amount("RNAP=lots"),
            Err(ParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn parse_schema_reads_level_and_version() {
        assert_eq!(parse_schema("2.4"), Ok((2, 4)));
        assert_eq!(parse_schema(" 3.1 "), Ok((3, 1)));
        assert!(parse_schema("3").is_err());
        assert!(parse_schema("3.x").is_err());
    }
}
