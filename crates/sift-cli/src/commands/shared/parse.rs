use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
///
/// Hyphens are accepted in place of underscores (`in-progress`).
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse an optional flag value.
pub fn parse_optional_enum<T>(raw: Option<&str>, field: &str) -> anyhow::Result<Option<T>>
where
    T: DeserializeOwned,
{
    raw.map(|value| parse_enum(value, field)).transpose()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sift_core::enums::{AuditAction, Decision, ExtractionStatus, QualityStatus};

    use super::{parse_enum, parse_optional_enum};

    #[test]
    fn parses_snake_case_enum() {
        let decision: Decision = parse_enum("include", "decision").expect("decision should parse");
        assert_eq!(decision, Decision::Include);
    }

    #[test]
    fn parses_hyphenated_and_uppercase_values() {
        let quality: QualityStatus =
            parse_enum("in-progress", "quality").expect("quality should parse");
        assert_eq!(quality, QualityStatus::InProgress);
        let action: AuditAction = parse_enum("AUTO_DECIDED", "action").expect("action should parse");
        assert_eq!(action, AuditAction::AutoDecided);
    }

    #[test]
    fn optional_none_stays_none() {
        let parsed: Option<ExtractionStatus> =
            parse_optional_enum(None, "extraction").expect("none should parse");
        assert_eq!(parsed, None);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<Decision>("maybe", "decision").expect_err("should fail");
        assert!(err.to_string().contains("invalid decision 'maybe'"));
    }
}
