//! Named schema registry for Sift types.

use std::collections::HashMap;

use schemars::schema_for;

use crate::error::SchemaError;

/// Lookup table of JSON Schemas keyed by `snake_case` type name.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, serde_json::Value>,
}

macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, schema_for!($ty).to_value());
    };
}

impl SchemaRegistry {
    /// Build a registry holding every collaborator input, entity, response,
    /// and audit-detail schema.
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        // Collaborator inputs
        register!(schemas, "external_paper", sift_core::entities::ExternalPaper);
        register!(
            schemas,
            "automated_decision",
            sift_core::entities::AutomatedDecision
        );

        // Entities
        register!(schemas, "project", sift_core::entities::Project);
        register!(schemas, "candidate", sift_core::entities::Candidate);
        register!(schemas, "included_study", sift_core::entities::IncludedStudy);
        register!(schemas, "prisma_counters", sift_core::entities::PrismaCounters);
        register!(schemas, "prisma_delta", sift_core::entities::PrismaDelta);
        register!(schemas, "audit_entry", sift_core::entities::AuditEntry);

        // Responses
        register!(schemas, "ingest_report", sift_core::responses::IngestReport);
        register!(
            schemas,
            "confirm_response",
            sift_core::responses::ConfirmResponse
        );
        register!(
            schemas,
            "automated_batch_report",
            sift_core::responses::AutomatedBatchReport
        );
        register!(
            schemas,
            "screening_progress",
            sift_core::responses::ScreeningProgress
        );
        register!(schemas, "prisma_report", sift_core::responses::PrismaReport);
        register!(
            schemas,
            "reconcile_report",
            sift_core::responses::ReconcileReport
        );

        // Audit details
        register!(
            schemas,
            "decision_detail",
            sift_core::audit_detail::DecisionDetail
        );
        register!(schemas, "ingest_detail", sift_core::audit_detail::IngestDetail);
        register!(schemas, "ledger_detail", sift_core::audit_detail::LedgerDetail);
        register!(
            schemas,
            "reconcile_detail",
            sift_core::audit_detail::ReconcileDetail
        );

        Self { schemas }
    }

    /// Get a schema by name. Hyphenated names are accepted.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name.replace('-', "_").as_str())
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` listing every violation.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Compilation(e.to_string()))?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// Validate every element of a JSON array against a named schema.
    ///
    /// Error messages are prefixed with the offending element's index.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidationFailed` if `instance` is not an array
    /// or any element fails validation.
    pub fn validate_each(
        &self,
        name: &str,
        instance: &serde_json::Value,
    ) -> Result<(), SchemaError> {
        let Some(items) = instance.as_array() else {
            return Err(SchemaError::ValidationFailed {
                errors: vec![format!("expected a JSON array of {name}")],
            });
        };

        let mut errors = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            match self.validate(name, item) {
                Ok(()) => {}
                Err(SchemaError::ValidationFailed { errors: item_errors }) => {
                    errors.extend(item_errors.into_iter().map(|e| format!("[{idx}] {e}")));
                }
                Err(other) => return Err(other),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// List all registered schema names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
    }

    #[test]
    fn registry_has_expected_count() {
        // 2 inputs + 6 entities + 6 responses + 4 audit details
        assert_eq!(registry().schema_count(), 18);
    }

    #[test]
    fn list_is_sorted() {
        let names = registry().list();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn hyphenated_lookup() {
        let reg = registry();
        assert!(reg.get("external-paper").is_some());
        assert!(reg.get("external_paper").is_some());
        assert!(reg.get("nonexistent").is_none());
    }

    #[test]
    fn unknown_schema_is_not_found() {
        let err = registry().validate("nonexistent", &json!({})).unwrap_err();
        assert!(matches!(err, SchemaError::NotFound(_)));
    }

    #[test]
    fn sparse_paper_is_valid() {
        let reg = registry();
        reg.validate(
            "external_paper",
            &json!({"source": "pubmed", "doi": "10.1/a", "abstract": "x"}),
        )
        .unwrap();
    }

    #[test]
    fn paper_with_unknown_source_is_invalid() {
        let err = registry()
            .validate("external_paper", &json!({"source": "arxiv"}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::ValidationFailed { .. }));
    }

    #[test]
    fn validate_each_reports_indices() {
        let reg = registry();
        let batch = json!([
            {"source": "crossref", "abstract": "x"},
            {"source": "crossref", "year": "twenty"},
            {"source": "nowhere"}
        ]);
        let SchemaError::ValidationFailed { errors } =
            reg.validate_each("external_paper", &batch).unwrap_err()
        else {
            panic!("expected validation failure");
        };
        assert!(errors.iter().any(|e| e.starts_with("[1]")));
        assert!(errors.iter().any(|e| e.starts_with("[2]")));
        assert!(!errors.iter().any(|e| e.starts_with("[0]")));
    }

    #[test]
    fn validate_each_rejects_non_array() {
        let err = registry()
            .validate_each("external_paper", &json!({"source": "pubmed"}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::ValidationFailed { .. }));
    }

    #[test]
    fn classifier_verdict_with_id_alias_is_valid_after_parse() {
        let reg = registry();
        let verdict: sift_core::entities::AutomatedDecision =
            serde_json::from_value(json!({"id": "p1", "decision": "include"})).unwrap();
        reg.validate("automated_decision", &serde_json::to_value(verdict).unwrap())
            .unwrap();
    }
}
