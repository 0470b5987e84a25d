//! Audit trail repository.
//!
//! Append-only audit entries recording every mutation, written inside the
//! same transaction as the mutation they describe.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sift_core::entities::AuditEntry;
use sift_core::enums::{AuditAction, EntityType};
use sift_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::helpers::{generate_id, get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::ReviewService;

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub project_id: Option<String>,
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub limit: Option<u32>,
}

/// Build and insert an audit entry on `conn`.
///
/// # Errors
///
/// Returns `DatabaseError` if ID generation, detail serialization, or the INSERT fails.
pub(crate) async fn record(
    conn: &libsql::Connection,
    project_id: Option<&str>,
    entity_type: EntityType,
    entity_id: &str,
    action: AuditAction,
    detail: Option<&impl Serialize>,
    now: DateTime<Utc>,
) -> Result<AuditEntry, DatabaseError> {
    let detail = detail
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| DatabaseError::Other(e.into()))?;
    let entry = AuditEntry {
        id: generate_id(conn, PREFIX_AUDIT).await?,
        project_id: project_id.map(String::from),
        entity_type,
        entity_id: entity_id.to_string(),
        action,
        detail,
        created_at: now,
    };
    conn.execute(
        "INSERT INTO audit_trail (id, project_id, entity_type, entity_id, action, detail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        libsql::params![
            entry.id.as_str(),
            entry.project_id.as_deref(),
            entry.entity_type.as_str(),
            entry.entity_id.as_str(),
            entry.action.as_str(),
            entry.detail.as_ref().map(ToString::to_string),
            entry.created_at.to_rfc3339()
        ],
    )
    .await?;
    Ok(entry)
}

impl ReviewService {
    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref pid) = filter.project_id {
            params.push(libsql::Value::Text(pid.clone()));
            conditions.push(format!("project_id = ?{}", params.len()));
        }
        if let Some(ref et) = filter.entity_type {
            params.push(libsql::Value::Text(et.as_str().to_string()));
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref eid) = filter.entity_id {
            params.push(libsql::Value::Text(eid.clone()));
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(ref action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, project_id, entity_type, entity_id, action, detail, created_at
             FROM audit_trail {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next().await? {
            entries.push(AuditEntry {
                id: row.get::<String>(0)?,
                project_id: get_opt_string(&row, 1)?,
                entity_type: parse_enum(&row.get::<String>(2)?)?,
                entity_id: row.get::<String>(3)?,
                action: parse_enum(&row.get::<String>(4)?)?,
                detail: parse_optional_json(get_opt_string(&row, 5)?.as_deref())?,
                created_at: parse_datetime(&row.get::<String>(6)?)?,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{create_test_project, paper, test_service};
    use pretty_assertions::assert_eq;
    use sift_core::enums::Decision;

    #[tokio::test]
    async fn record_inside_transaction_is_queryable() {
        let svc = test_service().await;
        let project = create_test_project(&svc).await;
        let (_gate, tx) = svc.begin_write().await.unwrap();
        let entry = record(
            &tx,
            Some(&project.id),
            EntityType::Candidate,
            "c1",
            AuditAction::Updated,
            Some(&serde_json::json!({"n": 1})),
            Utc::now(),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let entries = svc
            .query_audit(&AuditFilter {
                entity_id: Some("c1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, entry.id);
        assert!(entry.id.starts_with("aud-"));
        assert_eq!(entries[0].detail, Some(serde_json::json!({"n": 1})));
    }

    #[tokio::test]
    async fn filters_by_action_and_entity_type() {
        let svc = test_service().await;
        let project = create_test_project(&svc).await;
        svc.ingest(
            &project.id,
            &[
                paper("p1", "Fluids in sepsis", Some("10.1/a")),
                paper("p2", "Vasopressors in sepsis", Some("10.1/b")),
            ],
        )
        .await
        .unwrap();
        svc.confirm_decision(&project.id, "p1", Decision::Include)
            .await
            .unwrap();

        let confirmed = svc
            .query_audit(&AuditFilter {
                project_id: Some(project.id.clone()),
                action: Some(AuditAction::Confirmed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].entity_id, "p1");

        let project_entries = svc
            .query_audit(&AuditFilter {
                project_id: Some(project.id.clone()),
                entity_type: Some(EntityType::Project),
                ..Default::default()
            })
            .await
            .unwrap();
        let actions: Vec<AuditAction> = project_entries.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![AuditAction::Ingested, AuditAction::Created]);
    }

    #[tokio::test]
    async fn limit_is_respected() {
        let svc = test_service().await;
        for i in 0..5 {
            svc.create_project(&format!("Review {i}"), None).await.unwrap();
        }

        let entries = svc
            .query_audit(&AuditFilter {
                entity_type: Some(EntityType::Project),
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
    }
}
