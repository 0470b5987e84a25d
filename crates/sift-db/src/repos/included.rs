//! Included-studies projection.
//!
//! One row per candidate whose confirmed decision is `include`, carrying a
//! snapshot of the candidate plus the status fields the appraisal and
//! extraction phases work through.

use chrono::{DateTime, Utc};

use sift_core::audit_detail::ReconcileDetail;
use sift_core::entities::{Candidate, IncludedStudy};
use sift_core::enums::{AuditAction, EntityType, QualityStatus};
use sift_core::responses::ReconcileReport;

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_enum, parse_json, to_json_text};
use crate::repos::audit;
use crate::repos::candidate::fetch_candidate;
use crate::service::ReviewService;
use crate::updates::included::IncludedStudyUpdate;

const SELECT_COLS: &str = "project_id, candidate_id, snapshot, confirmed_at, quality_status, \
     extraction_status, updated_at";

fn row_to_included(row: &libsql::Row) -> Result<IncludedStudy, DatabaseError> {
    Ok(IncludedStudy {
        project_id: row.get(0)?,
        candidate_id: row.get(1)?,
        candidate: parse_json(&row.get::<String>(2)?)?,
        confirmed_at: parse_datetime(&row.get::<String>(3)?)?,
        quality_status: parse_enum(&row.get::<String>(4)?)?,
        extraction_status: parse_enum(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

/// Create or refresh the projection row for a confirmed include.
///
/// A refresh resets `quality_status` to pending and keeps extraction progress.
pub(crate) async fn upsert_included(
    conn: &libsql::Connection,
    candidate: &Candidate,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO included_studies
             (project_id, candidate_id, snapshot, confirmed_at, quality_status, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?4)
         ON CONFLICT(project_id, candidate_id) DO UPDATE SET
             snapshot = excluded.snapshot,
             confirmed_at = excluded.confirmed_at,
             quality_status = excluded.quality_status,
             updated_at = excluded.updated_at",
        libsql::params![
            candidate.project_id.as_str(),
            candidate.id.as_str(),
            to_json_text(candidate)?,
            now.to_rfc3339(),
            QualityStatus::Pending.as_str()
        ],
    )
    .await?;
    Ok(())
}

/// Delete the projection row, if any. Returns whether a row was removed.
pub(crate) async fn remove_included(
    conn: &libsql::Connection,
    project_id: &str,
    candidate_id: &str,
) -> Result<bool, DatabaseError> {
    let removed = conn
        .execute(
            "DELETE FROM included_studies WHERE project_id = ?1 AND candidate_id = ?2",
            [project_id, candidate_id],
        )
        .await?;
    Ok(removed > 0)
}

async fn query_ids(
    conn: &libsql::Connection,
    sql: &str,
    project_id: &str,
) -> Result<Vec<String>, DatabaseError> {
    let mut rows = conn.query(sql, [project_id]).await?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next().await? {
        ids.push(row.get::<String>(0)?);
    }
    Ok(ids)
}

impl ReviewService {
    pub async fn get_included_study(
        &self,
        project_id: &str,
        candidate_id: &str,
    ) -> Result<IncludedStudy, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM included_studies
                     WHERE project_id = ?1 AND candidate_id = ?2"
                ),
                [project_id, candidate_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_included(&row)
    }

    pub async fn list_included_studies(
        &self,
        project_id: &str,
        limit: u32,
    ) -> Result<Vec<IncludedStudy>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM included_studies WHERE project_id = ?1
                     ORDER BY confirmed_at, candidate_id LIMIT {limit}"
                ),
                [project_id],
            )
            .await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(row_to_included(&row)?);
        }
        Ok(results)
    }

    /// Advance the appraisal or extraction status of an included study.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the study is not in the projection.
    pub async fn update_included_study(
        &self,
        project_id: &str,
        candidate_id: &str,
        update: IncludedStudyUpdate,
    ) -> Result<IncludedStudy, DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(status) = update.quality_status {
            sets.push(format!("quality_status = ?{idx}"));
            params.push(status.as_str().into());
            idx += 1;
        }
        if let Some(status) = update.extraction_status {
            sets.push(format!("extraction_status = ?{idx}"));
            params.push(status.as_str().into());
            idx += 1;
        }

        if sets.is_empty() {
            return self.get_included_study(project_id, candidate_id).await;
        }

        let now = Utc::now();
        sets.push(format!("updated_at = ?{idx}"));
        params.push(now.to_rfc3339().into());
        idx += 1;

        params.push(project_id.into());
        params.push(candidate_id.into());
        let sql = format!(
            "UPDATE included_studies SET {} WHERE project_id = ?{idx} AND candidate_id = ?{}",
            sets.join(", "),
            idx + 1
        );

        let (gate, tx) = self.begin_write().await?;
        let changed = tx.execute(&sql, libsql::params_from_iter(params)).await?;
        if changed == 0 {
            tx.rollback().await?;
            return Err(DatabaseError::NoResult);
        }

        audit::record(
            &tx,
            Some(project_id),
            EntityType::IncludedStudy,
            candidate_id,
            AuditAction::Updated,
            Some(&update),
            now,
        )
        .await?;
        tx.commit().await?;
        drop(gate);

        self.get_included_study(project_id, candidate_id).await
    }

    /// Rebuild the projection from the candidates' confirmed decisions.
    ///
    /// Creates rows missing for confirmed includes and removes rows whose
    /// candidate is no longer a confirmed include.
    pub async fn reconcile_included_studies(
        &self,
        project_id: &str,
    ) -> Result<ReconcileReport, DatabaseError> {
        let now = Utc::now();
        let (_gate, tx) = self.begin_write().await?;

        let missing = query_ids(
            &tx,
            "SELECT c.id FROM candidates c
             LEFT JOIN included_studies i
                 ON i.project_id = c.project_id AND i.candidate_id = c.id
             WHERE c.project_id = ?1 AND c.user_confirmed = 1 AND c.decision = 'include'
                 AND i.candidate_id IS NULL
             ORDER BY c.id",
            project_id,
        )
        .await?;
        let stale = query_ids(
            &tx,
            "SELECT i.candidate_id FROM included_studies i
             JOIN candidates c ON c.project_id = i.project_id AND c.id = i.candidate_id
             WHERE i.project_id = ?1
                 AND (c.user_confirmed = 0 OR c.decision IS NULL OR c.decision != 'include')
             ORDER BY i.candidate_id",
            project_id,
        )
        .await?;

        for id in &missing {
            let candidate = fetch_candidate(&tx, project_id, id).await?;
            upsert_included(&tx, &candidate, now).await?;
        }
        for id in &stale {
            remove_included(&tx, project_id, id).await?;
        }

        let report = ReconcileReport {
            created: missing,
            removed: stale,
        };
        if !report.is_clean() {
            audit::record(
                &tx,
                Some(project_id),
                EntityType::Project,
                project_id,
                AuditAction::Reconciled,
                Some(&ReconcileDetail {
                    created: report.created.clone(),
                    removed: report.removed.clone(),
                }),
                now,
            )
            .await?;
            tracing::warn!(
                project_id,
                created = report.created.len(),
                removed = report.removed.len(),
                "included studies diverged from confirmed decisions"
            );
        }
        tx.commit().await?;
        Ok(report)
    }
}
