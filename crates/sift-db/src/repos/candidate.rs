//! Candidate repository: reads, automated decisions, and user confirmation.

use chrono::{DateTime, Utc};

use sift_core::audit_detail::DecisionDetail;
use sift_core::dedup::derive_key;
use sift_core::entities::{AutomatedDecision, Candidate};
use sift_core::enums::{
    AuditAction, CandidateState, Decision, EntityType, ScreeningStatus,
};
use sift_core::lifecycle::{ProjectionChange, check_automated_decision, plan_confirmation};
use sift_core::responses::{
    AutomatedBatchReport, ConfirmResponse, ScreeningProgress, SkippedDecision,
};

use crate::error::DatabaseError;
use crate::helpers::{
    get_bool, get_opt_string, parse_datetime, parse_enum, parse_json, parse_optional_datetime,
    parse_optional_enum, to_json_text,
};
use crate::repos::ledger::apply_delta_on;
use crate::repos::{audit, included};
use crate::service::ReviewService;

pub(crate) const SELECT_COLS: &str = "project_id, id, dedup_key, source, title, authors, year, \
     abstract_text, doi, url, decision, user_confirmed, screening_status, reason, confidence, \
     subtopic, processed_at, created_at, updated_at";

/// Filter criteria for candidate listings.
#[derive(Debug, Default)]
pub struct CandidateFilter {
    pub decision: Option<Decision>,
    pub screening_status: Option<ScreeningStatus>,
    pub user_confirmed: Option<bool>,
    pub limit: Option<u32>,
}

/// Decode a candidate row. Rows stored before dedup keys were cached get
/// their key derived on read.
pub(crate) fn row_to_candidate(row: &libsql::Row) -> Result<Candidate, DatabaseError> {
    let year = row
        .get::<Option<i64>>(6)?
        .map(|y| {
            i32::try_from(y).map_err(|_| DatabaseError::InvalidState(format!("year {y} out of range")))
        })
        .transpose()?;
    let processed_at = row.get::<Option<String>>(16)?;

    let mut candidate = Candidate {
        project_id: row.get(0)?,
        id: row.get(1)?,
        dedup_key: get_opt_string(row, 2)?.unwrap_or_default(),
        source: parse_enum(&row.get::<String>(3)?)?,
        title: row.get(4)?,
        authors: parse_json(&row.get::<String>(5)?)?,
        year,
        abstract_text: row.get(7)?,
        doi: get_opt_string(row, 8)?,
        url: get_opt_string(row, 9)?,
        decision: parse_optional_enum(get_opt_string(row, 10)?.as_deref())?,
        user_confirmed: get_bool(row, 11)?,
        screening_status: parse_enum(&row.get::<String>(12)?)?,
        reason: get_opt_string(row, 13)?,
        confidence: parse_optional_enum(get_opt_string(row, 14)?.as_deref())?,
        subtopic: get_opt_string(row, 15)?,
        processed_at: parse_optional_datetime(processed_at.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(17)?)?,
        updated_at: parse_datetime(&row.get::<String>(18)?)?,
    };
    if candidate.dedup_key.is_empty() {
        candidate.dedup_key = derive_key(&candidate);
    }
    Ok(candidate)
}

/// Load one candidate through `conn`, which may be an open transaction.
///
/// # Errors
///
/// Returns `DatabaseError::NoResult` if the candidate does not exist.
pub(crate) async fn fetch_candidate(
    conn: &libsql::Connection,
    project_id: &str,
    candidate_id: &str,
) -> Result<Candidate, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM candidates WHERE project_id = ?1 AND id = ?2"),
            [project_id, candidate_id],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    row_to_candidate(&row)
}

/// Insert a new candidate row through `conn`.
pub(crate) async fn insert_candidate(
    conn: &libsql::Connection,
    candidate: &Candidate,
) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO candidates ({SELECT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
        ),
        libsql::params_from_iter(vec![
            libsql::Value::from(candidate.project_id.clone()),
            candidate.id.clone().into(),
            candidate.dedup_key.clone().into(),
            candidate.source.as_str().into(),
            candidate.title.clone().into(),
            to_json_text(&candidate.authors)?.into(),
            candidate
                .year
                .map_or(libsql::Value::Null, |y| libsql::Value::Integer(i64::from(y))),
            candidate.abstract_text.clone().into(),
            opt_text(candidate.doi.as_deref()),
            opt_text(candidate.url.as_deref()),
            opt_text(candidate.decision.map(Decision::as_str)),
            libsql::Value::Integer(i64::from(candidate.user_confirmed)),
            candidate.screening_status.as_str().into(),
            opt_text(candidate.reason.as_deref()),
            opt_text(candidate.confidence.map(|c| c.as_str())),
            opt_text(candidate.subtopic.as_deref()),
            opt_text(candidate.processed_at.map(|t| t.to_rfc3339()).as_deref()),
            candidate.created_at.to_rfc3339().into(),
            candidate.updated_at.to_rfc3339().into(),
        ]),
    )
    .await?;
    Ok(())
}

fn opt_text(value: Option<&str>) -> libsql::Value {
    value.map_or(libsql::Value::Null, |s| libsql::Value::Text(s.to_string()))
}

fn count_u32(raw: i64) -> Result<u32, DatabaseError> {
    u32::try_from(raw).map_err(|_| DatabaseError::InvalidState(format!("count {raw} out of range")))
}

/// Write one classifier verdict onto an unconfirmed candidate.
async fn apply_automated(
    conn: &libsql::Connection,
    mut candidate: Candidate,
    verdict: &AutomatedDecision,
    now: DateTime<Utc>,
) -> Result<Candidate, DatabaseError> {
    let from = check_automated_decision(&candidate)?;
    let previous_decision = candidate.decision;
    let reason = Some(verdict.justification.trim())
        .filter(|r| !r.is_empty())
        .map(String::from);

    conn.execute(
        "UPDATE candidates SET decision = ?1, reason = ?2, confidence = ?3, subtopic = ?4,
             screening_status = ?5, processed_at = ?6, updated_at = ?6
         WHERE project_id = ?7 AND id = ?8",
        libsql::params![
            verdict.decision.as_str(),
            reason.as_deref(),
            verdict.confidence.map(|c| c.as_str()),
            verdict.subtopic.as_deref(),
            ScreeningStatus::Screened.as_str(),
            now.to_rfc3339(),
            candidate.project_id.as_str(),
            candidate.id.as_str()
        ],
    )
    .await?;

    candidate.decision = Some(verdict.decision);
    candidate.reason = reason;
    candidate.confidence = verdict.confidence;
    candidate.subtopic.clone_from(&verdict.subtopic);
    candidate.screening_status = ScreeningStatus::Screened;
    candidate.processed_at = Some(now);
    candidate.updated_at = now;

    audit::record(
        conn,
        Some(&candidate.project_id),
        EntityType::Candidate,
        &candidate.id,
        AuditAction::AutoDecided,
        Some(&DecisionDetail {
            from,
            to: CandidateState::ScreenedUnconfirmed,
            previous_decision,
            decision: verdict.decision,
            confidence: verdict.confidence,
            reason: candidate.reason.clone(),
        }),
        now,
    )
    .await?;

    Ok(candidate)
}

impl ReviewService {
    pub async fn get_candidate(
        &self,
        project_id: &str,
        candidate_id: &str,
    ) -> Result<Candidate, DatabaseError> {
        fetch_candidate(self.db().conn(), project_id, candidate_id).await
    }

    /// List a project's candidates in ingestion order.
    pub async fn list_candidates(
        &self,
        project_id: &str,
        filter: &CandidateFilter,
    ) -> Result<Vec<Candidate>, DatabaseError> {
        let mut conditions = vec!["project_id = ?1".to_string()];
        let mut params: Vec<libsql::Value> = vec![project_id.into()];

        if let Some(decision) = filter.decision {
            params.push(decision.as_str().into());
            conditions.push(format!("decision = ?{}", params.len()));
        }
        if let Some(status) = filter.screening_status {
            params.push(status.as_str().into());
            conditions.push(format!("screening_status = ?{}", params.len()));
        }
        if let Some(confirmed) = filter.user_confirmed {
            params.push(libsql::Value::Integer(i64::from(confirmed)));
            conditions.push(format!("user_confirmed = ?{}", params.len()));
        }

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM candidates WHERE {}
             ORDER BY created_at, rowid LIMIT {limit}",
            conditions.join(" AND ")
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(row_to_candidate(&row)?);
        }
        Ok(results)
    }

    /// Count a project's candidates per lifecycle state and decision.
    pub async fn screening_progress(
        &self,
        project_id: &str,
    ) -> Result<ScreeningProgress, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT user_confirmed, decision, screening_status, COUNT(*)
                 FROM candidates WHERE project_id = ?1
                 GROUP BY user_confirmed, decision, screening_status",
                [project_id],
            )
            .await?;

        let mut progress = ScreeningProgress::default();
        while let Some(row) = rows.next().await? {
            let confirmed = get_bool(&row, 0)?;
            let decision: Option<Decision> =
                parse_optional_enum(get_opt_string(&row, 1)?.as_deref())?;
            let status: ScreeningStatus = parse_enum(&row.get::<String>(2)?)?;
            let n = count_u32(row.get::<i64>(3)?)?;

            progress.total += n;
            match CandidateState::from_fields(confirmed, decision, status) {
                CandidateState::Pending => progress.pending += n,
                CandidateState::ScreenedUnconfirmed => progress.screened_unconfirmed += n,
                CandidateState::Confirmed => progress.confirmed += n,
            }
            match decision {
                Some(Decision::Include) => progress.include += n,
                Some(Decision::Exclude) => progress.exclude += n,
                Some(Decision::Uncertain) => progress.uncertain += n,
                None => {}
            }
        }
        Ok(progress)
    }

    /// Record an automated (classifier) decision without confirming it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` for an unknown candidate and
    /// `DatabaseError::Core` with an invalid transition once the candidate
    /// is confirmed.
    pub async fn record_automated_decision(
        &self,
        project_id: &str,
        verdict: &AutomatedDecision,
    ) -> Result<Candidate, DatabaseError> {
        let now = Utc::now();
        let (_gate, tx) = self.begin_write().await?;
        let candidate = fetch_candidate(&tx, project_id, &verdict.candidate_id).await?;
        let updated = apply_automated(&tx, candidate, verdict, now).await?;
        tx.commit().await?;

        tracing::debug!(
            project_id,
            candidate_id = %updated.id,
            decision = %verdict.decision,
            "recorded automated decision"
        );
        Ok(updated)
    }

    /// Apply a whole classifier response in one transaction.
    ///
    /// Unknown ids and confirmed candidates are reported as skipped; storage
    /// failures abort the whole batch.
    pub async fn record_automated_decisions(
        &self,
        project_id: &str,
        verdicts: &[AutomatedDecision],
    ) -> Result<AutomatedBatchReport, DatabaseError> {
        let now = Utc::now();
        let (_gate, tx) = self.begin_write().await?;
        let mut report = AutomatedBatchReport::default();

        for verdict in verdicts {
            let candidate = match fetch_candidate(&tx, project_id, &verdict.candidate_id).await {
                Ok(c) => c,
                Err(DatabaseError::NoResult) => {
                    report.skipped.push(SkippedDecision {
                        candidate_id: verdict.candidate_id.clone(),
                        reason: "candidate not found".to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };
            match apply_automated(&tx, candidate, verdict, now).await {
                Ok(updated) => report.applied.push(updated.id),
                Err(DatabaseError::Core(e)) => report.skipped.push(SkippedDecision {
                    candidate_id: verdict.candidate_id.clone(),
                    reason: e.to_string(),
                }),
                Err(e) => return Err(e),
            }
        }

        tx.commit().await?;
        tracing::info!(
            project_id,
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "recorded automated decisions"
        );
        Ok(report)
    }

    /// Confirm a decision on behalf of the user.
    ///
    /// The candidate update, PRISMA delta, included-studies projection, and
    /// audit entry commit together or not at all.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` for an unknown candidate.
    pub async fn confirm_decision(
        &self,
        project_id: &str,
        candidate_id: &str,
        decision: Decision,
    ) -> Result<ConfirmResponse, DatabaseError> {
        let now = Utc::now();
        let (_gate, tx) = self.begin_write().await?;
        let mut candidate = fetch_candidate(&tx, project_id, candidate_id).await?;
        let plan = plan_confirmation(&candidate, decision);

        tx.execute(
            "UPDATE candidates SET decision = ?1, user_confirmed = 1, screening_status = ?2,
                 updated_at = ?3
             WHERE project_id = ?4 AND id = ?5",
            libsql::params![
                decision.as_str(),
                ScreeningStatus::Screened.as_str(),
                now.to_rfc3339(),
                project_id,
                candidate_id
            ],
        )
        .await?;
        candidate.decision = Some(decision);
        candidate.user_confirmed = true;
        candidate.screening_status = ScreeningStatus::Screened;
        candidate.updated_at = now;

        apply_delta_on(&tx, project_id, &plan.delta, now).await?;

        match plan.projection {
            ProjectionChange::Upsert => included::upsert_included(&tx, &candidate, now).await?,
            ProjectionChange::Remove => {
                included::remove_included(&tx, project_id, candidate_id).await?;
            }
            ProjectionChange::Unchanged => {}
        }

        audit::record(
            &tx,
            Some(project_id),
            EntityType::Candidate,
            candidate_id,
            AuditAction::Confirmed,
            Some(&DecisionDetail {
                from: plan.from,
                to: CandidateState::Confirmed,
                previous_decision: plan.previous_decision,
                decision,
                confidence: candidate.confidence,
                reason: candidate.reason.clone(),
            }),
            now,
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(
            project_id,
            candidate_id,
            %decision,
            first = plan.first_confirmation,
            projection = ?plan.projection,
            "confirmed decision"
        );
        Ok(ConfirmResponse {
            candidate,
            first_confirmation: plan.first_confirmation,
            delta: plan.delta,
            projection: plan.projection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{create_test_project, paper, test_service};
    use pretty_assertions::assert_eq;
    use sift_core::enums::Confidence;
    use sift_core::errors::CoreError;

    async fn seeded() -> (ReviewService, String) {
        let svc = test_service().await;
        let project = create_test_project(&svc).await;
        svc.ingest(
            &project.id,
            &[
                paper("p1", "Fluids in sepsis", Some("10.1/a")),
                paper("p2", "Vasopressors in sepsis", Some("10.1/b")),
                paper("p3", "Steroids in sepsis", Some("10.1/c")),
            ],
        )
        .await
        .unwrap();
        (svc, project.id)
    }

    fn verdict(id: &str, decision: Decision) -> AutomatedDecision {
        AutomatedDecision {
            candidate_id: id.to_string(),
            decision,
            justification: "matches PICO".to_string(),
            confidence: Some(Confidence::Medium),
            subtopic: Some("fluids".to_string()),
        }
    }

    #[tokio::test]
    async fn ingested_candidate_is_pending() {
        let (svc, pid) = seeded().await;
        let c = svc.get_candidate(&pid, "p1").await.unwrap();
        assert_eq!(c.state(), CandidateState::Pending);
        assert_eq!(c.dedup_key, "doi:10.1/a");
        assert_eq!(c.authors, vec!["Smith J".to_string()]);
        assert_eq!(c.year, Some(2020));
    }

    #[tokio::test]
    async fn automated_decision_leaves_unconfirmed() {
        let (svc, pid) = seeded().await;
        let c = svc
            .record_automated_decision(&pid, &verdict("p1", Decision::Include))
            .await
            .unwrap();
        assert_eq!(c.state(), CandidateState::ScreenedUnconfirmed);
        assert!(!c.user_confirmed);
        assert!(c.processed_at.is_some());

        let stored = svc.get_candidate(&pid, "p1").await.unwrap();
        assert_eq!(stored.decision, Some(Decision::Include));
        assert_eq!(stored.reason.as_deref(), Some("matches PICO"));
        assert_eq!(stored.confidence, Some(Confidence::Medium));
        assert_eq!(stored.subtopic.as_deref(), Some("fluids"));
        assert_eq!(stored.screening_status, ScreeningStatus::Screened);

        let counters = svc.get_prisma_counters(&pid).await.unwrap();
        assert_eq!(counters.screened, 0);
    }

    #[tokio::test]
    async fn automated_decision_rejected_after_confirmation() {
        let (svc, pid) = seeded().await;
        svc.confirm_decision(&pid, "p1", Decision::Exclude).await.unwrap();
        let err = svc
            .record_automated_decision(&pid, &verdict("p1", Decision::Include))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::Core(CoreError::InvalidTransition { .. })
        ));
        let stored = svc.get_candidate(&pid, "p1").await.unwrap();
        assert_eq!(stored.decision, Some(Decision::Exclude));
    }

    #[tokio::test]
    async fn batch_reports_skipped_verdicts() {
        let (svc, pid) = seeded().await;
        svc.confirm_decision(&pid, "p3", Decision::Include).await.unwrap();

        let report = svc
            .record_automated_decisions(
                &pid,
                &[
                    verdict("p1", Decision::Include),
                    verdict("ghost", Decision::Exclude),
                    verdict("p3", Decision::Exclude),
                    verdict("p2", Decision::Uncertain),
                ],
            )
            .await
            .unwrap();

        assert_eq!(report.applied, vec!["p1".to_string(), "p2".to_string()]);
        let skipped: Vec<&str> = report
            .skipped
            .iter()
            .map(|s| s.candidate_id.as_str())
            .collect();
        assert_eq!(skipped, vec!["ghost", "p3"]);
    }

    #[tokio::test]
    async fn first_confirmation_include_moves_counters_and_projects() {
        let (svc, pid) = seeded().await;
        let resp = svc.confirm_decision(&pid, "p1", Decision::Include).await.unwrap();

        assert!(resp.first_confirmation);
        assert_eq!(resp.projection, ProjectionChange::Upsert);
        assert_eq!(resp.delta.screened, 1);
        assert_eq!(resp.delta.included, 1);
        assert_eq!(resp.candidate.state(), CandidateState::Confirmed);

        let counters = svc.get_prisma_counters(&pid).await.unwrap();
        assert_eq!(counters.screened, 1);
        assert_eq!(counters.included, 1);
        let study = svc.get_included_study(&pid, "p1").await.unwrap();
        assert_eq!(study.candidate.decision, Some(Decision::Include));
    }

    #[tokio::test]
    async fn reconfirm_include_to_exclude_removes_projection() {
        let (svc, pid) = seeded().await;
        svc.confirm_decision(&pid, "p1", Decision::Include).await.unwrap();
        let resp = svc.confirm_decision(&pid, "p1", Decision::Exclude).await.unwrap();

        assert!(!resp.first_confirmation);
        assert_eq!(resp.projection, ProjectionChange::Remove);
        let counters = svc.get_prisma_counters(&pid).await.unwrap();
        assert_eq!(counters.screened, 1);
        assert_eq!(counters.included, 0);
        assert!(matches!(
            svc.get_included_study(&pid, "p1").await,
            Err(DatabaseError::NoResult)
        ));
    }

    #[tokio::test]
    async fn reconfirm_same_decision_changes_no_counters() {
        let (svc, pid) = seeded().await;
        svc.confirm_decision(&pid, "p2", Decision::Exclude).await.unwrap();
        let resp = svc.confirm_decision(&pid, "p2", Decision::Exclude).await.unwrap();
        assert!(resp.delta.is_zero());
        assert_eq!(resp.projection, ProjectionChange::Unchanged);
        assert_eq!(svc.get_prisma_counters(&pid).await.unwrap().screened, 1);
    }

    #[tokio::test]
    async fn confirm_unknown_candidate() {
        let (svc, pid) = seeded().await;
        assert!(matches!(
            svc.confirm_decision(&pid, "ghost", Decision::Include).await,
            Err(DatabaseError::NoResult)
        ));
        assert_eq!(svc.get_prisma_counters(&pid).await.unwrap().screened, 0);
    }

    #[tokio::test]
    async fn confirmation_is_audited() {
        let (svc, pid) = seeded().await;
        svc.confirm_decision(&pid, "p1", Decision::Include).await.unwrap();
        let entries = svc
            .query_audit(&AuditFilter {
                entity_id: Some("p1".into()),
                action: Some(AuditAction::Confirmed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        let detail: DecisionDetail =
            serde_json::from_value(entries[0].detail.clone().unwrap()).unwrap();
        assert_eq!(detail.from, CandidateState::Pending);
        assert_eq!(detail.decision, Decision::Include);
    }

    #[tokio::test]
    async fn progress_and_filters() {
        let (svc, pid) = seeded().await;
        svc.record_automated_decision(&pid, &verdict("p1", Decision::Include))
            .await
            .unwrap();
        svc.confirm_decision(&pid, "p2", Decision::Exclude).await.unwrap();

        let progress = svc.screening_progress(&pid).await.unwrap();
        assert_eq!(
            progress,
            ScreeningProgress {
                total: 3,
                pending: 1,
                screened_unconfirmed: 1,
                confirmed: 1,
                include: 1,
                exclude: 1,
                uncertain: 0,
            }
        );

        let confirmed = svc
            .list_candidates(
                &pid,
                &CandidateFilter {
                    user_confirmed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, "p2");

        let unscreened = svc
            .list_candidates(
                &pid,
                &CandidateFilter {
                    screening_status: Some(ScreeningStatus::Unscreened),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unscreened.len(), 1);
        assert_eq!(unscreened[0].id, "p3");

        let all = svc
            .list_candidates(&pid, &CandidateFilter::default())
            .await
            .unwrap();
        let ids: Vec<&str> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
    }
}
