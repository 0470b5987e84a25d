//! Batch ingestion of external search results into a project's screening set.

use std::collections::HashSet;

use chrono::Utc;

use sift_core::audit_detail::IngestDetail;
use sift_core::dedup::{derive_key, is_missing_abstract};
use sift_core::entities::{Candidate, ExternalPaper, PrismaDelta};
use sift_core::enums::{AuditAction, EntityType};
use sift_core::ids::PREFIX_CANDIDATE;
use sift_core::responses::IngestReport;

use crate::error::DatabaseError;
use crate::helpers::{generate_id, get_opt_string};
use crate::repos::audit;
use crate::repos::candidate::{SELECT_COLS, insert_candidate, row_to_candidate};
use crate::repos::ledger::apply_delta_on;
use crate::repos::project::{fetch_project, touch_project};
use crate::service::ReviewService;

/// How one offered paper was counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Saved,
    Duplicate,
    WithoutAbstract,
}

impl Outcome {
    /// Ledger contribution of one paper: every paper is identified once.
    const fn delta(self) -> PrismaDelta {
        let mut delta = PrismaDelta {
            identified: 1,
            duplicates: 0,
            without_abstract: 0,
            screened: 0,
            included: 0,
        };
        match self {
            Self::Saved => {}
            Self::Duplicate => delta.duplicates = 1,
            Self::WithoutAbstract => delta.without_abstract = 1,
        }
        delta
    }

    fn tally(self, report: &mut IngestReport) {
        match self {
            Self::Saved => report.saved += 1,
            Self::Duplicate => report.duplicates += 1,
            Self::WithoutAbstract => report.without_abstract += 1,
        }
    }
}

/// Dedup keys and ids already claimed in a project.
struct Claimed {
    keys: HashSet<String>,
    ids: HashSet<String>,
    backfilled: u32,
}

/// Load the project's claimed keys and ids, caching keys on rows that lack one.
async fn load_claimed(
    conn: &libsql::Connection,
    project_id: &str,
) -> Result<Claimed, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM candidates WHERE project_id = ?1"),
            [project_id],
        )
        .await?;

    let mut claimed = Claimed {
        keys: HashSet::new(),
        ids: HashSet::new(),
        backfilled: 0,
    };
    let mut missing_keys: Vec<Candidate> = Vec::new();

    while let Some(row) = rows.next().await? {
        let cached = get_opt_string(&row, 2)?.is_some();
        let candidate = row_to_candidate(&row)?;
        claimed.keys.insert(candidate.dedup_key.clone());
        claimed.ids.insert(candidate.id.clone());
        if !cached {
            missing_keys.push(candidate);
        }
    }
    drop(rows);

    for candidate in &missing_keys {
        conn.execute(
            "UPDATE candidates SET dedup_key = ?1 WHERE project_id = ?2 AND id = ?3",
            [
                candidate.dedup_key.as_str(),
                project_id,
                candidate.id.as_str(),
            ],
        )
        .await?;
        claimed.backfilled += 1;
    }
    if claimed.backfilled > 0 {
        tracing::warn!(
            project_id,
            backfilled = claimed.backfilled,
            "cached dedup keys on candidates stored without one"
        );
    }

    Ok(claimed)
}

impl ReviewService {
    /// Ingest a batch of external papers.
    ///
    /// Each paper, in order, is counted as exactly one of: without abstract
    /// (empty or placeholder text, never stored), duplicate (dedup key or
    /// candidate id already present in the project or earlier in the batch),
    /// or saved as a new pending candidate. The ledger is credited with
    /// `identified = papers.len()` plus the duplicate and missing-abstract
    /// counts.
    ///
    /// The whole batch commits in one transaction: a failed write leaves no
    /// candidates and no counter change behind. An empty batch only bumps the
    /// project's `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` for an unknown project.
    pub async fn ingest(
        &self,
        project_id: &str,
        papers: &[ExternalPaper],
    ) -> Result<IngestReport, DatabaseError> {
        let offered = u32::try_from(papers.len()).map_err(|_| {
            DatabaseError::InvalidState(format!("batch of {} papers is too large", papers.len()))
        })?;
        let now = Utc::now();
        let (_gate, tx) = self.begin_write().await?;
        fetch_project(&tx, project_id).await?;

        if papers.is_empty() {
            touch_project(&tx, project_id, now).await?;
            tx.commit().await?;
            return Ok(IngestReport::default());
        }

        let mut claimed = load_claimed(&tx, project_id).await?;
        let mut outcomes = Vec::with_capacity(papers.len());
        let mut queued = Vec::new();

        for paper in papers {
            if is_missing_abstract(&paper.abstract_text) {
                outcomes.push(Outcome::WithoutAbstract);
                continue;
            }

            let key = derive_key(paper);
            if claimed.keys.contains(&key) {
                outcomes.push(Outcome::Duplicate);
                continue;
            }

            let id = match paper.id.trim() {
                "" => generate_id(&tx, PREFIX_CANDIDATE).await?,
                id => id.to_string(),
            };
            if !claimed.ids.insert(id.clone()) {
                outcomes.push(Outcome::Duplicate);
                continue;
            }

            claimed.keys.insert(key.clone());
            queued.push(Candidate::from_paper(id, project_id, key, paper, now));
            outcomes.push(Outcome::Saved);
        }

        for candidate in &queued {
            insert_candidate(&tx, candidate).await?;
        }
        touch_project(&tx, project_id, now).await?;

        let mut report = IngestReport::default();
        let mut delta = PrismaDelta::default();
        for outcome in &outcomes {
            outcome.tally(&mut report);
            delta = delta.combine(outcome.delta());
        }
        debug_assert_eq!(delta.identified, i64::from(offered));
        apply_delta_on(&tx, project_id, &delta, now).await?;

        audit::record(
            &tx,
            Some(project_id),
            EntityType::Project,
            project_id,
            AuditAction::Ingested,
            Some(&IngestDetail {
                offered,
                saved: report.saved,
                duplicates: report.duplicates,
                without_abstract: report.without_abstract,
                backfilled_keys: claimed.backfilled,
            }),
            now,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            project_id,
            offered,
            saved = report.saved,
            duplicates = report.duplicates,
            without_abstract = report.without_abstract,
            "ingested papers"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{create_test_project, paper, test_service};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use sift_core::enums::Source;

    #[rstest]
    #[case(Outcome::Saved, 0, 0)]
    #[case(Outcome::Duplicate, 1, 0)]
    #[case(Outcome::WithoutAbstract, 0, 1)]
    fn every_outcome_is_identified_once(
        #[case] outcome: Outcome,
        #[case] duplicates: i64,
        #[case] without_abstract: i64,
    ) {
        let delta = outcome.delta();
        assert_eq!(delta.identified, 1);
        assert_eq!(delta.duplicates, duplicates);
        assert_eq!(delta.without_abstract, without_abstract);
        assert_eq!(delta.screened + delta.included, 0);
    }

    #[rstest]
    #[case::with_abstract("Background: sepsis.", 1, 0, 0)]
    #[case::empty_abstract("", 0, 0, 1)]
    #[case::placeholder_abstract("No abstract available", 0, 0, 1)]
    #[tokio::test]
    async fn single_paper_classification(
        #[case] abstract_text: &str,
        #[case] saved: u32,
        #[case] duplicates: u32,
        #[case] without_abstract: u32,
    ) {
        let svc = test_service().await;
        let project = create_test_project(&svc).await;
        let mut p = paper("p1", "Fluids in sepsis", Some("10.1/a"));
        p.abstract_text = abstract_text.to_string();

        let report = svc.ingest(&project.id, &[p]).await.unwrap();
        assert_eq!(
            report,
            IngestReport {
                saved,
                duplicates,
                without_abstract,
            }
        );
        let counters = svc.get_prisma_counters(&project.id).await.unwrap();
        assert_eq!(counters.identified, 1);
        assert_eq!(counters.without_abstract, u64::from(without_abstract));
    }

    #[tokio::test]
    async fn empty_batch_only_touches_project() {
        let svc = test_service().await;
        let project = create_test_project(&svc).await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let report = svc.ingest(&project.id, &[]).await.unwrap();
        assert_eq!(report, IngestReport::default());
        assert_eq!(
            svc.get_prisma_counters(&project.id).await.unwrap().identified,
            0
        );
        let touched = svc.get_project(&project.id).await.unwrap();
        assert!(touched.updated_at > project.updated_at);
    }

    #[tokio::test]
    async fn unknown_project_rejected() {
        let svc = test_service().await;
        let result = svc.ingest("prj-missing", &[paper("p1", "A", None)]).await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn colliding_id_counts_as_duplicate() {
        let svc = test_service().await;
        let project = create_test_project(&svc).await;
        let report = svc
            .ingest(
                &project.id,
                &[
                    paper("p1", "First work", Some("10.1/a")),
                    paper("p1", "Second work", Some("10.1/b")),
                ],
            )
            .await
            .unwrap();
        assert_eq!(report.saved, 1);
        assert_eq!(report.duplicates, 1);
        let stored = svc.get_candidate(&project.id, "p1").await.unwrap();
        assert_eq!(stored.title, "First work");
    }

    #[tokio::test]
    async fn blank_ids_are_generated() {
        let svc = test_service().await;
        let project = create_test_project(&svc).await;
        let mut p = paper("", "No id", None);
        p.source = Source::Crossref;
        svc.ingest(&project.id, &[p]).await.unwrap();

        let all = svc
            .list_candidates(&project.id, &Default::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].id.starts_with("cnd-"));
    }

    #[tokio::test]
    async fn missing_keys_are_backfilled() {
        let svc = test_service().await;
        let project = create_test_project(&svc).await;
        svc.db()
            .conn()
            .execute(
                "INSERT INTO candidates (project_id, id, source, title, authors, year, abstract_text)
                 VALUES (?1, 'legacy', 'pubmed', 'Old Title', '[\"Smith\"]', 2019, 'x')",
                [project.id.as_str()],
            )
            .await
            .unwrap();

        let mut dup = paper("new", "old title", None);
        dup.authors = vec!["SMITH".into()];
        dup.year = Some(2019);
        let report = svc.ingest(&project.id, &[dup]).await.unwrap();
        assert_eq!(report.duplicates, 1);

        let mut rows = svc
            .db()
            .conn()
            .query("SELECT dedup_key FROM candidates WHERE id = 'legacy'", ())
            .await
            .unwrap();
        let key: String = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_eq!(key, "title:oldtitle|author:smith|year:2019");
    }
}
