//! PRISMA counter ledger.
//!
//! One `prisma_stats` row per project, created lazily by the first non-zero
//! delta. The row is seeded with zeros, then an `UPDATE ... SET f = f + ?`
//! adds the delta in place, so concurrent callers never lose an increment.
//! Seeding with zeros keeps the `>= 0` CHECK constraints satisfied when a
//! negative delta arrives for a project whose row does not exist yet.

use chrono::{DateTime, Utc};

use sift_core::audit_detail::LedgerDetail;
use sift_core::entities::{PrismaCounters, PrismaDelta};
use sift_core::enums::{AuditAction, EntityType};
use sift_core::responses::PrismaReport;

use crate::error::DatabaseError;
use crate::helpers::{get_count, parse_optional_datetime};
use crate::repos::audit;
use crate::service::ReviewService;

const SELECT_COLS: &str = "identified, duplicates, without_abstract, screened, included, updated_at";

const SEED_SQL: &str = "INSERT INTO prisma_stats (project_id, updated_at) VALUES (?1, ?2)
     ON CONFLICT(project_id) DO NOTHING";

const ADD_SQL: &str = "UPDATE prisma_stats SET
         identified = identified + ?2,
         duplicates = duplicates + ?3,
         without_abstract = without_abstract + ?4,
         screened = screened + ?5,
         included = included + ?6,
         updated_at = ?7
     WHERE project_id = ?1";

fn row_to_counters(row: &libsql::Row) -> Result<PrismaCounters, DatabaseError> {
    let updated_at = row.get::<Option<String>>(5)?;
    Ok(PrismaCounters {
        identified: get_count(row, 0)?,
        duplicates: get_count(row, 1)?,
        without_abstract: get_count(row, 2)?,
        screened: get_count(row, 3)?,
        included: get_count(row, 4)?,
        updated_at: parse_optional_datetime(updated_at.as_deref())?,
    })
}

/// Read the counters through `conn`. A project without a row reads as zeros.
pub(crate) async fn fetch_counters(
    conn: &libsql::Connection,
    project_id: &str,
) -> Result<PrismaCounters, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM prisma_stats WHERE project_id = ?1"),
            [project_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => row_to_counters(&row),
        None => Ok(PrismaCounters::default()),
    }
}

/// Reject a delta that would drive any counter below zero.
fn check_non_negative(
    project_id: &str,
    current: &PrismaCounters,
    delta: &PrismaDelta,
) -> Result<(), DatabaseError> {
    let fields = [
        ("identified", current.identified, delta.identified),
        ("duplicates", current.duplicates, delta.duplicates),
        ("without_abstract", current.without_abstract, delta.without_abstract),
        ("screened", current.screened, delta.screened),
        ("included", current.included, delta.included),
    ];
    for (name, value, change) in fields {
        let value = i128::from(value);
        if value + i128::from(change) < 0 {
            return Err(DatabaseError::InvalidState(format!(
                "{name} counter of project {project_id} would drop below zero ({value} {change:+})"
            )));
        }
    }
    Ok(())
}

/// Add `delta` to the project's counters through `conn`.
///
/// Returns `false` without touching storage when the delta is all zeros.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` if a counter would go negative.
pub(crate) async fn apply_delta_on(
    conn: &libsql::Connection,
    project_id: &str,
    delta: &PrismaDelta,
    now: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    if delta.is_zero() {
        return Ok(false);
    }
    if delta_has_negative(delta) {
        let current = fetch_counters(conn, project_id).await?;
        check_non_negative(project_id, &current, delta)?;
    }

    let stamp = now.to_rfc3339();
    conn.execute(SEED_SQL, libsql::params![project_id, stamp.as_str()])
        .await?;
    conn.execute(
        ADD_SQL,
        libsql::params![
            project_id,
            delta.identified,
            delta.duplicates,
            delta.without_abstract,
            delta.screened,
            delta.included,
            stamp.as_str()
        ],
    )
    .await?;
    Ok(true)
}

const fn delta_has_negative(delta: &PrismaDelta) -> bool {
    delta.identified < 0
        || delta.duplicates < 0
        || delta.without_abstract < 0
        || delta.screened < 0
        || delta.included < 0
}

impl ReviewService {
    /// Atomically add a delta to a project's PRISMA counters.
    ///
    /// A zero delta is a no-op and does not create the counters row. Other
    /// deltas are audited against the stats record.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if a counter would go negative, or
    /// a libSQL error if the project does not exist.
    pub async fn apply_delta(
        &self,
        project_id: &str,
        delta: &PrismaDelta,
    ) -> Result<bool, DatabaseError> {
        if delta.is_zero() {
            return Ok(false);
        }
        let now = Utc::now();
        let (_gate, tx) = self.begin_write().await?;
        apply_delta_on(&tx, project_id, delta, now).await?;
        audit::record(
            &tx,
            Some(project_id),
            EntityType::PrismaStats,
            project_id,
            AuditAction::Updated,
            Some(&LedgerDetail { delta: *delta }),
            now,
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(project_id, ?delta, "applied PRISMA delta");
        Ok(true)
    }

    pub async fn get_prisma_counters(
        &self,
        project_id: &str,
    ) -> Result<PrismaCounters, DatabaseError> {
        fetch_counters(self.db().conn(), project_id).await
    }

    /// Counters plus the expected relations they currently violate.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` for an unknown project.
    pub async fn prisma_report(&self, project_id: &str) -> Result<PrismaReport, DatabaseError> {
        // Existence check: counters alone read as zeros for any id.
        self.get_project(project_id).await?;
        let counters = self.get_prisma_counters(project_id).await?;
        let report = PrismaReport::from_counters(project_id, counters);
        for anomaly in &report.anomalies {
            tracing::warn!(project_id, ?anomaly, "PRISMA counters out of expected relation");
        }
        Ok(report)
    }
}
