//! Project repository: CRUD over review projects.

use chrono::{DateTime, Utc};

use sift_core::entities::Project;
use sift_core::enums::{AuditAction, EntityType};
use sift_core::errors::CoreError;
use sift_core::ids::PREFIX_PROJECT;

use crate::error::DatabaseError;
use crate::helpers::{generate_id, get_opt_string, parse_datetime, parse_json, to_json_text};
use crate::repos::audit;
use crate::service::ReviewService;
use crate::updates::project::ProjectUpdate;

const SELECT_COLS: &str =
    "id, name, description, phase_data, completed_tasks, total_tasks, created_at, updated_at";

fn row_to_project(row: &libsql::Row) -> Result<Project, DatabaseError> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        phase_data: parse_json(&row.get::<String>(3)?)?,
        completed_tasks: get_u32(row, 4)?,
        total_tasks: get_u32(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

fn get_u32(row: &libsql::Row, idx: i32) -> Result<u32, DatabaseError> {
    let raw = row.get::<i64>(idx)?;
    u32::try_from(raw)
        .map_err(|_| DatabaseError::InvalidState(format!("task count {raw} out of range")))
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("project name must not be empty".into()));
    }
    Ok(())
}

/// Load a project through `conn`, which may be an open transaction.
///
/// # Errors
///
/// Returns `DatabaseError::NoResult` if the project does not exist.
pub(crate) async fn fetch_project(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Project, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM projects WHERE id = ?1"), [id])
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    row_to_project(&row)
}

/// Bump a project's `updated_at`.
pub(crate) async fn touch_project(
    conn: &libsql::Connection,
    id: &str,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE projects SET updated_at = ?1 WHERE id = ?2",
        libsql::params![now.to_rfc3339(), id],
    )
    .await?;
    Ok(())
}

impl ReviewService {
    /// Create a review project.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Core` with a validation error for a blank name.
    pub async fn create_project(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, DatabaseError> {
        validate_name(name)?;
        let now = Utc::now();
        let (_gate, tx) = self.begin_write().await?;
        let id = generate_id(&tx, PREFIX_PROJECT).await?;

        tx.execute(
            &format!(
                "INSERT INTO projects ({SELECT_COLS})
                 VALUES (?1, ?2, ?3, '{{}}', 0, 0, ?4, ?5)"
            ),
            libsql::params![
                id.as_str(),
                name.trim(),
                description,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )
        .await?;

        audit::record(
            &tx,
            Some(&id),
            EntityType::Project,
            &id,
            AuditAction::Created,
            None::<&()>,
            now,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(project_id = %id, "created project");
        Ok(Project {
            id,
            name: name.trim().to_string(),
            description: description.map(String::from),
            phase_data: serde_json::Map::new(),
            completed_tasks: 0,
            total_tasks: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_project(&self, id: &str) -> Result<Project, DatabaseError> {
        fetch_project(self.db().conn(), id).await
    }

    pub async fn list_projects(&self, limit: u32) -> Result<Vec<Project>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM projects ORDER BY created_at DESC LIMIT {limit}"
                ),
                (),
            )
            .await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(row_to_project(&row)?);
        }
        Ok(results)
    }

    /// Apply a partial update to a project.
    ///
    /// `phase_data` updates replace a single phase entry and keep the others.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` for an unknown project and
    /// `DatabaseError::Core` for a blank name.
    pub async fn update_project(
        &self,
        project_id: &str,
        update: ProjectUpdate,
    ) -> Result<Project, DatabaseError> {
        if let Some(ref name) = update.name {
            validate_name(name)?;
        }

        let (_gate, tx) = self.begin_write().await?;
        let current = fetch_project(&tx, project_id).await?;

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(ref name) = update.name {
            sets.push(format!("name = ?{idx}"));
            params.push(name.trim().to_string().into());
            idx += 1;
        }
        if let Some(ref description) = update.description {
            sets.push(format!("description = ?{idx}"));
            params.push(description.clone().map_or(libsql::Value::Null, Into::into));
            idx += 1;
        }
        if let Some(completed) = update.completed_tasks {
            sets.push(format!("completed_tasks = ?{idx}"));
            params.push(libsql::Value::Integer(i64::from(completed)));
            idx += 1;
        }
        if let Some(total) = update.total_tasks {
            sets.push(format!("total_tasks = ?{idx}"));
            params.push(libsql::Value::Integer(i64::from(total)));
            idx += 1;
        }
        if let Some((ref phase, ref value)) = update.phase_data {
            let mut phase_data = current.phase_data;
            phase_data.insert(phase.clone(), value.clone());
            sets.push(format!("phase_data = ?{idx}"));
            params.push(to_json_text(&phase_data)?.into());
            idx += 1;
        }

        if sets.is_empty() {
            tx.rollback().await?;
            return fetch_project(self.db().conn(), project_id).await;
        }

        let now = Utc::now();
        sets.push(format!("updated_at = ?{idx}"));
        params.push(now.to_rfc3339().into());
        idx += 1;

        params.push(project_id.into());
        let sql = format!("UPDATE projects SET {} WHERE id = ?{idx}", sets.join(", "));
        tx.execute(&sql, libsql::params_from_iter(params)).await?;

        audit::record(
            &tx,
            Some(project_id),
            EntityType::Project,
            project_id,
            AuditAction::Updated,
            Some(&update),
            now,
        )
        .await?;

        let updated = fetch_project(&tx, project_id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a project with its candidates, included studies, counters, and
    /// project-scoped audit entries.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the project does not exist.
    pub async fn delete_project(&self, project_id: &str) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let (_gate, tx) = self.begin_write().await?;

        let deleted = tx
            .execute("DELETE FROM projects WHERE id = ?1", [project_id])
            .await?;
        if deleted == 0 {
            tx.rollback().await?;
            return Err(DatabaseError::NoResult);
        }

        // The project's own audit rows cascade away; this one outlives them.
        audit::record(
            &tx,
            None,
            EntityType::Project,
            project_id,
            AuditAction::Deleted,
            None::<&()>,
            now,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(project_id, "deleted project");
        Ok(())
    }
}
