use std::path::Path;

use anyhow::Context;
use sift_config::SiftConfig;
use sift_db::service::ReviewService;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: ReviewService,
    pub config: SiftConfig,
}

impl AppContext {
    /// Open the review database named by `database_override` or the config.
    ///
    /// The parent directory of a file database is created on first use.
    pub async fn init(
        mut config: SiftConfig,
        database_override: Option<&str>,
    ) -> anyhow::Result<Self> {
        if let Some(path) = database_override {
            config.database.path = path.to_string();
            config.database.validate()?;
        }
        let db_path = config.database.path.clone();

        if !config.database.is_in_memory() {
            if let Some(parent) = Path::new(&db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create database directory {}", parent.display())
                    })?;
                }
            }
        }

        let service = ReviewService::new_local(&db_path)
            .await
            .with_context(|| format!("failed to open review database at {db_path}"))?;
        tracing::debug!(path = %db_path, "opened review database");

        Ok(Self { service, config })
    }

    /// Effective list limit: local arg, then global flag, then config default.
    #[must_use]
    pub fn limit(&self, local: Option<u32>, global: Option<u32>) -> u32 {
        local.or(global).unwrap_or(self.config.general.default_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn creates_database_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("sift.db");
        let ctx = AppContext::init(SiftConfig::default(), path.to_str())
            .await
            .unwrap();
        assert!(path.exists());
        assert_eq!(ctx.limit(None, None), 20);
        assert_eq!(ctx.limit(None, Some(7)), 7);
        assert_eq!(ctx.limit(Some(3), Some(7)), 3);
    }
}
