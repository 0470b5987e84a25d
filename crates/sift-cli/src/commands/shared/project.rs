use crate::cli::GlobalFlags;

/// Resolve the review project a project-scoped command works on.
pub fn require_project(flags: &GlobalFlags) -> anyhow::Result<&str> {
    flags
        .project
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!("No project selected. Pass --project <id> or set SIFT_PROJECT.")
        })
}

#[cfg(test)]
mod tests {
    use super::require_project;
    use crate::cli::{GlobalFlags, OutputFormat};

    fn flags(project: Option<&str>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit: None,
            quiet: false,
            verbose: false,
            project: project.map(String::from),
            database: None,
        }
    }

    #[test]
    fn returns_trimmed_project() {
        let flags = flags(Some(" prj-1 "));
        assert_eq!(require_project(&flags).unwrap(), "prj-1");
    }

    #[test]
    fn missing_or_blank_project_errors() {
        assert!(require_project(&flags(None)).is_err());
        assert!(require_project(&flags(Some("  "))).is_err());
    }
}
