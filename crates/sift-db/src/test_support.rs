//! Shared test utilities for sift-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use sift_core::entities::{ExternalPaper, Project};
    use sift_core::enums::Source;

    use crate::SiftDb;
    use crate::service::ReviewService;

    /// Create an in-memory `ReviewService`.
    pub async fn test_service() -> ReviewService {
        let db = SiftDb::open_local(":memory:").await.unwrap();
        ReviewService::from_db(db)
    }

    /// Create a project and return it.
    pub async fn create_test_project(svc: &ReviewService) -> Project {
        svc.create_project("Sepsis review", Some("adults in septic shock"))
            .await
            .unwrap()
    }

    /// A paper with a usable abstract and the given DOI.
    pub fn paper(id: &str, title: &str, doi: Option<&str>) -> ExternalPaper {
        ExternalPaper {
            id: id.to_string(),
            source: Source::Pubmed,
            title: title.to_string(),
            authors: vec!["Smith J".to_string()],
            year: Some(2020),
            abstract_text: format!("Abstract of {title}"),
            doi: doi.map(String::from),
            url: None,
        }
    }
}
