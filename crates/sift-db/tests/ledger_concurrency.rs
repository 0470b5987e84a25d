//! Concurrent ledger updates on one service must not lose increments.

use futures::future::join_all;
use pretty_assertions::assert_eq;

use sift_core::entities::{ExternalPaper, PrismaDelta};
use sift_core::enums::Decision;
use sift_db::service::ReviewService;

#[tokio::test]
async fn concurrent_deltas_all_land() {
    let svc = ReviewService::new_local(":memory:").await.unwrap();
    let project = svc.create_project("Concurrency", None).await.unwrap();

    let delta = PrismaDelta {
        identified: 2,
        duplicates: 1,
        ..PrismaDelta::default()
    };
    let results = join_all((0..50).map(|_| svc.apply_delta(&project.id, &delta))).await;
    assert!(results.iter().all(Result::is_ok));

    let counters = svc.get_prisma_counters(&project.id).await.unwrap();
    assert_eq!(counters.identified, 100);
    assert_eq!(counters.duplicates, 50);
}

#[tokio::test]
async fn concurrent_ingest_and_confirm_stay_consistent() {
    let svc = ReviewService::new_local(":memory:").await.unwrap();
    let project = svc.create_project("Concurrency", None).await.unwrap();
    let pid = project.id.as_str();

    let papers: Vec<ExternalPaper> = (0..10)
        .map(|i| {
            serde_json::from_value(serde_json::json!({
                "id": format!("p{i}"),
                "source": "pubmed",
                "doi": format!("10.1/{i}"),
                "abstract": "x"
            }))
            .unwrap()
        })
        .collect();
    svc.ingest(pid, &papers).await.unwrap();

    let confirms = (0..10).map(|i| {
        let id = format!("p{i}");
        let svc = &svc;
        async move {
            let decision = if i % 2 == 0 {
                Decision::Include
            } else {
                Decision::Exclude
            };
            svc.confirm_decision(pid, &id, decision).await
        }
    });
    let extra = svc.ingest(pid, &papers);
    let (confirmed, reingest) = futures::join!(join_all(confirms), extra);
    assert!(confirmed.iter().all(Result::is_ok));
    assert_eq!(reingest.unwrap().duplicates, 10);

    let counters = svc.get_prisma_counters(pid).await.unwrap();
    assert_eq!(counters.identified, 20);
    assert_eq!(counters.duplicates, 10);
    assert_eq!(counters.screened, 10);
    assert_eq!(counters.included, 5);
    assert_eq!(svc.list_included_studies(pid, 100).await.unwrap().len(), 5);
}
