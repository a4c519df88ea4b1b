mod common;

use common::{fixture_values, service};
use rating_service::adapters::persistence::LibsqlRatingRepo;
use rating_service::domain::{
    DomainError, Operation, RequestContext, classify, validate_rating,
};
use rating_service::ports::RatingRepoPort;
use std::sync::Arc;
use tempfile::TempDir;

async fn open() -> (TempDir, LibsqlRatingRepo) {
    let dir = TempDir::new().unwrap();
    let repo = LibsqlRatingRepo::connect(dir.path()).await.unwrap();
    (dir, repo)
}

#[tokio::test]
async fn creates_database_file_in_data_dir() {
    let (dir, repo) = open().await;
    assert_eq!(repo.db_path(), dir.path().join("ratings.db"));
    assert!(repo.db_path().exists());
}

#[tokio::test]
async fn fresh_item_summarizes_to_zero() {
    let (_dir, repo) = open().await;
    let summary = repo
        .summarize(&RequestContext::get_summary(1), 1)
        .await
        .unwrap();
    assert_eq!(summary.total(), 0);
    assert_eq!(summary.counts(), [0; 5]);
}

#[tokio::test]
async fn append_returns_increasing_ids_and_summary_counts_values() {
    let (_dir, repo) = open().await;

    let mut last_id = 0;
    for (author_id, value) in (1..).zip(fixture_values()) {
        let rating = validate_rating(3, author_id, value).unwrap();
        let id = repo
            .append_rating(&RequestContext::submit_rating(3, author_id, value), &rating)
            .await
            .unwrap();
        assert!(id > last_id);
        last_id = id;
    }
    let other = validate_rating(4, 1, 5).unwrap();
    repo.append_rating(&RequestContext::submit_rating(4, 1, 5), &other)
        .await
        .unwrap();

    let summary = repo
        .summarize(&RequestContext::get_summary(3), 3)
        .await
        .unwrap();
    assert_eq!(summary.total(), 15);
    assert_eq!(summary.counts(), [1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn duplicate_pair_raises_integrity_code_and_inserts_nothing() {
    let (_dir, repo) = open().await;
    let ctx = RequestContext::submit_rating(9, 9, 2);

    repo.append_rating(&ctx, &validate_rating(9, 9, 2).unwrap())
        .await
        .unwrap();
    let err = repo
        .append_rating(&ctx, &validate_rating(9, 9, 5).unwrap())
        .await
        .unwrap_err();

    let code = err.code().expect("constraint failure carries a code");
    assert!(code.starts_with("23"), "code {code}");
    assert!(matches!(
        classify(Operation::AppendRating, err),
        DomainError::Conflict { .. }
    ));

    let summary = repo
        .summarize(&RequestContext::get_summary(9), 9)
        .await
        .unwrap();
    assert_eq!(summary.total(), 1);
    assert_eq!(summary.count(2), 1);
    assert_eq!(summary.count(5), 0);
}

#[tokio::test]
async fn ratings_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let repo = LibsqlRatingRepo::connect(dir.path()).await.unwrap();
        repo.append_rating(
            &RequestContext::submit_rating(2, 3, 4),
            &validate_rating(2, 3, 4).unwrap(),
        )
        .await
        .unwrap();
    }
    let repo = LibsqlRatingRepo::connect(dir.path()).await.unwrap();
    let summary = repo
        .summarize(&RequestContext::get_summary(2), 2)
        .await
        .unwrap();
    assert_eq!(summary.count(4), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn service_over_libsql_end_to_end() {
    let (_dir, repo) = open().await;
    let svc = service(Arc::new(repo), 4);

    let handles: Vec<_> = (1..=10i64)
        .map(|author_id| {
            svc.submit_rating(77, author_id, (author_id % 5 + 1) as i32)
                .unwrap()
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap() > 0);
    }

    let err = svc.submit_rating(77, 1, 3).unwrap().await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }), "{err:?}");

    let summary = svc.get_summary(77).unwrap().await.unwrap();
    assert_eq!(summary.total(), 10);
    assert_eq!(summary.counts(), [2, 2, 2, 2, 2]);
}
