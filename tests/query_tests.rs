/// Query and disconnect-tracking tests
///
/// Run with: cargo test --test query_tests

use collection_state::prelude::*;
use collection_state::StateField;
use std::sync::Arc;

fn context(job: &str) -> CollectionContext {
    CollectionContext::new()
        .collector_id("col1")
        .job_task_id(job)
        .secret_id("sec1")
}

#[tokio::test]
async fn test_filter_is_exact_match() -> anyhow::Result<()> {
    let store = CollectionStateStore::new(Arc::new(InMemoryStateBackend::new()), context("job1"));
    store.create("i-1", "dom1", None).await?;
    store.create("i-10", "dom1", None).await?;
    store.create("i-1", "dom2", None).await?;

    let found = store
        .filter(&StateFilter::new().asset_id("i-1").collector_id("col1"))
        .await?;
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|s| s.asset_id == "i-1"));
    Ok(())
}

#[tokio::test]
async fn test_list_returns_page_and_total() -> anyhow::Result<()> {
    let store = CollectionStateStore::new(Arc::new(InMemoryStateBackend::new()), context("job1"));
    for n in 1..=6 {
        store.create(&format!("i-{}", n), "dom1", None).await?;
    }

    let query = StateQuery::new()
        .filter(Condition::equals(StateField::DomainId, "dom1"))
        .sort(SortKey::desc(StateField::AssetId))
        .page(1, 3);
    let (page, total) = store.list(&query).await?;

    assert_eq!(total, 6);
    let ids: Vec<_> = page.iter().map(|s| s.asset_id.as_str()).collect();
    assert_eq!(ids, vec!["i-6", "i-5", "i-4"]);
    Ok(())
}

#[tokio::test]
async fn test_list_from_json_query() -> anyhow::Result<()> {
    let store = CollectionStateStore::new(Arc::new(InMemoryStateBackend::new()), context("job1"));
    store.create("i-1", "dom1", None).await?;
    store.create("i-2", "dom1", None).await?;
    store.create("i-3", "dom1", None).await?;

    let query = StateQuery::from_json(
        r#"{"filter": [{"k": "asset_id", "v": ["i-1", "i-3"], "o": "in"}], "count_only": true}"#,
    )?;
    let (items, total) = store.list(&query).await?;
    assert!(items.is_empty());
    assert_eq!(total, 2);
    Ok(())
}

#[tokio::test]
async fn test_list_propagates_query_errors() {
    let store = CollectionStateStore::new(Arc::new(InMemoryStateBackend::new()), context("job1"));
    store.create("i-1", "dom1", None).await.unwrap();

    let query = StateQuery::new().filter(Condition::equals(StateField::DisconnectedCount, "zero"));
    let result = store.list(&query).await;
    assert!(matches!(result, Err(StateError::TypeMismatch(_))));
}

#[tokio::test]
async fn test_mark_missed_counts_only_unseen_assets() -> anyhow::Result<()> {
    let backend = Arc::new(InMemoryStateBackend::new());
    let run1 = CollectionStateStore::new(backend.clone(), context("job1"));
    run1.create("i-1", "dom1", None).await?;
    run1.create("i-2", "dom1", None).await?;
    run1.create("i-3", "dom2", None).await?;

    // Second run only sees i-1.
    let run2 = CollectionStateStore::new(backend.clone(), context("job2"));
    let mut seen = run2.find("i-1", "dom1").await?.expect("created");
    run2.reset_miss_counter(&mut seen, None).await?;

    let MarkMissedOutcome::Marked(missed) = run2.mark_missed("dom1", None).await? else {
        panic!("context is complete");
    };
    let ids: Vec<_> = missed.iter().map(|s| s.asset_id.as_str()).collect();
    assert_eq!(ids, vec!["i-2"]);
    assert_eq!(missed.first().map(|s| s.disconnected_count), Some(1));

    assert_eq!(run2.find("i-1", "dom1").await?.map(|s| s.disconnected_count), Some(0));
    assert_eq!(run2.find("i-3", "dom2").await?.map(|s| s.disconnected_count), Some(0));
    Ok(())
}

#[tokio::test]
async fn test_mark_missed_rollback() -> anyhow::Result<()> {
    let backend = Arc::new(InMemoryStateBackend::new());
    CollectionStateStore::new(backend.clone(), context("job1"))
        .create("i-1", "dom1", None)
        .await?;

    let run2 = CollectionStateStore::new(backend.clone(), context("job2"));
    let mut tx = Transaction::new();
    run2.mark_missed("dom1", Some(&mut tx)).await?;
    assert_eq!(run2.find("i-1", "dom1").await?.map(|s| s.disconnected_count), Some(1));

    tx.rollback(&*backend).await?;
    assert_eq!(run2.find("i-1", "dom1").await?.map(|s| s.disconnected_count), Some(0));
    Ok(())
}

#[tokio::test]
async fn test_mark_missed_skipped_without_job() -> anyhow::Result<()> {
    let store = CollectionStateStore::new(
        Arc::new(InMemoryStateBackend::new()),
        CollectionContext::new().collector_id("col1").secret_id("sec1"),
    );
    let outcome = store.mark_missed("dom1", None).await?;
    assert_eq!(outcome, MarkMissedOutcome::Skipped(MissingContext::JobTaskId));
    Ok(())
}

#[tokio::test]
async fn test_list_disconnected_uses_threshold() -> anyhow::Result<()> {
    let backend = Arc::new(InMemoryStateBackend::new());
    let config = StateStoreConfig::new().disconnected_threshold(2);
    let store =
        CollectionStateStore::new(backend.clone(), context("job1")).with_config(config.clone())?;
    store.create("i-1", "dom1", None).await?;
    store.create("i-2", "dom1", None).await?;

    // Two later runs never see i-2; the second of them does see i-1.
    let run2 =
        CollectionStateStore::new(backend.clone(), context("job2")).with_config(config.clone())?;
    run2.mark_missed("dom1", None).await?;

    let run3 = CollectionStateStore::new(backend.clone(), context("job3")).with_config(config)?;
    let mut seen = run3.find("i-1", "dom1").await?.expect("created");
    run3.reset_miss_counter(&mut seen, None).await?;
    run3.mark_missed("dom1", None).await?;

    let disconnected = run3.list_disconnected("dom1").await?;
    let ids: Vec<_> = disconnected.iter().map(|s| s.asset_id.as_str()).collect();
    assert_eq!(ids, vec!["i-2"]);
    assert_eq!(disconnected.first().map(|s| s.disconnected_count), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_list_disconnected_requires_source_context() -> anyhow::Result<()> {
    let store = CollectionStateStore::new(
        Arc::new(InMemoryStateBackend::new()),
        CollectionContext::new().collector_id("col1"),
    );
    assert!(store.list_disconnected("dom1").await?.is_empty());
    Ok(())
}
