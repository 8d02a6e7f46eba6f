//! End-to-end cycles over fake sources and an in-memory mirror

use crate::support::{MemoryRemote, RemoteCall, ScriptedSource};
use crypto_collector::collector::{Collector, SourceGroup};
use crypto_collector::mirror::MirrorPublisher;
use crypto_collector::pipeline::Pipeline;
use crypto_collector::source::{Absent, Snapshot};
use crypto_collector::store::HistoryStore;
use std::time::Duration;
use tempfile::TempDir;

fn collector(source_a: std::sync::Arc<ScriptedSource>) -> Collector {
    Collector::new()
        .with_group(
            SourceGroup::new(vec!["BTCUSDT".to_string()], Duration::ZERO)
                .with_adapter(source_a)
                .with_adapter(ScriptedSource::constant(
                    "bybit",
                    Ok(Snapshot::new(42010.0).with_funding_rate(Some(0.0001))),
                )),
        )
        .with_group(
            SourceGroup::new(vec!["bitcoin".to_string()], Duration::ZERO).with_adapter(
                ScriptedSource::constant(
                    "coingecko",
                    Ok(Snapshot::new(41990.0).with_market_cap(Some(8.2e11))),
                ),
            ),
        )
}

#[tokio::test]
async fn test_three_cycles_with_source_outage() {
    let dir = TempDir::new().unwrap();
    let remote = MemoryRemote::default();
    let source_a = ScriptedSource::new(
        "binance",
        vec![
            Ok(Snapshot::new(42000.0)),
            Err(Absent::Timeout),
            Ok(Snapshot::new(42100.0)),
        ],
    );

    let pipeline = Pipeline::new(
        collector(source_a),
        HistoryStore::new(dir.path().join("combined.json")),
        Some(MirrorPublisher::new(remote.clone(), "combined.json")),
    );

    let completed = pipeline
        .run(Duration::ZERO, Some(3), std::future::pending())
        .await;
    assert_eq!(completed, 3);

    let history = pipeline.store().load_records().unwrap();
    assert_eq!(history.len(), 3);

    assert_eq!(history[0].get("binance", "BTCUSDT").unwrap().price, 42000.0);
    assert!(history[1].get("binance", "BTCUSDT").is_none());
    assert!(history[1].by_source["binance"].is_empty());
    assert_eq!(history[2].get("binance", "BTCUSDT").unwrap().price, 42100.0);

    for record in &history {
        assert_eq!(record.get("bybit", "BTCUSDT").unwrap().price, 42010.0);
        assert_eq!(
            record.get("coingecko", "bitcoin").unwrap().market_cap,
            Some(8.2e11)
        );
    }

    // mirror holds the full history, written create-then-update
    assert_eq!(remote.content().unwrap(), pipeline.store().read_bytes().unwrap());
    assert_eq!(
        remote.calls(),
        vec![
            RemoteCall::Get,
            RemoteCall::Create,
            RemoteCall::Get,
            RemoteCall::Update("v1".to_string()),
            RemoteCall::Get,
            RemoteCall::Update("v2".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_cycle_with_every_source_down() {
    let dir = TempDir::new().unwrap();
    let down = |name| ScriptedSource::constant(name, Err(Absent::Status(503)));
    let collector = Collector::new()
        .with_group(
            SourceGroup::new(vec!["BTCUSDT".to_string()], Duration::ZERO)
                .with_adapter(down("binance"))
                .with_adapter(down("bybit")),
        )
        .with_group(
            SourceGroup::new(vec!["bitcoin".to_string()], Duration::ZERO)
                .with_adapter(down("coingecko")),
        );
    let pipeline: Pipeline<MemoryRemote> = Pipeline::new(
        collector,
        HistoryStore::new(dir.path().join("combined.json")),
        None,
    );

    let report = pipeline.run_cycle().await;

    assert_eq!(report.appended, Ok(1));
    assert_eq!(report.record.by_source.len(), 3);
    assert_eq!(report.record.snapshot_count(), 0);
    assert!(report.mirror.is_none());
}

#[tokio::test]
async fn test_mirror_failure_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let remote = MemoryRemote::default();
    remote.set_fail_reads(true);

    let pipeline = Pipeline::new(
        collector(ScriptedSource::new("binance", vec![])),
        HistoryStore::new(dir.path().join("combined.json")),
        Some(MirrorPublisher::new(remote.clone(), "combined.json")),
    );

    let first = pipeline.run_cycle().await;
    assert_eq!(first.appended, Ok(1));
    assert!(first.mirror.is_none());
    assert!(remote.content().is_none());

    // next cycle self-heals with the then-current full history
    remote.set_fail_reads(false);
    let second = pipeline.run_cycle().await;
    assert_eq!(second.appended, Ok(2));
    assert_eq!(second.mirror.as_deref(), Some("memory://combined.json"));
    assert_eq!(remote.content().unwrap(), pipeline.store().read_bytes().unwrap());
}

#[tokio::test]
async fn test_failed_append_skips_publish() {
    let dir = TempDir::new().unwrap();
    // a regular file where the history's parent directory should be
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();

    let remote = MemoryRemote::default();
    let pipeline = Pipeline::new(
        collector(ScriptedSource::new("binance", vec![])),
        HistoryStore::new(blocker.join("combined.json")),
        Some(MirrorPublisher::new(remote.clone(), "combined.json")),
    );

    let report = pipeline.run_cycle().await;

    assert!(!report.is_persisted());
    assert!(report.mirror.is_none());
    assert!(remote.calls().is_empty());
    assert_eq!(std::fs::read(&blocker).unwrap(), b"x");
}

#[tokio::test]
async fn test_shutdown_before_first_cycle() {
    let dir = TempDir::new().unwrap();
    let pipeline: Pipeline<MemoryRemote> = Pipeline::new(
        collector(ScriptedSource::new("binance", vec![])),
        HistoryStore::new(dir.path().join("combined.json")),
        None,
    );

    let completed = pipeline
        .run(Duration::from_secs(60), None, std::future::ready(()))
        .await;

    assert_eq!(completed, 0);
    assert!(!pipeline.store().path().exists());
}

#[tokio::test]
async fn test_shutdown_during_sleep() {
    let dir = TempDir::new().unwrap();
    let pipeline: Pipeline<MemoryRemote> = Pipeline::new(
        collector(ScriptedSource::new("binance", vec![])),
        HistoryStore::new(dir.path().join("combined.json")),
        None,
    );

    let completed = pipeline
        .run(
            Duration::from_secs(3600),
            None,
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await;

    assert_eq!(completed, 1);
    assert_eq!(pipeline.store().load().unwrap().len(), 1);
}
