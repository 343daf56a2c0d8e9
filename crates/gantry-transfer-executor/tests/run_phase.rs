//! Executor behavior under concurrency, timeouts, and cancellation.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gantry_transfer::{
  Direction, Locator, Phase, StorageStrategy, TaskFiles, TransferDecl, TransferError, TransferSpec,
};
use gantry_transfer_executor::TransferExecutor;
use tokio_util::sync::CancellationToken;

/// Strategy with a controllable delay and outcome, recording completion
/// order so tests can assert that output order is declaration order even
/// when transfers finish out of order.
struct FakeStrategy {
  label: &'static str,
  delay: Duration,
  fail_with: Option<TransferError>,
  completions: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl StorageStrategy for FakeStrategy {
  fn name(&self) -> &'static str {
    "fake"
  }

  fn supports(&self, _locator: &Locator) -> bool {
    true
  }

  async fn download(&self, _remote: &Locator, _local: &Path) -> Result<(), TransferError> {
    tokio::time::sleep(self.delay).await;
    if let Some(err) = &self.fail_with {
      return Err(err.clone());
    }
    self.completions.lock().unwrap().push(self.label);
    Ok(())
  }

  async fn upload(&self, local: &Path, remote: &Locator) -> Result<(), TransferError> {
    self.download(remote, local).await
  }
}

fn spec(
  direction: Direction,
  label: &'static str,
  delay_ms: u64,
  fail_with: Option<TransferError>,
  completions: &Arc<Mutex<Vec<&'static str>>>,
) -> TransferSpec {
  let strategy = Arc::new(FakeStrategy {
    label,
    delay: Duration::from_millis(delay_ms),
    fail_with,
    completions: Arc::clone(completions),
  });
  TransferSpec::new(
    direction,
    Locator::parse(format!("s3://bucket/{}", label)).unwrap(),
    Path::new("/work").join(label),
    strategy,
  )
  .unwrap()
}

#[tokio::test(start_paused = true)]
async fn results_keep_declaration_order_despite_completion_order() {
  let completions = Arc::new(Mutex::new(Vec::new()));
  let specs = vec![
    spec(Direction::ToLocal, "slow", 300, None, &completions),
    spec(Direction::ToLocal, "fast", 10, None, &completions),
  ];

  let results = TransferExecutor::new()
    .run_phase(&specs, Phase::Pre, &CancellationToken::new())
    .await;

  // The fast transfer finished first...
  assert_eq!(*completions.lock().unwrap(), vec!["fast", "slow"]);
  // ...but results are reported in declaration order.
  assert_eq!(results.len(), 2);
  assert_eq!(results[0].spec_id, specs[0].id());
  assert_eq!(results[1].spec_id, specs[1].id());
  assert!(results.iter().all(|r| r.succeeded));
}

#[tokio::test]
async fn phase_filter_selects_only_matching_directions() {
  let completions = Arc::new(Mutex::new(Vec::new()));
  let specs = vec![
    spec(Direction::ToLocal, "in", 0, None, &completions),
    spec(Direction::ToRemote, "out", 0, None, &completions),
    spec(Direction::ToLocal, "in2", 0, None, &completions),
  ];

  let executor = TransferExecutor::new();
  let cancel = CancellationToken::new();

  let pre = executor.run_phase(&specs, Phase::Pre, &cancel).await;
  assert_eq!(pre.len(), 2);
  assert_eq!(pre[0].spec_id, specs[0].id());
  assert_eq!(pre[1].spec_id, specs[2].id());

  let post = executor.run_phase(&specs, Phase::Post, &cancel).await;
  assert_eq!(post.len(), 1);
  assert_eq!(post[0].spec_id, specs[1].id());
}

#[tokio::test]
async fn failures_do_not_short_circuit_the_phase() {
  let completions = Arc::new(Mutex::new(Vec::new()));
  let specs = vec![
    spec(
      Direction::ToLocal,
      "broken",
      0,
      Some(TransferError::ObjectNotFound {
        locator: "s3://bucket/broken".to_string(),
      }),
      &completions,
    ),
    spec(Direction::ToLocal, "good", 0, None, &completions),
  ];

  let results = TransferExecutor::new()
    .run_phase(&specs, Phase::Pre, &CancellationToken::new())
    .await;

  assert_eq!(results.len(), 2);
  assert!(!results[0].succeeded);
  assert!(matches!(
    results[0].error,
    Some(TransferError::ObjectNotFound { .. })
  ));
  assert!(results[1].succeeded);
}

#[tokio::test(start_paused = true)]
async fn per_spec_timeout_becomes_network_timeout() {
  let completions = Arc::new(Mutex::new(Vec::new()));
  let strategy = Arc::new(FakeStrategy {
    label: "slow",
    delay: Duration::from_secs(5),
    fail_with: None,
    completions: Arc::clone(&completions),
  });

  let files = TaskFiles::new().with(
    TransferDecl::to_local(
      Locator::parse("s3://bucket/slow").unwrap(),
      "slow.bin",
      strategy,
    )
    .with_timeout(Duration::from_millis(50)),
  );
  let specs = files.resolve(Path::new("/work")).unwrap();

  let results = TransferExecutor::new()
    .run_phase(&specs, Phase::Pre, &CancellationToken::new())
    .await;

  assert_eq!(results.len(), 1);
  assert!(matches!(
    results[0].error,
    Some(TransferError::NetworkTimeout { timeout_ms: 50 })
  ));
  assert!(completions.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancellation_fails_in_flight_transfers() {
  let completions = Arc::new(Mutex::new(Vec::new()));
  let specs = vec![spec(Direction::ToLocal, "slow", 60_000, None, &completions)];

  let cancel = CancellationToken::new();
  let abort = cancel.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(20)).await;
    abort.cancel();
  });

  let results = TransferExecutor::new()
    .run_phase(&specs, Phase::Pre, &cancel)
    .await;

  assert_eq!(results.len(), 1);
  assert_eq!(results[0].error, Some(TransferError::Cancelled));
  assert!(completions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn bounded_concurrency_still_returns_every_result() {
  let completions = Arc::new(Mutex::new(Vec::new()));
  let specs: Vec<TransferSpec> = (0..6)
    .map(|i| {
      spec(
        Direction::ToLocal,
        ["a", "b", "c", "d", "e", "f"][i],
        0,
        None,
        &completions,
      )
    })
    .collect();

  let results = TransferExecutor::new()
    .with_concurrency(2)
    .run_phase(&specs, Phase::Pre, &CancellationToken::new())
    .await;

  assert_eq!(results.len(), 6);
  for (result, spec) in results.iter().zip(&specs) {
    assert_eq!(result.spec_id, spec.id());
  }
}
