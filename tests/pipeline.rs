//! Integration tests for the round orchestration pipeline.
//!
//! All three ports are replaced by stubs that record their calls, so each
//! test can assert exactly which steps ran and what was published.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use pagewright::context::ServiceContext;
use pagewright::locks::TaskLocks;
use pagewright::pipeline;
use pagewright::ports::generator::{SiteBrief, SiteGenerator, SnapshotFuture};
use pagewright::ports::notifier::{Notifier, NotifyFuture, RoundOutcome};
use pagewright::ports::repo_host::{CreatedRepo, HostFuture, HostedSite, RepoHost};
use pagewright::snapshot::FileContext;
use pagewright::status::{RunRegistry, RunState};
use pagewright::task::{Round, TaskRequest};

fn file(name: &str, content: &str) -> FileContext {
    FileContext { file_name: name.into(), file_content: content.into() }
}

fn request(task: &str, round: Round) -> TaskRequest {
    let round = round.number().to_string();
    serde_json::from_value(serde_json::json!({
        "email": "dev@example.com",
        "task": task,
        "round": round,
        "nonce": "nonce-7",
        "brief": "a site with a visitor counter",
        "checks": ["js: document.querySelector('#counter') !== null"],
        "evaluation_url": "https://eval.example.com/cb",
        "secret": "s",
    }))
    .expect("request fixture deserializes")
}

/// Stub generator returning a fixed snapshot, or failing when none is set.
struct StubGenerator {
    files: Option<Vec<FileContext>>,
    generate_calls: AtomicU32,
    modify_calls: AtomicU32,
}

impl StubGenerator {
    fn returning(files: Vec<FileContext>) -> Self {
        Self { files: Some(files), generate_calls: AtomicU32::new(0), modify_calls: AtomicU32::new(0) }
    }

    fn failing() -> Self {
        Self { files: None, generate_calls: AtomicU32::new(0), modify_calls: AtomicU32::new(0) }
    }

    fn result(&self) -> Result<Vec<FileContext>, Box<dyn std::error::Error + Send + Sync>> {
        self.files.clone().ok_or_else(|| "generation service unavailable".into())
    }
}

impl SiteGenerator for StubGenerator {
    fn generate(&self, _brief: &SiteBrief) -> SnapshotFuture<'_> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(std::future::ready(self.result()))
    }

    fn modify(&self, _existing: &[FileContext], _brief: &SiteBrief) -> SnapshotFuture<'_> {
        self.modify_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(std::future::ready(self.result()))
    }
}

/// Stub repository host with full-replace push semantics and an in-memory
/// store, recording every pushed snapshot.
struct StubRepoHost {
    store: Mutex<HashMap<String, Vec<FileContext>>>,
    pushes: Mutex<Vec<Vec<FileContext>>>,
    commits: AtomicU32,
    enables: AtomicU32,
    fail_push: bool,
}

impl StubRepoHost {
    fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            pushes: Mutex::new(Vec::new()),
            commits: AtomicU32::new(0),
            enables: AtomicU32::new(0),
            fail_push: false,
        }
    }

    fn failing_push() -> Self {
        Self { fail_push: true, ..Self::new() }
    }

    fn seed(&self, name: &str, files: Vec<FileContext>) {
        self.store.lock().unwrap().insert(name.to_string(), files);
    }

    fn push_count(&self) -> usize {
        self.pushes.lock().unwrap().len()
    }
}

impl RepoHost for StubRepoHost {
    fn create(&self, name: &str) -> HostFuture<'_, CreatedRepo> {
        let repo_url = format!("https://repos.test/{name}");
        Box::pin(std::future::ready(Ok(CreatedRepo { repo_url })))
    }

    fn fetch(&self, name: &str) -> HostFuture<'_, Vec<FileContext>> {
        let result = self
            .store
            .lock()
            .unwrap()
            .get(name)
            .filter(|files| !files.is_empty())
            .cloned()
            .ok_or_else(|| format!("no such repository: {name}").into());
        Box::pin(std::future::ready(result))
    }

    fn push(&self, name: &str, files: &[FileContext]) -> HostFuture<'_, String> {
        if self.fail_push {
            return Box::pin(std::future::ready(Err("host rejected the push".into())));
        }
        self.store.lock().unwrap().insert(name.to_string(), files.to_vec());
        self.pushes.lock().unwrap().push(files.to_vec());
        let n = self.commits.fetch_add(1, Ordering::SeqCst) + 1;
        Box::pin(std::future::ready(Ok(format!("commit-{n}"))))
    }

    fn enable_hosting(&self, name: &str) -> HostFuture<'_, HostedSite> {
        self.enables.fetch_add(1, Ordering::SeqCst);
        let site = HostedSite {
            pages_url: format!("https://pages.test/{name}/"),
            repo_url: format!("https://repos.test/{name}"),
        };
        Box::pin(std::future::ready(Ok(site)))
    }
}

/// Stub notifier recording every delivery.
#[derive(Default)]
struct StubNotifier {
    deliveries: Mutex<Vec<(String, RoundOutcome)>>,
}

impl Notifier for StubNotifier {
    fn notify(&self, url: &str, outcome: &RoundOutcome) -> NotifyFuture<'_> {
        self.deliveries.lock().unwrap().push((url.to_string(), outcome.clone()));
        Box::pin(std::future::ready(Ok(())))
    }
}

struct Harness {
    generator: Arc<StubGenerator>,
    repo: Arc<StubRepoHost>,
    notifier: Arc<StubNotifier>,
    ctx: Arc<ServiceContext>,
    registry: Arc<RunRegistry>,
    locks: Arc<TaskLocks>,
}

fn harness(generator: StubGenerator, repo: StubRepoHost) -> Harness {
    let generator = Arc::new(generator);
    let repo = Arc::new(repo);
    let notifier = Arc::new(StubNotifier::default());
    let ctx = Arc::new(ServiceContext::new(
        Arc::clone(&generator) as Arc<dyn SiteGenerator>,
        Arc::clone(&repo) as Arc<dyn RepoHost>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    ));
    Harness {
        generator,
        repo,
        notifier,
        ctx,
        registry: Arc::new(RunRegistry::new()),
        locks: Arc::new(TaskLocks::new()),
    }
}

async fn run(h: &Harness, request: TaskRequest) {
    pipeline::run(
        Arc::clone(&h.ctx),
        Arc::clone(&h.registry),
        Arc::clone(&h.locks),
        request,
    )
    .await;
}

#[tokio::test]
async fn round_one_callback_echoes_host_values() {
    let snapshot = vec![file("index.html", "<html></html>"), file("README.md", "# site")];
    let h = harness(StubGenerator::returning(snapshot), StubRepoHost::new());

    run(&h, request("demo-site", Round::One)).await;

    let deliveries = h.notifier.deliveries.lock().unwrap();
    assert_eq!(deliveries.len(), 1);
    let (url, outcome) = &deliveries[0];
    assert_eq!(url, "https://eval.example.com/cb");
    assert_eq!(outcome.round, Round::One);
    assert_eq!(outcome.repo_url, "https://repos.test/demo-site");
    assert_eq!(outcome.commit_sha, "commit-1");
    assert_eq!(outcome.pages_url, "https://pages.test/demo-site/");
    assert_eq!(outcome.email, "dev@example.com");
    assert_eq!(outcome.nonce, "nonce-7");
    drop(deliveries);

    let record = h.registry.get("demo-site", 1).await.unwrap();
    assert_eq!(record.state, RunState::Succeeded);
    assert_eq!(record.outcome.unwrap().commit_sha, "commit-1");
}

#[tokio::test]
async fn round_two_pushes_exactly_the_returned_file_set() {
    let original = vec![
        file("index.html", "<html>v1</html>"),
        file("style.css", "body {}"),
        file("app.js", "let v = 1;"),
    ];
    let modified = vec![
        file("index.html", "<html>v2</html>"),
        file("style.css", "body {}"),
        file("app.js", "let v = 1;"),
    ];
    let repo = StubRepoHost::new();
    repo.seed("demo-site", original);
    let h = harness(StubGenerator::returning(modified), repo);

    run(&h, request("demo-site", Round::Two)).await;

    assert_eq!(h.generator.modify_calls.load(Ordering::SeqCst), 1);
    let pushes = h.repo.pushes.lock().unwrap();
    assert_eq!(pushes.len(), 1);
    let mut names: Vec<&str> = pushes[0].iter().map(|f| f.file_name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["app.js", "index.html", "style.css"]);
    assert_eq!(pushes[0][0].file_content, "<html>v2</html>");
    drop(pushes);

    let deliveries = h.notifier.deliveries.lock().unwrap();
    assert_eq!(deliveries[0].1.round, Round::Two);
    assert_eq!(deliveries[0].1.repo_url, "https://repos.test/demo-site");
}

#[tokio::test]
async fn generation_failure_stops_the_round_silently() {
    let h = harness(StubGenerator::failing(), StubRepoHost::new());

    run(&h, request("demo-site", Round::One)).await;

    assert_eq!(h.repo.push_count(), 0);
    assert_eq!(h.repo.enables.load(Ordering::SeqCst), 0);
    assert!(h.notifier.deliveries.lock().unwrap().is_empty());

    let record = h.registry.get("demo-site", 1).await.unwrap();
    assert_eq!(record.state, RunState::Failed);
    assert!(record.error.unwrap().contains("site generation"));
}

#[tokio::test]
async fn push_failure_discards_the_generated_snapshot() {
    let snapshot = vec![file("index.html", "<html></html>")];
    let h = harness(StubGenerator::returning(snapshot), StubRepoHost::failing_push());

    run(&h, request("demo-site", Round::One)).await;

    assert!(h.generator.generate_calls.load(Ordering::SeqCst) >= 1);
    assert_eq!(h.repo.enables.load(Ordering::SeqCst), 0);
    assert!(h.notifier.deliveries.lock().unwrap().is_empty());

    let record = h.registry.get("demo-site", 1).await.unwrap();
    assert_eq!(record.state, RunState::Failed);
    assert!(record.error.unwrap().contains("publish"));
}

#[tokio::test]
async fn modification_failure_aborts_round_two() {
    let repo = StubRepoHost::new();
    repo.seed("demo-site", vec![file("index.html", "<html>v1</html>")]);
    let h = harness(StubGenerator::failing(), repo);

    run(&h, request("demo-site", Round::Two)).await;

    assert_eq!(h.repo.push_count(), 0);
    assert!(h.notifier.deliveries.lock().unwrap().is_empty());
    let record = h.registry.get("demo-site", 2).await.unwrap();
    assert_eq!(record.state, RunState::Failed);
    assert!(record.error.unwrap().contains("site modification"));
}

#[tokio::test]
async fn empty_generated_snapshot_is_rejected_before_push() {
    let h = harness(StubGenerator::returning(vec![]), StubRepoHost::new());

    run(&h, request("demo-site", Round::One)).await;

    assert_eq!(h.repo.push_count(), 0);
    let record = h.registry.get("demo-site", 1).await.unwrap();
    assert_eq!(record.state, RunState::Failed);
    assert!(record.error.unwrap().contains("no files"));
}

#[tokio::test]
async fn pushing_the_same_snapshot_twice_replaces_not_accumulates() {
    let repo = StubRepoHost::new();
    let snapshot = vec![file("index.html", "<html></html>"), file("app.js", "1")];

    let first = repo.push("demo-site", &snapshot).await.unwrap();
    let second = repo.push("demo-site", &snapshot).await.unwrap();
    assert_ne!(first, second);

    let stored = repo.fetch("demo-site").await.unwrap();
    assert_eq!(stored, snapshot);
}

#[tokio::test]
async fn duplicate_submission_for_an_active_task_is_rejected() {
    let snapshot = vec![file("index.html", "<html></html>")];
    let h = harness(StubGenerator::returning(snapshot), StubRepoHost::new());

    // Simulate an in-flight run by holding the task lock.
    let guard = h.locks.acquire("demo-site").unwrap();
    run(&h, request("demo-site", Round::One)).await;

    assert_eq!(h.generator.generate_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.repo.push_count(), 0);
    assert!(h.registry.get("demo-site", 1).await.is_none());
    drop(guard);

    // The same submission goes through once the active run finishes.
    run(&h, request("demo-site", Round::One)).await;
    assert_eq!(h.registry.get("demo-site", 1).await.unwrap().state, RunState::Succeeded);
}
