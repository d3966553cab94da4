#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::oneshot;

use qtrack::config::NotificationConfig;
use qtrack::error::{Result, TrackerError};
use qtrack::{
    CollectionView, Difficulty, Fragment, InMemoryStore, Notifier, PageQuery, PageRequest,
    PageResult, ProgressStats, QuestionId, Record, RecordPatch, RemoteStore, ViewKey,
};

pub fn google() -> ViewKey {
    ViewKey::new("google", "all")
}

pub fn record(id: u64, title: &str, difficulty: Difficulty, link: &str) -> Record {
    Record {
        id: QuestionId(id),
        title: title.to_string(),
        frequency: id as f64,
        acceptance_rate: 0.5,
        remote_difficulty: difficulty,
        user_difficulty: None,
        solved: false,
        link: link.to_string(),
        tags: vec![],
    }
}

pub fn rated(id: u64, rating: Option<Difficulty>) -> Record {
    Record {
        user_difficulty: rating,
        ..record(id, &format!("Question {id}"), Difficulty::Medium, &format!("q-{id}"))
    }
}

/// Store with three google questions and one meta listing sharing a link
pub fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.insert(google(), record(1, "Two Sum", Difficulty::Easy, "two-sum"));
    store.insert(google(), record(2, "LRU Cache", Difficulty::Medium, "lru-cache"));
    store.insert(google(), record(3, "Word Ladder", Difficulty::Hard, "word-ladder"));
    store.insert(
        ViewKey::new("meta", "all"),
        record(11, "Two Sum", Difficulty::Easy, "two-sum"),
    );
    store
}

pub fn notification_config() -> NotificationConfig {
    NotificationConfig {
        display_ms: 1000,
        grace_ms: 200,
    }
}

pub fn debounce() -> Duration {
    Duration::from_millis(300)
}

pub fn view_on(store: Arc<dyn RemoteStore>, query: PageQuery) -> CollectionView {
    CollectionView::new(
        store,
        Notifier::new(notification_config()),
        query,
        debounce(),
    )
}

/// Let spawned tasks run
pub async fn run_pending_tasks() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

pub fn ids(rows: &[Record]) -> Vec<u64> {
    rows.iter().map(|r| r.id.0).collect()
}

struct GatedRead {
    request: PageRequest,
    reply: oneshot::Sender<Result<PageResult>>,
}

/// Store whose reads block until the test resolves them.
///
/// Writes and stats go straight to a backing `InMemoryStore`; resolving a
/// read from the backing store returns what it would have answered.
#[derive(Default)]
pub struct GatedStore {
    pub backing: InMemoryStore,
    reads: Mutex<Vec<Option<GatedRead>>>,
}

impl GatedStore {
    pub fn new(backing: InMemoryStore) -> Self {
        Self {
            backing,
            reads: Mutex::new(Vec::new()),
        }
    }

    /// Number of reads received so far, resolved or not
    pub fn reads_received(&self) -> usize {
        self.reads.lock().len()
    }

    pub async fn wait_for_reads(&self, count: usize) {
        for _ in 0..1000 {
            if self.reads_received() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!(
            "expected {count} reads, store received {}",
            self.reads_received()
        );
    }

    fn take(&self, matches: impl Fn(&PageRequest) -> bool) -> GatedRead {
        let mut reads = self.reads.lock();
        let slot = reads
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|read| matches(&read.request)))
            .expect("no pending read matches");
        slot.take().expect("slot checked above")
    }

    /// Answer the oldest pending read matching `matches` with `result`
    pub fn resolve_with(
        &self,
        matches: impl Fn(&PageRequest) -> bool,
        result: Result<PageResult>,
    ) {
        let read = self.take(matches);
        let _ = read.reply.send(result);
    }

    /// Answer the oldest pending read matching `matches` from the backing store
    pub async fn resolve(&self, matches: impl Fn(&PageRequest) -> bool) {
        let read = self.take(matches);
        let result = self.backing.read_page(&read.request).await;
        let _ = read.reply.send(result);
    }

    pub fn fail(&self, matches: impl Fn(&PageRequest) -> bool) {
        self.resolve_with(
            matches,
            Err(TrackerError::TransientFetch("gate failure".to_string())),
        );
    }
}

#[async_trait]
impl RemoteStore for GatedStore {
    async fn read_page(&self, request: &PageRequest) -> Result<PageResult> {
        let (reply, receiver) = oneshot::channel();
        self.reads.lock().push(Some(GatedRead {
            request: request.clone(),
            reply,
        }));
        receiver
            .await
            .unwrap_or_else(|_| Err(TrackerError::TransientFetch("gate dropped".to_string())))
    }

    async fn write_record(&self, id: QuestionId, patch: &RecordPatch) -> Result<Vec<Fragment>> {
        self.backing.write_record(id, patch).await
    }

    async fn write_batch(&self, ids: &[QuestionId], patch: &RecordPatch) -> Result<Vec<Fragment>> {
        self.backing.write_batch(ids, patch).await
    }

    async fn read_stats(&self) -> Result<ProgressStats> {
        self.backing.read_stats().await
    }
}

/// Helper to run the qtrack binary in an isolated temp directory
pub struct QtrackTest {
    pub temp_dir: TempDir,
}

impl QtrackTest {
    pub fn new() -> Self {
        QtrackTest {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_qtrack"))
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("QTRACK_ROOT")
            .env_remove("QTRACK_TOKEN")
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to execute qtrack command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn write_fixture(&self, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join("fixture.json");
        fs::write(&path, content).expect("Failed to write fixture file");
        path
    }

    pub fn write_config(&self, content: &str) {
        let dir = self.temp_dir.path().join(".qtrack");
        fs::create_dir_all(&dir).expect("Failed to create .qtrack directory");
        fs::write(dir.join("config.yaml"), content).expect("Failed to write config file");
    }
}

pub const FIXTURE: &str = r#"{
  "views": [
    {
      "company": "google",
      "bucket": "all",
      "questions": [
        {"id": 1, "title": "Two Sum", "frequency": 9.5, "acceptanceRate": 0.52,
         "remoteDifficulty": "Easy", "link": "two-sum", "tags": ["array"]},
        {"id": 2, "title": "LRU Cache", "frequency": 7.0, "acceptanceRate": 0.41,
         "remoteDifficulty": "Medium", "link": "lru-cache", "tags": ["design"]},
        {"id": 3, "title": "Word Ladder", "frequency": 4.2, "acceptanceRate": 0.38,
         "remoteDifficulty": "Hard", "link": "word-ladder", "solved": true,
         "userDifficulty": "Hard"}
      ]
    },
    {
      "company": "meta",
      "bucket": "all",
      "questions": [
        {"id": 11, "title": "Two Sum", "frequency": 8.0, "acceptanceRate": 0.52,
         "remoteDifficulty": "Easy", "link": "two-sum"}
      ]
    }
  ]
}"#;
