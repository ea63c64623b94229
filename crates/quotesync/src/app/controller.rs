//! Application controller
//!
//! Owns the quote store and processes commands from every frontend
//! through a single crossbeam channel. Remote fetches run on worker
//! threads and post their result back as a command, so the store only
//! ever has one writer.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use crate::config::sync::{COMMAND_CHANNEL_CAPACITY, COMMAND_POLL_MS};
use crate::data::store::QuoteStore;
use crate::data::types::{CategoryFilter, Quote};
use crate::error::{QuoteError, Result};
use crate::remote::QuoteSource;
use crate::sync::{Resolution, SyncReport};

use super::state::{Notice, QuoteCommand, QuoteSnapshot, Severity};

pub struct QuoteController {
    cmd_rx: Receiver<QuoteCommand>,
    cmd_tx: Sender<QuoteCommand>,
    shared_state: Arc<Mutex<QuoteSnapshot>>,
    store: QuoteStore,
    source: Arc<dyn QuoteSource>,
    /// Quote on display
    current: Option<Quote>,
    notices: Vec<Notice>,
    /// Counter used to tag fetches in logs
    sync_pass: u64,
    syncs_in_flight: usize,
    syncs_completed: u64,
    /// Periodic sync; `None` disables it
    sync_interval: Option<Duration>,
    next_auto_sync: Option<Instant>,
}

impl QuoteController {
    pub fn new(
        store: QuoteStore,
        source: Arc<dyn QuoteSource>,
        cmd_rx: Receiver<QuoteCommand>,
        cmd_tx: Sender<QuoteCommand>,
        shared_state: Arc<Mutex<QuoteSnapshot>>,
    ) -> Self {
        Self {
            cmd_rx,
            cmd_tx,
            shared_state,
            store,
            source,
            current: None,
            notices: Vec::new(),
            sync_pass: 0,
            syncs_in_flight: 0,
            syncs_completed: 0,
            sync_interval: None,
            next_auto_sync: None,
        }
    }

    /// Trigger a sync every `interval` while running
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = Some(interval);
        self
    }

    /// Run the controller event loop (blocking, call from a dedicated thread)
    pub fn run(&mut self) {
        self.restore_display();
        self.next_auto_sync = self.sync_interval.map(|i| Instant::now() + i);
        self.publish();

        loop {
            // Block with timeout so the auto-sync timer keeps ticking
            match self.cmd_rx.recv_timeout(Duration::from_millis(COMMAND_POLL_MS)) {
                Ok(cmd) => {
                    if self.handle_command(cmd) {
                        break;
                    }
                    self.publish();
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            self.poll_auto_sync();
        }

        debug!("Controller stopped");
    }

    /// Show the session's last viewed quote, or pick a fresh one
    fn restore_display(&mut self) {
        let restored = match (self.store.last_viewed(), self.store.last_viewed_quote()) {
            (Ok(Some(_)), Ok(Some(quote))) => Some(quote),
            _ => None,
        };
        match restored {
            Some(quote) => self.current = Some(quote),
            None => self.show_random(),
        }
    }

    /// Handle a single command. Returns true if the loop should exit.
    fn handle_command(&mut self, cmd: QuoteCommand) -> bool {
        match cmd {
            QuoteCommand::Shutdown => return true,

            QuoteCommand::ShowRandom => {
                self.notices.clear();
                self.show_random();
            }
            QuoteCommand::AddQuote { text, category } => {
                self.notices = match self.store.add(&text, &category) {
                    Ok(_) => vec![Notice::success("New quote added successfully!")],
                    Err(e) => vec![notice_for(&e)],
                };
            }
            QuoteCommand::SelectCategory(filter) => {
                self.notices.clear();
                self.select_category(filter);
            }
            QuoteCommand::Import(payload) => {
                self.notices = match self.store.import_snapshot(&payload) {
                    Ok(count) => vec![Notice::success(format!(
                        "Imported {count} quotes successfully!"
                    ))],
                    Err(QuoteError::Parse(detail)) => {
                        warn!("Import rejected: {detail}");
                        vec![Notice::error("Invalid JSON file. Please check your data.")]
                    }
                    Err(e) => vec![notice_for(&e)],
                };
            }
            QuoteCommand::Sync => {
                self.start_sync();
            }
            QuoteCommand::ResolveConflict(resolution) => {
                self.resolve_conflict(resolution);
            }
            QuoteCommand::DismissNotice => {
                self.notices.clear();
            }
            QuoteCommand::InternalSyncFetched { pass, result } => {
                self.handle_sync_fetched(pass, result);
            }
        }
        false
    }

    fn show_random(&mut self) {
        match self.store.show_random() {
            Ok(quote) => self.current = quote,
            Err(e) => {
                warn!("Failed to record last viewed quote: {e}");
                self.notices.push(notice_for(&e));
            }
        }
    }

    fn select_category(&mut self, filter: CategoryFilter) {
        if let Err(e) = self.store.select_category(filter) {
            warn!("Failed to persist category: {e}");
            self.notices.push(notice_for(&e));
            return;
        }
        self.show_random();
    }

    /// Fetch on a worker thread, then send the result back.
    ///
    /// In-flight fetches are never cancelled: every fetch that completes
    /// gets its own reconciliation pass, against the collection as it is
    /// when the result arrives.
    fn start_sync(&mut self) {
        self.sync_pass += 1;
        let pass = self.sync_pass;
        let source = Arc::clone(&self.source);
        let cmd_tx = self.cmd_tx.clone();

        let spawned = std::thread::Builder::new()
            .name("quote-sync".into())
            .spawn(move || {
                let result = source.fetch().map_err(|e| e.to_string());
                // Receiver gone means the controller shut down meanwhile
                let _ = cmd_tx.send(QuoteCommand::InternalSyncFetched { pass, result });
            });

        match spawned {
            Ok(_) => {
                self.syncs_in_flight += 1;
                debug!(pass, source = self.source.name(), "Sync started");
                self.notices = vec![Notice::info("Syncing with server...")];
            }
            Err(e) => {
                warn!("Failed to spawn sync thread: {e}");
                self.notices = vec![Notice::error(format!("Could not start sync: {e}"))];
            }
        }
    }

    /// Reconcile a fetched snapshot (or report the failure).
    fn handle_sync_fetched(&mut self, pass: u64, result: std::result::Result<Vec<Quote>, String>) {
        self.syncs_in_flight = self.syncs_in_flight.saturating_sub(1);

        let remote = match result {
            Ok(remote) => remote,
            Err(e) => {
                warn!(pass, "Sync failed: {e}");
                self.notices = vec![Notice::error(format!("Failed to sync with server: {e}"))];
                return;
            }
        };

        match self.store.sync(remote) {
            Ok(report) => {
                info!(pass, added = report.added, conflicts = report.conflicts, "Sync applied");
                self.syncs_completed += 1;
                self.notices = sync_notices(&report);
                if self.current.is_none() {
                    self.show_random();
                }
            }
            Err(e) => {
                warn!(pass, "Failed to apply sync: {e}");
                self.notices = vec![notice_for(&e)];
            }
        }
    }

    fn resolve_conflict(&mut self, resolution: Resolution) {
        let conflict = match self.store.resolve_conflict(resolution) {
            Ok(conflict) => conflict,
            Err(e) => {
                self.notices = vec![notice_for(&e)];
                return;
            }
        };

        if resolution == Resolution::UseRemote {
            // Keep the display in step with the overwritten quote
            if let Some(current) = &mut self.current {
                if current.id.is_some() && current.id == conflict.remote.id {
                    *current = conflict.remote.clone();
                }
            }
        }

        let message = match resolution {
            Resolution::KeepLocal => "Conflict resolved: kept your local version.",
            Resolution::UseRemote => "Conflict resolved: using the server version.",
        };
        self.notices = vec![Notice::success(message)];
    }

    fn poll_auto_sync(&mut self) {
        let (Some(interval), Some(due)) = (self.sync_interval, self.next_auto_sync) else {
            return;
        };
        if Instant::now() >= due {
            debug!("Periodic sync due");
            self.next_auto_sync = Some(Instant::now() + interval);
            self.start_sync();
            self.publish();
        }
    }

    /// Copy the current state into the shared snapshot
    fn publish(&self) {
        let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
        state.current = self.current.clone();
        state.selected_category = self.store.selected_category().clone();
        state.categories = self.store.categories();
        state.visible = self.store.visible().into_iter().cloned().collect();
        state.total = self.store.len();
        state.pending_conflict = self.store.pending_conflict().cloned();
        state.conflicts_queued = self.store.pending_conflict_count();
        state.syncs_in_flight = self.syncs_in_flight;
        state.syncs_completed = self.syncs_completed;
        state.notices = self.notices.clone();
    }
}

/// Map an error to the notice shown for it
fn notice_for(e: &QuoteError) -> Notice {
    match e {
        QuoteError::Validation(msg) => Notice::warning(msg.clone()),
        QuoteError::NotFound(msg) => Notice::warning(format!("Nothing to do: {msg}")),
        other => Notice::error(other.to_string()),
    }
}

fn sync_notices(report: &SyncReport) -> Vec<Notice> {
    let severity = if report.is_clean() {
        Severity::Success
    } else {
        Severity::Warning
    };
    report
        .messages()
        .into_iter()
        .map(|message| Notice::new(severity, message))
        .collect()
}

// =============================================================================
// ControllerHandle - frontend side of a running controller
// =============================================================================

/// Frontend handle to a controller running on its own thread
pub struct ControllerHandle {
    tx: Sender<QuoteCommand>,
    state: Arc<Mutex<QuoteSnapshot>>,
    thread: JoinHandle<()>,
}

/// Start a controller thread over `store`
pub fn spawn_controller(
    store: QuoteStore,
    source: Arc<dyn QuoteSource>,
    sync_interval: Option<Duration>,
) -> Result<ControllerHandle> {
    let (tx, rx) = bounded(COMMAND_CHANNEL_CAPACITY);
    let state = Arc::new(Mutex::new(QuoteSnapshot::default()));

    let mut controller = QuoteController::new(store, source, rx, tx.clone(), Arc::clone(&state));
    if let Some(interval) = sync_interval {
        controller = controller.with_sync_interval(interval);
    }

    let thread = std::thread::Builder::new()
        .name("controller".into())
        .spawn(move || controller.run())?;

    Ok(ControllerHandle { tx, state, thread })
}

impl ControllerHandle {
    /// Send a command; false if the controller has stopped
    pub fn send(&self, cmd: QuoteCommand) -> bool {
        self.tx.send(cmd).is_ok()
    }

    /// Current state
    pub fn snapshot(&self) -> QuoteSnapshot {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Poll the snapshot until `ready` holds or `timeout` elapses
    pub fn wait_for(
        &self,
        timeout: Duration,
        ready: impl Fn(&QuoteSnapshot) -> bool,
    ) -> Option<QuoteSnapshot> {
        let deadline = Instant::now() + timeout;
        loop {
            let snapshot = self.snapshot();
            if ready(&snapshot) {
                return Some(snapshot);
            }
            if Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    /// Stop the controller and wait for its thread
    pub fn shutdown(self) {
        let _ = self.tx.send(QuoteCommand::Shutdown);
        if self.thread.join().is_err() {
            warn!("Controller thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::storage::{KeyValueStore, MemoryStore};
    use crossbeam_channel::Receiver as GateReceiver;

    const WAIT: Duration = Duration::from_secs(5);

    /// Source returning a fixed snapshot (or error)
    struct MockSource {
        result: std::result::Result<Vec<Quote>, String>,
    }

    impl QuoteSource for MockSource {
        fn name(&self) -> &str {
            "mock"
        }

        fn fetch(&self) -> Result<Vec<Quote>> {
            self.result.clone().map_err(QuoteError::Storage)
        }
    }

    /// Source that blocks until the test releases it
    struct GatedSource {
        gate: GateReceiver<()>,
        quotes: Vec<Quote>,
    }

    impl QuoteSource for GatedSource {
        fn name(&self) -> &str {
            "gated"
        }

        fn fetch(&self) -> Result<Vec<Quote>> {
            let _ = self.gate.recv_timeout(WAIT);
            Ok(self.quotes.clone())
        }
    }

    fn store_with(quotes: &[Quote]) -> QuoteStore {
        let durable = MemoryStore::new();
        durable
            .set(
                crate::config::storage::QUOTES_KEY,
                &serde_json::to_string(quotes).unwrap(),
            )
            .unwrap();
        QuoteStore::open(Box::new(durable), Box::new(MemoryStore::new())).unwrap()
    }

    fn seeded_store() -> QuoteStore {
        QuoteStore::open(Box::new(MemoryStore::new()), Box::new(MemoryStore::new())).unwrap()
    }

    fn mock(result: std::result::Result<Vec<Quote>, String>) -> Arc<dyn QuoteSource> {
        Arc::new(MockSource { result })
    }

    #[test]
    fn test_startup_shows_a_quote() {
        let handle = spawn_controller(seeded_store(), mock(Ok(vec![])), None).unwrap();

        let snapshot = handle.wait_for(WAIT, |s| s.total == 3).unwrap();
        assert!(snapshot.current.is_some());
        assert_eq!(snapshot.category_options().len(), 4);

        handle.shutdown();
    }

    #[test]
    fn test_add_quote_command() {
        let handle = spawn_controller(seeded_store(), mock(Ok(vec![])), None).unwrap();

        handle.send(QuoteCommand::AddQuote {
            text: "Keep going.".to_string(),
            category: "Perseverance".to_string(),
        });
        let snapshot = handle.wait_for(WAIT, |s| s.total == 4).unwrap();
        assert_eq!(snapshot.notice().unwrap().severity, Severity::Success);

        handle.send(QuoteCommand::AddQuote {
            text: "   ".to_string(),
            category: "Perseverance".to_string(),
        });
        let snapshot = handle
            .wait_for(WAIT, |s| s.notice().map(|n| n.severity) == Some(Severity::Warning))
            .unwrap();
        assert_eq!(snapshot.total, 4);

        handle.shutdown();
    }

    #[test]
    fn test_select_category_filters_display() {
        let handle = spawn_controller(seeded_store(), mock(Ok(vec![])), None).unwrap();

        handle.send(QuoteCommand::SelectCategory(CategoryFilter::from("Inspiration")));
        let snapshot = handle
            .wait_for(WAIT, |s| s.selected_category == CategoryFilter::from("Inspiration"))
            .unwrap();

        assert_eq!(snapshot.visible.len(), 1);
        assert_eq!(snapshot.current.unwrap().category, "Inspiration");

        handle.shutdown();
    }

    #[test]
    fn test_import_invalid_payload() {
        let handle = spawn_controller(seeded_store(), mock(Ok(vec![])), None).unwrap();

        handle.send(QuoteCommand::Import("[{".to_string()));
        let snapshot = handle
            .wait_for(WAIT, |s| s.notice().is_some_and(|n| n.is_error()))
            .unwrap();
        assert_eq!(snapshot.total, 3);

        handle.shutdown();
    }

    #[test]
    fn test_sync_adds_new_quotes() {
        let store = store_with(&[Quote::new("A", "X").with_id(1)]);
        let remote = vec![Quote::new("A", "X").with_id(1), Quote::new("B", "Y").with_id(2)];
        let handle = spawn_controller(store, mock(Ok(remote)), None).unwrap();

        handle.send(QuoteCommand::Sync);
        let snapshot = handle.wait_for(WAIT, |s| s.syncs_completed == 1).unwrap();

        assert_eq!(snapshot.total, 2);
        assert!(snapshot.pending_conflict.is_none());
        assert!(!snapshot.is_syncing());
        let messages: Vec<_> = snapshot.notices.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["1 new quote synced from server.", "Sync complete. No conflicts found."]
        );

        handle.shutdown();
    }

    #[test]
    fn test_sync_conflict_then_use_remote() {
        let store = store_with(&[Quote::new("A", "X").with_id(1)]);
        let handle =
            spawn_controller(store, mock(Ok(vec![Quote::new("A2", "X").with_id(1)])), None).unwrap();

        handle.send(QuoteCommand::Sync);
        let snapshot = handle.wait_for(WAIT, |s| s.pending_conflict.is_some()).unwrap();
        let conflict = snapshot.pending_conflict.unwrap();
        assert_eq!(conflict.local.text, "A");
        assert_eq!(conflict.remote.text, "A2");
        assert_eq!(snapshot.visible[0].text, "A");

        handle.send(QuoteCommand::ResolveConflict(Resolution::UseRemote));
        let snapshot = handle.wait_for(WAIT, |s| s.pending_conflict.is_none()).unwrap();
        assert_eq!(snapshot.visible[0].text, "A2");
        assert_eq!(snapshot.current.unwrap().text, "A2");

        handle.shutdown();
    }

    #[test]
    fn test_sync_failure_leaves_state_unchanged() {
        let handle =
            spawn_controller(seeded_store(), mock(Err("Could not connect to server".into())), None)
                .unwrap();

        handle.send(QuoteCommand::Sync);
        let snapshot = handle
            .wait_for(WAIT, |s| !s.is_syncing() && s.notice().is_some_and(|n| n.is_error()))
            .unwrap();

        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.syncs_completed, 0);
        assert!(snapshot.notice().unwrap().message.contains("Could not connect"));

        handle.shutdown();
    }

    #[test]
    fn test_add_during_fetch_survives_merge() {
        let (release, gate) = bounded(1);
        let source = Arc::new(GatedSource {
            gate,
            quotes: vec![Quote::new("Remote", "Z").with_id(10)],
        });
        let handle = spawn_controller(seeded_store(), source, None).unwrap();

        handle.send(QuoteCommand::Sync);
        handle.wait_for(WAIT, |s| s.is_syncing()).unwrap();

        handle.send(QuoteCommand::AddQuote {
            text: "Local".to_string(),
            category: "Z".to_string(),
        });
        handle.wait_for(WAIT, |s| s.total == 4).unwrap();

        release.send(()).unwrap();
        let snapshot = handle.wait_for(WAIT, |s| s.syncs_completed == 1).unwrap();

        let texts: Vec<_> = snapshot.visible.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(snapshot.total, 5);
        assert_eq!(&texts[3..], &["Local", "Remote"]);

        handle.shutdown();
    }

    #[test]
    fn test_concurrent_syncs_each_reconcile() {
        let remote = vec![Quote::new("B", "Y").with_id(2)];
        let handle = spawn_controller(seeded_store(), mock(Ok(remote)), None).unwrap();

        handle.send(QuoteCommand::Sync);
        handle.send(QuoteCommand::Sync);
        let snapshot = handle.wait_for(WAIT, |s| s.syncs_completed == 2).unwrap();

        // Second pass sees the first pass's addition as already consistent
        assert_eq!(snapshot.total, 4);

        handle.shutdown();
    }

    #[test]
    fn test_periodic_sync() {
        let remote = vec![Quote::new("B", "Y").with_id(2)];
        let handle =
            spawn_controller(seeded_store(), mock(Ok(remote)), Some(Duration::from_millis(100)))
                .unwrap();

        let snapshot = handle.wait_for(WAIT, |s| s.syncs_completed >= 1).unwrap();
        assert_eq!(snapshot.total, 4);

        handle.shutdown();
    }

    #[test]
    fn test_resolve_without_conflict_warns() {
        let handle = spawn_controller(seeded_store(), mock(Ok(vec![])), None).unwrap();

        handle.send(QuoteCommand::ResolveConflict(Resolution::KeepLocal));
        let snapshot = handle
            .wait_for(WAIT, |s| s.notice().map(|n| n.severity) == Some(Severity::Warning))
            .unwrap();
        assert_eq!(snapshot.total, 3);

        handle.shutdown();
    }
}
