//! Async driver for a [`CommandPalette`].
//!
//! One task owns the palette and multiplexes three event sources: host
//! commands, remote replies and the debounce deadline. Remote searches run
//! as their own tasks and report back with the generation they were issued
//! for; they are never aborted, stale replies are simply discarded. After
//! every event the driver publishes a fresh [`PaletteSnapshot`].

use std::future::pending;
use std::sync::Arc;
use std::time::Instant as StdInstant;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::core::{CategoryFilter, PaletteKey, RemoteHit};
use crate::error::PaletteResult;
use crate::palette::{CommandPalette, PaletteSnapshot, RemoteRequest};
use crate::services::RemoteSearch;

/// Events the host raises into the palette.
#[derive(Debug, Clone)]
pub enum PaletteCommand {
    Open,
    Close,
    Toggle,
    /// Outside click or blur.
    Dismiss,
    Input(String),
    Key(PaletteKey),
    Select(usize),
    UseRecent(usize),
    Filter(CategoryFilter),
    ClearRecent,
    Shutdown,
}

struct RemoteReply {
    generation: u64,
    result: PaletteResult<Vec<RemoteHit>>,
}

pub struct PaletteDriver {
    palette: CommandPalette,
    remote: Option<Arc<dyn RemoteSearch>>,
    snapshots: watch::Sender<PaletteSnapshot>,
}

/// Host-side handle to a running driver.
#[derive(Clone)]
pub struct PaletteHandle {
    commands: mpsc::UnboundedSender<PaletteCommand>,
    snapshots: watch::Receiver<PaletteSnapshot>,
}

impl PaletteHandle {
    /// Returns `false` once the driver has stopped.
    pub fn send(&self, command: PaletteCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn snapshot(&self) -> PaletteSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PaletteSnapshot> {
        self.snapshots.clone()
    }
}

/// Start a driver on the current tokio runtime.
pub fn spawn(
    palette: CommandPalette,
    remote: Option<Arc<dyn RemoteSearch>>,
) -> (PaletteHandle, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (driver, snapshot_rx) = PaletteDriver::new(palette, remote);
    let task = tokio::spawn(driver.run(command_rx));
    (
        PaletteHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        },
        task,
    )
}

impl PaletteDriver {
    pub fn new(
        palette: CommandPalette,
        remote: Option<Arc<dyn RemoteSearch>>,
    ) -> (Self, watch::Receiver<PaletteSnapshot>) {
        let (snapshots, snapshot_rx) = watch::channel(palette.snapshot());
        (
            Self {
                palette,
                remote,
                snapshots,
            },
            snapshot_rx,
        )
    }

    /// Run until `Shutdown` or until every command sender is dropped.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<PaletteCommand>) {
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<RemoteReply>();

        loop {
            let deadline = self.palette.next_deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(PaletteCommand::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                Some(reply) = reply_rx.recv() => {
                    self.palette.apply_remote(reply.generation, reply.result);
                }
                _ = wait_for(deadline) => {
                    if let Some(request) = self.palette.tick(now()) {
                        self.dispatch(request, &reply_tx);
                    }
                }
            }
            self.snapshots.send_replace(self.palette.snapshot());
        }

        tracing::debug!("palette driver stopped");
    }

    fn handle(&mut self, command: PaletteCommand) {
        match command {
            PaletteCommand::Open => self.palette.open(),
            PaletteCommand::Close => self.palette.close(),
            PaletteCommand::Toggle => self.palette.toggle(),
            PaletteCommand::Dismiss => self.palette.dismiss(),
            PaletteCommand::Input(text) => self.palette.set_query(&text, now()),
            PaletteCommand::Key(key) => {
                if let Some(selection) = self.palette.handle_key(key) {
                    tracing::debug!(path = %selection.candidate.path, "result selected");
                }
            }
            PaletteCommand::Select(index) => {
                if let Some(selection) = self.palette.select(index) {
                    tracing::debug!(path = %selection.candidate.path, "result selected");
                }
            }
            PaletteCommand::UseRecent(index) => {
                self.palette.use_recent(index, now());
            }
            PaletteCommand::Filter(filter) => self.palette.set_category_filter(filter),
            PaletteCommand::ClearRecent => {
                if let Err(e) = self.palette.clear_recent() {
                    tracing::warn!(error = %e, "failed to clear recent searches");
                }
            }
            // handled by the run loop
            PaletteCommand::Shutdown => {}
        }
    }

    fn dispatch(&mut self, request: RemoteRequest, replies: &mpsc::UnboundedSender<RemoteReply>) {
        let Some(remote) = self.remote.clone() else {
            self.palette.apply_remote(request.generation, Ok(Vec::new()));
            return;
        };

        let replies = replies.clone();
        tokio::spawn(async move {
            let result = remote.search(&request.query).await;
            let reply = RemoteReply {
                generation: request.generation,
                result,
            };
            if replies.send(reply).is_err() {
                tracing::debug!(generation = request.generation, "driver stopped, dropping remote reply");
            }
        });
    }
}

/// Palette time, taken from tokio's clock so paused-time tests stay
/// consistent with `sleep_until`.
fn now() -> StdInstant {
    Instant::now().into_std()
}

async fn wait_for(deadline: Option<StdInstant>) {
    match deadline {
        Some(deadline) => sleep_until(Instant::from_std(deadline)).await,
        None => pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::{Catalog, PaletteState};
    use crate::error::PaletteError;
    use crate::services::RecentSearches;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Backend answering each query after a per-query delay.
    #[derive(Default)]
    struct ScriptedRemote {
        delays: HashMap<String, Duration>,
        failing: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RemoteSearch for ScriptedRemote {
        async fn search(&self, query: &str) -> PaletteResult<Vec<RemoteHit>> {
            self.calls.lock().unwrap().push(query.to_string());
            let delay = self.delays.get(query).copied().unwrap_or_default();
            tokio::time::sleep(delay).await;
            if self.failing {
                return Err(PaletteError::Remote("network unreachable".into()));
            }
            Ok(vec![RemoteHit {
                id: serde_json::json!(format!("{}-1", query)),
                title: format!("{} result", query),
                subtitle: None,
                kind: Some("document".to_string()),
                url: format!("/documents/{}", query),
                category: None,
                score: None,
            }])
        }
    }

    fn start(remote: Arc<ScriptedRemote>) -> (PaletteHandle, Arc<Mutex<Vec<String>>>) {
        let config = Config::default();
        let visited = Arc::new(Mutex::new(Vec::new()));
        let sink = visited.clone();
        let palette = CommandPalette::new(
            &config,
            Arc::new(Catalog::builtin()),
            RecentSearches::in_memory(&config.recent),
            move |path: &str| sink.lock().unwrap().push(path.to_string()),
        );
        let remote: Arc<dyn RemoteSearch> = remote;
        let (handle, _task) = spawn(palette, Some(remote));
        (handle, visited)
    }

    async fn wait(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_dispatches_once() {
        let remote = Arc::new(ScriptedRemote::default());
        let (handle, _) = start(remote.clone());

        handle.send(PaletteCommand::Open);
        for text in ["t", "te", "ten", "tend", "tender"] {
            handle.send(PaletteCommand::Input(text.to_string()));
            wait(50).await;
        }
        assert!(remote.calls.lock().unwrap().is_empty());

        wait(400).await;
        assert_eq!(*remote.calls.lock().unwrap(), vec!["tender"]);

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.state, PaletteState::OpenResults);
        assert_eq!(snapshot.groups[0].category, "Pages");
        assert_eq!(snapshot.groups[1].category, "Documents");
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_reply_does_not_regress_results() {
        let remote = Arc::new(ScriptedRemote {
            delays: HashMap::from([
                ("risk".to_string(), Duration::from_millis(2000)),
                ("tender".to_string(), Duration::from_millis(10)),
            ]),
            ..ScriptedRemote::default()
        });
        let (handle, _) = start(remote.clone());

        handle.send(PaletteCommand::Open);
        handle.send(PaletteCommand::Input("risk".into()));
        wait(350).await;
        handle.send(PaletteCommand::Input("tender".into()));
        wait(400).await;

        let fresh = handle.snapshot();
        assert_eq!(fresh.query, "tender");
        assert_eq!(fresh.state, PaletteState::OpenResults);

        // the slow "risk" reply lands now and must be ignored
        wait(3000).await;
        assert_eq!(*remote.calls.lock().unwrap(), vec!["risk", "tender"]);
        let settled = handle.snapshot();
        let ids: Vec<&str> = settled
            .groups
            .iter()
            .flat_map(|g| g.results.iter().map(|r| r.candidate.id.as_str()))
            .collect();
        assert!(ids.contains(&"tender-1"));
        assert!(!ids.contains(&"risk-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_failure_degrades_to_local() {
        let remote = Arc::new(ScriptedRemote {
            failing: true,
            ..ScriptedRemote::default()
        });
        let (handle, _) = start(remote);

        handle.send(PaletteCommand::Open);
        handle.send(PaletteCommand::Input("invoice".into()));
        wait(500).await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.state, PaletteState::OpenResults);
        assert_eq!(snapshot.groups[0].results[0].candidate.id, "billing");
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_navigates_and_closes() {
        let remote = Arc::new(ScriptedRemote::default());
        let (handle, visited) = start(remote);

        handle.send(PaletteCommand::Open);
        handle.send(PaletteCommand::Input("dash".into()));
        wait(500).await;
        handle.send(PaletteCommand::Key(PaletteKey::Enter));
        wait(10).await;

        assert_eq!(*visited.lock().unwrap(), vec!["/dashboard"]);
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.state, PaletteState::Closed);

        handle.send(PaletteCommand::Open);
        wait(10).await;
        assert_eq!(handle.snapshot().recent, vec!["dash"]);

        handle.send(PaletteCommand::ClearRecent);
        wait(10).await;
        assert!(handle.snapshot().recent.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels_pending_debounce() {
        let remote = Arc::new(ScriptedRemote::default());
        let (handle, _) = start(remote.clone());

        handle.send(PaletteCommand::Open);
        handle.send(PaletteCommand::Input("evm".into()));
        wait(100).await;
        handle.send(PaletteCommand::Dismiss);
        wait(1000).await;

        assert!(remote.calls.lock().unwrap().is_empty());
        assert_eq!(handle.snapshot().state, PaletteState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_driver() {
        let config = Config::default();
        let palette = CommandPalette::new(
            &config,
            Arc::new(Catalog::builtin()),
            RecentSearches::in_memory(&config.recent),
            |_: &str| {},
        );
        let (handle, task) = spawn(palette, None);

        handle.send(PaletteCommand::Shutdown);
        task.await.unwrap();
        assert!(!handle.send(PaletteCommand::Open));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_after_shutdown_is_dropped() {
        let remote = Arc::new(ScriptedRemote {
            delays: HashMap::from([("risk".to_string(), Duration::from_millis(1000))]),
            ..ScriptedRemote::default()
        });
        let (handle, _) = start(remote.clone());

        handle.send(PaletteCommand::Open);
        handle.send(PaletteCommand::Input("risk".into()));
        wait(350).await;
        assert_eq!(*remote.calls.lock().unwrap(), vec!["risk"]);

        handle.send(PaletteCommand::Shutdown);
        wait(2000).await;
        assert!(!handle.send(PaletteCommand::Open));
        assert_eq!(handle.snapshot().state, PaletteState::OpenLoading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_remote_source_results_settle() {
        let config = Config::default();
        let palette = CommandPalette::new(
            &config,
            Arc::new(Catalog::builtin()),
            RecentSearches::in_memory(&config.recent),
            |_: &str| {},
        );
        let (handle, _task) = spawn(palette, None);

        handle.send(PaletteCommand::Open);
        handle.send(PaletteCommand::Input("tender".into()));
        wait(400).await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.state, PaletteState::OpenResults);
        assert_eq!(snapshot.groups.len(), 1);
    }
}
