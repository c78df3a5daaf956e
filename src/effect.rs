//! Background color effect ("rave mode").

use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::dispatch::Dispatcher;
use crate::errors::Error;
use crate::runtime::{self, JoinHandle};
use crate::transport::{SharedHistory, lock_history};
use crate::types::{Color, Command, NamedColor};

type Result<T> = std::result::Result<T, Error>;

/// One running effect: its cancellation token and the task driving it.
struct EffectSession {
    id: Uuid,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// What a spawned effect task needs to run.
struct EffectRun {
    id: Uuid,
    targets: Vec<Ipv4Addr>,
    interval: Duration,
    palette: Vec<NamedColor>,
    cancel: CancellationToken,
}

/// Held by an effect task for its whole life. Keeps `count` equal to the
/// number of live tasks and records a panic in the history while the task
/// unwinds, so a crash is visible before anyone stops the session.
struct ActiveTask {
    id: Uuid,
    count: Arc<AtomicUsize>,
    history: SharedHistory,
}

impl ActiveTask {
    fn enter(id: Uuid, count: &Arc<AtomicUsize>, history: &SharedHistory) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        ActiveTask {
            id,
            count: Arc::clone(count),
            history: Arc::clone(history),
        }
    }

    fn record_error(&self, message: &str) {
        let message = format!("effect session {}: {message}", self.id);
        lock_history(&self.history).record_error(None, &message);
    }
}

impl Drop for ActiveTask {
    fn drop(&mut self) {
        if std::thread::panicking() {
            error!("effect session {} panicked", self.id);
            self.record_error("task panicked");
        }
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs at most one color-cycling task at a time.
///
/// Starting while a session runs first stops that session (bounded by the
/// stop grace period) and only then spawns the new one.
pub struct EffectLoop {
    dispatcher: Dispatcher,
    history: SharedHistory,
    stop_grace: Duration,
    session: Option<EffectSession>,
    active: Arc<AtomicUsize>,
}

impl EffectLoop {
    pub(crate) fn new(dispatcher: Dispatcher, history: SharedHistory, stop_grace: Duration) -> Self {
        EffectLoop {
            dispatcher,
            history,
            stop_grace,
            session: None,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Start cycling colors on `targets` every `interval`.
    ///
    /// Colors are drawn uniformly from `palette` entries that name a
    /// [`NamedColor`]; with no usable entries each tick uses a random RGB
    /// color. Returns the new session's id.
    pub async fn start<S: AsRef<str>>(
        &mut self,
        targets: &[Ipv4Addr],
        interval: Duration,
        palette: &[S],
    ) -> Uuid {
        self.stop().await;

        let palette = parse_palette(palette);
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let guard = ActiveTask::enter(id, &self.active, &self.history);
        let run = EffectRun {
            id,
            targets: targets.to_vec(),
            interval,
            palette,
            cancel: cancel.clone(),
        };

        let handle = runtime::spawn(run_effect(run, self.dispatcher.clone(), guard));

        info!(
            "effect session {id} started on {} device(s), interval {interval:?}",
            targets.len()
        );
        self.session = Some(EffectSession { id, cancel, handle });
        id
    }

    /// Cancel the running session and wait for it, at most the grace period.
    ///
    /// A task that outlives the grace period is abandoned; it still exits on
    /// its own once it observes the cancellation. No-op when idle. A task
    /// that panicked has already recorded the failure in the history.
    pub async fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        session.cancel.cancel();

        match runtime::timeout(self.stop_grace, session.handle).await {
            Ok(Ok(())) => info!("effect session {} stopped", session.id),
            Ok(Err(e)) => warn!("effect session {} had failed: {e}", session.id),
            Err(_) => warn!(
                "effect session {} did not stop within {:?}, abandoning it",
                session.id, self.stop_grace
            ),
        }
    }

    /// True while a session exists and its task has not exited.
    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| !s.handle.is_finished())
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Number of effect tasks still alive, abandoned ones included.
    pub fn active_tasks(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    fn cancel_token(&self) -> Option<CancellationToken> {
        self.session.as_ref().map(|s| s.cancel.clone())
    }
}

impl Drop for EffectLoop {
    fn drop(&mut self) {
        if let Some(session) = &self.session {
            session.cancel.cancel();
        }
    }
}

fn parse_palette<S: AsRef<str>>(names: &[S]) -> Vec<NamedColor> {
    names
        .iter()
        .filter_map(|name| match NamedColor::from_str(name.as_ref()) {
            Ok(color) => Some(color),
            Err(_) => {
                debug!("dropping unknown palette color {:?}", name.as_ref());
                None
            }
        })
        .collect()
}

fn pick_color(palette: &[NamedColor]) -> Color {
    if palette.is_empty() {
        Color::random()
    } else {
        palette[fastrand::usize(..palette.len())].color()
    }
}

async fn run_effect(run: EffectRun, dispatcher: Dispatcher, guard: ActiveTask) {
    if let Err(e) = effect_loop(&dispatcher, &run).await {
        error!("effect session {} terminated: {e}", run.id);
        guard.record_error(&e.to_string());
    }
    debug!("effect session {} exited", run.id);
}

async fn effect_loop(dispatcher: &Dispatcher, run: &EffectRun) -> Result<()> {
    while !run.cancel.is_cancelled() {
        let command = Command::SetColor(pick_color(&run.palette));
        tokio::select! {
            biased;
            () = run.cancel.cancelled() => break,
            sent = dispatcher.try_apply(&command, &run.targets) => sent?,
        }
        tokio::select! {
            biased;
            () = run.cancel.cancelled() => break,
            () = runtime::sleep(run.interval) => {}
        }
    }
    Ok(())
}
