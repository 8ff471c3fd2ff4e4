//! Lifecycle of the single in-flight request behind a search box.
//!
//! A [`RequestManager`] is owned by its consumer. Every [`RequestManager::observe`]
//! call supersedes the previous attempt: its cancellation token fires, its task is
//! aborted, and anything it might still produce is discarded. Consumers read the
//! published [`Snapshot`] through [`RequestManager::snapshot`] or a
//! [`watch::Receiver`] from [`RequestManager::subscribe`].

use std::{fmt, sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{fetch::Fetcher, query::RequestTarget};

/// How long a fresh error stays flagged as newly visible.
pub const DEFAULT_ERROR_WINDOW: Duration = Duration::from_millis(1400);

/// One failed attempt, tagged with its own correlation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    id: Uuid,
    message: String,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), message: message.into() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id: {})", self.message, self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    Loading,
    Succeeded(T),
    Failed(RequestError),
}

impl<T> RequestState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    /// Terminal outcome reached for the current attempt.
    pub fn is_settled(&self) -> bool {
        matches!(self, RequestState::Succeeded(_) | RequestState::Failed(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            RequestState::Succeeded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RequestError> {
        match self {
            RequestState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// What the consumer sees.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Number of the attempt this state belongs to; bumps on every observe/cancel.
    pub attempt: u64,
    pub state: RequestState<T>,
    /// True for a short window right after a failure is published.
    pub error_visible: bool,
}

impl<T> Snapshot<T> {
    fn idle() -> Self {
        Self { attempt: 0, state: RequestState::Idle, error_visible: false }
    }

    pub fn loaded(&self) -> bool {
        self.state.is_settled()
    }

    pub fn data(&self) -> Option<&T> {
        self.state.data()
    }

    pub fn error(&self) -> Option<&RequestError> {
        self.state.error()
    }
}

struct Attempt {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Attempt {
    fn stop(self) {
        self.token.cancel();
        self.task.abort();
    }
}

pub struct RequestManager<F: Fetcher> {
    fetcher: Arc<F>,
    tx: Arc<watch::Sender<Snapshot<F::Output>>>,
    current: Option<Attempt>,
    error_window: Duration,
}

impl<F: Fetcher> RequestManager<F> {
    pub fn new(fetcher: F) -> Self {
        let (tx, _rx) = watch::channel(Snapshot::idle());
        Self {
            fetcher: Arc::new(fetcher),
            tx: Arc::new(tx),
            current: None,
            error_window: DEFAULT_ERROR_WINDOW,
        }
    }

    pub fn with_error_window(mut self, window: Duration) -> Self {
        self.error_window = window;
        self
    }

    /// Start fetching `target`, superseding whatever was in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn observe(&mut self, target: RequestTarget) {
        let mut superseded = false;
        let mut attempt = 0;
        self.tx.send_modify(|snap| {
            superseded = snap.state.is_loading();
            snap.attempt += 1;
            snap.state = RequestState::Loading;
            snap.error_visible = false;
            attempt = snap.attempt;
        });

        if let Some(prev) = self.current.take() {
            prev.stop();
        }
        if superseded {
            debug!(attempt = attempt - 1, "request superseded");
        }

        info!(attempt, target = %target.redacted(), "request started");

        let token = CancellationToken::new();
        let task = tokio::spawn(run_attempt(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.tx),
            target,
            attempt,
            token.clone(),
            self.error_window,
        ));

        self.current = Some(Attempt { token, task });
    }

    /// Abort the in-flight request, if any, and go back to `Idle`.
    /// Does nothing once the attempt has settled.
    pub fn cancel(&mut self) {
        let mut cancelled = None;
        self.tx.send_if_modified(|snap| {
            if !snap.state.is_loading() {
                return false;
            }
            cancelled = Some(snap.attempt);
            snap.attempt += 1;
            snap.state = RequestState::Idle;
            snap.error_visible = false;
            true
        });

        if let Some(attempt) = cancelled {
            if let Some(prev) = self.current.take() {
                prev.stop();
            }
            info!(attempt, "request cancelled");
        }
    }

    pub fn state(&self) -> RequestState<F::Output> {
        self.tx.borrow().state.clone()
    }

    pub fn snapshot(&self) -> Snapshot<F::Output> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<F::Output>> {
        self.tx.subscribe()
    }

    /// Wait until the current attempt is no longer loading.
    pub async fn settled(&self) -> Snapshot<F::Output> {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(|snap| !snap.state.is_loading()).await {
            Ok(snap) => snap.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// Wait until a highlighted error has faded (or was replaced).
    pub async fn error_dismissed(&self) -> Snapshot<F::Output> {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(|snap| !snap.error_visible).await {
            Ok(snap) => snap.clone(),
            Err(_) => self.snapshot(),
        }
    }
}

impl<F: Fetcher> Drop for RequestManager<F> {
    fn drop(&mut self) {
        if let Some(attempt) = self.current.take() {
            attempt.stop();
        }
    }
}

async fn run_attempt<F: Fetcher>(
    fetcher: Arc<F>,
    tx: Arc<watch::Sender<Snapshot<F::Output>>>,
    target: RequestTarget,
    attempt: u64,
    token: CancellationToken,
    error_window: Duration,
) {
    let outcome = tokio::select! {
        biased;
        _ = token.cancelled() => return,
        res = fetcher.fetch(&target) => res,
    };

    let failure = match outcome {
        Ok(data) => {
            if publish(&tx, attempt, &token, |snap| {
                snap.state = RequestState::Succeeded(data);
                snap.error_visible = false;
            }) {
                info!(attempt, "request succeeded");
            }
            return;
        }
        Err(err) => RequestError::new(err.to_string()),
    };

    let id = failure.id();
    let message = failure.message().to_string();
    if !publish(&tx, attempt, &token, |snap| {
        snap.state = RequestState::Failed(failure);
        snap.error_visible = true;
    }) {
        return;
    }
    warn!(attempt, error_id = %id, error = %message, "request failed");

    tokio::select! {
        _ = token.cancelled() => {}
        _ = tokio::time::sleep(error_window) => {
            publish(&tx, attempt, &token, |snap| snap.error_visible = false);
        }
    }
}

/// Apply `update` only if `attempt` is still the current one.
fn publish<T>(
    tx: &watch::Sender<Snapshot<T>>,
    attempt: u64,
    token: &CancellationToken,
    update: impl FnOnce(&mut Snapshot<T>),
) -> bool {
    let applied = tx.send_if_modified(|snap| {
        if snap.attempt != attempt || token.is_cancelled() {
            return false;
        }
        update(snap);
        true
    });

    if !applied {
        debug!(attempt, "discarding result of stale request");
    }
    applied
}
