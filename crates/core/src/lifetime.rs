//! Owner lifetimes and cancellable task handles.
//!
//! Loaders never hand spawned work a reference to themselves. Instead they own
//! a [`Lifetime`] and give the work a [`Liveness`] watcher plus clones of the
//! collaborators it needs. Dropping the loader drops the lifetime, which
//! releases every watcher; work that has not delivered its completion yet is
//! abandoned at its next suspension point and the completion is never run.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Owner side of a lifetime.
///
/// Dropping it releases every [`Liveness`] obtained from it.
#[derive(Debug)]
pub struct Lifetime {
    tx: watch::Sender<()>,
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifetime {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(());
        Self { tx }
    }

    /// A watcher tied to this lifetime.
    pub fn liveness(&self) -> Liveness {
        Liveness { rx: self.tx.subscribe() }
    }
}

/// Watcher side of a [`Lifetime`].
#[derive(Debug, Clone)]
pub struct Liveness {
    rx: watch::Receiver<()>,
}

impl Liveness {
    /// Whether the owning [`Lifetime`] still exists.
    pub fn is_alive(&self) -> bool {
        // nothing is ever sent, so the only observable change is the sender closing
        self.rx.has_changed().is_ok()
    }

    /// Resolves once the owning [`Lifetime`] has been dropped.
    pub async fn released(&mut self) {
        while self.rx.changed().await.is_ok() {}
    }
}

/// Handle to work started through a loader's callback API.
///
/// Dropping the handle detaches the work; it keeps running and still delivers
/// its completion while the owner is alive.
#[derive(Debug)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Stop the work and guarantee its completion is not delivered afterwards.
    ///
    /// Work already handed to a transport or store worker may still finish
    /// there; only its result is discarded.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.join.abort();
    }

    /// Whether the task has run to an end (delivered, abandoned, or cancelled).
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the task to end.
    pub async fn finished(self) {
        if let Err(err) = self.join.await
            && err.is_panic()
        {
            tracing::warn!("feed task panicked: {err}");
        }
    }
}

/// Spawn `work` on the current Tokio runtime and hand its output to `completion`.
///
/// `completion` runs only if `liveness` still holds and the returned handle has
/// not been cancelled when `work` finishes. If the owner is released while
/// `work` is suspended, `work` is dropped at that point.
///
/// # Panics
///
/// Panics when called outside a Tokio runtime.
pub fn spawn_guarded<W, T, C>(mut liveness: Liveness, work: W, completion: C) -> TaskHandle
where
    W: Future<Output = T> + Send + 'static,
    T: Send + 'static,
    C: FnOnce(T) + Send + 'static,
{
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);

    let join = tokio::spawn(async move {
        let output = tokio::select! {
            biased;
            _ = liveness.released() => {
                tracing::trace!("owner released before work finished; dropping completion");
                return;
            }
            output = work => output,
        };

        if flag.load(Ordering::SeqCst) || !liveness.is_alive() {
            tracing::trace!("owner released or task cancelled; dropping completion");
            return;
        }

        completion(output);
    });

    TaskHandle { cancelled, join }
}
