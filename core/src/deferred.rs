//! Write-once deferred value with callback and `await` observers.
//!
//! A [`Deferred`] is a shared handle to a settlement cell. The cell holds the
//! settlement (once there is one) and a FIFO queue of reactions. Every
//! observation API is a reaction: `then`/`catch`/`finally` push closures,
//! `.await` pushes a oneshot sender. Reactions never run on the registering
//! call site; once the cell is settled a drain task pops them in order and
//! runs each with a clone of the settlement. Outside a tokio runtime there is
//! nowhere to spawn that task, so the queue drains inline instead.
//!
//! Only a [`Resolver`] can write the cell, and only the first write sticks.
//! A cell never stays pending once it has no writer left: a panicking handler
//! rejects the cell derived from it, and dropping the last resolver rejects
//! with [`DeferredFault::Abandoned`].

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::sync::oneshot;

use deferral_types::{AlreadySettled, DeferredFault, DeferredState, Settlement};

type Reaction<T, E> = Box<dyn FnOnce(Settlement<T, E>) + Send + 'static>;

struct Cell<T, E> {
    settlement: Option<Settlement<T, E>>,
    reactions: VecDeque<Reaction<T, E>>,
    draining: bool,
}

impl<T, E> Cell<T, E> {
    /// Mark the queue as owned by a new drain task if one is needed.
    fn claim_drain(&mut self) -> bool {
        if self.settlement.is_none() || self.draining || self.reactions.is_empty() {
            return false;
        }
        self.draining = true;
        true
    }
}

struct Shared<T, E> {
    cell: Mutex<Cell<T, E>>,
}

impl<T, E> Shared<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn new(settlement: Option<Settlement<T, E>>) -> Arc<Self> {
        Arc::new(Self {
            cell: Mutex::new(Cell {
                settlement,
                reactions: VecDeque::new(),
                draining: false,
            }),
        })
    }

    // The cell is consistent between statements, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, Cell<T, E>> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(self: &Arc<Self>, reaction: Reaction<T, E>) {
        let spawn = {
            let mut cell = self.lock();
            cell.reactions.push_back(reaction);
            cell.claim_drain()
        };
        if spawn {
            Self::spawn_drain(Arc::clone(self));
        }
    }

    fn settle(self: &Arc<Self>, settlement: Settlement<T, E>) -> Result<(), AlreadySettled> {
        let fulfilled = settlement.is_fulfilled();
        let spawn = {
            let mut cell = self.lock();
            if cell.settlement.is_some() {
                return Err(AlreadySettled);
            }
            cell.settlement = Some(settlement);
            cell.claim_drain()
        };
        tracing::debug!(fulfilled, "Deferred operation settled");
        if spawn {
            Self::spawn_drain(Arc::clone(self));
        }
        Ok(())
    }

    fn spawn_drain(shared: Arc<Self>) {
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { shared.drain() });
            }
            Err(_) => {
                tracing::debug!("No tokio runtime; draining deferred reactions inline");
                shared.drain();
            }
        }
    }

    fn drain(&self) {
        loop {
            let (reaction, settlement) = {
                let mut cell = self.lock();
                let Some(settlement) = cell.settlement.clone() else {
                    cell.draining = false;
                    return;
                };
                let Some(reaction) = cell.reactions.pop_front() else {
                    cell.draining = false;
                    return;
                };
                (reaction, settlement)
            };
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| reaction(settlement))) {
                tracing::error!(
                    "Deferred reaction panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    fn state(&self) -> DeferredState<T, E> {
        self.lock()
            .settlement
            .clone()
            .map_or(DeferredState::Pending, DeferredState::from)
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked with a non-string payload".to_string()
    }
}

/// Runs its hook when the last clone of a [`Resolver`] goes away.
struct AbandonGuard {
    on_abandon: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        if let Some(on_abandon) = self.on_abandon.take() {
            on_abandon();
        }
    }
}

/// Shared, read-only handle to a value that settles later.
///
/// Cloning the handle shares the same cell; every clone observes the same
/// settlement.
pub struct Deferred<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Write side of a [`Deferred`]. The first `resolve`/`reject` wins.
///
/// Dropping every clone without settling rejects the cell with
/// [`DeferredFault::Abandoned`].
pub struct Resolver<T, E> {
    shared: Arc<Shared<T, E>>,
    _guard: Arc<AbandonGuard>,
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            _guard: Arc::clone(&self._guard),
        }
    }
}

impl<T, E> Resolver<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<DeferredFault> + 'static,
{
    fn new(shared: &Arc<Shared<T, E>>) -> Self {
        let abandoned = Arc::clone(shared);
        let guard = AbandonGuard {
            on_abandon: Some(Box::new(move || {
                if abandoned
                    .settle(Settlement::Rejected(E::from(DeferredFault::Abandoned)))
                    .is_ok()
                {
                    tracing::warn!("Deferred operation dropped its last resolver unsettled");
                }
            })),
        };
        Self {
            shared: Arc::clone(shared),
            _guard: Arc::new(guard),
        }
    }

    pub fn resolve(&self, value: T) -> Result<(), AlreadySettled> {
        self.settle(Settlement::Fulfilled(value))
    }

    pub fn reject(&self, reason: E) -> Result<(), AlreadySettled> {
        self.settle(Settlement::Rejected(reason))
    }

    pub fn settle(&self, settlement: Settlement<T, E>) -> Result<(), AlreadySettled> {
        let result = self.shared.settle(settlement);
        if result.is_err() {
            tracing::warn!("Ignoring settlement of an already-settled deferred operation");
        }
        result
    }
}

impl<T, E> Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<DeferredFault> + 'static,
{
    /// Create a pending operation and hand its resolver to `executor`.
    ///
    /// The executor runs synchronously and should move the resolver into
    /// whatever eventually produces the result.
    pub fn new<F>(executor: F) -> Self
    where
        F: FnOnce(Resolver<T, E>),
    {
        let (deferred, resolver) = Self::pending();
        executor(resolver);
        deferred
    }

    #[must_use]
    pub fn pending() -> (Self, Resolver<T, E>) {
        let shared = Shared::new(None);
        let resolver = Resolver::new(&shared);
        (Self { shared }, resolver)
    }

    #[must_use]
    pub fn fulfilled(value: T) -> Self {
        Self {
            shared: Shared::new(Some(Settlement::Fulfilled(value))),
        }
    }

    #[must_use]
    pub fn rejected(reason: E) -> Self {
        Self {
            shared: Shared::new(Some(Settlement::Rejected(reason))),
        }
    }

    #[must_use]
    pub fn state(&self) -> DeferredState<T, E> {
        self.shared.state()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.shared.lock().settlement.is_none()
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// Run `on_fulfilled` with the value; rejections pass through untouched.
    ///
    /// If `on_fulfilled` panics, the returned operation rejects with
    /// [`DeferredFault::HandlerPanicked`].
    pub fn then<U, F>(&self, on_fulfilled: F) -> Deferred<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.chain(move |settlement| match settlement {
            Settlement::Fulfilled(value) => Settlement::Fulfilled(on_fulfilled(value)),
            Settlement::Rejected(reason) => Settlement::Rejected(reason),
        })
    }

    /// Recover from a rejection with the value `on_rejected` returns.
    pub fn catch<F>(&self, on_rejected: F) -> Deferred<T, E>
    where
        F: FnOnce(E) -> T + Send + 'static,
    {
        self.chain(move |settlement| match settlement {
            Settlement::Fulfilled(value) => Settlement::Fulfilled(value),
            Settlement::Rejected(reason) => Settlement::Fulfilled(on_rejected(reason)),
        })
    }

    /// Run `on_settled` after either outcome, then pass the settlement on.
    pub fn finally<F>(&self, on_settled: F) -> Deferred<T, E>
    where
        F: FnOnce() + Send + 'static,
    {
        self.chain(move |settlement| {
            on_settled();
            settlement
        })
    }

    fn chain<U, F>(&self, step: F) -> Deferred<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(Settlement<T, E>) -> Settlement<U, E> + Send + 'static,
    {
        let (derived, resolver) = Deferred::pending();
        self.shared.register(Box::new(move |settlement| {
            let next = match panic::catch_unwind(AssertUnwindSafe(|| step(settlement))) {
                Ok(next) => next,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!("Deferred handler panicked: {message}");
                    Settlement::Rejected(E::from(DeferredFault::HandlerPanicked(message)))
                }
            };
            // A fresh cell is only ever written here.
            let _ = resolver.shared.settle(next);
        }));
        derived
    }

    fn observe(&self) -> Settled<T, E> {
        let (tx, rx) = oneshot::channel();
        self.shared.register(Box::new(move |settlement| {
            // The awaiting side may have been dropped; nobody is left to tell.
            let _ = tx.send(settlement);
        }));
        Settled { rx: Some(rx) }
    }
}

impl<T, E> fmt::Debug for Deferred<T, E>
where
    T: Clone + Send + fmt::Debug + 'static,
    E: Clone + Send + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("state", &self.shared.state())
            .finish()
    }
}

/// Future returned by awaiting a [`Deferred`].
///
/// The reaction is queued when the future is created, so awaiters take their
/// place in registration order alongside callbacks.
#[must_use = "futures do nothing unless awaited"]
pub struct Settled<T, E> {
    rx: Option<oneshot::Receiver<Settlement<T, E>>>,
}

impl<T, E> Future for Settled<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let Some(rx) = this.rx.as_mut() else {
            return Poll::Pending;
        };
        match Pin::new(rx).poll(cx) {
            Poll::Ready(Ok(settlement)) => {
                this.rx = None;
                Poll::Ready(settlement.into_result())
            }
            // The queued reaction was dropped unrun, which only happens when
            // the runtime tears the drain task down. Nothing will wake us.
            Poll::Ready(Err(_)) => {
                this.rx = None;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T, E> IntoFuture for Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<DeferredFault> + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = Settled<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        self.observe()
    }
}

impl<T, E> IntoFuture for &Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<DeferredFault> + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = Settled<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        self.observe()
    }
}
