//! # Marquee Runtime
//!
//! The [`Store`] coordinates reducer execution and effect handling for a
//! booking session.
//!
//! ## Responsibilities
//!
//! - **Serialised reduction**: the reducer runs under the state write lock, so
//!   every action is fully applied before the next one is accepted
//! - **Effect execution**: delays, futures and effect groups run on tokio tasks;
//!   actions they produce are fed back into the store
//! - **Cancellation**: effects wrapped in `Effect::Cancellable` are registered
//!   under their id and can be aborted with `Effect::Cancel` or [`Store::cancel`]
//! - **Observation**: actions produced by effects are broadcast to subscribers
//!
//! ## Example
//!
//! ```ignore
//! use marquee_runtime::Store;
//!
//! let store = Store::new(SessionState::default(), SessionReducer::new(), environment);
//!
//! store.send(SessionAction::ToggleSeat { seat }).await?;
//! let total = store.state(|s| s.total_amount).await;
//! ```

use marquee_core::{
    effect::{Effect, EffectId},
    reducer::Reducer,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Metric names recorded by the store
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Effects started by an action did not finish in time
        #[error("Timed out waiting for effects to complete")]
        Timeout,
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send`]. Counts the effects started directly by one
/// action; actions fed back by those effects get their own handles.
#[derive(Clone)]
pub struct EffectHandle {
    pending: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let pending = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            pending: Arc::clone(&pending),
            completion: rx,
        };
        let tracking = EffectTracking {
            pending,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that is already complete
    #[must_use]
    pub fn completed() -> Self {
        let (_tx, rx) = watch::channel(());
        Self {
            pending: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Wait until every tracked effect has finished (or been cancelled)
    pub async fn wait(&mut self) {
        while self.pending.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires first.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_elapsed| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Internal: counter shared between an [`EffectHandle`] and the tasks it tracks
#[derive(Clone)]
struct EffectTracking {
    pending: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: decrements the tracking counter when the effect task ends,
/// including when it is aborted
struct TrackingGuard(EffectTracking);

impl Drop for TrackingGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Internal: decrements the store-wide pending counter used by shutdown
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Internal: a cancellable task registered under an [`EffectId`]
struct Registration {
    generation: u64,
    abort: tokio::task::AbortHandle,
}

type Registry = Arc<Mutex<HashMap<EffectId, Registration>>>;

fn lock(
    registry: &Mutex<HashMap<EffectId, Registration>>,
) -> MutexGuard<'_, HashMap<EffectId, Registration>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store module - the runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicU64, AtomicUsize, Duration, Effect, EffectHandle, EffectId,
        EffectTracking, Ordering, PendingGuard, Reducer, Registration, Registry, RwLock,
        StoreError, TrackingGuard, lock, metrics,
    };
    use futures::future::BoxFuture;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::broadcast;
    use tokio::task::JoinHandle;

    /// The Store - runtime coordinator for a reducer
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        cancellations: Registry,
        next_generation: Arc<AtomicU64>,
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Clone + Send + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 64)
        }

        /// Create a store whose action broadcast channel buffers `capacity`
        /// actions per subscriber
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                cancellations: Arc::new(Mutex::new(HashMap::new())),
                next_generation: Arc::new(AtomicU64::new(0)),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// The reducer runs synchronously under the write lock; effects are
        /// started before this returns but may still be running.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            self.send_then(action, |_| ()).await.map(|(handle, ())| handle)
        }

        /// Send an action and read the resulting state under the same lock
        ///
        /// `inspect` sees the state exactly as the reducer left it, before any
        /// other action can run.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action, inspect), name = "store_send")]
        pub async fn send_then<F, T>(
            &self,
            action: A,
            inspect: F,
        ) -> Result<(EffectHandle, T), StoreError>
        where
            F: FnOnce(&S) -> T,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                ::metrics::counter!(metrics::ACTIONS_REJECTED).increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            ::metrics::counter!(metrics::ACTIONS_TOTAL).increment(1);
            let (handle, tracking) = EffectHandle::new();

            let (effects, inspected) = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                ::metrics::histogram!(metrics::REDUCER_DURATION)
                    .record(start.elapsed().as_secs_f64());

                (effects, inspect(&*state))
            };

            tracing::trace!("Reducer returned {} effects", effects.len());
            for effect in effects {
                self.execute_effect(effect, &tracking);
            }

            Ok((handle, inspected))
        }

        /// Read current state via a closure
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Subscribe to actions produced by effects
        ///
        /// Actions sent directly through [`Store::send`] are not broadcast.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Abort the effect registered under `id`
        ///
        /// Returns `true` if a pending effect was aborted, `false` if nothing
        /// was registered or it had already finished.
        pub fn cancel(&self, id: &EffectId) -> bool {
            let registration = lock(&self.cancellations).remove(id);
            match registration {
                Some(registration) if !registration.abort.is_finished() => {
                    registration.abort.abort();
                    ::metrics::counter!(metrics::EFFECTS_CANCELLED).increment(1);
                    tracing::debug!(effect_id = %id, "Cancelled effect");
                    true
                },
                _ => {
                    tracing::trace!(effect_id = %id, "Nothing to cancel");
                    false
                },
            }
        }

        /// Returns true if an effect is registered and still pending under `id`
        #[must_use]
        pub fn is_scheduled(&self, id: &EffectId) -> bool {
            lock(&self.cancellations)
                .get(id)
                .is_some_and(|registration| !registration.abort.is_finished())
        }

        /// Number of effects currently running across all actions
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::SeqCst)
        }

        /// Stop accepting actions and wait for running effects to finish
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effects are still running
        /// when the timeout expires.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::Release);

            let deadline = tokio::time::Instant::now() + timeout;
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);
                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }

                if tokio::time::Instant::now() >= deadline {
                    tracing::error!(pending_effects = pending, "Shutdown timed out");
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Start an effect returned by the reducer
        ///
        /// Cancellable effects are registered before `send` returns, so a
        /// `Cancel` dispatched by the next action always finds them.
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Cancel(id) => {
                    self.cancel(&id);
                },
                Effect::Parallel(effects) => {
                    for effect in effects {
                        self.execute_effect(effect, tracking);
                    }
                },
                Effect::Cancellable { id, effect } => {
                    let future = self.tracked(self.run_effect(*effect), tracking);
                    drop(self.register(id, future));
                },
                effect @ (Effect::Future(_) | Effect::Delay { .. } | Effect::Sequential(_)) => {
                    let future = self.tracked(self.run_effect(effect), tracking);
                    drop(tokio::spawn(future));
                },
            }
        }

        /// Build the future that runs an effect to completion, feeding
        /// produced actions back into the store
        fn run_effect(&self, effect: Effect<A>) -> BoxFuture<'static, ()> {
            let store = self.clone();
            Box::pin(async move {
                match effect {
                    Effect::None => {},
                    Effect::Future(future) => {
                        ::metrics::counter!(metrics::EFFECTS_EXECUTED, "type" => "future")
                            .increment(1);
                        if let Some(action) = future.await {
                            store.feed_back(action).await;
                        }
                    },
                    Effect::Delay { duration, action } => {
                        ::metrics::counter!(metrics::EFFECTS_EXECUTED, "type" => "delay")
                            .increment(1);
                        tracing::trace!(?duration, "Executing Effect::Delay");
                        tokio::time::sleep(duration).await;
                        store.feed_back(*action).await;
                    },
                    Effect::Parallel(effects) => {
                        let runs = effects.into_iter().map(|effect| store.run_effect(effect));
                        futures::future::join_all(runs).await;
                    },
                    Effect::Sequential(effects) => {
                        for effect in effects {
                            store.run_effect(effect).await;
                        }
                    },
                    Effect::Cancellable { id, effect } => {
                        let inner = store.run_effect(*effect);
                        match store.register(id, inner).await {
                            Ok(()) => {},
                            Err(error) if error.is_cancelled() => {
                                tracing::trace!("Nested cancellable effect was cancelled");
                            },
                            Err(error) => {
                                tracing::error!(%error, "Nested cancellable effect failed");
                            },
                        }
                    },
                    Effect::Cancel(id) => {
                        store.cancel(&id);
                    },
                }
            })
        }

        /// Wrap a future so it counts against `tracking` and the shutdown
        /// counter until it finishes or is dropped
        fn tracked(
            &self,
            future: BoxFuture<'static, ()>,
            tracking: &EffectTracking,
        ) -> BoxFuture<'static, ()> {
            tracking.increment();
            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            let guards = (
                TrackingGuard(tracking.clone()),
                PendingGuard(Arc::clone(&self.pending_effects)),
            );

            Box::pin(async move {
                let _guards = guards;
                future.await;
            })
        }

        /// Spawn a future under an id, replacing (and aborting) any effect
        /// previously registered under the same id
        fn register(&self, id: EffectId, future: BoxFuture<'static, ()>) -> JoinHandle<()> {
            let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
            let registry = Arc::clone(&self.cancellations);
            let task_id = id.clone();

            let handle = tokio::spawn(async move {
                future.await;
                let mut registrations = lock(&registry);
                if registrations
                    .get(&task_id)
                    .is_some_and(|registration| registration.generation == generation)
                {
                    registrations.remove(&task_id);
                }
            });

            let previous = lock(&self.cancellations).insert(
                id.clone(),
                Registration {
                    generation,
                    abort: handle.abort_handle(),
                },
            );
            if let Some(previous) = previous {
                if !previous.abort.is_finished() {
                    previous.abort.abort();
                    ::metrics::counter!(metrics::EFFECTS_CANCELLED).increment(1);
                    tracing::debug!(effect_id = %id, "Replaced pending effect");
                }
            }

            handle
        }

        /// Broadcast an effect-produced action and reduce it
        async fn feed_back(&self, action: A) {
            let _ = self.action_broadcast.send(action.clone());
            if let Err(error) = self.send(action).await {
                tracing::warn!(%error, "Dropped action produced by effect");
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                cancellations: Arc::clone(&self.cancellations),
                next_generation: Arc::clone(&self.next_generation),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

pub use store::Store;
