//! Real-time driver for the session engine.
//!
//! [`SessionClock`] runs one tokio task per active session that pulls ticks
//! from an injected [`TickSource`] and feeds them to the engine. Wall-clock
//! sessions use [`IntervalTicks`]; tests and previews use [`ManualTicks`].
//!
//! Pause, stop, reset and a new start all halt the running tick task while
//! holding the engine lock and bump a generation counter the task checks under
//! the same lock, so once those calls return no further tick reaches the
//! engine.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use super::engine::{SessionEngine, SubscriptionId};
use super::progress::Progress;
use super::recorder::SessionRecord;
use super::sequencer::{SequencerState, SessionStatus};
use crate::catalog::PatternDefinition;
use crate::error::{SessionError, TickError};
use crate::events::Event;

/// Source of logical one-second ticks.
#[async_trait]
pub trait TickSource: Send {
    /// Wait for the next tick. An error ends the session that was waiting.
    async fn next_tick(&mut self) -> Result<(), TickError>;

    /// Restart the period so the next tick is a full period away.
    fn rearm(&mut self) {}
}

/// Wall-clock ticks backed by `tokio::time::interval`.
///
/// Must be created inside a tokio runtime.
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl TickSource for IntervalTicks {
    async fn next_tick(&mut self) -> Result<(), TickError> {
        self.interval.tick().await;
        Ok(())
    }

    fn rearm(&mut self) {
        self.interval.reset();
    }
}

/// Virtual clock: ticks are delivered only when the paired
/// [`ManualTickHandle`] sends them.
pub struct ManualTicks {
    rx: mpsc::UnboundedReceiver<Result<(), TickError>>,
}

/// Sender side of [`ManualTicks`].
///
/// A tick is consumed by whichever tick task is reading when it arrives. On a
/// multi-thread runtime a task being replaced by pause, stop, reset or a new
/// start may already be inside `next_tick` and take one queued tick before it
/// notices it is stale; that tick is dropped, never applied to either
/// session. Send ticks after the command returns and expect at most one to be
/// lost across such a switch.
#[derive(Clone)]
pub struct ManualTickHandle {
    tx: mpsc::UnboundedSender<Result<(), TickError>>,
}

impl ManualTickHandle {
    pub fn tick(&self) {
        let _ = self.tx.send(Ok(()));
    }

    pub fn tick_n(&self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Make the next pending read fail.
    pub fn fail(&self, error: TickError) {
        let _ = self.tx.send(Err(error));
    }
}

/// Create a virtual tick source and the handle that drives it.
pub fn manual_ticks() -> (ManualTickHandle, ManualTicks) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ManualTickHandle { tx }, ManualTicks { rx })
}

#[async_trait]
impl TickSource for ManualTicks {
    async fn next_tick(&mut self) -> Result<(), TickError> {
        match self.rx.recv().await {
            Some(tick) => tick,
            None => Err(TickError::Closed),
        }
    }
}

type Callback = Box<dyn FnMut(&Event) + Send>;

/// Events queued by the engine under its lock, handed to subscribers once the
/// lock is released. Callbacks may therefore call back into the clock.
#[derive(Default)]
struct Dispatcher {
    pending: Mutex<VecDeque<Event>>,
    subscribers: Mutex<Vec<(SubscriptionId, Arc<Mutex<Callback>>)>>,
    next_id: AtomicU64,
    delivering: AtomicBool,
}

impl Dispatcher {
    fn enqueue(&self, event: &Event) {
        lock(&self.pending).push_back(event.clone());
    }

    /// Deliver queued events in order. A call made while another delivery is
    /// running, reentrant or from another thread, leaves its events to it.
    fn deliver(&self) {
        loop {
            if self
                .delivering
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }
            {
                let _delivering = DeliveringFlag(&self.delivering);
                loop {
                    let next = lock(&self.pending).pop_front();
                    let Some(event) = next else { break };
                    let callbacks: Vec<_> = lock(&self.subscribers)
                        .iter()
                        .map(|(_, callback)| callback.clone())
                        .collect();
                    for callback in callbacks {
                        let mut guard = lock(&callback);
                        let callback: &mut Callback = &mut guard;
                        callback(&event);
                    }
                }
            }
            // An event queued just as the flag dropped would otherwise wait
            // for the next delivery.
            if lock(&self.pending).is_empty() {
                return;
            }
        }
    }
}

struct DeliveringFlag<'a>(&'a AtomicBool);

impl Drop for DeliveringFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Session engine plus the single tick task allowed to drive it.
///
/// Subscribers registered here run after the engine lock is released, in
/// event order, on whichever thread produced or is already delivering the
/// events. They may query or command the clock.
pub struct SessionClock {
    engine: Arc<Mutex<SessionEngine>>,
    source: Arc<tokio::sync::Mutex<Box<dyn TickSource>>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    generation: Arc<AtomicU64>,
    dispatcher: Arc<Dispatcher>,
}

impl SessionClock {
    pub fn new(mut engine: SessionEngine, source: impl TickSource + 'static) -> Self {
        let dispatcher = Arc::new(Dispatcher::default());
        let queue = dispatcher.clone();
        engine.subscribe(move |event| queue.enqueue(event));

        let source: Box<dyn TickSource> = Box::new(source);
        Self {
            engine: Arc::new(Mutex::new(engine)),
            source: Arc::new(tokio::sync::Mutex::new(source)),
            ticker: Mutex::new(None),
            generation: Arc::new(AtomicU64::new(0)),
            dispatcher,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SequencerState {
        lock(&self.engine).state()
    }

    pub fn status(&self) -> SessionStatus {
        lock(&self.engine).status()
    }

    pub fn progress(&self) -> Option<Progress> {
        lock(&self.engine).progress()
    }

    pub fn recent_history(&self) -> Vec<SessionRecord> {
        lock(&self.engine).recent_history()
    }

    /// Run `f` with exclusive access to the engine. Do not block inside.
    /// Callbacks subscribed on the engine itself run under the lock; prefer
    /// [`SessionClock::subscribe`].
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut SessionEngine) -> R) -> R {
        let result = f(&mut lock(&self.engine));
        self.dispatcher.deliver();
        result
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + Send + 'static,
    {
        let id = self.dispatcher.next_id.fetch_add(1, Ordering::Relaxed);
        let callback: Callback = Box::new(callback);
        lock(&self.dispatcher.subscribers).push((id, Arc::new(Mutex::new(callback))));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = lock(&self.dispatcher.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start `pattern`, replacing any tick task of a previous session.
    ///
    /// Fails without touching the current session when the pattern is
    /// invalid or when called outside a tokio runtime.
    pub fn start(&self, pattern: &PatternDefinition) -> Result<Event, SessionError> {
        let runtime = Handle::try_current()
            .map_err(|e| SessionError::TickSourceUnavailable(e.to_string()))?;

        let event = {
            let mut engine = lock(&self.engine);
            let event = engine.start(pattern)?;
            self.halt_ticker();
            self.spawn_ticker(&runtime);
            event
        };
        self.dispatcher.deliver();
        Ok(event)
    }

    pub fn pause(&self) -> Option<Event> {
        let event = {
            let mut engine = lock(&self.engine);
            let event = engine.pause()?;
            self.halt_ticker();
            event
        };
        self.dispatcher.deliver();
        Some(event)
    }

    pub fn resume(&self) -> Option<Event> {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, "resume outside a tokio runtime");
                return None;
            }
        };
        let event = {
            let mut engine = lock(&self.engine);
            let event = engine.resume()?;
            self.spawn_ticker(&runtime);
            event
        };
        self.dispatcher.deliver();
        Some(event)
    }

    pub fn stop(&self) -> Option<Event> {
        let event = {
            let mut engine = lock(&self.engine);
            self.halt_ticker();
            engine.stop()
        };
        self.dispatcher.deliver();
        event
    }

    pub fn reset(&self) -> Option<Event> {
        let event = {
            let mut engine = lock(&self.engine);
            self.halt_ticker();
            engine.reset()
        };
        self.dispatcher.deliver();
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Caller must hold the engine lock.
    fn halt_ticker(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = lock(&self.ticker).take() {
            handle.abort();
        }
    }

    /// Caller must hold the engine lock.
    fn spawn_ticker(&self, runtime: &Handle) {
        let mut ticker = lock(&self.ticker);
        if let Some(handle) = ticker.take() {
            handle.abort();
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let current = self.generation.clone();
        let engine = self.engine.clone();
        let source = self.source.clone();
        let dispatcher = self.dispatcher.clone();

        let handle = runtime.spawn(async move {
            let mut source = source.lock().await;
            source.rearm();
            loop {
                let tick = source.next_tick().await;

                let keep_going = {
                    let mut guard = lock(&engine);
                    if current.load(Ordering::SeqCst) != generation {
                        debug!(generation, "stale tick task exiting");
                        false
                    } else {
                        match tick {
                            Ok(()) => {
                                guard.tick();
                                guard.status() == SessionStatus::Running
                            }
                            Err(error) => {
                                guard.abort(&error);
                                false
                            }
                        }
                    }
                };
                dispatcher.deliver();
                if !keep_going {
                    break;
                }
            }
        });

        *ticker = Some(handle);
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.ticker).take() {
            handle.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
