use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

pub const DEFAULT_TICK_MS: u64 = 1000;

// 0 is reserved for "no activation", so ids start at 1.
static NEXT_ACTIVATION: AtomicU64 = AtomicU64::new(1);

/// Identifies the tick source activation that produced a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickId(pub u64);

impl TickId {
    fn next() -> Self {
        TickId(NEXT_ACTIVATION.fetch_add(1, Ordering::SeqCst))
    }
}

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick(TickId),
}

/// Source of application events (keyboard, resize, ticks)
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Event source backed by an mpsc channel. Terminal input and tick threads
/// all feed the same sender.
pub struct ChannelEventSource {
    rx: Receiver<AppEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub fn event_channel() -> (Sender<AppEvent>, ChannelEventSource) {
    let (tx, rx) = mpsc::channel();
    (tx, ChannelEventSource::new(rx))
}

/// Forwards crossterm key and resize events until the receiver goes away.
pub fn spawn_terminal_reader(tx: Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::read() {
            Ok(CtEvent::Key(key)) => {
                if tx.send(AppEvent::Key(key)).is_err() {
                    break;
                }
            }
            Ok(CtEvent::Resize(_, _)) => {
                if tx.send(AppEvent::Resize).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::error!(error = %err, "Terminal event read failed");
                break;
            }
        }
    });
}

/// Periodic tick source driving one session.
///
/// Contract: while active, deliver a tick roughly once per interval; after
/// `stop` no tick from the previous activation may be accepted.
pub trait TickSource {
    fn start(&mut self);
    fn stop(&mut self);
    /// The live activation, if any.
    fn current(&self) -> Option<TickId>;

    fn is_active(&self) -> bool {
        self.current().is_some()
    }

    fn accepts(&self, tick: TickId) -> bool {
        self.current() == Some(tick)
    }
}

impl<T: TickSource + ?Sized> TickSource for Box<T> {
    fn start(&mut self) {
        (**self).start()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn current(&self) -> Option<TickId> {
        (**self).current()
    }
}

/// Background-thread ticker posting `AppEvent::Tick` into the event channel.
pub struct ThreadTicker {
    tx: Sender<AppEvent>,
    interval: Duration,
    live: Arc<AtomicU64>,
}

impl ThreadTicker {
    pub fn new(tx: Sender<AppEvent>, interval: Duration) -> Self {
        Self {
            tx,
            interval,
            live: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl TickSource for ThreadTicker {
    fn start(&mut self) {
        if self.is_active() {
            return;
        }

        let id = TickId::next();
        self.live.store(id.0, Ordering::SeqCst);

        let live = Arc::clone(&self.live);
        let tx = self.tx.clone();
        let interval = self.interval;

        thread::spawn(move || {
            let mut deadline = Instant::now() + interval;
            loop {
                thread::sleep(deadline.saturating_duration_since(Instant::now()));
                if live.load(Ordering::SeqCst) != id.0 {
                    break;
                }
                if tx.send(AppEvent::Tick(id)).is_err() {
                    break;
                }
                deadline += interval;
            }
        });
    }

    fn stop(&mut self) {
        self.live.store(0, Ordering::SeqCst);
    }

    fn current(&self) -> Option<TickId> {
        match self.live.load(Ordering::SeqCst) {
            0 => None,
            id => Some(TickId(id)),
        }
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Test ticker: ticks are delivered by hand, activations are counted.
#[derive(Debug, Default)]
pub struct ManualTicker {
    live: Option<TickId>,
    pub starts: usize,
    pub stops: usize,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickSource for ManualTicker {
    fn start(&mut self) {
        if self.live.is_none() {
            self.live = Some(TickId::next());
            self.starts += 1;
        }
    }

    fn stop(&mut self) {
        if self.live.take().is_some() {
            self.stops += 1;
        }
    }

    fn current(&self) -> Option<TickId> {
        self.live
    }
}

/// Runner that hands the application one event at a time
pub struct Runner<E: AppEventSource> {
    event_source: E,
    poll_interval: Duration,
}

impl<E: AppEventSource> Runner<E> {
    pub fn new(event_source: E, poll_interval: Duration) -> Self {
        Self {
            event_source,
            poll_interval,
        }
    }

    /// Blocks up to the poll interval. `None` means nothing arrived in time.
    pub fn step(&self) -> Option<AppEvent> {
        match self.event_source.recv_timeout(self.poll_interval) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
