//! Event types and sinks for observing packing runs.
//!
//! This module defines [`PackingEvent`] and a set of sinks to emit, collect, or
//! forward events while a [`crate::engine::PackingEngine`] runs. The draw-command
//! stream is the sequence of [`PackingEvent::ShapePlaced`] events.
use crate::config::{CanvasSize, PackingConfig};
use crate::engine::{RunOutcome, RunSummary};
use crate::shape::DrawCommand;

/// Describes events emitted by the packing engine.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum PackingEvent {
    /// Emitted when a run enters the generating state.
    RunStarted {
        /// The validated configuration for this run.
        config: PackingConfig,
        /// Canvas being filled.
        canvas: CanvasSize,
        /// Neighbors tested per candidate.
        check_nearest: usize,
    },

    /// Emitted once per accepted shape, in acceptance order.
    ShapePlaced {
        /// Position of the shape in the placed sequence.
        index: usize,
        /// Whether the shape was colored from the `on` palette.
        classification: bool,
        /// Geometry and color to fill.
        command: DrawCommand,
    },

    /// Emitted after each batch of attempts.
    BatchFinished {
        /// Zero-based batch counter for the run.
        batch: usize,
        /// Shapes accepted in this batch.
        accepted: usize,
        /// Total shapes placed so far.
        placed_total: usize,
        /// Current failure streak.
        failed_in_row: u32,
    },

    /// Emitted when the run reaches a terminal state.
    RunFinished {
        outcome: RunOutcome,
        summary: RunSummary,
    },

    /// Non-fatal warning.
    Warning {
        /// Context string (e.g. "mask").
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`PackingEvent`] used for filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PackingEventKind {
    RunStarted,
    ShapePlaced,
    BatchFinished,
    RunFinished,
    Warning,
}

impl PackingEvent {
    pub fn kind(&self) -> PackingEventKind {
        match self {
            PackingEvent::RunStarted { .. } => PackingEventKind::RunStarted,
            PackingEvent::ShapePlaced { .. } => PackingEventKind::ShapePlaced,
            PackingEvent::BatchFinished { .. } => PackingEventKind::BatchFinished,
            PackingEvent::RunFinished { .. } => PackingEventKind::RunFinished,
            PackingEvent::Warning { .. } => PackingEventKind::Warning,
        }
    }
}

/// Receives [`PackingEvent`]s from the engine.
pub trait EventSink {
    fn send(&mut self, event: PackingEvent);

    /// Whether events of `kind` should be built and sent at all.
    ///
    /// The engine skips building events nobody wants, so a sink that only
    /// cares about draw commands avoids cloning configs and summaries.
    #[inline]
    fn wants(&self, _kind: PackingEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: PackingEvent) {}

    #[inline]
    fn wants(&self, _kind: PackingEventKind) -> bool {
        false
    }
}

/// Lets a caller keep ownership of a sink handed to a [`MultiSink`].
impl<S: EventSink + ?Sized> EventSink for &mut S {
    #[inline]
    fn send(&mut self, event: PackingEvent) {
        (**self).send(event);
    }

    #[inline]
    fn wants(&self, kind: PackingEventKind) -> bool {
        (**self).wants(kind)
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(PackingEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(PackingEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(PackingEvent),
{
    #[inline]
    fn send(&mut self, event: PackingEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<PackingEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<PackingEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[PackingEvent] {
        &self.events
    }

    /// Draw commands received so far, in order.
    pub fn draw_commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.events.iter().filter_map(|e| match e {
            PackingEvent::ShapePlaced { command, .. } => Some(command),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: PackingEvent) {
        self.events.push(event);
    }
}

/// Fan-out over sinks of different types.
///
/// Each event is delivered only to the sinks that want its kind, and is
/// cloned once per extra recipient.
#[derive(Default)]
pub struct MultiSink<'a> {
    sinks: Vec<Box<dyn EventSink + 'a>>,
}

impl<'a> MultiSink<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Adds a sink, builder style.
    pub fn with(mut self, sink: impl EventSink + 'a) -> Self {
        self.push(sink);
        self
    }

    pub fn push(&mut self, sink: impl EventSink + 'a) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for MultiSink<'_> {
    fn send(&mut self, event: PackingEvent) {
        let kind = event.kind();
        let mut recipients = self.sinks.iter_mut().filter(|s| s.wants(kind));
        let Some(mut current) = recipients.next() else {
            return;
        };
        for next in recipients {
            current.send(event.clone());
            current = next;
        }
        current.send(event);
    }

    fn wants(&self, kind: PackingEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}

/// Sink adapter that only forwards the listed event kinds.
pub struct FilterSink<S: EventSink> {
    inner: S,
    kinds: Vec<PackingEventKind>,
}

impl<S: EventSink> FilterSink<S> {
    pub fn new(inner: S, kinds: impl IntoIterator<Item = PackingEventKind>) -> Self {
        Self {
            inner,
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: EventSink> EventSink for FilterSink<S> {
    fn send(&mut self, event: PackingEvent) {
        if self.wants(event.kind()) {
            self.inner.send(event);
        }
    }

    fn wants(&self, kind: PackingEventKind) -> bool {
        self.kinds.contains(&kind) && self.inner.wants(kind)
    }
}
