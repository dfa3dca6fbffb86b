//! Packing engine: the batch-driven placement loop and its state machine.
//!
//! A run moves `Idle -> Generating -> {Exhausted, Cancelled}`. The host calls
//! [`PackingEngine::tick`] once per frame; each tick performs one batch of
//! placement attempts and never suspends. A stop request is only observed at the
//! start of a tick, so the batch in flight always completes.
//!
//! Each attempt draws a candidate, tests it against its `check_nearest` nearest
//! neighbors, and on success classifies it against the mask, picks a color,
//! emits a draw command, and commits it. Neighbors outside the checked set are
//! never tested, so an accepted shape can still overlap a distant large shape
//! when radii vary widely.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::color::{ColorSelector, PaletteTable};
use crate::config::{CanvasSize, PackingConfig};
use crate::error::{Error, Result};
use crate::mask::CoverageSampler;
use crate::shape::{Shape, ShapeFactory};
use crate::spatial::SpatialIndex;

pub mod events;

use events::{EventSink, PackingEvent, PackingEventKind};

/// Lifecycle state of a [`PackingEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineStatus {
    Idle,
    Generating,
    Exhausted,
    Cancelled,
}

impl EngineStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, EngineStatus::Exhausted | EngineStatus::Cancelled)
    }
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunOutcome {
    /// The failure streak reached the configured threshold.
    Exhausted,
    /// A stop request was observed at a batch boundary.
    Cancelled,
}

impl From<RunOutcome> for EngineStatus {
    fn from(value: RunOutcome) -> Self {
        match value {
            RunOutcome::Exhausted => EngineStatus::Exhausted,
            RunOutcome::Cancelled => EngineStatus::Cancelled,
        }
    }
}

/// Result of one scheduling tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Schedule another tick.
    Continue,
    /// The run is over; stop scheduling.
    Finished(RunOutcome),
}

/// Totals for one run.
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Shapes accepted.
    pub placed: usize,
    /// Candidates generated.
    pub attempts: u64,
    /// Candidates rejected for intersecting a neighbor.
    pub rejected: u64,
    /// Batches executed.
    pub batches: usize,
    /// Accepted shapes colored from the `on` palette.
    pub on_count: usize,
    /// Accepted shapes colored from the `off` palette.
    pub off_count: usize,
}

/// Mutable state of one run, owned by the engine.
#[derive(Debug)]
pub struct EngineState {
    placed: Vec<Shape>,
    failed_in_row: u32,
    index: SpatialIndex<usize>,
    summary: RunSummary,
}

impl EngineState {
    fn new() -> Self {
        Self {
            placed: Vec::new(),
            failed_in_row: 0,
            index: SpatialIndex::new(),
            summary: RunSummary::default(),
        }
    }

    /// Accepted shapes in draw order.
    pub fn placed(&self) -> &[Shape] {
        &self.placed
    }

    /// Consecutive rejected attempts.
    pub fn failed_in_row(&self) -> u32 {
        self.failed_in_row
    }

    /// Index over placed anchors. Emptied once the run terminates.
    pub fn index(&self) -> &SpatialIndex<usize> {
        &self.index
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }
}

/// Cloneable stop signal shared between the host and the engine.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Asks the running generation to stop at the next batch boundary.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Host primitive for yielding between batches (e.g. waiting for the next frame).
pub trait FrameScheduler {
    fn next_frame(&mut self);
}

/// Never yields; batches run back to back.
impl FrameScheduler for () {
    #[inline]
    fn next_frame(&mut self) {}
}

/// A scheduler that forwards to a user-provided closure.
pub struct FnScheduler<F: FnMut()> {
    f: F,
}

impl<F: FnMut()> FnScheduler<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F: FnMut()> FrameScheduler for FnScheduler<F> {
    #[inline]
    fn next_frame(&mut self) {
        (self.f)();
    }
}

struct ActiveRun {
    config: PackingConfig,
    canvas: CanvasSize,
    mask: Arc<dyn CoverageSampler>,
    factory: ShapeFactory,
    check_nearest: usize,
    state: EngineState,
}

/// Drives packing runs. Exclusively owns its run state; only the stop flag is shared.
pub struct PackingEngine {
    selector: ColorSelector,
    stop: StopHandle,
    status: EngineStatus,
    run: Option<ActiveRun>,
}

impl Default for PackingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PackingEngine {
    /// Creates an idle engine using the reference palette table.
    pub fn new() -> Self {
        Self::with_palettes(PaletteTable::reference())
    }

    /// Creates an idle engine with a custom palette table.
    pub fn with_palettes(table: PaletteTable) -> Self {
        Self {
            selector: ColorSelector::new(table),
            stop: StopHandle::default(),
            status: EngineStatus::Idle,
            run: None,
        }
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn palettes(&self) -> &PaletteTable {
        self.selector.table()
    }

    /// Handle the host can keep to request a stop from elsewhere.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Requests a stop; takes effect at the next batch boundary.
    ///
    /// Outside a run this only logs; [`start`](Self::start) clears the flag.
    pub fn request_stop(&self) {
        if self.status != EngineStatus::Generating {
            warn!("Stop requested while not generating ({:?}).", self.status);
        }
        self.stop.request_stop();
    }

    /// State of the current or last run, until the next [`start`](Self::start) or [`clear`](Self::clear).
    pub fn state(&self) -> Option<&EngineState> {
        self.run.as_ref().map(|r| &r.state)
    }

    pub fn placed(&self) -> &[Shape] {
        self.state().map(EngineState::placed).unwrap_or(&[])
    }

    pub fn config(&self) -> Option<&PackingConfig> {
        self.run.as_ref().map(|r| &r.config)
    }

    pub fn check_nearest(&self) -> Option<usize> {
        self.run.as_ref().map(|r| r.check_nearest)
    }

    /// Begins a run with a fresh state.
    ///
    /// Validates `config` against `canvas` and the palette table first; on error
    /// nothing changes and generation does not start.
    pub fn start<M>(&mut self, config: PackingConfig, canvas: CanvasSize, mask: M) -> Result<()>
    where
        M: CoverageSampler + 'static,
    {
        self.start_shared(config, canvas, Arc::new(mask))
    }

    /// Like [`start`](Self::start) with a mask shared with the host.
    pub fn start_shared(
        &mut self,
        config: PackingConfig,
        canvas: CanvasSize,
        mask: Arc<dyn CoverageSampler>,
    ) -> Result<()> {
        if self.status == EngineStatus::Generating {
            return Err(Error::InvalidState("a run is already in progress".into()));
        }
        config.validate_for_canvas(canvas)?;
        self.selector.check_style(config.style)?;

        let check_nearest = config.check_nearest();
        info!(
            "Packing run started: {:?}, radii [{}, {}], canvas {}x{}, check_nearest {}.",
            config.shape_kind,
            config.min_radius,
            config.max_radius,
            canvas.width,
            canvas.height,
            check_nearest
        );

        self.stop.reset();
        self.run = Some(ActiveRun {
            factory: ShapeFactory::new(&config, canvas),
            config,
            canvas,
            mask,
            check_nearest,
            state: EngineState::new(),
        });
        self.status = EngineStatus::Generating;
        Ok(())
    }

    /// Drops the last run's state and returns to `Idle`.
    pub fn clear(&mut self) -> Result<()> {
        if self.status == EngineStatus::Generating {
            return Err(Error::InvalidState(
                "cannot clear while generating; stop first".into(),
            ));
        }
        self.run = None;
        self.status = EngineStatus::Idle;
        Ok(())
    }

    /// Executes one batch.
    ///
    /// Returns [`TickOutcome::Finished`] once the run is over, including on calls
    /// made after termination. Calling it while idle is an error.
    pub fn tick(&mut self, rng: &mut dyn Rng, sink: &mut dyn EventSink) -> Result<TickOutcome> {
        match self.status {
            EngineStatus::Idle => {
                return Err(Error::InvalidState("no run has been started".into()))
            }
            EngineStatus::Exhausted => return Ok(TickOutcome::Finished(RunOutcome::Exhausted)),
            EngineStatus::Cancelled => return Ok(TickOutcome::Finished(RunOutcome::Cancelled)),
            EngineStatus::Generating => {}
        }

        let Some(run) = self.run.as_mut() else {
            return Err(self.abort("generating without run state".into()));
        };

        if run.state.summary.batches == 0 {
            announce(run, sink);
        }

        if self.stop.is_stop_requested() {
            return Ok(self.finish(RunOutcome::Cancelled, sink));
        }

        if let Err(message) = run_batch(run, &self.selector, rng, sink) {
            return Err(self.abort(message));
        }

        let exhausted = run.state.failed_in_row >= run.config.failure_threshold;
        if exhausted {
            return Ok(self.finish(RunOutcome::Exhausted, sink));
        }
        Ok(TickOutcome::Continue)
    }

    /// Ticks until the run terminates, yielding to `scheduler` between batches.
    pub fn run(
        &mut self,
        rng: &mut dyn Rng,
        sink: &mut dyn EventSink,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<RunOutcome> {
        loop {
            match self.tick(rng, sink)? {
                TickOutcome::Continue => scheduler.next_frame(),
                TickOutcome::Finished(outcome) => return Ok(outcome),
            }
        }
    }

    /// Ticks back to back until the run terminates.
    pub fn run_to_completion(
        &mut self,
        rng: &mut dyn Rng,
        sink: &mut dyn EventSink,
    ) -> Result<RunOutcome> {
        self.run(rng, sink, &mut ())
    }

    fn finish(&mut self, outcome: RunOutcome, sink: &mut dyn EventSink) -> TickOutcome {
        self.status = outcome.into();
        if let Some(run) = self.run.as_mut() {
            run.state.index = SpatialIndex::new();
            let summary = run.state.summary.clone();
            info!(
                "Packing run finished: {:?} | placed: {}, attempts: {}, batches: {}.",
                outcome, summary.placed, summary.attempts, summary.batches
            );
            if sink.wants(PackingEventKind::RunFinished) {
                sink.send(PackingEvent::RunFinished { outcome, summary });
            }
        }
        TickOutcome::Finished(outcome)
    }

    fn abort(&mut self, message: String) -> Error {
        error!("Packing run aborted: {}.", message);
        self.run = None;
        self.status = EngineStatus::Idle;
        Error::InvariantViolation(message)
    }
}

fn announce(run: &ActiveRun, sink: &mut dyn EventSink) {
    if sink.wants(PackingEventKind::RunStarted) {
        sink.send(PackingEvent::RunStarted {
            config: run.config.clone(),
            canvas: run.canvas,
            check_nearest: run.check_nearest,
        });
    }

    let (mw, mh) = (run.mask.width(), run.mask.height());
    if (mw, mh) != (run.canvas.width, run.canvas.height) {
        warn!(
            "Mask size {}x{} differs from canvas {}x{}; pixels outside the mask count as uncovered.",
            mw, mh, run.canvas.width, run.canvas.height
        );
        if sink.wants(PackingEventKind::Warning) {
            sink.send(PackingEvent::Warning {
                context: "mask".into(),
                message: format!(
                    "Mask size {mw}x{mh} differs from canvas {}x{}",
                    run.canvas.width, run.canvas.height
                ),
            });
        }
    }
}

/// Runs `batch_size` attempts. Errors carry a contract-violation message.
fn run_batch(
    run: &mut ActiveRun,
    selector: &ColorSelector,
    rng: &mut dyn Rng,
    sink: &mut dyn EventSink,
) -> std::result::Result<(), String> {
    let ActiveRun {
        config,
        mask,
        factory,
        check_nearest,
        state,
        ..
    } = run;
    let batch = state.summary.batches;
    let placed_before = state.placed.len();

    for _ in 0..config.batch_size {
        let candidate = factory.generate(rng);
        let radius = candidate.effective_radius();
        if !(radius.is_finite() && radius > 0.0) || !candidate.anchor().is_finite() {
            return Err(format!("factory produced a degenerate shape: {candidate:?}"));
        }
        state.summary.attempts += 1;

        let blocked = state
            .index
            .nearest(candidate.anchor(), *check_nearest)
            .iter()
            .any(|n| ShapeFactory::intersects(&candidate, &state.placed[*n.item]));

        if blocked {
            state.failed_in_row = state.failed_in_row.saturating_add(1);
            state.summary.rejected += 1;
            continue;
        }
        state.failed_in_row = 0;

        let classification =
            ShapeFactory::overlaps_image(&**mask, &candidate) != config.invert_colors;
        let color = selector
            .select(classification, config.style, rng)
            .ok_or_else(|| format!("style {} missing from palette table", config.style))?;

        let index = state.placed.len();
        if sink.wants(PackingEventKind::ShapePlaced) {
            sink.send(PackingEvent::ShapePlaced {
                index,
                classification,
                command: ShapeFactory::draw(&candidate, config.draw_ratio, color),
            });
        }

        state.index.insert(candidate.anchor(), index);
        state.placed.push(candidate);
        if classification {
            state.summary.on_count += 1;
        } else {
            state.summary.off_count += 1;
        }
    }

    state.summary.placed = state.placed.len();
    state.summary.batches += 1;
    let accepted = state.placed.len() - placed_before;
    debug!(
        "Batch {} | accepted: {}, placed: {}, failed_in_row: {}.",
        batch,
        accepted,
        state.placed.len(),
        state.failed_in_row
    );
    if sink.wants(PackingEventKind::BatchFinished) {
        sink.send(PackingEvent::BatchFinished {
            batch,
            accepted,
            placed_total: state.placed.len(),
            failed_in_row: state.failed_in_row,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::config::ShapeKind;
    use crate::engine::events::VecSink;
    use crate::mask::{ImageMask, Rgba};
    use crate::shape::DrawGeometry;

    fn scenario_a_config() -> PackingConfig {
        PackingConfig::new(5.0, 5.0)
            .with_circular_area(false)
            .with_invert_colors(false)
            .with_failure_threshold(10_000)
            .with_batch_size(50)
    }

    fn canvas_100() -> CanvasSize {
        CanvasSize::new(100, 100)
    }

    fn run_collect(
        config: PackingConfig,
        canvas: CanvasSize,
        mask: ImageMask,
        seed: u64,
    ) -> (PackingEngine, VecSink, RunOutcome) {
        let mut engine = PackingEngine::new();
        engine.start(config, canvas, mask).unwrap();
        let mut sink = VecSink::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let outcome = engine.run_to_completion(&mut rng, &mut sink).unwrap();
        (engine, sink, outcome)
    }

    /// Replays insertions and checks each shape against the neighbors it was tested against.
    fn assert_checked_set_clear(placed: &[Shape], k: usize) {
        let mut index = SpatialIndex::new();
        for (i, shape) in placed.iter().enumerate() {
            for n in index.nearest(shape.anchor(), k) {
                assert!(
                    !ShapeFactory::intersects(shape, &placed[*n.item]),
                    "shape {i} intersects checked neighbor {}",
                    n.item
                );
            }
            index.insert(shape.anchor(), i);
        }
    }

    #[test]
    fn scenario_a_circles_on_white_mask() {
        let (engine, sink, outcome) = run_collect(
            scenario_a_config(),
            canvas_100(),
            ImageMask::blank(100, 100),
            1,
        );
        assert_eq!(outcome, RunOutcome::Exhausted);
        assert_eq!(engine.status(), EngineStatus::Exhausted);

        let placed = engine.placed();
        assert!(!placed.is_empty());
        for i in 0..placed.len() {
            for j in (i + 1)..placed.len() {
                assert!(!ShapeFactory::intersects(&placed[i], &placed[j]));
            }
        }

        let off = &engine.palettes().get(0).unwrap().off;
        let commands: Vec<_> = sink.draw_commands().collect();
        assert_eq!(commands.len(), placed.len());
        for cmd in commands {
            assert!(off.contains(&cmd.color));
        }
        let state = engine.state().unwrap();
        assert!(state.failed_in_row() >= 10_000);
        assert_eq!(state.summary().on_count, 0);
        assert_eq!(state.summary().off_count, placed.len());
    }

    #[test]
    fn scenario_b_triangles() {
        let config = scenario_a_config().with_polygon(3);
        let (engine, _sink, outcome) =
            run_collect(config, canvas_100(), ImageMask::blank(100, 100), 2);
        assert_eq!(outcome, RunOutcome::Exhausted);
        assert_eq!(engine.check_nearest(), Some(2));

        let placed = engine.placed();
        assert!(!placed.is_empty());
        for shape in placed {
            match shape {
                Shape::Polygon(p) => assert_eq!(p.len(), 3),
                other => panic!("expected polygon, got {other:?}"),
            }
            assert!((shape.effective_radius() - 5.0).abs() < 1e-9);
            assert_eq!(shape.kind(), ShapeKind::RegularPolygon);
        }
        assert_checked_set_clear(placed, 2);
    }

    #[test]
    fn scenario_c_wide_radius_ratio() {
        let config = PackingConfig::new(2.0, 50.0)
            .with_circular_area(false)
            .with_failure_threshold(1_000)
            .with_batch_size(50);
        assert_eq!(config.check_nearest(), 50);

        let (engine, _sink, outcome) =
            run_collect(config, CanvasSize::new(120, 120), ImageMask::blank(120, 120), 3);
        assert_eq!(outcome, RunOutcome::Exhausted);
        assert_eq!(engine.check_nearest(), Some(50));
        for shape in engine.placed() {
            let r = shape.effective_radius();
            assert!((2.0..=50.0).contains(&r));
        }
        assert_checked_set_clear(engine.placed(), 50);
    }

    #[test]
    fn scenario_d_inverted_radii_rejected_before_generation() {
        let mut engine = PackingEngine::new();
        let err = engine
            .start(
                PackingConfig::new(10.0, 5.0),
                canvas_100(),
                ImageMask::blank(100, 100),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert_eq!(engine.status(), EngineStatus::Idle);
        assert!(engine.state().is_none());
        let mut rng = StdRng::seed_from_u64(0);
        assert!(engine.tick(&mut rng, &mut ()).is_err());
    }

    #[test]
    fn extreme_radius_ratio_runs_a_batch() {
        let config = PackingConfig::new(1e-9, 40.0)
            .with_circular_area(false)
            .with_batch_size(50);
        let mut engine = PackingEngine::new();
        engine
            .start(config, canvas_100(), ImageMask::blank(100, 100))
            .unwrap();
        assert!(engine.check_nearest().unwrap() > 1_000_000_000);

        let mut rng = StdRng::seed_from_u64(12);
        assert_eq!(
            engine.tick(&mut rng, &mut ()).unwrap(),
            TickOutcome::Continue
        );
        assert!(!engine.placed().is_empty());
        assert_checked_set_clear(engine.placed(), usize::MAX);
    }

    #[test]
    fn unknown_style_rejected() {
        let mut engine = PackingEngine::new();
        let err = engine
            .start(
                scenario_a_config().with_style(7),
                canvas_100(),
                ImageMask::blank(100, 100),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn dark_mask_uses_on_palette_and_invert_swaps() {
        let black = ImageMask::filled(100, 100, Rgba::BLACK);
        let config = scenario_a_config().with_style(3).with_failure_threshold(500);
        let (engine, sink, _) = run_collect(config.clone(), canvas_100(), black.clone(), 4);
        let style = engine.palettes().get(3).unwrap().clone();
        assert!(sink.draw_commands().all(|c| style.on.contains(&c.color)));

        let (_, inverted, _) =
            run_collect(config.with_invert_colors(true), canvas_100(), black, 4);
        assert!(inverted.draw_commands().all(|c| style.off.contains(&c.color)));
    }

    #[test]
    fn draw_ratio_scales_emitted_geometry() {
        let config = scenario_a_config()
            .with_draw_ratio(0.5)
            .with_failure_threshold(200);
        let (_, sink, _) = run_collect(config, canvas_100(), ImageMask::blank(100, 100), 5);
        for cmd in sink.draw_commands() {
            match &cmd.geometry {
                DrawGeometry::Circle { radius, .. } => assert_eq!(*radius, 2.5),
                other => panic!("expected circle geometry, got {other:?}"),
            }
        }
    }

    #[test]
    fn events_arrive_in_order() {
        let (engine, sink, _) = run_collect(
            scenario_a_config().with_failure_threshold(300),
            canvas_100(),
            ImageMask::blank(100, 100),
            6,
        );
        let events = sink.into_inner();
        assert!(matches!(
            events.first(),
            Some(PackingEvent::RunStarted {
                check_nearest: 2,
                ..
            })
        ));
        assert!(matches!(
            events.last(),
            Some(PackingEvent::RunFinished {
                outcome: RunOutcome::Exhausted,
                ..
            })
        ));

        let indices: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                PackingEvent::ShapePlaced { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, (0..engine.placed().len()).collect::<Vec<_>>());

        let batches = events
            .iter()
            .filter(|e| matches!(e, PackingEvent::BatchFinished { .. }))
            .count();
        assert_eq!(batches, engine.state().unwrap().summary().batches);
    }

    #[test]
    fn placed_count_is_monotonic_across_batches() {
        let mut engine = PackingEngine::new();
        engine
            .start(
                scenario_a_config().with_batch_size(5),
                canvas_100(),
                ImageMask::blank(100, 100),
            )
            .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut last = 0;
        loop {
            let outcome = engine.tick(&mut rng, &mut ()).unwrap();
            let now = engine.placed().len();
            assert!(now >= last);
            last = now;
            if let TickOutcome::Finished(_) = outcome {
                break;
            }
        }
        assert_eq!(engine.state().unwrap().summary().placed, last);
    }

    #[test]
    fn stop_is_observed_at_next_batch_boundary() {
        let mut engine = PackingEngine::new();
        engine
            .start(
                scenario_a_config().with_batch_size(10),
                canvas_100(),
                ImageMask::blank(100, 100),
            )
            .unwrap();
        let handle = engine.stop_handle();
        let mut rng = StdRng::seed_from_u64(8);
        let mut sink = VecSink::new();

        assert_eq!(
            engine.tick(&mut rng, &mut sink).unwrap(),
            TickOutcome::Continue
        );
        let placed_before = engine.placed().len();
        assert!(placed_before > 0);

        handle.request_stop();
        assert_eq!(engine.status(), EngineStatus::Generating);
        assert_eq!(
            engine.tick(&mut rng, &mut sink).unwrap(),
            TickOutcome::Finished(RunOutcome::Cancelled)
        );
        assert_eq!(engine.status(), EngineStatus::Cancelled);
        assert_eq!(engine.placed().len(), placed_before);
        assert!(matches!(
            sink.as_slice().last(),
            Some(PackingEvent::RunFinished {
                outcome: RunOutcome::Cancelled,
                ..
            })
        ));

        // Terminal ticks are idempotent.
        assert_eq!(
            engine.tick(&mut rng, &mut sink).unwrap(),
            TickOutcome::Finished(RunOutcome::Cancelled)
        );
    }

    #[test]
    fn stop_while_idle_is_log_only() {
        let mut engine = PackingEngine::new();
        engine.request_stop();
        engine
            .start(
                scenario_a_config().with_failure_threshold(100),
                canvas_100(),
                ImageMask::blank(100, 100),
            )
            .unwrap();
        let mut sink = VecSink::new();
        let mut rng = StdRng::seed_from_u64(13);
        assert_eq!(
            engine.run_to_completion(&mut rng, &mut sink).unwrap(),
            RunOutcome::Exhausted
        );
        assert!(!sink
            .as_slice()
            .iter()
            .any(|e| e.kind() == PackingEventKind::Warning));
    }

    #[test]
    fn scheduler_called_between_batches() {
        let frames = Cell::new(0usize);
        let mut scheduler = FnScheduler::new(|| frames.set(frames.get() + 1));
        let mut engine = PackingEngine::new();
        engine
            .start(
                scenario_a_config().with_failure_threshold(100),
                canvas_100(),
                ImageMask::blank(100, 100),
            )
            .unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let outcome = engine.run(&mut rng, &mut (), &mut scheduler).unwrap();
        assert_eq!(outcome, RunOutcome::Exhausted);
        let batches = engine.state().unwrap().summary().batches;
        assert_eq!(frames.get(), batches - 1);
    }

    #[test]
    fn lifecycle_guards() {
        let mut engine = PackingEngine::new();
        let mask = ImageMask::blank(100, 100);
        engine
            .start(scenario_a_config(), canvas_100(), mask.clone())
            .unwrap();
        assert!(matches!(
            engine.start(scenario_a_config(), canvas_100(), mask.clone()),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(engine.clear(), Err(Error::InvalidState(_))));

        engine.request_stop();
        let mut rng = StdRng::seed_from_u64(10);
        engine.run_to_completion(&mut rng, &mut ()).unwrap();
        assert_eq!(engine.status(), EngineStatus::Cancelled);
        assert!(engine.placed().is_empty());

        // A new run starts fresh and ignores the earlier stop request.
        engine
            .start(
                scenario_a_config().with_failure_threshold(100),
                canvas_100(),
                mask,
            )
            .unwrap();
        assert_eq!(
            engine.run_to_completion(&mut rng, &mut ()).unwrap(),
            RunOutcome::Exhausted
        );
        assert!(!engine.placed().is_empty());
        assert!(engine.state().unwrap().index().is_empty());

        engine.clear().unwrap();
        assert_eq!(engine.status(), EngineStatus::Idle);
        assert!(engine.placed().is_empty());
    }

    #[test]
    fn same_seed_reproduces_draw_stream() {
        let config = PackingConfig::new(2.0, 6.0)
            .with_polygon(5)
            .with_failure_threshold(300);
        let mask = ImageMask::from_fn(100, 100, |x, _| {
            if x < 50 {
                Rgba::BLACK
            } else {
                Rgba::WHITE
            }
        });
        let (_, a, _) = run_collect(config.clone(), canvas_100(), mask.clone(), 42);
        let (_, b, _) = run_collect(config, canvas_100(), mask, 42);
        let a: Vec<_> = a.draw_commands().cloned().collect();
        let b: Vec<_> = b.draw_commands().cloned().collect();
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn mismatched_mask_size_warns() {
        let (_, sink, _) = run_collect(
            scenario_a_config().with_failure_threshold(50),
            canvas_100(),
            ImageMask::blank(10, 10),
            11,
        );
        assert!(sink
            .as_slice()
            .iter()
            .any(|e| matches!(e, PackingEvent::Warning { context, .. } if context == "mask")));
    }
}
