use std::cell::Cell;

use ishihara::prelude::*;
use ishihara_examples::{init_tracing, ring_mask, RasterSink};
use rand::rngs::StdRng;
use rand::SeedableRng;

const FRAME_BUDGET: usize = 40;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let canvas = CanvasSize::new(600, 600);
    let mask = ring_mask(canvas, 0.0, 150.0);

    let config = PackingConfig::for_canvas(canvas)
        .with_invert_colors(true)
        .with_style(4);

    let mut engine = PackingEngine::new();
    engine.start(config, canvas, mask)?;

    // Stop from the host side once the frame budget is spent.
    let stop = engine.stop_handle();
    let frames = Cell::new(0usize);
    let mut scheduler = FnScheduler::new(|| {
        frames.set(frames.get() + 1);
        if frames.get() == FRAME_BUDGET {
            stop.request_stop();
        }
    });

    let mut raster = RasterSink::new(canvas, Color::WHITE);
    let progress = FilterSink::new(
        FnSink::new(|event| {
            if let PackingEvent::BatchFinished {
                batch,
                placed_total,
                ..
            } = event
            {
                if batch % 10 == 0 {
                    println!("batch {batch}: {placed_total} shapes");
                }
            }
        }),
        [PackingEventKind::BatchFinished],
    );
    let mut sinks = MultiSink::new().with(&mut raster).with(progress);

    let mut rng = StdRng::seed_from_u64(1234);
    let outcome = engine.run(&mut rng, &mut sinks, &mut scheduler)?;
    drop(sinks);

    if let Some(state) = engine.state() {
        let summary = state.summary();
        println!(
            "{outcome:?} after {} frames: {} shapes ({} on, {} off), {} attempts",
            frames.get(),
            summary.placed,
            summary.on_count,
            summary.off_count,
            summary.attempts
        );
    }
    raster.save_png("plate-stop-after-frames.png")?;
    Ok(())
}
