use ishihara::prelude::*;
use ishihara_examples::{init_tracing, ring_mask, RasterSink};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let canvas = CanvasSize::new(800, 800);
    let mask = ring_mask(canvas, 120.0, 260.0);

    let config = PackingConfig::for_canvas(canvas).with_draw_ratio(0.9);

    let mut engine = PackingEngine::new();
    engine.start(config, canvas, mask)?;

    let mut sink = RasterSink::new(canvas, Color::WHITE);
    let mut rng = StdRng::seed_from_u64(42);
    engine.run_to_completion(&mut rng, &mut sink)?;

    sink.save_png("plate-ring-circles.png")?;
    Ok(())
}
