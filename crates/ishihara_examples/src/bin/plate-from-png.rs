use ishihara::prelude::*;
use ishihara_examples::{init_tracing, load_png_mask, RasterSink};
use rand::rngs::StdRng;
use rand::SeedableRng;

const MAX_CANVAS: (u32, u32) = (1000, 1000);

fn main() -> anyhow::Result<()> {
    init_tracing();
    let Some(path) = std::env::args().nth(1) else {
        anyhow::bail!("usage: plate-from-png <mask.png> [style-name]");
    };
    let style_name = std::env::args().nth(2).unwrap_or_else(|| "General 1".into());

    let (mask, canvas) = load_png_mask(&path, Some(MAX_CANVAS))?;

    let mut engine = PackingEngine::new();
    let style = engine
        .palettes()
        .position(&style_name)
        .ok_or_else(|| anyhow::anyhow!("unknown style '{style_name}'"))?;

    let config = PackingConfig::for_canvas(canvas)
        .with_polygon(6)
        .with_circular_area(false)
        .with_style(style);
    engine.start(config, canvas, mask)?;

    let mut sink = RasterSink::new(canvas, Color::WHITE);
    let mut rng = StdRng::seed_from_u64(7);
    engine.run_to_completion(&mut rng, &mut sink)?;

    sink.save_png("plate-from-png.png")?;
    Ok(())
}
