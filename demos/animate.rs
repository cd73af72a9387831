use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, ValueEnum};
use kurbo::Rect;

use diskmatch::{draw::SvgSurface, generators, Event, State};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Layout {
    Scattered,
    Clustered,
    Ring,
}

#[derive(Parser)]
struct Cli {
    /// The directory to write frames into.
    #[arg(long)]
    output: PathBuf,

    /// The number of pairs of points.
    #[arg(long, default_value_t = 8)]
    pairs: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, value_enum, default_value_t = Layout::Scattered)]
    layout: Layout,

    /// Stop after this many frames, even if we aren't done.
    #[arg(long, default_value_t = 1000)]
    max_frames: usize,

    /// Only write frames where something other than waiting happened.
    #[arg(long)]
    skip_waits: bool,
}

pub fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();
    let size = 20.0;
    let points = match args.layout {
        Layout::Scattered => generators::scattered(args.pairs, size, args.seed),
        Layout::Clustered => generators::clustered(args.pairs, 3, size, args.seed),
        Layout::Ring => generators::ring(args.pairs, size / 2.0),
    };
    if points.is_empty() {
        bail!("nothing to match");
    }

    let bbox = points
        .iter()
        .fold(Rect::from_points(points[0], points[0]), |r, p| r.union_pt(*p));
    let view_box = bbox.inflate(size / 4.0, size / 4.0);
    let stroke_width = view_box.width().max(view_box.height()) / 512.0;

    std::fs::create_dir_all(&args.output)?;
    let mut state = State::from_points(points);
    let mut frame = 0;
    let mut step = 0;
    while !state.is_finished() && frame < args.max_frames {
        let event = state.next_event();
        let waiting = matches!(event, Event::Wait { .. });
        if !(args.skip_waits && waiting) {
            let mut surface = SvgSurface::new(view_box, stroke_width);
            state.draw(&mut surface);
            let path = args.output.join(format!("frame_{frame:04}.svg"));
            svg::save(&path, &surface.into_document())?;
            frame += 1;
        }
        state = state.advance();
        step += 1;
    }

    let mut surface = SvgSurface::new(view_box, stroke_width);
    state.draw(&mut surface);
    svg::save(args.output.join("final.svg"), &surface.into_document())?;

    if state.is_finished() {
        let cost: f64 = state
            .matched_pairs()
            .iter()
            .map(|(p, q)| p.distance(*q))
            .sum();
        println!("matched everything in {step} steps, total length {cost}");
    } else {
        println!("stopped after {step} steps without finishing");
    }
    Ok(())
}
