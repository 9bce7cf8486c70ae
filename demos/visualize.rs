//! Renders a random batch of segments and their crossings to `output.png`.
//! Not part of the library's public contract — a visual sanity check,
//! descended from the original teacher demo's tiny-skia raster preview.

use std::time;

use line_intersectors::{find, gen, Segment};
use tiny_skia::*;

fn main() {
    env_logger::init();

    let mut rng = rand::thread_rng();
    let n = 1000;
    let lines: Vec<Segment> = gen::generate_lines::<gen::ShortLines>(n, &mut rng);

    let now = time::Instant::now();
    let crossings = find(&lines).expect("generated segments are never empty");
    let elapsed = now.elapsed();
    println!("#Intersections found: {} (took {:.2?})", crossings.len(), elapsed);

    let mut red = Paint::default();
    red.set_color_rgba8(255, 0, 0, 255);
    red.anti_alias = true;

    let mut blue = Paint::default();
    blue.set_color_rgba8(0, 0, 255, 255);
    blue.anti_alias = true;

    let stroke = Stroke {
        width: 2.0,
        ..Default::default()
    };

    let scale = 900.0;

    let mut pixmap = Pixmap::new(1000, 1000).unwrap();
    pixmap.fill(Color::WHITE);
    for line in &lines {
        let path = {
            let mut pb = PathBuilder::new();
            pb.move_to((line.start.x * scale) as f32, (line.start.y * scale) as f32);
            pb.line_to((line.end.x * scale) as f32, (line.end.y * scale) as f32);
            pb.finish().unwrap()
        };
        pixmap.stroke_path(&path, &red, &stroke, Transform::from_translate(50.0, 50.0), None);
    }

    for crossing in crossings {
        let path = PathBuilder::from_circle(
            (crossing.shared.x * scale) as f32,
            (crossing.shared.y * scale) as f32,
            5.0,
        )
        .unwrap();
        pixmap.fill_path(&path, &blue, FillRule::Winding, Transform::from_translate(50.0, 50.0), None);
    }

    pixmap.save_png("output.png").unwrap();
}
