// Generates every catalogue map for one seed and writes a preview of each:
// hill-shaded relief with water, roads, rocks and the checkpoint course.

use orienteer_core::{GenerationConfig, MapVariant, course_length, generate_world, preview};
use glam::DVec2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let seed = 2025;
    for variant in MapVariant::ALL {
        if variant == MapVariant::Custom {
            continue;
        }
        let world = generate_world(&GenerationConfig::from_variant(variant, seed));
        let filename = format!("{}.png", variant.id());
        preview::save_map(&world, 512, &filename)?;
        println!(
            "Saved {} ({} objects, {} checkpoints, course {:.0} m)",
            filename,
            world.objects.len(),
            world.checkpoints.len(),
            course_length(&world.checkpoints, DVec2::ZERO)
        );
    }
    Ok(())
}
