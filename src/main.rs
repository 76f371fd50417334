use anyhow::Result;
use glam::Vec3;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use voxide::{Ray, VoxelEngine, WorldGenConfig};

fn main() -> Result<()> {
    SimpleLogger::new().with_level(LevelFilter::Info).init()?;
    info!("Initializing voxel world...");

    let config = WorldGenConfig::default();
    let mut engine = VoxelEngine::new(&config);

    let spawn = engine.world().recommended_spawn();
    info!("recommended spawn: {spawn}");
    info!(
        "trees: {}, flowers: {}",
        engine.tree_count(),
        engine.flower_count()
    );

    // A short headless session: look straight down from the spawn point and
    // dig a few blocks, rebuilding only what each edit touched.
    let down = Vec3::new(0.0, -1.0, 0.0);
    for frame in 0..5 {
        let ray = Ray::new(spawn, down);
        match engine.break_at_ray(&ray, 16.0) {
            Some(hit) => info!(
                "frame {frame}: broke block at {} (distance {:.2})",
                hit.cell, hit.distance
            ),
            None => {
                info!("frame {frame}: nothing left to dig within reach");
                break;
            }
        }
        let rebuilt = engine.update();
        info!("frame {frame}: rebuilt {rebuilt} chunks");
    }

    let ground_speed = {
        let below = spawn - Vec3::new(0.0, 3.0, 0.0);
        engine.world().speed_modifier_at(
            below.x.floor() as i32,
            below.y.floor() as i32,
            below.z.floor() as i32,
        )
    };
    info!("movement speed modifier under spawn: {ground_speed}");

    Ok(())
}
