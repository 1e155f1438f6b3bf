//! Frame-by-frame scene simulation along the camera path

use std::time::Instant;

use anyhow::Result;
use strand_runtime::{FrameContext, RuntimeSystem};
use tracing::info;

use super::{InstanceStats, MeshStats};
use crate::scene_file::{camera_at, LoadedScene};

pub struct RunArgs {
    pub scene: String,
    pub frames: usize,
    pub threads: Option<usize>,
}

pub fn run(args: RunArgs) -> Result<()> {
    let mut loaded = LoadedScene::load(&args.scene)?;
    let mut scene = loaded.build_scene(args.threads)?;
    let mut meshes = MeshStats::default();
    let mut instances = InstanceStats::default();

    {
        let mut ctx = FrameContext {
            env: &loaded.env,
            meshes: &mut meshes,
            instances: &mut instances,
        };
        scene.initialize(&mut ctx)?;
    }

    let dt = 1.0 / 60.0;
    let start = Instant::now();
    let mut peak = 0;

    for frame in 0..args.frames {
        let camera = camera_at(&loaded.camera_path, frame, args.frames);
        loaded.env.set_camera(camera);

        let frame_start = Instant::now();
        let mut ctx = FrameContext {
            env: &loaded.env,
            meshes: &mut meshes,
            instances: &mut instances,
        };
        scene.update(&mut ctx, dt)?;

        let visible = instances.total();
        peak = peak.max(visible);
        match camera {
            Some(c) => println!(
                "frame {:>4}  camera ({:>7.2}, {:>6.2}, {:>7.2})  visible {:>7}  {:>6.2} ms",
                frame,
                c.x,
                c.y,
                c.z,
                visible,
                frame_start.elapsed().as_secs_f64() * 1000.0
            ),
            None => println!("frame {:>4}  no camera  visible {:>7}", frame, visible),
        }
    }

    let elapsed = start.elapsed().as_secs_f64();
    info!(
        frames = args.frames,
        meshes = meshes.meshes.len(),
        uploads = meshes.uploads,
        peak_visible = peak,
        "run finished"
    );
    if args.frames > 0 {
        println!(
            "{} frames in {:.2} s ({:.2} ms/frame), {} spline meshes, peak {} visible instances",
            args.frames,
            elapsed,
            elapsed * 1000.0 / args.frames as f64,
            meshes.meshes.len(),
            peak
        );
    }

    scene.shutdown()?;
    Ok(())
}
