//! Vegetation page statistics and top-down preview

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use strand_runtime::{FrameContext, RuntimeSystem};

use super::{InstanceStats, MeshStats};
use crate::scene_file::LoadedScene;

pub struct ScatterArgs {
    pub scene: String,
    pub preview: Option<String>,
    pub resolution: u32,
}

const LAYER_COLORS: [[u8; 3]; 4] = [[96, 200, 80], [220, 190, 60], [70, 150, 220], [210, 90, 160]];

pub fn run(args: ScatterArgs) -> Result<()> {
    let mut loaded = LoadedScene::load(&args.scene)?;
    let mut scene = loaded.build_scene(None)?;

    // Pages do not depend on the camera; build them without culling anything in
    loaded.env.set_camera(None);
    let mut meshes = MeshStats::default();
    let mut instances = InstanceStats::default();
    let mut ctx = FrameContext {
        env: &loaded.env,
        meshes: &mut meshes,
        instances: &mut instances,
    };
    scene.initialize(&mut ctx)?;
    scene.update(&mut ctx, 0.0)?;

    let mut preview = args
        .preview
        .as_ref()
        .map(|_| RgbImage::from_pixel(args.resolution, args.resolution, Rgb([24, 28, 24])));
    let terrain_size = loaded.env.terrain_sampler().size();

    for (i, (id, name, config)) in loaded.vegetation.iter().enumerate() {
        let Some(pages) = scene.vegetation().pages(*id) else {
            println!("{}: not built (see log)", name);
            continue;
        };

        let total: usize = pages.iter().map(|p| p.instances.len()).sum();
        let filled = pages.iter().filter(|p| !p.is_empty()).count();
        println!("{}", name);
        println!("  pages:     {} ({} with instances)", pages.len(), filled);
        println!("  instances: {}", total);
        println!("  density:   {} per unit, seed {}", config.density, config.seed);
        if !config.blocking_splines.is_empty() {
            println!("  blocked by: {}", config.blocking_splines.join(", "));
        }

        if let Some(img) = preview.as_mut() {
            let color = Rgb(LAYER_COLORS[i % LAYER_COLORS.len()]);
            for m in pages.iter().flat_map(|p| p.instances.iter()) {
                if let Some((px, py)) = to_pixel(m.w_axis.x, m.w_axis.z, terrain_size, args.resolution) {
                    img.put_pixel(px, py, color);
                }
            }
        }
    }

    if let (Some(img), Some(path)) = (preview, args.preview.as_ref()) {
        img.save(path)
            .with_context(|| format!("failed to write preview '{}'", path))?;
        println!("Preview written to {}", path);
    }

    scene.shutdown()?;
    Ok(())
}

/// Centred world XZ to preview pixel
fn to_pixel(x: f32, z: f32, terrain_size: f32, resolution: u32) -> Option<(u32, u32)> {
    let half = terrain_size * 0.5;
    let u = (x + half) / terrain_size * resolution as f32;
    let v = (z + half) / terrain_size * resolution as f32;
    if u < 0.0 || v < 0.0 {
        return None;
    }
    let (u, v) = (u as u32, v as u32);
    (u < resolution && v < resolution).then_some((u, v))
}
