//! Spline mesh statistics

use anyhow::{bail, Result};
use strand_runtime::{Environment, MeshData};
use strand_spline::generate_spline_mesh;
use tracing::warn;

use crate::scene_file::LoadedScene;

pub fn run(scene_path: &str, only: Option<&str>) -> Result<()> {
    let scene = LoadedScene::load(scene_path)?;

    let selected: Vec<_> = scene
        .splines
        .iter()
        .filter(|(_, name, _)| only.map_or(true, |n| name.as_str() == n))
        .collect();
    if selected.is_empty() {
        match only {
            Some(name) => bail!("no spline named '{}' in {}", name, scene_path),
            None => {
                println!("No splines in {}", scene_path);
                return Ok(());
            }
        }
    }

    for (id, name, config) in selected {
        let points = scene.spline_points(*id);
        let terrain = match config.terrain.as_deref() {
            Some(t) => {
                let found = scene.env.terrain(t);
                if found.is_none() {
                    warn!(spline = %name, terrain = %t, "terrain not found, mesh is not draped");
                }
                found
            }
            None => None,
        };

        let ribbon = generate_spline_mesh(&points, config, terrain);
        println!("{}", name);
        println!("  control points: {}", points.len());

        if ribbon.is_empty() {
            println!("  (empty mesh: needs 2+ control points and a positive width and segment length)");
            continue;
        }

        let mesh = MeshData::from_ribbon(ribbon, config.cast_shadows);
        println!("  path points:    {}", mesh.vertex_count() / 3);
        println!("  vertices:       {}", mesh.vertex_count());
        println!("  indices:        {}", mesh.index_count());
        println!(
            "  vertex buffer:  {} bytes ({} per vertex)",
            mesh.vertex_bytes().len(),
            mesh.stride()
        );
        if let Some(bounds) = mesh.bounds {
            let (min, max) = (bounds.aabb.min, bounds.aabb.max);
            println!(
                "  bounds:         ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
                min.x, min.y, min.z, max.x, max.y, max.z
            );
            println!(
                "  sphere:         r = {:.2} around ({:.2}, {:.2}, {:.2})",
                bounds.sphere.radius,
                bounds.sphere.center.x,
                bounds.sphere.center.y,
                bounds.sphere.center.z
            );
        }
        println!(
            "  material:       {}",
            config.material.as_deref().unwrap_or("(none, not drawn)")
        );
    }

    Ok(())
}
