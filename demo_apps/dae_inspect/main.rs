//! Prints the compiled scene of a `.dae` file.
//!
//! ```text
//! dae_inspect <file.dae> [options.json]
//! RUST_LOG=myth_dae=info dae_inspect model.dae
//! ```

use std::path::PathBuf;

use anyhow::{Context, bail};
use myth_dae::scene::{NodeKey, SceneGraph};
use myth_dae::{ColladaLoader, LoadOptions};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        bail!("usage: dae_inspect <file.dae> [options.json]");
    };
    let options = match args.next() {
        Some(config) => {
            let json = std::fs::read_to_string(&config).with_context(|| format!("reading {config}"))?;
            LoadOptions::from_json(&json)?
        }
        None => LoadOptions::default(),
    };

    let scene = ColladaLoader::new(options)
        .load_file(&path)
        .with_context(|| format!("loading {}", path.display()))?;

    println!("{}", path.display());
    println!(
        "  up axis {:?}, {} m per unit",
        scene.metadata.up_axis, scene.metadata.unit
    );
    for &root in &scene.root_nodes {
        print_node(&scene, root, 1);
    }

    println!("materials:");
    for material in scene.materials.values() {
        println!(
            "  {} ({}){}{}",
            material.name,
            material.kind,
            if material.two_sided() { " two-sided" } else { "" },
            if material.blend() { " blended" } else { "" },
        );
    }
    for (key, skeleton) in &scene.skeletons {
        println!("skeleton {} ({} bones)", skeleton.name, skeleton.len());
        for clip in scene.clips(key) {
            println!("  clip {} {:.2}s, {} tracks", clip.name, clip.duration, clip.tracks.len());
        }
    }
    if let Some(bounds) = scene.bounds() {
        println!("bounds {} .. {}", bounds.min, bounds.max);
    }
    Ok(())
}

fn print_node(scene: &SceneGraph, key: NodeKey, depth: usize) {
    let Some(node) = scene.node(key) else { return };
    let indent = "  ".repeat(depth);
    let label = if node.name.is_empty() { "<unnamed>" } else { &node.name };
    println!("{indent}{label}");
    for mesh in scene.meshes_of(key) {
        let material = scene.material_of(mesh).map_or("-", |m| m.name.as_str());
        println!(
            "{indent}  mesh {} [{} tris, material {material}{}]",
            mesh.name,
            mesh.data.triangle_count(),
            if mesh.data.is_skinned() { ", skinned" } else { "" },
        );
    }
    for &light in &node.lights {
        if let Some(light) = scene.lights.get(light) {
            println!("{indent}  light {} {:?}", light.name, light.kind);
        }
    }
    for &child in node.children() {
        print_node(scene, child, depth + 1);
    }
}
