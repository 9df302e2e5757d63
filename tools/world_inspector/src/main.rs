use std::env;
use std::path::Path;

use isleforge_persist::container;
use isleforge_shared::coords::ChunkCoord;

fn main() {
    let Some(path) = env::args().nth(1) else {
        eprintln!("Usage: world_inspector <path/to/chunk_data.islw>");
        std::process::exit(2);
    };

    if let Err(err) = run(Path::new(&path)) {
        eprintln!("world_inspector error: {err}");
        std::process::exit(1);
    }
}

fn run(path: &Path) -> Result<(), String> {
    let world = container::load_world(path)
        .map_err(|err| format!("failed to open {}: {err}", path.display()))?;

    println!("World: {}", path.display());
    println!("Magic: {:?}", container::MAGIC);
    println!("Chunk count: {}", world.len());

    let mut coords: Vec<ChunkCoord> = world.keys().copied().collect();
    coords.sort();
    for coord in coords {
        println!("  chunk @ ({}, {})", coord.cx, coord.cy);
    }

    Ok(())
}
