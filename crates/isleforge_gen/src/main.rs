mod jobs;
mod layout;
mod orchestrator;
mod store;

use std::env;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use isleforge_persist::biome_map::{self, BiomeMapFormat};
use isleforge_shared::biome::{Biome, BiomeGrid};
use isleforge_shared::catalog::BiomeCatalog;
use isleforge_shared::classifier::BiomeClassifier;
use isleforge_shared::worldgen::ChunkGenerator;

use crate::jobs::JobSystem;
use crate::layout::WorldLayout;
use crate::orchestrator::GenerationOrchestrator;
use crate::store::{ChunkStore, CACHE_LIMIT};

const DEFAULT_WORLD_SEED: u64 = 42;
const DEFAULT_REGION_SPAN: u32 = 10;

struct GenOptions {
    world: Option<String>,
    width: u32,
    height: u32,
    seed: u64,
    biomes: PathBuf,
    saves_root: PathBuf,
    threads: Option<usize>,
    timeout: Option<Duration>,
    png: bool,
    preview: bool,
    map_format: BiomeMapFormat,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            world: None,
            width: DEFAULT_REGION_SPAN,
            height: DEFAULT_REGION_SPAN,
            seed: DEFAULT_WORLD_SEED,
            biomes: PathBuf::from("config/biomes.toml"),
            saves_root: PathBuf::from("saves"),
            threads: None,
            timeout: None,
            png: false,
            preview: false,
            map_format: BiomeMapFormat::Names,
        }
    }
}

fn usage() {
    println!(
        "Usage: isleforge_gen [--world <name>] [--size <WxH>] [--seed <u64>] \
         [--biomes <path>] [--saves <dir>] [--threads <n>] [--timeout <secs>] \
         [--map-format <names|codes>] [--png] [--preview]"
    );
}

fn expect_value(args: &mut impl Iterator<Item = String>, flag: &str) -> String {
    let Some(value) = args.next() else {
        eprintln!("{flag} expects an argument");
        process::exit(2);
    };
    value
}

fn parse_args() -> GenOptions {
    let mut options = GenOptions::default();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--world" => {
                options.world = Some(expect_value(&mut args, "--world"));
            }
            "--size" => {
                let value = expect_value(&mut args, "--size");
                let Some((w, h)) = value.split_once('x') else {
                    eprintln!("--size expects <WxH>, e.g. 10x10");
                    process::exit(2);
                };
                match (w.parse::<u32>(), h.parse::<u32>()) {
                    (Ok(width), Ok(height)) => {
                        options.width = width;
                        options.height = height;
                    }
                    _ => {
                        eprintln!("invalid size '{value}'");
                        process::exit(2);
                    }
                }
            }
            "--seed" => {
                let value = expect_value(&mut args, "--seed");
                match value.parse::<u64>() {
                    Ok(seed) => options.seed = seed,
                    Err(err) => {
                        eprintln!("invalid seed '{value}': {err}");
                        process::exit(2);
                    }
                }
            }
            "--biomes" => {
                options.biomes = PathBuf::from(expect_value(&mut args, "--biomes"));
            }
            "--saves" => {
                options.saves_root = PathBuf::from(expect_value(&mut args, "--saves"));
            }
            "--threads" => {
                let value = expect_value(&mut args, "--threads");
                match value.parse::<usize>() {
                    Ok(count) if count > 0 => options.threads = Some(count),
                    _ => {
                        eprintln!("invalid thread count '{value}'");
                        process::exit(2);
                    }
                }
            }
            "--timeout" => {
                let value = expect_value(&mut args, "--timeout");
                match value.parse::<u64>() {
                    Ok(secs) => options.timeout = Some(Duration::from_secs(secs)),
                    Err(err) => {
                        eprintln!("invalid timeout '{value}': {err}");
                        process::exit(2);
                    }
                }
            }
            "--map-format" => {
                let value = expect_value(&mut args, "--map-format");
                match value.parse::<BiomeMapFormat>() {
                    Ok(format) => options.map_format = format,
                    Err(err) => {
                        eprintln!("{err}");
                        process::exit(2);
                    }
                }
            }
            "--png" => options.png = true,
            "--preview" => options.preview = true,
            "--help" | "-h" => {
                usage();
                process::exit(0);
            }
            other => {
                eprintln!("unknown argument: {other}");
                process::exit(2);
            }
        }
    }

    options
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn biome_symbol(biome: Biome) -> char {
    match biome {
        Biome::Plains => '.',
        Biome::Forest => 'T',
        Biome::Mountains => '^',
        Biome::Desert => '#',
        Biome::Water => '~',
        Biome::Snow => '*',
        Biome::Ocean => '=',
        Biome::ColdOcean => '-',
        Biome::IceOcean => '_',
    }
}

/// Text visualization of the blended top-left corner of the map.
fn print_preview(grid: &BiomeGrid) {
    let rows = grid.side().min(20);
    let cols = grid.side().min(40);
    for y in 0..rows {
        let line: String = (0..cols)
            .map(|x| biome_symbol(grid.blend(x as i32, y as i32)))
            .collect();
        println!("{line}");
    }
}

fn run(options: GenOptions) -> Result<(), Box<dyn Error>> {
    let world_name = match options.world.clone() {
        Some(name) => name,
        None => prompt("name: ")?,
    };
    if world_name.is_empty() {
        return Err("world name must not be empty".into());
    }

    let catalog = BiomeCatalog::load(&options.biomes)?;
    info!("Loaded biome catalog with {} biomes", catalog.len());

    let layout = WorldLayout::create(&options.saves_root, &world_name)?;

    let grid = match biome_map::load_biome_map(&layout.biome_map_path()) {
        Ok(grid) => {
            info!("Loaded {0}x{0} biome map", grid.side());
            grid
        }
        Err(err) if err.is_not_found() => {
            let grid = BiomeClassifier::new(options.seed).build_grid();
            biome_map::save_biome_map(&layout.biome_map_path(), &grid, options.map_format)?;
            info!("Built {0}x{0} biome map from seed {1}", grid.side(), options.seed);
            grid
        }
        Err(err) => return Err(err.into()),
    };

    if options.png {
        biome_map::save_biome_map_png(&layout.biome_map_png_path(), &grid, catalog.color_table())?;
    }
    if options.preview {
        print_preview(&grid);
    }

    let generator = ChunkGenerator::new(options.seed, grid, catalog);
    let store = Arc::new(ChunkStore::new(
        generator,
        CACHE_LIMIT,
        layout.container_path(),
    ));
    store.load_all()?;

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, flushing generated chunks...");
        cancel_flag.store(true, Ordering::SeqCst);
    })?;

    let jobs = JobSystem::new(options.threads)?;
    let orchestrator =
        GenerationOrchestrator::new(store, jobs, cancel).with_timeout(options.timeout);
    let report = orchestrator.generate_region(options.width, options.height)?;

    info!(
        "World '{world_name}' ready: {} of {} chunks generated this run, {} persisted{}",
        report.chunks_generated,
        report.chunks_requested,
        report.chunks_saved,
        if report.cancelled { " (interrupted)" } else { "" }
    );
    Ok(())
}

fn main() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();

    let options = parse_args();
    if let Err(err) = run(options) {
        eprintln!("isleforge_gen failed: {err}");
        process::exit(1);
    }
}
