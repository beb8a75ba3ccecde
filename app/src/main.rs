mod settings;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use glam::DVec3;
use orienteer_core::{
    ConfigError, GenerationConfig, MapVariant, WorldData, classify_terrain, compass_point,
    compute_bearing, compute_slope, course_length, generate_world, preview,
    query_distance_to_nearest_river, query_distance_to_nearest_road, query_height,
    relative_direction,
};
use orienteer_storage::MapCatalog;
use orienteer_storage::models::MapDoc;
use tracing::{info, warn};

use crate::settings::{AppConfig, Source, StorageConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Procedural orienteering map generator", long_about = None)]
struct Cli {
    /// Path to orienteer.toml configuration file
    #[arg(short, long, default_value = "./orienteer.toml")]
    config: PathBuf,

    /// Log level (trace|debug|info|warn|error), overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a world, optionally writing JSON and a PNG preview
    Generate {
        #[command(flatten)]
        map: MapArgs,

        /// Write the generated world as JSON
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write a top-down preview image
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Preview edge length in pixels
        #[arg(long, default_value_t = 512)]
        pixels: u32,
    },
    /// Describe the terrain at a point
    Query {
        #[command(flatten)]
        map: MapArgs,

        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        #[arg(long, allow_negative_numbers = true)]
        z: f64,

        /// Facing direction in degrees, for a relative hint to checkpoint 1
        #[arg(long, allow_negative_numbers = true)]
        heading: Option<f64>,
    },
    /// Manage the MongoDB map catalogue
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// List the built-in maps
    Variants,
}

#[derive(Subcommand, Debug)]
enum CatalogAction {
    /// Generate a map and store it under a name
    Save {
        name: String,
        #[command(flatten)]
        map: MapArgs,
    },
    /// Regenerate a stored map and verify it
    Load {
        name: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    List,
    Delete {
        name: String,
    },
}

/// Overrides applied on top of the `[generation]` section.
#[derive(Args, Debug, Clone, Default)]
struct MapArgs {
    /// Start from a catalogue preset instead of the config file
    #[arg(long, value_parser = parse_variant)]
    variant: Option<MapVariant>,

    #[arg(long)]
    seed: Option<u64>,

    /// Map side length in meters
    #[arg(long)]
    size: Option<f64>,

    #[arg(long)]
    segments: Option<u32>,

    #[arg(long)]
    checkpoints: Option<u32>,
}

fn parse_variant(id: &str) -> Result<MapVariant, ConfigError> {
    MapVariant::parse(id)
}

impl MapArgs {
    fn resolve(&self, base: &GenerationConfig) -> Result<GenerationConfig, ConfigError> {
        let seed = self.seed.unwrap_or(base.seed);
        let mut config = match self.variant {
            Some(variant) => GenerationConfig::from_variant(variant, seed),
            None => GenerationConfig {
                seed,
                ..base.clone()
            },
        };
        if let Some(size) = self.size {
            config.map_size = size;
        }
        if let Some(segments) = self.segments {
            config.segments = segments;
        }
        if let Some(checkpoints) = self.checkpoints {
            config.checkpoint_count = checkpoints;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(cli_level: Option<&str>, config: &AppConfig) {
    let level = cli_level.unwrap_or(&config.logging.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn timed_generate(config: &GenerationConfig) -> WorldData {
    let start = Instant::now();
    let world = generate_world(config);
    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        placed = world.report.total_placed(),
        skipped = world.report.total_skipped(),
        "generation finished"
    );
    world
}

fn write_json(world: &WorldData, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), world)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "world written");
    Ok(())
}

fn print_summary(world: &WorldData) {
    let c = &world.config;
    println!(
        "{} seed={} size={}m segments={}",
        c.map_variant, c.seed, c.map_size, c.segments
    );
    let network: f64 = world.roads.iter().map(|r| r.length()).sum();
    println!(
        "  roads={} ({network:.0} m) rivers={} pools={} checkpoints={}",
        world.roads.len(),
        world.rivers.len(),
        world.pools.len(),
        world.checkpoints.len()
    );
    for class in &world.report.classes {
        println!(
            "  {:?}: {}/{} placed, {} skipped",
            class.class, class.placed, class.requested, class.skipped
        );
    }
    println!(
        "  course length from centre: {:.0} m",
        course_length(&world.checkpoints, glam::DVec2::ZERO)
    );
}

fn run_query(world: &WorldData, x: f64, z: f64, heading: Option<f64>) {
    let fmt_distance = |d: Option<f64>| d.map_or_else(|| "none".to_string(), |d| format!("{d:.1} m"));
    println!("height:  {:.2} m", query_height(world, x, z));
    println!("slope:   {:.1}°", compute_slope(world, x, z));
    println!("road:    {}", fmt_distance(query_distance_to_nearest_road(world, x, z)));
    println!("water:   {}", fmt_distance(query_distance_to_nearest_river(world, x, z)));
    println!("terrain: {:?}", classify_terrain(world, x, z));

    if let Some(first) = world.checkpoints.first() {
        let here = DVec3::new(x, query_height(world, x, z), z);
        let bearing = compute_bearing(here, first.position);
        print!(
            "{}:    {:.0}° ({})",
            first.name,
            bearing,
            compass_point(bearing).label()
        );
        match heading {
            Some(h) => println!(", {:?}", relative_direction(bearing, h)),
            None => println!(),
        }
    }
}

fn catalog_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build Tokio runtime")
}

fn run_catalog(action: CatalogAction, app: &AppConfig) -> Result<()> {
    let StorageConfig {
        uri,
        database,
        collection,
    } = &app.storage;
    let rt = catalog_runtime()?;
    rt.block_on(async {
        let catalog = MapCatalog::init(uri, database, collection).await?;
        match action {
            CatalogAction::Save { name, map } => {
                let config = map.resolve(&app.generation)?;
                let world = timed_generate(&config);
                catalog.save(&MapDoc::from_world(&name, &world)).await?;
                println!("saved '{name}' ({})", config.map_variant);
            }
            CatalogAction::Load { name, out } => {
                let doc = catalog.load(&name).await?;
                let world = timed_generate(&doc.generation_config());
                if !doc.matches(&world) {
                    bail!("map '{name}' no longer regenerates identically");
                }
                print_summary(&world);
                if let Some(path) = out {
                    write_json(&world, &path)?;
                }
            }
            CatalogAction::List => {
                for name in catalog.list_names().await? {
                    println!("{name}");
                }
            }
            CatalogAction::Delete { name } => {
                catalog.delete(&name).await?;
                println!("deleted '{name}'");
            }
        }
        Ok::<_, anyhow::Error>(())
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (app, source) = AppConfig::load_or_default(&cli.config)?;
    init_logging(cli.log_level.as_deref(), &app);
    match source {
        Source::File => info!(path = %cli.config.display(), "loaded configuration"),
        Source::Defaults => warn!(path = %cli.config.display(), "config file not found, using defaults"),
    }

    match cli.command {
        Command::Generate {
            map,
            out,
            preview: preview_path,
            pixels,
        } => {
            let config = map.resolve(&app.generation)?;
            let world = timed_generate(&config);
            print_summary(&world);
            if let Some(path) = out {
                write_json(&world, &path)?;
            }
            if let Some(path) = preview_path {
                preview::save_map(&world, pixels, &path)?;
            }
        }
        Command::Query { map, x, z, heading } => {
            let config = map.resolve(&app.generation)?;
            let world = timed_generate(&config);
            run_query(&world, x, z, heading);
        }
        Command::Catalog { action } => run_catalog(action, &app)?,
        Command::Variants => {
            for variant in MapVariant::ALL {
                println!(
                    "{:<17} {:>5} m  {:>2} checkpoints  {:?}",
                    variant.id(),
                    variant.default_size(),
                    variant.default_checkpoints(),
                    variant.difficulty()
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_generate() {
        let cli = Cli::try_parse_from([
            "orienteer",
            "generate",
            "--variant",
            "swamp-area",
            "--seed",
            "7",
            "--preview",
            "map.png",
        ])
        .unwrap();
        match cli.command {
            Command::Generate { map, preview, pixels, .. } => {
                assert_eq!(map.variant, Some(MapVariant::SwampArea));
                assert_eq!(map.seed, Some(7));
                assert_eq!(preview, Some(PathBuf::from("map.png")));
                assert_eq!(pixels, 512);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_unknown_variant() {
        assert!(Cli::try_parse_from(["orienteer", "generate", "--variant", "moon"]).is_err());
    }

    #[test]
    fn query_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["orienteer", "query", "--x", "-12.5", "--z", "3"]).unwrap();
        assert!(matches!(cli.command, Command::Query { x, .. } if x == -12.5));
    }

    #[test]
    fn overrides_apply_on_top_of_variant() {
        let args = MapArgs {
            variant: Some(MapVariant::HillyTerrain),
            seed: Some(3),
            segments: Some(40),
            ..MapArgs::default()
        };
        let config = args.resolve(&GenerationConfig::default()).unwrap();
        assert_eq!(config.map_size, 300.0);
        assert_eq!(config.segments, 40);
        assert_eq!(config.seed, 3);
        assert_eq!(config.checkpoint_count, 7);
    }

    #[test]
    fn seed_override_keeps_base_config() {
        let base = GenerationConfig::from_variant(MapVariant::SmallDetailed, 1);
        let args = MapArgs {
            seed: Some(99),
            ..MapArgs::default()
        };
        let config = args.resolve(&base).unwrap();
        assert_eq!(config.map_variant, MapVariant::SmallDetailed);
        assert_eq!(config.seed, 99);
    }

    #[test]
    fn json_export_reloads_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.json");
        let world = generate_world(&GenerationConfig::from_variant(MapVariant::ForestPark, 12));
        write_json(&world, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: WorldData = serde_json::from_str(&text).unwrap();
        assert_eq!(back, world);
    }

    #[test]
    fn oversized_map_is_rejected() {
        let args = MapArgs {
            size: Some(1e20),
            ..MapArgs::default()
        };
        assert!(matches!(
            args.resolve(&GenerationConfig::default()),
            Err(ConfigError::MapTooLarge { .. })
        ));
    }

    #[test]
    fn invalid_overrides_are_config_errors() {
        let args = MapArgs {
            checkpoints: Some(500),
            ..MapArgs::default()
        };
        assert!(matches!(
            args.resolve(&GenerationConfig::default()),
            Err(ConfigError::TooManyCheckpoints { got: 500, .. })
        ));
    }
}
