mod driver;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glam::{UVec2, Vec2};
use tileworld_assets::{EntityCatalog, TileCatalog};
use tileworld_common::WorldName;
use tileworld_kernel::{World, WorldConfig, WorldSource};
use tileworld_persist::SaveStore;
use tileworld_render::{RecordingSurface, RenderView, render_frame};
use tracing_subscriber::EnvFilter;

use driver::{Driver, Input};

#[derive(Parser)]
#[command(name = "tileworld-cli", about = "Headless driver for tile worlds")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding one save directory per world
    #[arg(long, default_value = "./saves")]
    save_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new world and save it
    Generate {
        #[arg(long)]
        name: String,
        /// Map edge length in tiles
        #[arg(short, long, default_value = "200")]
        size: i64,
        #[command(flatten)]
        generation: GenerationArgs,
        /// Name of the player entity (defaults to "Player")
        #[arg(long, default_value = "")]
        player_name: String,
        /// Overwrite an existing save
        #[arg(long)]
        force: bool,
    },
    /// Print a summary of a saved world
    Inspect {
        #[arg(long)]
        name: String,
    },
    /// Render one frame of a saved world and print the draw counts
    Render {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        camera_x: f32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        camera_y: f32,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Run the frame loop for a number of frames, then save
    Simulate {
        #[arg(long)]
        name: String,
        /// Map size used when the world has no save yet
        #[arg(short, long, default_value = "200")]
        size: i64,
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Seconds per frame
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
        /// Direction key held for the whole run
        #[arg(long = "move", value_enum, default_value_t = Move::None)]
        movement: Move,
        /// Pan the camera freely instead of steering the player
        #[arg(long)]
        unlock_camera: bool,
        /// Hold the fast-pan key
        #[arg(long)]
        fast: bool,
        #[command(flatten)]
        generation: GenerationArgs,
        #[command(flatten)]
        window: WindowArgs,
    },
}

#[derive(Args)]
struct GenerationArgs {
    /// JSON file with WorldConfig fields; flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    entities: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    tile_size: Option<u32>,
}

impl GenerationArgs {
    fn resolve(&self) -> Result<WorldConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("opening config {}", path.display()))?;
                serde_json::from_reader(file)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => WorldConfig::default(),
        };
        if let Some(n) = self.entities {
            config.entity_count = n;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(tile_size) = self.tile_size {
            config.tile_size = tile_size;
        }
        Ok(config)
    }
}

#[derive(Args)]
struct WindowArgs {
    #[arg(long, default_value = "1920")]
    width: u32,
    #[arg(long, default_value = "1080")]
    height: u32,
    /// Resource directory with `entities/` and `tiles/` catalogs (builtin if omitted)
    #[arg(long)]
    assets: Option<PathBuf>,
}

impl WindowArgs {
    fn viewport(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    fn catalogs(&self, tile_size: u32) -> Result<(TileCatalog, EntityCatalog)> {
        match &self.assets {
            Some(dir) => Ok((
                TileCatalog::load_dir(dir.join("tiles"), tile_size)?,
                EntityCatalog::load_dir(dir.join("entities"))?,
            )),
            None => Ok((TileCatalog::builtin(tile_size), EntityCatalog::builtin())),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Move {
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    fn input(self, fast: bool) -> Input {
        Input {
            up: self == Move::Up,
            down: self == Move::Down,
            left: self == Move::Left,
            right: self == Move::Right,
            fast,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let store = SaveStore::new(&cli.save_root);
    match cli.command {
        Commands::Generate {
            name,
            size,
            generation,
            player_name,
            force,
        } => {
            let config = generation.resolve()?;
            let mut world = World::generate(&name, size, &config)?;
            world.set_player_name(&player_name);
            if store.exists(world.name()) && !force {
                bail!("world {name} already has a save, pass --force to overwrite");
            }
            let path = store.save(&world)?;
            println!(
                "Generated {} ({}x{} tiles, {} entities) -> {}",
                world.name(),
                world.map_size(),
                world.map_size(),
                world.loaded_entities(),
                path.display()
            );
        }
        Commands::Inspect { name } => {
            let world = load(&store, &name)?;
            print_summary(&world);
        }
        Commands::Render {
            name,
            camera_x,
            camera_y,
            window,
        } => {
            let world = load(&store, &name)?;
            let (tiles, entities) = window.catalogs(world.tile_size())?;
            let view = RenderView::new(Vec2::new(camera_x, camera_y), window.viewport());
            let mut surface = RecordingSurface::new();
            let stats = render_frame(&world, &mut surface, &view, &tiles, &entities)?;
            println!("{stats}");
        }
        Commands::Simulate {
            name,
            size,
            frames,
            dt,
            movement,
            unlock_camera,
            fast,
            generation,
            window,
        } => {
            let parsed = WorldName::parse(&name)?;
            let config = generation.resolve()?;
            // Only an absent save falls back to generation; a broken one is an error.
            let source: Option<&dyn WorldSource> = if store.exists(&parsed) {
                Some(&store)
            } else {
                None
            };
            let mut world = World::create(&name, size, &config, source)?;
            if unlock_camera {
                world.set_camera_locked(false);
            }

            let (tiles, entities) = window.catalogs(world.tile_size())?;
            let mut driver = Driver::new(window.viewport());
            let input = movement.input(fast);
            let mut surface = RecordingSurface::new();
            let mut last = None;
            for frame in 0..frames {
                let view = driver.frame(&mut world, &input, dt);
                surface.clear();
                let stats = render_frame(&world, &mut surface, &view, &tiles, &entities)?;
                tracing::debug!(
                    frame,
                    tiles = stats.tiles_rendered,
                    entities = stats.entities_rendered,
                    "frame rendered"
                );
                last = Some(stats);
            }

            if let Some(stats) = last {
                println!("{stats}");
            }
            let p = world.player().position;
            let camera = driver.camera();
            println!(
                "Player at ({:.1}, {:.1}), camera at ({:.1}, {:.1}), camera {}",
                p.x,
                p.y,
                camera.x,
                camera.y,
                if world.camera_locked() { "locked" } else { "free" }
            );
            let path = store.save(&world)?;
            println!("Saved -> {}", path.display());
        }
    }

    Ok(())
}

fn load(store: &SaveStore, name: &str) -> Result<World> {
    let parsed = WorldName::parse(name)?;
    store
        .load(&parsed)
        .with_context(|| format!("loading world {name} from {}", store.root().display()))
}

fn print_summary(world: &World) {
    println!("World {}", world.name());
    println!(
        "  map: {0}x{0} tiles of {1}px",
        world.map_size(),
        world.tile_size()
    );

    // Collapse runs of equal rows into latitude bands.
    let mut bands: Vec<(usize, usize, &str)> = Vec::new();
    for (row, biomes) in world.tiles().rows().enumerate() {
        let name = biomes.first().map_or("?", |b| b.name());
        match bands.last_mut() {
            Some(band) if band.2 == name => band.1 = row,
            _ => bands.push((row, row, name)),
        }
    }
    for (start, end, name) in bands {
        println!("  rows {start:>4}-{end:<4} {name}");
    }

    let mut by_type: BTreeMap<u32, usize> = BTreeMap::new();
    for e in world.entities() {
        *by_type.entry(e.type_id().0).or_default() += 1;
    }
    println!("  entities: {}", world.loaded_entities());
    for (type_id, count) in by_type {
        println!("    type {type_id}: {count}");
    }

    let player = world.player();
    let velocity = player.controller().map_or(Vec2::ZERO, |c| c.velocity);
    println!(
        "  player {} {}: pos=({:.2}, {:.2}) vel=({:.2}, {:.2}) camera {}",
        world.player_name(),
        player.id(),
        player.position.x,
        player.position.y,
        velocity.x,
        velocity.y,
        if world.camera_locked() { "locked" } else { "free" }
    );
    println!("  next entity id: {}", world.next_entity_id());
}
