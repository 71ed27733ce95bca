//! Blockyard command line
//!
//! Usage:
//!   blockyard import --tab blocks grass.png dirt.png
//!   blockyard import --tab environment robot.gltf
//!   blockyard list
//!   blockyard delete-block 100
//!   blockyard delete-model 300 --yes
//!   blockyard export-block 100 --out ./faces
//!   blockyard place-block 100 --at 0,0,0
//!   blockyard place-object robot --at 1,0,2 --random
//!   blockyard create-texture --name mossy --from seed.png --color 3a7d2cff --face top

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use blockyard::import::{DroppedFile, ImportTab};
use blockyard::registry::Category;
use blockyard::texture::{export, FaceTarget, RasterBuffer, RasterDelta};
use blockyard::world::Position;
use blockyard::{
    AssetId, AssetManager, BlockAsset, DeleteOutcome, EditorConfig, EnvironmentAsset, LocalStorage, SceneError,
    SceneHooks,
};

#[derive(Parser)]
#[command(name = "blockyard", version = blockyard::VERSION)]
#[command(about = "Manage custom blocks and environment models of a voxel world")]
struct Cli {
    /// Directory holding persisted collections (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// RON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Tab {
    Blocks,
    Environment,
}

impl From<Tab> for ImportTab {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::Blocks => ImportTab::Blocks,
            Tab::Environment => ImportTab::Environment,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Import images as blocks or .gltf files as environment models
    Import {
        #[arg(long, value_enum, default_value = "blocks")]
        tab: Tab,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List every block and environment model
    List,
    /// Delete a custom block; placed copies become error blocks
    DeleteBlock {
        id: AssetId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Delete a custom environment model and every placed copy
    DeleteModel {
        id: AssetId,
        #[arg(long)]
        yes: bool,
    },
    /// Write a block's six faces as PNG files
    ExportBlock {
        id: AssetId,
        #[arg(long)]
        out: PathBuf,
    },
    /// Place a block in the terrain
    PlaceBlock {
        id: AssetId,
        /// Position as x,y,z
        #[arg(long)]
        at: Position,
    },
    /// Place an environment model by name
    PlaceObject {
        name: String,
        /// Position as x,y,z
        #[arg(long)]
        at: Position,
        /// Randomise scale and rotation within the configured ranges
        #[arg(long)]
        random: bool,
    },
    /// Author a texture and save it as a new block
    CreateTexture {
        #[arg(long)]
        name: Option<String>,
        /// Image to seed every face from
        #[arg(long)]
        from: Option<PathBuf>,
        /// Fill color as RRGGBB or RRGGBBAA hex
        #[arg(long)]
        color: Option<String>,
        /// Face to fill: all, top, bottom, left, right, front, back
        #[arg(long, default_value = "all")]
        face: String,
    },
}

/// Scene stand-in for the command line: logs every request
struct LogScene;

impl SceneHooks for LogScene {
    fn rebuild_terrain_visuals(&mut self) -> Result<(), SceneError> {
        log::info!("terrain visuals would be rebuilt");
        Ok(())
    }

    fn refresh_environment_from_db(&mut self) -> Result<(), SceneError> {
        log::info!("environment would be reloaded");
        Ok(())
    }

    fn add_custom_model(&mut self, model: &EnvironmentAsset) -> Result<(), SceneError> {
        log::info!("model \"{}\" registered with the scene", model.name);
        Ok(())
    }
}

fn main() -> Result<()> {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = EditorConfig::load_or_default(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Commands::PlaceObject { random: true, .. } = cli.command {
        config.placement.random_scale = true;
        config.placement.random_rotation = true;
    }
    log::debug!("data directory: {}", config.data_dir.display());

    let storage = LocalStorage::with_base_dir(&config.data_dir);
    let mut manager = AssetManager::open(storage, Box::new(LogScene), config).context("Failed to open asset store")?;

    match cli.command {
        Commands::Import { tab, files } => import(&mut manager, tab.into(), files),
        Commands::List => {
            list(&manager);
            Ok(())
        }
        Commands::DeleteBlock { id, yes } => {
            let Some(block) = manager.store().get::<BlockAsset>(id) else {
                println!("No block with id {}", id);
                return Ok(());
            };
            let affected = manager.store().terrain().positions_of(id).len();
            if !yes
                && !confirm(&format!(
                    "Delete block \"{}\"? {} placed cell(s) will show an error block.",
                    block.name, affected
                ))?
            {
                println!("Cancelled");
                return Ok(());
            }
            let outcome = manager
                .delete_block(id)
                .with_context(|| format!("Failed to delete block {}", id))?;
            print_outcome(outcome);
            Ok(())
        }
        Commands::DeleteModel { id, yes } => {
            let Some(model) = manager.store().get::<EnvironmentAsset>(id) else {
                println!("No model with id {}", id);
                return Ok(());
            };
            let affected = manager.store().environment().count_named(&model.name);
            if !yes
                && !confirm(&format!(
                    "Delete model \"{}\"? {} placed object(s) will be removed.",
                    model.name, affected
                ))?
            {
                println!("Cancelled");
                return Ok(());
            }
            let outcome = manager
                .delete_model(id)
                .with_context(|| format!("Failed to delete model {}", id))?;
            print_outcome(outcome);
            Ok(())
        }
        Commands::ExportBlock { id, out } => {
            let block = manager
                .store()
                .get::<BlockAsset>(id)
                .with_context(|| format!("No block with id {}", id))?;
            let written = export::write_block_faces(block, &out)?;
            for path in written {
                println!("{}", path.display());
            }
            Ok(())
        }
        Commands::PlaceBlock { id, at } => {
            manager.place_block(at, id)?;
            println!("Placed block {} at {}", id, at);
            Ok(())
        }
        Commands::PlaceObject { name, at, .. } => {
            let mut rng = rand::thread_rng();
            let position = [at.x as f32, at.y as f32, at.z as f32];
            let placed = manager.place_object(&name, position, &mut rng)?;
            println!(
                "Placed \"{}\" at {} (scale {:.2}, rotation {:.0})",
                placed.name, at, placed.transform.scale, placed.transform.rotation
            );
            Ok(())
        }
        Commands::CreateTexture {
            name,
            from,
            color,
            face,
        } => create_texture(&mut manager, name, from, color, &face),
    }
}

fn import(manager: &mut AssetManager<LocalStorage>, tab: ImportTab, files: Vec<PathBuf>) -> Result<()> {
    let files = files.into_iter().map(DroppedFile::from_path).collect();
    let report = manager.import(tab, files).context("Import failed")?;

    for (id, name) in &report.created {
        println!("+ {} {}", id, name);
    }
    for issue in &report.skipped {
        println!("skipped {}: {}", issue.file, issue.error);
    }
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    Ok(())
}

fn list(manager: &AssetManager<LocalStorage>) {
    let store = manager.store();
    for category in [Category::DefaultBlock, Category::CustomBlock] {
        println!("{}:", category);
        for block in store.list::<BlockAsset>(category) {
            let sides = if block.has_side_textures() { " (per-face)" } else { "" };
            println!("  {:>4}  {}{}", block.id, block.name, sides);
        }
    }
    for category in [Category::DefaultEnvironment, Category::CustomEnvironment] {
        println!("{}:", category);
        for model in store.list::<EnvironmentAsset>(category) {
            println!("  {:>4}  {}", model.id, model.name);
        }
    }
    println!(
        "{} placed block(s), {} placed object(s)",
        store.terrain().len(),
        store.environment().len()
    );
}

fn create_texture(
    manager: &mut AssetManager<LocalStorage>,
    name: Option<String>,
    from: Option<PathBuf>,
    color: Option<String>,
    face: &str,
) -> Result<()> {
    let mut session = match &from {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            manager.texture_session_from_image(&bytes)?
        }
        None => manager.new_texture_session(),
    };

    if let Some(hex) = color {
        let rgba = parse_color(&hex)?;
        session.set_target(FaceTarget::parse(face)?);
        let size = session.canvases()?.size();
        // Cover the whole face, whatever the seed looks like
        session.commit(RasterDelta::Image(RasterBuffer::filled(size, size, rgba)), "fill")?;
        log::debug!("filled {:?} with {}", session.target(), hex);
    }

    let texture = session.export()?;
    session.close();
    let block = manager.save_texture(name.as_deref(), texture)?;
    println!("+ {} {}", block.id, block.name);
    Ok(())
}

fn parse_color(hex: &str) -> Result<[u8; 4]> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 && hex.len() != 8 {
        bail!("Color must be RRGGBB or RRGGBBAA, got \"{}\"", hex);
    }
    let mut rgba = [255u8; 4];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(chunk).context("Color is not ASCII")?;
        rgba[i] = u8::from_str_radix(pair, 16).with_context(|| format!("Bad color component \"{}\"", pair))?;
    }
    Ok(rgba)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn print_outcome(outcome: DeleteOutcome) {
    match outcome {
        DeleteOutcome::Deleted { name, affected } => println!("Deleted \"{}\" ({} reference(s) updated)", name, affected),
        DeleteOutcome::NotFound => println!("Nothing to delete"),
    }
}
