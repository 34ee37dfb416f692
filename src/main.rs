use std::path::PathBuf;

use ballpit::StageConfig;
use clap::Parser;

#[derive(Parser)]
#[command(name = "ballpit", about = "Instanced balls that flock toward hovered menu labels")]
struct Args {
    /// TOML file overriding the built-in scene
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = match args.config {
        Some(path) => StageConfig::load(path)?,
        None => StageConfig::default(),
    };
    ballpit::run(config)
}
