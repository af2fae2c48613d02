use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Drop bodies into a physics sandbox drawn over a lit 3D scene.
#[derive(Parser)]
#[command(name = "playground", version, about)]
struct Cli {
    /// Settings file (JSON). Defaults are used when omitted.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Scene description to load at startup.
    #[arg(long)]
    scene: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match cli.settings {
        Some(path) => sandbox::Settings::load(path)?,
        None => sandbox::Settings::default(),
    };
    if let Some(scene) = cli.scene {
        settings.scene.path = Some(scene);
    }

    sandbox::run(settings)?;
    Ok(())
}
