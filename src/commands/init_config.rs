use anyhow::Result;
use owo_colors::OwoColorize;
use sartrack_core::config::Config;

pub fn run() -> Result<()> {
    let path = Config::config_path()?;

    if path.exists() {
        println!("Config already exists at {}", path.display().to_string().dimmed());
        return Ok(());
    }

    Config::create_default_config(&path)?;
    println!("Created {}", path.display().to_string().green());

    Ok(())
}
