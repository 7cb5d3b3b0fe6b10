//! Settings loading for the headless driver.

use anyhow::{Context, Result};
use pvwatch_types::EmulatorSettings;
use std::{
    env,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

/// Environment variable naming a settings file
pub const CONFIG_ENV: &str = "PVWATCH_CONFIG";

/// Load settings from the path given on the command line or in
/// `PVWATCH_CONFIG`, falling back to defaults when neither is set.
pub fn load() -> Result<EmulatorSettings> {
    match settings_path() {
        Some(path) => {
            log::info!("loading settings from {}", path.display());
            load_json(&path)
        }
        None => {
            log::info!("no settings file given, using defaults");
            Ok(EmulatorSettings::default())
        }
    }
}

fn load_json(path: &Path) -> Result<EmulatorSettings> {
    let file = File::open(path).with_context(|| format!("Opening {}", path.display()))?;
    let rdr = BufReader::new(file);
    serde_json::from_reader(rdr).with_context(|| format!("Parsing {}", path.display()))
}

fn settings_path() -> Option<PathBuf> {
    env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from))
}
