/// Config file loading and creation for the songrank CLI.
///
/// Config lives at ~/.config/songrank/config.toml.
/// All fields are optional. CLI args override config values.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SongrankConfig {
    pub artist: Option<String>,
    pub limit: Option<usize>,
    pub endpoint: Option<String>,
    pub search: Option<String>,
    pub seed: Option<u64>,
    pub shuffle: Option<bool>,
}

/// Songs per session when neither the CLI nor the config file sets a limit.
pub const DEFAULT_LIMIT: usize = 10;

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# songrank configuration
# All values here can be overridden by CLI flags.

# Artist to rank when --artist and --catalog are not given
# artist = \"Taylor Swift\"

# Maximum number of songs per session (default 10)
# limit = 10

# iTunes Search API base URL
# endpoint = \"https://itunes.apple.com\"

# Insertion search: \"bounds\" (fewer questions) or \"strict\" (every neighbour compared)
# search = \"bounds\"

# Shuffle songs before ranking (default true). Set a seed for a repeatable order.
# shuffle = true
# seed = 42
";

/// Session song limit: the CLI value, else the config value, else the default.
pub fn resolve_limit(cli: Option<usize>, config: Option<usize>) -> usize {
    cli.or(config).unwrap_or(DEFAULT_LIMIT)
}

/// Returns the default config path: ~/.config/songrank/config.toml
pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| bail("HOME environment variable not set"));
    PathBuf::from(home).join(".config").join("songrank").join("config.toml")
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> SongrankConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content)
            .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => SongrankConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

fn parse_config(content: &str) -> Result<SongrankConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Create the default config file. Errors if it already exists.
pub fn create_default_config(path: &Path) {
    if path.exists() {
        bail(format!("Config file already exists at {}", path.display()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| bail(format!("Failed to create directory {}: {e}", parent.display())));
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));
}
