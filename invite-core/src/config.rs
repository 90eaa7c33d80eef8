//! Global invite configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::delivery::DEFAULT_FILENAME;
use crate::error::{InviteError, InviteResult};
use crate::event::Participant;

static DEFAULT_OUTPUT_DIR: &str = ".";

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_filename() -> String {
    DEFAULT_FILENAME.to_string()
}

fn default_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 4096))
}

/// Configuration at ~/.config/invite/config.toml
///
/// Every key is optional; a missing file means all defaults.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InviteConfig {
    /// Where `invite new --output` puts relative paths
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Attachment name used for downloads
    #[serde(default = "default_filename")]
    pub default_filename: String,

    /// Organiser applied when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organiser: Option<Participant>,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            address: default_address(),
        }
    }
}

impl Default for InviteConfig {
    fn default() -> Self {
        InviteConfig {
            output_dir: default_output_dir(),
            default_filename: default_filename(),
            organiser: None,
            server: ServerConfig::default(),
        }
    }
}

impl InviteConfig {
    pub fn config_path() -> InviteResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| InviteError::Config("Could not determine config directory".into()))?
            .join("invite");

        Ok(config_dir.join("config.toml"))
    }

    /// Load ~/.config/invite/config.toml, falling back to defaults.
    pub fn load() -> InviteResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> InviteResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            InviteError::Config(format!("Could not read {}: {e}", path.display()))
        })?;
        content.parse()
    }

    /// `output_dir` with a leading `~` expanded.
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.output_dir.to_string_lossy()).into_owned())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> InviteResult<()> {
        let contents = format!(
            "\
# invite configuration

# Directory for saved invitations:
# output_dir = \"{}\"

# Attachment name for downloads:
# default_filename = \"{}\"

# Organiser used when none is given:
# [organiser]
# name = \"Jane Doe\"
# email = \"jane@example.com\"

# [server]
# address = \"{}\"
",
            DEFAULT_OUTPUT_DIR,
            DEFAULT_FILENAME,
            default_address()
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                InviteError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| InviteError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

impl std::str::FromStr for InviteConfig {
    type Err = InviteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).map_err(|e| InviteError::Config(e.to_string()))
    }
}
