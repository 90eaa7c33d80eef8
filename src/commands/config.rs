use std::path::Path;

use anyhow::Result;
use invite_core::InviteConfig;

/// Write the default config template to `path`.
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}\nUse --force to overwrite it.",
            path.display()
        );
    }

    InviteConfig::create_default_config(path)?;
    println!("Wrote {}", path.display());

    Ok(())
}
