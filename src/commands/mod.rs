pub mod config;
pub mod new;
pub mod render;

use std::path::{Path, PathBuf};

use anyhow::Result;
use invite_core::{EventRecord, InviteConfig, Participant};

/// Parse `Name <email>` or a bare `email`.
pub fn parse_participant(input: &str) -> Result<Participant> {
    let input = input.trim();

    let participant = match input.rsplit_once('<') {
        Some((name, rest)) => {
            let email = rest.strip_suffix('>').ok_or_else(|| {
                anyhow::anyhow!("Missing closing '>' in participant: \"{}\"", input)
            })?;
            Participant::new(name.trim().trim_matches('"'), email)
        }
        None => Participant::new("", input),
    };

    if participant.email.is_empty() || !participant.email.contains('@') {
        anyhow::bail!(
            "Invalid participant \"{}\". Expected \"Name <email>\" or an email address",
            input
        );
    }

    Ok(participant)
}

/// Resolve a relative output path against the configured output directory.
pub fn resolve_output(path: &Path, config: &InviteConfig) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        config.output_dir().join(path)
    }
}

/// Write the event to `output`, or print it (ICS or JSON) to stdout.
pub fn emit(
    event: &EventRecord,
    output: Option<&Path>,
    json: bool,
    config: &InviteConfig,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(event)?);
        return Ok(());
    }

    match output {
        Some(path) => {
            let path = resolve_output(path, config);
            event.save(&path)?;
            tracing::info!(path = %path.display(), uid = event.uid(), "saved invitation");
        }
        None => print!("{}", event.get_data()?),
    }

    Ok(())
}
