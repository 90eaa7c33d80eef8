use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use invite_core::{EventRecord, InviteConfig, ResponseBuffer, download};
use serde_json::{Map, Value};

use super::emit;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// JSON file holding the property map ("-" for stdin)
    pub file: PathBuf,

    /// Save to this file instead of printing
    #[arg(long, conflicts_with = "headers")]
    pub output: Option<PathBuf>,

    /// Print the full download response (headers, blank line, body)
    #[arg(long)]
    pub headers: bool,

    /// Attachment name used with --headers
    #[arg(long, requires = "headers")]
    pub filename: Option<String>,

    /// Print the property map as JSON instead of ICS
    #[arg(long, conflicts_with_all = ["headers", "output"])]
    pub json: bool,
}

pub fn run(args: RenderArgs, config: &InviteConfig) -> Result<()> {
    let content = read_input(&args.file)?;
    let event = event_from_json(&content)
        .with_context(|| format!("Failed to build invitation from {}", args.file.display()))?;

    if args.headers {
        let filename = args.filename.as_deref().unwrap_or(&config.default_filename);
        let response = download_response(&event, filename)?;
        print!("{}", response.to_http_text());
        return Ok(());
    }

    emit(&event, args.output.as_deref(), args.json, config)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return std::io::read_to_string(std::io::stdin()).context("Failed to read stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn event_from_json(content: &str) -> Result<EventRecord> {
    let properties: Map<String, Value> =
        serde_json::from_str(content).context("Expected a JSON object of properties")?;
    Ok(EventRecord::from_properties(properties)?)
}

fn download_response(event: &EventRecord, filename: &str) -> Result<ResponseBuffer> {
    let mut response = ResponseBuffer::new();
    download(event, Some(filename), &mut response)?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use invite_core::InviteError;

    const PROPERTIES: &str = r#"{
        "summary": "Review",
        "start": "2024-01-15T09:30:00Z",
        "end": "2024-01-15T10:30:00Z",
        "attendees": [{ "email": "alice@example.com", "name": "Alice" }],
        "room_booking": 42
    }"#;

    #[test]
    fn builds_event_from_json() {
        let event = event_from_json(PROPERTIES).unwrap();
        assert_eq!(event.summary(), Some("Review"));
        assert_eq!(event.attendees().len(), 1);
        assert_eq!(event.extra().get("room_booking"), Some(&Value::from(42)));
        assert!(event.get_data().unwrap().contains("DTSTART:20240115T093000Z\r\n"));
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(event_from_json("[1, 2]").is_err());
        assert!(event_from_json("not json").is_err());
    }

    #[test]
    fn download_response_includes_headers() {
        let event = event_from_json(PROPERTIES).unwrap();
        let response = download_response(&event, "review.ics").unwrap();

        assert_eq!(
            response.header_values("Content-Disposition"),
            ["attachment; filename=\"review.ics\""]
        );
        assert!(response.to_http_text().contains("\r\n\r\nBEGIN:VCALENDAR"));
    }

    #[test]
    fn invalid_event_surfaces_validation_errors() {
        let event = event_from_json(r#"{ "start": "2024-01-15T09:30:00Z" }"#).unwrap();
        let err = download_response(&event, "x.ics").unwrap_err();

        let invite_err = err.downcast_ref::<InviteError>().unwrap();
        assert_eq!(
            invite_err.validation_errors(),
            ["Summary is required", "Date end is required"]
        );
    }
}
