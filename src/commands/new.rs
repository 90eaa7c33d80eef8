use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Args;
use invite_core::{EventRecord, InviteConfig};

use super::{emit, parse_participant};

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Event title
    #[arg(short, long)]
    pub summary: String,

    /// Start date/time in UTC (e.g. "2025-03-20T15:00:00Z" or "2025-03-20 15:00")
    #[arg(short = 'S', long)]
    pub start: String,

    /// End date/time
    #[arg(short = 'E', long, conflicts_with = "duration")]
    pub end: Option<String>,

    /// Duration (e.g. "30m", "1h", "2h 30m")
    #[arg(short, long, conflicts_with = "end")]
    pub duration: Option<String>,

    /// Event description
    #[arg(long)]
    pub description: Option<String>,

    /// Event location
    #[arg(short, long)]
    pub location: Option<String>,

    /// Organiser as "Name <email>"
    #[arg(short, long)]
    pub organiser: Option<String>,

    /// Attendee as "Name <email>" or an email address (repeatable)
    #[arg(short, long = "attendee")]
    pub attendees: Vec<String>,

    /// Use this UID instead of generating one
    #[arg(long)]
    pub uid: Option<String>,

    /// Free-form category tag (not written to the .ics)
    #[arg(long = "type")]
    pub event_type: Option<String>,

    /// Save to this file instead of printing
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Print the property map as JSON instead of ICS
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: NewArgs, config: &InviteConfig) -> Result<()> {
    tracing::debug!(?args, "creating invitation");
    let event = build_event(&args, config)?;
    emit(&event, args.output.as_deref(), args.json, config)
}

/// Build the event described by the flags.
/// Without --end or --duration the event lasts one hour.
fn build_event(args: &NewArgs, config: &InviteConfig) -> Result<EventRecord> {
    let mut event = EventRecord::new();

    if let Some(uid) = &args.uid {
        event.set_uid(uid.as_str());
    }
    if let Some(event_type) = &args.event_type {
        event.set_type(event_type.as_str());
    }

    event.set_summary(args.summary.as_str());
    event.set_start(&args.start)?;

    let start = event.start().context("Start time missing after parsing")?;
    match (&args.end, &args.duration) {
        (Some(end), _) => {
            event.set_end(end)?;
        }
        (None, Some(dur_input)) => {
            event.set_end_at(start + parse_duration(dur_input)?);
        }
        (None, None) => {
            event.set_end_at(start + Duration::hours(1));
        }
    }

    if let Some(description) = &args.description {
        event.set_description(description.as_str());
    }
    if let Some(location) = &args.location {
        event.set_location(location.as_str());
    }

    match (&args.organiser, &config.organiser) {
        (Some(input), _) => {
            let organiser = parse_participant(input)?;
            event.set_organiser(&organiser.name, &organiser.email);
        }
        (None, Some(organiser)) => {
            event.set_organiser(&organiser.name, &organiser.email);
        }
        (None, None) => {}
    }

    for input in &args.attendees {
        let attendee = parse_participant(input)?;
        event.add_attendee(&attendee.email, &attendee.name);
    }

    Ok(event)
}

fn parse_duration(input: &str) -> Result<Duration> {
    let std_dur = humantime::parse_duration(input)
        .with_context(|| format!("Could not parse duration: \"{}\"", input))?;
    Duration::from_std(std_dur).context("Duration too large")
}
