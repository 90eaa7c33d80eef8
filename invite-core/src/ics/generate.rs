//! ICS text generation.

use crate::datetime::format_ics_datetime;
use crate::error::{InviteError, InviteResult};
use crate::event::EventRecord;

/// PRODID written into every calendar.
pub const PRODUCT_ID: &str = "-//invite//invite 0.1//EN";

const CRLF: &str = "\r\n";

/// Generate .ics content for a single event.
///
/// The line order is fixed. Fails with `InvalidEvent` if the event does not
/// validate.
pub fn generate_ics(event: &EventRecord) -> InviteResult<String> {
    let errors = event.validate();
    // A valid event always has both bounds set.
    let (true, Some(start), Some(end)) = (errors.is_empty(), event.start(), event.end()) else {
        tracing::warn!(uid = event.uid(), ?errors, "refusing to render invalid event");
        return Err(InviteError::InvalidEvent(errors));
    };
    let start = format_ics_datetime(&start);
    let end = format_ics_datetime(&end);

    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".into(),
        "VERSION:2.0".into(),
        format!("PRODID:{}", PRODUCT_ID),
        "CALSCALE:GREGORIAN".into(),
        "BEGIN:VEVENT".into(),
        format!("UID:{}", event.uid()),
        format!("DTSTART:{}", start),
        format!("DTEND:{}", end),
        // DTSTAMP mirrors DTSTART so output depends only on the event
        format!("DTSTAMP:{}", start),
    ];

    if let Some(org) = event.organiser() {
        lines.push(format!(
            "ORGANIZER;CN=\"{}\":mailto:{}",
            param_text(&org.name),
            strip_controls(&org.email)
        ));
    }

    // Each ATTENDEE spans two lines.
    for attendee in event.attendees() {
        lines.push(format!(
            "ATTENDEE;PARTSTAT=NEEDS-ACTION;RSVP=TRUE;CN={};",
            param_value(&attendee.name)
        ));
        lines.push(format!("X-NUM-GUESTS=0:mailto:{}", strip_controls(&attendee.email)));
    }

    lines.push(format!(
        "DESCRIPTION:{}",
        escape_text(event.description().unwrap_or_default())
    ));
    lines.push(format!("LAST-MODIFIED:{}", start));
    lines.push(format!(
        "LOCATION:{}",
        escape_text(event.location().unwrap_or_default())
    ));
    lines.push(format!(
        "SUMMARY:{}",
        escape_text(event.summary().unwrap_or_default())
    ));
    lines.push("SEQUENCE:0".into());
    lines.push("TRANSP:OPAQUE".into());
    lines.push("END:VEVENT".into());
    lines.push("END:VCALENDAR".into());

    let mut output = String::with_capacity(lines.iter().map(|l| l.len() + 2).sum());
    for line in &lines {
        output.push_str(line);
        output.push_str(CRLF);
    }

    tracing::debug!(
        uid = event.uid(),
        attendees = event.attendees().len(),
        bytes = output.len(),
        "rendered invitation"
    );

    Ok(output)
}

/// Escape a TEXT value per RFC 5545.
/// `\` → `\\`, `;` → `\;`, `,` → `\,`, and any line break → `\n`.
pub fn escape_text(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => result.push_str("\\\\"),
            ';' => result.push_str("\\;"),
            ',' => result.push_str("\\,"),
            '\n' => result.push_str("\\n"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                result.push_str("\\n");
            }
            _ => result.push(c),
        }
    }

    result
}

/// Parameter values cannot be escaped, so drop quotes and control characters.
fn param_text(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '"')
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// A parameter value, quoted only when it contains a delimiter.
fn param_value(value: &str) -> String {
    let text = param_text(value);
    if text.contains([':', ';', ',']) {
        format!("\"{}\"", text)
    } else {
        text
    }
}

fn strip_controls(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}
