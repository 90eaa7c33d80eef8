//! Delivering an invitation as a file download.
//!
//! The HTTP layer is reached only through the `Output` trait, so the same
//! code drives an axum response, a CGI-style stream or a test buffer.

use crate::error::{InviteError, InviteResult};
use crate::event::EventRecord;

/// Filename used when the caller does not supply one.
pub const DEFAULT_FILENAME: &str = "invite.ics";

/// A response being assembled for the client.
pub trait Output {
    /// Append a header. Repeated names are all kept.
    fn set_header(&mut self, name: &str, value: &str) -> &mut Self;

    fn set_body(&mut self, body: Vec<u8>);

    /// Whether the response has already started going out.
    fn headers_sent(&self) -> bool;
}

/// Send `event` to `output` as an `.ics` attachment.
///
/// Refuses with `HeadersAlreadySent` if the response is already under way.
/// Invalid events are rejected before any header is set.
pub fn download<O: Output>(
    event: &EventRecord,
    filename: Option<&str>,
    output: &mut O,
) -> InviteResult<()> {
    if output.headers_sent() {
        return Err(InviteError::HeadersAlreadySent);
    }

    let data = event.get_data()?;
    let filename = match filename.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_FILENAME,
    };

    output
        .set_header("Pragma", "public")
        .set_header("Expires", "0")
        .set_header("Cache-Control", "must-revalidate, post-check=0, pre-check=0")
        .set_header("Cache-Control", "public")
        .set_header("Content-Description", "File Transfer")
        .set_header("Content-Type", "text/calendar;charset=utf-8")
        .set_header(
            "Content-Disposition",
            &format!("attachment; filename=\"{}\"", filename.replace('"', "")),
        )
        .set_header("Content-Transfer-Encoding", "binary")
        .set_header("Content-Length", &data.len().to_string());
    output.set_body(data.into_bytes());

    tracing::debug!(uid = event.uid(), filename, "delivered invitation");
    Ok(())
}

/// In-memory `Output`: headers in the order they were set, plus the body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResponseBuffer {
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// All values for `name`, compared case-insensitively.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn body(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn into_parts(self) -> (Vec<(String, String)>, Vec<u8>) {
        (self.headers, self.body.unwrap_or_default())
    }

    /// Raw HTTP-style text: header lines, a blank line, then the body.
    pub fn to_http_text(&self) -> String {
        let mut text = String::new();
        for (name, value) in &self.headers {
            text.push_str(&format!("{}: {}\r\n", name, value));
        }
        text.push_str("\r\n");
        text.push_str(&String::from_utf8_lossy(self.body()));
        text
    }
}

impl Output for ResponseBuffer {
    fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    fn set_body(&mut self, body: Vec<u8>) {
        self.body = Some(body);
    }

    fn headers_sent(&self) -> bool {
        self.body.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_event() -> EventRecord {
        let mut event = EventRecord::new();
        event
            .set_summary("Download me")
            .set_start("2024-01-15T09:30:00Z")
            .unwrap()
            .set_end("2024-01-15T10:30:00Z")
            .unwrap();
        event
    }

    #[test]
    fn sets_headers_in_order() {
        let event = make_test_event();
        let mut output = ResponseBuffer::new();

        download(&event, Some("meeting.ics"), &mut output).unwrap();

        let data = event.get_data().unwrap();
        let headers: Vec<(&str, &str)> = output
            .headers()
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
            .collect();
        let length = data.len().to_string();
        assert_eq!(
            headers,
            [
                ("Pragma", "public"),
                ("Expires", "0"),
                ("Cache-Control", "must-revalidate, post-check=0, pre-check=0"),
                ("Cache-Control", "public"),
                ("Content-Description", "File Transfer"),
                ("Content-Type", "text/calendar;charset=utf-8"),
                ("Content-Disposition", "attachment; filename=\"meeting.ics\""),
                ("Content-Transfer-Encoding", "binary"),
                ("Content-Length", length.as_str()),
            ]
        );
        assert_eq!(output.body(), data.as_bytes());
    }

    #[test]
    fn default_filename() {
        let event = make_test_event();

        let mut output = ResponseBuffer::new();
        download(&event, None, &mut output).unwrap();
        assert_eq!(
            output.header_values("content-disposition"),
            ["attachment; filename=\"invite.ics\""]
        );

        let mut output = ResponseBuffer::new();
        download(&event, Some("  "), &mut output).unwrap();
        assert_eq!(
            output.header_values("Content-Disposition"),
            ["attachment; filename=\"invite.ics\""]
        );
    }

    #[test]
    fn content_length_counts_bytes() {
        let mut event = make_test_event();
        event.set_location("Café Zürich");
        let mut output = ResponseBuffer::new();

        download(&event, None, &mut output).unwrap();

        let length: usize = output.header_values("Content-Length")[0].parse().unwrap();
        assert_eq!(length, output.body().len());
        assert!(length > event.get_data().unwrap().chars().count());
    }

    #[test]
    fn refuses_when_headers_already_sent() {
        let mut output = ResponseBuffer::new();
        output.set_body(b"already streaming".to_vec());

        let err = download(&make_test_event(), None, &mut output).unwrap_err();

        assert!(matches!(err, InviteError::HeadersAlreadySent));
        assert!(output.headers().is_empty());
        assert_eq!(output.body(), b"already streaming");
    }

    #[test]
    fn invalid_event_sets_nothing() {
        let mut event = make_test_event();
        event.set_summary("");
        let mut output = ResponseBuffer::new();

        let err = download(&event, None, &mut output).unwrap_err();

        assert!(matches!(err, InviteError::InvalidEvent(_)));
        assert!(output.headers().is_empty());
        assert!(!output.headers_sent());
    }

    #[test]
    fn http_text_has_headers_then_body() {
        let mut output = ResponseBuffer::new();
        download(&make_test_event(), None, &mut output).unwrap();

        let text = output.to_http_text();
        let (head, body) = text.split_once("\r\n\r\n").unwrap();
        assert!(head.starts_with("Pragma: public\r\n"));
        assert!(body.starts_with("BEGIN:VCALENDAR\r\n"));
    }
}
