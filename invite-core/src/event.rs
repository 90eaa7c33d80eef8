//! The invitation event record.
//!
//! An `EventRecord` holds everything needed to render one VEVENT. It is
//! built either field by field through the typed setters or from a
//! name/value property map, and both routes go through the same setters.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::datetime::{from_unix_seconds, parse_datetime};
use crate::error::{InviteError, InviteResult};

/// Domain part of generated UIDs.
pub const UID_DOMAIN: &str = "invite";

pub const SUMMARY_REQUIRED: &str = "Summary is required";
pub const START_REQUIRED: &str = "Date start is required";
pub const END_REQUIRED: &str = "Date end is required";
pub const END_BEFORE_START: &str = "Date end must be after date start.";

/// Property names understood by `set_property` / `get_property`.
pub const PROPERTY_NAMES: &[&str] = &[
    "uid",
    "type",
    "start",
    "end",
    "organiser",
    "attendees",
    "description",
    "location",
    "summary",
];

/// An organiser or attendee, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub name: String,
    pub email: String,
}

impl Participant {
    /// Build a participant, trimming both fields.
    pub fn new(name: &str, email: &str) -> Self {
        Participant {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
        }
    }

    fn to_value(&self) -> Value {
        json!({ "name": self.name, "email": self.email })
    }
}

/// A single calendar invitation.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    uid: String,
    event_type: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    organiser: Option<Participant>,
    attendees: Vec<Participant>,
    description: Option<String>,
    location: Option<String>,
    summary: Option<String>,
    /// Unrecognised properties, kept for passthrough only
    extra: BTreeMap<String, Value>,
}

impl Default for EventRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRecord {
    /// Create an empty record with a freshly generated UID.
    pub fn new() -> Self {
        let mut event = Self::blank();
        event.uid = generate_uid();
        event
    }

    /// Create a record from a property map.
    ///
    /// Every entry is applied through `set_property`. A UID is generated
    /// only if the map did not supply a non-empty one.
    pub fn from_properties<I, K>(properties: I) -> InviteResult<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut event = Self::blank();
        for (name, value) in properties {
            event.set_property(name.as_ref(), value)?;
        }
        if event.uid.is_empty() {
            event.uid = generate_uid();
        }
        Ok(event)
    }

    fn blank() -> Self {
        EventRecord {
            uid: String::new(),
            event_type: None,
            start: None,
            end: None,
            organiser: None,
            attendees: Vec::new(),
            description: None,
            location: None,
            summary: None,
            extra: BTreeMap::new(),
        }
    }

    // --- getters ---

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub fn organiser(&self) -> Option<&Participant> {
        self.organiser.as_ref()
    }

    /// Attendees in insertion order.
    pub fn attendees(&self) -> &[Participant] {
        &self.attendees
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Properties that have no dedicated field.
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    // --- setters ---

    /// Overwrite the UID. Blank values are ignored so the UID is never emptied.
    pub fn set_uid(&mut self, uid: impl Into<String>) -> &mut Self {
        let uid = uid.into();
        if !uid.trim().is_empty() {
            self.uid = uid;
        }
        self
    }

    pub fn set_type(&mut self, value: impl Into<String>) -> &mut Self {
        self.event_type = Some(value.into());
        self
    }

    /// Parse and set the start time.
    pub fn set_start(&mut self, input: &str) -> InviteResult<&mut Self> {
        let start = parse_datetime(input)?;
        Ok(self.set_start_at(start))
    }

    pub fn set_start_at(&mut self, start: DateTime<Utc>) -> &mut Self {
        self.start = Some(start.trunc_subsecs(0));
        self
    }

    /// Parse and set the end time.
    pub fn set_end(&mut self, input: &str) -> InviteResult<&mut Self> {
        let end = parse_datetime(input)?;
        Ok(self.set_end_at(end))
    }

    pub fn set_end_at(&mut self, end: DateTime<Utc>) -> &mut Self {
        self.end = Some(end.trunc_subsecs(0));
        self
    }

    pub fn set_organiser(&mut self, name: &str, email: &str) -> &mut Self {
        self.organiser = Some(Participant::new(name, email));
        self
    }

    /// Add an attendee unless one with the same email (exact match) exists.
    ///
    /// Re-adding a known email keeps the original entry and its name.
    pub fn add_attendee(&mut self, email: &str, name: &str) -> &mut Self {
        let attendee = Participant::new(name, email);
        if !self.attendees.iter().any(|a| a.email == attendee.email) {
            self.attendees.push(attendee);
        }
        self
    }

    pub fn set_description(&mut self, value: impl Into<String>) -> &mut Self {
        self.description = Some(value.into());
        self
    }

    pub fn set_location(&mut self, value: impl Into<String>) -> &mut Self {
        self.location = Some(value.into());
        self
    }

    pub fn set_summary(&mut self, value: impl Into<String>) -> &mut Self {
        self.summary = Some(value.into());
        self
    }

    // --- name-addressed access ---

    /// Set a property by name.
    ///
    /// Known names are routed to the typed setters; `null` clears an
    /// optional field. Assigning `attendees` replaces the list, still
    /// deduplicating by email. Unknown names are kept in `extra`.
    pub fn set_property(&mut self, name: &str, value: Value) -> InviteResult<&mut Self> {
        match name {
            "uid" => match value {
                Value::Null => {}
                Value::String(s) => {
                    self.set_uid(s);
                }
                other => return Err(invalid(name, "expected a string", &other)),
            },
            "type" => self.event_type = optional_string(name, value)?,
            "description" => self.description = optional_string(name, value)?,
            "location" => self.location = optional_string(name, value)?,
            "summary" => self.summary = optional_string(name, value)?,
            "start" => self.start = optional_datetime(name, value)?,
            "end" => self.end = optional_datetime(name, value)?,
            "organiser" => {
                self.organiser = match value {
                    Value::Null => None,
                    other => Some(participant_from_value(name, other)?),
                }
            }
            "attendees" => {
                let entries = match value {
                    Value::Null => Vec::new(),
                    Value::Array(entries) => entries,
                    other => return Err(invalid(name, "expected an array", &other)),
                };
                self.attendees.clear();
                for entry in entries {
                    let attendee = participant_from_value(name, entry)?;
                    self.add_attendee(&attendee.email, &attendee.name);
                }
            }
            _ => {
                self.extra.insert(name.to_string(), value);
            }
        }
        Ok(self)
    }

    /// Read a property by name, in its interchange form.
    pub fn get_property(&self, name: &str) -> Option<Value> {
        match name {
            "uid" => Some(Value::String(self.uid.clone())),
            "type" => self.event_type.clone().map(Value::String),
            "start" => self.start.as_ref().map(datetime_value),
            "end" => self.end.as_ref().map(datetime_value),
            "organiser" => self.organiser.as_ref().map(Participant::to_value),
            "attendees" if !self.attendees.is_empty() => Some(Value::Array(
                self.attendees.iter().map(Participant::to_value).collect(),
            )),
            "attendees" => None,
            "description" => self.description.clone().map(Value::String),
            "location" => self.location.clone().map(Value::String),
            "summary" => self.summary.clone().map(Value::String),
            _ => self.extra.get(name).cloned(),
        }
    }

    /// The full property map: every set property plus `extra`.
    pub fn to_properties(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for name in PROPERTY_NAMES {
            if let Some(value) = self.get_property(name) {
                map.insert(name.to_string(), value);
            }
        }
        for (name, value) in &self.extra {
            map.insert(name.clone(), value.clone());
        }
        map
    }

    // --- validation & output ---

    /// Collect validation errors. Recomputed on every call.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.summary.as_deref().is_none_or(str::is_empty) {
            errors.push(SUMMARY_REQUIRED.to_string());
        }
        if self.start.is_none() {
            errors.push(START_REQUIRED.to_string());
        }
        if self.end.is_none() {
            errors.push(END_REQUIRED.to_string());
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end < start {
                errors.push(END_BEFORE_START.to_string());
            }
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Render the invitation as ICS text.
    pub fn get_data(&self) -> InviteResult<String> {
        crate::ics::generate_ics(self)
    }

    /// Render and atomically write the invitation to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> InviteResult<()> {
        crate::storage::save(self, path)
    }
}

impl Serialize for EventRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_properties().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EventRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let properties = Map::<String, Value>::deserialize(deserializer)?;
        EventRecord::from_properties(properties).map_err(serde::de::Error::custom)
    }
}

/// Generate a UID unique for the life of the process.
fn generate_uid() -> String {
    format!(
        "{}-{}@{}",
        std::process::id(),
        uuid::Uuid::new_v4().simple(),
        UID_DOMAIN
    )
}

fn datetime_value(dt: &DateTime<Utc>) -> Value {
    Value::String(dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn invalid(name: &str, reason: &str, value: &Value) -> InviteError {
    InviteError::InvalidProperty {
        name: name.to_string(),
        reason: format!("{}, got {}", reason, value),
    }
}

fn optional_string(name: &str, value: Value) -> InviteResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(invalid(name, "expected a string", &other)),
    }
}

fn optional_datetime(name: &str, value: Value) -> InviteResult<Option<DateTime<Utc>>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => parse_datetime(&s).map(Some),
        Value::Number(n) => match n.as_i64() {
            Some(secs) => from_unix_seconds(secs).map(Some),
            None => Err(invalid(name, "expected whole seconds", &Value::Number(n))),
        },
        other => Err(invalid(name, "expected a date/time string or timestamp", &other)),
    }
}

/// Accepts `{"email": .., "name": ..}` or a bare email string.
fn participant_from_value(name: &str, value: Value) -> InviteResult<Participant> {
    match value {
        Value::String(email) => Ok(Participant::new("", &email)),
        Value::Object(ref fields) => {
            let email = fields.get("email").and_then(Value::as_str);
            let display = match fields.get("name") {
                None | Some(Value::Null) => Some(""),
                Some(v) => v.as_str(),
            };
            match (email, display) {
                (Some(email), Some(display)) => Ok(Participant::new(display, email)),
                _ => Err(invalid(
                    name,
                    "expected an object with string 'email' and optional 'name'",
                    &value,
                )),
            }
        }
        other => Err(invalid(name, "expected an object or email string", &other)),
    }
}
