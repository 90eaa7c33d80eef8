//! Core types for building single-event calendar invitations.
//!
//! - `event` holds the `EventRecord` builder and its validation rules
//! - `ics` renders a record as RFC 5545 text
//! - `storage` and `delivery` write the rendered text to a file or a response

pub mod config;
pub mod datetime;
pub mod delivery;
pub mod error;
pub mod event;
pub mod ics;
pub mod storage;

pub use config::InviteConfig;
pub use delivery::{Output, ResponseBuffer, download};
pub use error::{InviteError, InviteResult};
pub use event::{EventRecord, Participant};
