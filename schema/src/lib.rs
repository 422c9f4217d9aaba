//! Wire types shared by the song-of-the-day gateway and its clients.
//!
//! Upstream payloads are owned by services we don't control, so every type
//! here deserializes leniently: missing fields fall back to defaults and
//! unknown fields are kept where relaying them matters.

pub mod profile;
pub mod sotd;
pub mod spotify;
pub mod statistics;

pub use profile::Profile;
pub use sotd::{NewSotd, SotdEntries, SotdEntry};
pub use spotify::{SearchTrack, Track};
pub use statistics::{NamedItem, WeeklyStatistics};
