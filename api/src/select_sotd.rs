//! The "pick your song of the day" flow: browse recommendations, select one,
//! add a note and a mood, submit, then go back to the profile. Nothing is
//! persisted before submit.

use sotd_schema::{NewSotd, Track};
use thiserror::Error;

use crate::{
    client::{ApiClient, ClientError},
    gate::profile_path,
    profile_page::Load,
};

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("no track selected")]
    NothingSelected,

    #[error("a submission is already in progress")]
    AlreadySubmitting,

    #[error("track {0} is not among the recommendations")]
    UnknownTrack(String),

    #[error("failed to submit song of the day: {0}")]
    Submit(#[from] ClientError),
}

#[derive(Debug, Clone)]
pub struct SelectSotd {
    user_id: String,
    pub tracks: Load<Vec<Track>>,
    selected: Option<Track>,
    note: String,
    mood: String,
    submitting: bool,
    error: Option<String>,
}

impl SelectSotd {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            tracks: Load::Loading,
            selected: None,
            note: String::new(),
            mood: String::new(),
            submitting: false,
            error: None,
        }
    }

    pub async fn load(&mut self, client: &ApiClient) {
        self.error = None;
        self.tracks = match client.recommended(&self.user_id).await {
            Ok(tracks) => Load::Ready(tracks),
            Err(e) => {
                tracing::warn!("failed to fetch recommended tracks for {}: {}", self.user_id, e);
                Load::Failed("Failed to fetch recommended tracks".to_string())
            }
        };
    }

    pub fn recommendations(&self) -> &[Track] {
        self.tracks.ready().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn select(&mut self, track_id: &str) -> Result<&Track, SelectError> {
        let track = self
            .recommendations()
            .iter()
            .find(|t| t.id == track_id)
            .cloned()
            .ok_or_else(|| SelectError::UnknownTrack(track_id.to_string()))?;

        Ok(self.selected.insert(track))
    }

    pub fn selected(&self) -> Option<&Track> {
        self.selected.as_ref()
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    pub fn set_mood(&mut self, mood: impl Into<String>) {
        self.mood = mood.into();
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.submitting
    }

    /// Marks the submission as in flight and returns the body to send.
    pub fn begin_submit(&mut self) -> Result<NewSotd, SelectError> {
        if self.submitting {
            return Err(SelectError::AlreadySubmitting);
        }
        let track = self.selected.as_ref().ok_or(SelectError::NothingSelected)?;

        let body = NewSotd {
            track_id: track.id.clone(),
            note: self.note.clone(),
            mood: self.mood.clone(),
        };
        self.submitting = true;
        self.error = None;

        Ok(body)
    }

    /// Submits the pick and returns where to navigate next. On failure the
    /// selection, note and mood stay so the user can retry.
    pub async fn submit(&mut self, client: &ApiClient) -> Result<String, SelectError> {
        let body = self.begin_submit()?;
        let result = client.create_sotd(&self.user_id, &body).await;
        self.submitting = false;

        match result {
            Ok(_) => {
                tracing::info!("{} picked {} as song of the day", self.user_id, body.track_id);
                Ok(profile_path(&self.user_id))
            }
            Err(e) => {
                self.error = Some("Failed to submit SOTD".to_string());
                Err(SelectError::Submit(e))
            }
        }
    }
}
