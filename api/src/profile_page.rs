//! State of the profile page, which shows three independently loaded
//! resources: the profile itself, the weekly recap and today's pick.
//!
//! The three fetches run concurrently and every completion updates only its
//! own slot, so a slow or failing resource never holds back or overwrites the
//! others. The page counts as loaded once all three have settled.

use chrono::NaiveDate;
use futures::{
    future::BoxFuture,
    stream::{FuturesUnordered, StreamExt},
    FutureExt,
};
use sotd_schema::{Profile, SotdEntry};
use std::time::Duration;

use crate::{
    client::{ApiClient, ClientError},
    recap::RecapView,
};

/// Today's pick is abandoned after this long.
pub const SOTD_FETCH_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, PartialEq)]
pub enum Load<T> {
    Loading,
    Ready(T),
    /// The resource doesn't exist yet; a normal state, not an error.
    Missing,
    Failed(String),
}

impl<T> Load<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }

    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Load::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn from_result(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(value) => Load::Ready(value),
            Err(e) => Load::from_error(e),
        }
    }

    pub fn from_error(error: ClientError) -> Self {
        match error {
            ClientError::NotFound => Load::Missing,
            other => Load::Failed(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePage {
    pub user_id: String,
    pub date: NaiveDate,
    pub profile: Load<Profile>,
    pub recap: Load<RecapView>,
    pub today: Load<SotdEntry>,
}

enum Update {
    Profile(Load<Profile>),
    Recap(Load<RecapView>),
    Today(Load<SotdEntry>),
}

impl ProfilePage {
    pub fn new(user_id: &str, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.to_string(),
            date,
            profile: Load::Loading,
            recap: Load::Loading,
            today: Load::Loading,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.profile.is_settled() && self.recap.is_settled() && self.today.is_settled()
    }

    pub fn has_sotd(&self) -> bool {
        matches!(self.today, Load::Ready(_))
    }

    /// Nothing picked for today yet: the page offers to pick one.
    pub fn needs_sotd(&self) -> bool {
        matches!(self.today, Load::Missing)
    }

    pub fn sotd_failed(&self) -> bool {
        matches!(self.today, Load::Failed(_))
    }

    fn apply(&mut self, update: Update) {
        match update {
            Update::Profile(load) => self.profile = load,
            Update::Recap(load) => self.recap = load,
            Update::Today(load) => self.today = load,
        }
    }
}

pub struct ProfileLoader<'a> {
    client: &'a ApiClient,
    sotd_timeout: Duration,
}

impl<'a> ProfileLoader<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            sotd_timeout: SOTD_FETCH_TIMEOUT,
        }
    }

    pub fn with_sotd_timeout(mut self, timeout: Duration) -> Self {
        self.sotd_timeout = timeout;
        self
    }

    pub async fn load(&self, user_id: &str, date: NaiveDate) -> ProfilePage {
        self.load_observed(user_id, date, |_| {}).await
    }

    /// Loads the page, calling `observe` with the initial state and again
    /// after each resource settles.
    pub async fn load_observed<F>(
        &self,
        user_id: &str,
        date: NaiveDate,
        mut observe: F,
    ) -> ProfilePage
    where
        F: FnMut(&ProfilePage),
    {
        let mut page = ProfilePage::new(user_id, date);
        observe(&page);

        let client = self.client;
        let mut pending: FuturesUnordered<BoxFuture<'_, Update>> = FuturesUnordered::new();

        pending.push(
            async move { Update::Profile(Load::from_result(client.profile(user_id).await)) }
                .boxed(),
        );
        pending.push(
            async move {
                let recap = match client.weekly_statistics(user_id).await {
                    Ok(weeks) => RecapView::from_weeks(&weeks).map_or(Load::Missing, Load::Ready),
                    Err(e) => Load::from_error(e),
                };
                Update::Recap(recap)
            }
            .boxed(),
        );
        let sotd_timeout = self.sotd_timeout;
        pending.push(
            async move { Update::Today(fetch_today(client, user_id, date, sotd_timeout).await) }
                .boxed(),
        );

        while let Some(update) = pending.next().await {
            page.apply(update);
            observe(&page);
        }

        tracing::debug!(
            "profile page for {} loaded (sotd: {})",
            user_id,
            match &page.today {
                Load::Ready(_) => "picked",
                Load::Missing => "not picked",
                Load::Failed(_) => "failed",
                Load::Loading => "loading",
            }
        );

        page
    }
}

/// A timeout is a failure, never "not picked yet".
async fn fetch_today(
    client: &ApiClient,
    user_id: &str,
    date: NaiveDate,
    limit: Duration,
) -> Load<SotdEntry> {
    match tokio::time::timeout(limit, client.sotd_for_date(user_id, date)).await {
        Err(_) => {
            tracing::warn!("today's sotd for {} timed out after {:?}", user_id, limit);
            Load::from_error(ClientError::Timeout)
        }
        Ok(Ok(Some(entry))) => Load::Ready(entry),
        Ok(Ok(None)) => Load::Missing,
        Ok(Err(e)) => Load::from_error(e),
    }
}
