//! Feed controller: list loading, local pagination and the submit form.
//!
//! The whole list for a topic is fetched once; "load more" only reveals
//! further batches of what is already held.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{ClientError, FeedbackApi};
use crate::models::{FeedbackEntry, SubmissionRequest};

/// Entries revealed per batch.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Form fields as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackForm {
    pub author_name: String,
    pub message: String,
    pub contact_email: String,
    /// Hidden honeypot input
    pub hp: String,
}

impl FeedbackForm {
    fn to_request(&self, topic_key: &str) -> SubmissionRequest {
        let non_blank = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        SubmissionRequest {
            topic_key: topic_key.to_string(),
            author_name: non_blank(&self.author_name),
            message: self.message.trim().to_string(),
            contact_email: non_blank(&self.contact_email),
            hp: Some(self.hp.clone()),
        }
    }
}

/// What the list area should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// Nothing fetched yet
    Loading,
    /// Last fetch failed; `has_cached` keeps older entries on screen
    Failed { has_cached: bool },
    /// Fetched, and the topic has no entries
    Empty,
    Ready,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent,
    /// Blank message or a send already in flight; no request made
    Skipped,
    Failed(String),
}

/// Snapshot of everything a view renders.
#[derive(Debug, Clone)]
pub struct FeedView {
    pub items: Vec<FeedbackEntry>,
    pub total: usize,
    pub has_more: bool,
    pub loading: bool,
    pub loading_more: bool,
    pub sending: bool,
    pub list_error: Option<String>,
    pub submit_error: Option<String>,
    pub form: FeedbackForm,
    pub status: FeedStatus,
}

#[derive(Debug, Default)]
struct FeedState {
    entries: Vec<FeedbackEntry>,
    displayed: usize,
    loaded: bool,
    loading: bool,
    loading_more: bool,
    sending: bool,
    list_error: Option<String>,
    submit_error: Option<String>,
    form: FeedbackForm,
    detached: bool,
    // Bumped per load so an older fetch cannot overwrite a newer one.
    generation: u64,
}

impl FeedState {
    fn status(&self) -> FeedStatus {
        if self.loading && self.entries.is_empty() {
            FeedStatus::Loading
        } else if self.list_error.is_some() {
            FeedStatus::Failed {
                has_cached: !self.entries.is_empty(),
            }
        } else if !self.loaded {
            FeedStatus::Loading
        } else if self.entries.is_empty() {
            FeedStatus::Empty
        } else {
            FeedStatus::Ready
        }
    }
}

/// Drives list/create calls and pagination for one topic key.
pub struct FeedController<A> {
    api: Arc<A>,
    topic_key: String,
    batch_size: usize,
    state: Mutex<FeedState>,
}

impl<A: FeedbackApi> FeedController<A> {
    pub fn new(api: Arc<A>, topic_key: impl Into<String>) -> Self {
        Self::with_batch_size(api, topic_key, DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(api: Arc<A>, topic_key: impl Into<String>, batch_size: usize) -> Self {
        Self {
            api,
            topic_key: topic_key.into(),
            batch_size: batch_size.max(1),
            state: Mutex::new(FeedState::default()),
        }
    }

    pub fn topic_key(&self) -> &str {
        &self.topic_key
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch the full list and show the first batch.
    ///
    /// On failure the previously fetched entries stay in place. Returns
    /// whether fresh data was applied.
    pub async fn load(&self) -> bool {
        let generation = {
            let mut state = self.state();
            if state.detached {
                return false;
            }
            state.loading = true;
            state.list_error = None;
            state.generation += 1;
            state.generation
        };

        let result = self.api.list_feedback(&self.topic_key).await;

        let mut state = self.state();
        if state.detached || state.generation != generation {
            return false;
        }
        state.loading = false;

        match result {
            Ok(entries) => {
                state.displayed = entries.len().min(self.batch_size);
                state.entries = entries;
                state.loaded = true;
                true
            }
            Err(e) => {
                tracing::warn!(topic_key = %self.topic_key, error = %e, "failed to load feedback");
                state.list_error = Some(e.to_string());
                false
            }
        }
    }

    /// Retry after a failed load.
    pub async fn retry(&self) -> bool {
        self.load().await
    }

    /// Reveal the next batch of already-fetched entries.
    ///
    /// Returns false without doing anything while another reveal is in
    /// flight or once everything is shown.
    pub async fn load_more(&self) -> bool {
        {
            let mut state = self.state();
            if state.detached
                || state.loading
                || state.loading_more
                || state.displayed >= state.entries.len()
            {
                return false;
            }
            state.loading_more = true;
        }

        // Give the view a turn to show the indicator.
        tokio::task::yield_now().await;

        let mut state = self.state();
        state.loading_more = false;
        if state.detached {
            return false;
        }
        state.displayed = (state.displayed + self.batch_size).min(state.entries.len());
        true
    }

    /// Edit the form fields.
    pub fn edit_form(&self, edit: impl FnOnce(&mut FeedbackForm)) {
        let mut state = self.state();
        if !state.detached {
            edit(&mut state.form);
        }
    }

    /// Send the form; on success clear it and reload the list.
    pub async fn submit(&self) -> SubmitOutcome {
        let request = {
            let mut state = self.state();
            if state.detached || state.sending || state.form.message.trim().is_empty() {
                return SubmitOutcome::Skipped;
            }
            state.sending = true;
            state.submit_error = None;
            state.form.to_request(&self.topic_key)
        };

        let result: Result<_, ClientError> = self.api.create_feedback(&request).await;

        {
            let mut state = self.state();
            if !state.detached {
                state.sending = false;
            }
            match result {
                Ok(_) => {
                    if state.detached {
                        return SubmitOutcome::Sent;
                    }
                    state.form = FeedbackForm::default();
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::warn!(topic_key = %self.topic_key, error = %message, "failed to submit feedback");
                    if !state.detached {
                        state.submit_error = Some(message.clone());
                    }
                    return SubmitOutcome::Failed(message);
                }
            }
        }

        self.load().await;
        SubmitOutcome::Sent
    }

    /// Stop applying results; called when the consuming view goes away.
    pub fn detach(&self) {
        self.state().detached = true;
    }

    pub fn view(&self) -> FeedView {
        let state = self.state();
        FeedView {
            items: state.entries[..state.displayed].to_vec(),
            total: state.entries.len(),
            has_more: state.displayed < state.entries.len(),
            loading: state.loading,
            loading_more: state.loading_more,
            sending: state.sending,
            list_error: state.list_error.clone(),
            submit_error: state.submit_error.clone(),
            form: state.form.clone(),
            status: state.status(),
        }
    }
}
