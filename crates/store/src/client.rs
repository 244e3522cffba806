//! Per-user client state consulted by exclusion rules: ad feedback, recent
//! browsing history and the user's current geographic subdivision.

use std::collections::VecDeque;

use ads_core::UserPreferences;
use dashmap::DashSet;
use parking_lot::{Mutex, RwLock};

pub struct ClientState {
    disliked_creative_sets: DashSet<String>,
    flagged_creative_sets: DashSet<String>,
    browsing_history: Mutex<VecDeque<String>>,
    max_browsing_history: usize,
    subdivision: RwLock<Option<String>>,
}

impl ClientState {
    pub fn new(max_browsing_history: usize) -> Self {
        Self {
            disliked_creative_sets: DashSet::new(),
            flagged_creative_sets: DashSet::new(),
            browsing_history: Mutex::new(VecDeque::with_capacity(max_browsing_history)),
            max_browsing_history,
            subdivision: RwLock::new(None),
        }
    }

    /// Toggle a thumbs-down on a creative set. Returns whether the set is
    /// disliked afterwards.
    pub fn toggle_thumb_down(&self, creative_set_id: &str) -> bool {
        if self.disliked_creative_sets.remove(creative_set_id).is_some() {
            false
        } else {
            self.disliked_creative_sets
                .insert(creative_set_id.to_string());
            true
        }
    }

    pub fn flag_ad(&self, creative_set_id: &str) {
        self.flagged_creative_sets
            .insert(creative_set_id.to_string());
    }

    pub fn is_disliked(&self, creative_set_id: &str) -> bool {
        self.disliked_creative_sets.contains(creative_set_id)
    }

    /// Remember a visited URL, evicting the oldest once full.
    pub fn record_visit(&self, url: impl Into<String>) {
        if self.max_browsing_history == 0 {
            return;
        }
        let mut history = self.browsing_history.lock();
        if history.len() == self.max_browsing_history {
            history.pop_front();
        }
        history.push_back(url.into());
    }

    pub fn browsing_history(&self) -> Vec<String> {
        self.browsing_history.lock().iter().cloned().collect()
    }

    /// Set the user's subdivision, e.g. `"US-CA"`.
    pub fn set_subdivision(&self, subdivision: Option<String>) {
        *self.subdivision.write() = subdivision;
    }

    pub fn subdivision(&self) -> Option<String> {
        self.subdivision.read().clone()
    }

    /// Point-in-time copy of the user's ad feedback.
    pub fn preferences(&self) -> UserPreferences {
        UserPreferences {
            disliked_creative_sets: self
                .disliked_creative_sets
                .iter()
                .map(|entry| entry.key().clone())
                .collect(),
            flagged_creative_sets: self
                .flagged_creative_sets
                .iter()
                .map(|entry| entry.key().clone())
                .collect(),
        }
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new(100)
    }
}
