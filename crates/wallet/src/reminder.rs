//! Asset registration reminder gating.
//!
//! The marketplace periodically reminds the user to add its loan-note token
//! to their wallet. The decision is a pure function of persisted state and a
//! supplied clock reading, so it is testable without wall-clock waiting.
//! Dismissing the reminder suppresses it for 24 hours; a successful
//! registration does not touch the state.

use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::trace;

/// Cool-down applied when the user dismisses the reminder.
pub const REMINDER_COOLDOWN_SECS: u64 = 24 * 60 * 60;

/// Fixed file name of the persisted reminder state. There is a single
/// global reminder, keyed by nothing else.
pub const REMINDER_FILE_NAME: &str = "asset-reminder.json";

/// Persisted reminder cool-down state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderState {
    /// Unix timestamp at which the reminder becomes eligible again.
    pub next_eligible_at: u64,
}

/// Whether the registration reminder may be shown at `now`.
///
/// Eligible when no state exists yet, or once the cool-down has elapsed.
pub fn should_prompt(state: Option<&ReminderState>, now: u64) -> bool {
    state.is_none_or(|s| now >= s.next_eligible_at)
}

/// Record a dismissal at `now`, suppressing the reminder for
/// [`REMINDER_COOLDOWN_SECS`].
pub fn dismiss(now: u64) -> ReminderState {
    ReminderState { next_eligible_at: now + REMINDER_COOLDOWN_SECS }
}

/// Errors of the reminder persistence layer. Kept apart from
/// [`crate::WalletError`]: persistence is host integration, not wallet
/// traffic.
#[derive(Debug, thiserror::Error)]
pub enum ReminderStoreError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("malformed reminder state: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// JSON-file-backed store for the single reminder state.
#[derive(Debug, Clone)]
pub struct ReminderStore {
    path: PathBuf,
}

impl ReminderStore {
    /// A store persisting under `dir` at the fixed [`REMINDER_FILE_NAME`].
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(REMINDER_FILE_NAME) }
    }

    /// Load the persisted state; a missing file means no state yet.
    pub fn load(&self) -> Result<Option<ReminderState>, ReminderStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist `state`, replacing any previous value.
    pub fn save(&self, state: &ReminderState) -> Result<(), ReminderStoreError> {
        trace!(target: "wallet::reminder", next_eligible_at = state.next_eligible_at, "saving reminder state");
        fs::write(&self.path, serde_json::to_string(state)?)?;
        Ok(())
    }
}
