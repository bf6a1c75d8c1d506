//! Autosave timer
//!
//! A deterministic state machine driven by the caller's clock. The event loop
//! calls [`Autosave::schedule`] after edits and [`Autosave::tick`] whenever it
//! wakes up; `tick` decides what, if anything, needs writing and hands the
//! bytes back. Nothing here touches the file system.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::EditorSession;
use crate::error::EditError;

pub const MIN_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5);
pub const MAX_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(300);
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(10);

/// Outcome of a timer tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveAction {
    /// No deadline set, or it has not passed yet
    NotDue,
    Disabled,
    /// A typing run is open; retried at the next deadline
    SkippedMidEdit,
    /// Nothing unsaved
    Clean,
    /// Write `bytes` to `path`; the session is already marked clean
    Save { path: PathBuf, bytes: Vec<u8> },
    /// Untitled session: write `bytes` to a recovery file; stays dirty
    Recovery { bytes: Vec<u8> },
    /// Content could not be encoded; the session stays dirty
    Failed(EditError),
}

#[derive(Debug, Clone)]
pub struct Autosave {
    interval: Duration,
    enabled: bool,
    deadline: Option<Instant>,
    /// Version seen by the last mid-edit skip
    skipped_at_version: Option<u64>,
}

impl Autosave {
    pub fn new(interval: Duration, enabled: bool) -> Self {
        Self {
            interval: clamp_interval(interval),
            enabled,
            deadline: None,
            skipped_at_version: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Arm (or push back) the timer one interval from `now`
    pub fn schedule(&mut self, now: Instant) {
        if self.enabled {
            self.deadline = Some(now + self.interval);
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.skipped_at_version = None;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.cancel();
        }
    }

    /// Change the interval; an armed deadline keeps its old value
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = clamp_interval(interval);
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.enabled && self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Run the timer at `now`.
    ///
    /// A tick that fires re-arms the timer. A typing run still open on two
    /// consecutive fired ticks with no edit in between is closed and saved.
    pub fn tick(&mut self, now: Instant, session: &mut EditorSession) -> AutosaveAction {
        if !self.enabled {
            return AutosaveAction::Disabled;
        }
        if !self.is_due(now) {
            return AutosaveAction::NotDue;
        }
        self.schedule(now);

        if session.is_mid_edit() {
            if self.skipped_at_version != Some(session.version()) {
                self.skipped_at_version = Some(session.version());
                tracing::debug!("Autosave skipped, typing in progress");
                return AutosaveAction::SkippedMidEdit;
            }
            session.commit_boundary();
        }
        self.skipped_at_version = None;

        if !session.is_dirty() {
            return AutosaveAction::Clean;
        }

        match session.path().map(PathBuf::from) {
            Some(path) => match session.save() {
                Ok(bytes) => {
                    tracing::info!("Autosave: {} ({} bytes)", path.display(), bytes.len());
                    AutosaveAction::Save { path, bytes }
                }
                Err(e) => {
                    tracing::warn!("Autosave failed for {}: {}", path.display(), e);
                    AutosaveAction::Failed(e)
                }
            },
            None => match session.snapshot_bytes() {
                Ok(bytes) => {
                    tracing::info!("Autosave: recovery snapshot ({} bytes)", bytes.len());
                    AutosaveAction::Recovery { bytes }
                }
                Err(e) => {
                    tracing::warn!("Autosave recovery snapshot failed: {}", e);
                    AutosaveAction::Failed(e)
                }
            },
        }
    }
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_INTERVAL, true)
    }
}

fn clamp_interval(interval: Duration) -> Duration {
    interval.clamp(MIN_AUTOSAVE_INTERVAL, MAX_AUTOSAVE_INTERVAL)
}
