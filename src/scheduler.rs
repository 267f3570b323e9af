//! Serializes upstream signals into reconciliation jobs.
//!
//! Cache changes and settled navigations are combined the way a
//! "latest of both" stream would be: nothing runs until a navigation has
//! settled once, after which either signal runs a job paired with the most
//! recent cache notification. Translation changes are debounced and run a
//! job with no payload. Jobs are handed out one at a time; the caller runs
//! each to completion before asking for the next.

use crate::types::CacheNotify;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const TRANSLATION_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Trigger {
    CacheChanged(CacheNotify),
    NavigationSettled,
}

/// A reconciliation to run, with the cache notification it answers to.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Reconcile {
    pub notify: Option<CacheNotify>,
}

pub struct EventScheduler {
    queue: VecDeque<Trigger>,
    latest_notify: Option<CacheNotify>,
    navigated: bool,
    translation_enabled: bool,
    translation_deadline: Option<Instant>,
    debounce: Duration,
    disposed: bool,
}

impl EventScheduler {
    pub fn new(translation_enabled: bool) -> Self {
        Self {
            queue: VecDeque::new(),
            latest_notify: None,
            navigated: false,
            translation_enabled,
            translation_deadline: None,
            debounce: TRANSLATION_DEBOUNCE,
            disposed: false,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn set_translation_enabled(&mut self, enabled: bool) {
        self.translation_enabled = enabled;
        if !enabled {
            self.translation_deadline = None;
        }
    }

    pub fn push(&mut self, trigger: Trigger) {
        if self.disposed {
            crate::debug_log!("[scheduler] dropped {:?} after dispose", trigger);
            return;
        }
        self.queue.push_back(trigger);
    }

    /// Restart the debounce window. Ignored without a translator.
    pub fn translation_changed(&mut self, now: Instant) {
        if self.disposed || !self.translation_enabled {
            return;
        }
        self.translation_deadline = Some(now + self.debounce);
    }

    /// When a pending translation job becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.translation_deadline
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty() || self.translation_deadline.is_some()
    }

    pub fn next_job(&mut self, now: Instant) -> Option<Reconcile> {
        if self.disposed {
            return None;
        }

        while let Some(trigger) = self.queue.pop_front() {
            match trigger {
                Trigger::CacheChanged(notify) => {
                    self.latest_notify = Some(notify);
                    if self.navigated {
                        return Some(self.pair());
                    }
                }
                Trigger::NavigationSettled => {
                    self.navigated = true;
                    return Some(self.pair());
                }
            }
        }

        match self.translation_deadline {
            Some(deadline) if deadline <= now => {
                self.translation_deadline = None;
                Some(Reconcile { notify: None })
            }
            _ => None,
        }
    }

    // A close is delivered once so a later navigation does not replay its delta.
    fn pair(&mut self) -> Reconcile {
        let notify = self.latest_notify.clone();
        if notify.as_ref().is_some_and(CacheNotify::is_close) {
            self.latest_notify = None;
        }
        Reconcile { notify }
    }

    /// Drop everything queued and refuse further work.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.queue.clear();
        self.translation_deadline = None;
        self.latest_notify = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
