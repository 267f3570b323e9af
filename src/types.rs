use serde::{Deserialize, Serialize};

/// Display text of a tab, optionally backed by a translation key.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ReuseTitle {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub i18n: Option<String>,
}

impl ReuseTitle {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            i18n: None,
        }
    }

    pub fn i18n(text: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            i18n: Some(key.into()),
        }
    }
}

/// A route kept alive by the cache collaborator.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CachedEntry {
    pub url: String,
    pub title: ReuseTitle,
    pub closable: bool,
}

/// One tab of the strip. Rebuilt on every reconciliation.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ReuseItem {
    pub url: String,
    pub title: String,
    pub closable: bool,
    pub index: usize,
    pub active: bool,
    pub last: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheAction {
    Add,
    Title,
    Closable,
    Close,
    CloseRight,
    Clear,
    Move,
    Refresh,
}

/// Change notification published by the cache collaborator.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CacheNotify {
    pub action: CacheAction,
    pub url: Option<String>,
}

impl CacheNotify {
    pub fn new(action: CacheAction, url: Option<&str>) -> Self {
        Self {
            action,
            url: url.map(str::to_string),
        }
    }

    pub fn close(url: &str) -> Self {
        Self::new(CacheAction::Close, Some(url))
    }

    pub fn is_close(&self) -> bool {
        self.action == CacheAction::Close
    }

    /// URL of the evicted tab when this describes a single close.
    pub fn closed_url(&self) -> Option<&str> {
        if self.is_close() {
            self.url.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextCloseKind {
    Close,
    CloseRight,
    Clear,
    CloseOther,
}

/// Action picked from a tab's context menu.
#[derive(Debug, Clone)]
pub struct ContextCloseEvent {
    pub kind: ContextCloseKind,
    pub item: ReuseItem,
    pub include_non_closeable: bool,
}

/// Notifications for the surrounding UI layer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ReuseTabEvent {
    /// A navigation started from the strip was committed.
    Change(ReuseItem),
    /// Tabs were evicted. Carries the tab when exactly one was closed.
    Close(Option<ReuseItem>),
    /// The strip or the active position changed.
    Refresh,
    Visibility(bool),
}

/// Result of asking the strip to activate a tab.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Activation {
    Committed(ReuseItem),
    Rejected,
}

impl Activation {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}
