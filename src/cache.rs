use crate::router::RouteSnapshot;
use crate::types::{CacheAction, CacheNotify, CachedEntry, ReuseTitle};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

const DEFAULT_MAX: usize = 10;
const MIN_MAX: usize = 2;
const MAX_MAX: usize = 100;

/// How routes are matched for reuse.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Only menu entries that opt in with `reuse: true`.
    #[default]
    Menu,
    /// Every menu entry unless it opts out.
    MenuForce,
    /// Every URL not matched by an exclusion pattern.
    Url,
}

/// Settings forwarded untouched to the cache collaborator.
#[derive(Debug, Clone, Default)]
pub struct CacheOptions {
    pub mode: MatchMode,
    pub max: Option<usize>,
    pub excludes: Vec<Regex>,
    pub debug: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MenuEntry {
    pub link: String,
    pub text: String,
    pub i18n: Option<String>,
    pub reuse: Option<bool>,
    pub reuse_closable: Option<bool>,
}

/// Route cache collaborator. Owns which routes are alive, their titles,
/// closability and eviction.
pub trait RouteCache {
    fn items(&self) -> Vec<CachedEntry>;

    /// Number of evictable entries.
    fn count(&self) -> usize;

    /// Evict `url`. Returns whether an entry was removed; the change is
    /// published either way.
    fn close(&mut self, url: &str, include_non_closeable: bool) -> bool;

    fn close_right(&mut self, url: &str, include_non_closeable: bool);

    fn clear(&mut self, include_non_closeable: bool);

    fn get_url(&self, snapshot: &RouteSnapshot) -> String {
        snapshot.url()
    }

    fn get_title(&self, url: &str, truth: Option<&RouteSnapshot>) -> ReuseTitle;

    fn get_closable(&self, url: &str, truth: Option<&RouteSnapshot>) -> bool;

    /// Change notifications published since the last call.
    fn drain_notifications(&mut self) -> Vec<CacheNotify>;

    fn apply_options(&mut self, options: &CacheOptions);
}

impl<C: RouteCache> RouteCache for Rc<RefCell<C>> {
    fn items(&self) -> Vec<CachedEntry> {
        self.borrow().items()
    }

    fn count(&self) -> usize {
        self.borrow().count()
    }

    fn close(&mut self, url: &str, include_non_closeable: bool) -> bool {
        self.borrow_mut().close(url, include_non_closeable)
    }

    fn close_right(&mut self, url: &str, include_non_closeable: bool) {
        self.borrow_mut().close_right(url, include_non_closeable)
    }

    fn clear(&mut self, include_non_closeable: bool) {
        self.borrow_mut().clear(include_non_closeable)
    }

    fn get_url(&self, snapshot: &RouteSnapshot) -> String {
        self.borrow().get_url(snapshot)
    }

    fn get_title(&self, url: &str, truth: Option<&RouteSnapshot>) -> ReuseTitle {
        self.borrow().get_title(url, truth)
    }

    fn get_closable(&self, url: &str, truth: Option<&RouteSnapshot>) -> bool {
        self.borrow().get_closable(url, truth)
    }

    fn drain_notifications(&mut self) -> Vec<CacheNotify> {
        self.borrow_mut().drain_notifications()
    }

    fn apply_options(&mut self, options: &CacheOptions) {
        self.borrow_mut().apply_options(options)
    }
}

/// In-memory route cache.
pub struct MemoryCache {
    cached: Vec<CachedEntry>,
    title_cached: HashMap<String, ReuseTitle>,
    closable_cached: HashMap<String, bool>,
    menus: Vec<MenuEntry>,
    mode: MatchMode,
    max: usize,
    excludes: Vec<Regex>,
    debug: bool,
    // A just-closed URL must not be stored again on the way out of it.
    remove_url_buffer: Option<String>,
    pending: Vec<CacheNotify>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            cached: Vec::new(),
            title_cached: HashMap::new(),
            closable_cached: HashMap::new(),
            menus: Vec::new(),
            mode: MatchMode::default(),
            max: DEFAULT_MAX,
            excludes: Vec::new(),
            debug: false,
            remove_url_buffer: None,
            pending: Vec::new(),
        }
    }

    pub fn with_menus(mut self, menus: Vec<MenuEntry>) -> Self {
        self.menus = menus;
        self
    }

    fn di(&self, message: &str) {
        if self.debug {
            tklog::debug!(format!("[reuse-cache] {message}"));
        }
    }

    fn publish(&mut self, action: CacheAction, url: Option<&str>) {
        self.pending.push(CacheNotify::new(action, url));
    }

    pub fn set_mode(&mut self, mode: MatchMode) {
        self.mode = mode;
    }

    pub fn set_excludes(&mut self, excludes: Vec<Regex>) {
        self.excludes = excludes;
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Clamped to 2..=100. Shrinking drops entries from the end.
    pub fn set_max(&mut self, value: usize) {
        self.max = value.clamp(MIN_MAX, MAX_MAX);
        if self.cached.len() > self.max {
            self.cached.truncate(self.max);
            self.di(&format!("max shrunk to {}", self.max));
        }
    }

    pub fn index(&self, url: &str) -> Option<usize> {
        self.cached.iter().position(|entry| entry.url == url)
    }

    pub fn exists(&self, url: &str) -> bool {
        self.index(url).is_some()
    }

    fn menu(&self, url: &str) -> Option<&MenuEntry> {
        self.menus.iter().find(|menu| menu.link == url)
    }

    /// Whether the route may be kept alive.
    pub fn can(&self, snapshot: &RouteSnapshot) -> bool {
        let url = self.get_url(snapshot);
        if self.remove_url_buffer.as_deref() == Some(url.as_str()) {
            return false;
        }
        if let Some(reuse) = snapshot.truth().data.reuse {
            return reuse;
        }

        match self.mode {
            MatchMode::Menu => self
                .menu(&url)
                .is_some_and(|menu| menu.reuse == Some(true)),
            MatchMode::MenuForce => self
                .menu(&url)
                .is_some_and(|menu| menu.reuse != Some(false)),
            MatchMode::Url => !self.excludes.iter().any(|re| re.is_match(&url)),
        }
    }

    /// Keep `snapshot` alive. Replaces an existing entry in place, otherwise
    /// appends and evicts the oldest closable entry when over `max`.
    pub fn store(&mut self, snapshot: &RouteSnapshot) -> bool {
        if !self.can(snapshot) {
            return false;
        }

        let url = self.get_url(snapshot);
        let truth = snapshot.truth();
        let entry = CachedEntry {
            title: self.get_title(&url, Some(truth)),
            closable: self.get_closable(&url, Some(truth)),
            url: url.clone(),
        };

        match self.index(&url) {
            Some(idx) => self.cached[idx] = entry,
            None => {
                self.cached.push(entry);
                if self.cached.len() > self.max
                    && let Some(evict) = self.cached.iter().position(|entry| entry.closable)
                {
                    let evicted = self.cached.remove(evict);
                    self.di(&format!("evicted {}", evicted.url));
                }
            }
        }

        self.remove_url_buffer = None;
        self.di(&format!("stored {url}"));
        self.publish(CacheAction::Add, Some(&url));
        true
    }

    fn remove(&mut self, url: &str, include_non_closeable: bool) -> bool {
        let Some(idx) = self.index(url) else {
            return false;
        };
        if !include_non_closeable && !self.cached[idx].closable {
            return false;
        }

        self.cached.remove(idx);
        self.title_cached.remove(url);
        true
    }

    pub fn move_to(&mut self, url: &str, position: usize) {
        let Some(from) = self.index(url) else {
            return;
        };
        let entry = self.cached.remove(from);
        let to = position.min(self.cached.len());
        self.cached.insert(to, entry);
        self.publish(CacheAction::Move, Some(url));
    }

    pub fn set_title(&mut self, url: &str, title: ReuseTitle) {
        if let Some(idx) = self.index(url) {
            self.cached[idx].title = title.clone();
        }
        self.title_cached.insert(url.to_string(), title);
        self.publish(CacheAction::Title, Some(url));
    }

    pub fn set_closable(&mut self, url: &str, closable: bool) {
        if let Some(idx) = self.index(url) {
            self.cached[idx].closable = closable;
        }
        self.closable_cached.insert(url.to_string(), closable);
        self.publish(CacheAction::Closable, Some(url));
    }

    pub fn refresh(&mut self) {
        self.publish(CacheAction::Refresh, None);
    }
}

impl RouteCache for MemoryCache {
    fn items(&self) -> Vec<CachedEntry> {
        self.cached.clone()
    }

    fn count(&self) -> usize {
        self.cached.len()
    }

    fn close(&mut self, url: &str, include_non_closeable: bool) -> bool {
        self.remove_url_buffer = Some(url.to_string());
        let removed = self.remove(url, include_non_closeable);
        self.di(&format!("close snapshot url {url}"));
        self.publish(CacheAction::Close, Some(url));
        removed
    }

    fn close_right(&mut self, url: &str, include_non_closeable: bool) {
        let Some(start) = self.index(url) else {
            return;
        };
        for idx in (start + 1..self.cached.len()).rev() {
            let target = self.cached[idx].url.clone();
            self.remove(&target, include_non_closeable);
        }
        self.remove_url_buffer = None;
        self.di(&format!("close right of {url}"));
        self.publish(CacheAction::CloseRight, Some(url));
    }

    fn clear(&mut self, include_non_closeable: bool) {
        self.cached
            .retain(|entry| !include_non_closeable && !entry.closable);
        self.remove_url_buffer = None;
        self.di("clear all catch");
        self.publish(CacheAction::Clear, None);
    }

    fn get_title(&self, url: &str, truth: Option<&RouteSnapshot>) -> ReuseTitle {
        if let Some(title) = self.title_cached.get(url) {
            return title.clone();
        }
        if let Some(data) = truth.map(|route| &route.data)
            && (data.title.is_some() || data.title_i18n.is_some())
        {
            return ReuseTitle {
                text: data.title.clone().unwrap_or_else(|| url.to_string()),
                i18n: data.title_i18n.clone(),
            };
        }
        if let Some(menu) = self.menu(url) {
            return ReuseTitle {
                text: menu.text.clone(),
                i18n: menu.i18n.clone(),
            };
        }
        ReuseTitle::text(url)
    }

    fn get_closable(&self, url: &str, truth: Option<&RouteSnapshot>) -> bool {
        if let Some(closable) = self.closable_cached.get(url) {
            return *closable;
        }
        if let Some(closable) = truth.and_then(|route| route.data.reuse_closable) {
            return closable;
        }
        if self.mode != MatchMode::Url
            && let Some(closable) = self.menu(url).and_then(|menu| menu.reuse_closable)
        {
            return closable;
        }
        true
    }

    fn drain_notifications(&mut self) -> Vec<CacheNotify> {
        std::mem::take(&mut self.pending)
    }

    fn apply_options(&mut self, options: &CacheOptions) {
        self.mode = options.mode;
        self.excludes = options.excludes.clone();
        self.debug = options.debug;
        if let Some(max) = options.max {
            self.set_max(max);
        }
    }
}
