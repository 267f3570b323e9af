use crate::cache::MemoryCache;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Static data attached to a route definition.
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouteData {
    pub title: Option<String>,
    pub title_i18n: Option<String>,
    pub reuse: Option<bool>,
    pub reuse_closable: Option<bool>,
}

/// One level of an activated route. Nested routes hang off `first_child`.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RouteSnapshot {
    pub path: String,
    pub data: RouteData,
    pub first_child: Option<Box<RouteSnapshot>>,
}

impl RouteSnapshot {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.trim_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: RouteData) -> Self {
        self.data = data;
        self
    }

    pub fn with_child(mut self, child: RouteSnapshot) -> Self {
        self.first_child = Some(Box::new(child));
        self
    }

    /// Deepest activated child, which carries the route's own data.
    pub fn truth(&self) -> &RouteSnapshot {
        let mut next = self;
        while let Some(child) = next.first_child.as_deref() {
            next = child;
        }
        next
    }

    /// Absolute URL built from every non-empty path segment down the chain.
    pub fn url(&self) -> String {
        let mut segments = Vec::new();
        let mut next = Some(self);
        while let Some(route) = next {
            if !route.path.is_empty() {
                segments.push(route.path.as_str());
            }
            next = route.first_child.as_deref();
        }
        format!("/{}", segments.join("/"))
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NavigationOutcome {
    Committed,
    Rejected,
}

/// Navigation collaborator.
pub trait Navigator {
    /// Request a navigation. Guards and same-URL requests reject.
    fn navigate_by_url(&mut self, url: &str) -> NavigationOutcome;

    /// Snapshot of the currently displayed route.
    fn snapshot(&self) -> RouteSnapshot;

    /// URLs of navigations that settled since the last call.
    fn drain_settled(&mut self) -> Vec<String>;
}

/// In-memory router with guards and an optional reuse strategy.
#[derive(Default)]
pub struct MemoryRouter {
    routes: HashMap<String, RouteSnapshot>,
    guarded: HashSet<String>,
    current: RouteSnapshot,
    settled: Vec<String>,
    strategy: Option<Rc<RefCell<MemoryCache>>>,
}

impl MemoryRouter {
    pub fn new(initial_url: &str) -> Self {
        Self {
            current: RouteSnapshot::new(initial_url),
            ..Self::default()
        }
    }

    /// Store departing routes into `cache` on every committed navigation.
    pub fn with_reuse_strategy(mut self, cache: Rc<RefCell<MemoryCache>>) -> Self {
        self.strategy = Some(cache);
        self
    }

    pub fn register(&mut self, snapshot: RouteSnapshot) {
        let url = snapshot.url();
        if self.current.url() == url {
            self.current = snapshot.clone();
        }
        self.routes.insert(url, snapshot);
    }

    pub fn guard(&mut self, url: &str) {
        self.guarded.insert(url.to_string());
    }

    pub fn unguard(&mut self, url: &str) {
        self.guarded.remove(url);
    }

    pub fn current_url(&self) -> String {
        self.current.url()
    }

    fn resolve(&self, url: &str) -> RouteSnapshot {
        self.routes
            .get(url)
            .cloned()
            .unwrap_or_else(|| RouteSnapshot::new(url))
    }
}

impl Navigator for MemoryRouter {
    fn navigate_by_url(&mut self, url: &str) -> NavigationOutcome {
        if self.current.url() == url {
            return NavigationOutcome::Rejected;
        }
        if self.guarded.contains(url) {
            crate::debug_log!("[router] guard rejected navigation to {}", url);
            return NavigationOutcome::Rejected;
        }

        if let Some(cache) = &self.strategy {
            cache.borrow_mut().store(&self.current);
        }
        self.current = self.resolve(url);
        self.settled.push(url.to_string());
        NavigationOutcome::Committed
    }

    fn snapshot(&self) -> RouteSnapshot {
        self.current.clone()
    }

    fn drain_settled(&mut self) -> Vec<String> {
        std::mem::take(&mut self.settled)
    }
}
