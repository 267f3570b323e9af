use super::ReuseTab;
use crate::cache::{MatchMode, MemoryCache, RouteCache};
use crate::config::ReuseTabConfig;
use crate::i18n::{Catalog, Language};
use crate::router::{MemoryRouter, NavigationOutcome, Navigator, RouteData, RouteSnapshot};
use crate::types::{Activation, CacheNotify, ContextCloseEvent, ContextCloseKind, ReuseTabEvent};
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::{Duration, Instant};

type SharedCache = Rc<RefCell<MemoryCache>>;

/// Navigator that records every request and commits unless told otherwise.
struct RecordingNavigator {
    current: String,
    requested: Vec<String>,
    reject: bool,
    settled: Vec<String>,
}

impl RecordingNavigator {
    fn new(current: &str) -> Self {
        Self {
            current: current.to_string(),
            requested: Vec::new(),
            reject: false,
            settled: Vec::new(),
        }
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_by_url(&mut self, url: &str) -> NavigationOutcome {
        self.requested.push(url.to_string());
        if self.reject {
            return NavigationOutcome::Rejected;
        }
        self.current = url.to_string();
        self.settled.push(url.to_string());
        NavigationOutcome::Committed
    }

    fn snapshot(&self) -> RouteSnapshot {
        RouteSnapshot::new(&self.current)
    }

    fn drain_settled(&mut self) -> Vec<String> {
        std::mem::take(&mut self.settled)
    }
}

fn url_config() -> ReuseTabConfig {
    ReuseTabConfig {
        mode: MatchMode::Url,
        ..ReuseTabConfig::default()
    }
}

fn url_cache(urls: &[&str]) -> MemoryCache {
    let mut cache = MemoryCache::new();
    cache.set_mode(MatchMode::Url);
    for url in urls {
        cache.store(&RouteSnapshot::new(url));
    }
    cache
}

fn strip_with(
    config: ReuseTabConfig,
    urls: &[&str],
    current: &str,
) -> ReuseTab<SharedCache, MemoryRouter> {
    let cache = Rc::new(RefCell::new(url_cache(urls)));
    let router = MemoryRouter::new(current).with_reuse_strategy(cache.clone());
    let mut tab = ReuseTab::new(config, cache, router).unwrap();
    tab.init(Instant::now());
    tab
}

fn strip(urls: &[&str], current: &str) -> ReuseTab<SharedCache, MemoryRouter> {
    strip_with(url_config(), urls, current)
}

fn urls<C: RouteCache, N: Navigator>(tab: &ReuseTab<C, N>) -> Vec<String> {
    tab.list().iter().map(|item| item.url.clone()).collect()
}

fn active_url<C: RouteCache, N: Navigator>(tab: &ReuseTab<C, N>) -> Option<String> {
    tab.list()
        .iter()
        .find(|item| item.active)
        .map(|item| item.url.clone())
}

fn assert_invariants<C: RouteCache, N: Navigator>(tab: &ReuseTab<C, N>) {
    let list = tab.list();
    if list.is_empty() {
        return;
    }

    assert_eq!(list.iter().filter(|item| item.active).count(), 1, "{list:?}");
    assert_eq!(list.iter().filter(|item| item.last).count(), 1, "{list:?}");
    assert!(list[list.len() - 1].last);
    assert!(list.iter().enumerate().all(|(idx, item)| item.index == idx));
    let unique: HashSet<&str> = list.iter().map(|item| item.url.as_str()).collect();
    assert_eq!(unique.len(), list.len(), "{list:?}");
    if list.len() == 1 {
        assert!(!list[0].closable);
    }
}

fn s(url: &str) -> String {
    url.to_string()
}

#[test]
fn current_route_in_cache_becomes_active() {
    let tab = strip(&["/a", "/b"], "/b");

    assert_eq!(urls(&tab), vec![s("/a"), s("/b")]);
    assert_eq!(tab.pos(), 1);
    assert!(tab.list()[1].active && tab.list()[1].last);
    assert!(!tab.list()[0].active && !tab.list()[0].last);
    assert_invariants(&tab);
}

#[test]
fn uncached_current_route_is_synthesized() {
    let tab = strip(&["/a"], "/c");

    assert_eq!(urls(&tab), vec![s("/a"), s("/c")]);
    assert_eq!(tab.pos(), 1);
    assert!(tab.list()[0].closable);
    assert!(tab.list()[1].closable);
    assert_invariants(&tab);
}

#[test]
fn sole_tab_is_never_closable() {
    let tab = strip(&["/a"], "/a");
    assert_eq!(tab.list().len(), 1);
    assert!(!tab.list()[0].closable);

    let config = ReuseTabConfig {
        show_current: false,
        ..url_config()
    };
    let tab = strip_with(config, &["/a"], "/elsewhere");
    assert_eq!(urls(&tab), vec![s("/a")]);
    assert!(!tab.list()[0].closable);
}

#[test]
fn allow_close_off_hides_every_close_affordance() {
    let config = ReuseTabConfig {
        allow_close: false,
        ..url_config()
    };
    let tab = strip_with(config, &["/a", "/b"], "/b");
    assert!(tab.list().iter().all(|item| !item.closable));
}

#[test]
fn closing_left_of_active_shifts_position_and_jumps() {
    let cache = url_cache(&["/a", "/b", "/c"]);
    let mut tab = ReuseTab::new(url_config(), cache, RecordingNavigator::new("/c")).unwrap();
    let now = Instant::now();
    tab.init(now);
    assert_eq!(tab.pos(), 2);
    tab.take_events();

    let closed = tab.close(0, false).unwrap();
    assert_eq!(closed.url, "/a");
    tab.pump(now);

    assert_eq!(urls(&tab), vec![s("/b"), s("/c")]);
    assert_eq!(tab.pos(), 1);
    assert_eq!(active_url(&tab).as_deref(), Some("/c"));
    assert_eq!(tab.navigator().requested, vec![s("/c")]);

    let events = tab.take_events();
    assert!(events.contains(&ReuseTabEvent::Close(Some(closed))));
    assert!(
        events
            .iter()
            .any(|event| matches!(event, ReuseTabEvent::Change(item) if item.url == "/c"))
    );
    assert_invariants(&tab);
}

#[test]
fn closing_the_active_tab_moves_to_left_neighbour() {
    let mut tab = strip(&["/a", "/b", "/c"], "/c");
    tab.take_events();

    tab.close(2, false);
    tab.pump(Instant::now());

    assert_eq!(urls(&tab), vec![s("/a"), s("/b")]);
    assert_eq!(tab.pos(), 1);
    assert_eq!(tab.navigator().current_url(), "/b");
    assert_eq!(tab.item().map(|item| item.url.as_str()), Some("/b"));
    assert!(!tab.cache().borrow().exists("/c"));
    assert_invariants(&tab);
}

#[test]
fn closing_right_of_active_keeps_position() {
    let mut tab = strip(&["/a", "/b", "/c"], "/a");
    tab.take_events();

    tab.close(2, false);
    tab.pump(Instant::now());

    assert_eq!(urls(&tab), vec![s("/a"), s("/b")]);
    assert_eq!(tab.pos(), 0);
    assert_eq!(tab.navigator().current_url(), "/a");
    let events = tab.take_events();
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, ReuseTabEvent::Change(_)))
    );
    assert_invariants(&tab);
}

#[test]
fn close_of_unknown_url_is_tolerated() {
    let mut tab = strip(&["/a", "/b"], "/b");
    tab.reconcile(Some(&CacheNotify::close("/zzz")));

    assert_eq!(urls(&tab), vec![s("/a"), s("/b")]);
    assert_eq!(tab.pos(), 1);
    assert_invariants(&tab);
}

#[test]
fn rejected_navigation_changes_nothing() {
    let mut tab = strip(&["/a", "/b"], "/a");
    tab.navigator_mut().guard("/b");
    tab.take_events();

    assert_eq!(tab.activate(1), Activation::Rejected);
    assert_eq!(tab.pos(), 0);
    assert_eq!(active_url(&tab).as_deref(), Some("/a"));
    assert!(tab.item().is_none());
    assert!(tab.take_events().is_empty());
}

#[test]
fn committed_navigation_updates_selection() {
    let mut tab = strip(&["/a", "/b"], "/a");
    tab.take_events();

    let outcome = tab.activate(7);
    assert!(outcome.is_committed());
    assert_eq!(tab.pos(), 1);
    assert_eq!(tab.navigator().current_url(), "/b");

    tab.pump(Instant::now());
    assert_eq!(tab.pos(), 1);
    assert_eq!(active_url(&tab).as_deref(), Some("/b"));
    let events = tab.take_events();
    assert!(matches!(events.first(), Some(ReuseTabEvent::Refresh)));
    assert!(
        events
            .iter()
            .any(|event| matches!(event, ReuseTabEvent::Change(item) if item.url == "/b" && item.active))
    );
}

#[test]
fn activate_on_empty_strip_is_rejected() {
    let config = ReuseTabConfig {
        show_current: false,
        ..url_config()
    };
    let mut tab = strip_with(config, &[], "/home");
    assert!(tab.list().is_empty());
    assert_eq!(tab.activate(0), Activation::Rejected);
    assert!(tab.close(0, false).is_none());
}

#[test]
fn reconciling_twice_is_idempotent() {
    let mut tab = strip(&["/a", "/b", "/c"], "/b");
    tab.reconcile(None);
    let first = (tab.list().to_vec(), tab.pos());
    tab.reconcile(None);
    assert_eq!((tab.list().to_vec(), tab.pos()), first);
}

#[test]
fn visibility_follows_emptiness_without_current_tab() {
    let config = ReuseTabConfig {
        show_current: false,
        ..url_config()
    };
    let mut tab = strip_with(config, &[], "/home");
    assert!(!tab.is_visible());
    assert!(tab.take_events().contains(&ReuseTabEvent::Visibility(false)));

    tab.cache().borrow_mut().store(&RouteSnapshot::new("/a"));
    tab.pump(Instant::now());
    assert!(tab.is_visible());
    assert!(tab.take_events().contains(&ReuseTabEvent::Visibility(true)));
}

#[test]
fn visibility_is_untouched_when_current_is_shown() {
    let mut tab = strip(&[], "/home");
    assert!(tab.is_visible());
    assert!(
        !tab.take_events()
            .iter()
            .any(|event| matches!(event, ReuseTabEvent::Visibility(_)))
    );
}

#[test]
fn context_menu_close_right_and_clear() {
    let mut tab = strip(&["/a", "/b", "/c", "/d"], "/a");
    tab.take_events();

    let anchor = tab.list()[1].clone();
    tab.cm_change(ContextCloseEvent {
        kind: ContextCloseKind::CloseRight,
        item: anchor,
        include_non_closeable: false,
    });
    tab.pump(Instant::now());
    assert_eq!(urls(&tab), vec![s("/a"), s("/b")]);
    assert!(tab.take_events().contains(&ReuseTabEvent::Close(None)));

    let anchor = tab.list()[0].clone();
    tab.cm_change(ContextCloseEvent {
        kind: ContextCloseKind::Clear,
        item: anchor,
        include_non_closeable: false,
    });
    tab.pump(Instant::now());
    assert_eq!(urls(&tab), vec![s("/a")]);
    assert!(!tab.list()[0].closable);
    assert!(tab.take_events().contains(&ReuseTabEvent::Close(None)));
}

#[test]
fn context_menu_close_uses_item_index() {
    let mut tab = strip(&["/a", "/b", "/c"], "/c");
    let target = tab.list()[1].clone();
    tab.cm_change(ContextCloseEvent {
        kind: ContextCloseKind::Close,
        item: target.clone(),
        include_non_closeable: false,
    });
    tab.pump(Instant::now());

    assert_eq!(urls(&tab), vec![s("/a"), s("/c")]);
    assert_eq!(active_url(&tab).as_deref(), Some("/c"));
    assert!(tab.take_events().contains(&ReuseTabEvent::Close(Some(target))));
}

#[test]
fn non_closeable_entries_survive_plain_close() {
    let mut tab = strip(&["/a", "/b"], "/b");
    tab.cache().borrow_mut().set_closable("/a", false);
    tab.pump(Instant::now());
    assert!(!tab.list()[0].closable);

    assert!(tab.close(0, false).is_none());
    tab.pump(Instant::now());
    assert_eq!(urls(&tab), vec![s("/a"), s("/b")]);
    assert_eq!(tab.pos(), 1);

    tab.close(0, true);
    tab.pump(Instant::now());
    assert_eq!(urls(&tab), vec![s("/b")]);
    assert_invariants(&tab);
}

#[test]
fn forced_close_of_sole_tab_keeps_live_route_listed() {
    let mut tab = strip(&["/a"], "/a");
    tab.close(0, true);
    tab.pump(Instant::now());

    assert_eq!(urls(&tab), vec![s("/a")]);
    assert_eq!(tab.pos(), 0);
    assert!(!tab.cache().borrow().exists("/a"));
    assert_invariants(&tab);

    let mut tab = strip(&[], "/a");
    assert_eq!(urls(&tab), vec![s("/a")]);
    tab.close(0, true);
    tab.pump(Instant::now());

    assert_eq!(urls(&tab), vec![s("/a")]);
    assert_eq!(active_url(&tab).as_deref(), Some("/a"));
    assert_invariants(&tab);
}

#[test]
fn translated_titles_follow_language_switch() {
    let catalog = Rc::new(RefCell::new(Catalog::load(Language::EnUs).unwrap()));
    let cache = Rc::new(RefCell::new(url_cache(&[])));
    let mut router = MemoryRouter::new("/dashboard").with_reuse_strategy(cache.clone());
    router.register(RouteSnapshot::new("/dashboard").with_data(RouteData {
        title: Some("Dash".into()),
        title_i18n: Some("menu.dashboard".into()),
        ..RouteData::default()
    }));
    let mut tab = ReuseTab::new(url_config(), cache, router)
        .unwrap()
        .with_translator(Box::new(catalog.clone()));

    let start = Instant::now();
    tab.init(start);
    assert_eq!(tab.list()[0].title, "Dashboard");

    catalog.borrow_mut().set_language(Language::ZhCn).unwrap();
    assert_eq!(tab.pump(start), 0);
    assert!(tab.next_deadline().is_some());
    assert_eq!(tab.pump(start + Duration::from_millis(150)), 1);
    assert_eq!(tab.list()[0].title, "仪表盘");
}

#[test]
fn raw_title_without_translator() {
    let cache = Rc::new(RefCell::new(url_cache(&[])));
    let mut router = MemoryRouter::new("/dashboard");
    router.register(RouteSnapshot::new("/dashboard").with_data(RouteData {
        title: Some("Dash".into()),
        title_i18n: Some("menu.dashboard".into()),
        ..RouteData::default()
    }));
    let mut tab = ReuseTab::new(url_config(), cache, router).unwrap();
    tab.init(Instant::now());
    assert_eq!(tab.list()[0].title, "Dash");
}

#[test]
fn dispose_stops_reconciliation() {
    let mut tab = strip(&["/a"], "/a");
    let before = tab.list().to_vec();
    tab.dispose();

    tab.cache().borrow_mut().store(&RouteSnapshot::new("/b"));
    assert_eq!(tab.pump(Instant::now()), 0);
    assert!(tab.is_disposed());
    assert_eq!(tab.list(), before.as_slice());
}

#[test]
fn set_config_forwards_cache_options() {
    let mut tab = strip(&["/a"], "/a");
    tab.set_config(ReuseTabConfig {
        max: Some(3),
        excludes: vec!["^/admin".into()],
        ..url_config()
    })
    .unwrap();

    assert_eq!(tab.config().max, Some(3));
    assert_eq!(tab.cache().borrow().max(), 3);
    assert!(!tab.cache().borrow().can(&RouteSnapshot::new("/admin/users")));
    assert!(
        tab.set_config(ReuseTabConfig {
            excludes: vec!["[".into()],
            ..url_config()
        })
        .is_err()
    );
}

proptest! {
    #[test]
    fn invariants_hold_across_action_sequences(
        actions in prop::collection::vec((0..3u8, 0..6usize), 0..120),
    ) {
        let pages = ["/a", "/b", "/c", "/d", "/e", "/f"];
        let mut tab = strip(&[], "/a");
        let now = Instant::now();

        for (kind, pick) in actions {
            let len = tab.list().len().max(1);
            match kind {
                0 => {
                    tab.navigator_mut().navigate_by_url(pages[pick]);
                }
                1 => {
                    let idx = pick % len;
                    if tab.list().get(idx).is_some_and(|item| item.closable) {
                        tab.close(idx, false);
                    }
                }
                _ => {
                    tab.activate(pick % len);
                }
            }
            tab.pump(now);

            assert_invariants(&tab);
            let current = tab.navigator().current_url();
            prop_assert!(
                urls(&tab).contains(&current),
                "{} missing from {:?}",
                current,
                urls(&tab)
            );
            prop_assert_eq!(active_url(&tab), Some(current));
        }
    }
}
