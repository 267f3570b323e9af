use super::ReuseTab;
use crate::cache::RouteCache;
use crate::i18n::TitleResolver;
use crate::policy;
use crate::position::{self, Position};
use crate::router::Navigator;
use crate::types::{CacheNotify, ReuseItem, ReuseTabEvent};

impl<C: RouteCache, N: Navigator> ReuseTab<C, N> {
    /// Rebuild the strip from the cache and the live route.
    ///
    /// `notify` is the cache notification that triggered the run. A close
    /// shifts the active position by the evicted tab's old slot and then
    /// jumps to whatever tab now sits there.
    pub fn reconcile(&mut self, notify: Option<&CacheNotify>) {
        let is_closed = notify.is_some_and(CacheNotify::is_close);
        let closed_url = notify.and_then(CacheNotify::closed_url);
        let before_close_pos = closed_url.and_then(|url| position::index_of(&self.list, url));

        let resolver = TitleResolver::new(self.translator.as_deref());
        let allow_close = self.config.allow_close;
        let count = self.cache.count();

        let mut ls: Vec<ReuseItem> = self
            .cache
            .items()
            .into_iter()
            .enumerate()
            .map(|(index, entry)| ReuseItem {
                title: resolver.resolve(&entry.title),
                closable: policy::is_closable(allow_close, entry.closable, count),
                url: entry.url,
                index,
                active: false,
                last: false,
            })
            .collect();

        if self.config.show_current {
            let snapshot = self.navigator.snapshot();
            let url = self.cache.get_url(&snapshot);
            let closing = closed_url.map(|closed| (closed, before_close_pos));

            match position::resolve_position(&ls, &url, closing, self.pos) {
                Position::At(pos) if !ls.is_empty() => self.pos = pos,
                // Also reached when the live route was the last cached tab.
                _ => {
                    let truth = snapshot.truth();
                    let title = self.cache.get_title(&url, Some(truth));
                    let closable = policy::is_closable(
                        allow_close,
                        self.cache.get_closable(&url, Some(truth)),
                        count,
                    );
                    ls.push(ReuseItem {
                        title: resolver.resolve(&title),
                        closable,
                        url,
                        index: ls.len(),
                        active: false,
                        last: false,
                    });
                    self.pos = ls.len() - 1;
                }
            }
        }
        policy::protect_last_tab(&mut ls);

        self.list = ls;

        if !self.list.is_empty() && is_closed {
            self.activate(self.pos);
        }

        self.ref_status(false);
        self.visibility();
        self.emit(ReuseTabEvent::Refresh);
        crate::debug_log!(
            "[reuse-tab] reconciled {} tabs, active {}",
            self.list.len(),
            self.pos
        );
    }

    /// Recompute `active`/`last` flags from the active position.
    pub(super) fn ref_status(&mut self, notify: bool) {
        let len = self.list.len();
        if len > 0 {
            self.pos = position::clamp_index(self.pos, len);
        }
        let pos = self.pos;
        for (idx, item) in self.list.iter_mut().enumerate() {
            item.last = idx + 1 == len;
            item.active = idx == pos;
        }
        if notify {
            self.emit(ReuseTabEvent::Refresh);
        }
    }

    /// Hide the container while the strip is empty. Always shown when the
    /// live route is represented as a tab.
    fn visibility(&mut self) {
        if self.config.show_current {
            return;
        }

        let visible = !self.list.is_empty();
        if visible != self.visible {
            self.visible = visible;
            self.emit(ReuseTabEvent::Visibility(visible));
        }
    }
}
