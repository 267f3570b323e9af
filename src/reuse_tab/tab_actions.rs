use super::ReuseTab;
use crate::cache::RouteCache;
use crate::position;
use crate::router::{NavigationOutcome, Navigator};
use crate::types::{Activation, ContextCloseEvent, ContextCloseKind, ReuseItem, ReuseTabEvent};

impl<C: RouteCache, N: Navigator> ReuseTab<C, N> {
    /// Navigate to the tab at `index` (clamped into the strip).
    ///
    /// The active position only moves when the navigation commits; a
    /// rejected request leaves the strip exactly as it was.
    pub fn activate(&mut self, index: usize) -> Activation {
        if self.list.is_empty() {
            return Activation::Rejected;
        }

        let index = position::clamp_index(index, self.list.len());
        let url = self.list[index].url.clone();
        match self.navigator.navigate_by_url(&url) {
            NavigationOutcome::Rejected => {
                crate::debug_log!("[reuse-tab] navigation to {} rejected", url);
                Activation::Rejected
            }
            NavigationOutcome::Committed => {
                self.pos = index;
                self.ref_status(true);
                let item = self.list[index].clone();
                self.item = Some(item.clone());
                self.emit(ReuseTabEvent::Change(item.clone()));
                Activation::Committed(item)
            }
        }
    }

    /// Evict the tab at `index` from the cache. Tabs without a close
    /// affordance are skipped unless `include_non_closeable` is set.
    pub fn close(&mut self, index: usize, include_non_closeable: bool) -> Option<ReuseItem> {
        if self.list.is_empty() {
            return None;
        }

        let index = position::clamp_index(index, self.list.len());
        let item = self.list[index].clone();
        if !include_non_closeable && !item.closable {
            return None;
        }
        self.cache.close(&item.url, include_non_closeable);
        crate::debug_log!("[reuse-tab] close {} (index {})", item.url, index);
        self.emit(ReuseTabEvent::Close(Some(item.clone())));
        self.emit(ReuseTabEvent::Refresh);
        Some(item)
    }

    /// Context menu actions.
    pub fn cm_change(&mut self, event: ContextCloseEvent) {
        let include_non_closeable = event.include_non_closeable;
        match event.kind {
            ContextCloseKind::Close => {
                self.close(event.item.index, include_non_closeable);
            }
            ContextCloseKind::CloseRight => {
                self.cache.close_right(&event.item.url, include_non_closeable);
                self.emit(ReuseTabEvent::Close(None));
            }
            ContextCloseKind::Clear | ContextCloseKind::CloseOther => {
                self.cache.clear(include_non_closeable);
                self.emit(ReuseTabEvent::Close(None));
            }
        }
    }
}
