use crate::types::ReuseItem;

/// Whether a tab shows a close affordance.
///
/// `cache_count` is what the cache reports as evictable, which can differ
/// from the length of the strip.
pub fn is_closable(allow_close: bool, entry_closable: bool, cache_count: usize) -> bool {
    allow_close && entry_closable && cache_count > 0
}

/// The sole remaining tab can never be closed.
pub fn protect_last_tab(list: &mut [ReuseItem]) {
    if let [only] = list {
        only.closable = false;
    }
}
