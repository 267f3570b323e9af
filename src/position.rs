use crate::types::ReuseItem;

/// Where the active tab sits after a reconciliation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Position {
    At(usize),
    /// The live route has no tab yet; the reconciler appends one.
    NotPresent,
}

/// Index of `url` in the strip.
pub fn index_of(list: &[ReuseItem], url: &str) -> Option<usize> {
    list.iter().position(|item| item.url == url)
}

/// Clamp `index` into `0..len`. An empty strip maps everything to 0.
pub fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

/// Active index after the tab at `closed_pos` was evicted.
///
/// Closing at or left of the active tab shifts it one slot left; closing to
/// the right leaves it alone. `closed_pos` of `None` means the closed URL was
/// not in the previous strip, which keeps the previous position.
pub fn after_close(previous_pos: usize, closed_pos: Option<usize>, len: usize) -> usize {
    let pos = match closed_pos {
        Some(closed) if previous_pos >= closed => previous_pos.saturating_sub(1),
        _ => previous_pos,
    };
    clamp_index(pos, len)
}

/// Resolve the active position for `current_url`.
///
/// `closing` carries the evicted URL together with its index in the strip
/// from before the close. The close arithmetic applies whenever the live
/// route is still listed or is the route that was just closed.
pub fn resolve_position(
    list: &[ReuseItem],
    current_url: &str,
    closing: Option<(&str, Option<usize>)>,
    previous_pos: usize,
) -> Position {
    let idx = index_of(list, current_url);
    match (idx, closing) {
        (Some(_), Some((_, closed_pos))) => {
            Position::At(after_close(previous_pos, closed_pos, list.len()))
        }
        (None, Some((closed_url, closed_pos))) if closed_url == current_url => {
            Position::At(after_close(previous_pos, closed_pos, list.len()))
        }
        (Some(idx), None) => Position::At(idx),
        (None, _) => Position::NotPresent,
    }
}
