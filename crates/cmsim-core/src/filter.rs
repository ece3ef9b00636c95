// ── Master list filter ──
//
// Case-insensitive substring match on the display key. Runs synchronously
// on every keystroke, so the identity case hands back the shared snapshot
// instead of copying it.

use std::sync::Arc;

use crate::model::MasterItem;

/// Return the items whose display key contains `query`, ignoring case and
/// surrounding whitespace.
///
/// An empty (or whitespace-only) query returns `items` itself. Order is
/// preserved.
pub fn filter_by_display_key<M: MasterItem>(
    items: &Arc<Vec<Arc<M>>>,
    query: &str,
) -> Arc<Vec<Arc<M>>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Arc::clone(items);
    }

    let matched: Vec<Arc<M>> = items
        .iter()
        .filter(|item| item.display_key().to_lowercase().contains(&needle))
        .cloned()
        .collect();
    Arc::new(matched)
}
