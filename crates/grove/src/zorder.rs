//! Z layering and hit testing.

use std::{cmp::Reverse, collections::VecDeque};

use crate::{geom::Point, id::WidgetId, state::WidgetState, tree::Tree};

/// Number of points whose hit lists are retained.
pub const HIT_CACHE_SIZE: usize = 4;

/// Most-recently-used cache of hit lists keyed by point.
#[derive(Debug, Default)]
pub struct HitCache {
    /// Entries, most recently used first.
    entries: VecDeque<(Point, Vec<WidgetId>)>,
}

impl HitCache {
    /// Look up a point, promoting it to most recently used.
    pub fn get(&mut self, p: Point) -> Option<Vec<WidgetId>> {
        let idx = self.entries.iter().position(|(k, _)| *k == p)?;
        let entry = self.entries.remove(idx)?;
        let hits = entry.1.clone();
        self.entries.push_front(entry);
        Some(hits)
    }

    /// Store a hit list, evicting the least recently used entry when full.
    pub fn put(&mut self, p: Point, hits: Vec<WidgetId>) {
        self.entries.retain(|(k, _)| *k != p);
        self.entries.push_front((p, hits));
        self.entries.truncate(HIT_CACHE_SIZE);
    }

    /// Is this point cached?
    pub fn contains(&self, p: Point) -> bool {
        self.entries.iter().any(|(k, _)| *k == p)
    }

    /// Number of cached points.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the cache empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Attached widgets ordered topmost first: layers descending, and within a
/// layer a depth-first walk over children in reverse declaration order with
/// children before their parent. Subtrees for which `prune` returns true are
/// left out entirely.
pub fn topmost_first(
    tree: &Tree,
    prune: &dyn Fn(WidgetId, &WidgetState) -> bool,
) -> Vec<(i64, WidgetId)> {
    /// Post-order visit in reverse child order.
    fn visit(
        tree: &Tree,
        id: WidgetId,
        prune: &dyn Fn(WidgetId, &WidgetState) -> bool,
        out: &mut Vec<(i64, WidgetId)>,
    ) {
        let state = tree.live(id);
        if prune(id, state) {
            return;
        }
        for c in state.children.iter().rev() {
            visit(tree, *c, prune, out);
        }
        out.push((tree.cumulative_z(id), id));
    }

    let mut out = Vec::new();
    visit(tree, tree.root(), prune, &mut out);
    // Stable, so traversal order survives within each layer.
    out.sort_by_key(|(z, _)| Reverse(*z));
    out
}

/// Widgets whose visible bounds contain `p`, topmost first. Hidden and
/// pass-through widgets are excluded along with their subtrees.
pub fn hit_list(tree: &Tree, p: Point) -> Vec<WidgetId> {
    if let Some(hits) = tree.hits.borrow_mut().get(p) {
        return hits;
    }
    let hits: Vec<WidgetId> = topmost_first(tree, &|_, s| s.hidden || s.pass_through)
        .into_iter()
        .filter(|(_, id)| tree.visible_bounds(*id).contains_point(p))
        .map(|(_, id)| id)
        .collect();
    tree.hits.borrow_mut().put(p, hits.clone());
    hits
}

/// Is `id` hit at `p`? Anything in a higher layer at `p` occludes it.
pub fn is_hit(tree: &Tree, id: WidgetId, p: Point) -> bool {
    let z = tree.cumulative_z(id);
    for h in hit_list(tree, p) {
        if h == id {
            return true;
        }
        if tree.cumulative_z(h) != z {
            return false;
        }
    }
    false
}
