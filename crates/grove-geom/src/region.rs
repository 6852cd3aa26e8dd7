use crate::Rect;

/// A set of pixels expressed as a list of pairwise disjoint rectangles.
///
/// Adding a rectangle only inserts the parts of it that are not already
/// covered, so the stored rectangles never overlap and drawing each of them
/// once touches every covered pixel exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    /// Disjoint, non-empty rectangles.
    rects: Vec<Rect>,
}

impl Region {
    /// An empty region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rectangle to the region. Empty rectangles are ignored.
    pub fn add(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let mut pending = vec![rect];
        for existing in &self.rects {
            pending = pending
                .into_iter()
                .flat_map(|r| r.subtract(existing))
                .collect();
            if pending.is_empty() {
                return;
            }
        }
        self.rects.extend(pending);
    }

    /// Remove all rectangles.
    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Does the region cover no pixels?
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The disjoint rectangles making up this region.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// The smallest rectangle enclosing the whole region.
    pub fn bounds(&self) -> Rect {
        self.rects
            .iter()
            .fold(Rect::zero(), |acc, r| acc.union(r))
    }

    /// Total number of covered pixels.
    pub fn area(&self) -> u64 {
        self.rects.iter().map(|r| r.expanse().area()).sum()
    }

    /// Does any part of the region overlap `rect`?
    pub fn intersects(&self, rect: &Rect) -> bool {
        self.rects.iter().any(|r| r.intersects(rect))
    }

    /// Is every pixel of `rect` inside the region?
    pub fn covers(&self, rect: &Rect) -> bool {
        let mut rest = vec![*rect];
        for r in &self.rects {
            rest = rest.into_iter().flat_map(|p| p.subtract(r)).collect();
            if rest.is_empty() {
                return true;
            }
        }
        rest.iter().all(Rect::is_empty)
    }

    /// Clip every rectangle to `clip`, dropping the parts outside it.
    pub fn clip(&mut self, clip: &Rect) {
        self.rects = self.rects.iter().filter_map(|r| r.intersect(clip)).collect();
    }
}

impl FromIterator<Rect> for Region {
    fn from_iter<I: IntoIterator<Item = Rect>>(iter: I) -> Self {
        let mut region = Self::new();
        for r in iter {
            region.add(r);
        }
        region
    }
}
