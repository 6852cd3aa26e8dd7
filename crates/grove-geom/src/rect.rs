use crate::{Expanse, Point};

/// A rectangle with a signed origin and unsigned size.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

/// Clamp an i64 coordinate into the i32 range.
fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl Rect {
    /// Construct a rectangle from coordinates and size.
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// The zero rectangle at the origin.
    pub const fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Construct a rectangle from an origin point and a size.
    pub fn at(tl: Point, size: Expanse) -> Self {
        Self {
            tl,
            w: size.w,
            h: size.h,
        }
    }

    /// Does this rect have a zero area?
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// The size of this rectangle.
    pub fn expanse(&self) -> Expanse {
        Expanse::new(self.w, self.h)
    }

    /// Exclusive right edge, clamped to the coordinate range.
    pub fn right(&self) -> i32 {
        clamp_i32(i64::from(self.tl.x) + i64::from(self.w))
    }

    /// Exclusive bottom edge, clamped to the coordinate range.
    pub fn bottom(&self) -> i32 {
        clamp_i32(i64::from(self.tl.y) + i64::from(self.h))
    }

    /// Construct a rectangle from edges. Returns a zero-size rectangle at
    /// `(left, top)` if the edges are inverted.
    fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        let w = (i64::from(right) - i64::from(left)).max(0) as u32;
        let h = (i64::from(bottom) - i64::from(top)).max(0) as u32;
        Self::new(left, top, w, h)
    }

    /// Does this rectangle contain the point?
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.tl.x && p.x < self.right() && p.y >= self.tl.y && p.y < self.bottom()
    }

    /// Does this rectangle completely enclose `other`? Empty rectangles are
    /// enclosed by everything.
    pub fn contains_rect(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        other.tl.x >= self.tl.x
            && other.tl.y >= self.tl.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Do the two rectangles share any area?
    pub fn intersects(&self, other: &Self) -> bool {
        self.intersect(other).is_some()
    }

    /// Return the overlapping area of two rectangles, if any.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let left = self.tl.x.max(other.tl.x);
        let top = self.tl.y.max(other.tl.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self::from_edges(left, top, right, bottom))
    }

    /// The smallest rectangle enclosing both. Empty rectangles are ignored.
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::from_edges(
            self.tl.x.min(other.tl.x),
            self.tl.y.min(other.tl.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Split this rectangle into the pieces not covered by `other`. The result
    /// holds at most four disjoint rectangles: full-width bands above and below
    /// the overlap, then the left and right slivers beside it.
    pub fn subtract(&self, other: &Self) -> Vec<Self> {
        if self.is_empty() {
            return vec![];
        }
        let Some(hole) = self.intersect(other) else {
            return vec![*self];
        };
        let mut out = Vec::with_capacity(4);
        let (left, top, right, bottom) = (self.tl.x, self.tl.y, self.right(), self.bottom());
        if hole.tl.y > top {
            out.push(Self::from_edges(left, top, right, hole.tl.y));
        }
        if hole.bottom() < bottom {
            out.push(Self::from_edges(left, hole.bottom(), right, bottom));
        }
        if hole.tl.x > left {
            out.push(Self::from_edges(left, hole.tl.y, hole.tl.x, hole.bottom()));
        }
        if hole.right() < right {
            out.push(Self::from_edges(hole.right(), hole.tl.y, right, hole.bottom()));
        }
        out
    }
}

impl From<Expanse> for Rect {
    fn from(e: Expanse) -> Self {
        e.rect()
    }
}
