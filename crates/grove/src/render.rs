//! Drawing surfaces: the clipped canvas handed to widgets and the per-widget
//! offscreen buffers used for compositing.

use image::{Rgba, RgbaImage};

use crate::geom::{Expanse, Point, Rect};

/// Straight-alpha RGBA color.
pub type Color = Rgba<u8>;

/// Custom blend function: combines the destination pixel with the widget's
/// offscreen pixel and returns the result.
pub type CompositeFn = fn(dst: Color, src: Color) -> Color;

/// Fully transparent black.
pub const TRANSPARENT: Color = Rgba([0, 0, 0, 0]);

/// Source-over blend of straight-alpha colors.
pub fn blend_over(dst: Color, src: Color) -> Color {
    let sa = f32::from(src[3]) / 255.0;
    if sa >= 1.0 {
        return src;
    }
    let da = f32::from(dst[3]) / 255.0;
    let oa = sa + da * (1.0 - sa);
    if oa <= 0.0 {
        return TRANSPARENT;
    }
    let mix = |s: u8, d: u8| {
        let v = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / oa;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        (oa * 255.0).round() as u8,
    ])
}

/// Scale a color's alpha by `opacity`.
pub fn with_opacity(c: Color, opacity: f32) -> Color {
    let a = (f32::from(c[3]) * opacity.clamp(0.0, 1.0)).round() as u8;
    Rgba([c[0], c[1], c[2], a])
}

/// A lazily allocated buffer a widget's subtree is rendered into before being
/// composited onto the target.
#[derive(Debug)]
pub struct Offscreen {
    /// Pixel storage, sized to the widget's bounds.
    image: RgbaImage,
    /// Screen position of pixel (0, 0).
    origin: Point,
}

impl Offscreen {
    /// Reuse `prev` for `bounds` when the size matches, otherwise allocate a
    /// fresh buffer. Returns `None` for empty bounds, releasing `prev`.
    pub(crate) fn fit(prev: Option<Self>, bounds: Rect) -> Option<Self> {
        if bounds.is_empty() {
            return None;
        }
        match prev {
            Some(mut o) if o.size() == bounds.expanse() => {
                o.origin = bounds.tl;
                Some(o)
            }
            _ => Some(Self {
                image: RgbaImage::new(bounds.w, bounds.h),
                origin: bounds.tl,
            }),
        }
    }

    /// Buffer dimensions.
    pub fn size(&self) -> Expanse {
        Expanse::new(self.image.width(), self.image.height())
    }

    /// The screen area this buffer covers.
    pub fn rect(&self) -> Rect {
        Rect::at(self.origin, self.size())
    }

    /// A canvas drawing into this buffer, clipped to `clip`.
    pub(crate) fn canvas(&mut self, clip: Rect) -> Canvas<'_> {
        Canvas::new(&mut self.image, self.origin, clip)
    }
}

/// A drawing surface in screen coordinates, clipped to a rectangle.
#[derive(Debug)]
pub struct Canvas<'a> {
    /// Target pixels.
    image: &'a mut RgbaImage,
    /// Screen position of pixel (0, 0) of the target.
    origin: Point,
    /// Screen area that may be written.
    clip: Rect,
}

impl<'a> Canvas<'a> {
    /// A canvas over `image`, whose top-left pixel sits at `origin` on screen.
    /// The clip is narrowed to the image's own area.
    pub fn new(image: &'a mut RgbaImage, origin: Point, clip: Rect) -> Self {
        let area = Rect::at(origin, Expanse::new(image.width(), image.height()));
        let clip = clip.intersect(&area).unwrap_or_else(Rect::zero);
        Self {
            image,
            origin,
            clip,
        }
    }

    /// The writable screen area.
    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Reborrow with the clip narrowed to `rect`.
    pub fn clipped(&mut self, rect: Rect) -> Canvas<'_> {
        let clip = self.clip.intersect(&rect).unwrap_or_else(Rect::zero);
        Canvas {
            image: &mut *self.image,
            origin: self.origin,
            clip,
        }
    }

    /// Image coordinates of a screen point inside the clip.
    fn local(&self, p: Point) -> Option<(u32, u32)> {
        if !self.clip.contains_point(p) {
            return None;
        }
        let q = p - self.origin;
        Some((q.x as u32, q.y as u32))
    }

    /// Read a pixel, if it lies inside the clip.
    pub fn pixel(&self, p: Point) -> Option<Color> {
        self.local(p).map(|(x, y)| *self.image.get_pixel(x, y))
    }

    /// Overwrite a pixel.
    pub fn put_pixel(&mut self, p: Point, color: Color) {
        if let Some((x, y)) = self.local(p) {
            self.image.put_pixel(x, y, color);
        }
    }

    /// Blend a color over a pixel.
    pub fn blend_pixel(&mut self, p: Point, color: Color) {
        if let Some((x, y)) = self.local(p) {
            let dst = *self.image.get_pixel(x, y);
            self.image.put_pixel(x, y, blend_over(dst, color));
        }
    }

    /// Apply `f` to every pixel of `rect` that lies inside the clip.
    fn each(&mut self, rect: Rect, mut f: impl FnMut(Point, Color) -> Color) {
        let Some(r) = rect.intersect(&self.clip) else {
            return;
        };
        for y in r.tl.y..r.bottom() {
            for x in r.tl.x..r.right() {
                let p = Point::new(x, y);
                let q = p - self.origin;
                let (ix, iy) = (q.x as u32, q.y as u32);
                let dst = *self.image.get_pixel(ix, iy);
                self.image.put_pixel(ix, iy, f(p, dst));
            }
        }
    }

    /// Blend a color over a rectangle.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.each(rect, |_, dst| blend_over(dst, color));
    }

    /// Blend a one-pixel outline along the inside edge of a rectangle.
    pub fn stroke_rect(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        let (l, t, r, b) = (rect.tl.x, rect.tl.y, rect.right() - 1, rect.bottom() - 1);
        self.fill_rect(Rect::new(l, t, rect.w, 1), color);
        if b > t {
            self.fill_rect(Rect::new(l, b, rect.w, 1), color);
        }
        if rect.h > 2 {
            self.fill_rect(Rect::new(l, t + 1, 1, rect.h - 2), color);
            if r > l {
                self.fill_rect(Rect::new(r, t + 1, 1, rect.h - 2), color);
            }
        }
    }

    /// Overwrite the whole clip area.
    pub fn clear(&mut self, color: Color) {
        let clip = self.clip;
        self.each(clip, |_, _| color);
    }

    /// Composite an offscreen buffer onto this canvas with `opacity` applied to
    /// its pixels, combining them with `blend` or source-over.
    pub(crate) fn composite(
        &mut self,
        src: &Offscreen,
        opacity: f32,
        blend: Option<CompositeFn>,
    ) {
        let blend = blend.unwrap_or(blend_over);
        self.each(src.rect(), |p, dst| {
            let q = p - src.origin;
            let s = *src.image.get_pixel(q.x as u32, q.y as u32);
            blend(dst, with_opacity(s, opacity))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Rgba([255, 0, 0, 255]);
    const BLUE: Color = Rgba([0, 0, 255, 255]);

    #[test]
    fn blend() {
        assert_eq!(blend_over(RED, BLUE), BLUE);
        assert_eq!(blend_over(RED, TRANSPARENT), RED);
        assert_eq!(blend_over(RED, with_opacity(BLUE, 0.5)), Rgba([127, 0, 128, 255]));
        assert_eq!(blend_over(TRANSPARENT, TRANSPARENT), TRANSPARENT);
    }

    #[test]
    fn clip_and_origin() {
        let mut img = RgbaImage::new(10, 10);
        let mut c = Canvas::new(&mut img, Point::new(100, 100), Rect::new(0, 0, 105, 105));
        assert_eq!(c.clip(), Rect::new(100, 100, 5, 5));
        c.fill_rect(Rect::new(0, 0, 200, 200), RED);
        assert_eq!(c.pixel(Point::new(104, 104)), Some(RED));
        assert_eq!(c.pixel(Point::new(105, 105)), None);
        let mut inner = c.clipped(Rect::new(101, 101, 1, 1));
        inner.clear(BLUE);
        assert_eq!(*img.get_pixel(1, 1), BLUE);
        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(*img.get_pixel(5, 5), TRANSPARENT);
    }

    #[test]
    fn stroke() {
        let mut img = RgbaImage::new(4, 4);
        let mut c = Canvas::new(&mut img, Point::zero(), Rect::new(0, 0, 4, 4));
        c.stroke_rect(Rect::new(0, 0, 4, 4), RED);
        assert_eq!(c.pixel(Point::new(0, 0)), Some(RED));
        assert_eq!(c.pixel(Point::new(3, 2)), Some(RED));
        assert_eq!(c.pixel(Point::new(1, 1)), Some(TRANSPARENT));
    }

    #[test]
    fn offscreen_fit() {
        let o = Offscreen::fit(None, Rect::new(1, 1, 3, 3)).unwrap();
        let o = Offscreen::fit(Some(o), Rect::new(5, 5, 3, 3)).unwrap();
        assert_eq!(o.rect(), Rect::new(5, 5, 3, 3));
        let o = Offscreen::fit(Some(o), Rect::new(5, 5, 4, 3)).unwrap();
        assert_eq!(o.size(), Expanse::new(4, 3));
        assert!(Offscreen::fit(Some(o), Rect::zero()).is_none());
    }

    #[test]
    fn composite_with_opacity() {
        let mut off = Offscreen::fit(None, Rect::new(0, 0, 2, 2)).unwrap();
        off.canvas(Rect::new(0, 0, 2, 2)).clear(BLUE);
        let mut img = RgbaImage::from_pixel(2, 2, RED);
        let mut c = Canvas::new(&mut img, Point::zero(), Rect::new(0, 0, 2, 1));
        c.composite(&off, 0.5, None);
        assert_eq!(*img.get_pixel(0, 0), Rgba([127, 0, 128, 255]));
        assert_eq!(*img.get_pixel(0, 1), RED);
    }
}
