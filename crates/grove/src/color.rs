use std::time::{Duration, Instant};

/// Light or dark appearance.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Dark text on light backgrounds.
    #[default]
    Light,
    /// Light text on dark backgrounds.
    Dark,
}

/// How long an auto-detected color mode is trusted before asking the host again.
pub const COLOR_MODE_TTL: Duration = Duration::from_secs(1);

/// Caches the host's auto-detected color mode.
#[derive(Debug, Clone, Default)]
pub struct ColorModeCache {
    /// Last fetched mode and when it was fetched.
    cached: Option<(ColorMode, Instant)>,
}

impl ColorModeCache {
    /// Return the cached mode, calling `fetch` when nothing is cached or the
    /// cached value is older than [`COLOR_MODE_TTL`].
    pub fn refresh(&mut self, now: Instant, fetch: impl FnOnce() -> ColorMode) -> ColorMode {
        match self.cached {
            Some((mode, at)) if now.saturating_duration_since(at) < COLOR_MODE_TTL => mode,
            _ => {
                let mode = fetch();
                self.cached = Some((mode, now));
                mode
            }
        }
    }

    /// The cached mode, or the default when nothing has been fetched.
    pub fn current(&self) -> ColorMode {
        self.cached.map(|(m, _)| m).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refetches_after_ttl() {
        let mut c = ColorModeCache::default();
        assert_eq!(c.current(), ColorMode::Light);
        let t0 = Instant::now();
        let mut calls = 0;
        let mut fetch = |m| {
            calls += 1;
            m
        };
        assert_eq!(c.refresh(t0, || fetch(ColorMode::Dark)), ColorMode::Dark);
        assert_eq!(
            c.refresh(t0 + Duration::from_millis(500), || fetch(ColorMode::Light)),
            ColorMode::Dark
        );
        assert_eq!(
            c.refresh(t0 + Duration::from_millis(1000), || fetch(ColorMode::Light)),
            ColorMode::Light
        );
        assert_eq!(calls, 2);
        assert_eq!(c.current(), ColorMode::Light);
    }
}
