use std::env;

use crate::error::{Error, Result};

/// Environment variable holding comma-separated debug flags.
pub const DEBUG_VAR: &str = "GROVE_DEBUG";
/// Environment variable forcing the device scale factor.
pub const DEVICE_SCALE_VAR: &str = "GROVE_DEBUG_DEVICE_SCALE";

/// Debug toggles, read once at startup and handed to `App::new`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugConfig {
    /// Outline every redrawn region after drawing it.
    pub show_redraw_regions: bool,
    /// Log each handled input with the widget that handled it.
    pub log_input: bool,
    /// Use this device scale instead of the host's.
    pub device_scale: Option<f64>,
}

impl DebugConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::vars())
    }

    /// Build a configuration from name/value pairs. Unrelated names are
    /// ignored; unknown flags and malformed scales are errors.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut cfg = Self::default();
        for (k, v) in vars {
            match k.as_ref() {
                DEBUG_VAR => cfg.apply_flags(v.as_ref())?,
                DEVICE_SCALE_VAR => cfg.device_scale = Some(parse_scale(v.as_ref())?),
                _ => {}
            }
        }
        Ok(cfg)
    }

    /// Apply a comma-separated flag list.
    fn apply_flags(&mut self, flags: &str) -> Result<()> {
        for flag in flags.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match flag {
                "redraw" => self.show_redraw_regions = true,
                "input" => self.log_input = true,
                other => {
                    return Err(Error::Config(format!("unknown debug flag: {other}")));
                }
            }
        }
        Ok(())
    }
}

/// Parse a positive, finite scale factor.
fn parse_scale(s: &str) -> Result<f64> {
    let v: f64 = s
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid device scale: {s}")))?;
    if !v.is_finite() || v <= 0.0 {
        return Err(Error::Config(format!("device scale must be positive: {s}")));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flags() {
        let cfg = DebugConfig::from_vars([
            ("PATH", "/bin"),
            (DEBUG_VAR, "redraw, input"),
            (DEVICE_SCALE_VAR, "2.5"),
        ])
        .unwrap();
        assert_eq!(
            cfg,
            DebugConfig {
                show_redraw_regions: true,
                log_input: true,
                device_scale: Some(2.5),
            }
        );
        assert_eq!(
            DebugConfig::from_vars(Vec::<(String, String)>::new()).unwrap(),
            DebugConfig::default()
        );
        assert!(!DebugConfig::from_vars([(DEBUG_VAR, "")]).unwrap().log_input);
    }

    #[test]
    fn reject_malformed() {
        assert!(matches!(
            DebugConfig::from_vars([(DEBUG_VAR, "redraw,bogus")]),
            Err(Error::Config(_))
        ));
        for bad in ["abc", "0", "-1", "NaN", "inf"] {
            assert!(
                matches!(
                    DebugConfig::from_vars([(DEVICE_SCALE_VAR, bad)]),
                    Err(Error::Config(_))
                ),
                "{bad}"
            );
        }
    }
}
