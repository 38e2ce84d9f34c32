//! Display timezone for report timestamps
//!
//! All computation happens in UTC. The only local-time concern is how the
//! report's `generated_at` instant is printed, which follows `--timezone`,
//! then the `TZ` environment variable, then the system zone, then UTC.

use crate::error::{CloudcostError, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Timezone used to render timestamps in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayTimezone {
    tz: Tz,
}

impl Default for DisplayTimezone {
    fn default() -> Self {
        Self {
            tz: detect_local_timezone(),
        }
    }
}

impl DisplayTimezone {
    /// Fixed UTC display
    pub fn utc() -> Self {
        Self { tz: Tz::UTC }
    }

    /// Resolve from an optional IANA name, falling back to detection
    pub fn resolve(name: Option<&str>) -> Result<Self> {
        match name {
            Some(name) => {
                let tz = Tz::from_str(name).map_err(|_| {
                    CloudcostError::Config(format!(
                        "invalid timezone '{name}', expected an IANA name like 'Europe/Berlin' or 'UTC'"
                    ))
                })?;
                Ok(Self { tz })
            }
            None => Ok(Self::default()),
        }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn name(&self) -> &str {
        self.tz.name()
    }

    /// Render `instant` as `YYYY-MM-DD HH:MM ZONE`
    pub fn format(&self, instant: &DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.tz)
            .format("%Y-%m-%d %H:%M %Z")
            .to_string()
    }
}

/// Detect the local timezone, falling back to UTC
pub fn detect_local_timezone() -> Tz {
    #[allow(clippy::collapsible_if)]
    if let Ok(tz_str) = std::env::var("TZ") {
        if let Ok(tz) = Tz::from_str(&tz_str) {
            debug!("Using timezone from TZ environment variable: {}", tz_str);
            return tz;
        }
    }

    match iana_time_zone::get_timezone() {
        Ok(tz_str) => Tz::from_str(&tz_str).unwrap_or_else(|_| {
            debug!("Unrecognized system timezone '{}', using UTC", tz_str);
            Tz::UTC
        }),
        Err(e) => {
            debug!("Could not detect system timezone: {:?}, using UTC", e);
            Tz::UTC
        }
    }
}
