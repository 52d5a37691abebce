//! Tunables of the claim protocol and change feed.

use std::time::Duration;

use crate::claims::{
    DEFAULT_DRAW_DURATION_SECS, DEFAULT_RENEW_INTERVAL_SECS, MIN_RENEWALS_PER_WINDOW,
};
use crate::error::CoreError;
use crate::grid::{validate_board_size, DEFAULT_BOARD_SIZE};

/// Default interval between change-feed keep-alive signals.
pub const DEFAULT_FEED_KEEPALIVE_SECS: u64 = 20;

/// Settings shared by the protocol services and the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageSettings {
    /// Claim lifetime after a claim or renewal, in seconds.
    pub draw_duration_secs: i64,
    /// Renewal cadence advertised to clients, in seconds.
    pub renew_interval_secs: i64,
    /// Interval between keep-alive signals on each feed connection.
    pub feed_keepalive_secs: u64,
    /// Side length for boards created without an explicit size.
    pub default_board_size: i32,
}

impl CollageSettings {
    /// The draw window as a chrono duration.
    pub fn draw_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.draw_duration_secs)
    }

    pub fn feed_keepalive(&self) -> Duration {
        Duration::from_secs(self.feed_keepalive_secs)
    }

    /// Reject settings under which a single missed renewal could evict an
    /// active drawer.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.renew_interval_secs < 1 {
            return Err(CoreError::Validation(
                "renew interval must be at least 1 second".into(),
            ));
        }
        if self.draw_duration_secs < self.renew_interval_secs * MIN_RENEWALS_PER_WINDOW {
            return Err(CoreError::Validation(format!(
                "draw duration ({}s) must be at least {MIN_RENEWALS_PER_WINDOW}x the renew interval ({}s)",
                self.draw_duration_secs, self.renew_interval_secs
            )));
        }
        if self.feed_keepalive_secs == 0 {
            return Err(CoreError::Validation(
                "feed keep-alive interval must be positive".into(),
            ));
        }
        validate_board_size(self.default_board_size)
    }
}

impl Default for CollageSettings {
    fn default() -> Self {
        Self {
            draw_duration_secs: DEFAULT_DRAW_DURATION_SECS,
            renew_interval_secs: DEFAULT_RENEW_INTERVAL_SECS,
            feed_keepalive_secs: DEFAULT_FEED_KEEPALIVE_SECS,
            default_board_size: DEFAULT_BOARD_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(CollageSettings::default().validate().is_ok());
        assert_eq!(
            CollageSettings::default().draw_duration(),
            chrono::Duration::minutes(5)
        );
    }

    #[test]
    fn draw_window_must_exceed_renewals() {
        let settings = CollageSettings {
            draw_duration_secs: 30,
            renew_interval_secs: 20,
            ..CollageSettings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("renew interval"));
    }

    #[test]
    fn zero_keepalive_rejected() {
        let settings = CollageSettings {
            feed_keepalive_secs: 0,
            ..CollageSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
