//! Per-guild engine configuration.
//!
//! Read-only from the actions' point of view; the owning service mutates it
//! through the checked setters.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Default charge refresh period in hours.
pub const DEFAULT_CHARGE_REFRESH_HOURS: u32 = 12;

/// Configuration for one guild's RPG world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildConfig {
    guild_id: String,
    enabled: bool,
    charge_refresh_hours: u32,
    xp_multiplier: f64,
}

impl GuildConfig {
    /// Creates a configuration with default pacing.
    pub fn new(guild_id: impl Into<String>) -> Self {
        Self {
            guild_id: guild_id.into(),
            enabled: true,
            charge_refresh_hours: DEFAULT_CHARGE_REFRESH_HOURS,
            xp_multiplier: 1.0,
        }
    }

    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn charge_refresh_hours(&self) -> u32 {
        self.charge_refresh_hours
    }

    /// Sets the refresh period. Zero hours is rejected.
    pub fn set_charge_refresh_hours(&mut self, hours: u32) -> Result<(), EngineError> {
        if hours == 0 {
            return Err(EngineError::InvariantViolation(
                "charge refresh period must be at least one hour".to_string(),
            ));
        }
        self.charge_refresh_hours = hours;
        Ok(())
    }

    pub fn xp_multiplier(&self) -> f64 {
        self.xp_multiplier
    }

    /// Sets the XP multiplier. Values below 0.1 are rejected.
    pub fn set_xp_multiplier(&mut self, multiplier: f64) -> Result<(), EngineError> {
        if !multiplier.is_finite() || multiplier < 0.1 {
            return Err(EngineError::InvariantViolation(format!(
                "xp multiplier {multiplier} out of range (min 0.1)"
            )));
        }
        self.xp_multiplier = multiplier;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GuildConfig::new("guild-1");
        assert!(config.is_enabled());
        assert_eq!(config.charge_refresh_hours(), 12);
        assert_eq!(config.xp_multiplier(), 1.0);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut config = GuildConfig::new("guild-1");
        assert!(config.set_charge_refresh_hours(0).is_err());
        assert!(config.set_xp_multiplier(0.0).is_err());
        assert!(config.set_xp_multiplier(f64::NAN).is_err());
        // Previous values retained after rejection.
        assert_eq!(config.charge_refresh_hours(), 12);
        assert_eq!(config.xp_multiplier(), 1.0);

        assert!(config.set_charge_refresh_hours(6).is_ok());
        assert!(config.set_xp_multiplier(2.0).is_ok());
        assert_eq!(config.charge_refresh_hours(), 6);
        assert_eq!(config.xp_multiplier(), 2.0);
    }
}
