//! Pool health state.
//!
//! # States
//! - Unknown: no liveness check has run yet
//! - Healthy: every endpoint answered the most recent check
//! - Unhealthy: at least one endpoint failed the most recent check
//!
//! There is no partial-availability mode. One inactive endpoint makes the
//! whole pool unhealthy until the next check passes.

use serde::Serialize;

/// Health State enum.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown = 0,
    Healthy = 1,
    Unhealthy = 2,
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthState::Healthy,
            2 => HealthState::Unhealthy,
            _ => HealthState::Unknown,
        }
    }
}

/// Outcome of one liveness sweep, partitioned by endpoint URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub active: Vec<String>,
    pub inactive: Vec<String>,
}

impl HealthReport {
    pub fn state(&self) -> HealthState {
        if self.inactive.is_empty() {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_report() {
        let mut report = HealthReport {
            active: vec!["a".into(), "b".into()],
            inactive: Vec::new(),
        };
        assert_eq!(report.state(), HealthState::Healthy);

        report.inactive.push("c".into());
        assert_eq!(report.state(), HealthState::Unhealthy);
    }

    #[test]
    fn test_state_roundtrip_u8() {
        assert_eq!(HealthState::from(HealthState::Unhealthy as u8), HealthState::Unhealthy);
        assert_eq!(HealthState::from(7), HealthState::Unknown);
    }
}
