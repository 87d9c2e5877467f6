use serde::{Deserialize, Serialize};
use tracedash_protocol::SharedStr;

/// The dashboard-wide selected time range, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalTime {
    pub min_time: f64,
    pub max_time: f64,
}

impl GlobalTime {
    pub fn new(min_time: f64, max_time: f64) -> Self {
        Self { min_time, max_time }
    }

    pub fn min_time_ms(&self) -> f64 {
        self.min_time / 1e6
    }

    pub fn max_time_ms(&self) -> f64 {
        self.max_time / 1e6
    }
}

/// Display unit for span durations, relative to milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalUnit {
    pub name: SharedStr,
    pub multiplier: f64,
}

impl IntervalUnit {
    pub fn milliseconds() -> Self {
        Self {
            name: "ms".into(),
            multiplier: 1.0,
        }
    }

    pub fn seconds() -> Self {
        Self {
            name: "s".into(),
            multiplier: 1.0 / 1e3,
        }
    }

    pub fn minutes() -> Self {
        Self {
            name: "m".into(),
            multiplier: 1.0 / (1e3 * 60.0),
        }
    }

    /// All predefined units, smallest first.
    pub fn all() -> [Self; 3] {
        [Self::milliseconds(), Self::seconds(), Self::minutes()]
    }

    pub fn by_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|u| u.name == name)
    }

    /// Largest unit in which `spread_ms` still reads as at least 1.
    pub fn for_spread(spread_ms: f64) -> Self {
        Self::all()
            .into_iter()
            .rev()
            .find(|u| spread_ms * u.multiplier >= 1.0)
            .unwrap_or_else(Self::milliseconds)
    }

    /// Convert a millisecond duration into this unit.
    pub fn resolve(&self, ms: f64) -> f64 {
        ms * self.multiplier
    }
}

impl Default for IntervalUnit {
    fn default() -> Self {
        Self::milliseconds()
    }
}
