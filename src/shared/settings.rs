use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::shared::types::{MeasurementCategory, UnitIdentity};

/// Lowest display precision (fraction digits).
pub const MIN_PRECISION: i32 = 0;
/// Highest display precision (fraction digits).
pub const MAX_PRECISION: i32 = 6;
pub const DEFAULT_PRECISION: i32 = 2;

/// Preferred from/to pair for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitPreference {
    pub from: UnitIdentity,
    pub to: UnitIdentity,
}

impl UnitPreference {
    pub fn new(from: UnitIdentity, to: UnitIdentity) -> Self {
        Self { from, to }
    }
}

/// Global toolkit settings managed from the settings screen.
///
/// Missing fields in a stored blob fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct ToolkitSettings {
    pub precision: i32,
    pub grouping_separator_enabled: bool,
    pub default_units: HashMap<MeasurementCategory, UnitPreference>,
}

impl Default for ToolkitSettings {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            grouping_separator_enabled: true,
            default_units: HashMap::new(),
        }
    }
}

impl ToolkitSettings {
    pub fn clamp_precision(value: i32) -> i32 {
        value.clamp(MIN_PRECISION, MAX_PRECISION)
    }

    /// Precision as a digit count, clamped into the supported range.
    pub fn fraction_digits(&self) -> u32 {
        Self::clamp_precision(self.precision) as u32
    }

    /// Re-apply field invariants to a decoded value.
    pub fn sanitized(mut self) -> Self {
        self.precision = Self::clamp_precision(self.precision);
        self
    }
}
