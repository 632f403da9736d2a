use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Prefix carried by the catalog id of every user-defined unit.
pub const CUSTOM_ID_PREFIX: &str = "custom.";

// ============================================================================
// Units
// ============================================================================

/// Supported conversion categories.
///
/// The serialized names are the stable identity used as persistence keys
/// (e.g. in `ToolkitSettings::default_units`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum MeasurementCategory {
    Length,
    Mass,
    Volume,
    Area,
    Speed,
    Temperature,
    Pressure,
    Energy,
    Force,
    Time,
    Angle,
    #[serde(rename = "Fuel Consumption")]
    FuelConsumption,
}

impl MeasurementCategory {
    pub const ALL: [MeasurementCategory; 12] = [
        MeasurementCategory::Length,
        MeasurementCategory::Mass,
        MeasurementCategory::Volume,
        MeasurementCategory::Area,
        MeasurementCategory::Speed,
        MeasurementCategory::Temperature,
        MeasurementCategory::Pressure,
        MeasurementCategory::Energy,
        MeasurementCategory::Force,
        MeasurementCategory::Time,
        MeasurementCategory::Angle,
        MeasurementCategory::FuelConsumption,
    ];

    /// Human readable title, identical to the serialized name.
    pub fn title(&self) -> &'static str {
        match self {
            MeasurementCategory::Length => "Length",
            MeasurementCategory::Mass => "Mass",
            MeasurementCategory::Volume => "Volume",
            MeasurementCategory::Area => "Area",
            MeasurementCategory::Speed => "Speed",
            MeasurementCategory::Temperature => "Temperature",
            MeasurementCategory::Pressure => "Pressure",
            MeasurementCategory::Energy => "Energy",
            MeasurementCategory::Force => "Force",
            MeasurementCategory::Time => "Time",
            MeasurementCategory::Angle => "Angle",
            MeasurementCategory::FuelConsumption => "Fuel Consumption",
        }
    }

    /// Parse a category from its title, ignoring case and surrounding whitespace.
    pub fn from_title(title: &str) -> Option<Self> {
        let title = title.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.title().eq_ignore_ascii_case(title))
    }
}

impl std::fmt::Display for MeasurementCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Explicit temperature scales for the non-linear temperature strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TemperatureUnit {
    Kelvin,
    Celsius,
    Fahrenheit,
}

/// Strategy mapping a unit's value to and from its category's base value.
///
/// Encoded as `{"type": "linear", "multiplier": ..}` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "lowercase")]
#[ts(export)]
pub enum UnitConverter {
    Linear { multiplier: f64 },
    Affine { scale: f64, offset: f64 },
    Reciprocal { multiplier: f64 },
    Temperature { unit: TemperatureUnit },
}

impl UnitConverter {
    pub const fn linear(multiplier: f64) -> Self {
        UnitConverter::Linear { multiplier }
    }

    pub const fn reciprocal(multiplier: f64) -> Self {
        UnitConverter::Reciprocal { multiplier }
    }

    pub const fn temperature(unit: TemperatureUnit) -> Self {
        UnitConverter::Temperature { unit }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, UnitConverter::Linear { .. })
    }
}

/// Descriptor shared by predefined and custom units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UnitDefinition {
    pub id: String,
    pub category: MeasurementCategory,
    pub name: String,
    pub symbol: String,
    pub converter: UnitConverter,
    pub is_system_unit: bool,
}

impl UnitDefinition {
    pub fn new(
        id: impl Into<String>,
        category: MeasurementCategory,
        name: impl Into<String>,
        symbol: impl Into<String>,
        converter: UnitConverter,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            name: name.into(),
            symbol: symbol.into(),
            converter,
            is_system_unit: false,
        }
    }

    pub fn system(mut self) -> Self {
        self.is_system_unit = true;
        self
    }

    pub fn identity(&self) -> UnitIdentity {
        UnitIdentity::for_definition(self)
    }
}

/// User defined unit, always linear relative to the category's base unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomUnit {
    pub id: Uuid,
    pub category: MeasurementCategory,
    pub name: String,
    pub symbol: String,
    pub multiplier_to_base: f64,
}

impl CustomUnit {
    pub fn new(
        category: MeasurementCategory,
        name: impl Into<String>,
        symbol: impl Into<String>,
        multiplier_to_base: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            name: name.into(),
            symbol: symbol.into(),
            multiplier_to_base,
        }
    }

    pub fn catalog_id(&self) -> String {
        format!("{}{}", CUSTOM_ID_PREFIX, self.id.hyphenated())
    }

    pub fn definition(&self) -> UnitDefinition {
        UnitDefinition::new(
            self.catalog_id(),
            self.category,
            self.name.clone(),
            self.symbol.clone(),
            UnitConverter::linear(self.multiplier_to_base),
        )
    }

    pub fn identity(&self) -> UnitIdentity {
        UnitIdentity::Custom(self.id)
    }
}

/// Durable reference to a unit that survives catalog edits.
///
/// Encoded as `{"type": "pre" | "custom", "value": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "value")]
#[ts(export)]
pub enum UnitIdentity {
    #[serde(rename = "pre")]
    Predefined(String),
    #[serde(rename = "custom")]
    Custom(Uuid),
}

impl UnitIdentity {
    pub fn predefined(id: impl Into<String>) -> Self {
        UnitIdentity::Predefined(id.into())
    }

    /// Catalog id this identity points at.
    pub fn raw_value(&self) -> String {
        match self {
            UnitIdentity::Predefined(id) => id.clone(),
            UnitIdentity::Custom(id) => format!("{}{}", CUSTOM_ID_PREFIX, id.hyphenated()),
        }
    }

    /// Parse a catalog id. A `custom.` prefix followed by a valid UUID is a
    /// custom identity; everything else is treated as predefined.
    pub fn from_raw(raw: &str) -> Self {
        raw.strip_prefix(CUSTOM_ID_PREFIX)
            .and_then(|rest| Uuid::parse_str(rest).ok())
            .map(UnitIdentity::Custom)
            .unwrap_or_else(|| UnitIdentity::Predefined(raw.to_string()))
    }

    pub fn for_definition(definition: &UnitDefinition) -> Self {
        Self::from_raw(&definition.id)
    }
}

// ============================================================================
// Toolkit records
// ============================================================================

/// Saved (category, from, to) conversion, a.k.a. favorite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConversionPreset {
    pub id: Uuid,
    pub title: String,
    pub category: MeasurementCategory,
    pub from_unit: UnitIdentity,
    pub to_unit: UnitIdentity,
    pub last_input_value: Option<f64>,
}

impl ConversionPreset {
    pub fn new(
        title: impl Into<String>,
        category: MeasurementCategory,
        from_unit: UnitIdentity,
        to_unit: UnitIdentity,
        last_input_value: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            category,
            from_unit,
            to_unit,
            last_input_value,
        }
    }

    /// Favorites are unique by this triple; the title is not part of identity.
    pub fn matches(&self, category: MeasurementCategory, from: &UnitIdentity, to: &UnitIdentity) -> bool {
        self.category == category && &self.from_unit == from && &self.to_unit == to
    }
}

/// Historic conversion, kept for the most recent operations only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConversionHistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub category: MeasurementCategory,
    pub from_unit: UnitIdentity,
    pub to_unit: UnitIdentity,
    pub input_value: f64,
    pub output_value: f64,
    /// Display precision in effect when the entry was recorded.
    pub precision: i32,
}

impl ConversionHistoryEntry {
    pub fn new(
        category: MeasurementCategory,
        from_unit: UnitIdentity,
        to_unit: UnitIdentity,
        input_value: f64,
        output_value: f64,
        precision: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            category,
            from_unit,
            to_unit,
            input_value,
            output_value,
            precision,
        }
    }
}

/// Tally counter with optional clamping bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CounterItem {
    pub id: Uuid,
    pub name: String,
    pub value: f64,
    pub step: f64,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub haptics_enabled: bool,
}

impl CounterItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            value: 0.0,
            step: 1.0,
            lower_bound: None,
            upper_bound: None,
            haptics_enabled: true,
        }
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn with_bounds(mut self, lower_bound: Option<f64>, upper_bound: Option<f64>) -> Self {
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
        self
    }

    /// Add `step`, snapping to `upper_bound` when the result would pass it.
    pub fn increment(&mut self) {
        let next = self.value + self.step;
        self.value = match self.upper_bound {
            Some(upper) if next > upper => upper,
            _ => next,
        };
    }

    /// Subtract `step`, snapping to `lower_bound` when the result would pass it.
    pub fn decrement(&mut self) {
        let next = self.value - self.step;
        self.value = match self.lower_bound {
            Some(lower) if next < lower => lower,
            _ => next,
        };
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

/// Stopwatch snapshot; `duration` is in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StopwatchLog {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub duration: f64,
}

impl StopwatchLog {
    pub fn new(duration: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            duration,
        }
    }
}

// ============================================================================
// Command DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConvertUnitsRequest {
    pub amount: f64,
    pub from_unit: String,
    pub to_unit: String,
    #[serde(default)]
    pub record_history: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConvertUnitsResponse {
    pub result: f64,
    pub formatted_result: String,
    pub from_symbol: String,
    pub to_symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitDTO {
    pub id: String,
    pub label: String,
    pub symbol: String,
    pub category: MeasurementCategory,
    pub is_base: bool,
    pub is_custom: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GetUnitsResponse {
    pub units: Vec<UnitDTO>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaveCustomUnitRequest {
    /// Present when editing an existing unit.
    pub id: Option<Uuid>,
    pub category: MeasurementCategory,
    pub name: String,
    pub symbol: String,
    pub multiplier_to_base: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PresetSummary {
    pub id: Uuid,
    pub title: String,
    pub from_symbol: String,
    pub to_symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuickConversionRequest {
    pub preset_id: Uuid,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuickConversionResponse {
    pub result: Option<f64>,
    pub dialog: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CounterSummary {
    pub id: Uuid,
    pub name: String,
    pub value: f64,
    pub formatted_value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateSettingsRequest {
    pub precision: Option<i32>,
    pub grouping_separator_enabled: Option<bool>,
}
