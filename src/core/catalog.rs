//! Unit catalog
//!
//! Built-in unit tables per category, merged on demand with the caller's
//! custom units. The literal multipliers below are part of the external
//! contract: persisted conversions and round-trip tests depend on them.

use std::f64::consts::PI;

use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::shared::types::{
    CustomUnit, MeasurementCategory, TemperatureUnit, UnitConverter, UnitDefinition, UnitIdentity,
};

// ============================================================================
// Built-in tables
// ============================================================================

/// Built-in units of one category. The base unit is stored apart so every
/// category has exactly one.
pub struct CategoryTable {
    base: UnitDefinition,
    others: Vec<UnitDefinition>,
}

impl CategoryTable {
    fn new(base: UnitDefinition, others: Vec<UnitDefinition>) -> Self {
        Self { base: base.system(), others }
    }

    pub fn base(&self) -> &UnitDefinition {
        &self.base
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitDefinition> {
        std::iter::once(&self.base).chain(self.others.iter())
    }
}

fn linear(id: &str, category: MeasurementCategory, name: &str, symbol: &str, multiplier: f64) -> UnitDefinition {
    UnitDefinition::new(id, category, name, symbol, UnitConverter::linear(multiplier))
}

static LENGTH: Lazy<CategoryTable> = Lazy::new(|| {
    use MeasurementCategory::Length as C;
    CategoryTable::new(
        linear("length.meter", C, "Meter", "m", 1.0),
        vec![
            linear("length.kilometer", C, "Kilometer", "km", 1_000.0),
            linear("length.centimeter", C, "Centimeter", "cm", 0.01),
            linear("length.millimeter", C, "Millimeter", "mm", 0.001),
            linear("length.micrometer", C, "Micrometer", "µm", 0.000001),
            linear("length.nanometer", C, "Nanometer", "nm", 0.000000001),
            linear("length.mile", C, "Mile", "mi", 1_609.344),
            linear("length.yard", C, "Yard", "yd", 0.9144),
            linear("length.foot", C, "Foot", "ft", 0.3048),
            linear("length.inch", C, "Inch", "in", 0.0254),
            linear("length.nauticalMile", C, "Nautical Mile", "NM", 1_852.0),
            linear("length.lightYear", C, "Light Year", "ly", 9_460_730_472_580_800.0),
        ],
    )
});

static MASS: Lazy<CategoryTable> = Lazy::new(|| {
    use MeasurementCategory::Mass as C;
    CategoryTable::new(
        linear("mass.kilogram", C, "Kilogram", "kg", 1.0),
        vec![
            linear("mass.gram", C, "Gram", "g", 0.001),
            linear("mass.milligram", C, "Milligram", "mg", 0.000001),
            linear("mass.microgram", C, "Microgram", "µg", 0.000000001),
            linear("mass.metricTon", C, "Metric Ton", "t", 1_000.0),
            linear("mass.pound", C, "Pound", "lb", 0.45359237),
            linear("mass.ounce", C, "Ounce", "oz", 0.028349523125),
            linear("mass.stone", C, "Stone", "st", 6.35029318),
        ],
    )
});

static VOLUME: Lazy<CategoryTable> = Lazy::new(|| {
    use MeasurementCategory::Volume as C;
    CategoryTable::new(
        linear("volume.cubicMeter", C, "Cubic Meter", "m³", 1.0),
        vec![
            linear("volume.liter", C, "Liter", "L", 0.001),
            linear("volume.milliliter", C, "Milliliter", "mL", 0.000001),
            linear("volume.usGallon", C, "US Gallon", "gal", 0.003785411784),
            linear("volume.usQuart", C, "US Quart", "qt", 0.000946352946),
            linear("volume.usPint", C, "US Pint", "pt", 0.000473176473),
            linear("volume.cubicFoot", C, "Cubic Foot", "ft³", 0.028316846592),
            linear("volume.cubicInch", C, "Cubic Inch", "in³", 0.000016387064),
        ],
    )
});

static AREA: Lazy<CategoryTable> = Lazy::new(|| {
    use MeasurementCategory::Area as C;
    CategoryTable::new(
        linear("area.squareMeter", C, "Square Meter", "m²", 1.0),
        vec![
            linear("area.squareKilometer", C, "Square Kilometer", "km²", 1_000_000.0),
            linear("area.squareCentimeter", C, "Square Centimeter", "cm²", 0.0001),
            linear("area.squareMillimeter", C, "Square Millimeter", "mm²", 0.000001),
            linear("area.hectare", C, "Hectare", "ha", 10_000.0),
            linear("area.are", C, "Are", "a", 100.0),
            linear("area.squareMile", C, "Square Mile", "mi²", 2_589_988.110336),
            linear("area.squareYard", C, "Square Yard", "yd²", 0.83612736),
            linear("area.squareFoot", C, "Square Foot", "ft²", 0.09290304),
            linear("area.squareInch", C, "Square Inch", "in²", 0.00064516),
            linear("area.acre", C, "Acre", "ac", 4_046.8564224),
        ],
    )
});

static SPEED: Lazy<CategoryTable> = Lazy::new(|| {
    use MeasurementCategory::Speed as C;
    CategoryTable::new(
        linear("speed.meterPerSecond", C, "Meter per Second", "m/s", 1.0),
        vec![
            linear("speed.kilometerPerHour", C, "Kilometer per Hour", "km/h", 0.2777777778),
            linear("speed.milePerHour", C, "Mile per Hour", "mph", 0.44704),
            linear("speed.knot", C, "Knot", "kn", 0.5144444444),
            linear("speed.footPerSecond", C, "Foot per Second", "ft/s", 0.3048),
            linear("speed.mach", C, "Mach (sea level)", "Ma", 340.29),
        ],
    )
});

static TEMPERATURE: Lazy<CategoryTable> = Lazy::new(|| {
    use MeasurementCategory::Temperature as C;
    let temperature = |id: &str, name: &str, symbol: &str, unit: TemperatureUnit| {
        UnitDefinition::new(id, C, name, symbol, UnitConverter::temperature(unit))
    };
    CategoryTable::new(
        temperature("temperature.kelvin", "Kelvin", "K", TemperatureUnit::Kelvin),
        vec![
            temperature("temperature.celsius", "Celsius", "°C", TemperatureUnit::Celsius),
            temperature("temperature.fahrenheit", "Fahrenheit", "°F", TemperatureUnit::Fahrenheit),
        ],
    )
});

static PRESSURE: Lazy<CategoryTable> = Lazy::new(|| {
    use MeasurementCategory::Pressure as C;
    CategoryTable::new(
        linear("pressure.pascal", C, "Pascal", "Pa", 1.0),
        vec![
            linear("pressure.kilopascal", C, "Kilopascal", "kPa", 1_000.0),
            linear("pressure.bar", C, "Bar", "bar", 100_000.0),
            linear("pressure.atmosphere", C, "Standard Atmosphere", "atm", 101_325.0),
            linear("pressure.mmHg", C, "Millimeter of Mercury", "mmHg", 133.322),
            linear("pressure.psi", C, "Pound per Square Inch", "psi", 6_894.757293168),
        ],
    )
});

static ENERGY: Lazy<CategoryTable> = Lazy::new(|| {
    use MeasurementCategory::Energy as C;
    CategoryTable::new(
        linear("energy.joule", C, "Joule", "J", 1.0),
        vec![
            linear("energy.kilojoule", C, "Kilojoule", "kJ", 1_000.0),
            linear("energy.calorie", C, "Calorie", "cal", 4.184),
            linear("energy.kilocalorie", C, "Kilocalorie", "kcal", 4_184.0),
            linear("energy.wattHour", C, "Watt Hour", "Wh", 3_600.0),
            linear("energy.kilowattHour", C, "Kilowatt Hour", "kWh", 3_600_000.0),
            linear("energy.electronVolt", C, "Electron Volt", "eV", 1.602176634e-19),
        ],
    )
});

static FORCE: Lazy<CategoryTable> = Lazy::new(|| {
    use MeasurementCategory::Force as C;
    CategoryTable::new(
        linear("force.newton", C, "Newton", "N", 1.0),
        vec![
            linear("force.kilonewton", C, "Kilonewton", "kN", 1_000.0),
            linear("force.poundForce", C, "Pound-force", "lbf", 4.4482216152605),
            linear("force.kilogramForce", C, "Kilogram-force", "kgf", 9.80665),
            linear("force.dyne", C, "Dyne", "dyn", 0.00001),
        ],
    )
});

static TIME: Lazy<CategoryTable> = Lazy::new(|| {
    use MeasurementCategory::Time as C;
    CategoryTable::new(
        linear("time.second", C, "Second", "s", 1.0),
        vec![
            linear("time.millisecond", C, "Millisecond", "ms", 0.001),
            linear("time.minute", C, "Minute", "min", 60.0),
            linear("time.hour", C, "Hour", "h", 3_600.0),
            linear("time.day", C, "Day", "d", 86_400.0),
            linear("time.week", C, "Week", "wk", 604_800.0),
            linear("time.month", C, "Month", "mo", 2_629_746.0),
            linear("time.year", C, "Year", "yr", 31_556_952.0),
        ],
    )
});

static ANGLE: Lazy<CategoryTable> = Lazy::new(|| {
    use MeasurementCategory::Angle as C;
    CategoryTable::new(
        linear("angle.radian", C, "Radian", "rad", 1.0),
        vec![
            linear("angle.degree", C, "Degree", "°", PI / 180.0),
            linear("angle.gradian", C, "Gradian", "grad", PI / 200.0),
            linear("angle.arcminute", C, "Arcminute", "′", PI / 10_800.0),
            linear("angle.arcsecond", C, "Arcsecond", "″", PI / 648_000.0),
            linear("angle.turn", C, "Turn", "turn", 2.0 * PI),
        ],
    )
});

static FUEL_CONSUMPTION: Lazy<CategoryTable> = Lazy::new(|| {
    use MeasurementCategory::FuelConsumption as C;
    let reciprocal = |id: &str, name: &str, symbol: &str, multiplier: f64| {
        UnitDefinition::new(id, C, name, symbol, UnitConverter::reciprocal(multiplier))
    };
    CategoryTable::new(
        linear("fuel.kilometerPerLiter", C, "Kilometer per Liter", "km/L", 1.0),
        vec![
            reciprocal("fuel.literPer100Km", "Liter per 100 km", "L/100km", 100.0),
            linear("fuel.milePerGallonUS", C, "Mile per Gallon (US)", "mpg", 1.609344 / 3.785411784),
            linear("fuel.milePerGallonUK", C, "Mile per Gallon (UK)", "mpg(UK)", 1.609344 / 4.54609),
            reciprocal("fuel.literPerKilometer", "Liter per Kilometer", "L/km", 1.0),
        ],
    )
});

fn table(category: MeasurementCategory) -> &'static CategoryTable {
    match category {
        MeasurementCategory::Length => &*LENGTH,
        MeasurementCategory::Mass => &*MASS,
        MeasurementCategory::Volume => &*VOLUME,
        MeasurementCategory::Area => &*AREA,
        MeasurementCategory::Speed => &*SPEED,
        MeasurementCategory::Temperature => &*TEMPERATURE,
        MeasurementCategory::Pressure => &*PRESSURE,
        MeasurementCategory::Energy => &*ENERGY,
        MeasurementCategory::Force => &*FORCE,
        MeasurementCategory::Time => &*TIME,
        MeasurementCategory::Angle => &*ANGLE,
        MeasurementCategory::FuelConsumption => &*FUEL_CONSUMPTION,
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Read-only view over the built-in tables.
///
/// Custom units are owned by the caller and passed in per call, so the
/// catalog itself holds no mutable state.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitCatalog;

impl UnitCatalog {
    /// Built-ins of `category` plus the custom units filed under it.
    ///
    /// The base unit comes first, the rest is sorted by display name.
    pub fn units_for(&self, category: MeasurementCategory, custom_units: &[CustomUnit]) -> Vec<UnitDefinition> {
        let mut units: Vec<UnitDefinition> = table(category)
            .iter()
            .cloned()
            .chain(
                custom_units
                    .iter()
                    .filter(|unit| unit.category == category)
                    .map(CustomUnit::definition),
            )
            .collect();

        units.sort_by(|lhs, rhs| {
            rhs.is_system_unit
                .cmp(&lhs.is_system_unit)
                .then_with(|| lhs.name.cmp(&rhs.name))
        });
        units
    }

    /// Dereference an identity. `None` means the unit is unavailable, e.g. a
    /// custom unit that has since been deleted.
    pub fn resolve(&self, identity: &UnitIdentity, custom_units: &[CustomUnit]) -> Option<UnitDefinition> {
        match identity {
            UnitIdentity::Predefined(id) => self.find_by_id(id).cloned(),
            UnitIdentity::Custom(id) => Self::find_custom(id, custom_units).map(CustomUnit::definition),
        }
    }

    /// Linear scan of every built-in table.
    pub fn find_by_id(&self, id: &str) -> Option<&'static UnitDefinition> {
        self.all_built_in().find(|definition| definition.id == id)
    }

    pub fn base_unit_for(&self, category: MeasurementCategory) -> &'static UnitDefinition {
        table(category).base()
    }

    pub fn all_built_in(&self) -> impl Iterator<Item = &'static UnitDefinition> {
        MeasurementCategory::ALL
            .into_iter()
            .flat_map(|category| table(category).iter())
    }

    /// Custom units are plain multipliers of the base unit, so only categories
    /// whose base unit is linear can host them.
    pub fn supports_custom_units(&self, category: MeasurementCategory) -> bool {
        self.base_unit_for(category).converter.is_linear()
    }

    /// Whether `symbol` collides with a built-in or another custom unit of
    /// the same category. Comparison trims whitespace and ignores case; no
    /// Unicode normalization is applied ("µ" and "μ" stay distinct).
    pub fn has_symbol_conflict(
        &self,
        symbol: &str,
        category: MeasurementCategory,
        custom_units: &[CustomUnit],
        excluding: Option<Uuid>,
    ) -> bool {
        let normalized = normalize_symbol(symbol);

        let built_in_conflict = table(category)
            .iter()
            .any(|definition| normalize_symbol(&definition.symbol) == normalized);

        let custom_conflict = custom_units.iter().any(|unit| {
            unit.category == category
                && Some(unit.id) != excluding
                && normalize_symbol(&unit.symbol) == normalized
        });

        built_in_conflict || custom_conflict
    }

    fn find_custom<'a>(id: &Uuid, custom_units: &'a [CustomUnit]) -> Option<&'a CustomUnit> {
        custom_units.iter().find(|unit| &unit.id == id)
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_lowercase()
}
