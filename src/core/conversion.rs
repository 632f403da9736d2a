//! Conversion engine
//!
//! Every conversion is routed through the category's base value:
//! `from -> base -> to`. Degenerate inputs never fail; they resolve to `NaN`
//! or `+inf`, which callers treat as "no valid conversion".

use crate::shared::types::{TemperatureUnit, UnitConverter, UnitDefinition};

const KELVIN_OFFSET: f64 = 273.15;

/// Convert `value` expressed in `from` into `to`.
///
/// Returns `NaN` when the units belong to different categories.
pub fn convert(value: f64, from: &UnitDefinition, to: &UnitDefinition) -> f64 {
    if from.category != to.category {
        return f64::NAN;
    }
    let base = to_base(value, &from.converter);
    from_base(base, &to.converter)
}

/// Map a value into the category's base representation.
pub fn to_base(value: f64, converter: &UnitConverter) -> f64 {
    match *converter {
        UnitConverter::Linear { multiplier } => value * multiplier,
        UnitConverter::Affine { scale, offset } => value * scale + offset,
        UnitConverter::Reciprocal { multiplier } => {
            if value.abs() <= f64::EPSILON {
                return f64::INFINITY;
            }
            multiplier / value
        }
        UnitConverter::Temperature { unit } => temperature_to_kelvin(value, unit),
    }
}

/// Map a base value back into the unit described by `converter`.
pub fn from_base(base: f64, converter: &UnitConverter) -> f64 {
    match *converter {
        UnitConverter::Linear { multiplier } => {
            if multiplier.abs() <= f64::EPSILON {
                return f64::NAN;
            }
            base / multiplier
        }
        UnitConverter::Affine { scale, offset } => {
            if scale.abs() <= f64::EPSILON {
                return f64::NAN;
            }
            (base - offset) / scale
        }
        UnitConverter::Reciprocal { multiplier } => {
            if base.abs() <= f64::EPSILON {
                return f64::INFINITY;
            }
            multiplier / base
        }
        UnitConverter::Temperature { unit } => temperature_from_kelvin(base, unit),
    }
}

fn temperature_to_kelvin(value: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Kelvin => value,
        TemperatureUnit::Celsius => value + KELVIN_OFFSET,
        TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0 + KELVIN_OFFSET,
    }
}

fn temperature_from_kelvin(kelvin: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Kelvin => kelvin,
        TemperatureUnit::Celsius => kelvin - KELVIN_OFFSET,
        TemperatureUnit::Fahrenheit => (kelvin - KELVIN_OFFSET) * 9.0 / 5.0 + 32.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::UnitCatalog;
    use crate::shared::types::MeasurementCategory;

    fn unit(id: &str) -> UnitDefinition {
        UnitCatalog.find_by_id(id).cloned().unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_temperature_fixed_points() {
        let celsius = unit("temperature.celsius");
        let fahrenheit = unit("temperature.fahrenheit");
        let kelvin = unit("temperature.kelvin");

        assert_close(convert(0.0, &celsius, &fahrenheit), 32.0);
        assert_close(convert(100.0, &celsius, &kelvin), 373.15);
        assert_close(convert(32.0, &fahrenheit, &celsius), 0.0);
        assert_close(convert(-40.0, &celsius, &fahrenheit), -40.0);
    }

    #[test]
    fn test_linear_conversions() {
        let meter = unit("length.meter");
        let kilometer = unit("length.kilometer");
        let mile = unit("length.mile");

        assert_eq!(convert(1000.0, &meter, &kilometer), 1.0);
        assert_eq!(convert(1.0, &mile, &meter), 1609.344);
    }

    #[test]
    fn test_reciprocal_conversions() {
        let per_100km = unit("fuel.literPer100Km");
        let km_per_liter = unit("fuel.kilometerPerLiter");

        assert_eq!(convert(100.0, &per_100km, &km_per_liter), 1.0);
        assert_eq!(convert(0.0, &per_100km, &km_per_liter), f64::INFINITY);
        assert_close(convert(5.0, &km_per_liter, &per_100km), 20.0);
    }

    #[test]
    fn test_category_mismatch_is_nan() {
        let meter = unit("length.meter");
        let kilogram = unit("mass.kilogram");
        for value in [0.0, 1.0, -3.5, 1e12] {
            assert!(convert(value, &meter, &kilogram).is_nan());
        }
    }

    #[test]
    fn test_degenerate_linear_unit_is_nan() {
        let meter = unit("length.meter");
        let broken = UnitDefinition::new(
            "length.broken",
            MeasurementCategory::Length,
            "Broken",
            "brk",
            UnitConverter::linear(0.0),
        );
        assert!(convert(5.0, &meter, &broken).is_nan());
    }

    #[test]
    fn test_affine_strategy() {
        // Rankine-like affine scale relative to a Kelvin base
        let converter = UnitConverter::Affine { scale: 5.0 / 9.0, offset: 0.0 };
        assert_close(from_base(to_base(491.67, &converter), &converter), 491.67);
        assert_close(to_base(491.67, &converter), 273.15);

        let degenerate = UnitConverter::Affine { scale: 0.0, offset: 10.0 };
        assert!(from_base(1.0, &degenerate).is_nan());
    }

    #[test]
    fn test_reciprocal_from_zero_base_is_infinite() {
        assert_eq!(from_base(0.0, &UnitConverter::reciprocal(100.0)), f64::INFINITY);
    }

    #[test]
    fn test_sub_epsilon_multiplier_is_degenerate_target() {
        // 1 eV = 1.602176634e-19 J sits below f64::EPSILON
        let joule = unit("energy.joule");
        let electron_volt = unit("energy.electronVolt");
        assert!(convert(1.0, &joule, &electron_volt).is_nan());
        assert_close(convert(1e19, &electron_volt, &joule), 1.602176634);
    }

    fn is_degenerate(definition: &UnitDefinition) -> bool {
        matches!(definition.converter, UnitConverter::Linear { multiplier } if multiplier.abs() <= f64::EPSILON)
    }

    #[test]
    fn test_round_trip_all_built_in_pairs() {
        let catalog = UnitCatalog;
        for category in MeasurementCategory::ALL {
            let units: Vec<_> = catalog
                .units_for(category, &[])
                .into_iter()
                .filter(|unit| !is_degenerate(unit))
                .collect();
            for a in &units {
                for b in &units {
                    for x in [1.5, 42.0, 1234.5, -7.25] {
                        let there = convert(x, a, b);
                        assert!(there.is_finite(), "{} -> {} not finite for {x}", a.id, b.id);
                        let back = convert(there, b, a);
                        let tolerance = 1e-9 * x.abs().max(1.0);
                        assert!(
                            (back - x).abs() <= tolerance,
                            "{} <-> {} round trip of {x} gave {back}",
                            a.id,
                            b.id
                        );
                    }
                }
            }
        }
    }
}
