//! Display formatting for conversion results
//!
//! Non-localized: `.` decimal separator and `,` grouping separator. Locale
//! aware rendering belongs to the UI shell.

use rust_decimal::prelude::*;

use crate::shared::settings::ToolkitSettings;
use crate::shared::types::ConversionHistoryEntry;

/// Shown in place of a value when a conversion has no valid result.
pub const PLACEHOLDER: &str = "—";

/// Round half away from zero to `precision` fraction digits, strip trailing
/// zeros and optionally group the integer digits by thousands.
///
/// Examples: `130000.0 -> "130,000"`, `12.50 -> "12.5"`, `12.567 -> "12.57"`.
pub fn format_value(value: f64, precision: u32, grouping: bool) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }

    let plain = match Decimal::from_f64(value) {
        Some(decimal) => {
            let rounded = decimal
                .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
                .normalize();
            if rounded.is_zero() {
                "0".to_string()
            } else {
                rounded.to_string()
            }
        }
        // Beyond Decimal's range (~7.9e28) the float formatter is good enough
        None => trim_fraction(format!("{:.*}", precision as usize, value)),
    };

    if grouping {
        add_thousands_separators(&plain)
    } else {
        plain
    }
}

/// Format with the precision and grouping of `settings`.
pub fn format_with_settings(value: f64, settings: &ToolkitSettings) -> String {
    format_value(value, settings.fraction_digits(), settings.grouping_separator_enabled)
}

/// History output uses the precision frozen into the entry, not the current
/// setting; only grouping follows the live settings.
pub fn format_history_output(entry: &ConversionHistoryEntry, grouping: bool) -> String {
    let precision = ToolkitSettings::clamp_precision(entry.precision) as u32;
    format_value(entry.output_value, precision, grouping)
}

fn trim_fraction(formatted: String) -> String {
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn add_thousands_separators(plain: &str) -> String {
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}
