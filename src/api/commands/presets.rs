//! Favorites exposed as quick conversion presets

use uuid::Uuid;

use crate::core::format::format_with_settings;
use crate::core::{conversion, ToolkitStore};
use crate::shared::errors::{CommandError, CommandResult};
use crate::shared::types::{
    ConversionPreset, PresetSummary, QuickConversionRequest, QuickConversionResponse, UnitIdentity,
};

/// Number of favorites offered without a search
const SUGGESTED_PRESET_LIMIT: usize = 7;

/// Dialog shown when the preset converts to NaN or infinity
const UNDEFINED_RESULT_DIALOG: &str = "Result is undefined.";

pub async fn suggested_presets(store: &ToolkitStore) -> CommandResult<Vec<PresetSummary>> {
    Ok(store
        .favorites()
        .iter()
        .take(SUGGESTED_PRESET_LIMIT)
        .map(|preset| summarize(store, preset))
        .collect())
}

/// Summaries for the given ids, in favorites order. Unknown ids are skipped.
pub async fn presets_by_id(store: &ToolkitStore, ids: &[Uuid]) -> CommandResult<Vec<PresetSummary>> {
    Ok(store
        .favorites()
        .iter()
        .filter(|preset| ids.contains(&preset.id))
        .map(|preset| summarize(store, preset))
        .collect())
}

/// Run a saved conversion.
///
/// An undefined result is not an error: the response carries no value and
/// an explanatory dialog.
pub async fn quick_convert(
    store: &ToolkitStore,
    request: QuickConversionRequest,
) -> CommandResult<QuickConversionResponse> {
    let unavailable = || CommandError::NotFound("Unit unavailable".to_string());

    let preset = store
        .favorite(request.preset_id)
        .ok_or_else(|| CommandError::NotFound("Preset not found".to_string()))?;
    let from = store.resolve_unit(&preset.from_unit).ok_or_else(unavailable)?;
    let to = store.resolve_unit(&preset.to_unit).ok_or_else(unavailable)?;

    let result = conversion::convert(request.value, &from, &to);
    if !result.is_finite() {
        return Ok(QuickConversionResponse {
            result: None,
            dialog: UNDEFINED_RESULT_DIALOG.to_string(),
        });
    }

    let settings = store.settings();
    let dialog = format!(
        "{} {} = {} {}",
        format_with_settings(request.value, &settings),
        from.symbol,
        format_with_settings(result, &settings),
        to.symbol
    );

    Ok(QuickConversionResponse {
        result: Some(result),
        dialog,
    })
}

/// Missing units render as `?`; an empty title falls back to `from → to`.
fn summarize(store: &ToolkitStore, preset: &ConversionPreset) -> PresetSummary {
    let symbol_of = |identity: &UnitIdentity| {
        store
            .resolve_unit(identity)
            .map(|definition| definition.symbol)
            .unwrap_or_else(|| "?".to_string())
    };
    let from_symbol = symbol_of(&preset.from_unit);
    let to_symbol = symbol_of(&preset.to_unit);

    let title = if preset.title.is_empty() {
        format!("{} → {}", from_symbol, to_symbol)
    } else {
        preset.title.clone()
    };

    PresetSummary {
        id: preset.id,
        title,
        from_symbol,
        to_symbol,
    }
}
