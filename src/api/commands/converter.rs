//! Converter commands
//!
//! Units are addressed by catalog id (`length.mile`, `custom.<uuid>`).

use crate::core::conversion;
use crate::core::format::format_with_settings;
use crate::core::ToolkitStore;
use crate::shared::errors::{CommandError, CommandResult};
use crate::shared::types::{
    ConvertUnitsRequest, ConvertUnitsResponse, GetUnitsResponse, MeasurementCategory, UnitDTO, UnitDefinition,
    UnitIdentity,
};

/// Convert an amount between two units, optionally recording it in history.
pub async fn convert_units(store: &ToolkitStore, request: ConvertUnitsRequest) -> CommandResult<ConvertUnitsResponse> {
    if !request.amount.is_finite() {
        return Err(CommandError::InvalidInput("Amount must be a finite number".to_string()));
    }

    let from = resolve(store, &request.from_unit)?;
    let to = resolve(store, &request.to_unit)?;

    if from.category != to.category {
        return Err(CommandError::InvalidInput(format!(
            "Cannot convert {} to {}",
            from.category, to.category
        )));
    }

    let result = conversion::convert(request.amount, &from, &to);
    if !result.is_finite() {
        return Err(CommandError::UndefinedResult(format!(
            "{} {} has no value in {}",
            request.amount, from.symbol, to.symbol
        )));
    }

    if request.record_history {
        store.add_history_entry(from.category, from.identity(), to.identity(), request.amount, result);
    }

    Ok(ConvertUnitsResponse {
        result,
        formatted_result: format_with_settings(result, &store.settings()),
        from_symbol: from.symbol,
        to_symbol: to.symbol,
    })
}

/// Units of one category, or of every category when `category` is `None`.
pub async fn get_units(store: &ToolkitStore, category: Option<MeasurementCategory>) -> CommandResult<GetUnitsResponse> {
    let categories: Vec<MeasurementCategory> = match category {
        Some(category) => vec![category],
        None => MeasurementCategory::ALL.to_vec(),
    };

    let units = categories
        .into_iter()
        .flat_map(|category| store.units_for(category))
        .map(|definition| to_dto(&definition))
        .collect();

    Ok(GetUnitsResponse { units })
}

pub(crate) fn to_dto(definition: &UnitDefinition) -> UnitDTO {
    UnitDTO {
        id: definition.id.clone(),
        label: definition.name.clone(),
        symbol: definition.symbol.clone(),
        category: definition.category,
        is_base: definition.is_system_unit,
        is_custom: matches!(definition.identity(), UnitIdentity::Custom(_)),
    }
}

fn resolve(store: &ToolkitStore, unit_id: &str) -> CommandResult<UnitDefinition> {
    store
        .resolve_unit(&UnitIdentity::from_raw(unit_id))
        .ok_or_else(|| CommandError::NotFound(format!("Unknown unit: {}", unit_id)))
}
