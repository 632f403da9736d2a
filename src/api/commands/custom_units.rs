use tracing::debug;
use uuid::Uuid;

use super::converter::to_dto;
use crate::core::ToolkitStore;
use crate::shared::errors::{CommandError, CommandResult};
use crate::shared::types::{CustomUnit, SaveCustomUnitRequest, UnitDTO};

/// Create a custom unit, or edit it when the request carries an id.
///
/// Name and symbol are trimmed and must not be empty.
pub async fn save_custom_unit(store: &ToolkitStore, request: SaveCustomUnitRequest) -> CommandResult<UnitDTO> {
    let name = request.name.trim();
    let symbol = request.symbol.trim();
    if name.is_empty() {
        return Err(CommandError::InvalidInput("Name is required".to_string()));
    }
    if symbol.is_empty() {
        return Err(CommandError::InvalidInput("Symbol is required".to_string()));
    }

    let mut unit = CustomUnit::new(request.category, name, symbol, request.multiplier_to_base);

    match request.id {
        Some(id) => {
            if !store.custom_units().iter().any(|existing| existing.id == id) {
                return Err(CommandError::NotFound(format!("Custom unit {}", id)));
            }
            unit.id = id;
            store.update_custom_unit(unit.clone())?;
            debug!(%id, "custom unit saved");
        }
        None => store.add_custom_unit(unit.clone())?,
    }

    Ok(to_dto(&unit.definition()))
}

pub async fn delete_custom_unit(store: &ToolkitStore, id: Uuid) -> CommandResult<()> {
    store.delete_custom_unit(id);
    Ok(())
}
