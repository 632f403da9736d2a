//! Settings command module
//!
//! Handles toolkit settings access.

use crate::core::ToolkitStore;
use crate::shared::errors::CommandResult;
use crate::shared::settings::ToolkitSettings;
use crate::shared::types::UpdateSettingsRequest;

/// Get current toolkit settings
pub async fn get_settings(store: &ToolkitStore) -> CommandResult<ToolkitSettings> {
    Ok(store.settings())
}

/// Apply the fields present in `request` and return the resulting settings
pub async fn update_settings(store: &ToolkitStore, request: UpdateSettingsRequest) -> CommandResult<ToolkitSettings> {
    if let Some(precision) = request.precision {
        store.update_precision(precision);
    }
    if let Some(enabled) = request.grouping_separator_enabled {
        store.set_grouping(enabled);
    }
    Ok(store.settings())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_partial_update() {
        let store = ToolkitStore::in_memory().await;

        let settings = update_settings(
            &store,
            UpdateSettingsRequest {
                precision: Some(12),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(settings.precision, 6);
        assert!(settings.grouping_separator_enabled);

        let request = UpdateSettingsRequest {
            grouping_separator_enabled: Some(false),
            ..Default::default()
        };
        update_settings(&store, request.clone()).await.unwrap();
        let settings = update_settings(&store, request).await.unwrap();
        assert!(!settings.grouping_separator_enabled);
        assert_eq!(get_settings(&store).await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_concurrent_grouping_updates_agree() {
        let store = ToolkitStore::in_memory().await;
        let request = UpdateSettingsRequest {
            grouping_separator_enabled: Some(false),
            ..Default::default()
        };

        let (first, second) = tokio::join!(
            update_settings(&store, request.clone()),
            update_settings(&store, request)
        );
        assert!(!first.unwrap().grouping_separator_enabled);
        assert!(!second.unwrap().grouping_separator_enabled);
        assert!(!store.settings().grouping_separator_enabled);
    }
}
