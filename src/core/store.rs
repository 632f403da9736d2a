//! Toolkit state store
//!
//! Owns every mutable collection of the toolkit: settings, favorites, history,
//! counters, custom units and stopwatch logs. Mutations apply synchronously
//! under a mutex and then enqueue a snapshot of the touched collection for the
//! background writer. Reads return clones.

mod writer;

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::catalog::UnitCatalog;
use crate::core::conversion;
use crate::core::storage::{FiniteValues, PersistenceGateway, MAX_HISTORY_SIZE};
use crate::shared::errors::ValidationError;
use crate::shared::settings::{ToolkitSettings, UnitPreference};
use crate::shared::types::{
    ConversionHistoryEntry, ConversionPreset, CounterItem, CustomUnit, MeasurementCategory, StopwatchLog,
    UnitDefinition, UnitIdentity,
};

use writer::{PersistCommand, PersistenceWriter};

/// Point-in-time copy of every collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolkitState {
    pub settings: ToolkitSettings,
    pub favorites: Vec<ConversionPreset>,
    pub history: Vec<ConversionHistoryEntry>,
    pub counters: Vec<CounterItem>,
    pub custom_units: Vec<CustomUnit>,
    pub stopwatch_logs: Vec<StopwatchLog>,
}

pub struct ToolkitStore {
    catalog: UnitCatalog,
    state: Mutex<ToolkitState>,
    writer: PersistenceWriter,
}

impl ToolkitStore {
    /// Load every collection through `gateway` and start the writer task.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn hydrate(gateway: PersistenceGateway) -> Self {
        let (settings, favorites, mut history, counters, custom_units, stopwatch_logs) = tokio::join!(
            gateway.load_settings(),
            gateway.load_favorites(),
            gateway.load_history(),
            gateway.load_counters(),
            gateway.load_custom_units(),
            gateway.load_stopwatch_logs(),
        );
        history.truncate(MAX_HISTORY_SIZE);

        info!(
            favorites = favorites.len(),
            history = history.len(),
            counters = counters.len(),
            custom_units = custom_units.len(),
            stopwatch_logs = stopwatch_logs.len(),
            "toolkit state hydrated"
        );

        Self {
            catalog: UnitCatalog,
            state: Mutex::new(ToolkitState {
                settings,
                favorites,
                history,
                counters,
                custom_units,
                stopwatch_logs,
            }),
            writer: PersistenceWriter::spawn(gateway),
        }
    }

    /// Fresh store over a volatile blob store.
    pub async fn in_memory() -> Self {
        Self::hydrate(PersistenceGateway::in_memory()).await
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    /// Wait until every save enqueued so far has been handed to the gateway.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Persist everything still queued and release the blob store.
    pub async fn close(self) {
        self.writer.shutdown().await;
        debug!("toolkit store closed");
    }

    fn lock(&self) -> MutexGuard<'_, ToolkitState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("toolkit state mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> ToolkitState {
        self.lock().clone()
    }

    pub fn settings(&self) -> ToolkitSettings {
        self.lock().settings.clone()
    }

    pub fn favorites(&self) -> Vec<ConversionPreset> {
        self.lock().favorites.clone()
    }

    pub fn history(&self) -> Vec<ConversionHistoryEntry> {
        self.lock().history.clone()
    }

    pub fn counters(&self) -> Vec<CounterItem> {
        self.lock().counters.clone()
    }

    pub fn custom_units(&self) -> Vec<CustomUnit> {
        self.lock().custom_units.clone()
    }

    pub fn stopwatch_logs(&self) -> Vec<StopwatchLog> {
        self.lock().stopwatch_logs.clone()
    }

    // ------------------------------------------------------------------
    // Catalog and conversion
    // ------------------------------------------------------------------

    /// Built-in and custom units of `category`, base unit first.
    pub fn units_for(&self, category: MeasurementCategory) -> Vec<UnitDefinition> {
        let state = self.lock();
        self.catalog.units_for(category, &state.custom_units)
    }

    pub fn resolve_unit(&self, identity: &UnitIdentity) -> Option<UnitDefinition> {
        let state = self.lock();
        self.catalog.resolve(identity, &state.custom_units)
    }

    /// `NaN` when either identity no longer resolves.
    pub fn convert(&self, value: f64, from: &UnitIdentity, to: &UnitIdentity) -> f64 {
        let state = self.lock();
        match (
            self.catalog.resolve(from, &state.custom_units),
            self.catalog.resolve(to, &state.custom_units),
        ) {
            (Some(from), Some(to)) => conversion::convert(value, &from, &to),
            _ => f64::NAN,
        }
    }

    /// Same as [`convert`](Self::convert) but keyed by catalog ids.
    pub fn convert_by_id(&self, value: f64, from_id: &str, to_id: &str) -> f64 {
        self.convert(value, &UnitIdentity::from_raw(from_id), &UnitIdentity::from_raw(to_id))
    }

    /// The category's configured default pair when both sides still resolve,
    /// otherwise the first two units of the category.
    pub fn default_pair(&self, category: MeasurementCategory) -> (UnitDefinition, UnitDefinition) {
        let state = self.lock();

        if let Some(preference) = state.settings.default_units.get(&category) {
            let from = self.catalog.resolve(&preference.from, &state.custom_units);
            let to = self.catalog.resolve(&preference.to, &state.custom_units);
            if let (Some(from), Some(to)) = (from, to) {
                return (from, to);
            }
            debug!(%category, "default units no longer resolve, using catalog order");
        }

        let units = self.catalog.units_for(category, &state.custom_units);
        let base = self.catalog.base_unit_for(category);
        let from = units.first().cloned().unwrap_or_else(|| base.clone());
        let to = units.get(1).cloned().unwrap_or_else(|| from.clone());
        (from, to)
    }

    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    /// Remove the favorite for this triple if there is one, otherwise add it
    /// at the front. Returns whether the triple is a favorite afterwards.
    pub fn toggle_favorite(
        &self,
        category: MeasurementCategory,
        from: UnitIdentity,
        to: UnitIdentity,
        last_value: Option<f64>,
        title: impl Into<String>,
    ) -> bool {
        let mut state = self.lock();

        let is_favorite = match state
            .favorites
            .iter()
            .position(|preset| preset.matches(category, &from, &to))
        {
            Some(index) => {
                let removed = state.favorites.remove(index);
                debug!(id = %removed.id, "favorite removed");
                false
            }
            None => {
                let preset = ConversionPreset::new(title, category, from, to, last_value);
                debug!(id = %preset.id, "favorite added");
                state.favorites.insert(0, preset);
                true
            }
        };

        self.writer.send(PersistCommand::Favorites(state.favorites.clone()));
        is_favorite
    }

    pub fn is_favorite(
        &self,
        category: MeasurementCategory,
        from: &UnitIdentity,
        to: &UnitIdentity,
    ) -> Option<ConversionPreset> {
        self.lock()
            .favorites
            .iter()
            .find(|preset| preset.matches(category, from, to))
            .cloned()
    }

    pub fn favorite(&self, id: Uuid) -> Option<ConversionPreset> {
        self.lock().favorites.iter().find(|preset| preset.id == id).cloned()
    }

    /// Move the favorites at `from_indexes` so they land before the element
    /// that was at `to_index` in the original order.
    pub fn reorder_favorites(&self, from_indexes: &[usize], to_index: usize) {
        let mut state = self.lock();
        move_offsets(&mut state.favorites, from_indexes, to_index);
        self.writer.send(PersistCommand::Favorites(state.favorites.clone()));
    }

    /// Replace the favorite with the same id. Unknown ids are ignored.
    pub fn update_favorite(&self, preset: ConversionPreset) {
        let mut state = self.lock();
        let Some(slot) = state.favorites.iter_mut().find(|existing| existing.id == preset.id) else {
            debug!(id = %preset.id, "update of unknown favorite ignored");
            return;
        };
        *slot = preset;
        self.writer.send(PersistCommand::Favorites(state.favorites.clone()));
    }

    pub fn remove_favorite(&self, id: Uuid) -> bool {
        let mut state = self.lock();
        let before = state.favorites.len();
        state.favorites.retain(|preset| preset.id != id);
        if state.favorites.len() == before {
            return false;
        }
        self.writer.send(PersistCommand::Favorites(state.favorites.clone()));
        true
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Record a conversion at the front of the history, frozen with the
    /// current precision. Non-finite values are not recorded.
    pub fn add_history_entry(
        &self,
        category: MeasurementCategory,
        from: UnitIdentity,
        to: UnitIdentity,
        input: f64,
        output: f64,
    ) -> Option<ConversionHistoryEntry> {
        if !input.is_finite() || !output.is_finite() {
            warn!(%category, input, output, "refusing to record non-finite conversion");
            return None;
        }

        let mut state = self.lock();
        let precision = state.settings.precision;
        let entry = ConversionHistoryEntry::new(category, from, to, input, output, precision);
        state.history.insert(0, entry.clone());
        state.history.truncate(MAX_HISTORY_SIZE);
        debug!(id = %entry.id, "history entry recorded");

        self.writer.send(PersistCommand::History(state.history.clone()));
        Some(entry)
    }

    pub fn clear_history(&self) {
        let mut state = self.lock();
        state.history.clear();
        self.writer.send(PersistCommand::History(Vec::new()));
    }

    // ------------------------------------------------------------------
    // Counters
    // ------------------------------------------------------------------

    /// Counters carrying a non-finite value, step or bound are refused.
    pub fn add_counter(&self, counter: CounterItem) {
        if !counter.has_finite_values() {
            warn!(id = %counter.id, name = %counter.name, "refusing counter with non-finite values");
            return;
        }
        let mut state = self.lock();
        debug!(id = %counter.id, name = %counter.name, "counter added");
        state.counters.push(counter);
        self.writer.send(PersistCommand::Counters(state.counters.clone()));
    }

    /// Replace the counter with the same id. Unknown ids are ignored.
    pub fn update_counter(&self, counter: CounterItem) {
        self.modify_counter(counter.id, |existing| *existing = counter);
    }

    pub fn remove_counter(&self, id: Uuid) {
        let mut state = self.lock();
        state.counters.retain(|counter| counter.id != id);
        self.writer.send(PersistCommand::Counters(state.counters.clone()));
    }

    pub fn increment_counter(&self, id: Uuid) -> Option<CounterItem> {
        self.modify_counter(id, CounterItem::increment)
    }

    pub fn decrement_counter(&self, id: Uuid) -> Option<CounterItem> {
        self.modify_counter(id, CounterItem::decrement)
    }

    pub fn reset_counter(&self, id: Uuid) -> Option<CounterItem> {
        self.modify_counter(id, CounterItem::reset)
    }

    /// A change that leaves a non-finite number behind is rolled back and the
    /// previous counter returned.
    fn modify_counter(&self, id: Uuid, apply: impl FnOnce(&mut CounterItem)) -> Option<CounterItem> {
        let mut state = self.lock();
        let counter = state.counters.iter_mut().find(|counter| counter.id == id)?;
        let previous = counter.clone();
        apply(counter);
        if !counter.has_finite_values() {
            warn!(%id, value = counter.value, "counter change is not finite, keeping previous value");
            *counter = previous.clone();
            return Some(previous);
        }
        let updated = counter.clone();
        self.writer.send(PersistCommand::Counters(state.counters.clone()));
        Some(updated)
    }

    // ------------------------------------------------------------------
    // Custom units
    // ------------------------------------------------------------------

    pub fn add_custom_unit(&self, unit: CustomUnit) -> Result<(), ValidationError> {
        let mut state = self.lock();
        self.validate_custom_unit(&unit, &state.custom_units, None)?;

        debug!(id = %unit.id, symbol = %unit.symbol, "custom unit added");
        state.custom_units.push(unit);
        self.writer.send(PersistCommand::CustomUnits(state.custom_units.clone()));
        Ok(())
    }

    /// Validate and replace by id. An unknown id is a successful no-op.
    pub fn update_custom_unit(&self, unit: CustomUnit) -> Result<(), ValidationError> {
        let mut state = self.lock();
        self.validate_custom_unit(&unit, &state.custom_units, Some(unit.id))?;

        let Some(slot) = state.custom_units.iter_mut().find(|existing| existing.id == unit.id) else {
            debug!(id = %unit.id, "update of unknown custom unit ignored");
            return Ok(());
        };
        *slot = unit;
        self.writer.send(PersistCommand::CustomUnits(state.custom_units.clone()));
        Ok(())
    }

    /// Favorites, history and default units that still point at the unit are
    /// kept; they resolve to "unavailable" from now on.
    pub fn delete_custom_unit(&self, id: Uuid) {
        let mut state = self.lock();
        state.custom_units.retain(|unit| unit.id != id);
        debug!(%id, "custom unit deleted");
        self.writer.send(PersistCommand::CustomUnits(state.custom_units.clone()));
    }

    fn validate_custom_unit(
        &self,
        unit: &CustomUnit,
        custom_units: &[CustomUnit],
        excluding: Option<Uuid>,
    ) -> Result<(), ValidationError> {
        let multiplier = unit.multiplier_to_base;
        let result = if !(multiplier.is_finite() && multiplier > 0.0) {
            Err(ValidationError::InvalidMultiplier)
        } else if !self.catalog.supports_custom_units(unit.category) {
            Err(ValidationError::UnsupportedCategory)
        } else if self
            .catalog
            .has_symbol_conflict(&unit.symbol, unit.category, custom_units, excluding)
        {
            Err(ValidationError::DuplicateSymbol)
        } else {
            Ok(())
        };

        if let Err(e) = &result {
            warn!(symbol = %unit.symbol, category = %unit.category, error = %e, "custom unit rejected");
        }
        result
    }

    // ------------------------------------------------------------------
    // Stopwatch
    // ------------------------------------------------------------------

    /// Non-finite durations are not recorded.
    pub fn append_stopwatch_log(&self, duration: f64) -> Option<StopwatchLog> {
        if !duration.is_finite() {
            warn!(duration, "refusing non-finite stopwatch duration");
            return None;
        }
        let mut state = self.lock();
        let log = StopwatchLog::new(duration);
        state.stopwatch_logs.insert(0, log.clone());
        self.writer.send(PersistCommand::StopwatchLogs(state.stopwatch_logs.clone()));
        Some(log)
    }

    pub fn clear_stopwatch_logs(&self) {
        let mut state = self.lock();
        state.stopwatch_logs.clear();
        self.writer.send(PersistCommand::StopwatchLogs(Vec::new()));
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Clamped into the supported precision range.
    pub fn update_precision(&self, value: i32) {
        let mut state = self.lock();
        state.settings.precision = ToolkitSettings::clamp_precision(value);
        debug!(precision = state.settings.precision, "precision updated");
        self.writer.send(PersistCommand::Settings(state.settings.clone()));
    }

    pub fn set_default_units(&self, category: MeasurementCategory, from: UnitIdentity, to: UnitIdentity) {
        let mut state = self.lock();
        state
            .settings
            .default_units
            .insert(category, UnitPreference::new(from, to));
        self.writer.send(PersistCommand::Settings(state.settings.clone()));
    }

    /// Set the grouping flag. Nothing is saved when it already has that value.
    pub fn set_grouping(&self, enabled: bool) {
        let mut state = self.lock();
        if state.settings.grouping_separator_enabled == enabled {
            return;
        }
        state.settings.grouping_separator_enabled = enabled;
        self.writer.send(PersistCommand::Settings(state.settings.clone()));
    }

    /// Returns the new grouping flag.
    pub fn toggle_grouping(&self) -> bool {
        let mut state = self.lock();
        state.settings.grouping_separator_enabled = !state.settings.grouping_separator_enabled;
        let enabled = state.settings.grouping_separator_enabled;
        self.writer.send(PersistCommand::Settings(state.settings.clone()));
        enabled
    }
}

/// Move the elements at `sources` so they end up in front of the element
/// originally at `destination`, keeping their relative order. Out of range
/// sources are ignored and the destination is clamped to the length.
fn move_offsets<T>(items: &mut Vec<T>, sources: &[usize], destination: usize) {
    let len = items.len();
    let mut sources: Vec<usize> = sources.iter().copied().filter(|&index| index < len).collect();
    sources.sort_unstable();
    sources.dedup();
    if sources.is_empty() {
        return;
    }

    let destination = destination.min(len);
    let shift = sources.iter().filter(|&&index| index < destination).count();

    let mut moved = Vec::with_capacity(sources.len());
    for &index in sources.iter().rev() {
        moved.push(items.remove(index));
    }
    moved.reverse();

    let insert_at = destination - shift;
    items.splice(insert_at..insert_at, moved);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(id: &str) -> UnitIdentity {
        UnitIdentity::predefined(format!("length.{id}"))
    }

    fn furlong() -> CustomUnit {
        CustomUnit::new(MeasurementCategory::Length, "Furlong", "fur", 201.168)
    }

    #[test]
    fn test_move_offsets_single() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        move_offsets(&mut items, &[0], 2);
        assert_eq!(items, vec!['b', 'a', 'c', 'd']);

        let mut items = vec!['a', 'b', 'c', 'd'];
        move_offsets(&mut items, &[3], 0);
        assert_eq!(items, vec!['d', 'a', 'b', 'c']);

        let mut items = vec!['a', 'b', 'c', 'd'];
        move_offsets(&mut items, &[0], 4);
        assert_eq!(items, vec!['b', 'c', 'd', 'a']);
    }

    #[test]
    fn test_move_offsets_multiple_and_out_of_range() {
        let mut items = vec!['a', 'b', 'c', 'd', 'e'];
        move_offsets(&mut items, &[3, 0, 9], 2);
        assert_eq!(items, vec!['b', 'a', 'd', 'c', 'e']);

        let mut items = vec!['a', 'b', 'c'];
        move_offsets(&mut items, &[1], 99);
        assert_eq!(items, vec!['a', 'c', 'b']);

        let mut items = vec!['a', 'b'];
        move_offsets(&mut items, &[7], 0);
        assert_eq!(items, vec!['a', 'b']);
    }

    #[tokio::test]
    async fn test_toggle_favorite_twice_restores() {
        let store = ToolkitStore::in_memory().await;
        let before = store.favorites();

        assert!(store.toggle_favorite(MeasurementCategory::Length, length("mile"), length("kilometer"), Some(3.0), "mi → km"));
        let preset = store
            .is_favorite(MeasurementCategory::Length, &length("mile"), &length("kilometer"))
            .unwrap();
        assert_eq!(preset.last_input_value, Some(3.0));
        assert_eq!(store.favorite(preset.id), Some(preset));

        assert!(!store.toggle_favorite(MeasurementCategory::Length, length("mile"), length("kilometer"), None, "ignored"));
        assert_eq!(store.favorites(), before);
    }

    #[tokio::test]
    async fn test_new_favorites_go_to_front_and_reorder() {
        let store = ToolkitStore::in_memory().await;
        store.toggle_favorite(MeasurementCategory::Length, length("meter"), length("foot"), None, "first");
        store.toggle_favorite(MeasurementCategory::Length, length("mile"), length("kilometer"), None, "second");
        store.toggle_favorite(MeasurementCategory::Length, length("inch"), length("centimeter"), None, "third");

        let titles = |store: &ToolkitStore| store.favorites().into_iter().map(|p| p.title).collect::<Vec<_>>();
        assert_eq!(titles(&store), vec!["third", "second", "first"]);

        store.reorder_favorites(&[2], 0);
        assert_eq!(titles(&store), vec!["first", "third", "second"]);
    }

    #[tokio::test]
    async fn test_update_and_remove_favorite() {
        let store = ToolkitStore::in_memory().await;
        store.toggle_favorite(MeasurementCategory::Length, length("meter"), length("foot"), None, "m → ft");
        let mut preset = store.favorites().remove(0);

        preset.title = "Meters to feet".into();
        preset.last_input_value = Some(10.0);
        store.update_favorite(preset.clone());
        assert_eq!(store.favorites(), vec![preset.clone()]);

        // Unknown id is ignored
        let mut stranger = preset.clone();
        stranger.id = Uuid::new_v4();
        store.update_favorite(stranger);
        assert_eq!(store.favorites().len(), 1);

        assert!(store.remove_favorite(preset.id));
        assert!(!store.remove_favorite(preset.id));
        assert!(store.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_capped_newest_first() {
        let store = ToolkitStore::in_memory().await;
        for i in 0..25 {
            let input = i as f64;
            store.add_history_entry(MeasurementCategory::Length, length("meter"), length("foot"), input, input / 0.3048);
        }

        let history = store.history();
        assert_eq!(history.len(), 20);
        assert_eq!(history[0].input_value, 24.0);
        assert_eq!(history[19].input_value, 5.0);

        store.clear_history();
        assert!(store.history().is_empty());
    }

    #[tokio::test]
    async fn test_history_freezes_precision_and_skips_non_finite() {
        let store = ToolkitStore::in_memory().await;
        store.update_precision(4);
        let entry = store
            .add_history_entry(MeasurementCategory::Length, length("meter"), length("foot"), 1.0, 3.28084)
            .unwrap();
        assert_eq!(entry.precision, 4);

        store.update_precision(1);
        assert_eq!(store.history()[0].precision, 4);

        assert!(store
            .add_history_entry(MeasurementCategory::Length, length("meter"), length("foot"), 1.0, f64::NAN)
            .is_none());
        assert_eq!(store.history().len(), 1);
    }

    #[tokio::test]
    async fn test_precision_is_clamped() {
        let store = ToolkitStore::in_memory().await;
        store.update_precision(9);
        assert_eq!(store.settings().precision, 6);
        store.update_precision(-3);
        assert_eq!(store.settings().precision, 0);
    }

    #[tokio::test]
    async fn test_toggle_grouping_flips() {
        let store = ToolkitStore::in_memory().await;
        assert!(!store.toggle_grouping());
        assert!(store.toggle_grouping());
        assert!(store.settings().grouping_separator_enabled);
    }

    #[tokio::test]
    async fn test_custom_unit_validation_leaves_state_unchanged() {
        let store = ToolkitStore::in_memory().await;
        store.add_custom_unit(furlong()).unwrap();
        let before = store.snapshot();

        let zero = CustomUnit::new(MeasurementCategory::Length, "Nothing", "nil", 0.0);
        assert_eq!(store.add_custom_unit(zero), Err(ValidationError::InvalidMultiplier));

        let nan = CustomUnit::new(MeasurementCategory::Length, "Broken", "brk", f64::NAN);
        assert_eq!(store.add_custom_unit(nan), Err(ValidationError::InvalidMultiplier));

        let built_in_clash = CustomUnit::new(MeasurementCategory::Length, "Kilo", " KM ", 1000.0);
        assert_eq!(store.add_custom_unit(built_in_clash), Err(ValidationError::DuplicateSymbol));

        let custom_clash = CustomUnit::new(MeasurementCategory::Length, "Other furlong", "FUR", 201.0);
        assert_eq!(store.add_custom_unit(custom_clash), Err(ValidationError::DuplicateSymbol));

        let temperature = CustomUnit::new(MeasurementCategory::Temperature, "Rankine", "°R", 5.0 / 9.0);
        assert_eq!(store.add_custom_unit(temperature), Err(ValidationError::UnsupportedCategory));

        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_update_custom_unit() {
        let store = ToolkitStore::in_memory().await;
        let mut unit = furlong();
        store.add_custom_unit(unit.clone()).unwrap();

        // Keeping its own symbol is not a conflict
        unit.name = "Furlong (survey)".into();
        unit.multiplier_to_base = 201.1684;
        store.update_custom_unit(unit.clone()).unwrap();
        assert_eq!(store.custom_units(), vec![unit.clone()]);

        let mut invalid = unit.clone();
        invalid.multiplier_to_base = -1.0;
        assert_eq!(store.update_custom_unit(invalid), Err(ValidationError::InvalidMultiplier));
        assert_eq!(store.custom_units(), vec![unit]);

        // Unknown id is a successful no-op
        let ghost = CustomUnit::new(MeasurementCategory::Mass, "Stone-ish", "sti", 6.3);
        assert_eq!(store.update_custom_unit(ghost), Ok(()));
        assert_eq!(store.custom_units().len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_custom_unit_dangles_in_favorites() {
        let store = ToolkitStore::in_memory().await;
        let unit = furlong();
        store.add_custom_unit(unit.clone()).unwrap();

        assert!(store
            .units_for(MeasurementCategory::Length)
            .iter()
            .any(|definition| definition.id == unit.catalog_id()));
        assert!((store.convert(1.0, &unit.identity(), &length("meter")) - 201.168).abs() < 1e-9);

        store.toggle_favorite(MeasurementCategory::Length, unit.identity(), length("meter"), None, "fur → m");
        store.delete_custom_unit(unit.id);

        assert_eq!(store.resolve_unit(&unit.identity()), None);
        assert_eq!(store.favorites().len(), 1);
        assert!(store.convert(1.0, &unit.identity(), &length("meter")).is_nan());
    }

    #[tokio::test]
    async fn test_convert_by_id() {
        let store = ToolkitStore::in_memory().await;
        assert_eq!(store.convert_by_id(1.0, "length.mile", "length.meter"), 1609.344);
        assert!(store.convert_by_id(1.0, "length.mile", "length.parsec-ish").is_nan());
        assert!(store.convert_by_id(1.0, "length.mile", "mass.kilogram").is_nan());
    }

    #[tokio::test]
    async fn test_default_pair_prefers_configured_units() {
        let store = ToolkitStore::in_memory().await;

        let (from, to) = store.default_pair(MeasurementCategory::Length);
        assert!(from.is_system_unit);
        assert_ne!(from.id, to.id);

        store.set_default_units(MeasurementCategory::Length, length("mile"), length("kilometer"));
        let (from, to) = store.default_pair(MeasurementCategory::Length);
        assert_eq!(from.id, "length.mile");
        assert_eq!(to.id, "length.kilometer");

        // A dangling preference falls back to catalog order
        store.set_default_units(MeasurementCategory::Length, UnitIdentity::Custom(Uuid::new_v4()), length("foot"));
        let (from, _) = store.default_pair(MeasurementCategory::Length);
        assert!(from.is_system_unit);
    }

    #[tokio::test]
    async fn test_counters_through_store() {
        let store = ToolkitStore::in_memory().await;
        let counter = CounterItem::new("Laps").with_step(2.0).with_bounds(Some(0.0), Some(3.0));
        let id = counter.id;
        store.add_counter(counter);

        assert_eq!(store.increment_counter(id).unwrap().value, 2.0);
        assert_eq!(store.increment_counter(id).unwrap().value, 3.0);
        assert_eq!(store.decrement_counter(id).unwrap().value, 1.0);
        assert_eq!(store.decrement_counter(id).unwrap().value, 0.0);
        assert_eq!(store.increment_counter(id).unwrap().value, 2.0);
        assert_eq!(store.reset_counter(id).unwrap().value, 0.0);
        assert!(store.increment_counter(Uuid::new_v4()).is_none());

        let mut renamed = store.counters().remove(0);
        renamed.name = "Pool laps".into();
        store.update_counter(renamed.clone());
        assert_eq!(store.counters(), vec![renamed]);

        store.remove_counter(id);
        assert!(store.counters().is_empty());
    }

    #[tokio::test]
    async fn test_stopwatch_logs_newest_first() {
        let store = ToolkitStore::in_memory().await;
        store.append_stopwatch_log(1.5);
        let latest = store.append_stopwatch_log(12.25).unwrap();
        assert_eq!(store.stopwatch_logs()[0], latest);
        assert_eq!(store.stopwatch_logs().len(), 2);

        store.clear_stopwatch_logs();
        assert!(store.stopwatch_logs().is_empty());
    }

    #[tokio::test]
    async fn test_counter_overflow_keeps_previous_value_across_reload() {
        let gateway = PersistenceGateway::in_memory();
        let store = ToolkitStore::hydrate(gateway.clone()).await;
        let keep = CounterItem::new("Keep me");
        let overflow = CounterItem::new("Overflow").with_step(f64::MAX);
        let id = overflow.id;
        store.add_counter(keep.clone());
        store.add_counter(overflow);

        assert_eq!(store.increment_counter(id).unwrap().value, f64::MAX);
        assert_eq!(store.increment_counter(id).unwrap().value, f64::MAX);
        store.add_counter(CounterItem::new("Broken").with_step(f64::NAN));
        assert_eq!(store.counters().len(), 2);
        store.flush().await;
        store.close().await;

        let reloaded = ToolkitStore::hydrate(gateway).await;
        let counters = reloaded.counters();
        assert_eq!(counters.len(), 2);
        assert_eq!(counters[0], keep);
        assert_eq!(counters[1].value, f64::MAX);
    }

    #[tokio::test]
    async fn test_non_finite_stopwatch_duration_is_refused() {
        let gateway = PersistenceGateway::in_memory();
        let store = ToolkitStore::hydrate(gateway.clone()).await;
        store.append_stopwatch_log(12.0);
        assert!(store.append_stopwatch_log(f64::NAN).is_none());
        assert!(store.append_stopwatch_log(f64::INFINITY).is_none());
        store.flush().await;
        store.close().await;

        let logs = ToolkitStore::hydrate(gateway).await.stopwatch_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].duration, 12.0);
    }

    #[tokio::test]
    async fn test_set_grouping_is_idempotent() {
        let store = ToolkitStore::in_memory().await;
        store.set_grouping(false);
        store.set_grouping(false);
        assert!(!store.settings().grouping_separator_enabled);
        store.set_grouping(true);
        assert!(store.settings().grouping_separator_enabled);
    }

    #[tokio::test]
    async fn test_state_survives_reload() {
        let gateway = PersistenceGateway::in_memory();
        let store = ToolkitStore::hydrate(gateway.clone()).await;

        store.update_precision(5);
        store.set_default_units(
            MeasurementCategory::Speed,
            UnitIdentity::predefined("speed.kilometerPerHour"),
            UnitIdentity::predefined("speed.milePerHour"),
        );
        store.toggle_favorite(MeasurementCategory::Length, length("mile"), length("kilometer"), Some(3.0), "mi → km");
        store.add_history_entry(MeasurementCategory::Length, length("mile"), length("kilometer"), 3.0, 4.828032);
        store.add_counter(CounterItem::new("Cups"));
        store.add_custom_unit(furlong()).unwrap();
        store.append_stopwatch_log(42.0);
        store.flush().await;

        let expected = store.snapshot();
        store.close().await;

        let reloaded = ToolkitStore::hydrate(gateway).await;
        assert_eq!(reloaded.snapshot(), expected);
    }
}
