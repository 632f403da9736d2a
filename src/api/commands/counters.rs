use uuid::Uuid;

use crate::core::format::format_with_settings;
use crate::core::ToolkitStore;
use crate::shared::errors::{CommandError, CommandResult};
use crate::shared::types::{CounterItem, CounterSummary};

/// Number of counters offered without a search
const SUGGESTED_COUNTER_LIMIT: usize = 10;

pub async fn suggested_counters(store: &ToolkitStore) -> CommandResult<Vec<CounterSummary>> {
    Ok(store
        .counters()
        .iter()
        .take(SUGGESTED_COUNTER_LIMIT)
        .map(|counter| summarize(store, counter))
        .collect())
}

pub async fn counters_by_id(store: &ToolkitStore, ids: &[Uuid]) -> CommandResult<Vec<CounterSummary>> {
    Ok(store
        .counters()
        .iter()
        .filter(|counter| ids.contains(&counter.id))
        .map(|counter| summarize(store, counter))
        .collect())
}

/// Step the counter up, snapping to its upper bound.
pub async fn increment_counter(store: &ToolkitStore, id: Uuid) -> CommandResult<CounterSummary> {
    let counter = store.increment_counter(id).ok_or_else(not_found)?;
    Ok(summarize(store, &counter))
}

/// Step the counter down, snapping to its lower bound.
pub async fn decrement_counter(store: &ToolkitStore, id: Uuid) -> CommandResult<CounterSummary> {
    let counter = store.decrement_counter(id).ok_or_else(not_found)?;
    Ok(summarize(store, &counter))
}

pub async fn reset_counter(store: &ToolkitStore, id: Uuid) -> CommandResult<CounterSummary> {
    let counter = store.reset_counter(id).ok_or_else(not_found)?;
    Ok(summarize(store, &counter))
}

fn not_found() -> CommandError {
    CommandError::NotFound("Counter not found".to_string())
}

fn summarize(store: &ToolkitStore, counter: &CounterItem) -> CounterSummary {
    CounterSummary {
        id: counter.id,
        name: counter.name.clone(),
        value: counter.value,
        formatted_value: format_with_settings(counter.value, &store.settings()),
    }
}
