//! Command surface for a UI shell or automation
//!
//! Thin async functions over a [`ToolkitStore`](crate::core::ToolkitStore):
//! they validate request DTOs, call into the store and shape responses. Every
//! command returns a [`CommandResult`](crate::shared::CommandResult) so the
//! shell gets a serializable error.
//!
//! - `converter`: unit conversion and unit listing
//! - `custom_units`: create, edit and delete custom units
//! - `presets`: favorites as quick conversion presets
//! - `counters`: counter queries and step commands
//! - `settings`: settings access

pub mod converter;
pub mod counters;
pub mod custom_units;
pub mod presets;
pub mod settings;
