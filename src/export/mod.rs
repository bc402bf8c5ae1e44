//! Resource to Terraform translation engine
//!
//! Records described by a provider client are turned into two artifacts:
//! Terraform configuration (rendered from the raw records by a template) and
//! legacy Terraform state (records projected into flat attribute sets and
//! folded into a state document).

pub mod attributes;
pub mod batch;
pub mod classifier;
pub mod error;
pub mod exporter;
pub mod identifier;
pub mod kind;
pub mod projector;
pub mod state;

pub use exporter::{KindExporter, RenderedTemplate, exporter_for};
pub use kind::ResourceKind;
pub use state::{StateAssembler, StateDocument, StateEntry};
