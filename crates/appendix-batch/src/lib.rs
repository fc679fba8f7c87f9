pub mod assemble;
mod bundle;
pub mod compose;
pub mod constants;
pub mod group;
mod host;
pub mod layout;
mod manifest;
pub mod name_key;
mod options;
pub mod plan;
pub mod render;
mod session;
mod types;

pub use assemble::{
    BatchAssembler, OutputArtifact, RunEvent, RunFailure, RunReport, save_bundle, save_outputs,
};
pub use bundle::bundle_entries;
pub use group::{AppendixGroup, InputFile, QueuedItem, sort_into_groups};
pub use host::ExecutionHost;
pub use manifest::{MANIFEST_COLUMNS, Manifest, ManifestRow};
pub use name_key::{OrderingKey, parse_name};
pub use options::*;
pub use plan::{BatchPlan, BatchSpec, plan_batches};
pub use session::{RunRecord, Session, SessionQueue};
pub use types::*;
