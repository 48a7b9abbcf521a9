//! Pipeline components: tree scan (walk + metadata workers) and the sync pipeline
//! (planners, work queue, workers, error collection).

pub mod context;
pub mod error_handler;
pub mod metadata;
pub mod orchestrator;
pub mod planner;
pub mod scan;
pub mod strategy;
pub mod walk;

pub use context::{
    RunChannels, ScanChannels, ScanContext, create_run_channels, create_scan_channels,
};
pub use error_handler::combine_errors;
pub use metadata::spawn_metadata_workers;
pub use orchestrator::{RunOutcome, SyncRun, run_plan};
pub use planner::{PlanGroup, plan_all};
pub use scan::scan_tree;
pub use strategy::{ApplyOpts, Strategy};
pub use walk::{WalkOutcome, run_walk_loop, spawn_walk_thread, to_outcome_walkdir};
