//! # System Constants
//!
//! Names shared between the scheduling side and whichever process handles a group's
//! continuation.

/// Handler name stored in every step-group continuation record
pub const STEP_CONTINUATION_HANDLER: &str = "orchestration.step_completed";

/// Environment variable prefix for configuration overrides (`TASKER_SEQUENCER__WORKER__CONCURRENCY`)
pub const CONFIG_ENV_PREFIX: &str = "TASKER_SEQUENCER";

/// Separator between nested configuration keys in environment overrides
pub const CONFIG_ENV_SEPARATOR: &str = "__";

pub mod defaults {
    pub const ENVIRONMENT: &str = "development";
    pub const LOG_LEVEL: &str = "info";
    pub const DESCRIPTION_PREFIX: &str = "orchestrated";
    pub const WORKER_CONCURRENCY: usize = 10;
}

/// Operation names used in structured logs
pub mod operations {
    pub const PERFORM: &str = "perform";
    pub const EXECUTE: &str = "execute";
    pub const SCHEDULE_STEP: &str = "schedule_step";
    pub const ADVANCE: &str = "advance";
    pub const FINISH: &str = "finish";
}
