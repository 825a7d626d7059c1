//! The agent runtime: configuration, cache lifecycle, and the
//! [`ServiceAgent`](worker::ServiceAgent) event surface.

pub mod config;
pub mod lifecycle;
pub mod worker;

pub use config::{AgentConfig, NotifyConfig, ScheduleConfig};
pub use lifecycle::{ActivateReport, InstallReport, LifecycleManager};
pub use worker::{AgentPhase, ServiceAgent};
