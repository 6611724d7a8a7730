// ==========================================
// 店铺排班系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod availability;
pub mod demand;
pub mod schedule_run;
pub mod shift;
pub mod types;
pub mod worker;

// 重导出核心类型
pub use availability::{AvailabilityEntry, WindowViolation};
pub use demand::DemandProfile;
pub use schedule_run::ScheduleRun;
pub use shift::{ShiftBlock, ShiftGap};
pub use types::{GapPolicy, Hour, OperatingHours, ScheduleRunStatus, WorkerId};
pub use worker::Worker;
