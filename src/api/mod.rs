// ==========================================
// 店铺排班系统 - API 层
// ==========================================
// 职责: 业务用例入口，供命令行调用
// ==========================================

pub mod availability_api;
pub mod error;
pub mod schedule_api;
pub mod worker_api;

// 重导出核心类型
pub use availability_api::AvailabilityApi;
pub use error::{ApiError, ApiResult};
pub use schedule_api::ScheduleApi;
pub use worker_api::WorkerApi;
