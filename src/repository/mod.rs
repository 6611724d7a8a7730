// ==========================================
// 店铺排班系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化
// ==========================================

pub mod availability_repo;
pub mod demand_repo;
pub mod error;
pub mod schedule_run_repo;
pub mod shift_block_repo;
pub mod worker_repo;

pub use availability_repo::AvailabilityRepository;
pub use demand_repo::DemandRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use schedule_run_repo::ScheduleRunRepository;
pub use shift_block_repo::ShiftBlockRepository;
pub use worker_repo::WorkerRepository;
