// ==========================================
// 店铺排班系统 - 核心库
// ==========================================
// 职责: 员工出勤希望 + 每小时需求 → 单日最优班段
// 技术栈: Rust + SQLite + 分支定界求解
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 建模、求解、归约
pub mod engine;

// 配置层 - 排班策略
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{GapPolicy, Hour, OperatingHours, ScheduleRunStatus, WorkerId};

// 领域实体
pub use domain::{AvailabilityEntry, DemandProfile, ScheduleRun, ShiftBlock, ShiftGap, Worker};

// 引擎
pub use engine::{
    DailySchedule, EngineError, ScheduleProblem, SchedulingPolicy, ShiftScheduler, SolverLimits,
};

// API
pub use api::{ApiError, AvailabilityApi, ScheduleApi, WorkerApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "店铺排班系统";
