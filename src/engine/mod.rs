// ==========================================
// 店铺排班系统 - 引擎层
// ==========================================
// 职责: 单日排班建模与求解，不拼 SQL
// 红线: 引擎不访问数据库；无解必须带原因上报
// ==========================================

pub mod constraints;
pub mod error;
pub mod model;
pub mod objective;
pub mod orchestrator;
pub mod policy;
pub mod problem;
pub mod reducer;
pub mod solver;

// 重导出核心类型
pub use constraints::ConstraintCompiler;
pub use error::{EngineError, EngineResult};
pub use model::{AssignmentMatrix, CompiledModel, ModelConstraint, VarId, VariableModel};
pub use objective::{Objective, Sense};
pub use orchestrator::{diagnose_shortage, DailySchedule, ShiftScheduler};
pub use policy::{SchedulingPolicy, SolverLimits};
pub use problem::ScheduleProblem;
pub use reducer::{BlockReducer, ReducedSchedule};
pub use solver::{CancelToken, SolvedAssignment, SolverDriver, SolverStatistics};
