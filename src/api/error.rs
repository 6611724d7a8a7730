// ==========================================
// 店铺排班系统 - API层错误类型
// ==========================================
// 职责: 汇总引擎/仓储/配置错误，转换为用户可读的错误消息
// 红线: 无解、预算耗尽、取消都有独立变体，调用方可以区分
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 写入违反数据库约束（重复、引用不存在的员工、取值越界）
    #[error("数据约束违反: {0}")]
    ConstraintViolation(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 求解错误
    // ==========================================
    #[error("无可行解: date={plan_date}, {reason}")]
    Infeasible { plan_date: NaiveDate, reason: String },

    #[error("求解预算耗尽: date={plan_date}, {reason}")]
    ResourceExhausted { plan_date: NaiveDate, reason: String },

    #[error("求解已取消: date={0}")]
    Cancelled(NaiveDate),

    #[error("求解超时: date={plan_date}, timeout_ms={timeout_ms}")]
    Timeout { plan_date: NaiveDate, timeout_ms: u64 },

    #[error("排班小时不连续: worker_id={worker_id}, gap_hours={gap_hours:?}")]
    NonContiguousAssignment { worker_id: i64, gap_hours: Vec<u8> },

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("该日期正在排班中，请稍后重试: date={0}")]
    ScheduleInProgress(NaiveDate),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            RepositoryError::LockError(_) | RepositoryError::DatabaseQueryError(_) => {
                ApiError::DatabaseError(err.to_string())
            }
            RepositoryError::UniqueConstraintViolation(_)
            | RepositoryError::ForeignKeyViolation(_)
            | RepositoryError::CheckConstraintViolation(_) => {
                ApiError::ConstraintViolation(err.to_string())
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            EngineError::Infeasible { plan_date, reason } => {
                ApiError::Infeasible { plan_date, reason }
            }
            EngineError::ResourceExhausted { plan_date, reason } => {
                ApiError::ResourceExhausted { plan_date, reason }
            }
            EngineError::Cancelled { plan_date } => ApiError::Cancelled(plan_date),
            EngineError::NonContiguousAssignment {
                worker_id,
                gap_hours,
            } => ApiError::NonContiguousAssignment {
                worker_id,
                gap_hours,
            },
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
