// ==========================================
// 店铺排班系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 无解/预算耗尽是常规结果，必须以独立类型上报，不得吞掉
// ==========================================

use crate::domain::types::{Hour, WorkerId};
use chrono::NaiveDate;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // ===== 输入错误（建模前拒绝） =====
    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ===== 求解结果 =====
    #[error("无可行解: date={plan_date}, {reason}")]
    Infeasible { plan_date: NaiveDate, reason: String },

    #[error("求解预算耗尽且未找到可行解: date={plan_date}, {reason}")]
    ResourceExhausted { plan_date: NaiveDate, reason: String },

    #[error("求解已被调用方取消: date={plan_date}")]
    Cancelled { plan_date: NaiveDate },

    // ===== 结果还原 =====
    #[error("排班小时不连续: worker_id={worker_id}, gap_hours={gap_hours:?}")]
    NonContiguousAssignment {
        worker_id: WorkerId,
        gap_hours: Vec<Hour>,
    },
}

impl EngineError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        EngineError::InvalidInput(message.into())
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
