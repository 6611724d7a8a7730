// ==========================================
// 店铺排班系统 - 员工领域模型
// ==========================================
// 对齐: worker 表
// 说明: 引擎只读，由外部管理端创建/编辑
// ==========================================

use crate::domain::types::WorkerId;
use serde::{Deserialize, Serialize};

/// 默认周工时上限（预留字段，当前约束集未使用）
pub const DEFAULT_MAX_HOURS_PER_WEEK: u32 = 28;

// ==========================================
// Worker - 员工
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub worker_id: WorkerId, // 员工ID
    pub name: String,        // 姓名

    // ===== 预留约束标志（可表达，暂不参与求解） =====
    pub must_staff: bool,         // 骨干标志：某些时段至少需要一名
    pub max_hours_per_week: u32,  // 周工时上限

    // ===== 状态 =====
    pub active: bool, // 是否参与排班
}

impl Worker {
    /// 以默认标志创建一名在职员工
    pub fn new(worker_id: WorkerId, name: impl Into<String>) -> Self {
        Self {
            worker_id,
            name: name.into(),
            must_staff: false,
            max_hours_per_week: DEFAULT_MAX_HOURS_PER_WEEK,
            active: true,
        }
    }

    pub fn with_must_staff(mut self, must_staff: bool) -> Self {
        self.must_staff = must_staff;
        self
    }

    pub fn with_max_hours_per_week(mut self, hours: u32) -> Self {
        self.max_hours_per_week = hours;
        self
    }
}
