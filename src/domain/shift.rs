// ==========================================
// 店铺排班系统 - 确定班段领域模型
// ==========================================
// 对齐: shift_block 表
// 红线: start_hour < end_hour; end_hour = 最后一个排班小时 + 1
// ==========================================

use crate::domain::types::{Hour, WorkerId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ShiftBlock - 连续班段
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftBlock {
    pub worker_id: WorkerId,  // 员工ID
    pub plan_date: NaiveDate, // 日期
    pub start_hour: Hour,     // 开始（含）
    pub end_hour: Hour,       // 结束（不含）
}

impl ShiftBlock {
    pub fn new(worker_id: WorkerId, plan_date: NaiveDate, start_hour: Hour, end_hour: Hour) -> Self {
        Self {
            worker_id,
            plan_date,
            start_hour,
            end_hour,
        }
    }

    /// 班段时长（小时）
    pub fn duration_hours(&self) -> u32 {
        self.end_hour.saturating_sub(self.start_hour) as u32
    }

    /// 是否覆盖指定小时
    pub fn covers(&self, hour: Hour) -> bool {
        self.start_hour <= hour && hour < self.end_hour
    }
}

// ==========================================
// ShiftGap - 班段内的断档小时
// ==========================================
// 用途: 求解结果不连续时，显式记录被合并进班段但实际未排班的小时
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftGap {
    pub worker_id: WorkerId,
    pub hour: Hour,
}
