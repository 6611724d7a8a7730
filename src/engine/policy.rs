// ==========================================
// 店铺排班系统 - 排班策略参数
// ==========================================
// 职责: 引擎所需的全部策略常量（营业时段、日工时上限、求解预算等）
// 来源: ConfigManager::load_policy() 或 SchedulingPolicy::default()
// ==========================================

use crate::domain::types::{GapPolicy, OperatingHours};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 默认日工时上限（小时）
pub const DEFAULT_DAILY_MAX_HOURS: u32 = 8;

/// 默认求解时间预算（毫秒）
pub const DEFAULT_TIME_LIMIT_MS: u64 = 10_000;

// ==========================================
// SolverLimits - 求解预算
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverLimits {
    /// 墙钟时间上限（None 表示不限）
    pub time_limit: Option<Duration>,
    /// 搜索节点上限（None 表示不限）
    pub node_limit: Option<u64>,
}

impl SolverLimits {
    pub fn unlimited() -> Self {
        Self {
            time_limit: None,
            node_limit: None,
        }
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            time_limit: Some(Duration::from_millis(DEFAULT_TIME_LIMIT_MS)),
            node_limit: None,
        }
    }
}

// ==========================================
// SchedulingPolicy - 排班策略
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingPolicy {
    pub operating_hours: OperatingHours, // 营业时段 [open, close)
    pub daily_max_hours: u32,            // 每人每日工时上限
    pub contiguous_shifts: bool,         // 是否强制每人工时连续
    pub gap_policy: GapPolicy,           // 不连续结果的处理方式
    pub limits: SolverLimits,            // 求解预算
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            operating_hours: OperatingHours::default(),
            daily_max_hours: DEFAULT_DAILY_MAX_HOURS,
            contiguous_shifts: false,
            gap_policy: GapPolicy::default(),
            limits: SolverLimits::default(),
        }
    }
}
