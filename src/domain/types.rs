// ==========================================
// 店铺排班系统 - 领域类型定义
// ==========================================
// 职责: 营业时段、断档策略、排班运行状态等基础类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 员工ID（与 worker 表主键一致）
pub type WorkerId = i64;

/// 小时刻度（0..=24，整点）
pub type Hour = u8;

/// 一天的最大小时刻度
pub const DAY_END_HOUR: Hour = 24;

// ==========================================
// 营业时段 (Operating Hours)
// ==========================================
// 半开区间 [open, close)，整点粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatingHours {
    pub open: Hour,  // 开店时间（含）
    pub close: Hour, // 闭店时间（不含）
}

impl OperatingHours {
    pub fn new(open: Hour, close: Hour) -> Self {
        Self { open, close }
    }

    /// 时段是否为空（open >= close）
    pub fn is_empty(&self) -> bool {
        self.open >= self.close
    }

    /// 时段内的小时数
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.close - self.open) as usize
        }
    }

    pub fn contains(&self, hour: Hour) -> bool {
        self.open <= hour && hour < self.close
    }

    /// 按升序遍历营业小时
    pub fn iter(&self) -> impl Iterator<Item = Hour> {
        self.open..self.close.max(self.open)
    }

    /// 小时在时段内的偏移量
    pub fn offset_of(&self, hour: Hour) -> Option<usize> {
        if self.contains(hour) {
            Some((hour - self.open) as usize)
        } else {
            None
        }
    }
}

impl Default for OperatingHours {
    /// 默认营业时段 9:00-23:00
    fn default() -> Self {
        Self { open: 9, close: 23 }
    }
}

impl fmt::Display for OperatingHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:00, {}:00)", self.open, self.close)
    }
}

// ==========================================
// 断档策略 (Gap Policy)
// ==========================================
// 用途: 求解结果中同一员工出现不连续工时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapPolicy {
    /// 合并为 [min, max+1) 班段，并显式记录断档小时
    #[default]
    Flag,
    /// 直接拒绝整个结果
    Reject,
}

impl GapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapPolicy::Flag => "FLAG",
            GapPolicy::Reject => "REJECT",
        }
    }

    /// 从配置字符串解析（大小写不敏感）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "FLAG" => Some(GapPolicy::Flag),
            "REJECT" => Some(GapPolicy::Reject),
            _ => None,
        }
    }
}

impl fmt::Display for GapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 排班运行状态 (Schedule Run Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleRunStatus {
    Solved,     // 求解成功并已落库
    Infeasible, // 无可行解
    Exhausted,  // 预算耗尽且无可行解
    Invalid,    // 输入非法
    Cancelled,  // 调用方放弃
    Failed,     // 其他失败（输入加载失败、结果被断档策略拒绝）
}

impl ScheduleRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleRunStatus::Solved => "SOLVED",
            ScheduleRunStatus::Infeasible => "INFEASIBLE",
            ScheduleRunStatus::Exhausted => "EXHAUSTED",
            ScheduleRunStatus::Invalid => "INVALID",
            ScheduleRunStatus::Cancelled => "CANCELLED",
            ScheduleRunStatus::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SOLVED" => Some(ScheduleRunStatus::Solved),
            "INFEASIBLE" => Some(ScheduleRunStatus::Infeasible),
            "EXHAUSTED" => Some(ScheduleRunStatus::Exhausted),
            "INVALID" => Some(ScheduleRunStatus::Invalid),
            "CANCELLED" => Some(ScheduleRunStatus::Cancelled),
            "FAILED" => Some(ScheduleRunStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for ScheduleRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operating_hours_basic() {
        let hours = OperatingHours::default();
        assert_eq!(hours.len(), 14);
        assert!(hours.contains(9));
        assert!(hours.contains(22));
        assert!(!hours.contains(23));
        assert_eq!(hours.offset_of(12), Some(3));
        assert_eq!(hours.iter().count(), 14);
    }

    #[test]
    fn test_operating_hours_empty() {
        let hours = OperatingHours::new(12, 12);
        assert!(hours.is_empty());
        assert_eq!(hours.len(), 0);
        assert_eq!(hours.iter().count(), 0);

        let inverted = OperatingHours::new(20, 10);
        assert!(inverted.is_empty());
        assert_eq!(inverted.iter().count(), 0);
    }

    #[test]
    fn test_gap_policy_parse() {
        assert_eq!(GapPolicy::parse("flag"), Some(GapPolicy::Flag));
        assert_eq!(GapPolicy::parse(" REJECT "), Some(GapPolicy::Reject));
        assert_eq!(GapPolicy::parse("split"), None);
        assert_eq!(GapPolicy::default(), GapPolicy::Flag);
    }
}
