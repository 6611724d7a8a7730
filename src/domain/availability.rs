// ==========================================
// 店铺排班系统 - 出勤希望领域模型
// ==========================================
// 对齐: availability_request 表 (UNIQUE(worker_id, plan_date))
// 红线: 每名员工每天至多一条希望，录入时保证，求解时不做"取第一条"
// ==========================================

use crate::domain::types::{Hour, OperatingHours, WorkerId, DAY_END_HOUR};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// AvailabilityEntry - 出勤希望
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityEntry {
    pub worker_id: WorkerId,     // 员工ID
    pub plan_date: NaiveDate,    // 目标日期
    pub start_hour: Hour,        // 希望开始（含）
    pub end_hour: Option<Hour>,  // 希望结束（不含），None 表示"到闭店"
    pub available: bool,         // 是否可出勤
}

/// 出勤窗口格式错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowViolation {
    /// 开始时间超出一天范围
    StartOutOfDay(Hour),
    /// 结束时间超出一天范围
    EndOutOfDay(Hour),
    /// 开始时间不早于结束时间
    StartNotBeforeEnd { start: Hour, end: Hour },
}

impl fmt::Display for WindowViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowViolation::StartOutOfDay(h) => write!(f, "开始时间超出范围: {}", h),
            WindowViolation::EndOutOfDay(h) => write!(f, "结束时间超出范围: {}", h),
            WindowViolation::StartNotBeforeEnd { start, end } => {
                write!(f, "开始时间必须早于结束时间: start={} end={}", start, end)
            }
        }
    }
}

impl AvailabilityEntry {
    /// 可出勤希望
    pub fn available(
        worker_id: WorkerId,
        plan_date: NaiveDate,
        start_hour: Hour,
        end_hour: Option<Hour>,
    ) -> Self {
        Self {
            worker_id,
            plan_date,
            start_hour,
            end_hour,
            available: true,
        }
    }

    /// 不可出勤（休息）申请
    pub fn unavailable(worker_id: WorkerId, plan_date: NaiveDate) -> Self {
        Self {
            worker_id,
            plan_date,
            start_hour: 0,
            end_hour: None,
            available: false,
        }
    }

    /// 校验窗口格式
    ///
    /// # 返回
    /// - Ok(()): 格式正确
    /// - Err(WindowViolation): 具体违反项
    pub fn validate(&self) -> Result<(), WindowViolation> {
        if self.start_hour > DAY_END_HOUR {
            return Err(WindowViolation::StartOutOfDay(self.start_hour));
        }
        if let Some(end) = self.end_hour {
            if end > DAY_END_HOUR {
                return Err(WindowViolation::EndOutOfDay(end));
            }
            if self.start_hour >= end {
                return Err(WindowViolation::StartNotBeforeEnd {
                    start: self.start_hour,
                    end,
                });
            }
        }
        Ok(())
    }

    /// 在营业时段内的有效窗口
    ///
    /// # 返回
    /// - Some(OperatingHours): 与营业时段相交的 [start, effective_end)
    /// - None: 不可出勤，或窗口与营业时段无交集
    ///
    /// # 说明
    /// end_hour 为空时视为"到闭店"，即 effective_end = hours.close
    pub fn effective_window(&self, hours: &OperatingHours) -> Option<OperatingHours> {
        if !self.available {
            return None;
        }
        let end = self.end_hour.unwrap_or(hours.close);
        let window = OperatingHours::new(self.start_hour.max(hours.open), end.min(hours.close));
        if window.is_empty() {
            None
        } else {
            Some(window)
        }
    }
}
