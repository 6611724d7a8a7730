// ==========================================
// 店铺排班系统 - 求解记录
// ==========================================
// 对齐: schedule_run 表
// 用途: 每次求解（含无解/超时）都留一条记录，供店长复盘
// ==========================================

use crate::domain::types::ScheduleRunStatus;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRun {
    pub run_id: String, // UUID
    pub plan_date: NaiveDate,
    pub status: ScheduleRunStatus,
    pub objective: Option<u32>,  // 总排班工时（仅成功时有值）
    pub optimal: bool,
    pub gap_count: u32,          // 断档小时数
    pub elapsed_ms: u64,
    pub message: Option<String>, // 失败原因
    pub stats_json: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
}

impl ScheduleRun {
    /// 新建一条求解记录（run_id 自动生成）
    pub fn new(plan_date: NaiveDate, status: ScheduleRunStatus) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            plan_date,
            status,
            objective: None,
            optimal: false,
            gap_count: 0,
            elapsed_ms: 0,
            message: None,
            stats_json: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn with_objective(mut self, objective: u32, optimal: bool) -> Self {
        self.objective = Some(objective);
        self.optimal = optimal;
        self
    }

    pub fn with_gap_count(mut self, gap_count: u32) -> Self {
        self.gap_count = gap_count;
        self
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// 附加搜索统计（转换为JSON）
    pub fn with_stats<T: Serialize>(mut self, stats: &T) -> Self {
        self.stats_json = serde_json::to_value(stats).ok();
        self
    }
}
