// ==========================================
// 店铺排班系统 - 排班问题描述
// ==========================================
// 职责: 单日排班的不可变输入（员工、出勤希望、需求人数、策略）
// 红线: 任何输入错误在建模之前拒绝，不允许半建模
// ==========================================

use crate::domain::availability::AvailabilityEntry;
use crate::domain::demand::DemandProfile;
use crate::domain::types::{Hour, OperatingHours, WorkerId, DAY_END_HOUR};
use crate::domain::worker::Worker;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::policy::SchedulingPolicy;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

// ==========================================
// ScheduleProblem - 单日排班问题
// ==========================================
// 输入只借用不持有；构造成功即保证满足全部输入不变量
#[derive(Debug, Clone)]
pub struct ScheduleProblem<'a> {
    plan_date: NaiveDate,
    workers: &'a [Worker],
    demand: &'a DemandProfile,
    policy: &'a SchedulingPolicy,
    // worker_id -> 该员工当天的唯一希望
    availability: HashMap<WorkerId, &'a AvailabilityEntry>,
}

impl<'a> ScheduleProblem<'a> {
    /// 构造并校验排班问题
    ///
    /// # 参数
    /// - plan_date: 目标日期
    /// - workers: 参与排班的员工（有序）
    /// - availability: 当天出勤希望（每人至多一条）
    /// - demand: 每小时需求人数
    /// - policy: 排班策略
    ///
    /// # 返回
    /// - Ok(ScheduleProblem): 输入合法
    /// - Err(EngineError::InvalidInput): 输入不合法（原因写在消息中）
    pub fn new(
        plan_date: NaiveDate,
        workers: &'a [Worker],
        availability: &'a [AvailabilityEntry],
        demand: &'a DemandProfile,
        policy: &'a SchedulingPolicy,
    ) -> EngineResult<Self> {
        let hours = policy.operating_hours;

        if workers.is_empty() {
            return Err(EngineError::invalid_input("员工集合为空，无可排班对象"));
        }
        if hours.is_empty() {
            return Err(EngineError::invalid_input(format!(
                "营业时段为空: {}",
                hours
            )));
        }
        if hours.close > DAY_END_HOUR {
            return Err(EngineError::invalid_input(format!(
                "营业时段超出一天范围: {}（闭店不得晚于 {} 时）",
                hours, DAY_END_HOUR
            )));
        }
        if policy.daily_max_hours == 0 {
            return Err(EngineError::invalid_input("日工时上限必须大于 0"));
        }

        let mut worker_ids = HashSet::with_capacity(workers.len());
        for worker in workers {
            if !worker_ids.insert(worker.worker_id) {
                return Err(EngineError::invalid_input(format!(
                    "员工ID重复: worker_id={}",
                    worker.worker_id
                )));
            }
        }

        let mut by_worker: HashMap<WorkerId, &'a AvailabilityEntry> = HashMap::new();
        for entry in availability {
            if entry.plan_date != plan_date {
                return Err(EngineError::invalid_input(format!(
                    "出勤希望日期与目标日期不一致: worker_id={}, entry_date={}, plan_date={}",
                    entry.worker_id, entry.plan_date, plan_date
                )));
            }
            if !worker_ids.contains(&entry.worker_id) {
                return Err(EngineError::invalid_input(format!(
                    "出勤希望引用了未参与排班的员工: worker_id={}",
                    entry.worker_id
                )));
            }
            if let Err(violation) = entry.validate() {
                return Err(EngineError::invalid_input(format!(
                    "出勤窗口格式错误: worker_id={}, {}",
                    entry.worker_id, violation
                )));
            }
            if by_worker.insert(entry.worker_id, entry).is_some() {
                return Err(EngineError::invalid_input(format!(
                    "同一员工同一天存在多条出勤希望: worker_id={}, date={}",
                    entry.worker_id, plan_date
                )));
            }
        }

        if let Some(hour) = demand.override_hours().find(|h| !hours.contains(*h)) {
            return Err(EngineError::invalid_input(format!(
                "需求覆写小时不在营业时段内: hour={}, operating={}",
                hour, hours
            )));
        }

        Ok(Self {
            plan_date,
            workers,
            demand,
            policy,
            availability: by_worker,
        })
    }

    pub fn plan_date(&self) -> NaiveDate {
        self.plan_date
    }

    pub fn workers(&self) -> &'a [Worker] {
        self.workers
    }

    pub fn operating_hours(&self) -> OperatingHours {
        self.policy.operating_hours
    }

    pub fn policy(&self) -> &'a SchedulingPolicy {
        self.policy
    }

    pub fn demand(&self) -> &'a DemandProfile {
        self.demand
    }

    /// 某员工当天的出勤希望
    pub fn availability_of(&self, worker_id: WorkerId) -> Option<&'a AvailabilityEntry> {
        self.availability.get(&worker_id).copied()
    }

    /// 某员工在营业时段内的有效窗口（无希望/不可出勤时为 None）
    pub fn window_of(&self, worker_id: WorkerId) -> Option<OperatingHours> {
        self.availability_of(worker_id)
            .and_then(|entry| entry.effective_window(&self.policy.operating_hours))
    }

    /// 指定小时的需求人数
    pub fn required_at(&self, hour: Hour) -> u32 {
        self.demand.required(hour)
    }
}
