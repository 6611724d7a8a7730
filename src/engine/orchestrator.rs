// ==========================================
// 店铺排班系统 - 单日排班编排器
// ==========================================
// 主流程: 变量建模 → 约束编译 → 目标 → 求解 → 班段还原
// 红线: 编排器不读写数据库；无解时给出人手缺口诊断，由人工决定如何放宽
// ==========================================

use crate::domain::shift::{ShiftBlock, ShiftGap};
use crate::domain::types::Hour;
use crate::engine::constraints::ConstraintCompiler;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::model::VariableModel;
use crate::engine::objective::Objective;
use crate::engine::problem::ScheduleProblem;
use crate::engine::reducer::BlockReducer;
use crate::engine::solver::{CancelToken, SolverDriver, SolverStatistics};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, instrument, warn};

// ==========================================
// DailySchedule - 单日排班结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySchedule {
    pub plan_date: NaiveDate,
    pub blocks: Vec<ShiftBlock>,
    pub gaps: Vec<ShiftGap>,
    pub total_assigned_hours: u32,
    pub optimal: bool, // false = 预算耗尽时的最好可行解
    pub statistics: SolverStatistics,
}

// ==========================================
// ShiftScheduler - 单日排班编排器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftScheduler;

impl ShiftScheduler {
    pub fn new() -> Self {
        Self
    }

    /// 求解单日排班
    pub fn schedule_day(&self, problem: &ScheduleProblem<'_>) -> EngineResult<DailySchedule> {
        self.run(problem, None)
    }

    /// 求解单日排班（可被外部取消）
    pub fn schedule_day_with_cancel(
        &self,
        problem: &ScheduleProblem<'_>,
        cancel: &CancelToken,
    ) -> EngineResult<DailySchedule> {
        self.run(problem, Some(cancel))
    }

    #[instrument(skip(self, problem, cancel), fields(plan_date = %problem.plan_date()))]
    fn run(
        &self,
        problem: &ScheduleProblem<'_>,
        cancel: Option<&CancelToken>,
    ) -> EngineResult<DailySchedule> {
        let plan_date = problem.plan_date();
        let policy = problem.policy();

        // ===== 1. 变量 / 约束 / 目标 =====
        let variables = VariableModel::build(problem.workers(), policy.operating_hours)?;
        let objective = Objective::total_assigned_hours(&variables);
        let model = ConstraintCompiler::new(problem, &variables).compile(objective);

        info!(
            worker_count = variables.worker_count(),
            hour_count = variables.hour_count(),
            constraint_count = model.constraint_count(),
            "开始求解"
        );

        // ===== 2. 求解 =====
        let driver = SolverDriver::new(policy.limits);
        let solved = match driver.solve(&model, plan_date, cancel) {
            Ok(solved) => solved,
            Err(EngineError::Infeasible { plan_date, reason }) => {
                let reason = match diagnose_shortage(problem) {
                    Some(diagnosis) => diagnosis,
                    None => reason,
                };
                warn!(reason = %reason, "排班无可行解");
                return Err(EngineError::Infeasible { plan_date, reason });
            }
            Err(e) => {
                warn!(error = %e, "排班求解未完成");
                return Err(e);
            }
        };

        // ===== 3. 班段还原 =====
        let reduced = BlockReducer::new(policy.gap_policy).reduce(plan_date, &solved.matrix)?;

        info!(
            objective = solved.objective_value,
            optimal = solved.optimal,
            block_count = reduced.blocks.len(),
            gap_count = reduced.gaps.len(),
            nodes = solved.statistics.nodes,
            "排班求解完成"
        );

        Ok(DailySchedule {
            plan_date,
            blocks: reduced.blocks,
            gaps: reduced.gaps,
            total_assigned_hours: solved.objective_value,
            optimal: solved.optimal,
            statistics: solved.statistics,
        })
    }
}

/// 人手缺口诊断
///
/// 逐小时比较可出勤人数与需求人数，并比较总可用工时与总需求工时。
/// 找不到明显缺口时返回 None（例如只有连续工时约束导致无解）。
pub fn diagnose_shortage(problem: &ScheduleProblem<'_>) -> Option<String> {
    let hours = problem.operating_hours();
    let cap = problem.policy().daily_max_hours;

    let windows: Vec<_> = problem
        .workers()
        .iter()
        .filter_map(|w| problem.window_of(w.worker_id))
        .collect();

    let short_hours: Vec<(Hour, u32, u32)> = hours
        .iter()
        .filter_map(|hour| {
            let required = problem.required_at(hour);
            let available = windows.iter().filter(|w| w.contains(hour)).count() as u32;
            (available < required).then_some((hour, available, required))
        })
        .collect();

    let total_required: u32 = hours.iter().map(|h| problem.required_at(h)).sum();
    let total_capacity: u32 = windows.iter().map(|w| (w.len() as u32).min(cap)).sum();

    let mut parts = Vec::new();
    if !short_hours.is_empty() {
        let detail: Vec<String> = short_hours
            .iter()
            .map(|(h, available, required)| format!("{}时 可出勤{}人/需求{}人", h, available, required))
            .collect();
        parts.push(format!("人手不足的小时: {}", detail.join(", ")));
    }
    if total_capacity < total_required {
        parts.push(format!(
            "总可用工时{}小于总需求工时{}",
            total_capacity, total_required
        ));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::availability::AvailabilityEntry;
    use crate::domain::demand::DemandProfile;
    use crate::domain::types::GapPolicy;
    use crate::domain::worker::Worker;
    use crate::engine::policy::SchedulingPolicy;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 25).unwrap()
    }

    #[test]
    fn test_infeasible_reason_names_short_hours() {
        let workers = vec![Worker::new(1, "A")];
        let entries = vec![AvailabilityEntry::available(1, date(), 9, Some(17))];
        let demand = DemandProfile::uniform(1);
        let policy = SchedulingPolicy::default();
        let problem = ScheduleProblem::new(date(), &workers, &entries, &demand, &policy).unwrap();

        match ShiftScheduler::new().schedule_day(&problem) {
            Err(EngineError::Infeasible { reason, .. }) => {
                assert!(reason.contains("17时"), "reason: {}", reason);
                assert!(reason.contains("22时"), "reason: {}", reason);
            }
            other => panic!("expected infeasible, got {:?}", other),
        }
    }

    #[test]
    fn test_single_worker_gets_one_capped_block() {
        let workers = vec![Worker::new(7, "A")];
        let entries = vec![AvailabilityEntry::available(7, date(), 10, Some(20))];
        let demand = DemandProfile::uniform(0);
        let policy = SchedulingPolicy::default();
        let problem = ScheduleProblem::new(date(), &workers, &entries, &demand, &policy).unwrap();

        let schedule = ShiftScheduler::new().schedule_day(&problem).unwrap();
        assert!(schedule.optimal);
        assert_eq!(schedule.total_assigned_hours, 8);
        assert_eq!(schedule.blocks, vec![ShiftBlock::new(7, date(), 10, 18)]);
        assert!(schedule.gaps.is_empty());
    }

    #[test]
    fn test_reject_policy_surfaces_gap_in_tight_day() {
        let workers = vec![Worker::new(1, "A"), Worker::new(2, "B")];
        let entries = vec![
            AvailabilityEntry::available(1, date(), 9, None),
            AvailabilityEntry::available(2, date(), 9, None),
        ];
        let demand = DemandProfile::standard();
        let policy = SchedulingPolicy {
            gap_policy: GapPolicy::Reject,
            ..SchedulingPolicy::default()
        };
        let problem = ScheduleProblem::new(date(), &workers, &entries, &demand, &policy).unwrap();

        let err = ShiftScheduler::new().schedule_day(&problem).unwrap_err();
        assert!(matches!(err, EngineError::NonContiguousAssignment { .. }));
    }

    #[test]
    fn test_diagnosis_is_silent_when_capacity_suffices() {
        let workers = vec![Worker::new(1, "A"), Worker::new(2, "B")];
        let entries = vec![
            AvailabilityEntry::available(1, date(), 9, None),
            AvailabilityEntry::available(2, date(), 9, None),
        ];
        let demand = DemandProfile::standard();
        let policy = SchedulingPolicy::default();
        let problem = ScheduleProblem::new(date(), &workers, &entries, &demand, &policy).unwrap();

        assert_eq!(diagnose_shortage(&problem), None);
    }
}
