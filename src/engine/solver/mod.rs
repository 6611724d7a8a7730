// ==========================================
// 店铺排班系统 - 求解器驱动
// ==========================================
// 职责: 在预算内求解编译后的模型，并把结果映射为 EngineResult
// 红线: 不重试、不放宽；被取消的求解一律返回 Cancelled（即使已有可行解）
// ==========================================
// 结果映射:
// - Optimal           → Ok(optimal = true)
// - Feasible          → Ok(optimal = false)
// - Infeasible        → Err(Infeasible)
// - Unknown           → Err(ResourceExhausted)
// - Aborted(Cancelled)→ Err(Cancelled)
// ==========================================

pub mod monitor;
pub mod result;
pub mod search;

pub use monitor::{
    CancelToken, CompositeMonitor, InterruptMonitor, LogMonitor, NodeLimitMonitor,
    SearchCommand, SearchMonitor, StopReason, TimeLimitMonitor,
};
pub use result::{SearchResult, SolverOutcome, SolverStatistics, TerminationReason};
pub use search::BranchAndBound;

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::model::{AssignmentMatrix, CompiledModel};
use crate::engine::policy::SolverLimits;
use chrono::NaiveDate;

/// 求解成功的产物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolvedAssignment {
    pub matrix: AssignmentMatrix,
    pub objective_value: u32,
    /// false 表示预算耗尽时返回的最好可行解，未证明最优
    pub optimal: bool,
    pub statistics: SolverStatistics,
}

// ==========================================
// SolverDriver - 求解器驱动
// ==========================================
// 多个最优解之间的选择取决于约束与变量顺序，输入相同则结果确定
pub struct SolverDriver {
    limits: SolverLimits,
}

impl SolverDriver {
    pub fn new(limits: SolverLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> SolverLimits {
        self.limits
    }

    /// 组装监视器并运行搜索，返回原始结果
    pub fn search(&self, model: &CompiledModel, cancel: Option<&CancelToken>) -> SolverOutcome {
        let mut monitor = CompositeMonitor::new();
        if let Some(limit) = self.limits.time_limit {
            monitor.add(TimeLimitMonitor::with_default_check_interval(limit));
        }
        if let Some(limit) = self.limits.node_limit {
            monitor.add(NodeLimitMonitor::new(limit));
        }
        if let Some(token) = cancel {
            monitor.add(InterruptMonitor::new(token.clone()));
        }
        monitor.add(LogMonitor);

        BranchAndBound::new(model).run(&mut monitor)
    }

    /// 求解并映射为引擎结果
    ///
    /// # 返回
    /// - Ok(SolvedAssignment): 最优解或预算内最好的可行解
    /// - Err(Infeasible): 已证明无解
    /// - Err(ResourceExhausted): 预算耗尽且无可行解
    /// - Err(Cancelled): 调用方取消
    pub fn solve(
        &self,
        model: &CompiledModel,
        plan_date: NaiveDate,
        cancel: Option<&CancelToken>,
    ) -> EngineResult<SolvedAssignment> {
        if cancel.map(|t| t.is_cancelled()).unwrap_or(false) {
            return Err(EngineError::Cancelled { plan_date });
        }

        let outcome = self.search(model, cancel);
        if outcome.was_cancelled() {
            return Err(EngineError::Cancelled { plan_date });
        }

        let SolverOutcome {
            result,
            reason,
            statistics,
        } = outcome;

        match result {
            SearchResult::Optimal(matrix) => Ok(SolvedAssignment {
                objective_value: model.objective.evaluate_matrix(&matrix),
                matrix,
                optimal: true,
                statistics,
            }),
            SearchResult::Feasible(matrix) => Ok(SolvedAssignment {
                objective_value: model.objective.evaluate_matrix(&matrix),
                matrix,
                optimal: false,
                statistics,
            }),
            SearchResult::Infeasible => Err(EngineError::Infeasible {
                plan_date,
                reason: format!(
                    "约束互相矛盾（nodes={}, backtracks={}）",
                    statistics.nodes, statistics.backtracks
                ),
            }),
            SearchResult::Unknown => Err(EngineError::ResourceExhausted {
                plan_date,
                reason: format!("{}, nodes={}", reason, statistics.nodes),
            }),
        }
    }
}

impl Default for SolverDriver {
    fn default() -> Self {
        Self::new(SolverLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::availability::AvailabilityEntry;
    use crate::domain::demand::DemandProfile;
    use crate::domain::worker::Worker;
    use crate::engine::constraints::ConstraintCompiler;
    use crate::engine::model::VariableModel;
    use crate::engine::objective::Objective;
    use crate::engine::policy::SchedulingPolicy;
    use crate::engine::problem::ScheduleProblem;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 25).unwrap()
    }

    fn compile(
        workers: &[Worker],
        entries: &[AvailabilityEntry],
        demand: &DemandProfile,
        policy: &SchedulingPolicy,
    ) -> CompiledModel {
        let problem = ScheduleProblem::new(date(), workers, entries, demand, policy).unwrap();
        let vars = VariableModel::build(workers, policy.operating_hours).unwrap();
        let objective = Objective::total_assigned_hours(&vars);
        ConstraintCompiler::new(&problem, &vars).compile(objective)
    }

    fn two_full_day_workers() -> (Vec<Worker>, Vec<AvailabilityEntry>) {
        (
            vec![Worker::new(1, "A"), Worker::new(2, "B")],
            vec![
                AvailabilityEntry::available(1, date(), 9, None),
                AvailabilityEntry::available(2, date(), 9, None),
            ],
        )
    }

    #[test]
    fn test_single_short_window_is_infeasible() {
        let workers = vec![Worker::new(1, "A")];
        let entries = vec![AvailabilityEntry::available(1, date(), 9, Some(17))];
        let model = compile(
            &workers,
            &entries,
            &DemandProfile::uniform(1),
            &SchedulingPolicy::default(),
        );

        let err = SolverDriver::default().solve(&model, date(), None).unwrap_err();
        assert!(matches!(err, EngineError::Infeasible { .. }));
    }

    #[test]
    fn test_two_workers_reach_cap_and_cover_peak() {
        let (workers, entries) = two_full_day_workers();
        let model = compile(
            &workers,
            &entries,
            &DemandProfile::standard(),
            &SchedulingPolicy::default(),
        );

        let solved = SolverDriver::default().solve(&model, date(), None).unwrap();
        assert!(solved.optimal);
        assert_eq!(solved.objective_value, 16);
        assert_eq!(solved.matrix.headcount(12), 2);
        assert_eq!(solved.matrix.headcount(13), 2);
        for hour in 9..23u8 {
            assert!(solved.matrix.headcount(hour) >= 1, "hour {}", hour);
        }
        assert_eq!(solved.matrix.assigned_hours(0).len(), 8);
        assert_eq!(solved.matrix.assigned_hours(1).len(), 8);
    }

    #[test]
    fn test_contiguity_makes_tight_day_infeasible() {
        let (workers, entries) = two_full_day_workers();
        let policy = SchedulingPolicy {
            contiguous_shifts: true,
            ..SchedulingPolicy::default()
        };
        let model = compile(&workers, &entries, &DemandProfile::standard(), &policy);

        let err = SolverDriver::default().solve(&model, date(), None).unwrap_err();
        assert!(matches!(err, EngineError::Infeasible { .. }));
    }

    #[test]
    fn test_contiguity_yields_single_runs() {
        let workers = vec![Worker::new(1, "A"), Worker::new(2, "B")];
        let entries = vec![
            AvailabilityEntry::available(1, date(), 9, Some(16)),
            AvailabilityEntry::available(2, date(), 16, None),
        ];
        let policy = SchedulingPolicy {
            contiguous_shifts: true,
            ..SchedulingPolicy::default()
        };
        let model = compile(&workers, &entries, &DemandProfile::uniform(1), &policy);

        let solved = SolverDriver::default().solve(&model, date(), None).unwrap();
        assert!(solved.optimal);
        assert_eq!(solved.objective_value, 14);
        assert_eq!(solved.matrix.assigned_hours(0), (9..16).collect::<Vec<u8>>());
        assert_eq!(solved.matrix.assigned_hours(1), (16..23).collect::<Vec<u8>>());
    }

    /// 三个变量、两个重叠的上限组：根上界 2，首个叶子只有 1
    fn overlapping_caps_model() -> CompiledModel {
        use crate::domain::types::OperatingHours;
        use crate::engine::model::{ModelConstraint, VarId};

        let vars = VariableModel::build(&[Worker::new(1, "A")], OperatingHours::new(9, 12)).unwrap();
        let objective = Objective::total_assigned_hours(&vars);
        let constraints = vec![
            ModelConstraint::AtMost {
                vars: vec![VarId::new(0), VarId::new(1)],
                max: 1,
            },
            ModelConstraint::AtMost {
                vars: vec![VarId::new(0), VarId::new(2)],
                max: 1,
            },
        ];
        CompiledModel::new(vars, constraints, objective)
    }

    #[test]
    fn test_node_limit_with_incumbent_returns_unproven_solution() {
        let model = overlapping_caps_model();
        let driver = SolverDriver::new(SolverLimits::unlimited().with_node_limit(2));

        let solved = driver.solve(&model, date(), None).unwrap();
        assert!(!solved.optimal);
        assert_eq!(solved.objective_value, 1);
        assert_eq!(solved.statistics.root_bound, 2);

        // 不限预算时继续搜索到最优
        let solved = SolverDriver::new(SolverLimits::unlimited())
            .solve(&model, date(), None)
            .unwrap();
        assert!(solved.optimal);
        assert_eq!(solved.objective_value, 2);
    }

    #[test]
    fn test_node_limit_without_incumbent_is_exhausted() {
        let (workers, entries) = two_full_day_workers();
        let driver = SolverDriver::new(SolverLimits::unlimited().with_node_limit(1));
        let model = compile(
            &workers,
            &entries,
            &DemandProfile::standard(),
            &SchedulingPolicy::default(),
        );

        let err = driver.solve(&model, date(), None).unwrap_err();
        assert!(matches!(err, EngineError::ResourceExhausted { .. }));
    }

    #[test]
    fn test_cancelled_token_never_returns_solution() {
        let (workers, entries) = two_full_day_workers();
        let model = compile(
            &workers,
            &entries,
            &DemandProfile::standard(),
            &SchedulingPolicy::default(),
        );
        let token = CancelToken::new();
        token.cancel();

        let err = SolverDriver::default()
            .solve(&model, date(), Some(&token))
            .unwrap_err();
        assert_eq!(err, EngineError::Cancelled { plan_date: date() });
    }
}
