// ==========================================
// 店铺排班系统 - 约束编译器
// ==========================================
// 职责: 将出勤希望、需求人数、日工时上限翻译为变量模型上的硬约束
// 红线: 不自动放宽任何约束；人手不足即为无解，交由人工决定放宽哪条规则
// ==========================================
// 约束清单:
// (A) 出勤门控: 无希望/不可出勤/窗口外 → 固定为 0
// (B) 需求覆盖: 每小时在岗人数 ≥ 需求人数
// (C) 日工时上限: 每人当日工时 ≤ daily_max_hours
// (D) 连续工时: 可选，policy.contiguous_shifts = true 时启用
// ==========================================

use crate::engine::model::{CompiledModel, ModelConstraint, VariableModel};
use crate::engine::objective::Objective;
use crate::engine::problem::ScheduleProblem;
use tracing::debug;

// ==========================================
// ConstraintCompiler - 约束编译器
// ==========================================
pub struct ConstraintCompiler<'p, 'a> {
    problem: &'p ScheduleProblem<'a>,
    variables: &'p VariableModel,
}

impl<'p, 'a> ConstraintCompiler<'p, 'a> {
    pub fn new(problem: &'p ScheduleProblem<'a>, variables: &'p VariableModel) -> Self {
        Self { problem, variables }
    }

    /// (A) 出勤门控
    ///
    /// 规则:
    /// - 没有提交希望的员工视为完全不可出勤（不是"随意"）
    /// - 希望标记为不可出勤 → 全部小时固定为 0
    /// - 可出勤 → 窗口 [start, effective_end) 之外的小时固定为 0，窗口内不加约束
    pub fn availability_gating(&self) -> Vec<ModelConstraint> {
        let hours = self.variables.hours();
        let mut constraints = Vec::new();

        for (worker_index, worker) in self.problem.workers().iter().enumerate() {
            let window = self.problem.window_of(worker.worker_id);
            for hour in hours.iter() {
                let inside = window.map(|w| w.contains(hour)).unwrap_or(false);
                if inside {
                    continue;
                }
                if let Some(var) = self.variables.var(worker_index, hour) {
                    constraints.push(ModelConstraint::Fix { var, value: false });
                }
            }
        }

        constraints
    }

    /// (B) 需求覆盖: 对每个营业小时 h，Σ_w x(w,h) ≥ demand(h)
    ///
    /// 需求为 0 的小时不产生约束
    pub fn demand_coverage(&self) -> Vec<ModelConstraint> {
        self.variables
            .hours()
            .iter()
            .filter_map(|hour| {
                let min = self.problem.required_at(hour);
                if min == 0 {
                    return None;
                }
                Some(ModelConstraint::AtLeast {
                    vars: self.variables.hour_vars(hour),
                    min,
                })
            })
            .collect()
    }

    /// (C) 日工时上限: 对每名员工 w，Σ_h x(w,h) ≤ daily_max_hours
    pub fn daily_cap(&self) -> Vec<ModelConstraint> {
        let max = self.problem.policy().daily_max_hours;
        (0..self.variables.worker_count())
            .map(|worker_index| ModelConstraint::AtMost {
                vars: self.variables.worker_vars(worker_index),
                max,
            })
            .collect()
    }

    /// (D) 连续工时: 每名员工的排班小时必须构成一个连续区间
    pub fn contiguity(&self) -> Vec<ModelConstraint> {
        (0..self.variables.worker_count())
            .map(|worker_index| ModelConstraint::Contiguous {
                vars: self.variables.worker_vars(worker_index),
            })
            .collect()
    }

    /// 编译全部约束并挂上目标函数
    ///
    /// 约束顺序不影响可行性与最优值（可能影响多个最优解中返回哪一个）
    pub fn compile(self, objective: Objective) -> CompiledModel {
        let mut constraints = self.availability_gating();
        let gating_count = constraints.len();

        constraints.extend(self.demand_coverage());
        constraints.extend(self.daily_cap());
        if self.problem.policy().contiguous_shifts {
            constraints.extend(self.contiguity());
        }

        debug!(
            plan_date = %self.problem.plan_date(),
            var_count = self.variables.var_count(),
            gating_count,
            constraint_count = constraints.len(),
            contiguous = self.problem.policy().contiguous_shifts,
            "约束编译完成"
        );

        CompiledModel::new(self.variables.clone(), constraints, objective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::availability::AvailabilityEntry;
    use crate::domain::demand::DemandProfile;
    use crate::domain::worker::Worker;
    use crate::engine::model::VarId;
    use crate::engine::policy::SchedulingPolicy;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 25).unwrap()
    }

    fn fixed_vars(constraints: &[ModelConstraint]) -> Vec<VarId> {
        constraints
            .iter()
            .filter_map(|c| match c {
                ModelConstraint::Fix { var, value: false } => Some(*var),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_gating_no_entry_means_fully_unavailable() {
        let workers = vec![Worker::new(1, "A"), Worker::new(2, "B")];
        let entries = vec![AvailabilityEntry::available(1, date(), 9, None)];
        let demand = DemandProfile::standard();
        let policy = SchedulingPolicy::default();
        let problem = ScheduleProblem::new(date(), &workers, &entries, &demand, &policy).unwrap();
        let vars = VariableModel::build(&workers, policy.operating_hours).unwrap();

        let gating = ConstraintCompiler::new(&problem, &vars).availability_gating();
        // 员工1全天可出勤 → 无约束；员工2没有希望 → 14 个变量全部固定
        assert_eq!(gating.len(), 14);
        assert_eq!(fixed_vars(&gating), vars.worker_vars(1));
    }

    #[test]
    fn test_gating_window_and_unavailable() {
        let workers = vec![Worker::new(1, "A"), Worker::new(2, "B")];
        let entries = vec![
            AvailabilityEntry::available(1, date(), 12, Some(17)),
            AvailabilityEntry::unavailable(2, date()),
        ];
        let demand = DemandProfile::standard();
        let policy = SchedulingPolicy::default();
        let problem = ScheduleProblem::new(date(), &workers, &entries, &demand, &policy).unwrap();
        let vars = VariableModel::build(&workers, policy.operating_hours).unwrap();

        let fixed = fixed_vars(&ConstraintCompiler::new(&problem, &vars).availability_gating());

        for hour in 9..23u8 {
            let var = vars.var(0, hour).unwrap();
            let in_window = (12..17).contains(&hour);
            assert_eq!(!fixed.contains(&var), in_window, "hour {}", hour);
            assert!(fixed.contains(&vars.var(1, hour).unwrap()));
        }
    }

    #[test]
    fn test_demand_and_cap_shapes() {
        let workers = vec![Worker::new(1, "A"), Worker::new(2, "B"), Worker::new(3, "C")];
        let demand = DemandProfile::standard().with_override(20, 0);
        let policy = SchedulingPolicy::default();
        let problem = ScheduleProblem::new(date(), &workers, &[], &demand, &policy).unwrap();
        let vars = VariableModel::build(&workers, policy.operating_hours).unwrap();
        let compiler = ConstraintCompiler::new(&problem, &vars);

        let demand_constraints = compiler.demand_coverage();
        assert_eq!(demand_constraints.len(), 13); // 20 点需求为 0，不建约束
        let peak = demand_constraints
            .iter()
            .find(|c| c.vars() == vars.hour_vars(12).as_slice())
            .unwrap();
        assert_eq!(peak, &ModelConstraint::AtLeast { vars: vars.hour_vars(12), min: 2 });

        let caps = compiler.daily_cap();
        assert_eq!(caps.len(), 3);
        assert!(caps.iter().all(|c| matches!(c, ModelConstraint::AtMost { max: 8, vars } if vars.len() == 14)));
    }

    #[test]
    fn test_contiguity_only_when_enabled() {
        let workers = vec![Worker::new(1, "A")];
        let demand = DemandProfile::uniform(0);
        let entries = vec![AvailabilityEntry::available(1, date(), 9, None)];
        let objective_vars;

        let plain = SchedulingPolicy::default();
        {
            let problem = ScheduleProblem::new(date(), &workers, &entries, &demand, &plain).unwrap();
            let vars = VariableModel::build(&workers, plain.operating_hours).unwrap();
            objective_vars = Objective::total_assigned_hours(&vars);
            let model = ConstraintCompiler::new(&problem, &vars).compile(objective_vars.clone());
            assert!(model.constraints.iter().all(|c| c.kind() != "contiguous"));
        }

        let strict = SchedulingPolicy {
            contiguous_shifts: true,
            ..SchedulingPolicy::default()
        };
        let problem = ScheduleProblem::new(date(), &workers, &entries, &demand, &strict).unwrap();
        let vars = VariableModel::build(&workers, strict.operating_hours).unwrap();
        let model = ConstraintCompiler::new(&problem, &vars).compile(objective_vars);
        assert_eq!(
            model.constraints.iter().filter(|c| c.kind() == "contiguous").count(),
            1
        );
    }
}
