// ==========================================
// 店铺排班系统 - 分支定界搜索
// ==========================================
// 职责: 在布尔变量上做深度优先分支定界，配合约束传播
// ==========================================
// 传播规则:
// - Fix:        直接赋值
// - AtLeast:    已选+可选 < min → 冲突；已选+可选 == min → 可选全部置 1
// - AtMost:     已选 > max → 冲突；已选 == max → 可选全部置 0
// - Contiguous: 首尾已选之间全部置 1；两侧越过 0 之后全部置 0
// 全局松弛: 各需求缺口之和 ≤ 各上限组剩余容量之和（需求约束变量互不相交时启用）
// 上界: 已选 + Σ_组 min(组剩余容量, 组内可选目标变量)
// ==========================================

use crate::engine::model::{AssignmentMatrix, CompiledModel, ModelConstraint, VarId};
use crate::engine::solver::monitor::{SearchCommand, SearchMonitor};
use crate::engine::solver::result::{
    SearchResult, SolverOutcome, SolverStatistics, TerminationReason,
};
use std::cmp::Reverse;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Domain {
    Free,
    True,
    False,
}

impl Domain {
    #[inline]
    fn of(value: bool) -> Self {
        if value {
            Domain::True
        } else {
            Domain::False
        }
    }
}

/// 决策层帧：回溯时撤销 trail_mark 之后的全部赋值
#[derive(Debug, Clone, Copy)]
struct Frame {
    trail_mark: usize,
    var: usize,
    tried_false: bool,
}

/// 上限组：一条 AtMost 约束及归属于它的目标变量
#[derive(Debug, Clone)]
struct CapacityGroup {
    constraint: usize,
    max: u32,
    members: Vec<usize>,
}

pub struct BranchAndBound<'m> {
    model: &'m CompiledModel,
    row_len: usize,
    watches: Vec<Vec<usize>>,
    capacity_groups: Vec<CapacityGroup>,
    group_of: Vec<Option<usize>>,
    coverage: Vec<usize>,
    coverage_disjoint: bool,
    in_objective: Vec<bool>,
    domains: Vec<Domain>,
    trail: Vec<usize>,
    stack: Vec<Frame>,
    incumbent: Option<(u32, Vec<bool>)>,
    stats: SolverStatistics,
}

impl<'m> BranchAndBound<'m> {
    pub fn new(model: &'m CompiledModel) -> Self {
        let var_count = model.variables.var_count();
        let mut watches = vec![Vec::new(); var_count];
        let mut capacity_groups: Vec<CapacityGroup> = Vec::new();
        let mut group_of: Vec<Option<usize>> = vec![None; var_count];
        let mut coverage = Vec::new();
        let mut covered_by = vec![0usize; var_count];

        let mut in_objective = vec![false; var_count];
        for var in &model.objective.terms {
            in_objective[var.index()] = true;
        }

        for (ci, constraint) in model.constraints.iter().enumerate() {
            for var in constraint.vars() {
                watches[var.index()].push(ci);
            }
            match constraint {
                ModelConstraint::AtMost { vars, max } => {
                    let gi = capacity_groups.len();
                    let mut members = Vec::new();
                    for var in vars {
                        let v = var.index();
                        if group_of[v].is_none() {
                            group_of[v] = Some(gi);
                            if in_objective[v] {
                                members.push(v);
                            }
                        }
                    }
                    capacity_groups.push(CapacityGroup {
                        constraint: ci,
                        max: *max,
                        members,
                    });
                }
                ModelConstraint::AtLeast { vars, .. } => {
                    coverage.push(ci);
                    for var in vars {
                        covered_by[var.index()] += 1;
                    }
                }
                _ => {}
            }
        }

        Self {
            model,
            row_len: model.variables.hour_count().max(1),
            watches,
            capacity_groups,
            group_of,
            coverage,
            coverage_disjoint: covered_by.iter().all(|c| *c <= 1),
            in_objective,
            domains: vec![Domain::Free; var_count],
            trail: Vec::with_capacity(var_count),
            stack: Vec::new(),
            incumbent: None,
            stats: SolverStatistics::default(),
        }
    }

    // ==========================================
    // 搜索主循环
    // ==========================================

    pub fn run(mut self, monitor: &mut dyn SearchMonitor) -> SolverOutcome {
        let started = Instant::now();
        monitor.on_enter_search(self.model);

        if !self.propagate_root() {
            self.stats.elapsed = started.elapsed();
            monitor.on_exit_search(&self.stats);
            return self.finalize(TerminationReason::InfeasibilityProven);
        }

        let root_bound = self.objective_bound();
        self.stats.root_bound = root_bound;

        let reason = loop {
            if let SearchCommand::Stop(stop) = monitor.check_termination(&self.stats) {
                break TerminationReason::Aborted(stop);
            }
            self.stats.nodes += 1;

            let pruned = match &self.incumbent {
                Some((best, _)) => self.objective_bound() <= *best,
                None => false,
            };

            let mut dead_end = pruned;
            if !pruned {
                match self.select_branch_var() {
                    None => {
                        let values = self.current_values();
                        let value = self.model.objective.evaluate(&values);
                        let improved = self
                            .incumbent
                            .as_ref()
                            .map(|(best, _)| value > *best)
                            .unwrap_or(true);
                        if improved {
                            self.stats.solutions += 1;
                            self.incumbent = Some((value, values));
                            monitor.on_solution(value, &self.stats);
                        }
                        if value >= root_bound {
                            break TerminationReason::OptimalityProven;
                        }
                        dead_end = true;
                    }
                    Some(var) => {
                        self.stack.push(Frame {
                            trail_mark: self.trail.len(),
                            var,
                            tried_false: false,
                        });
                        if !self.decide(var, true) {
                            dead_end = true;
                        }
                    }
                }
            }

            if dead_end && !self.backtrack() {
                // 搜索树穷尽：有解即最优，无解即无可行解
                break if self.incumbent.is_some() {
                    TerminationReason::OptimalityProven
                } else {
                    TerminationReason::InfeasibilityProven
                };
            }
        };

        self.stats.elapsed = started.elapsed();
        monitor.on_exit_search(&self.stats);
        self.finalize(reason)
    }

    fn finalize(self, reason: TerminationReason) -> SolverOutcome {
        let variables = self.model.variables.clone();
        let result = match (reason, self.incumbent) {
            (TerminationReason::OptimalityProven, Some((_, values))) => {
                SearchResult::Optimal(AssignmentMatrix::new(variables, values))
            }
            (TerminationReason::Aborted(_), Some((_, values))) => {
                SearchResult::Feasible(AssignmentMatrix::new(variables, values))
            }
            (TerminationReason::Aborted(_), None) => SearchResult::Unknown,
            _ => SearchResult::Infeasible,
        };
        SolverOutcome {
            result,
            reason,
            statistics: self.stats,
        }
    }

    /// 回溯到最近一个尚未尝试 0 分支的决策
    ///
    /// # 返回
    /// - true: 已切换到某个决策的 0 分支，且传播成功
    /// - false: 决策栈已空，搜索树穷尽
    fn backtrack(&mut self) -> bool {
        while let Some(frame) = self.stack.pop() {
            self.stats.backtracks += 1;
            self.undo_to(frame.trail_mark);
            if frame.tried_false {
                continue;
            }
            self.stack.push(Frame {
                tried_false: true,
                ..frame
            });
            if self.decide(frame.var, false) {
                return true;
            }
        }
        false
    }

    fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some(var) = self.trail.pop() {
                self.domains[var] = Domain::Free;
            }
        }
    }

    fn current_values(&self) -> Vec<bool> {
        self.domains.iter().map(|d| *d == Domain::True).collect()
    }

    // ==========================================
    // 分支选择
    // ==========================================

    /// 选择分支变量
    ///
    /// 顺序:
    /// 1) 尚有缺口的需求约束中，可选变量最少者（first-fail）；
    ///    约束内优先延续已排班的相邻小时，其次选剩余容量最大的员工
    /// 2) 与已排班小时相邻的可选目标变量（延长班段）
    /// 3) 任一可选目标变量，最后任一可选变量
    fn select_branch_var(&self) -> Option<usize> {
        let model = self.model;
        let mut best: Option<(u32, &[VarId])> = None;

        for &ci in &self.coverage {
            if let ModelConstraint::AtLeast { vars, min } = &model.constraints[ci] {
                let (t, f) = self.count(vars);
                if t >= *min || f == 0 {
                    continue;
                }
                if best.map(|(bf, _)| f < bf).unwrap_or(true) {
                    best = Some((f, vars.as_slice()));
                }
            }
        }

        if let Some((_, vars)) = best {
            return vars
                .iter()
                .map(|v| v.index())
                .filter(|v| self.domains[*v] == Domain::Free)
                .min_by_key(|v| (Reverse(self.touches_assigned(*v)), Reverse(self.slack_of(*v))));
        }

        let free_objective =
            |v: &usize| self.domains[*v] == Domain::Free && self.in_objective[*v];
        (0..self.domains.len())
            .filter(free_objective)
            .find(|v| self.touches_assigned(*v))
            .or_else(|| (0..self.domains.len()).find(free_objective))
            .or_else(|| (0..self.domains.len()).find(|v| self.domains[*v] == Domain::Free))
    }

    /// 同一员工的前一小时或后一小时已排班
    fn touches_assigned(&self, var: usize) -> bool {
        let row = self.row_len;
        let offset = var % row;
        let prev = offset > 0 && self.domains[var - 1] == Domain::True;
        let next = offset + 1 < row && self.domains[var + 1] == Domain::True;
        prev || next
    }

    /// 变量所属上限组的剩余容量（无组时视为无限）
    fn slack_of(&self, var: usize) -> u32 {
        match self.group_of[var] {
            Some(gi) => {
                let group = &self.capacity_groups[gi];
                let (t, _) = self.count(self.model.constraints[group.constraint].vars());
                group.max.saturating_sub(t)
            }
            None => u32::MAX,
        }
    }

    // ==========================================
    // 约束传播
    // ==========================================

    fn decide(&mut self, var: usize, value: bool) -> bool {
        let mut queue = Vec::new();
        self.assign(var, value, &mut queue) && self.propagate(queue)
    }

    fn propagate_root(&mut self) -> bool {
        let mut queue = Vec::new();
        for ci in 0..self.model.constraints.len() {
            if !self.revise(ci, &mut queue) {
                return false;
            }
        }
        self.propagate(queue)
    }

    fn propagate(&mut self, mut queue: Vec<usize>) -> bool {
        while let Some(var) = queue.pop() {
            for k in 0..self.watches[var].len() {
                let ci = self.watches[var][k];
                if !self.revise(ci, &mut queue) {
                    return false;
                }
            }
        }
        self.coverage_relaxation_holds()
    }

    fn assign(&mut self, var: usize, value: bool, queue: &mut Vec<usize>) -> bool {
        match self.domains[var] {
            Domain::Free => {
                self.domains[var] = Domain::of(value);
                self.trail.push(var);
                queue.push(var);
                true
            }
            current => current == Domain::of(value),
        }
    }

    fn count(&self, vars: &[VarId]) -> (u32, u32) {
        let mut t = 0;
        let mut f = 0;
        for var in vars {
            match self.domains[var.index()] {
                Domain::True => t += 1,
                Domain::Free => f += 1,
                Domain::False => {}
            }
        }
        (t, f)
    }

    fn revise(&mut self, ci: usize, queue: &mut Vec<usize>) -> bool {
        let model = self.model;
        match &model.constraints[ci] {
            ModelConstraint::Fix { var, value } => self.assign(var.index(), *value, queue),
            ModelConstraint::AtLeast { vars, min } => {
                let (t, f) = self.count(vars);
                if t + f < *min {
                    return false;
                }
                if t < *min && t + f == *min {
                    for var in vars {
                        if self.domains[var.index()] == Domain::Free {
                            self.assign(var.index(), true, queue);
                        }
                    }
                }
                true
            }
            ModelConstraint::AtMost { vars, max } => {
                let (t, f) = self.count(vars);
                if t > *max {
                    return false;
                }
                if t == *max && f > 0 {
                    for var in vars {
                        if self.domains[var.index()] == Domain::Free {
                            self.assign(var.index(), false, queue);
                        }
                    }
                }
                true
            }
            ModelConstraint::Contiguous { vars } => {
                let first = vars
                    .iter()
                    .position(|v| self.domains[v.index()] == Domain::True);
                let last = vars
                    .iter()
                    .rposition(|v| self.domains[v.index()] == Domain::True);
                let (first, last) = match (first, last) {
                    (Some(a), Some(b)) => (a, b),
                    _ => return true,
                };

                for var in &vars[first..=last] {
                    match self.domains[var.index()] {
                        Domain::False => return false,
                        Domain::Free => {
                            self.assign(var.index(), true, queue);
                        }
                        Domain::True => {}
                    }
                }

                if let Some(k) = vars[..first]
                    .iter()
                    .rposition(|v| self.domains[v.index()] == Domain::False)
                {
                    for var in &vars[..k] {
                        if self.domains[var.index()] == Domain::Free {
                            self.assign(var.index(), false, queue);
                        }
                    }
                }
                if let Some(offset) = vars[last + 1..]
                    .iter()
                    .position(|v| self.domains[v.index()] == Domain::False)
                {
                    for var in &vars[last + 1 + offset + 1..] {
                        if self.domains[var.index()] == Domain::Free {
                            self.assign(var.index(), false, queue);
                        }
                    }
                }
                true
            }
        }
    }

    /// 全局松弛：剩余需求缺口不能超过剩余可用容量
    fn coverage_relaxation_holds(&self) -> bool {
        if !self.coverage_disjoint {
            return true;
        }
        let model = self.model;
        let var_count = self.domains.len();

        let mut deficit_total: u64 = 0;
        let mut useful = vec![false; var_count];
        for &ci in &self.coverage {
            if let ModelConstraint::AtLeast { vars, min } = &model.constraints[ci] {
                let (t, _) = self.count(vars);
                if t < *min {
                    deficit_total += (*min - t) as u64;
                    for var in vars {
                        if self.domains[var.index()] == Domain::Free {
                            useful[var.index()] = true;
                        }
                    }
                }
            }
        }
        if deficit_total == 0 {
            return true;
        }

        let mut per_group = vec![0u64; self.capacity_groups.len()];
        let mut capacity_total: u64 = 0;
        for v in 0..var_count {
            if !useful[v] {
                continue;
            }
            match self.group_of[v] {
                Some(gi) => per_group[gi] += 1,
                None => capacity_total += 1,
            }
        }
        for (gi, group) in self.capacity_groups.iter().enumerate() {
            if per_group[gi] == 0 {
                continue;
            }
            let (t, _) = self.count(model.constraints[group.constraint].vars());
            let slack = group.max.saturating_sub(t) as u64;
            capacity_total += slack.min(per_group[gi]);
        }

        capacity_total >= deficit_total
    }

    /// 目标上界
    fn objective_bound(&self) -> u32 {
        let mut bound = 0u32;
        let mut counted = vec![false; self.domains.len()];

        for var in &self.model.objective.terms {
            if self.domains[var.index()] == Domain::True {
                bound += 1;
            }
        }

        for group in &self.capacity_groups {
            let (t, _) = self.count(self.model.constraints[group.constraint].vars());
            let free_members = group
                .members
                .iter()
                .filter(|v| self.domains[**v] == Domain::Free)
                .count() as u32;
            for v in &group.members {
                counted[*v] = true;
            }
            bound += group.max.saturating_sub(t).min(free_members);
        }

        for var in &self.model.objective.terms {
            let v = var.index();
            if !counted[v] && self.domains[v] == Domain::Free {
                bound += 1;
            }
        }

        bound
    }
}
