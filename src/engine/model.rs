// ==========================================
// 店铺排班系统 - 变量模型
// ==========================================
// 职责: 为每个 (员工, 小时) 建立一个布尔决策变量；承载编译后的约束与目标
// 红线: 不得省略任何变量，即使员工没有提交希望（由约束固定为 0）
// ==========================================

use crate::domain::types::{Hour, OperatingHours, WorkerId};
use crate::domain::worker::Worker;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::objective::Objective;
use std::fmt;

// ==========================================
// VarId - 决策变量索引
// ==========================================
// 按员工优先排列: index = worker_index * hour_count + hour_offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

// ==========================================
// VariableModel - 变量集合 W × H
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableModel {
    worker_ids: Vec<WorkerId>,
    hours: OperatingHours,
}

impl VariableModel {
    /// 建立变量集合
    ///
    /// # 返回
    /// - Ok(VariableModel): |W| × |H| 个变量
    /// - Err(InvalidInput): W 或 H 为空
    pub fn build(workers: &[Worker], hours: OperatingHours) -> EngineResult<Self> {
        if workers.is_empty() {
            return Err(EngineError::invalid_input("员工集合为空，无法建立变量"));
        }
        if hours.is_empty() {
            return Err(EngineError::invalid_input(format!(
                "营业时段为空，无法建立变量: {}",
                hours
            )));
        }
        Ok(Self {
            worker_ids: workers.iter().map(|w| w.worker_id).collect(),
            hours,
        })
    }

    pub fn worker_ids(&self) -> &[WorkerId] {
        &self.worker_ids
    }

    pub fn worker_count(&self) -> usize {
        self.worker_ids.len()
    }

    pub fn hours(&self) -> OperatingHours {
        self.hours
    }

    pub fn hour_count(&self) -> usize {
        self.hours.len()
    }

    pub fn var_count(&self) -> usize {
        self.worker_count() * self.hour_count()
    }

    /// (员工序号, 小时) 对应的变量；小时不在营业时段内时为 None
    pub fn var(&self, worker_index: usize, hour: Hour) -> Option<VarId> {
        if worker_index >= self.worker_count() {
            return None;
        }
        self.hours
            .offset_of(hour)
            .map(|offset| VarId(worker_index * self.hour_count() + offset))
    }

    /// 某员工按小时升序的全部变量
    pub fn worker_vars(&self, worker_index: usize) -> Vec<VarId> {
        let n = self.hour_count();
        (0..n).map(|offset| VarId(worker_index * n + offset)).collect()
    }

    /// 某小时所有员工的变量
    pub fn hour_vars(&self, hour: Hour) -> Vec<VarId> {
        match self.hours.offset_of(hour) {
            Some(offset) => {
                let n = self.hour_count();
                (0..self.worker_count())
                    .map(|w| VarId(w * n + offset))
                    .collect()
            }
            None => Vec::new(),
        }
    }

    /// 全部变量
    pub fn all_vars(&self) -> impl Iterator<Item = VarId> {
        (0..self.var_count()).map(VarId)
    }

    /// 变量反查 (员工序号, 小时)
    pub fn locate(&self, var: VarId) -> (usize, Hour) {
        let n = self.hour_count();
        let worker_index = var.0 / n;
        let offset = var.0 % n;
        (worker_index, self.hours.open + offset as Hour)
    }
}

// ==========================================
// ModelConstraint - 布尔线性约束
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelConstraint {
    /// 变量固定为给定值
    Fix { var: VarId, value: bool },
    /// Σ vars ≥ min
    AtLeast { vars: Vec<VarId>, min: u32 },
    /// Σ vars ≤ max
    AtMost { vars: Vec<VarId>, max: u32 },
    /// 取值为 1 的变量在给定顺序下必须连续
    Contiguous { vars: Vec<VarId> },
}

impl ModelConstraint {
    /// 约束涉及的变量
    pub fn vars(&self) -> &[VarId] {
        match self {
            ModelConstraint::Fix { var, .. } => std::slice::from_ref(var),
            ModelConstraint::AtLeast { vars, .. }
            | ModelConstraint::AtMost { vars, .. }
            | ModelConstraint::Contiguous { vars } => vars,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelConstraint::Fix { .. } => "fix",
            ModelConstraint::AtLeast { .. } => "at_least",
            ModelConstraint::AtMost { .. } => "at_most",
            ModelConstraint::Contiguous { .. } => "contiguous",
        }
    }
}

// ==========================================
// CompiledModel - 可求解模型
// ==========================================
#[derive(Debug, Clone)]
pub struct CompiledModel {
    pub variables: VariableModel,
    pub constraints: Vec<ModelConstraint>,
    pub objective: Objective,
}

impl CompiledModel {
    pub fn new(
        variables: VariableModel,
        constraints: Vec<ModelConstraint>,
        objective: Objective,
    ) -> Self {
        Self {
            variables,
            constraints,
            objective,
        }
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

// ==========================================
// AssignmentMatrix - 求解结果矩阵
// ==========================================
// 生命周期: 仅在一次求解内存在，还原为班段后丢弃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentMatrix {
    variables: VariableModel,
    values: Vec<bool>,
}

impl AssignmentMatrix {
    pub fn new(variables: VariableModel, values: Vec<bool>) -> Self {
        debug_assert_eq!(values.len(), variables.var_count());
        Self { variables, values }
    }

    pub fn variables(&self) -> &VariableModel {
        &self.variables
    }

    pub fn value(&self, var: VarId) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }

    /// (员工序号, 小时) 是否排班
    pub fn is_assigned(&self, worker_index: usize, hour: Hour) -> bool {
        self.variables
            .var(worker_index, hour)
            .map(|v| self.value(v))
            .unwrap_or(false)
    }

    /// 某员工的排班小时（升序）
    pub fn assigned_hours(&self, worker_index: usize) -> Vec<Hour> {
        self.variables
            .hours()
            .iter()
            .filter(|h| self.is_assigned(worker_index, *h))
            .collect()
    }

    /// 某小时的在岗人数
    pub fn headcount(&self, hour: Hour) -> u32 {
        self.variables
            .hour_vars(hour)
            .into_iter()
            .filter(|v| self.value(*v))
            .count() as u32
    }

    /// 总排班工时（目标值）
    pub fn total_assigned(&self) -> u32 {
        self.values.iter().filter(|v| **v).count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workers(n: usize) -> Vec<Worker> {
        (0..n)
            .map(|i| Worker::new(i as WorkerId + 1, format!("W{}", i + 1)))
            .collect()
    }

    #[test]
    fn test_one_variable_per_worker_hour() {
        let model = VariableModel::build(&workers(3), OperatingHours::default()).unwrap();
        assert_eq!(model.var_count(), 3 * 14);
        assert_eq!(model.all_vars().count(), 42);
        assert_eq!(model.worker_vars(1).len(), 14);
        assert_eq!(model.hour_vars(12).len(), 3);
        assert!(model.hour_vars(23).is_empty());
    }

    #[test]
    fn test_var_locate_is_consistent() {
        let model = VariableModel::build(&workers(2), OperatingHours::new(9, 12)).unwrap();
        for w in 0..2 {
            for h in 9..12 {
                let var = model.var(w, h).unwrap();
                assert_eq!(model.locate(var), (w, h));
            }
        }
        assert_eq!(model.var(0, 12), None);
        assert_eq!(model.var(2, 9), None);
    }

    #[test]
    fn test_build_rejects_empty_inputs() {
        assert!(matches!(
            VariableModel::build(&[], OperatingHours::default()),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            VariableModel::build(&workers(1), OperatingHours::new(10, 10)),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_matrix_queries() {
        let model = VariableModel::build(&workers(2), OperatingHours::new(9, 13)).unwrap();
        // W1: 9,10  W2: 10,12
        let values = vec![true, true, false, false, false, true, false, true];
        let matrix = AssignmentMatrix::new(model, values);

        assert_eq!(matrix.assigned_hours(0), vec![9, 10]);
        assert_eq!(matrix.assigned_hours(1), vec![10, 12]);
        assert_eq!(matrix.headcount(10), 2);
        assert_eq!(matrix.headcount(11), 0);
        assert_eq!(matrix.total_assigned(), 4);
    }
}
