// ==========================================
// 店铺排班系统 - 目标函数
// ==========================================
// 目标: 最大化总排班工时（= 满足的希望小时数）
// ==========================================

use crate::engine::model::{AssignmentMatrix, VarId, VariableModel};

/// 优化方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
}

/// 线性目标: Σ terms（系数均为 1）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    pub sense: Sense,
    pub terms: Vec<VarId>,
}

impl Objective {
    /// 最大化全部 (员工, 小时) 变量之和
    pub fn total_assigned_hours(variables: &VariableModel) -> Self {
        Self {
            sense: Sense::Maximize,
            terms: variables.all_vars().collect(),
        }
    }

    /// 在给定取值下的目标值
    pub fn evaluate(&self, values: &[bool]) -> u32 {
        self.terms
            .iter()
            .filter(|v| values.get(v.index()).copied().unwrap_or(false))
            .count() as u32
    }

    pub fn evaluate_matrix(&self, matrix: &AssignmentMatrix) -> u32 {
        self.terms.iter().filter(|v| matrix.value(**v)).count() as u32
    }
}
