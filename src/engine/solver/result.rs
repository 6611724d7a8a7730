// ==========================================
// 店铺排班系统 - 求解结果
// ==========================================

use crate::engine::model::AssignmentMatrix;
use crate::engine::solver::monitor::StopReason;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// 搜索统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolverStatistics {
    pub nodes: u64,       // 访问节点数
    pub backtracks: u64,  // 回溯次数
    pub solutions: u64,   // 改进解次数
    pub root_bound: u32,  // 根节点目标上界
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    /// 已证明最优
    Optimal(AssignmentMatrix),
    /// 找到可行解，但预算内未证明最优
    Feasible(AssignmentMatrix),
    /// 已证明无可行解
    Infeasible,
    /// 预算耗尽，既无可行解也未证明无解
    Unknown,
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchResult::Optimal(m) => write!(f, "Optimal(objective={})", m.total_assigned()),
            SearchResult::Feasible(m) => write!(f, "Feasible(objective={})", m.total_assigned()),
            SearchResult::Infeasible => write!(f, "Infeasible"),
            SearchResult::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    OptimalityProven,
    InfeasibilityProven,
    Aborted(StopReason),
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "Optimality Proven"),
            TerminationReason::InfeasibilityProven => write!(f, "Infeasibility Proven"),
            TerminationReason::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOutcome {
    pub result: SearchResult,
    pub reason: TerminationReason,
    pub statistics: SolverStatistics,
}

impl SolverOutcome {
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SearchResult::Optimal(_))
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self.result, SearchResult::Infeasible)
    }

    pub fn was_cancelled(&self) -> bool {
        self.reason == TerminationReason::Aborted(StopReason::Cancelled)
    }
}
