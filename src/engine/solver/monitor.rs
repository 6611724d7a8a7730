// ==========================================
// 店铺排班系统 - 搜索监视器
// ==========================================
// 职责: 在搜索循环中施加时间/节点预算与外部取消
// 说明: 时钟每 check_interval 个节点检查一次，降低开销
// ==========================================

use crate::engine::model::CompiledModel;
use crate::engine::solver::result::SolverStatistics;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// 搜索停止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TimeLimit,
    NodeLimit,
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::TimeLimit => write!(f, "time limit"),
            StopReason::NodeLimit => write!(f, "node limit"),
            StopReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// 监视器返回给搜索循环的指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCommand {
    Continue,
    Stop(StopReason),
}

/// 搜索监视器
pub trait SearchMonitor: Send {
    /// 搜索开始前调用一次
    fn on_enter_search(&mut self, _model: &CompiledModel) {}

    /// 每个搜索节点开始时调用
    fn check_termination(&mut self, _stats: &SolverStatistics) -> SearchCommand {
        SearchCommand::Continue
    }

    /// 找到更优解时调用
    fn on_solution(&mut self, _objective: u32, _stats: &SolverStatistics) {}

    /// 搜索结束（穷尽或被停止）时调用
    fn on_exit_search(&mut self, _stats: &SolverStatistics) {}

    fn name(&self) -> &str;
}

impl fmt::Debug for dyn SearchMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}

// ==========================================
// CancelToken - 外部取消标志
// ==========================================
// 调用方放弃求解（例如请求超时）时置位；被取消的求解不会触发落库
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

// ==========================================
// TimeLimitMonitor - 墙钟时间预算
// ==========================================
pub struct TimeLimitMonitor {
    time_limit: Duration,
    start_time: Option<Instant>,
    check_interval: u64,
    ops_since_last_check: u64,
}

impl TimeLimitMonitor {
    pub fn new(time_limit: Duration, check_interval: u64) -> Self {
        Self {
            time_limit,
            start_time: None,
            check_interval: check_interval.max(1),
            ops_since_last_check: 0,
        }
    }

    pub fn with_default_check_interval(time_limit: Duration) -> Self {
        Self::new(time_limit, 1_000)
    }
}

impl SearchMonitor for TimeLimitMonitor {
    fn on_enter_search(&mut self, _model: &CompiledModel) {
        self.start_time = Some(Instant::now());
        self.ops_since_last_check = 0;
    }

    fn check_termination(&mut self, _stats: &SolverStatistics) -> SearchCommand {
        self.ops_since_last_check += 1;
        if self.ops_since_last_check < self.check_interval {
            return SearchCommand::Continue;
        }
        self.ops_since_last_check = 0;

        match self.start_time {
            Some(start) if start.elapsed() >= self.time_limit => {
                SearchCommand::Stop(StopReason::TimeLimit)
            }
            _ => SearchCommand::Continue,
        }
    }

    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }
}

// ==========================================
// NodeLimitMonitor - 节点预算
// ==========================================
pub struct NodeLimitMonitor {
    node_limit: u64,
}

impl NodeLimitMonitor {
    pub fn new(node_limit: u64) -> Self {
        Self { node_limit }
    }
}

impl SearchMonitor for NodeLimitMonitor {
    fn check_termination(&mut self, stats: &SolverStatistics) -> SearchCommand {
        if stats.nodes >= self.node_limit {
            SearchCommand::Stop(StopReason::NodeLimit)
        } else {
            SearchCommand::Continue
        }
    }

    fn name(&self) -> &str {
        "NodeLimitMonitor"
    }
}

// ==========================================
// InterruptMonitor - 外部取消
// ==========================================
pub struct InterruptMonitor {
    token: CancelToken,
}

impl InterruptMonitor {
    pub fn new(token: CancelToken) -> Self {
        Self { token }
    }
}

impl SearchMonitor for InterruptMonitor {
    fn check_termination(&mut self, _stats: &SolverStatistics) -> SearchCommand {
        if self.token.is_cancelled() {
            SearchCommand::Stop(StopReason::Cancelled)
        } else {
            SearchCommand::Continue
        }
    }

    fn name(&self) -> &str {
        "InterruptMonitor"
    }
}

// ==========================================
// LogMonitor - 解与结束时的 tracing 日志
// ==========================================
#[derive(Default)]
pub struct LogMonitor;

impl SearchMonitor for LogMonitor {
    fn on_solution(&mut self, objective: u32, stats: &SolverStatistics) {
        debug!(objective, nodes = stats.nodes, "找到更优解");
    }

    fn on_exit_search(&mut self, stats: &SolverStatistics) {
        debug!(
            nodes = stats.nodes,
            backtracks = stats.backtracks,
            solutions = stats.solutions,
            "搜索结束"
        );
    }

    fn name(&self) -> &str {
        "LogMonitor"
    }
}

// ==========================================
// CompositeMonitor - 组合多个监视器
// ==========================================
// 任一监视器要求停止即停止
#[derive(Default)]
pub struct CompositeMonitor {
    monitors: Vec<Box<dyn SearchMonitor>>,
}

impl CompositeMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<M: SearchMonitor + 'static>(&mut self, monitor: M) {
        self.monitors.push(Box::new(monitor));
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl SearchMonitor for CompositeMonitor {
    fn on_enter_search(&mut self, model: &CompiledModel) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(model);
        }
    }

    fn check_termination(&mut self, stats: &SolverStatistics) -> SearchCommand {
        for monitor in &mut self.monitors {
            if let SearchCommand::Stop(reason) = monitor.check_termination(stats) {
                return SearchCommand::Stop(reason);
            }
        }
        SearchCommand::Continue
    }

    fn on_solution(&mut self, objective: u32, stats: &SolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_solution(objective, stats);
        }
    }

    fn on_exit_search(&mut self, stats: &SolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search(stats);
        }
    }

    fn name(&self) -> &str {
        "CompositeMonitor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_limit_stops_at_limit() {
        let mut monitor = NodeLimitMonitor::new(3);
        let mut stats = SolverStatistics::default();
        stats.nodes = 2;
        assert_eq!(monitor.check_termination(&stats), SearchCommand::Continue);
        stats.nodes = 3;
        assert_eq!(
            monitor.check_termination(&stats),
            SearchCommand::Stop(StopReason::NodeLimit)
        );
    }

    #[test]
    fn test_cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let mut monitor = InterruptMonitor::new(token.clone());
        let stats = SolverStatistics::default();
        assert_eq!(monitor.check_termination(&stats), SearchCommand::Continue);

        token.cancel();
        assert_eq!(
            monitor.check_termination(&stats),
            SearchCommand::Stop(StopReason::Cancelled)
        );
    }

    #[test]
    fn test_time_limit_zero_stops_on_first_check() {
        let mut monitor = TimeLimitMonitor::new(Duration::ZERO, 1);
        monitor.start_time = Some(Instant::now());
        let stats = SolverStatistics::default();
        assert_eq!(
            monitor.check_termination(&stats),
            SearchCommand::Stop(StopReason::TimeLimit)
        );
    }

    #[test]
    fn test_composite_forwards_first_stop() {
        let token = CancelToken::new();
        token.cancel();
        let mut composite = CompositeMonitor::new();
        composite.add(NodeLimitMonitor::new(1_000));
        composite.add(InterruptMonitor::new(token));
        assert_eq!(composite.len(), 2);
        assert_eq!(
            composite.check_termination(&SolverStatistics::default()),
            SearchCommand::Stop(StopReason::Cancelled)
        );
    }
}
