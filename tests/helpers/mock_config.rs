// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use shift_scheduler::config::{ConfigResult, SchedulingConfigReader};
use shift_scheduler::domain::{DemandProfile, GapPolicy, OperatingHours};
use shift_scheduler::engine::{SchedulingPolicy, SolverLimits};
use std::time::Duration;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub policy: SchedulingPolicy,
    pub demand: DemandProfile,
    /// 读取营业时段前的等待时间
    pub load_delay: Option<Duration>,
    /// 为 true 时求解预算读取失败
    pub broken: bool,
}

impl MockConfig {
    /// 创建默认配置（[9,23)、8 小时上限、标准需求曲线）
    pub fn default() -> Self {
        Self {
            policy: SchedulingPolicy::default(),
            demand: DemandProfile::standard(),
            load_delay: None,
            broken: false,
        }
    }

    pub fn with_demand(mut self, demand: DemandProfile) -> Self {
        self.demand = demand;
        self
    }

    pub fn with_operating_hours(mut self, open: u8, close: u8) -> Self {
        self.policy.operating_hours = OperatingHours::new(open, close);
        self
    }

    pub fn with_daily_max_hours(mut self, hours: u32) -> Self {
        self.policy.daily_max_hours = hours;
        self
    }

    pub fn with_contiguous(mut self, contiguous: bool) -> Self {
        self.policy.contiguous_shifts = contiguous;
        self
    }

    pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.policy.gap_policy = gap_policy;
        self
    }

    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.policy.limits = SolverLimits::unlimited().with_node_limit(nodes);
        self
    }

    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }
}

#[async_trait]
impl SchedulingConfigReader for MockConfig {
    async fn get_operating_hours(&self) -> ConfigResult<OperatingHours> {
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.policy.operating_hours)
    }

    async fn get_daily_max_hours(&self) -> ConfigResult<u32> {
        Ok(self.policy.daily_max_hours)
    }

    async fn get_demand_profile(&self) -> ConfigResult<DemandProfile> {
        Ok(self.demand.clone())
    }

    async fn get_solver_limits(&self) -> ConfigResult<SolverLimits> {
        if self.broken {
            return Err("solver_time_limit_ms 读取失败".into());
        }
        Ok(self.policy.limits)
    }

    async fn get_contiguous_shifts(&self) -> ConfigResult<bool> {
        Ok(self.policy.contiguous_shifts)
    }

    async fn get_gap_policy(&self) -> ConfigResult<GapPolicy> {
        Ok(self.policy.gap_policy)
    }
}
