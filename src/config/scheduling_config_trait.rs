// ==========================================
// 店铺排班系统 - 排班配置读取 Trait
// ==========================================
// 职责: 定义排班所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::demand::DemandProfile;
use crate::domain::types::{GapPolicy, OperatingHours};
use crate::engine::policy::{SchedulingPolicy, SolverLimits};
use async_trait::async_trait;
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// SchedulingConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）、测试中的 MockConfig
#[async_trait]
pub trait SchedulingConfigReader: Send + Sync {
    /// 营业时段 [open_hour, close_hour)
    ///
    /// # 默认值
    /// - [9, 23)
    async fn get_operating_hours(&self) -> ConfigResult<OperatingHours>;

    /// 每人每日工时上限
    ///
    /// # 默认值
    /// - 8
    async fn get_daily_max_hours(&self) -> ConfigResult<u32>;

    /// 默认需求人数曲线（不含按日期的覆写）
    ///
    /// # 默认值
    /// - 平时 1 人，12、13 点 2 人
    async fn get_demand_profile(&self) -> ConfigResult<DemandProfile>;

    /// 求解预算
    ///
    /// # 默认值
    /// - 10000ms，不限节点
    async fn get_solver_limits(&self) -> ConfigResult<SolverLimits>;

    /// 是否强制每人工时连续
    ///
    /// # 默认值
    /// - false
    async fn get_contiguous_shifts(&self) -> ConfigResult<bool>;

    /// 不连续结果的处理方式
    ///
    /// # 默认值
    /// - FLAG
    async fn get_gap_policy(&self) -> ConfigResult<GapPolicy>;

    /// 组装完整排班策略
    async fn load_policy(&self) -> ConfigResult<SchedulingPolicy> {
        Ok(SchedulingPolicy {
            operating_hours: self.get_operating_hours().await?,
            daily_max_hours: self.get_daily_max_hours().await?,
            contiguous_shifts: self.get_contiguous_shifts().await?,
            gap_policy: self.get_gap_policy().await?,
            limits: self.get_solver_limits().await?,
        })
    }
}
