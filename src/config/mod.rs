// ==========================================
// 店铺排班系统 - 配置层
// ==========================================
// 职责: 排班策略配置（营业时段、工时上限、需求曲线、求解预算）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod scheduling_config_trait;

pub use config_manager::{config_keys, ConfigManager};
pub use scheduling_config_trait::{ConfigResult, SchedulingConfigReader};
