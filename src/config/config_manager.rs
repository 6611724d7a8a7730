// ==========================================
// 店铺排班系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (scope_id = 'global')
// 说明: 配置值格式错误时回退默认值并告警；越界值交给引擎校验拒绝
// ==========================================

use crate::config::scheduling_config_trait::{ConfigResult, SchedulingConfigReader};
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::demand::{DemandProfile, DEFAULT_MIN_STAFF, DEFAULT_PEAK_HOURS, DEFAULT_PEAK_MIN_STAFF};
use crate::domain::types::{GapPolicy, Hour, OperatingHours};
use crate::engine::policy::{SolverLimits, DEFAULT_DAILY_MAX_HOURS, DEFAULT_TIME_LIMIT_MS};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 打开数据库文件创建 ConfigManager
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager（会再次应用统一 PRAGMA，幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
            ON CONFLICT (scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取并解析配置值；缺失或格式错误时返回默认值
    fn get_parsed_or<T: FromStr>(&self, key: &str, default: T) -> ConfigResult<T> {
        let raw = match self.get_global_config_value(key)? {
            Some(raw) => raw,
            None => return Ok(default),
        };
        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }

    fn get_peak_hours(&self) -> ConfigResult<Vec<Hour>> {
        let raw = match self.get_global_config_value(config_keys::PEAK_HOURS)? {
            Some(raw) => raw,
            None => return Ok(DEFAULT_PEAK_HOURS.to_vec()),
        };
        match serde_json::from_str::<Vec<Hour>>(&raw) {
            Ok(hours) => Ok(hours),
            Err(_) => {
                warn!(
                    config_key = config_keys::PEAK_HOURS,
                    raw_value = %raw,
                    "高峰时段配置格式错误，使用默认值"
                );
                Ok(DEFAULT_PEAK_HOURS.to_vec())
            }
        }
    }
}

// ==========================================
// SchedulingConfigReader 实现
// ==========================================
#[async_trait]
impl SchedulingConfigReader for ConfigManager {
    async fn get_operating_hours(&self) -> ConfigResult<OperatingHours> {
        let default = OperatingHours::default();
        let open = self.get_parsed_or(config_keys::OPEN_HOUR, default.open)?;
        let close = self.get_parsed_or(config_keys::CLOSE_HOUR, default.close)?;
        Ok(OperatingHours::new(open, close))
    }

    async fn get_daily_max_hours(&self) -> ConfigResult<u32> {
        self.get_parsed_or(config_keys::DAILY_MAX_HOURS, DEFAULT_DAILY_MAX_HOURS)
    }

    async fn get_demand_profile(&self) -> ConfigResult<DemandProfile> {
        let default_min = self.get_parsed_or(config_keys::DEFAULT_MIN_STAFF, DEFAULT_MIN_STAFF)?;
        let peak_min = self.get_parsed_or(config_keys::PEAK_MIN_STAFF, DEFAULT_PEAK_MIN_STAFF)?;
        let peak_hours = self.get_peak_hours()?;
        Ok(DemandProfile::uniform(default_min).with_peak(peak_hours, peak_min))
    }

    async fn get_solver_limits(&self) -> ConfigResult<SolverLimits> {
        let time_ms = self.get_parsed_or(config_keys::SOLVER_TIME_LIMIT_MS, DEFAULT_TIME_LIMIT_MS)?;
        let nodes = self.get_parsed_or(config_keys::SOLVER_NODE_LIMIT, 0u64)?;

        // 0 表示不限
        let mut limits = SolverLimits::unlimited();
        if time_ms > 0 {
            limits = limits.with_time_limit(Duration::from_millis(time_ms));
        }
        if nodes > 0 {
            limits = limits.with_node_limit(nodes);
        }
        Ok(limits)
    }

    async fn get_contiguous_shifts(&self) -> ConfigResult<bool> {
        self.get_parsed_or(config_keys::CONTIGUOUS_SHIFTS, false)
    }

    async fn get_gap_policy(&self) -> ConfigResult<GapPolicy> {
        let raw = self.get_global_config_value(config_keys::GAP_POLICY)?;
        Ok(match raw {
            Some(raw) => GapPolicy::parse(&raw).unwrap_or_else(|| {
                warn!(config_key = config_keys::GAP_POLICY, raw_value = %raw, "断档策略配置错误，使用 FLAG");
                GapPolicy::default()
            }),
            None => GapPolicy::default(),
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 营业时段
    pub const OPEN_HOUR: &str = "open_hour";
    pub const CLOSE_HOUR: &str = "close_hour";

    // 工时
    pub const DAILY_MAX_HOURS: &str = "daily_max_hours";

    // 需求人数
    pub const DEFAULT_MIN_STAFF: &str = "default_min_staff";
    pub const PEAK_HOURS: &str = "peak_hours"; // JSON 数组，如 [12,13]
    pub const PEAK_MIN_STAFF: &str = "peak_min_staff";

    // 求解预算（0 = 不限）
    pub const SOLVER_TIME_LIMIT_MS: &str = "solver_time_limit_ms";
    pub const SOLVER_NODE_LIMIT: &str = "solver_node_limit";

    // 连续工时
    pub const CONTIGUOUS_SHIFTS: &str = "contiguous_shifts";
    pub const GAP_POLICY: &str = "gap_policy"; // FLAG / REJECT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_empty_table_yields_default_policy() {
        let policy = manager().load_policy().await.unwrap();
        assert_eq!(policy, crate::engine::policy::SchedulingPolicy::default());
    }

    #[tokio::test]
    async fn test_overrides_and_malformed_fallback() {
        let config = manager();
        config.set_global_config_value(config_keys::CLOSE_HOUR, "21").unwrap();
        config.set_global_config_value(config_keys::DAILY_MAX_HOURS, "six").unwrap();
        config.set_global_config_value(config_keys::PEAK_HOURS, "[18, 19]").unwrap();
        config.set_global_config_value(config_keys::SOLVER_TIME_LIMIT_MS, "0").unwrap();
        config.set_global_config_value(config_keys::GAP_POLICY, "reject").unwrap();

        let policy = config.load_policy().await.unwrap();
        assert_eq!(policy.operating_hours, OperatingHours::new(9, 21));
        assert_eq!(policy.daily_max_hours, DEFAULT_DAILY_MAX_HOURS);
        assert_eq!(policy.limits.time_limit, None);
        assert_eq!(policy.gap_policy, GapPolicy::Reject);

        let demand = config.get_demand_profile().await.unwrap();
        assert_eq!(demand.required(12), 1);
        assert_eq!(demand.required(18), 2);
    }
}
