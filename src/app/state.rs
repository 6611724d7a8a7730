// ==========================================
// 店铺排班系统 - 应用状态
// ==========================================
// 职责: 打开数据库、建表、装配仓储与 API 实例
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{AvailabilityApi, ScheduleApi, WorkerApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::repository::{
    AvailabilityRepository, DemandRepository, ScheduleRunRepository, ShiftBlockRepository,
    WorkerRepository,
};

/// 覆盖默认数据库路径的环境变量
pub const DB_PATH_ENV: &str = "SHIFT_SCHEDULER_DB_PATH";

/// 应用状态
///
/// 所有 API 共享同一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config: Arc<ConfigManager>,

    /// 员工管理API
    pub worker_api: Arc<WorkerApi>,

    /// 出勤希望API
    pub availability_api: Arc<AvailabilityApi>,

    /// 排班API
    pub schedule_api: Arc<ScheduleApi<ConfigManager>>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 返回
    /// - Ok(AppState): 已建表并装配完成
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        check_schema_version(&conn);

        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 从已初始化的连接装配（测试使用内存库时调用）
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        let config = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        let worker_repo = Arc::new(WorkerRepository::from_connection(conn.clone()));
        let availability_repo = Arc::new(AvailabilityRepository::from_connection(conn.clone()));
        let demand_repo = Arc::new(DemandRepository::from_connection(conn.clone()));
        let shift_block_repo = Arc::new(ShiftBlockRepository::from_connection(conn.clone()));
        let run_repo = Arc::new(ScheduleRunRepository::from_connection(conn));

        let worker_api = Arc::new(WorkerApi::new(worker_repo.clone()));
        let availability_api = Arc::new(AvailabilityApi::new(
            worker_repo.clone(),
            availability_repo.clone(),
        ));
        let schedule_api = Arc::new(ScheduleApi::new(
            config.clone(),
            worker_repo,
            availability_repo,
            demand_repo,
            shift_block_repo,
            run_repo,
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config,
            worker_api,
            availability_api,
            schedule_api,
        })
    }
}

fn check_schema_version(conn: &Connection) {
    match read_schema_version(conn) {
        Ok(Some(v)) if v == CURRENT_SCHEMA_VERSION => {}
        Ok(v) => tracing::warn!(
            found = ?v,
            expected = CURRENT_SCHEMA_VERSION,
            "数据库 schema_version 与当前版本不一致"
        ),
        Err(e) => tracing::warn!("读取 schema_version 失败: {}", e),
    }
}

/// 获取默认数据库路径
///
/// 优先读取环境变量 SHIFT_SCHEDULER_DB_PATH；否则放在用户数据目录下
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./shift_scheduler.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("shift-scheduler");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("shift_scheduler.db");
        }
    }

    path.to_string_lossy().to_string()
}
