// ==========================================
// 店铺排班系统 - 应用层
// ==========================================
// 职责: 装配仓储/API，供命令行入口使用
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
