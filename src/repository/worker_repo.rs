// ==========================================
// 店铺排班系统 - 员工仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::types::WorkerId;
use crate::domain::worker::Worker;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const WORKER_COLUMNS: &str = "worker_id, name, must_staff, max_hours_per_week, active";

// ==========================================
// WorkerRepository - 员工仓储
// ==========================================
pub struct WorkerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkerRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Worker> {
        Ok(Worker {
            worker_id: row.get(0)?,
            name: row.get(1)?,
            must_staff: row.get::<_, i64>(2)? != 0,
            max_hours_per_week: row.get(3)?,
            active: row.get::<_, i64>(4)? != 0,
        })
    }

    /// 新增员工，返回数据库分配的 worker_id
    ///
    /// 传入的 worker.worker_id 被忽略
    pub fn insert(&self, worker: &Worker) -> RepositoryResult<WorkerId> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO worker (name, must_staff, max_hours_per_week, active) VALUES (?1, ?2, ?3, ?4)",
            params![
                worker.name,
                worker.must_staff as i64,
                worker.max_hours_per_week,
                worker.active as i64,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, worker_id: WorkerId) -> RepositoryResult<Option<Worker>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM worker WHERE worker_id = ?1", WORKER_COLUMNS);
        let worker = conn
            .query_row(&sql, params![worker_id], Self::map_row)
            .optional()?;
        Ok(worker)
    }

    /// 参与排班的员工（按 worker_id 升序，决定求解时的员工顺序）
    pub fn list_active(&self) -> RepositoryResult<Vec<Worker>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM worker WHERE active = 1 ORDER BY worker_id ASC",
            WORKER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let workers = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(workers)
    }

    /// 启用/停用员工
    pub fn set_active(&self, worker_id: WorkerId, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE worker SET active = ?1 WHERE worker_id = ?2",
            params![active as i64, worker_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("员工", worker_id));
        }
        Ok(())
    }
}
