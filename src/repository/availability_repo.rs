// ==========================================
// 店铺排班系统 - 出勤希望仓储
// ==========================================
// 红线: 每名员工每天一行（UNIQUE(worker_id, plan_date)），重复提交覆盖旧值
// ==========================================

use crate::domain::availability::AvailabilityEntry;
use crate::domain::types::WorkerId;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const UPSERT_SQL: &str = r#"
INSERT INTO availability_request (worker_id, plan_date, start_hour, end_hour, available)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (worker_id, plan_date) DO UPDATE SET
    start_hour = excluded.start_hour,
    end_hour   = excluded.end_hour,
    available  = excluded.available,
    updated_at = datetime('now')
"#;

pub struct AvailabilityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AvailabilityRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<AvailabilityEntry> {
        Ok(AvailabilityEntry {
            worker_id: row.get(0)?,
            plan_date: row.get(1)?,
            start_hour: row.get(2)?,
            end_hour: row.get(3)?,
            available: row.get::<_, i64>(4)? != 0,
        })
    }

    /// 提交或覆盖一条出勤希望
    pub fn upsert(&self, entry: &AvailabilityEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            UPSERT_SQL,
            params![
                entry.worker_id,
                entry.plan_date,
                entry.start_hour,
                entry.end_hour,
                entry.available as i64,
            ],
        )?;
        Ok(())
    }

    /// 批量提交（单事务，任一失败整体回滚）
    pub fn upsert_batch(&self, entries: &[AvailabilityEntry]) -> RepositoryResult<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(UPSERT_SQL)?;
            for entry in entries {
                stmt.execute(params![
                    entry.worker_id,
                    entry.plan_date,
                    entry.start_hour,
                    entry.end_hour,
                    entry.available as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(entries.len())
    }

    /// 某日全部出勤希望（按 worker_id 升序）
    pub fn find_by_date(&self, plan_date: NaiveDate) -> RepositoryResult<Vec<AvailabilityEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT worker_id, plan_date, start_hour, end_hour, available
            FROM availability_request
            WHERE plan_date = ?1
            ORDER BY worker_id ASC
            "#,
        )?;
        let entries = stmt
            .query_map(params![plan_date], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// 撤回某员工某日的希望，返回是否存在
    pub fn delete(&self, worker_id: WorkerId, plan_date: NaiveDate) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM availability_request WHERE worker_id = ?1 AND plan_date = ?2",
            params![worker_id, plan_date],
        )?;
        Ok(affected > 0)
    }
}
