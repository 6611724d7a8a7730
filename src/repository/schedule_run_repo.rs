// ==========================================
// 店铺排班系统 - 求解记录仓储
// ==========================================
// 红线: 只追加，不修改、不删除
// ==========================================

use crate::domain::schedule_run::ScheduleRun;
use crate::domain::types::ScheduleRunStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct ScheduleRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRunRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ScheduleRun> {
        let status_raw: String = row.get(2)?;
        let status = ScheduleRunStatus::parse(&status_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                format!("未知的求解状态: {}", status_raw).into(),
            )
        })?;
        let stats_json = row
            .get::<_, Option<String>>(8)?
            .and_then(|s| serde_json::from_str(&s).ok());

        Ok(ScheduleRun {
            run_id: row.get(0)?,
            plan_date: row.get(1)?,
            status,
            objective: row.get(3)?,
            optimal: row.get::<_, i64>(4)? != 0,
            gap_count: row.get(5)?,
            elapsed_ms: row.get::<_, i64>(6)?.max(0) as u64,
            message: row.get(7)?,
            stats_json,
            created_at: row.get(9)?,
        })
    }

    /// 追加一条求解记录，返回 run_id
    pub fn insert(&self, run: &ScheduleRun) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO schedule_run (
                run_id, plan_date, status, objective, optimal,
                gap_count, elapsed_ms, message, stats_json, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                run.run_id,
                run.plan_date,
                run.status.as_str(),
                run.objective,
                run.optimal as i64,
                run.gap_count,
                run.elapsed_ms as i64,
                run.message,
                run.stats_json.as_ref().map(|v| v.to_string()),
                run.created_at,
            ],
        )?;
        Ok(run.run_id.clone())
    }

    /// 某日的求解记录（最新在前）
    pub fn find_by_date(&self, plan_date: NaiveDate) -> RepositoryResult<Vec<ScheduleRun>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, plan_date, status, objective, optimal,
                   gap_count, elapsed_ms, message, stats_json, created_at
            FROM schedule_run
            WHERE plan_date = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )?;
        let runs = stmt
            .query_map(params![plan_date], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(runs)
    }
}
