// ==========================================
// 店铺排班系统 - 需求人数覆写仓储
// ==========================================
// 职责: 按日期/小时覆写默认需求人数（例如促销日加人）
// ==========================================

use crate::domain::types::Hour;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct DemandRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DemandRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn set_override(&self, plan_date: NaiveDate, hour: Hour, min_staff: u32) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO demand_override (plan_date, hour, min_staff) VALUES (?1, ?2, ?3)
            ON CONFLICT (plan_date, hour) DO UPDATE SET min_staff = excluded.min_staff
            "#,
            params![plan_date, hour, min_staff],
        )?;
        Ok(())
    }

    /// 某日的全部覆写: hour -> min_staff
    pub fn find_overrides(&self, plan_date: NaiveDate) -> RepositoryResult<BTreeMap<Hour, u32>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT hour, min_staff FROM demand_override WHERE plan_date = ?1 ORDER BY hour",
        )?;
        let overrides = stmt
            .query_map(params![plan_date], |row| Ok((row.get::<_, Hour>(0)?, row.get::<_, u32>(1)?)))?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;
        Ok(overrides)
    }

    /// 清除某日覆写，返回删除行数
    pub fn clear_overrides(&self, plan_date: NaiveDate) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM demand_override WHERE plan_date = ?1",
            params![plan_date],
        )?;
        Ok(affected)
    }
}
