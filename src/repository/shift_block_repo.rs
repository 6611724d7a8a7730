// ==========================================
// 店铺排班系统 - 确定班段仓储
// ==========================================
// 红线: 某日的班段只能整体替换（DELETE + INSERT 同一事务），
//       读取方永远看不到新旧班段混在一起
// ==========================================

use crate::domain::shift::ShiftBlock;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub struct ShiftBlockRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShiftBlockRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 整体替换某日的班段
    ///
    /// # 返回
    /// - Ok(usize): 写入的班段数
    /// - Err(ValidationError): 班段日期与 plan_date 不一致或区间非法（未写入任何数据）
    /// - Err: 数据库错误（事务回滚，旧班段保留）
    pub fn replace_for_date(&self, plan_date: NaiveDate, blocks: &[ShiftBlock]) -> RepositoryResult<usize> {
        if let Some(bad) = blocks
            .iter()
            .find(|b| b.plan_date != plan_date || b.start_hour >= b.end_hour)
        {
            return Err(RepositoryError::ValidationError(format!(
                "班段不合法: worker_id={}, date={}, [{}, {}), 目标日期={}",
                bad.worker_id, bad.plan_date, bad.start_hour, bad.end_hour, plan_date
            )));
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let removed = tx.execute(
            "DELETE FROM shift_block WHERE plan_date = ?1",
            params![plan_date],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO shift_block (worker_id, plan_date, start_hour, end_hour) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for block in blocks {
                stmt.execute(params![
                    block.worker_id,
                    block.plan_date,
                    block.start_hour,
                    block.end_hour,
                ])?;
            }
        }
        tx.commit()?;

        debug!(plan_date = %plan_date, removed, inserted = blocks.len(), "班段已替换");
        Ok(blocks.len())
    }

    /// 某日班段（按开始时间、员工升序）
    pub fn find_by_date(&self, plan_date: NaiveDate) -> RepositoryResult<Vec<ShiftBlock>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT worker_id, plan_date, start_hour, end_hour
            FROM shift_block
            WHERE plan_date = ?1
            ORDER BY start_hour ASC, worker_id ASC
            "#,
        )?;
        let blocks = stmt
            .query_map(params![plan_date], |row| {
                Ok(ShiftBlock {
                    worker_id: row.get(0)?,
                    plan_date: row.get(1)?,
                    start_hour: row.get(2)?,
                    end_hour: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(blocks)
    }
}
