// ==========================================
// 店铺排班系统 - 出勤希望提交 API
// ==========================================
// 职责: 员工提交/撤回出勤希望（单日或日历批量）
// 红线: 格式错误的窗口在录入时拒绝，不进入求解
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::availability::AvailabilityEntry;
use crate::domain::types::{Hour, WorkerId};
use crate::repository::availability_repo::AvailabilityRepository;
use crate::repository::worker_repo::WorkerRepository;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct AvailabilityApi {
    worker_repo: Arc<WorkerRepository>,
    availability_repo: Arc<AvailabilityRepository>,
}

impl AvailabilityApi {
    pub fn new(
        worker_repo: Arc<WorkerRepository>,
        availability_repo: Arc<AvailabilityRepository>,
    ) -> Self {
        Self {
            worker_repo,
            availability_repo,
        }
    }

    fn ensure_worker_exists(&self, worker_id: WorkerId) -> ApiResult<()> {
        match self.worker_repo.find_by_id(worker_id)? {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound(format!("员工(id={})不存在", worker_id))),
        }
    }

    fn validate(entry: &AvailabilityEntry) -> ApiResult<()> {
        entry.validate().map_err(|v| {
            ApiError::InvalidInput(format!(
                "出勤窗口格式错误: worker_id={}, date={}, {}",
                entry.worker_id, entry.plan_date, v
            ))
        })
    }

    /// 提交一条出勤希望（同一员工同一天重复提交时覆盖）
    #[instrument(skip(self, entry), fields(worker_id = entry.worker_id, plan_date = %entry.plan_date))]
    pub fn submit(&self, entry: &AvailabilityEntry) -> ApiResult<()> {
        Self::validate(entry)?;
        self.ensure_worker_exists(entry.worker_id)?;
        self.availability_repo.upsert(entry)?;
        info!(available = entry.available, start = entry.start_hour, end = ?entry.end_hour, "出勤希望已提交");
        Ok(())
    }

    /// 日历批量提交：同一窗口应用到多个日期（单事务）
    ///
    /// 日期去重后写入；返回写入条数
    pub fn submit_batch(
        &self,
        worker_id: WorkerId,
        dates: &[NaiveDate],
        start_hour: Hour,
        end_hour: Option<Hour>,
    ) -> ApiResult<usize> {
        if dates.is_empty() {
            return Err(ApiError::InvalidInput("至少选择一个日期".to_string()));
        }
        self.ensure_worker_exists(worker_id)?;

        let unique: BTreeSet<NaiveDate> = dates.iter().copied().collect();
        let entries: Vec<AvailabilityEntry> = unique
            .into_iter()
            .map(|date| AvailabilityEntry::available(worker_id, date, start_hour, end_hour))
            .collect();
        for entry in &entries {
            Self::validate(entry)?;
        }

        let written = self.availability_repo.upsert_batch(&entries)?;
        info!(worker_id, written, "出勤希望批量提交完成");
        Ok(written)
    }

    /// 撤回出勤希望（撤回后该员工当天视为不可出勤）
    pub fn withdraw(&self, worker_id: WorkerId, plan_date: NaiveDate) -> ApiResult<bool> {
        Ok(self.availability_repo.delete(worker_id, plan_date)?)
    }

    pub fn list_for_date(&self, plan_date: NaiveDate) -> ApiResult<Vec<AvailabilityEntry>> {
        Ok(self.availability_repo.find_by_date(plan_date)?)
    }
}
