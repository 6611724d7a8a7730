// ==========================================
// 店铺排班系统 - 员工管理 API
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::WorkerId;
use crate::domain::worker::Worker;
use crate::repository::worker_repo::WorkerRepository;
use std::sync::Arc;
use tracing::info;

pub struct WorkerApi {
    worker_repo: Arc<WorkerRepository>,
}

impl WorkerApi {
    pub fn new(worker_repo: Arc<WorkerRepository>) -> Self {
        Self { worker_repo }
    }

    /// 登记员工，返回 worker_id
    pub fn register(&self, name: &str, must_staff: bool) -> ApiResult<WorkerId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("员工姓名不能为空".to_string()));
        }

        let worker = Worker::new(0, name).with_must_staff(must_staff);
        let worker_id = self.worker_repo.insert(&worker)?;
        info!(worker_id, name, "员工已登记");
        Ok(worker_id)
    }

    pub fn get(&self, worker_id: WorkerId) -> ApiResult<Worker> {
        self.worker_repo
            .find_by_id(worker_id)?
            .ok_or_else(|| ApiError::NotFound(format!("员工(id={})不存在", worker_id)))
    }

    pub fn list_active(&self) -> ApiResult<Vec<Worker>> {
        Ok(self.worker_repo.list_active()?)
    }

    /// 停用后不再参与排班（历史班段保留）
    pub fn set_active(&self, worker_id: WorkerId, active: bool) -> ApiResult<()> {
        self.worker_repo.set_active(worker_id, active)?;
        info!(worker_id, active, "员工状态已更新");
        Ok(())
    }
}
