// ==========================================
// 店铺排班系统 - 排班 API
// ==========================================
// 职责: 单日排班用例（加载输入 → 求解 → 整体替换班段 → 记录求解）
// 红线:
// - 同一日期同时只允许一次排班，后到者直接拒绝（ScheduleInProgress）
// - 只有求解成功才写班段；失败/取消/超时一律不动已有班段
// - 每次尝试都写 schedule_run 记录
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::SchedulingConfigReader;
use crate::domain::availability::AvailabilityEntry;
use crate::domain::demand::DemandProfile;
use crate::domain::schedule_run::ScheduleRun;
use crate::domain::shift::ShiftBlock;
use crate::domain::types::{Hour, ScheduleRunStatus};
use crate::domain::worker::Worker;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::orchestrator::{DailySchedule, ShiftScheduler};
use crate::engine::policy::SchedulingPolicy;
use crate::engine::problem::ScheduleProblem;
use crate::engine::solver::CancelToken;
use crate::repository::{
    AvailabilityRepository, DemandRepository, ScheduleRunRepository, ShiftBlockRepository,
    WorkerRepository,
};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

// ==========================================
// DateGuard - 单日排班占位
// ==========================================
// 持有期间同一日期的其他排班请求被拒绝；Drop 时释放
pub(crate) struct DateGuard {
    in_flight: Arc<Mutex<HashSet<NaiveDate>>>,
    plan_date: NaiveDate,
}

impl Drop for DateGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.in_flight.lock() {
            set.remove(&self.plan_date);
        }
    }
}

// 单日求解所需的全部输入
struct DailyInputs {
    policy: SchedulingPolicy,
    demand: DemandProfile,
    workers: Vec<Worker>,
    entries: Vec<AvailabilityEntry>,
}

// ==========================================
// ScheduleApi - 排班 API
// ==========================================
pub struct ScheduleApi<C>
where
    C: SchedulingConfigReader,
{
    config: Arc<C>,
    worker_repo: Arc<WorkerRepository>,
    availability_repo: Arc<AvailabilityRepository>,
    demand_repo: Arc<DemandRepository>,
    shift_block_repo: Arc<ShiftBlockRepository>,
    run_repo: Arc<ScheduleRunRepository>,
    scheduler: ShiftScheduler,
    in_flight: Arc<Mutex<HashSet<NaiveDate>>>,
}

impl<C> ScheduleApi<C>
where
    C: SchedulingConfigReader + 'static,
{
    pub fn new(
        config: Arc<C>,
        worker_repo: Arc<WorkerRepository>,
        availability_repo: Arc<AvailabilityRepository>,
        demand_repo: Arc<DemandRepository>,
        shift_block_repo: Arc<ShiftBlockRepository>,
        run_repo: Arc<ScheduleRunRepository>,
    ) -> Self {
        Self {
            config,
            worker_repo,
            availability_repo,
            demand_repo,
            shift_block_repo,
            run_repo,
            scheduler: ShiftScheduler::new(),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub(crate) fn acquire_date(&self, plan_date: NaiveDate) -> ApiResult<DateGuard> {
        let mut set = self
            .in_flight
            .lock()
            .map_err(|e| ApiError::InternalError(format!("排班占位锁获取失败: {}", e)))?;
        if !set.insert(plan_date) {
            return Err(ApiError::ScheduleInProgress(plan_date));
        }
        Ok(DateGuard {
            in_flight: self.in_flight.clone(),
            plan_date,
        })
    }

    // ==========================================
    // 排班用例
    // ==========================================

    /// 求解某日排班并落库
    ///
    /// # 返回
    /// - Ok(DailySchedule): 已整体替换该日班段
    /// - Err(ScheduleInProgress): 同一日期已有排班在进行
    /// - Err(InvalidInput / Infeasible / ResourceExhausted / NonContiguousAssignment):
    ///   该日班段保持不变
    pub async fn run_daily_schedule(&self, plan_date: NaiveDate) -> ApiResult<DailySchedule> {
        let _guard = self.acquire_date(plan_date)?;
        self.execute(plan_date, CancelToken::new()).await
    }

    /// 带超时的排班：超时即取消求解并返回 Timeout，不写班段
    pub async fn run_daily_schedule_with_timeout(
        &self,
        plan_date: NaiveDate,
        timeout: Duration,
    ) -> ApiResult<DailySchedule> {
        let _guard = self.acquire_date(plan_date)?;
        let token = CancelToken::new();
        let started = Instant::now();

        match tokio::time::timeout(timeout, self.execute(plan_date, token.clone())).await {
            Ok(result) => result,
            Err(_) => {
                token.cancel();
                let timeout_ms = timeout.as_millis() as u64;
                warn!(plan_date = %plan_date, timeout_ms, "排班超时，已取消求解");
                self.record_run(
                    ScheduleRun::new(plan_date, ScheduleRunStatus::Cancelled)
                        .with_elapsed_ms(started.elapsed().as_millis() as u64)
                        .with_message(format!("超时取消: timeout_ms={}", timeout_ms)),
                );
                Err(ApiError::Timeout {
                    plan_date,
                    timeout_ms,
                })
            }
        }
    }

    #[instrument(skip(self, token), fields(plan_date = %plan_date))]
    async fn execute(&self, plan_date: NaiveDate, token: CancelToken) -> ApiResult<DailySchedule> {
        let started = Instant::now();

        // ===== 1. 加载输入 =====
        let inputs = match self.load_inputs(plan_date).await {
            Ok(inputs) => inputs,
            Err(err) => {
                warn!(error = %err, "排班输入加载失败");
                self.record_run(
                    ScheduleRun::new(plan_date, ScheduleRunStatus::Failed)
                        .with_elapsed_ms(started.elapsed().as_millis() as u64)
                        .with_message(err.to_string()),
                );
                return Err(err);
            }
        };
        let DailyInputs {
            policy,
            demand,
            workers,
            entries,
        } = inputs;

        info!(
            worker_count = workers.len(),
            entry_count = entries.len(),
            override_count = demand.overrides.len(),
            "排班输入已加载"
        );

        // ===== 2. 求解（阻塞线程） =====
        let scheduler = self.scheduler;
        let solve_token = token.clone();
        let outcome = tokio::task::spawn_blocking(move || -> EngineResult<DailySchedule> {
            let problem = ScheduleProblem::new(plan_date, &workers, &entries, &demand, &policy)?;
            scheduler.schedule_day_with_cancel(&problem, &solve_token)
        })
        .await
        .map_err(|e| ApiError::InternalError(format!("求解线程异常: {}", e)))?;

        let elapsed_ms = started.elapsed().as_millis() as u64;

        // ===== 3. 落库 / 记录 =====
        match outcome {
            Ok(schedule) => {
                if token.is_cancelled() {
                    return Err(ApiError::Cancelled(plan_date));
                }
                self.commit(&schedule, elapsed_ms)?;
                info!(
                    objective = schedule.total_assigned_hours,
                    optimal = schedule.optimal,
                    block_count = schedule.blocks.len(),
                    elapsed_ms,
                    "排班已落库"
                );
                Ok(schedule)
            }
            Err(err) => {
                self.record_run(
                    ScheduleRun::new(plan_date, run_status_of(&err))
                        .with_elapsed_ms(elapsed_ms)
                        .with_message(err.to_string()),
                );
                Err(err.into())
            }
        }
    }

    /// 整体替换该日班段并写成功记录；optimal=false 表示预算内的最好可行解
    fn commit(&self, schedule: &DailySchedule, elapsed_ms: u64) -> ApiResult<()> {
        self.shift_block_repo
            .replace_for_date(schedule.plan_date, &schedule.blocks)?;
        self.record_run(
            ScheduleRun::new(schedule.plan_date, ScheduleRunStatus::Solved)
                .with_objective(schedule.total_assigned_hours, schedule.optimal)
                .with_gap_count(schedule.gaps.len() as u32)
                .with_elapsed_ms(elapsed_ms)
                .with_stats(&schedule.statistics),
        );
        Ok(())
    }

    async fn load_inputs(&self, plan_date: NaiveDate) -> ApiResult<DailyInputs> {
        let policy = self
            .config
            .load_policy()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let mut demand = self
            .config
            .get_demand_profile()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        for (hour, min) in self.demand_repo.find_overrides(plan_date)? {
            demand = demand.with_override(hour, min);
        }

        let workers = self.worker_repo.list_active()?;
        let active: HashSet<_> = workers.iter().map(|w| w.worker_id).collect();
        let entries = self
            .availability_repo
            .find_by_date(plan_date)?
            .into_iter()
            .filter(|e| active.contains(&e.worker_id))
            .collect();

        Ok(DailyInputs {
            policy,
            demand,
            workers,
            entries,
        })
    }

    /// 写求解记录；记录失败只告警，不覆盖求解结果
    fn record_run(&self, run: ScheduleRun) {
        if let Err(e) = self.run_repo.insert(&run) {
            warn!(run_id = %run.run_id, error = %e, "求解记录写入失败");
        }
    }

    // ==========================================
    // 需求覆写
    // ==========================================

    /// 覆写某日某小时的最少人数；小时必须落在当前营业时段内
    pub async fn set_demand_override(
        &self,
        plan_date: NaiveDate,
        hour: Hour,
        min_staff: u32,
    ) -> ApiResult<()> {
        let hours = self
            .config
            .get_operating_hours()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        if !hours.contains(hour) {
            return Err(ApiError::InvalidInput(format!(
                "{}时不在营业时段 {} 内",
                hour, hours
            )));
        }
        self.demand_repo.set_override(plan_date, hour, min_staff)?;
        info!(plan_date = %plan_date, hour, min_staff, "需求覆写已保存");
        Ok(())
    }

    pub fn clear_demand_overrides(&self, plan_date: NaiveDate) -> ApiResult<usize> {
        Ok(self.demand_repo.clear_overrides(plan_date)?)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_schedule(&self, plan_date: NaiveDate) -> ApiResult<Vec<ShiftBlock>> {
        Ok(self.shift_block_repo.find_by_date(plan_date)?)
    }

    pub fn list_runs(&self, plan_date: NaiveDate) -> ApiResult<Vec<ScheduleRun>> {
        Ok(self.run_repo.find_by_date(plan_date)?)
    }
}

fn run_status_of(err: &EngineError) -> ScheduleRunStatus {
    match err {
        EngineError::InvalidInput(_) => ScheduleRunStatus::Invalid,
        EngineError::Infeasible { .. } => ScheduleRunStatus::Infeasible,
        EngineError::ResourceExhausted { .. } => ScheduleRunStatus::Exhausted,
        EngineError::Cancelled { .. } => ScheduleRunStatus::Cancelled,
        EngineError::NonContiguousAssignment { .. } => ScheduleRunStatus::Failed,
    }
}
