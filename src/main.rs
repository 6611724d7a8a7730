// ==========================================
// 店铺排班系统 - 命令行入口
// ==========================================

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use shift_scheduler::app::{get_default_db_path, AppState};
use shift_scheduler::domain::availability::AvailabilityEntry;
use shift_scheduler::domain::shift::ShiftBlock;
use shift_scheduler::engine::DailySchedule;
use shift_scheduler::logging;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "shift-scheduler",
    about = "店铺单日排班优化（出勤希望 → 最优班段）",
    version,
    propagate_version = true
)]
struct Cli {
    /// 数据库路径（默认读取 SHIFT_SCHEDULER_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 建表并初始化数据库
    Init,
    /// 登记员工
    AddWorker {
        name: String,
        /// 骨干员工
        #[arg(long)]
        must_staff: bool,
    },
    /// 提交出勤希望
    Submit {
        #[arg(long)]
        worker: i64,
        /// 日期，可重复指定（日历批量提交）
        #[arg(long = "date", required = true)]
        dates: Vec<NaiveDate>,
        #[arg(long, default_value_t = 9)]
        start: u8,
        /// 结束小时（不含），省略表示到闭店
        #[arg(long)]
        end: Option<u8>,
        /// 当天不可出勤
        #[arg(long, conflicts_with_all = ["start", "end"])]
        unavailable: bool,
    },
    /// 覆写某日某小时的需求人数
    Demand {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        hour: u8,
        #[arg(long)]
        min: u32,
    },
    /// 写入全局配置（例如 daily_max_hours、gap_policy）
    Config { key: String, value: String },
    /// 求解某日排班并落库
    Solve {
        #[arg(long)]
        date: NaiveDate,
        /// 超时（毫秒），超时即取消且不落库
        #[arg(long)]
        timeout_ms: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// 查看某日已确定的班段
    Show {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        json: bool,
    },
    /// 查看某日的求解记录
    Runs {
        #[arg(long)]
        date: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Init => {
            println!("数据库已初始化: {}", state.db_path);
        }
        Commands::AddWorker { name, must_staff } => {
            let worker_id = state.worker_api.register(&name, must_staff)?;
            println!("worker_id={}", worker_id);
        }
        Commands::Submit {
            worker,
            dates,
            start,
            end,
            unavailable,
        } => {
            if unavailable {
                for date in &dates {
                    state
                        .availability_api
                        .submit(&AvailabilityEntry::unavailable(worker, *date))?;
                }
                println!("已提交 {} 天不可出勤", dates.len());
            } else if dates.len() == 1 {
                state
                    .availability_api
                    .submit(&AvailabilityEntry::available(worker, dates[0], start, end))?;
                println!("已提交 1 天出勤希望");
            } else {
                let written = state
                    .availability_api
                    .submit_batch(worker, &dates, start, end)?;
                println!("已提交 {} 天出勤希望", written);
            }
        }
        Commands::Demand { date, hour, min } => {
            state.schedule_api.set_demand_override(date, hour, min).await?;
            println!("{} {}时 需求人数 = {}", date, hour, min);
        }
        Commands::Config { key, value } => {
            state
                .config
                .set_global_config_value(&key, &value)
                .map_err(|e| anyhow::anyhow!("{}", e))
                .with_context(|| format!("写入配置失败: {}", key))?;
            println!("{} = {}", key, value);
        }
        Commands::Solve {
            date,
            timeout_ms,
            json,
        } => {
            let schedule = match timeout_ms {
                Some(ms) => {
                    state
                        .schedule_api
                        .run_daily_schedule_with_timeout(date, Duration::from_millis(ms))
                        .await?
                }
                None => state.schedule_api.run_daily_schedule(date).await?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&schedule)?);
            } else {
                print_schedule(&schedule);
            }
        }
        Commands::Show { date, json } => {
            let blocks = state.schedule_api.get_schedule(date)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&blocks)?);
            } else {
                print_blocks(date, &blocks);
            }
        }
        Commands::Runs { date } => {
            for run in state.schedule_api.list_runs(date)? {
                println!(
                    "{} {} {:<10} objective={:?} optimal={} gaps={} {}ms {}",
                    run.created_at.format("%Y-%m-%d %H:%M:%S"),
                    &run.run_id[..8],
                    run.status,
                    run.objective,
                    run.optimal,
                    run.gap_count,
                    run.elapsed_ms,
                    run.message.unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}

fn print_blocks(date: NaiveDate, blocks: &[ShiftBlock]) {
    if blocks.is_empty() {
        println!("{} 无班段", date);
        return;
    }
    for block in blocks {
        println!(
            "{} worker={:<4} {:02}:00-{:02}:00 ({}h)",
            date,
            block.worker_id,
            block.start_hour,
            block.end_hour,
            block.duration_hours()
        );
    }
}

fn print_schedule(schedule: &DailySchedule) {
    print_blocks(schedule.plan_date, &schedule.blocks);
    println!(
        "总工时={} 最优={} 节点={} 用时={}ms",
        schedule.total_assigned_hours,
        schedule.optimal,
        schedule.statistics.nodes,
        schedule.statistics.elapsed.as_millis()
    );
    for gap in &schedule.gaps {
        println!("  断档: worker={} {:02}:00", gap.worker_id, gap.hour);
    }
}
