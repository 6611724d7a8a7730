// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别
// ==========================================

use std::error::Error;
use tracing_subscriber::{fmt, EnvFilter};

/// 设为 json 时输出结构化日志（每行一个 JSON 对象）
pub const LOG_FORMAT_ENV: &str = "SHIFT_SCHEDULER_LOG_FORMAT";

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=shift_scheduler=trace
/// - SHIFT_SCHEDULER_LOG_FORMAT: text（默认）或 json
///
/// 日志写到 stderr，stdout 留给命令输出
///
/// # 示例
/// ```no_run
/// use shift_scheduler::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    report_init_failure(result);
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let result = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
    report_init_failure(result);
}

/// 全局 subscriber 已存在（重复初始化、并行测试）时静默，其余失败写到 stderr
fn report_init_failure(result: Result<(), Box<dyn Error + Send + Sync + 'static>>) {
    if let Err(e) = result {
        if !tracing::dispatcher::has_been_set() {
            eprintln!("日志系统初始化失败: {}", e);
        }
    }
}
