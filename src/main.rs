use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{debug, error, info, warn};

// 从 lib.rs 导入模块
use rust_classhub_sync::config::AppConfig;
use rust_classhub_sync::runtime::lifetime;
use rust_classhub_sync::runtime::lifetime::startup::SyncContext;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 记录程序启动时间
    let start_datetime = chrono::Utc::now();

    // 启动前预处理 //

    // 初始化配置
    setup_panic!();
    AppConfig::init().expect("Failed to initialize configuration");
    let config = AppConfig::get();

    // 初始化日志
    let stdout_log = std::io::stdout();
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(stdout_log);
    let filter = tracing_subscriber::EnvFilter::new(&config.app.log_level);
    let tracing_format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_ansi(true);

    let tracing_builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking_writer)
        .event_format(tracing_format);

    if config.is_development() {
        tracing_builder
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        tracing_builder.json().init();
    }

    // 打印信息
    warn!(
        "Starting pre-startup processing...
        Project: {}
        Version: {}
        System: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.app.system_name
    );

    let context = match lifetime::startup::prepare_sync_startup(config).await {
        Ok(context) => context,
        Err(e) => {
            #[cfg(debug_assertions)]
            eprintln!("{}", e.format_colored());
            #[cfg(not(debug_assertions))]
            eprintln!("{}", e.format_simple());
            return;
        }
    };

    // 输出预处理时间
    debug!(
        "Pre-startup processing completed in {} ms",
        chrono::Utc::now()
            .signed_duration_since(start_datetime)
            .num_milliseconds()
    );

    // 预处理完成 //

    match config.current_user() {
        Some(user) => warn!("Watching dashboard for user {}", user),
        None => warn!("No current user configured, dashboard shows signed-out defaults"),
    }

    tokio::select! {
        _ = watch_dashboard(&context) => {}
        _ = lifetime::shutdown::listen_for_shutdown() => {}
    }

    if let Err(e) = lifetime::shutdown::teardown(&context).await {
        error!("Shutdown failed: {}", e);
    }
}

/// 作业或提交镜像变化时输出首页汇总
async fn watch_dashboard(context: &SyncContext) {
    let mut assignments = context.mirrors().assignments.subscribe();
    let mut submissions = context.mirrors().submissions.subscribe();

    loop {
        match serde_json::to_string(&context.dashboard()) {
            Ok(summary) => println!("{summary}"),
            Err(e) => error!("Failed to serialize dashboard summary: {}", e),
        }

        let changed = tokio::select! {
            res = assignments.changed() => res,
            res = submissions.changed() => res,
        };
        if changed.is_err() {
            info!("Mirror closed, stopping dashboard output");
            break;
        }
    }
}
