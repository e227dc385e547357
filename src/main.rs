//! 电影目录服务主入口

use movie_catalog::{
    auth::PasswordHasher, clock::SystemClock, config::AppConfig, handlers::health,
    middleware::AppState, routes, telemetry,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("movie-catalog {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env.development > .env
    if let Ok(env) = std::env::var("MOVIES_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    // 设置应用启动时间
    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Movie catalog starting...");

    // 3. 构建应用状态（哈希种子用户密码）
    let app_state = Arc::new(AppState::build(
        config.clone(),
        Arc::new(SystemClock),
        PasswordHasher::new(),
    )?);

    if app_state.credential_store.user_count() == 0 {
        tracing::warn!("No users configured; /authenticate will reject every login");
    }
    tracing::info!(
        users = app_state.credential_store.user_count(),
        token_ttl_secs = app_state.token_service.ttl_secs(),
        "Security initialized"
    );

    // 4. 构建路由
    let app = routes::create_router(app_state);

    // 5. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 6. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
///
/// 收到信号后开始排空连接，超时仍未结束则强制退出
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    // 超时后强制关闭
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        std::process::exit(1);
    });
}

/// 打印帮助信息
fn print_help() {
    println!("movie-catalog {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: movie-catalog [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  MOVIES_SERVER__ADDR                 监听地址（默认 0.0.0.0:8080）");
    println!("  MOVIES_LOGGING__LEVEL               日志级别（默认 info）");
    println!("  MOVIES_LOGGING__FORMAT              json 或 pretty");
    println!("  MOVIES_SECURITY__JWT_SECRET         HS512 签名密钥（必填，至少 32 字符）");
    println!("  MOVIES_SECURITY__TOKEN_TTL_SECS     令牌有效期（默认 3600）");
    println!("  MOVIES_SECURITY__DEV_USERS          true 时载入内置开发用户（仅限开发）");
    println!("  MOVIES_CONFIG_FILE                  可选配置文件路径（种子用户）");
}
