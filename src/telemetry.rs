//! 结构化日志
//!
//! `logging.format = "pretty"` 输出人类可读日志，其余一律输出单行 JSON。
//! 设置了 `RUST_LOG` 时覆盖 `logging.level`。

use crate::config::AppConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 安装全局 subscriber，重复调用时保留已安装的那个
pub fn init_telemetry(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.logging.format.eq_ignore_ascii_case("pretty") {
        registry.with(fmt::layer().pretty().with_target(false)).try_init()
    } else {
        // 请求 span 的 trace_id/request_id 随每条事件输出
        registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
    };

    if let Err(e) = installed {
        eprintln!("tracing subscriber already installed: {}", e);
        return;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.logging.level,
        format = %config.logging.format,
        "Logging ready"
    );
}
