use tracing_subscriber::EnvFilter;

/// 初始化日志系统
///
/// `RUST_LOG` 优先于传入的 `level`。重复调用返回错误而不是 panic。
/// 加载进度通过 `info` 级别日志输出，未安装订阅者时不会打印任何内容。
pub fn init(level: &str) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
