use anyhow::Result;
use class_composer::utils::logging;
use class_composer::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let stats = App::initialize(config).await?.run().await?;
    if stats.rejected > 0 {
        tracing::warn!("⚠️ {} 个课程文件被拒绝", stats.rejected);
    }

    Ok(())
}
