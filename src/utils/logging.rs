//! 日志工具
//!
//! 初始化订阅者，以及程序输出的启动横幅和统计信息。

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 安装全局订阅者
///
/// 设置了 `RUST_LOG` 时以它为准；否则为 `info`，`verbose` 时为 `debug`。
/// 重复调用不会出错。
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 打印启动横幅
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 课程编排程序 - {}", now());
    info!("📁 课程文件夹: {}", config.class_folder);
    info!("👤 查看者: {}", config.session());
    for issue in &config.issues {
        warn!("⚠️ {}，使用默认值", issue);
    }
    info!("{}", "=".repeat(60));
}

/// 打印找到的课程数量
pub fn log_classes_loaded(total: usize) {
    info!("✓ 找到 {} 个课程文件\n", total);
}

/// 打印单个课程的标题行
///
/// # 参数
/// - `index`: 当前序号（从 1 开始）
/// - `total`: 课程总数
/// - `title`: 课程标题（日志中会截断）
pub fn log_class_start(index: usize, total: usize, title: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📦 [{}/{}] {}", index, total, truncate_text(title, 40));
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `total`: 处理的课程数
/// - `unlocked`: 内容对查看者可见的课程数
/// - `completed`: 查看者已完成的课程数
/// - `issues`: 完成条件或课程内容需要处理的课程数
pub fn print_final_stats(total: usize, unlocked: usize, completed: usize, issues: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 运行统计");
    info!("结束时间: {}", now());
    info!("{}", "=".repeat(60));
    info!("课程总数: {}", total);
    info!("🔓 可见: {}/{}", unlocked, total);
    info!("🎓 已完成: {}", completed);
    info!("⚠️ 需要处理: {}", issues);
    info!("{}", "=".repeat(60));
}

/// 截断过长的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
