//! 批量驱动 - 编排层
//!
//! 持有一次运行所需的协作者（仓库、场景目录、客户端状态），
//! 加载所有课程文件并依次输出每个课程的报告。

use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{
    ClassRepository, InMemoryClassRepository, InMemoryScenarioCatalog, JsonFileClientState,
};
use crate::models::{ClassId, ParticipantResult};
use crate::orchestrator::class_report::{build_report, log_report, ClassReport};
use crate::services::ParticipationTracker;
use crate::utils::logging;

/// 应用程序
pub struct App {
    config: Config,
    repository: Arc<InMemoryClassRepository>,
    catalog: InMemoryScenarioCatalog,
    tracker: ParticipationTracker<JsonFileClientState>,
    /// 按文件顺序保存的课程 ID 及查看者的成绩
    classes: Vec<(ClassId, Vec<ParticipantResult>)>,
    rejected: usize,
}

/// 一次运行的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub visible: usize,
    pub completed: usize,
    pub needs_attention: usize,
    /// 被仓库拒绝的课程文件数
    pub rejected: usize,
}

impl App {
    /// 初始化应用程序
    ///
    /// 加载课程文件、可选的场景目录和客户端状态
    ///
    /// # 错误
    /// 课程文件夹不存在、场景目录无法读取或客户端状态文件损坏时返回错误
    pub async fn initialize(config: Config) -> AppResult<Self> {
        logging::log_startup(&config);

        let files = crate::models::load_all_class_files(&config.class_folder).await?;
        logging::log_classes_loaded(files.len());

        let repository = Arc::new(InMemoryClassRepository::new());
        let mut classes = Vec::with_capacity(files.len());
        let mut rejected = 0;
        for file in files {
            let source = file.file_path.clone().unwrap_or_default();
            match repository.create(file.class).await {
                Ok(id) => classes.push((id, file.results)),
                Err(e) => {
                    warn!("⚠️ {} 中的课程被拒绝: {}", source, e);
                    rejected += 1;
                }
            }
        }

        let catalog = match &config.catalog_file {
            Some(path) => {
                let scenarios = crate::models::load_scenario_catalog(Path::new(path)).await?;
                info!("✓ 场景目录: {} 个条目", scenarios.len());
                InMemoryScenarioCatalog::new(scenarios)
            }
            None => InMemoryScenarioCatalog::default(),
        };

        let store = JsonFileClientState::open(&config.client_state_file)?;

        Ok(Self {
            config,
            repository,
            catalog,
            tracker: ParticipationTracker::new(store),
            classes,
            rejected,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 以今天为准输出所有课程的报告
    pub async fn run(&self) -> AppResult<RunStats> {
        self.run_on(chrono::Local::now().date_naive()).await
    }

    /// 以 `today` 为准输出所有课程的报告
    pub async fn run_on(&self, today: NaiveDate) -> AppResult<RunStats> {
        let rejected = self.rejected;
        if self.classes.is_empty() {
            warn!("⚠️ {} 中没有需要处理的课程文件", self.config.class_folder);
            return Ok(RunStats {
                rejected,
                ..Default::default()
            });
        }

        let session = self.config.session();
        let total = self.classes.len();
        let mut stats = RunStats {
            total,
            rejected,
            ..Default::default()
        };

        for (index, (id, results)) in self.classes.iter().enumerate() {
            let record = match self.repository.get(*id).await {
                Ok(record) => record,
                Err(e) => {
                    error!("课程 {} 已从仓库中消失: {}", id, e);
                    continue;
                }
            };
            logging::log_class_start(index + 1, total, &record.title);

            let report = build_report(
                record,
                results,
                &session,
                &self.catalog,
                self.repository.clone(),
                &self.tracker,
                today,
            );
            log_report(&report);
            tally(&mut stats, &report);
        }

        logging::print_final_stats(stats.total, stats.visible, stats.completed, stats.needs_attention);
        Ok(stats)
    }
}

fn tally(stats: &mut RunStats, report: &ClassReport) {
    if report.is_visible() {
        stats.visible += 1;
    }
    if report.is_completed() {
        stats.completed += 1;
    }
    if report.needs_attention() {
        stats.needs_attention += 1;
    }
}
