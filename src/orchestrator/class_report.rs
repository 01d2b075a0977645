//! 单个课程报告 - 编排层
//!
//! 按课程页面的方式处理一个课程：载入课程内容、解析权限、打开密码门，
//! 内容可见时再评估完成情况和状态。

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::infrastructure::{ClassRepository, ClientStateStore, ScenarioCatalog, SessionContext};
use crate::models::{ClassId, ClassRecord, ParticipantResult};
use crate::services::{evaluate_results, resolve, Capabilities, ClassStatus, CompletionReport, ParticipationTracker};
use crate::workflow::{CurriculumModel, GateState, ItemDisplay, PasswordGate};

/// 查看者看到的单个课程
#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    pub class_id: ClassId,
    pub title: String,
    pub sessions: usize,
    pub scenarios: usize,
    pub total_duration: String,
    /// 展示用的课程条目
    pub items: Vec<ItemDisplay>,
    pub capabilities: Capabilities,
    #[serde(skip)]
    pub gate_state: GateState,
    /// 完成条件文本，例如 `"70점 이상, 전체 시나리오 완료"`
    pub requirement: Option<String>,
    /// 内容可见且设置了完成条件时存在
    pub completion: Option<CompletionReport>,
    /// 内容可见时存在
    pub status: Option<ClassStatus>,
    pub thumbnails: usize,
    /// 从场景目录补全展示字段的条目数
    pub enriched: usize,
    pub is_full: bool,
}

impl ClassReport {
    pub fn is_visible(&self) -> bool {
        self.gate_state.is_unlocked()
    }

    pub fn is_completed(&self) -> bool {
        self.status == Some(ClassStatus::Completed)
    }

    /// 课程内容为空，或完成条件按当前配置无法达成
    pub fn needs_attention(&self) -> bool {
        self.sessions == 0
            || self
                .completion
                .as_ref()
                .is_some_and(|report| report.issue.is_some() || report.trivial)
    }
}

/// 为一个已保存的课程生成报告
///
/// # 参数
/// - `record`: 已保存的课程
/// - `results`: 查看者在该课程中的成绩
/// - `session`: 提供查看者的访问上下文
/// - `catalog`: 用于补全展示信息的场景目录
/// - `repository`: 交给密码门使用
/// - `tracker`: 客户端保存的参与状态（这里只读）
/// - `today`: 判断参与期间所用的日期
///
/// # 返回
/// 课程报告；内容不可见时不包含完成情况和状态
pub fn build_report<S: ClientStateStore>(
    record: ClassRecord,
    results: &[ParticipantResult],
    session: &dyn SessionContext,
    catalog: &dyn ScenarioCatalog,
    repository: Arc<dyn ClassRepository>,
    tracker: &ParticipationTracker<S>,
    today: NaiveDate,
) -> ClassReport {
    let context = session.access_context();
    let capabilities = resolve(&context);
    debug!("课程 {} 的查看者: {}", record.id, context);
    let is_full = record.is_full();

    let mut curriculum = CurriculumModel::hydrate(record.curriculum);
    let enriched = curriculum.fill_from_catalog(catalog);
    let items = curriculum.display_entries(catalog);

    let gate = PasswordGate::new(record.id, record.visibility, capabilities, repository);
    let gate_state = gate.state();

    let (completion, status) = if gate_state.is_unlocked() {
        let completion = record
            .completion
            .as_ref()
            .map(|req| evaluate_results(req, curriculum.items(), results));
        let status = tracker.status(
            record.id,
            record.participation_period.as_ref(),
            completion.as_ref(),
            today,
        );
        (completion, Some(status))
    } else {
        (None, None)
    };

    ClassReport {
        class_id: record.id,
        title: record.title,
        sessions: curriculum.session_count(),
        scenarios: curriculum.scenario_count(),
        total_duration: curriculum.total_duration(),
        items,
        capabilities,
        gate_state,
        requirement: record.completion.map(|req| req.describe()),
        completion,
        status,
        thumbnails: curriculum.thumbnail_candidates().count(),
        enriched,
        is_full,
    }
}

/// 输出一份报告
pub fn log_report(report: &ClassReport) {
    info!(
        "📚 {} 个条目（{} 个场景），总时长 {}",
        report.sessions, report.scenarios, report.total_duration
    );
    if report.enriched > 0 {
        debug!("{} 个条目从场景目录补全", report.enriched);
    }
    for item in &report.items {
        debug!(
            "  {}. [{}] {} ({}, {})",
            item.order + 1,
            item.kind,
            item.title,
            item.duration_label,
            item.author
        );
    }
    info!(
        "👤 管理者: {}，参与者: {}，可编辑: {}，可查看成绩: {}",
        report.capabilities.is_licensed_manager,
        report.capabilities.is_licensed_participant,
        report.capabilities.can_edit,
        report.capabilities.can_view_results
    );
    if let Some(requirement) = &report.requirement {
        info!("🎯 完成条件: {}", requirement);
    }

    if !report.is_visible() {
        info!("🔒 密码门 {}: 内容不可见", report.gate_state.name());
        return;
    }
    info!("🔓 内容可见");

    if let Some(completion) = &report.completion {
        info!(
            "📈 进度 {}%（通过 {}/{} 个场景，目标 {}）",
            completion.progress_percent,
            completion.scored_items.len(),
            completion.scenario_total,
            completion.target
        );
        if completion.trivial {
            warn!("⚠️ 没有需要完成的场景，视为空通过，不发证书");
        }
    }
    if let Some(status) = report.status {
        info!("🏷️ 状态: {}", status);
    }
    if report.is_full {
        info!("课程已满员");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{InMemoryClassRepository, InMemoryScenarioCatalog, MemoryClientState};
    use crate::models::{
        AccessContext, ClassVisibility, CompletionRequirement, CurriculumItem, LicenseTier, Role,
        ScenarioMetadata, ScenarioRef, Platform,
    };
    use chrono::{TimeZone, Utc};

    fn record() -> ClassRecord {
        let mut record = ClassRecord::new("Triage");
        record.id = 3;
        record.curriculum = vec![
            CurriculumItem::scenario("a", ScenarioRef::new(1, "", "-")),
            CurriculumItem::scenario("b", ScenarioRef::new(2, "Airway", "20분")),
        ];
        record.completion = Some(CompletionRequirement::all_scenarios(70).unwrap());
        record
    }

    fn catalog() -> InMemoryScenarioCatalog {
        InMemoryScenarioCatalog::new([ScenarioMetadata {
            ref_id: 1,
            title: "Vital signs".to_string(),
            duration_label: "40분".to_string(),
            contributor: "Medicrew".to_string(),
            platform: Platform::Vr,
            sample_images: vec!["/img/1.jpg".to_string()],
        }])
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn test_visible_class_is_evaluated() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let results = vec![ParticipantResult::new("a", 90, at), ParticipantResult::new("b", 75, at)];
        let session = AccessContext::new(Role::Student, LicenseTier::Premium, false);
        let tracker = ParticipationTracker::new(MemoryClientState::new());

        let report = build_report(
            record(),
            &results,
            &session,
            &catalog(),
            Arc::new(InMemoryClassRepository::new()),
            &tracker,
            today(),
        );

        assert!(report.is_visible());
        assert_eq!(report.total_duration, "1시간");
        assert_eq!(report.enriched, 1);
        assert_eq!(report.items[0].title, "Vital signs");
        assert_eq!(report.items[0].author, "Medicrew");
        assert_eq!(report.thumbnails, 1);
        assert!(report.completion.as_ref().unwrap().passed);
        assert_eq!(report.status, Some(ClassStatus::Completed));
        assert!(report.is_completed());
        assert!(!report.needs_attention());
    }

    #[test]
    fn test_locked_class_hides_progress() {
        let mut record = record();
        record.visibility = ClassVisibility::private("1234");
        let session = AccessContext::new(Role::Student, LicenseTier::Premium, false);
        let tracker = ParticipationTracker::new(MemoryClientState::new());

        let report = build_report(
            record,
            &[],
            &session,
            &catalog(),
            Arc::new(InMemoryClassRepository::new()),
            &tracker,
            today(),
        );

        assert_eq!(report.gate_state, GateState::Locked { mismatch: false });
        assert!(report.completion.is_none());
        assert!(report.status.is_none());
        assert_eq!(report.requirement.as_deref(), Some("70점 이상, 전체 시나리오 완료"));
    }
}
