//! 课程编辑 - 工作流层
//!
//! 一次编辑会话：课程草稿加上正在编排的课程内容。
//! 调用 `commit` 之前不会写入仓库。

use tracing::{debug, info, warn};

use crate::error::AuthoringError;
use crate::infrastructure::ClassRepository;
use crate::models::{
    ClassId, ClassPatch, ClassRecord, ClassVisibility, CompletionRequirement, CurriculumItem,
    ParticipationPeriod,
};
use crate::services::Capabilities;
use crate::workflow::curriculum::CurriculumModel;

const COPY_SUFFIX: &str = " (copy)";

/// 单个课程的编辑会话
#[derive(Debug)]
pub struct ClassAuthoring {
    /// 除课程内容外的全部字段，课程内容在 `curriculum` 中
    draft: ClassRecord,
    curriculum: CurriculumModel,
    capabilities: Capabilities,
    /// 课程写入仓库后的 ID
    origin: Option<ClassId>,
}

impl ClassAuthoring {
    // ========== 开始会话 ==========

    /// 新建空课程
    pub fn start_new(title: impl Into<String>, capabilities: Capabilities) -> Result<Self, AuthoringError> {
        require(capabilities.can_edit, "创建课程")?;
        Ok(Self {
            draft: ClassRecord::new(title),
            curriculum: CurriculumModel::new(),
            capabilities,
            origin: None,
        })
    }

    /// 编辑已保存的课程
    pub async fn edit_existing(
        repository: &dyn ClassRepository,
        id: ClassId,
        capabilities: Capabilities,
    ) -> Result<Self, AuthoringError> {
        require(capabilities.can_edit, "编辑课程")?;

        let mut record = repository.get(id).await?;
        let items = std::mem::take(&mut record.curriculum);
        let curriculum = CurriculumModel::hydrate(items);
        debug!("编辑课程 {}，共 {} 项", id, curriculum.len());

        Ok(Self {
            draft: record,
            curriculum,
            capabilities,
            origin: Some(id),
        })
    }

    /// 以已有课程为模板新建课程
    ///
    /// 复制设置；课程条目使用新 ID，副本的参与人数从 0 开始。
    ///
    /// # 参数
    /// - `repository`: 课程仓库
    /// - `source_id`: 被复制的课程 ID
    /// - `capabilities`: 当前用户的权限
    pub async fn duplicate_from(
        repository: &dyn ClassRepository,
        source_id: ClassId,
        capabilities: Capabilities,
    ) -> Result<Self, AuthoringError> {
        require(capabilities.can_duplicate, "复制课程")?;

        let source = repository.get(source_id).await?;
        let mut curriculum = CurriculumModel::with_id_prefix("copy");
        let copied = curriculum.import_from(&source.curriculum);

        let mut draft = ClassRecord::new(format!("{}{}", source.title, COPY_SUFFIX));
        draft.description = source.description;
        draft.completion = source.completion;
        draft.visibility = source.visibility;
        draft.participation_period = source.participation_period;
        draft.max_participants = source.max_participants;

        info!("📋 复制课程 {}（{} 项）", source_id, copied);
        Ok(Self {
            draft,
            curriculum,
            capabilities,
            origin: None,
        })
    }

    // ========== 访问器 ==========

    pub fn draft(&self) -> &ClassRecord {
        &self.draft
    }

    pub fn curriculum(&self) -> &CurriculumModel {
        &self.curriculum
    }

    /// 添加、删除、排序都通过课程模型完成
    pub fn curriculum_mut(&mut self) -> &mut CurriculumModel {
        &mut self.curriculum
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// 已保存课程的 ID，新课程首次提交前为 `None`
    pub fn origin(&self) -> Option<ClassId> {
        self.origin
    }

    // ========== 编辑草稿 ==========

    /// 合并其他产品的课程内容，返回新增条目数
    pub fn import_curriculum<'a>(&mut self, source: impl IntoIterator<Item = &'a CurriculumItem>) -> usize {
        let added = self.curriculum.import_from(source);
        debug!("导入 {} 个课程条目", added);
        added
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    pub fn set_participation_period(&mut self, period: Option<ParticipationPeriod>) {
        self.draft.participation_period = period;
    }

    pub fn set_max_participants(&mut self, max: Option<u32>) {
        self.draft.max_participants = max;
    }

    /// 设置或清除完成条件
    ///
    /// 超出取值范围直接拒绝。`min_scenarios` 超过当前场景数时只记录警告，
    /// 提交时再截断。
    pub fn set_requirement(&mut self, requirement: Option<CompletionRequirement>) -> Result<(), AuthoringError> {
        if let Some(req) = &requirement {
            req.validate()?;
            if let Err(e) = req.check_against(self.curriculum.scenario_count()) {
                warn!("⚠️ {}", e);
            }
        }
        self.draft.completion = requirement;
        Ok(())
    }

    /// 修改课程可见性（仅限编辑者）
    pub fn set_visibility(&mut self, visibility: ClassVisibility) -> Result<(), AuthoringError> {
        require(self.capabilities.can_edit, "修改可见性")?;
        check_visibility(&visibility)?;
        self.draft.visibility = visibility;
        Ok(())
    }

    // ========== 结束会话 ==========

    /// 草稿保存前必须通过的校验
    pub fn validate(&self) -> Result<(), AuthoringError> {
        if self.draft.title.trim().is_empty() {
            return Err(AuthoringError::Invalid("课程标题不能为空".to_string()));
        }
        if self.curriculum.is_empty() {
            return Err(AuthoringError::Invalid(
                "课程至少需要一个条目".to_string(),
            ));
        }
        if let Some(period) = &self.draft.participation_period {
            if period.end_date < period.start_date {
                return Err(AuthoringError::Invalid(
                    "参与期间的结束日期早于开始日期".to_string(),
                ));
            }
        }
        check_visibility(&self.draft.visibility)
    }

    /// 保存草稿：首次提交时创建，之后更新
    pub async fn commit(&mut self, repository: &dyn ClassRepository) -> Result<ClassId, AuthoringError> {
        self.validate()?;

        let scenarios = self.curriculum.scenario_count();
        let completion = self.draft.completion.map(|req| {
            if req.check_against(scenarios).is_err() {
                warn!(
                    "min_scenarios {} 超过现有场景数，截断为 {}",
                    req.min_scenarios, scenarios
                );
                req.clamped(scenarios)
            } else {
                req
            }
        });
        let visibility = normalized(&self.draft.visibility);

        match self.origin {
            Some(id) => {
                let patch = ClassPatch {
                    title: Some(self.draft.title.clone()),
                    description: Some(self.draft.description.clone()),
                    curriculum: Some(self.curriculum.items().to_vec()),
                    completion: Some(completion),
                    visibility: Some(visibility),
                    participation_period: Some(self.draft.participation_period),
                    max_participants: Some(self.draft.max_participants),
                };
                repository.update(id, patch).await?;
                info!("✓ 课程 {} 已更新", id);
                Ok(id)
            }
            None => {
                let mut record = self.draft.clone();
                record.curriculum = self.curriculum.items().to_vec();
                record.completion = completion;
                record.visibility = visibility;
                let id = repository.create(record).await?;
                self.origin = Some(id);
                info!("✓ 课程 {} 已创建", id);
                Ok(id)
            }
        }
    }

    /// 结束会话，不保存任何内容
    pub fn discard(self) {
        debug!(
            "放弃草稿 \"{}\"（{} 项）",
            self.draft.title,
            self.curriculum.len()
        );
    }
}

fn require(allowed: bool, action: &'static str) -> Result<(), AuthoringError> {
    if allowed {
        Ok(())
    } else {
        Err(AuthoringError::NotPermitted { action })
    }
}

fn check_visibility(visibility: &ClassVisibility) -> Result<(), AuthoringError> {
    if visibility.is_enterable() {
        Ok(())
    } else {
        Err(AuthoringError::Invalid(
            "私有课程必须设置密码".to_string(),
        ))
    }
}

/// 公开课程不保留密码
fn normalized(visibility: &ClassVisibility) -> ClassVisibility {
    if visibility.is_public {
        ClassVisibility::public()
    } else {
        visibility.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepositoryError;
    use crate::infrastructure::InMemoryClassRepository;
    use crate::models::{AccessContext, LicenseTier, Role, ScenarioRef};
    use crate::services::resolve;
    use tokio_test::{assert_err, assert_ok};

    fn manager() -> Capabilities {
        resolve(&AccessContext::new(Role::Master, LicenseTier::Premium, true))
    }

    fn unlicensed_manager() -> Capabilities {
        resolve(&AccessContext::new(Role::Master, LicenseTier::Basic, true))
    }

    fn scenario(id: &str, ref_id: u32) -> CurriculumItem {
        CurriculumItem::scenario(id, ScenarioRef::new(ref_id, format!("Scenario {}", ref_id), "10분"))
    }

    async fn stored_class(repo: &InMemoryClassRepository) -> ClassId {
        let mut record = ClassRecord::new("Emergency triage");
        record.description = "Night shift".to_string();
        record.curriculum = vec![scenario("s-1", 1), scenario("s-2", 2)];
        record.visibility = ClassVisibility::private("1234");
        record.current_participants = 12;
        repo.create(record).await.unwrap()
    }

    #[test]
    fn test_unlicensed_manager_cannot_author() {
        assert_eq!(
            ClassAuthoring::start_new("New", unlicensed_manager()).unwrap_err(),
            AuthoringError::NotPermitted {
                action: "创建课程"
            }
        );
    }

    #[tokio::test]
    async fn test_new_class_commit_then_update() {
        let repo = InMemoryClassRepository::new();
        let mut session = assert_ok!(ClassAuthoring::start_new("Vital signs", manager()));

        // 空课程不能提交
        assert_err!(session.commit(&repo).await);

        session.curriculum_mut().append(scenario("a", 1)).unwrap();
        session.curriculum_mut().append(scenario("b", 2)).unwrap();
        let id = assert_ok!(session.commit(&repo).await);
        assert_eq!(session.origin(), Some(id));

        session.curriculum_mut().reorder(1, 0).unwrap();
        session.set_title("Vital signs II");
        session.set_description("Second round");
        session.set_max_participants(Some(30));
        session.set_participation_period(Some(ParticipationPeriod {
            start_date: chrono::NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2026, 5, 31).unwrap(),
        }));
        assert_eq!(assert_ok!(session.commit(&repo).await), id);

        let stored = repo.get(id).await.unwrap();
        assert_eq!(stored.title, "Vital signs II");
        assert_eq!(stored.description, "Second round");
        assert_eq!(stored.max_participants, Some(30));
        assert!(stored.participation_period.is_some());
        assert_eq!(stored.curriculum[0].id().as_str(), "b");
        assert_eq!(stored.curriculum[0].order(), 0);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_uses_fresh_ids() {
        let repo = InMemoryClassRepository::new();
        let source_id = stored_class(&repo).await;

        let mut session = assert_ok!(ClassAuthoring::duplicate_from(&repo, source_id, manager()).await);
        assert_eq!(session.draft().title, "Emergency triage (copy)");
        assert_eq!(session.draft().current_participants, 0);
        assert_eq!(session.curriculum().len(), 2);
        for item in session.curriculum().items() {
            assert!(!item.id().as_str().starts_with("s-"));
        }

        let copy_id = assert_ok!(session.commit(&repo).await);
        assert_ne!(copy_id, source_id);
        let copy = repo.get(copy_id).await.unwrap();
        assert_eq!(copy.visibility.password.as_deref(), Some("1234"));
    }

    #[tokio::test]
    async fn test_duplicate_requires_capability() {
        let repo = InMemoryClassRepository::new();
        let source_id = stored_class(&repo).await;
        assert_eq!(
            ClassAuthoring::duplicate_from(&repo, source_id, unlicensed_manager())
                .await
                .unwrap_err(),
            AuthoringError::NotPermitted {
                action: "复制课程"
            }
        );
        assert_eq!(
            ClassAuthoring::duplicate_from(&repo, 99, manager()).await.unwrap_err(),
            AuthoringError::Repository(RepositoryError::NotFound(99))
        );
    }

    #[tokio::test]
    async fn test_edit_existing_and_import() {
        let repo = InMemoryClassRepository::new();
        let id = stored_class(&repo).await;
        let mut session = assert_ok!(ClassAuthoring::edit_existing(&repo, id, manager()).await);
        assert_eq!(session.origin(), Some(id));

        let other_product = vec![scenario("p-1", 2), scenario("p-2", 3)];
        assert_eq!(session.import_curriculum(&other_product), 1);
        assert_eq!(session.import_curriculum(&other_product), 0);
        assert_ok!(session.commit(&repo).await);

        let stored = repo.get(id).await.unwrap();
        assert_eq!(stored.curriculum.len(), 3);
        assert_eq!(stored.current_participants, 12);
    }

    #[tokio::test]
    async fn test_visibility_rules() {
        let mut session = ClassAuthoring::start_new("Private", manager()).unwrap();
        assert_eq!(
            session.set_visibility(ClassVisibility::private("  ")).unwrap_err(),
            AuthoringError::Invalid("私有课程必须设置密码".to_string())
        );
        assert_ok!(session.set_visibility(ClassVisibility::private("pw")));
        assert_eq!(session.draft().visibility.password.as_deref(), Some("pw"));

        // 改为公开后提交时去掉密码
        let repo = InMemoryClassRepository::new();
        session.curriculum_mut().append(scenario("a", 1)).unwrap();
        session
            .set_visibility(ClassVisibility {
                is_public: true,
                password: Some("stale".to_string()),
            })
            .unwrap();
        let id = session.commit(&repo).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap().visibility, ClassVisibility::public());
    }

    #[tokio::test]
    async fn test_excess_requirement_is_clamped_on_commit() {
        let repo = InMemoryClassRepository::new();
        let mut session = ClassAuthoring::start_new("Clamp", manager()).unwrap();
        session.curriculum_mut().append(scenario("a", 1)).unwrap();
        session.curriculum_mut().append(scenario("b", 2)).unwrap();

        let requirement = CompletionRequirement::at_least(5, 70).unwrap();
        assert_ok!(session.set_requirement(Some(requirement)));
        let invalid = CompletionRequirement {
            require_all_scenarios: false,
            min_scenarios: 0,
            min_passing_score: 70,
        };
        assert_err!(session.set_requirement(Some(invalid)));

        let id = session.commit(&repo).await.unwrap();
        let stored = repo.get(id).await.unwrap();
        assert_eq!(stored.completion.map(|r| r.min_scenarios), Some(2));
    }

    #[tokio::test]
    async fn test_discard_leaves_repository_untouched() {
        let repo = InMemoryClassRepository::new();
        let mut session = ClassAuthoring::start_new("Scratch", manager()).unwrap();
        session.curriculum_mut().append(scenario("a", 1)).unwrap();
        session.discard();
        assert!(repo.is_empty().await);
    }
}
