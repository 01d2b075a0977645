use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;
use crate::models::curriculum_item::CurriculumItem;
use crate::models::requirement::CompletionRequirement;

/// 由课程仓库分配的课程 ID
pub type ClassId = u64;

/// 谁可以进入课程
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassVisibility {
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ClassVisibility {
    pub fn public() -> Self {
        Self {
            is_public: true,
            password: None,
        }
    }

    pub fn private(password: impl Into<String>) -> Self {
        Self {
            is_public: false,
            password: Some(password.into()),
        }
    }

    /// 非管理者是否有办法进入
    pub fn is_enterable(&self) -> bool {
        self.is_public || self.has_password()
    }

    /// 空密码或只含空白的密码视为没有密码
    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), RepositoryError> {
        if self.is_enterable() {
            Ok(())
        } else {
            Err(RepositoryError::Validation(
                "私有课程必须设置非空密码".to_string(),
            ))
        }
    }
}

impl Default for ClassVisibility {
    fn default() -> Self {
        Self::public()
    }
}

/// 参与期间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ParticipationPeriod {
    /// `today` 晚于结束日期时为 true
    pub fn has_ended(&self, today: NaiveDate) -> bool {
        today > self.end_date
    }
}

/// 仓库中保存的课程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// 仓库分配前为 0
    #[serde(default)]
    pub id: ClassId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub curriculum: Vec<CurriculumItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionRequirement>,
    #[serde(default)]
    pub visibility: ClassVisibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participation_period: Option<ParticipationPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub current_participants: u32,
}

impl ClassRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: String::new(),
            curriculum: Vec::new(),
            completion: None,
            visibility: ClassVisibility::default(),
            participation_period: None,
            max_participants: None,
            current_participants: 0,
        }
    }

    /// 记录保存前必须通过的校验
    pub fn validate(&self) -> Result<(), RepositoryError> {
        if self.title.trim().is_empty() {
            return Err(RepositoryError::Validation(
                "课程标题不能为空".to_string(),
            ));
        }
        if let Some(requirement) = &self.completion {
            requirement
                .validate()
                .map_err(|e| RepositoryError::Validation(e.to_string()))?;
        }
        if let Some(period) = &self.participation_period {
            if period.end_date < period.start_date {
                return Err(RepositoryError::Validation(
                    "参与期间的结束日期早于开始日期".to_string(),
                ));
            }
        }
        self.visibility.validate()
    }

    pub fn is_full(&self) -> bool {
        self.max_participants
            .is_some_and(|max| self.current_participants >= max)
    }
}

/// 课程记录的部分更新
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub curriculum: Option<Vec<CurriculumItem>>,
    /// `Some(None)` 表示清除完成条件
    pub completion: Option<Option<CompletionRequirement>>,
    pub visibility: Option<ClassVisibility>,
    pub participation_period: Option<Option<ParticipationPeriod>>,
    pub max_participants: Option<Option<u32>>,
}

impl ClassPatch {
    /// 原地应用到记录上
    pub fn apply_to(self, record: &mut ClassRecord) {
        if let Some(title) = self.title {
            record.title = title;
        }
        if let Some(description) = self.description {
            record.description = description;
        }
        if let Some(curriculum) = self.curriculum {
            record.curriculum = curriculum;
        }
        if let Some(completion) = self.completion {
            record.completion = completion;
        }
        if let Some(visibility) = self.visibility {
            record.visibility = visibility;
        }
        if let Some(period) = self.participation_period {
            record.participation_period = period;
        }
        if let Some(max) = self.max_participants {
            record.max_participants = max;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ClassPatch::default()
    }
}
