use serde::{Deserialize, Serialize};

use crate::error::RequirementError;

/// 参与者完成课程的条件
///
/// 设置 `require_all_scenarios` 时，`min_scenarios` 只用于展示，评估时忽略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequirement {
    pub require_all_scenarios: bool,
    pub min_scenarios: u32,
    pub min_passing_score: u32,
}

impl CompletionRequirement {
    /// 创建并校验完成条件
    pub fn new(
        require_all_scenarios: bool,
        min_scenarios: u32,
        min_passing_score: u32,
    ) -> Result<Self, RequirementError> {
        let requirement = Self {
            require_all_scenarios,
            min_scenarios,
            min_passing_score,
        };
        requirement.validate()?;
        Ok(requirement)
    }

    /// 所有场景都达到 `min_passing_score`
    pub fn all_scenarios(min_passing_score: u32) -> Result<Self, RequirementError> {
        Self::new(true, 1, min_passing_score)
    }

    /// 至少 `min_scenarios` 个场景达到 `min_passing_score`
    pub fn at_least(min_scenarios: u32, min_passing_score: u32) -> Result<Self, RequirementError> {
        Self::new(false, min_scenarios, min_passing_score)
    }

    /// 检查字段取值范围
    pub fn validate(&self) -> Result<(), RequirementError> {
        if self.min_scenarios < 1 {
            return Err(RequirementError::MinScenariosZero);
        }
        if self.min_passing_score > 100 {
            return Err(RequirementError::PassingScoreOutOfRange {
                score: self.min_passing_score,
            });
        }
        Ok(())
    }

    /// 用实际场景数检查 `min_scenarios`
    ///
    /// 要求完成全部场景时不检查。
    pub fn check_against(&self, available: usize) -> Result<(), RequirementError> {
        if !self.require_all_scenarios && self.min_scenarios as usize > available {
            return Err(RequirementError::MinScenariosExceedsAvailable {
                min_scenarios: self.min_scenarios,
                available,
            });
        }
        Ok(())
    }

    /// 返回 `min_scenarios` 截断到 `1..=available` 的副本
    pub fn clamped(&self, available: usize) -> Self {
        let upper = u32::try_from(available).unwrap_or(u32::MAX).max(1);
        Self {
            min_scenarios: self.min_scenarios.clamp(1, upper),
            ..*self
        }
    }

    /// Human label, e.g. `"70점 이상, 2개 시나리오 완료"`
    pub fn describe(&self) -> String {
        let scope = if self.require_all_scenarios {
            "전체 시나리오".to_string()
        } else {
            format!("{}개 시나리오", self.min_scenarios)
        };
        format!("{}점 이상, {} 완료", self.min_passing_score, scope)
    }
}
