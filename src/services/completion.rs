//! 完成度评估 - 服务层
//!
//! 判断参与者的成绩是否满足课程的完成条件，以及当前进度。

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::RequirementError;
use crate::models::{CompletionRequirement, CurriculumItem, ItemId, ParticipantResult};

/// 一次评估的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionReport {
    pub passed: bool,
    /// 仅因课程中没有场景而通过
    pub trivial: bool,
    /// 0..=100
    pub progress_percent: u8,
    /// 达到及格分的场景条目（按课程顺序）
    pub scored_items: Vec<ItemId>,
    pub scenario_total: usize,
    /// 通过所需的场景数
    pub target: usize,
    /// 要求的场景数超过现有场景数时设置
    #[serde(skip)]
    pub issue: Option<RequirementError>,
}

impl CompletionReport {
    /// 真正通过（排除空课程的形式通过）
    pub fn certificate_eligible(&self) -> bool {
        self.passed && !self.trivial
    }
}

/// 把原始成绩归并为每个条目的最高分
pub fn best_scores(results: &[ParticipantResult]) -> HashMap<ItemId, u32> {
    let mut best: HashMap<ItemId, u32> = HashMap::new();
    for result in results {
        best.entry(result.item_id.clone())
            .and_modify(|score| *score = (*score).max(result.score))
            .or_insert(result.score);
    }
    best
}

/// 按完成条件评估成绩
///
/// # 参数
/// - `requirement`: 课程的完成条件
/// - `items`: 课程条目，只统计场景
/// - `scores`: 每个条目 ID 的最高分（缺失表示未作答）
///
/// # 返回
/// 评估结果。`min_scenarios` 超过现有场景数时这里不截断，
/// 而是通过 `issue` 交给调用方处理。
pub fn evaluate<'a>(
    requirement: &CompletionRequirement,
    items: impl IntoIterator<Item = &'a CurriculumItem>,
    scores: &HashMap<ItemId, u32>,
) -> CompletionReport {
    let scenarios: Vec<&CurriculumItem> = items.into_iter().filter(|i| i.is_scenario()).collect();
    let scenario_total = scenarios.len();

    let scored_items: Vec<ItemId> = scenarios
        .iter()
        .filter(|item| {
            scores
                .get(item.id())
                .is_some_and(|&score| score >= requirement.min_passing_score)
        })
        .map(|item| item.id().clone())
        .collect();
    let scored = scored_items.len();

    let (passed, target) = if requirement.require_all_scenarios {
        (scored == scenario_total, scenario_total)
    } else {
        let target = requirement.min_scenarios as usize;
        (scored >= target, target)
    };

    let trivial = requirement.require_all_scenarios && scenario_total == 0;
    let progress_percent = (scored * 100 / target.max(1)).min(100) as u8;

    let issue = requirement.check_against(scenario_total).err();
    if let Some(issue) = &issue {
        warn!("⚠️ 完成条件按当前配置无法达成: {}", issue);
    }

    debug!(
        "评估场景 {}/{}（目标 {}）: passed={} trivial={}",
        scored, scenario_total, target, passed, trivial
    );

    CompletionReport {
        passed,
        trivial,
        progress_percent,
        scored_items,
        scenario_total,
        target,
        issue,
    }
}

/// 直接评估原始成绩
pub fn evaluate_results<'a>(
    requirement: &CompletionRequirement,
    items: impl IntoIterator<Item = &'a CurriculumItem>,
    results: &[ParticipantResult],
) -> CompletionReport {
    evaluate(requirement, items, &best_scores(results))
}
