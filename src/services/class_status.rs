//! 参与状态 - 服务层
//!
//! 通过注入的客户端存储记录用户正在参与（以及加入购物车）的课程，
//! 并推导“我的课程”中显示的状态。

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::error::FileError;
use crate::infrastructure::ClientStateStore;
use crate::models::{ClassId, ParticipationPeriod};
use crate::services::completion::CompletionReport;

const PARTICIPATING_PREFIX: &str = "participating:";
const CART_PREFIX: &str = "cart:";

/// 当前用户看到的课程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    /// 可参与，尚未开始
    Eligible,
    /// 已开始
    Participating,
    /// 已满足完成条件，可获得证书
    Completed,
    /// 参与期间已结束
    Ended,
}

impl ClassStatus {
    pub fn label(self) -> &'static str {
        match self {
            ClassStatus::Eligible => "참여가능",
            ClassStatus::Participating => "참여중",
            ClassStatus::Completed => "이수완료",
            ClassStatus::Ended => "종료",
        }
    }
}

impl fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 读取客户端存储；只通过下面的显式调用写入
pub struct ParticipationTracker<S: ClientStateStore> {
    store: S,
}

impl<S: ClientStateStore> ParticipationTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_participating(&self, class_id: ClassId) -> bool {
        self.store.get(&participating_key(class_id))
    }

    pub fn mark_participating(&mut self, class_id: ClassId) -> Result<(), FileError> {
        debug!("课程 {} 标记为参与中", class_id);
        self.store.set(&participating_key(class_id), true)
    }

    pub fn clear_participating(&mut self, class_id: ClassId) -> Result<(), FileError> {
        self.store.set(&participating_key(class_id), false)
    }

    pub fn in_cart(&self, class_id: ClassId) -> bool {
        self.store.get(&cart_key(class_id))
    }

    pub fn add_to_cart(&mut self, class_id: ClassId) -> Result<(), FileError> {
        self.store.set(&cart_key(class_id), true)
    }

    pub fn remove_from_cart(&mut self, class_id: ClassId) -> Result<(), FileError> {
        self.store.set(&cart_key(class_id), false)
    }

    /// 当前标记为参与中的课程（升序）
    pub fn participating_classes(&self) -> Vec<ClassId> {
        ids_with_prefix(&self.store.keys(), PARTICIPATING_PREFIX)
    }

    pub fn cart(&self) -> Vec<ClassId> {
        ids_with_prefix(&self.store.keys(), CART_PREFIX)
    }

    /// 计算单个课程的状态
    ///
    /// # 参数
    /// - `class_id`: 课程 ID
    /// - `period`: 参与期间（如有）
    /// - `report`: 最新的完成度评估（用户有成绩时）
    /// - `today`: 判断参与期间所用的日期
    pub fn status(
        &self,
        class_id: ClassId,
        period: Option<&ParticipationPeriod>,
        report: Option<&CompletionReport>,
        today: NaiveDate,
    ) -> ClassStatus {
        let completed = report.is_some_and(|r| r.certificate_eligible());
        if !completed && !self.is_participating(class_id) {
            return ClassStatus::Eligible;
        }
        if period.is_some_and(|p| p.has_ended(today)) {
            return ClassStatus::Ended;
        }
        if completed {
            ClassStatus::Completed
        } else {
            ClassStatus::Participating
        }
    }
}

fn participating_key(class_id: ClassId) -> String {
    format!("{}{}", PARTICIPATING_PREFIX, class_id)
}

fn cart_key(class_id: ClassId) -> String {
    format!("{}{}", CART_PREFIX, class_id)
}

fn ids_with_prefix(keys: &[String], prefix: &str) -> Vec<ClassId> {
    let mut ids: Vec<ClassId> = keys
        .iter()
        .filter_map(|k| k.strip_prefix(prefix))
        .filter_map(|id| id.parse().ok())
        .collect();
    ids.sort_unstable();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryClientState;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn report(passed: bool, trivial: bool) -> CompletionReport {
        CompletionReport {
            passed,
            trivial,
            progress_percent: if passed { 100 } else { 50 },
            scored_items: Vec::new(),
            scenario_total: 2,
            target: 2,
            issue: None,
        }
    }

    #[test]
    fn test_status_transitions() {
        let mut tracker = ParticipationTracker::new(MemoryClientState::new());
        let period = ParticipationPeriod {
            start_date: date(2026, 3, 1),
            end_date: date(2026, 3, 31),
        };
        let today = date(2026, 3, 15);

        assert_eq!(tracker.status(1, Some(&period), None, today), ClassStatus::Eligible);

        tracker.mark_participating(1).unwrap();
        assert_eq!(
            tracker.status(1, Some(&period), Some(&report(false, false)), today),
            ClassStatus::Participating
        );
        assert_eq!(
            tracker.status(1, Some(&period), Some(&report(true, false)), today),
            ClassStatus::Completed
        );
        assert_eq!(
            tracker.status(1, Some(&period), Some(&report(true, true)), today),
            ClassStatus::Participating
        );
        assert_eq!(
            tracker.status(1, Some(&period), None, date(2026, 4, 1)),
            ClassStatus::Ended
        );
    }

    #[test]
    fn test_untracked_class_stays_eligible_after_end() {
        let tracker = ParticipationTracker::new(MemoryClientState::new());
        let period = ParticipationPeriod {
            start_date: date(2026, 1, 1),
            end_date: date(2026, 1, 31),
        };
        assert_eq!(
            tracker.status(4, Some(&period), None, date(2026, 6, 1)),
            ClassStatus::Eligible
        );
    }

    #[test]
    fn test_cart_and_participation_are_separate() {
        let mut tracker = ParticipationTracker::new(MemoryClientState::new());
        tracker.add_to_cart(3).unwrap();
        tracker.add_to_cart(1).unwrap();
        tracker.mark_participating(2).unwrap();

        assert_eq!(tracker.cart(), vec![1, 3]);
        assert!(tracker.in_cart(3));
        assert_eq!(tracker.participating_classes(), vec![2]);
        assert!(!tracker.is_participating(3));

        tracker.remove_from_cart(3).unwrap();
        tracker.clear_participating(2).unwrap();
        assert_eq!(tracker.cart(), vec![1]);
        assert!(tracker.participating_classes().is_empty());
        assert_eq!(ClassStatus::Completed.to_string(), "이수완료");
    }
}
