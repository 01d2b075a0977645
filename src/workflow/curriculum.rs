//! 课程模型 - 工作流层
//!
//! 持有一次编辑或浏览会话中的有序条目列表。
//!
//! 每次调用后保持：
//! - 条目 ID 唯一
//! - 任意两个条目的 `(kind, refId)` 不相同
//! - `order` 等于条目位置（从 0 开始连续编号）
//!
//! 每个操作要么完整生效，要么返回错误且列表不变。

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::error::CurriculumError;
use crate::infrastructure::ScenarioCatalog;
use crate::models::{CurriculumItem, ItemId, ItemKey, ItemKind, Payload, Platform};
use crate::services::duration;

const DEFAULT_ID_PREFIX: &str = "item";

/// 单个条目的展示字段（已用场景目录补全）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDisplay {
    pub id: ItemId,
    pub order: usize,
    pub kind: ItemKind,
    pub title: String,
    pub duration_label: String,
    /// 场景贡献者或视频作者
    pub author: String,
    pub platform: Option<Platform>,
}

/// 有序、去重的课程
#[derive(Debug, Clone)]
pub struct CurriculumModel {
    items: Vec<CurriculumItem>,
    id_prefix: String,
    next_seq: u64,
}

impl Default for CurriculumModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CurriculumModel {
    /// 空课程
    pub fn new() -> Self {
        Self::with_id_prefix(DEFAULT_ID_PREFIX)
    }

    /// 空课程，生成的 ID 以 `prefix` 开头
    pub fn with_id_prefix(prefix: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            id_prefix: prefix.into(),
            next_seq: 1,
        }
    }

    /// 从已保存的条目列表构建
    ///
    /// 存储的数据可能不干净：与前面条目 key 或 ID 重复的条目会被丢弃并记录警告，
    /// `order` 按位置重建。
    pub fn hydrate(items: impl IntoIterator<Item = CurriculumItem>) -> Self {
        let mut model = Self::new();
        for item in items {
            let id = item.id().clone();
            if let Err(e) = model.append(item) {
                warn!("⚠️ 丢弃已保存的课程条目 {}: {}", id, e);
            }
        }
        model
    }

    pub fn items(&self) -> &[CurriculumItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 课程显示的课时数（每个条目算一个课时）
    pub fn session_count(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, id: &ItemId) -> Option<&CurriculumItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn contains_key(&self, key: &ItemKey) -> bool {
        self.items.iter().any(|item| item.key() == *key)
    }

    pub fn scenario_items(&self) -> impl Iterator<Item = &CurriculumItem> + '_ {
        self.items.iter().filter(|item| item.is_scenario())
    }

    pub fn scenario_count(&self) -> usize {
        self.scenario_items().count()
    }

    /// 在末尾添加条目
    ///
    /// # 错误
    /// - `DuplicateItem`: 同一场景或视频已存在
    /// - `DuplicateId`: ID 已被占用
    pub fn append(&mut self, mut item: CurriculumItem) -> Result<&CurriculumItem, CurriculumError> {
        let key = item.key();
        if self.contains_key(&key) {
            debug!("拒绝重复条目 {}", key);
            return Err(CurriculumError::DuplicateItem { key });
        }
        if self.get(item.id()).is_some() {
            return Err(CurriculumError::DuplicateId {
                id: item.id().clone(),
            });
        }

        item.set_order(self.items.len());
        self.items.push(item);
        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    /// 以新生成的 ID 在末尾添加内容
    pub fn append_payload(&mut self, payload: Payload) -> Result<ItemId, CurriculumError> {
        let key = payload.key();
        if self.contains_key(&key) {
            return Err(CurriculumError::DuplicateItem { key });
        }
        let id = self.fresh_id(&key);
        self.append(CurriculumItem::new(id.clone(), payload))?;
        Ok(id)
    }

    /// 按 ID 删除，返回被删除的条目
    pub fn remove(&mut self, id: &ItemId) -> Result<CurriculumItem, CurriculumError> {
        let index = self
            .position(id)
            .ok_or_else(|| CurriculumError::NotFound { id: id.clone() })?;
        let removed = self.items.remove(index);
        self.renumber();
        Ok(removed)
    }

    /// 把 `from` 处的条目移动到 `to`
    ///
    /// 两个索引都必须在 `[0, len)` 内。条目集合不变，只有位置（以及 `order`）改变。
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), CurriculumError> {
        let len = self.items.len();
        for index in [from, to] {
            if index >= len {
                return Err(CurriculumError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let item = self.items.remove(from);
        self.items.insert(to, item);
        self.renumber();
        Ok(())
    }

    /// 把另一个课程的条目合并到末尾
    ///
    /// 导入的条目都使用新 ID，不沿用来源 ID。
    /// 场景或视频已存在的条目会跳过，因此同一来源导入两次只会添加一次。
    ///
    /// # 参数
    /// - `source`: 来源条目
    ///
    /// # 返回
    /// 实际新增的条目数
    pub fn import_from<'a>(&mut self, source: impl IntoIterator<Item = &'a CurriculumItem>) -> usize {
        let mut added = 0;
        for item in source {
            let key = item.key();
            if self.contains_key(&key) {
                debug!("导入时跳过 {}（已存在）", key);
                continue;
            }
            let id = self.fresh_id(&key);
            let mut copy = item.clone().with_id(id);
            copy.set_order(self.items.len());
            self.items.push(copy);
            added += 1;
        }
        added
    }

    /// 所有条目的总分钟数；无法解析的时长按 0 计
    pub fn total_minutes(&self) -> u32 {
        let seconds: u32 = self
            .items
            .iter()
            .map(|item| {
                let label = item.payload().duration_label();
                duration::parse_seconds(label).unwrap_or_else(|| {
                    debug!("条目 {} 的时长无法解析 ({:?})", item.id(), label);
                    0
                })
            })
            .fold(0u32, |acc, secs| acc.saturating_add(secs));
        seconds / 60
    }

    /// 总时长文本，例如 `"1시간 15분"`；空课程为 `"0분"`
    pub fn total_duration(&self) -> String {
        duration::format_minutes(self.total_minutes())
    }

    /// 带图片的场景条目的 `(条目 ID, 图片)` 对
    ///
    /// 每次调用都按当前条目重新计算。
    pub fn thumbnail_candidates(&self) -> impl Iterator<Item = (&ItemId, &str)> + '_ {
        self.items.iter().flat_map(|item| {
            let images: &[String] = match item.payload() {
                Payload::Scenario(s) => &s.images,
                Payload::Video(_) => &[],
            };
            images.iter().map(move |image| (item.id(), image.as_str()))
        })
    }

    /// 展示行：优先使用场景目录数据，缺失时回退到条目自带字段
    pub fn display_entries(&self, catalog: &dyn ScenarioCatalog) -> Vec<ItemDisplay> {
        self.items
            .iter()
            .map(|item| match item.payload() {
                Payload::Scenario(s) => {
                    let meta = catalog.get(s.ref_id);
                    let pick = |from_catalog: Option<&String>, inline: &String| {
                        from_catalog
                            .filter(|v| !v.is_empty())
                            .unwrap_or(inline)
                            .clone()
                    };
                    ItemDisplay {
                        id: item.id().clone(),
                        order: item.order(),
                        kind: ItemKind::Scenario,
                        title: pick(meta.map(|m| &m.title), &s.title),
                        duration_label: pick(meta.map(|m| &m.duration_label), &s.duration_label),
                        author: pick(meta.map(|m| &m.contributor), &s.contributor),
                        platform: Some(meta.map_or(s.platform, |m| m.platform)),
                    }
                }
                Payload::Video(v) => ItemDisplay {
                    id: item.id().clone(),
                    order: item.order(),
                    kind: ItemKind::Video,
                    title: v.title.clone(),
                    duration_label: v.duration_label.clone(),
                    author: v.author.name.clone(),
                    platform: None,
                },
            })
            .collect()
    }

    /// 用场景目录补全场景条目的空白字段
    ///
    /// 只补全空标题、空或 `-` 的时长、空贡献者以及缺失的图片。
    /// 目录中没有的场景保留原有字段。
    ///
    /// # 返回
    /// 发生变化的条目数
    pub fn fill_from_catalog(&mut self, catalog: &dyn ScenarioCatalog) -> usize {
        let mut changed = 0;
        for item in &mut self.items {
            let Payload::Scenario(s) = item.payload_mut() else {
                continue;
            };
            let Some(meta) = catalog.get(s.ref_id) else {
                continue;
            };

            let mut touched = false;
            if s.title.trim().is_empty() && !meta.title.is_empty() {
                s.title = meta.title.clone();
                touched = true;
            }
            let blank_duration = s.duration_label.trim().is_empty() || s.duration_label.trim() == "-";
            if blank_duration && !meta.duration_label.is_empty() {
                s.duration_label = meta.duration_label.clone();
                touched = true;
            }
            if s.contributor.trim().is_empty() && !meta.contributor.is_empty() {
                s.contributor = meta.contributor.clone();
                touched = true;
            }
            if s.images.is_empty() && !meta.sample_images.is_empty() {
                s.images = meta.sample_images.clone();
                touched = true;
            }
            if touched {
                changed += 1;
            }
        }
        changed
    }

    /// 按当前顺序排列的 ID
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id().clone()).collect()
    }

    pub fn into_items(self) -> Vec<CurriculumItem> {
        self.items
    }

    fn renumber(&mut self) {
        for (position, item) in self.items.iter_mut().enumerate() {
            item.set_order(position);
        }
    }

    /// 生成 `{prefix}-{kind}-{ref}-{seq}` 形式、列表中未使用的新 ID
    fn fresh_id(&mut self, key: &ItemKey) -> ItemId {
        let taken: HashSet<&str> = self.items.iter().map(|i| i.id().as_str()).collect();
        let reference = match key {
            ItemKey::Scenario(id) => id.to_string(),
            ItemKey::Video(id) => id.clone(),
        };
        loop {
            let candidate = format!(
                "{}-{}-{}-{}",
                self.id_prefix,
                key.kind(),
                reference,
                self.next_seq
            );
            self.next_seq += 1;
            if !taken.contains(candidate.as_str()) {
                return ItemId::new(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryScenarioCatalog;
    use crate::models::{Author, AuthorType, ScenarioMetadata, ScenarioRef, VideoLecture};

    fn scenario(id: &str, ref_id: u32, duration: &str) -> CurriculumItem {
        CurriculumItem::scenario(id, ScenarioRef::new(ref_id, format!("Scenario {}", ref_id), duration))
    }

    fn video(id: &str, ref_id: &str, duration: &str) -> CurriculumItem {
        let author = Author {
            name: "Medicrew".to_string(),
            kind: AuthorType::Institution,
        };
        CurriculumItem::video(id, VideoLecture::new(ref_id, "Lecture", duration, author))
    }

    fn assert_dense(model: &CurriculumModel) {
        for (position, item) in model.items().iter().enumerate() {
            assert_eq!(item.order(), position);
        }
    }

    #[test]
    fn test_append_rejects_duplicates() {
        let mut model = CurriculumModel::new();
        model.append(scenario("a", 1, "10분")).unwrap();
        model.append(video("b", "v-1", "5분")).unwrap();

        assert_eq!(
            model.append(scenario("c", 1, "10분")).unwrap_err(),
            CurriculumError::DuplicateItem {
                key: ItemKey::Scenario(1)
            }
        );
        assert_eq!(
            model.append(scenario("a", 2, "10분")).unwrap_err(),
            CurriculumError::DuplicateId { id: "a".into() }
        );
        assert_eq!(model.len(), 2);
        assert_dense(&model);
    }

    #[test]
    fn test_same_ref_different_kind_is_not_a_duplicate() {
        let mut model = CurriculumModel::new();
        model.append(scenario("a", 7, "10분")).unwrap();
        model.append(video("b", "7", "10분")).unwrap();
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_remove_renumbers() {
        let mut model = CurriculumModel::hydrate([
            scenario("a", 1, "1분"),
            scenario("b", 2, "1분"),
            scenario("c", 3, "1분"),
        ]);
        let removed = model.remove(&"b".into()).unwrap();
        assert_eq!(removed.id().as_str(), "b");
        assert_eq!(model.ids(), vec![ItemId::from("a"), ItemId::from("c")]);
        assert_dense(&model);
        assert_eq!(model.clone().into_items()[1].order(), 1);

        assert_eq!(
            model.remove(&"b".into()).unwrap_err(),
            CurriculumError::NotFound { id: "b".into() }
        );
    }

    #[test]
    fn test_reorder_preserves_membership() {
        let items = vec![
            scenario("a", 1, "1분"),
            scenario("b", 2, "1분"),
            video("c", "v", "1분"),
            scenario("d", 3, "1분"),
        ];
        for from in 0..items.len() {
            for to in 0..items.len() {
                let mut model = CurriculumModel::hydrate(items.clone());
                let mut before = model.ids();
                let moved = before[from].clone();
                model.reorder(from, to).unwrap();

                let mut after = model.ids();
                assert_eq!(after[to], moved);
                before.sort();
                after.sort();
                assert_eq!(before, after);
                assert_dense(&model);
            }
        }
    }

    #[test]
    fn test_reorder_out_of_range() {
        let mut model = CurriculumModel::hydrate([scenario("a", 1, "1분"), scenario("b", 2, "1분")]);
        assert_eq!(
            model.reorder(0, 2).unwrap_err(),
            CurriculumError::IndexOutOfRange { index: 2, len: 2 }
        );
        assert_eq!(
            model.reorder(5, 0).unwrap_err(),
            CurriculumError::IndexOutOfRange { index: 5, len: 2 }
        );
        assert_eq!(model.ids(), vec![ItemId::from("a"), ItemId::from("b")]);

        let mut empty = CurriculumModel::new();
        assert!(empty.reorder(0, 0).is_err());
    }

    #[test]
    fn test_import_is_idempotent_and_renames() {
        let source = vec![
            scenario("src-1", 1, "10분"),
            video("src-2", "v-1", "5분"),
            scenario("src-3", 2, "10분"),
        ];
        let mut model = CurriculumModel::hydrate([scenario("mine", 2, "10분")]);

        assert_eq!(model.import_from(&source), 2);
        assert_eq!(model.import_from(&source), 0);
        assert_eq!(model.len(), 3);

        let keys: HashSet<ItemKey> = model.items().iter().map(|i| i.key()).collect();
        assert_eq!(keys.len(), model.len());
        for item in model.items() {
            assert!(!item.id().as_str().starts_with("src-"));
        }
        assert_dense(&model);
    }

    #[test]
    fn test_import_from_self_adds_nothing() {
        let mut model = CurriculumModel::hydrate([scenario("a", 1, "1분")]);
        let snapshot = model.items().to_vec();
        assert_eq!(model.import_from(&snapshot), 0);
    }

    #[test]
    fn test_hydrate_drops_dirty_entries() {
        let model = CurriculumModel::hydrate([
            scenario("a", 1, "1분"),
            scenario("b", 1, "1분"),
            scenario("a", 2, "1분"),
        ]);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_append_payload_synthesizes_ids() {
        let mut model = CurriculumModel::with_id_prefix("class-9");
        let id = model
            .append_payload(Payload::Scenario(ScenarioRef::new(4, "CPR", "20분")))
            .unwrap();
        assert_eq!(id.as_str(), "class-9-scenario-4-1");
        assert!(model
            .append_payload(Payload::Scenario(ScenarioRef::new(4, "CPR", "20분")))
            .is_err());
    }

    #[test]
    fn test_total_duration() {
        let model = CurriculumModel::hydrate([scenario("a", 1, "10분"), video("b", "v", "1시간 5분")]);
        assert_eq!(model.total_duration(), "1시간 15분");
        assert_eq!(CurriculumModel::new().total_duration(), "0분");

        let model = CurriculumModel::hydrate([scenario("a", 1, "-"), scenario("b", 2, "05:30"), scenario("c", 3, "5분 30초")]);
        assert_eq!(model.total_duration(), "11분");
    }

    #[test]
    fn test_thumbnail_candidates_follow_current_state() {
        let mut with_images = ScenarioRef::new(1, "Vital signs", "7분");
        with_images.images = vec!["/img/1a.jpg".to_string(), "/img/1b.jpg".to_string()];
        let mut model = CurriculumModel::hydrate([
            CurriculumItem::scenario("a", with_images),
            scenario("b", 2, "5분"),
            video("c", "v", "5분"),
        ]);

        let first: Vec<(String, String)> = model
            .thumbnail_candidates()
            .map(|(id, img)| (id.to_string(), img.to_string()))
            .collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0], ("a".to_string(), "/img/1a.jpg".to_string()));
        assert_eq!(model.thumbnail_candidates().count(), 2);

        model.remove(&"a".into()).unwrap();
        assert_eq!(model.thumbnail_candidates().count(), 0);
    }

    #[test]
    fn test_catalog_enrichment_tolerates_missing_entries() {
        let catalog = InMemoryScenarioCatalog::new([ScenarioMetadata {
            ref_id: 1,
            title: "Vital signs".to_string(),
            duration_label: "7분".to_string(),
            contributor: "Medicrew".to_string(),
            platform: Platform::Both,
            sample_images: vec!["/img/1.jpg".to_string()],
        }]);
        let mut model = CurriculumModel::hydrate([
            CurriculumItem::scenario("a", ScenarioRef::new(1, "", "-")),
            scenario("b", 2, "5분"),
        ]);

        let rows = model.display_entries(&catalog);
        assert_eq!(rows[0].title, "Vital signs");
        assert_eq!(rows[0].platform, Some(Platform::Both));
        assert_eq!(rows[1].title, "Scenario 2");

        assert_eq!(model.fill_from_catalog(&catalog), 1);
        assert_eq!(model.total_duration(), "12분");
        assert_eq!(model.thumbnail_candidates().count(), 1);
        assert_eq!(model.fill_from_catalog(&catalog), 0);
    }
}
