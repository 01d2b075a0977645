//! 场景目录 - 基础设施层
//!
//! 仅用于补全展示信息，调用方必须能处理条目缺失。

use std::collections::HashMap;

use crate::models::ScenarioMetadata;

/// 场景查询接口
pub trait ScenarioCatalog {
    fn get(&self, ref_id: u32) -> Option<&ScenarioMetadata>;
}

/// 内存中的场景目录
#[derive(Debug, Clone, Default)]
pub struct InMemoryScenarioCatalog {
    scenarios: HashMap<u32, ScenarioMetadata>,
}

impl InMemoryScenarioCatalog {
    pub fn new(scenarios: impl IntoIterator<Item = ScenarioMetadata>) -> Self {
        Self {
            scenarios: scenarios.into_iter().map(|s| (s.ref_id, s)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl ScenarioCatalog for InMemoryScenarioCatalog {
    fn get(&self, ref_id: u32) -> Option<&ScenarioMetadata> {
        self.scenarios.get(&ref_id)
    }
}
