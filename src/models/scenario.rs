use serde::{Deserialize, Serialize};

use crate::models::curriculum_item::Platform;

/// 场景目录提供的场景详情
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    pub ref_id: u32,
    pub title: String,
    #[serde(default)]
    pub duration_label: String,
    #[serde(default)]
    pub contributor: String,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub sample_images: Vec<String>,
}
