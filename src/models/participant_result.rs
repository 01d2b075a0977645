use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::curriculum_item::ItemId;

/// 参与者完成一次场景条目的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantResult {
    pub item_id: ItemId,
    pub score: u32,
    pub completed_at: DateTime<Utc>,
}

impl ParticipantResult {
    pub fn new(item_id: impl Into<ItemId>, score: u32, completed_at: DateTime<Utc>) -> Self {
        Self {
            item_id: item_id.into(),
            score,
            completed_at,
        }
    }
}
