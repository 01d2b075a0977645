use serde::{Deserialize, Serialize};
use std::fmt;

/// 课程条目 ID（在同一课程内唯一）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// 条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// VR 模拟场景
    Scenario,
    /// 视频讲座
    Video,
}

impl ItemKind {
    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Scenario => "scenario",
            ItemKind::Video => "video",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 条目的内容标识：`(kind, refId)`
///
/// 同一课程中不会有两个 key 相同的条目。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKey {
    Scenario(u32),
    Video(String),
}

impl ItemKey {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemKey::Scenario(_) => ItemKind::Scenario,
            ItemKey::Video(_) => ItemKind::Video,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Scenario(id) => write!(f, "scenario#{}", id),
            ItemKey::Video(id) => write!(f, "video#{}", id),
        }
    }
}

/// 场景支持的平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    #[default]
    Vr,
    Mobile,
    Pc,
    Both,
}

impl Platform {
    /// 规范化自由格式的平台文本，例如 `"VR, Mobile/PC"`
    ///
    /// 无法识别时默认为 VR。
    pub fn normalize(label: &str) -> Self {
        let p = label.trim();
        match p.to_ascii_lowercase().as_str() {
            "vr" => return Platform::Vr,
            "mobile" => return Platform::Mobile,
            "pc" => return Platform::Pc,
            "both" => return Platform::Both,
            _ => {}
        }
        if p.starts_with("VR") || p.contains("VR,") {
            Platform::Vr
        } else if p.starts_with("Mobile") {
            Platform::Mobile
        } else if p.starts_with("PC") {
            Platform::Pc
        } else {
            Platform::Vr
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Vr => "VR",
            Platform::Mobile => "Mobile",
            Platform::Pc => "PC",
            Platform::Both => "both",
        }
    }
}

impl From<String> for Platform {
    fn from(label: String) -> Self {
        Platform::normalize(&label)
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.label().to_string()
    }
}

/// 视频讲座的作者类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorType {
    Institution,
    #[default]
    Individual,
}

/// 视频讲座的作者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: AuthorType,
}

/// 场景内容，只带最基本的字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRef {
    pub ref_id: u32,
    pub title: String,
    #[serde(default)]
    pub duration_label: String,
    #[serde(default)]
    pub contributor: String,
    #[serde(default)]
    pub platform: Platform,
    /// 示例图片（模拟画面）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl ScenarioRef {
    pub fn new(ref_id: u32, title: impl Into<String>, duration_label: impl Into<String>) -> Self {
        Self {
            ref_id,
            title: title.into(),
            duration_label: duration_label.into(),
            contributor: String::new(),
            platform: Platform::default(),
            images: Vec::new(),
        }
    }
}

/// 视频讲座内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoLecture {
    pub ref_id: String,
    pub title: String,
    #[serde(default)]
    pub duration_label: String,
    pub author: Author,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VideoLecture {
    pub fn new(
        ref_id: impl Into<String>,
        title: impl Into<String>,
        duration_label: impl Into<String>,
        author: Author,
    ) -> Self {
        Self {
            ref_id: ref_id.into(),
            title: title.into(),
            duration_label: duration_label.into(),
            author,
            url: String::new(),
            description: None,
        }
    }
}

/// 条目内容，按类型区分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    Scenario(ScenarioRef),
    Video(VideoLecture),
}

impl Payload {
    pub fn kind(&self) -> ItemKind {
        match self {
            Payload::Scenario(_) => ItemKind::Scenario,
            Payload::Video(_) => ItemKind::Video,
        }
    }

    pub fn key(&self) -> ItemKey {
        match self {
            Payload::Scenario(s) => ItemKey::Scenario(s.ref_id),
            Payload::Video(v) => ItemKey::Video(v.ref_id.clone()),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Payload::Scenario(s) => &s.title,
            Payload::Video(v) => &v.title,
        }
    }

    pub fn duration_label(&self) -> &str {
        match self {
            Payload::Scenario(s) => &s.duration_label,
            Payload::Video(v) => &v.duration_label,
        }
    }
}

/// 课程中的一个条目
///
/// `order` 与条目在课程中的位置一致，只由所属的课程模型改写。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumItem {
    id: ItemId,
    #[serde(default)]
    order: usize,
    payload: Payload,
}

impl CurriculumItem {
    pub fn new(id: impl Into<ItemId>, payload: Payload) -> Self {
        Self {
            id: id.into(),
            order: 0,
            payload,
        }
    }

    pub fn scenario(id: impl Into<ItemId>, scenario: ScenarioRef) -> Self {
        Self::new(id, Payload::Scenario(scenario))
    }

    pub fn video(id: impl Into<ItemId>, video: VideoLecture) -> Self {
        Self::new(id, Payload::Video(video))
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn kind(&self) -> ItemKind {
        self.payload.kind()
    }

    pub fn key(&self) -> ItemKey {
        self.payload.key()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn is_scenario(&self) -> bool {
        matches!(self.payload, Payload::Scenario(_))
    }

    pub(crate) fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }

    pub(crate) fn set_order(&mut self, order: usize) {
        self.order = order;
    }

    pub(crate) fn with_id(mut self, id: ItemId) -> Self {
        self.id = id;
        self
    }
}
