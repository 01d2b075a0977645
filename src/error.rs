use thiserror::Error;

use crate::models::{ClassId, ItemId, ItemKey};

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 课程编排错误
    #[error("课程编排错误: {0}")]
    Curriculum(#[from] CurriculumError),
    /// 密码门错误
    #[error("密码门错误: {0}")]
    Gate(#[from] GateError),
    /// 完成条件错误
    #[error("完成条件错误: {0}")]
    Requirement(#[from] RequirementError),
    /// 课程仓库错误
    #[error("仓库错误: {0}")]
    Repository(#[from] RepositoryError),
    /// 课程编辑错误
    #[error("编辑错误: {0}")]
    Authoring(#[from] AuthoringError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 课程编排错误
///
/// 均可在本地恢复：修改不会生效，由调用方展示错误信息。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurriculumError {
    /// 同一场景或视频已在课程中
    #[error("{key} 已在课程中")]
    DuplicateItem { key: ItemKey },
    /// 该 id 已被其他条目占用
    #[error("条目 id {id} 已被占用")]
    DuplicateId { id: ItemId },
    /// 没有该 id 的条目
    #[error("课程中没有 id 为 {id} 的条目")]
    NotFound { id: ItemId },
    /// 索引不在 `[0, len)` 内
    #[error("索引 {index} 超出范围（课程共 {len} 项）")]
    IndexOutOfRange { index: usize, len: usize },
}

/// 密码门错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// 输入的密码不匹配
    #[error("密码不匹配")]
    PasswordMismatch,
    /// 当前用户无权执行该操作
    #[error("无权{action}")]
    NotPermitted { action: &'static str },
    /// 当前状态下不允许该操作
    #[error("密码门处于 {state} 状态，无法{action}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    /// 密码修改请求尚未返回
    #[error("密码修改正在进行中")]
    Busy,
    /// 新密码为空
    #[error("新密码不能为空")]
    EmptyPassword,
    /// 仓库拒绝了新密码
    #[error("更新密码失败: {reason}")]
    UpdateFailed { reason: String },
}

/// 完成条件错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementError {
    /// 要求的场景数超过课程中的场景数
    #[error("需要完成 {min_scenarios} 个场景，但课程只有 {available} 个")]
    MinScenariosExceedsAvailable { min_scenarios: u32, available: usize },
    /// `min_scenarios` 至少为 1
    #[error("最少场景数至少为 1")]
    MinScenariosZero,
    /// `min_passing_score` 必须在 0..=100 内
    #[error("及格分 {score} 不在 0..=100 范围内")]
    PassingScoreOutOfRange { score: u32 },
}

/// 课程仓库错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// 传输失败
    #[error("网络错误: {0}")]
    Network(String),
    /// 记录未通过校验
    #[error("校验失败: {0}")]
    Validation(String),
    /// 课程不存在
    #[error("课程 {0} 不存在")]
    NotFound(ClassId),
}

/// 课程编辑错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthoringError {
    /// 缺少执行该操作的权限
    #[error("无权{action}")]
    NotPermitted { action: &'static str },
    /// 草稿无法直接提交
    #[error("课程无效: {0}")]
    Invalid(String),
    /// 草稿的完成条件不合法
    #[error(transparent)]
    Requirement(#[from] RequirementError),
    /// 仓库调用失败
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取失败
    #[error("读取 {path} 失败: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入失败
    #[error("写入 {path} 失败: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("解析 TOML {path} 失败: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// JSON 序列化/反序列化失败
    #[error("处理 JSON {path} 失败: {source}")]
    JsonFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 环境变量无法解析
    #[error("环境变量 {var_name}: '{value}' 不是有效的 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl FileError {
    pub fn read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            FileError::NotFound { path: path.into() }
        } else {
            FileError::ReadFailed {
                path: path.into(),
                source,
            }
        }
    }

    pub fn write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        FileError::WriteFailed {
            path: path.into(),
            source,
        }
    }

    pub fn toml_parse_failed(path: impl Into<String>, source: toml::de::Error) -> Self {
        FileError::TomlParseFailed {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
