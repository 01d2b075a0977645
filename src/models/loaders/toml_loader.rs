use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::FileError;

use crate::models::class_record::ClassRecord;
use crate::models::participant_result::ParticipantResult;
use crate::models::scenario::ScenarioMetadata;

/// 单个课程文件：课程记录以及当前查看者已有的成绩
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassFile {
    pub class: ClassRecord,
    #[serde(default)]
    pub results: Vec<ParticipantResult>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    scenarios: Vec<ScenarioMetadata>,
}

/// 加载单个课程文件
pub async fn load_class_file(toml_file_path: &Path) -> Result<ClassFile, FileError> {
    let shown = toml_file_path.to_string_lossy().to_string();
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| FileError::read_failed(shown.clone(), e))?;

    let mut file: ClassFile =
        toml::from_str(&content).map_err(|e| FileError::toml_parse_failed(shown.clone(), e))?;

    file.file_path = Some(shown);

    Ok(file)
}

/// 加载文件夹中所有 `*.toml` 课程文件，按文件名排序
///
/// # 参数
/// - `folder_path`: 课程文件夹路径
///
/// # 返回
/// 成功加载的课程文件；加载失败的文件记录警告后跳过
pub async fn load_all_class_files(folder_path: &str) -> Result<Vec<ClassFile>, FileError> {
    let folder = PathBuf::from(folder_path);

    if !folder.is_dir() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        });
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| FileError::read_failed(folder_path, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FileError::read_failed(folder_path, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_class_file(&path).await {
            Ok(file) => {
                tracing::info!(
                    "✓ 已加载 \"{}\"，共 {} 个课程条目",
                    file.class.title,
                    file.class.curriculum.len()
                );
                files.push(file);
            }
            Err(e) => {
                tracing::warn!("⚠️ 跳过 {}: {}", path.display(), e);
            }
        }
    }

    Ok(files)
}

/// 加载场景目录文件（`[[scenarios]]` 表）
pub async fn load_scenario_catalog(path: &Path) -> Result<Vec<ScenarioMetadata>, FileError> {
    let shown = path.to_string_lossy().to_string();
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| FileError::read_failed(shown.clone(), e))?;

    let catalog: CatalogFile =
        toml::from_str(&content).map_err(|e| FileError::toml_parse_failed(shown, e))?;

    tracing::debug!("场景目录 {} 共 {} 个场景", path.display(), catalog.scenarios.len());
    Ok(catalog.scenarios)
}
