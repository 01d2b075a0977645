use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::{AccessContext, LicenseTier, Role};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 存放课程 TOML 文件的文件夹
    pub class_folder: String,
    /// 可选的场景目录 TOML 文件
    pub catalog_file: Option<String>,
    /// 保存客户端状态（参与、购物车）的 JSON 文件
    pub client_state_file: String,
    /// 查看者的角色
    pub viewer_role: Role,
    /// 查看者的许可类型，例如 `pro_class`
    pub viewer_license: Option<String>,
    /// 查看者是否处于管理界面
    pub viewing_as_manager: bool,
    /// 是否输出 debug 级别日志
    pub verbose_logging: bool,
    /// 无法解析、已回退为默认值的环境变量
    pub issues: Vec<ConfigError>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            class_folder: "classes".to_string(),
            catalog_file: None,
            client_state_file: "client_state.json".to_string(),
            viewer_role: Role::Guest,
            viewer_license: None,
            viewing_as_manager: false,
            verbose_logging: false,
            issues: Vec::new(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意变量来源构建配置
    ///
    /// 无法解析的值保留默认值并记录到 `issues`，此时日志通常尚未初始化。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut issues = Vec::new();

        let viewer_role = parsed(&lookup, "VIEWER_ROLE", "role", default.viewer_role, &mut issues);
        let viewing_as_manager = parsed(
            &lookup,
            "VIEWING_AS_MANAGER",
            "bool",
            default.viewing_as_manager,
            &mut issues,
        );
        let verbose_logging = parsed(
            &lookup,
            "VERBOSE_LOGGING",
            "bool",
            default.verbose_logging,
            &mut issues,
        );

        Self {
            class_folder: non_empty("CLASS_FOLDER").unwrap_or(default.class_folder),
            catalog_file: non_empty("CATALOG_FILE").or(default.catalog_file),
            client_state_file: non_empty("CLIENT_STATE_FILE").unwrap_or(default.client_state_file),
            viewer_role,
            viewer_license: non_empty("VIEWER_LICENSE").or(default.viewer_license),
            viewing_as_manager,
            verbose_logging,
            issues,
        }
    }

    /// 配置中查看者的访问上下文
    pub fn session(&self) -> AccessContext {
        AccessContext::new(
            self.viewer_role,
            LicenseTier::from_license_type(self.viewer_license.as_deref()),
            self.viewing_as_manager,
        )
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
    default: T,
    issues: &mut Vec<ConfigError>,
) -> T {
    let Some(value) = lookup(var_name).filter(|v| !v.trim().is_empty()) else {
        return default;
    };
    match value.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            issues.push(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            });
            default
        }
    }
}
