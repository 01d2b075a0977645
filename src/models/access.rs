use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Guest,
    Student,
    Master,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Guest, Role::Student, Role::Master, Role::Admin];

    /// 映射后端的数字角色（0 访客，1 学生，2 管理者，5 管理员）
    ///
    /// 未知数字按访客处理。
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Role::Student,
            2 => Role::Master,
            5 => Role::Admin,
            _ => Role::Guest,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Role::Guest => 0,
            Role::Student => 1,
            Role::Master => 2,
            Role::Admin => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Student => "student",
            Role::Master => "master",
            Role::Admin => "admin",
        }
    }

    /// 能进入管理界面的角色
    pub fn is_manager(self) -> bool {
        matches!(self, Role::Master | Role::Admin)
    }

    /// 运营特权：总能通过密码门
    pub fn has_admin_override(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = String;

    /// 接受角色名（不区分大小写）或后端数字
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i64>() {
            return Ok(Role::from_code(code));
        }
        match s.to_ascii_lowercase().as_str() {
            "guest" => Ok(Role::Guest),
            "student" => Ok(Role::Student),
            "master" => Ok(Role::Master),
            "admin" => Ok(Role::Admin),
            other => Err(format!("未知角色: {}", other)),
        }
    }
}

/// 订阅等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseTier {
    #[default]
    None,
    Basic,
    Premium,
}

impl LicenseTier {
    pub const ALL: [LicenseTier; 3] = [LicenseTier::None, LicenseTier::Basic, LicenseTier::Premium];

    /// 映射许可类型字符串（`pro`、`pro_class`、`basic_personal` 等）
    pub fn from_license_type(license: Option<&str>) -> Self {
        match license.map(|l| l.trim().to_ascii_lowercase()) {
            Some(l) if l.starts_with("pro") || l == "premium" => LicenseTier::Premium,
            Some(l) if l.starts_with("basic") => LicenseTier::Basic,
            _ => LicenseTier::None,
        }
    }

    pub fn is_premium(self) -> bool {
        self == LicenseTier::Premium
    }
}

/// 谁在查看课程，以及通过哪个界面
///
/// 每次浏览时重新计算，不做持久化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessContext {
    pub role: Role,
    pub license_tier: LicenseTier,
    pub viewing_as_manager: bool,
}

impl AccessContext {
    pub fn new(role: Role, license_tier: LicenseTier, viewing_as_manager: bool) -> Self {
        Self {
            role,
            license_tier,
            viewing_as_manager,
        }
    }

    /// 管理类角色使用管理界面，其他角色作为参与者
    pub fn for_role(role: Role, license_tier: LicenseTier) -> Self {
        Self::new(role, license_tier, role.is_manager())
    }
}

impl fmt::Display for AccessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[role#{} license#{:?} surface#{}]",
            self.role,
            self.license_tier,
            if self.viewing_as_manager {
                "manager"
            } else {
                "participant"
            }
        )
    }
}
