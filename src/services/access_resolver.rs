//! 权限解析 - 服务层
//!
//! 角色、许可等级和浏览界面在这里统一换算成对课程的权限。
//! 页面只读取结果标志，不自行推导。

use serde::Serialize;

use crate::models::AccessContext;

/// 当前用户对课程可执行的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    /// 管理界面上的持证管理者
    pub is_licensed_manager: bool,
    /// 参与界面上的持证参与者
    pub is_licensed_participant: bool,
    pub can_edit: bool,
    pub can_manage_participants: bool,
    pub can_view_results: bool,
    pub can_duplicate: bool,
    /// 管理员特权：无论许可如何都跳过密码门
    pub can_bypass_password: bool,
}

impl Capabilities {
    /// 管理权限（编辑课程、修改可见性或密码）
    pub fn can_manage(&self) -> bool {
        self.can_edit
    }

    /// 既不是持证管理者也不是持证参与者
    pub fn is_unlicensed(&self) -> bool {
        !self.is_licensed_manager && !self.is_licensed_participant
    }
}

/// 解析访问上下文对应的权限
///
/// | role          | tier         | manager surface | licensed manager | licensed participant |
/// |---------------|--------------|-----------------|------------------|----------------------|
/// | Master/Admin  | Premium      | yes             | yes              | no                   |
/// | Master/Admin  | None/Basic   | yes             | no               | no                   |
/// | any           | Premium      | no              | no               | yes                  |
/// | any           | None/Basic   | no              | no               | no                   |
///
/// 只有管理类角色能使用管理界面；访客或学生即使标记为管理视角也没有任何权限。
///
/// # 参数
/// - `context`: 访问上下文
///
/// # 返回
/// 解析出的权限
pub fn resolve(context: &AccessContext) -> Capabilities {
    let premium = context.license_tier.is_premium();
    let on_manager_surface = context.viewing_as_manager && context.role.is_manager();

    let is_licensed_manager = on_manager_surface && premium;
    let is_licensed_participant = !context.viewing_as_manager && premium;

    Capabilities {
        is_licensed_manager,
        is_licensed_participant,
        can_edit: is_licensed_manager,
        can_manage_participants: is_licensed_manager,
        can_view_results: is_licensed_manager || is_licensed_participant,
        can_duplicate: is_licensed_manager,
        can_bypass_password: context.role.has_admin_override(),
    }
}
