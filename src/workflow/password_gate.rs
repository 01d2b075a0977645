//! 密码门 - 工作流层
//!
//! 在一次浏览会话内守护私有课程的内容。
//!
//! ```text
//! Locked --submit_password(ok)--------> Unlocked
//! Locked --submit_password(bad)-------> Locked { mismatch }
//! Locked --request_change_password----> ChangingPassword        (can_edit only)
//! ChangingPassword --submit_new(ok)---> Unlocked                (repository updated)
//! ChangingPassword --submit_new(err)--> ChangingPassword { error }
//! ChangingPassword --cancel_change----> Locked
//! ```
//!
//! `Unlocked` 是终态。密码更新请求未返回期间，其他所有转换都返回 `Busy`。

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::error::GateError;
use crate::infrastructure::ClassRepository;
use crate::models::{ClassId, ClassVisibility};
use crate::services::Capabilities;

/// 密码门状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// 内容隐藏；输错密码后 `mismatch` 为 true
    Locked { mismatch: bool },
    /// 正在校验密码
    ///
    /// 比较在本地完成，只存在于 `submit_password` 调用内部
    Unlocking,
    /// 管理者正在修改密码
    ChangingPassword {
        in_flight: bool,
        /// 上一次更新失败的原因
        error: Option<String>,
    },
    /// 本次会话剩余时间内内容可见
    Unlocked,
}

impl GateState {
    pub fn name(&self) -> &'static str {
        match self {
            GateState::Locked { .. } => "已锁定",
            GateState::Unlocking => "解锁中",
            GateState::ChangingPassword { .. } => "修改密码中",
            GateState::Unlocked => "已解锁",
        }
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, GateState::Unlocked)
    }
}

#[derive(Debug)]
struct GateInner {
    state: GateState,
    visibility: ClassVisibility,
}

/// 单个课程的会话级密码门
pub struct PasswordGate {
    class_id: ClassId,
    capabilities: Capabilities,
    repository: Arc<dyn ClassRepository>,
    inner: Mutex<GateInner>,
}

impl PasswordGate {
    /// 创建课程的密码门
    ///
    /// 公开课程，或拥有免密权限的用户，初始即为解锁状态。
    ///
    /// # 参数
    /// - `class_id`: 课程 ID
    /// - `visibility`: 课程可见性（含密码）
    /// - `capabilities`: 当前用户的权限
    /// - `repository`: 修改密码时调用的课程仓库
    pub fn new(
        class_id: ClassId,
        visibility: ClassVisibility,
        capabilities: Capabilities,
        repository: Arc<dyn ClassRepository>,
    ) -> Self {
        let state = if visibility.is_public || capabilities.can_bypass_password {
            GateState::Unlocked
        } else {
            GateState::Locked { mismatch: false }
        };
        debug!("课程 {} 的密码门初始状态: {}", class_id, state.name());

        Self {
            class_id,
            capabilities,
            repository,
            inner: Mutex::new(GateInner { state, visibility }),
        }
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    /// 当前状态的快照
    pub fn state(&self) -> GateState {
        self.lock().state.clone()
    }

    pub fn is_unlocked(&self) -> bool {
        self.lock().state.is_unlocked()
    }

    /// 密码门持有的可见性（修改密码成功后同步更新）
    pub fn visibility(&self) -> ClassVisibility {
        self.lock().visibility.clone()
    }

    /// 用输入的密码尝试解锁
    ///
    /// 精确比较，不限制尝试次数。
    pub fn submit_password(&self, candidate: &str) -> Result<(), GateError> {
        let mut inner = self.lock();
        match inner.state {
            GateState::Locked { .. } => {}
            GateState::Unlocked => return Ok(()),
            ref other => return Err(rejected("提交密码", other)),
        }

        inner.state = GateState::Unlocking;
        let matches = inner.visibility.has_password()
            && inner.visibility.password.as_deref() == Some(candidate);

        if matches {
            inner.state = GateState::Unlocked;
            info!("🔓 课程 {} 已解锁", self.class_id);
            Ok(())
        } else {
            inner.state = GateState::Locked { mismatch: true };
            warn!("⚠️ 课程 {} 密码错误", self.class_id);
            Err(GateError::PasswordMismatch)
        }
    }

    /// 进入修改密码流程（仅限有编辑权限的管理者）
    pub fn request_change_password(&self) -> Result<(), GateError> {
        if !self.capabilities.can_edit {
            return Err(GateError::NotPermitted {
                action: "修改密码",
            });
        }

        let mut inner = self.lock();
        match inner.state {
            GateState::Locked { .. } => {
                inner.state = GateState::ChangingPassword {
                    in_flight: false,
                    error: None,
                };
                debug!("课程 {}: 开始修改密码", self.class_id);
                Ok(())
            }
            ref other => Err(rejected("修改密码", other)),
        }
    }

    /// 放弃修改密码，不做任何改动
    pub fn cancel_change(&self) -> Result<(), GateError> {
        let mut inner = self.lock();
        match inner.state {
            GateState::ChangingPassword { in_flight: false, .. } => {
                inner.state = GateState::Locked { mismatch: false };
                Ok(())
            }
            ref other => Err(rejected("取消修改密码", other)),
        }
    }

    /// 通过仓库修改课程密码
    ///
    /// 输入会去掉首尾空白，不能为空。只有请求成功返回才会解锁：
    /// 失败时停留在 `ChangingPassword` 并附带原因；
    /// future 在返回前被丢弃时回到空闲的 `ChangingPassword`。
    ///
    /// # 参数
    /// - `new_password`: 新密码
    ///
    /// # 返回
    /// 成功返回 `Ok(())`，密码门随即解锁
    pub async fn submit_new_password(&self, new_password: &str) -> Result<(), GateError> {
        let new_password = new_password.trim();
        {
            let mut inner = self.lock();
            match inner.state {
                GateState::ChangingPassword { in_flight: false, .. } => {}
                ref other => return Err(rejected("提交新密码", other)),
            }
            if new_password.is_empty() {
                return Err(GateError::EmptyPassword);
            }
            inner.state = GateState::ChangingPassword {
                in_flight: true,
                error: None,
            };
        }

        let mut guard = InFlightGuard {
            gate: self,
            armed: true,
        };
        let result = self
            .repository
            .update_password(self.class_id, new_password.to_string())
            .await;
        guard.armed = false;
        drop(guard);

        let mut inner = self.lock();
        match result {
            Ok(()) => {
                inner.visibility.password = Some(new_password.to_string());
                inner.state = GateState::Unlocked;
                info!("✓ 课程 {} 密码已修改，已解锁", self.class_id);
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("⚠️ 课程 {} 修改密码失败: {}", self.class_id, reason);
                inner.state = GateState::ChangingPassword {
                    in_flight: false,
                    error: Some(reason.clone()),
                };
                Err(GateError::UpdateFailed { reason })
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateInner> {
        // 状态总是保持一致，中毒的锁仍可使用
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// 被丢弃的更新请求回到空闲的 `ChangingPassword`
struct InFlightGuard<'a> {
    gate: &'a PasswordGate,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.gate.lock();
        if let GateState::ChangingPassword { in_flight: true, .. } = inner.state {
            debug!("课程 {} 的密码更新请求已放弃", self.gate.class_id);
            inner.state = GateState::ChangingPassword {
                in_flight: false,
                error: None,
            };
        }
    }
}

fn rejected(action: &'static str, state: &GateState) -> GateError {
    match state {
        GateState::ChangingPassword { in_flight: true, .. } => GateError::Busy,
        other => GateError::InvalidTransition {
            action,
            state: other.name(),
        },
    }
}
