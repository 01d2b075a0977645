//! 会话上下文 - 基础设施层

use crate::models::AccessContext;

/// 提供当前用户的访问上下文（只读）
pub trait SessionContext {
    fn access_context(&self) -> AccessContext;
}

/// 固定的上下文本身就是一个会话
impl SessionContext for AccessContext {
    fn access_context(&self) -> AccessContext {
        *self
    }
}
