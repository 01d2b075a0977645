//! # Class Composer
//!
//! 模拟训练课程的课程编排与访问资格判断
//!
//! ## 架构
//!
//! ### ① 基础设施层
//! - `infrastructure/` - 核心所依赖的外部协作者接口
//! - `ClassRepository` - 课程的持久化存储
//! - `ScenarioCatalog` - 用于展示的场景元数据
//! - `SessionContext` / `ClientStateStore` - 查看者上下文和客户端保存的标记
//!
//! ### ② 服务层
//! - `services/` - 无状态的能力
//! - `resolve` - 角色 × 许可 × 界面 → 权限
//! - `evaluate` - 按完成条件评估成绩
//! - `duration` - 时长文本的解析与格式化
//!
//! ### ③ 工作流层
//! - `workflow/` - 单次会话的状态
//! - `CurriculumModel` - 有序且去重的课程内容
//! - `PasswordGate` - 私有课程的密码门，支持修改密码
//! - `ClassAuthoring` - 创建、编辑、复制、提交
//!
//! ### ④ 编排层
//! - `orchestrator/` - 程序使用的批量驱动

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AccessContext, ClassRecord, CompletionRequirement, CurriculumItem};
pub use orchestrator::{App, RunStats};
pub use services::{resolve, Capabilities, CompletionReport};
pub use workflow::{ClassAuthoring, CurriculumModel, GateState, PasswordGate};
