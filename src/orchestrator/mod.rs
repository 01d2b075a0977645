//! 编排层
//!
//! 驱动二进制程序：把课程文件载入仓库，并以配置中的用户视角逐个报告课程。
//!
//! ```text
//! app (Vec<ClassFile>)
//!     ↓
//! class_report (one ClassRecord)
//!     ↓
//! workflow (CurriculumModel, PasswordGate)
//!     ↓
//! services (access, completion, duration, status)
//!     ↓
//! infrastructure (repository, catalog, client state)
//! ```

pub mod app;
pub mod class_report;

pub use app::{App, RunStats};
pub use class_report::{build_report, log_report, ClassReport};
