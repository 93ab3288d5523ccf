//! 事件中枢核心领域模型
//!
//! 包含用户、房间、岗位等标识符，统一的事件契约，
//! 以及岗位申请状态机的业务规则。

pub mod entities;
pub mod errors;
pub mod events;
pub mod value_objects;

// 重新导出常用类型
pub use entities::*;
pub use errors::*;
pub use events::*;
pub use value_objects::*;
