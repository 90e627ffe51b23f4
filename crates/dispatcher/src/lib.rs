//! 定时调度
//!
//! `TaskFactory` 校验调度配置并创建 `ScheduledTask`，任务按运行结果在正常周期和
//! 恢复周期之间切换；`TaskGroup` 管理一组共享关闭令牌的任务。

pub mod scheduler;
pub mod task_group;

pub use scheduler::*;
pub use task_group::*;
