use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::scheduler::ScheduledTask;

/// 共享同一个关闭令牌的一组定时任务
#[derive(Debug)]
pub struct TaskGroup {
    shutdown: CancellationToken,
    tasks: JoinSet<()>,
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new(CancellationToken::new())
    }
}

impl TaskGroup {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            shutdown,
            tasks: JoinSet::new(),
        }
    }

    pub fn spawn(&mut self, task: ScheduledTask) {
        info!("加入定时任务: {}", task.name());
        self.tasks.spawn(task.run(self.shutdown.child_token()));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// 取消所有任务并等待退出，超时后强制终止剩余任务
    ///
    /// 全部任务在超时前退出时返回 `true`。
    pub async fn shutdown(mut self, timeout: Duration) -> bool {
        info!("正在停止 {} 个定时任务", self.tasks.len());
        self.shutdown.cancel();

        let drained = tokio::time::timeout(timeout, async {
            while let Some(joined) = self.tasks.join_next().await {
                if let Err(e) = joined {
                    error!("定时任务异常退出: {}", e);
                }
            }
        })
        .await
        .is_ok();

        if !drained {
            warn!("等待定时任务退出超时，强制终止剩余 {} 个任务", self.tasks.len());
            self.tasks.abort_all();
        }

        drained
    }
}
