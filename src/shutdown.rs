use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// 优雅关闭管理器
///
/// 所有组件持有同一个令牌（或其子令牌），关闭只会触发一次。
#[derive(Debug, Clone, Default)]
pub struct ShutdownManager {
    token: CancellationToken,
}

impl ShutdownManager {
    /// 创建新的关闭管理器
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅关闭信号，关闭之后订阅的令牌立即处于已取消状态
    pub fn subscribe(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// 触发关闭
    pub fn shutdown(&self) {
        if self.token.is_cancelled() {
            debug!("关闭管理器已经触发过关闭");
            return;
        }

        info!("触发系统关闭");
        self.token.cancel();
    }

    /// 检查是否已经关闭
    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 等待关闭信号
    pub async fn wait_for_shutdown(&self) {
        self.token.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_shutdown_manager_basic() {
        let manager = ShutdownManager::new();
        assert!(!manager.is_shutdown());

        let token = manager.subscribe();
        manager.shutdown();

        let result = timeout(Duration::from_millis(100), token.cancelled()).await;
        assert!(result.is_ok());
        assert!(manager.is_shutdown());
    }

    #[tokio::test]
    async fn test_subscribe_after_shutdown() {
        let manager = ShutdownManager::new();
        manager.shutdown();

        assert!(manager.subscribe().is_cancelled());
    }

    #[tokio::test]
    async fn test_double_shutdown() {
        let manager = ShutdownManager::new();

        manager.shutdown();
        manager.shutdown();
        assert!(manager.is_shutdown());
    }

    #[tokio::test]
    async fn test_wait_for_shutdown() {
        let manager = ShutdownManager::new();

        let manager_clone = manager.clone();
        let wait_handle = tokio::spawn(async move {
            manager_clone.wait_for_shutdown().await;
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        manager.shutdown();

        let result = timeout(Duration::from_millis(100), wait_handle).await;
        assert!(result.is_ok());
    }
}
