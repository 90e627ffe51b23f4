use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use paperboy_core::{PaperboyError, PaperboyResult};

/// 定时执行的工作单元
///
/// 每次运行接收一个取消令牌，服务关闭时令牌会被触发，工作单元应尽快返回
/// `PaperboyError::Cancelled`。
pub type WorkUnit =
    Arc<dyn Fn(CancellationToken) -> BoxFuture<'static, PaperboyResult<()>> + Send + Sync>;

/// 把一个返回 future 的闭包包装成 `WorkUnit`
pub fn work_unit<F, Fut>(f: F) -> WorkUnit
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PaperboyResult<()>> + Send + 'static,
{
    Arc::new(move |token| Box::pin(f(token)))
}

/// 调度配置，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub name: String,
    /// 上一次运行成功后的等待时间
    pub normal_period: Duration,
    /// 上一次运行失败后的等待时间
    pub recovery_period: Duration,
}

impl ScheduleConfig {
    pub fn new(name: impl Into<String>, normal_period: Duration, recovery_period: Duration) -> Self {
        Self {
            name: name.into(),
            normal_period,
            recovery_period,
        }
    }

    pub fn validate(&self) -> PaperboyResult<()> {
        if self.name.trim().is_empty() {
            return Err(PaperboyError::invalid_schedule(&self.name, "任务名称不能为空"));
        }

        if self.normal_period.is_zero() {
            return Err(PaperboyError::invalid_schedule(&self.name, "正常周期必须大于0"));
        }

        if self.recovery_period.is_zero() {
            return Err(PaperboyError::invalid_schedule(&self.name, "恢复周期必须大于0"));
        }

        Ok(())
    }
}

/// 当前使用的调度周期
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PeriodState {
    #[default]
    Normal,
    Recovery,
}

/// 定时任务的只读状态快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStateSnapshot {
    pub period: PeriodState,
    pub runs: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

impl TaskStateSnapshot {
    /// 记录一次已完成的运行，并切换周期
    pub fn record(&mut self, outcome: &PaperboyResult<()>) {
        self.runs += 1;
        match outcome {
            Ok(()) => {
                self.period = PeriodState::Normal;
                self.consecutive_failures = 0;
                self.last_error = None;
            }
            Err(e) => {
                self.period = PeriodState::Recovery;
                self.consecutive_failures += 1;
                self.last_error = Some(e.to_string());
            }
        }
    }

    pub fn next_delay(&self, config: &ScheduleConfig) -> Duration {
        match self.period {
            PeriodState::Normal => config.normal_period,
            PeriodState::Recovery => config.recovery_period,
        }
    }
}

/// 校验配置并创建定时任务
#[derive(Debug, Clone, Default)]
pub struct TaskFactory;

impl TaskFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn create(&self, config: ScheduleConfig, work: WorkUnit) -> PaperboyResult<ScheduledTask> {
        config.validate()?;
        debug!(
            "创建定时任务 {}: 正常周期 {:?}, 恢复周期 {:?}",
            config.name, config.normal_period, config.recovery_period
        );

        let (state, _) = watch::channel(TaskStateSnapshot::default());
        Ok(ScheduledTask {
            config,
            work,
            state,
        })
    }
}

/// 周期性运行一个工作单元的任务
///
/// 启动后立即运行一次，之后每次运行结束再按当前周期等待：
/// 失败后进入恢复周期，成功后回到正常周期。失败只会被记录，不会停止调度。
pub struct ScheduledTask {
    config: ScheduleConfig,
    work: WorkUnit,
    state: watch::Sender<TaskStateSnapshot>,
}

impl std::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("config", &self.config)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl ScheduledTask {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn state(&self) -> TaskStateSnapshot {
        self.state.borrow().clone()
    }

    /// 订阅状态变化，每次运行结束都会推送新的快照
    pub fn subscribe(&self) -> watch::Receiver<TaskStateSnapshot> {
        self.state.subscribe()
    }

    /// 在独立的 tokio 任务中启动，立即返回
    pub fn start(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub(crate) async fn run(self, shutdown: CancellationToken) {
        info!(task = %self.config.name, "定时任务启动");

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let started = Instant::now();
            let outcome = (self.work)(shutdown.child_token()).await;
            let elapsed = started.elapsed();

            // 只有关闭信号导致的取消才停止调度，其他取消按失败处理
            if shutdown.is_cancelled() {
                info!(task = %self.config.name, ?elapsed, "运行被取消");
                break;
            }

            match &outcome {
                Ok(()) => {
                    info!(task = %self.config.name, ?elapsed, "运行完成");
                }
                Err(e) => {
                    error!(task = %self.config.name, ?elapsed, error = %e, "运行失败");
                }
            }

            self.state.send_modify(|state| state.record(&outcome));
            let delay = self.state.borrow().next_delay(&self.config);
            if self.state.borrow().period == PeriodState::Recovery {
                warn!(task = %self.config.name, ?delay, "进入恢复周期");
            } else {
                debug!(task = %self.config.name, ?delay, "等待下一次运行");
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(task = %self.config.name, "定时任务已停止");
    }
}
