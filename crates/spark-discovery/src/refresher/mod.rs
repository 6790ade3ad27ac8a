//! 拓扑刷新器：周期性发现、差分、原子发布与增删通知。
//!
//! ## 并发模型（How）
//! - 单个 Tokio 任务驱动轮询，周期严格串行，任何时刻至多一次发现调用在途；
//! - 阻塞式发现调用交给 `spawn_blocking`，并以 `call_timeout` 约束；超时视为通信失败。
//!   超时后调用本身无法被中断，它被记为“残留调用”，在其结束之前后续刻度一律跳过；
//! - 快照存放在 `ArcSwap` 中，只有轮询任务写入，读者通过
//!   [`TopologyRefresher::current_topology`] 无锁读取完整的旧集合或新集合；
//! - 增删通知经无界通道交给专用通知任务，按周期顺序投递给 [`TopologyListener`]。
//!
//! ## 失败语义（What）
//! - 任意失败（契约违例或传输错误）只记录告警，保持现有快照不变，并以 `failure_backoff`
//!   作为下一次轮询的延迟；失败绝不会清空或破坏在用拓扑，也不会传递给连接池；
//! - 停止可以与在途调用并发发生：调用允许完成，但其结果被丢弃；
//!   发布步骤与 [`TopologyRefresher::stop`] 互斥，`stop` 返回之后不会再有快照发布或通知。

mod listener;
mod state;

use std::{sync::Arc, time::Duration};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::{
    runtime::Handle,
    sync::{Notify, mpsc},
    task::JoinHandle,
};
use tracing::{Instrument, Span, debug, info, info_span, warn};

pub use listener::{TopologyChange, TopologyListener};
pub use state::{RefresherState, TopologySnapshot};

use crate::{
    address::AddressSet,
    config::{ConfigError, DiscoveryConfig},
    discoverer::ClusterDiscoverer,
    error::DiscoveryError,
};
use state::StateCell;

/// 刷新器与轮询任务共享的状态。
struct Shared {
    snapshot: ArcSwap<TopologySnapshot>,
    state: StateCell,
    stop_signal: Notify,
    refresh_signal: Notify,
    /// 发布快照与进入 `Stopped` 时持有。
    publish: Mutex<()>,
}

impl Shared {
    fn new(seeds: AddressSet) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(TopologySnapshot::new(0, seeds)),
            state: StateCell::new(RefresherState::Idle),
            stop_signal: Notify::new(),
            refresh_signal: Notify::new(),
            publish: Mutex::new(()),
        }
    }

    /// 进入终止状态；若正在发布，则等待发布完成。返回是否为首次停止。
    fn stop(&self) -> bool {
        let _publish = self.publish.lock();
        if !self.state.stop() {
            return false;
        }
        self.stop_signal.notify_one();
        true
    }
}

/// 启动刷新器失败的原因。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StartError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("topology refresher must be started inside a Tokio runtime")]
    NoRuntime,
}

/// 持有拓扑快照并周期性刷新的组件。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 客户端只认识种子节点，集群成员却在变化；刷新器定期调用发现能力，把结果转为新的快照，
///   连接池据此路由到当前存活的节点，无需人工改配置。
///
/// ## 契约（What）
/// - [`start`](Self::start)：校验配置，以种子地址作为初始快照，并立即开始第一次轮询；
///   必须在 Tokio 运行时内调用；
/// - [`current_topology`](Self::current_topology)：返回当前地址集，读者永远不会观察到半更新状态；
/// - [`refresh_now`](Self::refresh_now)：请求一次带外刷新，与待处理请求合并，不与在途周期重叠；
/// - [`stop`](Self::stop)：幂等、可与在途轮询并发调用；停止后最后的快照仍可读取；
/// - [`shutdown`](Self::shutdown)：停止并等待轮询与通知任务退出，已排队的通知会投递完毕；
/// - 丢弃刷新器等同于调用 `stop`。
///
/// ## 注意事项（Trade-offs）
/// - 成员未变化的成功周期仍会替换快照（保留最新顺序），但不递增纪元、不发送通知。
pub struct TopologyRefresher {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    notifier: Option<JoinHandle<()>>,
}

impl TopologyRefresher {
    /// 启动刷新器。
    ///
    /// # Errors
    /// - 配置非法时返回 [`StartError::Config`]；
    /// - 不在 Tokio 运行时内调用时返回 [`StartError::NoRuntime`]，此时不会创建任何任务。
    pub fn start<D, L>(
        config: DiscoveryConfig,
        discoverer: D,
        listener: L,
    ) -> Result<Self, StartError>
    where
        D: ClusterDiscoverer + 'static,
        L: TopologyListener + 'static,
    {
        config.validate()?;
        let seeds = config.seed_addresses()?;
        let runtime = Handle::try_current().map_err(|_| StartError::NoRuntime)?;
        let shared = Arc::new(Shared::new(seeds));

        let span = info_span!("topology_refresher", function = %config.function_name());
        let (changes_tx, changes_rx) = mpsc::unbounded_channel();
        let notifier =
            runtime.spawn(listener::run_notifier(listener, changes_rx).instrument(span.clone()));
        let worker = PollWorker {
            shared: Arc::clone(&shared),
            discoverer: Arc::new(discoverer),
            config,
            changes: changes_tx,
            lingering: None,
        };
        let worker = runtime.spawn(worker.run().instrument(span));

        Ok(Self {
            shared,
            worker: Some(worker),
            notifier: Some(notifier),
        })
    }

    /// 当前地址集。
    pub fn current_topology(&self) -> Arc<AddressSet> {
        Arc::clone(self.shared.snapshot.load().addresses())
    }

    /// 当前快照（地址集与纪元一起读取）。
    pub fn snapshot(&self) -> Arc<TopologySnapshot> {
        self.shared.snapshot.load_full()
    }

    /// 成员发生变化的已发布快照数量。
    pub fn epoch(&self) -> u64 {
        self.shared.snapshot.load().epoch()
    }

    pub fn state(&self) -> RefresherState {
        self.shared.state.get()
    }

    /// 请求尽快执行一次发现周期。
    pub fn refresh_now(&self) {
        if !self.shared.state.is_stopped() {
            self.shared.refresh_signal.notify_one();
        }
    }

    /// 取消调度；在途调用的结果将被丢弃。
    ///
    /// 若轮询任务正在发布快照，`stop` 会等待这次发布完成；返回之后快照与通知都不再变化。
    pub fn stop(&self) {
        if self.shared.stop() {
            debug!("topology refresher stopped");
        }
    }

    /// 停止并等待后台任务退出。
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(worker) = self.worker.take() {
            if let Err(err) = worker.await {
                warn!(error = %err, "topology polling task terminated abnormally");
            }
        }
        if let Some(notifier) = self.notifier.take() {
            if let Err(err) = notifier.await {
                warn!(error = %err, "topology notifier task terminated abnormally");
            }
        }
    }
}

impl Drop for TopologyRefresher {
    fn drop(&mut self) {
        self.stop();
    }
}

impl core::fmt::Debug for TopologyRefresher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let snapshot = self.shared.snapshot.load();
        f.debug_struct("TopologyRefresher")
            .field("state", &self.state())
            .field("epoch", &snapshot.epoch())
            .field("members", &snapshot.addresses().len())
            .finish()
    }
}

/// 单个周期的结果，决定下一次轮询的延迟。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    Applied,
    Failed,
    Skipped,
    Discarded,
}

type DiscoveryTask = JoinHandle<Result<AddressSet, DiscoveryError>>;

struct PollWorker {
    shared: Arc<Shared>,
    discoverer: Arc<dyn ClusterDiscoverer>,
    config: DiscoveryConfig,
    changes: mpsc::UnboundedSender<TopologyChange>,
    /// 已超时但仍在阻塞线程池中运行的调用。
    lingering: Option<DiscoveryTask>,
}

impl PollWorker {
    async fn run(mut self) {
        let mut delay = Duration::ZERO;
        loop {
            tokio::select! {
                biased;
                _ = self.shared.stop_signal.notified() => break,
                _ = self.shared.refresh_signal.notified() => {}
                _ = tokio::time::sleep(delay) => {}
            }
            if self.shared.state.is_stopped() {
                break;
            }
            delay = match self.poll_once().await {
                CycleOutcome::Applied => self.config.poll_interval(),
                CycleOutcome::Failed | CycleOutcome::Skipped => self.config.failure_backoff(),
                CycleOutcome::Discarded => break,
            };
        }
        debug!("topology polling task exited");
    }

    async fn poll_once(&mut self) -> CycleOutcome {
        if let Some(task) = &self.lingering {
            if !task.is_finished() {
                debug!("previous discovery call is still running; skipping tick");
                return CycleOutcome::Skipped;
            }
            self.lingering = None;
        }

        if !self.shared.state.transition(RefresherState::Polling) {
            return CycleOutcome::Discarded;
        }
        let result = self.discover().await;
        if self.shared.state.is_stopped() {
            debug!("refresher stopped during discovery; result discarded");
            return CycleOutcome::Discarded;
        }

        match result {
            Ok(addresses) => self.apply(addresses),
            Err(err) => {
                warn!(
                    code = err.code(),
                    error = %err,
                    backoff_ms = self.config.failure_backoff().as_millis() as u64,
                    "discovery cycle failed; keeping current topology"
                );
                self.shared.state.transition(RefresherState::Backoff);
                CycleOutcome::Failed
            }
        }
    }

    async fn discover(&mut self) -> Result<AddressSet, DiscoveryError> {
        let discoverer = Arc::clone(&self.discoverer);
        let span = Span::current();
        let mut task =
            tokio::task::spawn_blocking(move || span.in_scope(|| discoverer.get_instances()));
        let timeout = self.config.call_timeout();
        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => Err(DiscoveryError::communication(format!(
                "discovery task failed: {err}"
            ))),
            Err(_) => {
                self.lingering = Some(task);
                Err(DiscoveryError::communication(format!(
                    "discovery call timed out after {}ms",
                    timeout.as_millis()
                )))
            }
        }
    }

    fn apply(&self, next: AddressSet) -> CycleOutcome {
        let _publish = self.shared.publish.lock();
        if !self.shared.state.transition(RefresherState::Applying) {
            debug!("refresher stopped before publishing; result discarded");
            return CycleOutcome::Discarded;
        }
        let previous = self.shared.snapshot.load_full();
        let added = next.difference(previous.addresses());
        let removed = previous.addresses().difference(&next);

        if added.is_empty() && removed.is_empty() {
            self.shared
                .snapshot
                .store(Arc::new(TopologySnapshot::new(previous.epoch(), next)));
            debug!(epoch = previous.epoch(), "cluster topology unchanged");
        } else {
            let epoch = previous.epoch() + 1;
            info!(
                epoch,
                members = next.len(),
                added = ?added.to_strings(),
                removed = ?removed.to_strings(),
                "cluster topology changed"
            );
            self.shared
                .snapshot
                .store(Arc::new(TopologySnapshot::new(epoch, next)));
            let change = TopologyChange {
                epoch,
                added,
                removed,
            };
            if self.changes.send(change).is_err() {
                debug!("topology notifier is gone; change not delivered");
            }
        }
        self.shared.state.transition(RefresherState::Idle);
        CycleOutcome::Applied
    }
}
