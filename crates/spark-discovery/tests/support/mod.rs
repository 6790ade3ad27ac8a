//! 集成测试共享的替身实现。
//!
//! - `ScriptedDiscoverer`：按脚本依次返回结果，脚本耗尽后重复最后一项；
//! - `RecordingListener`：按到达顺序记录增删通知；
//! - `eventually`：在真实时间下轮询条件，避免对调度时序做精确假设；
//! - `settle` / `quiesce`：暂停时钟下只让出调度、不推进虚拟时间，用于验证精确的轮询节奏。

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use spark_discovery::{Address, AddressSet, ClusterDiscoverer, DiscoveryError, TopologyListener};

pub fn set_of(tokens: &[&str]) -> AddressSet {
    tokens
        .iter()
        .map(|token| Address::parse(token).expect("valid test address"))
        .collect()
}

pub struct ScriptedDiscoverer {
    script: Mutex<VecDeque<Result<AddressSet, DiscoveryError>>>,
    last: Mutex<Option<Result<AddressSet, DiscoveryError>>>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedDiscoverer {
    pub fn new(script: Vec<Result<AddressSet, DiscoveryError>>) -> Arc<Self> {
        Self::with_delay(script, Duration::ZERO)
    }

    /// 每次调用前阻塞 `delay`，模拟缓慢的远端调用。
    pub fn with_delay(
        script: Vec<Result<AddressSet, DiscoveryError>>,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl ClusterDiscoverer for ScriptedDiscoverer {
    fn get_instances(&self) -> Result<AddressSet, DiscoveryError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let next = self.script.lock().expect("script lock").pop_front();
        let mut last = self.last.lock().expect("last lock");
        let outcome = match next {
            Some(outcome) => {
                *last = Some(outcome.clone());
                outcome
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(DiscoveryError::communication("script exhausted"))),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Added(Vec<String>),
    Removed(Vec<String>),
}

#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<Notification>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("events lock").clone()
    }
}

impl TopologyListener for RecordingListener {
    fn on_addresses_added(&self, added: &AddressSet) {
        self.events
            .lock()
            .expect("events lock")
            .push(Notification::Added(added.to_strings()));
    }

    fn on_addresses_removed(&self, removed: &AddressSet) {
        self.events
            .lock()
            .expect("events lock")
            .push(Notification::Removed(removed.to_strings()));
    }
}

/// 在 `timeout` 内反复检查条件，超时则 panic 并附带描述。
pub async fn eventually(
    description: &str,
    timeout: Duration,
    mut condition: impl FnMut() -> bool,
) {
    let deadline = tokio::time::Instant::now() + timeout;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time: {description}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// 暂停时钟下反复让出调度直到条件成立；不推进虚拟时间，只以墙钟兜底防止死等。
pub async fn settle(description: &str, mut condition: impl FnMut() -> bool) {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            std::time::Instant::now() < deadline,
            "condition not reached without advancing time: {description}"
        );
        tokio::task::yield_now().await;
    }
}

/// 让出若干次调度，使已就绪的后台任务有机会运行；不推进虚拟时间。
pub async fn quiesce() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}
