use core::{
    fmt,
    sync::atomic::{AtomicU8, Ordering},
};
use std::sync::Arc;

use crate::address::AddressSet;

/// 刷新器状态机。
///
/// `Idle → Polling → (Applying | Backoff) → Idle` 循环，`Stopped` 为终态。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefresherState {
    /// 等待下一次刻度。
    Idle,
    /// 正在调用发现能力。
    Polling,
    /// 正在差分并发布新快照。
    Applying,
    /// 上一周期失败，按固定退避等待。
    Backoff,
    /// 调度已取消，不再轮询；最后的快照仍可读取。
    Stopped,
}

impl RefresherState {
    const fn as_u8(self) -> u8 {
        match self {
            RefresherState::Idle => 0,
            RefresherState::Polling => 1,
            RefresherState::Applying => 2,
            RefresherState::Backoff => 3,
            RefresherState::Stopped => 4,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => RefresherState::Idle,
            1 => RefresherState::Polling,
            2 => RefresherState::Applying,
            3 => RefresherState::Backoff,
            _ => RefresherState::Stopped,
        }
    }
}

impl fmt::Display for RefresherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefresherState::Idle => "idle",
            RefresherState::Polling => "polling",
            RefresherState::Applying => "applying",
            RefresherState::Backoff => "backoff",
            RefresherState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// 以原子整数保存的状态单元；进入 `Stopped` 后拒绝任何迁移。
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new(initial: RefresherState) -> Self {
        Self(AtomicU8::new(initial.as_u8()))
    }

    pub(crate) fn get(&self) -> RefresherState {
        RefresherState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// 迁移到 `next`；若已停止则返回 `false` 且不做修改。
    pub(crate) fn transition(&self, next: RefresherState) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current != RefresherState::Stopped.as_u8()).then_some(next.as_u8())
            })
            .is_ok()
    }

    /// 进入终态；返回调用前是否尚未停止。
    pub(crate) fn stop(&self) -> bool {
        self.0.swap(RefresherState::Stopped.as_u8(), Ordering::AcqRel)
            != RefresherState::Stopped.as_u8()
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.get() == RefresherState::Stopped
    }
}

/// 客户端对集群成员的当前认知。
///
/// 每个成功周期都会整体替换，从不原地修改；`epoch` 在成员发生变化时递增，
/// 与地址集一起发布，读者不会看到不匹配的纪元与成员。
#[derive(Clone, Debug)]
pub struct TopologySnapshot {
    epoch: u64,
    addresses: Arc<AddressSet>,
}

impl TopologySnapshot {
    pub(crate) fn new(epoch: u64, addresses: AddressSet) -> Self {
        Self {
            epoch,
            addresses: Arc::new(addresses),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn addresses(&self) -> &Arc<AddressSet> {
        &self.addresses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_is_terminal() {
        let cell = StateCell::new(RefresherState::Idle);
        assert!(cell.transition(RefresherState::Polling));
        assert_eq!(cell.get(), RefresherState::Polling);

        assert!(cell.stop());
        assert!(!cell.stop());
        assert!(!cell.transition(RefresherState::Idle));
        assert_eq!(cell.get(), RefresherState::Stopped);
    }

    #[test]
    fn states_round_trip_through_the_atomic_encoding() {
        for state in [
            RefresherState::Idle,
            RefresherState::Polling,
            RefresherState::Applying,
            RefresherState::Backoff,
            RefresherState::Stopped,
        ] {
            assert_eq!(RefresherState::from_u8(state.as_u8()), state);
        }
    }
}
