use std::sync::Arc;

use tokio::sync::mpsc;

use crate::address::AddressSet;

/// 连接池侧的拓扑变化接收者。
///
/// # 教案式说明
/// - **意图 (Why)**：快照替换后，连接池需要知道哪些地址可以开始建连、哪些地址应当退役；
/// - **契约 (What)**：
///   - `on_addresses_added`：新出现的地址，可以开始向其建立连接；
///   - `on_addresses_removed`：消失的地址，连接池应停止新建连接，并优雅排空、关闭已有连接，
///     不得粗暴中止进行中的请求；
///   - 回调在专用通知任务中按周期顺序调用，先新增后移除，空集合不会投递；
/// - **风险 (Trade-offs)**：回调同步执行，耗时操作会推迟后续通知，但不会阻塞轮询与快照发布；
///   期间积压的变化在回调返回后合并为一次净变化投递。
pub trait TopologyListener: Send + Sync {
    fn on_addresses_added(&self, added: &AddressSet) {
        let _ = added;
    }

    fn on_addresses_removed(&self, removed: &AddressSet) {
        let _ = removed;
    }
}

impl TopologyListener for () {}

impl<T: TopologyListener + ?Sized> TopologyListener for Arc<T> {
    fn on_addresses_added(&self, added: &AddressSet) {
        (**self).on_addresses_added(added);
    }

    fn on_addresses_removed(&self, removed: &AddressSet) {
        (**self).on_addresses_removed(removed);
    }
}

/// 一次已发布的拓扑变化。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologyChange {
    /// 发布该变化后的快照纪元。
    pub epoch: u64,
    /// 仅存在于新快照中的地址。
    pub added: AddressSet,
    /// 仅存在于旧快照中的地址。
    pub removed: AddressSet,
}

impl TopologyChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// 把紧随其后的变化并入当前变化，得到两次发布之间的净增删。
    ///
    /// 先增后删（或先删后增）的地址互相抵消；纪元取较新的一次。
    pub fn merge(&mut self, next: TopologyChange) {
        self.epoch = next.epoch;
        for address in next.added {
            if !self.removed.remove(&address) {
                self.added.insert(address);
            }
        }
        for address in next.removed {
            if !self.added.remove(&address) {
                self.removed.insert(address);
            }
        }
    }
}

/// 通知任务主循环：按接收顺序先投递新增、再投递移除，发送端全部关闭后退出。
///
/// 每次唤醒时把队列中已积压的变化合并为一次净变化再投递，抵消为空的变化不投递。
/// 队列本身不设上限：回调阻塞期间，每个成员发生变化的周期会追加一项（即至多每个
/// `poll_interval` 一项），回调返回后积压会被一次性合并。
pub(crate) async fn run_notifier<L>(
    listener: L,
    mut changes: mpsc::UnboundedReceiver<TopologyChange>,
) where
    L: TopologyListener,
{
    while let Some(mut change) = changes.recv().await {
        while let Ok(next) = changes.try_recv() {
            change.merge(next);
        }
        if change.is_empty() {
            continue;
        }
        if !change.added.is_empty() {
            listener.on_addresses_added(&change.added);
        }
        if !change.removed.is_empty() {
            listener.on_addresses_removed(&change.removed);
        }
    }
}
