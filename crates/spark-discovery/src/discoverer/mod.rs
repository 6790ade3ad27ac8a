//! 集群发现能力。
//!
//! - **意图说明 (Why)**：刷新器只依赖 [`ClusterDiscoverer`]，发现策略（存储函数、静态列表、
//!   未来的 DNS 等）可以替换而无需改动刷新器；
//! - **契约定位 (What)**：`get_instances` 同步返回一次发现结果；传输失败与契约违例都以
//!   [`DiscoveryError`] 返回给直接调用方；
//! - **扩展指引 (How)**：新策略只需实现该 trait，并保证 `Send + Sync`。

mod static_list;
mod stored_function;

use std::sync::Arc;

pub use static_list::StaticDiscoverer;
pub use stored_function::StoredFunctionDiscoverer;

use crate::{address::AddressSet, error::DiscoveryError};

/// 返回当前集群成员地址集的发现策略。
pub trait ClusterDiscoverer: Send + Sync {
    fn get_instances(&self) -> Result<AddressSet, DiscoveryError>;
}

impl<T: ClusterDiscoverer + ?Sized> ClusterDiscoverer for Arc<T> {
    fn get_instances(&self) -> Result<AddressSet, DiscoveryError> {
        (**self).get_instances()
    }
}

impl<T: ClusterDiscoverer + ?Sized> ClusterDiscoverer for Box<T> {
    fn get_instances(&self) -> Result<AddressSet, DiscoveryError> {
        (**self).get_instances()
    }
}
