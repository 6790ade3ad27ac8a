//! 外部 RPC 传输契约。
//!
//! 本 crate 不实现任何线路编码、鉴权或连接管理，只依赖一个“按名称同步调用”的原语。
//! 宿主客户端把自己的连接适配为 [`RpcTransport`] 后即可交给
//! [`StoredFunctionDiscoverer`](crate::StoredFunctionDiscoverer) 使用。

use std::sync::Arc;

use crate::{error::TransportError, reply::DiscoveryReply};

/// 同步的按名称远程调用能力。
///
/// # 教案式说明
/// - **意图 (Why)**：发现层只关心“调用某个零参函数并拿到多值结果”，把传输细节隔离在边界之外。
/// - **契约 (What)**：
///   - `call` 以零参数调用 `function_name`，成功时返回完整的多值回复；
///   - 网络不可达、超时等返回 [`TransportError::Communication`]；
///   - 远端函数不存在或脚本运行时报错返回 [`TransportError::RemoteExecution`]；
///   - 实现必须 `Send + Sync`，调用会在阻塞线程池中执行。
/// - **风险 (Trade-offs)**：调用是阻塞的；刷新器会施加超时，但无法中断实现内部的阻塞，
///   实现方应自行设置合理的读超时。
pub trait RpcTransport: Send + Sync {
    fn call(&self, function_name: &str) -> Result<DiscoveryReply, TransportError>;
}

impl<T: RpcTransport + ?Sized> RpcTransport for Arc<T> {
    fn call(&self, function_name: &str) -> Result<DiscoveryReply, TransportError> {
        (**self).call(function_name)
    }
}

impl<T: RpcTransport + ?Sized> RpcTransport for Box<T> {
    fn call(&self, function_name: &str) -> Result<DiscoveryReply, TransportError> {
        (**self).call(function_name)
    }
}
