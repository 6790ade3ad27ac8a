use core::fmt;

use crate::{
    address::AddressSet,
    config::ConfigError,
    discoverer::ClusterDiscoverer,
    error::DiscoveryError,
    transport::RpcTransport,
    validator::extract_addresses,
};

/// 通过服务端存储函数发现集群成员。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 集群成员由服务端脚本维护，客户端以零参调用约定函数即可得到同伴列表；
/// - 把“调用”与“校验”拆开：调用失败按原样上抛，回复送达但形状非法才是契约违例。
///
/// ## 契约（What）
/// - `new`：函数名不得为空白；
/// - `get_instances`：调用 `function_name`，交由 [`extract_addresses`] 校验；
///   通信失败与远端执行失败保持原类别返回，不会被翻译成 `ContractViolation`。
pub struct StoredFunctionDiscoverer<T> {
    function_name: String,
    transport: T,
}

impl<T: RpcTransport> StoredFunctionDiscoverer<T> {
    pub fn new(function_name: impl Into<String>, transport: T) -> Result<Self, ConfigError> {
        let function_name = function_name.into();
        if function_name.trim().is_empty() {
            return Err(ConfigError::EmptyFunctionName);
        }
        Ok(Self {
            function_name,
            transport,
        })
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: RpcTransport> ClusterDiscoverer for StoredFunctionDiscoverer<T> {
    fn get_instances(&self) -> Result<AddressSet, DiscoveryError> {
        let reply = self.transport.call(&self.function_name)?;
        extract_addresses(&reply)
    }
}

impl<T> fmt::Debug for StoredFunctionDiscoverer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredFunctionDiscoverer")
            .field("function_name", &self.function_name)
            .finish_non_exhaustive()
    }
}
