//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义一次发现周期可能出现的硬失败，区分“传输没送达”“远端执行出错”与“送达但形状不合法”三类；
//! - 软失败（单个条目类型错误、空白、语法非法）不在此建模，它们只会被累积并以一条告警输出。
//!
//! ## 设计要求（What）
//! - 所有错误派生 `thiserror::Error`，携带人类可读消息；
//! - 每个错误提供稳定的 `code()`，供告警与指标维度使用；
//! - 传输层错误通过 `From` 一对一映射为发现错误，语义不变。

use thiserror::Error;

/// 发现周期的错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：刷新器需要知道一次周期为何失败，但无论哪种失败都只影响当前周期，
///   既有拓扑保持不变；直接同步调用 `get_instances` 的调用方则需要看到原始错误。
/// - **契约 (What)**：
///   - `CommunicationFailure`：传输无法送达调用（网络、超时）；
///   - `RemoteExecutionFailure`：远端函数自身报错（未知函数、脚本运行时错误）；
///   - `ContractViolation`：回复已送达，但不满足强制形状。
/// - **设计权衡 (Trade-offs)**：消息使用 `String` 保存，便于直接透传传输层文本。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("communication failure: {message}")]
    CommunicationFailure { message: String },

    #[error("remote execution failure: {message}")]
    RemoteExecutionFailure { message: String },

    #[error("discovery contract violation: {0}")]
    ContractViolation(#[from] ContractViolation),
}

impl DiscoveryError {
    /// 构造通信失败。
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationFailure {
            message: message.into(),
        }
    }

    /// 构造远端执行失败。
    pub fn remote_execution(message: impl Into<String>) -> Self {
        Self::RemoteExecutionFailure {
            message: message.into(),
        }
    }

    /// 稳定错误码，前缀统一为 `discovery.*`。
    pub fn code(&self) -> &'static str {
        match self {
            DiscoveryError::CommunicationFailure { .. } => "discovery.communication",
            DiscoveryError::RemoteExecutionFailure { .. } => "discovery.remote_execution",
            DiscoveryError::ContractViolation(violation) => violation.code(),
        }
    }

    /// 是否为“回复已送达但形状非法”的失败。
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, DiscoveryError::ContractViolation(_))
    }
}

/// 回复违反发现契约的具体原因。
///
/// - `NoData`：回复没有任何返回值，或第一个返回值缺失；与“返回了空数组”严格区分；
/// - `IllegalResultType`：第一个返回值不是数组（标量或映射），是“送达但类型错误”的子类。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("no data")]
    NoData,

    #[error("first value must be an array of strings (found {found})")]
    IllegalResultType { found: String },
}

impl ContractViolation {
    pub fn code(&self) -> &'static str {
        match self {
            ContractViolation::NoData => "discovery.contract.no_data",
            ContractViolation::IllegalResultType { .. } => "discovery.contract.illegal_result_type",
        }
    }
}

/// 外部 RPC 传输返回的错误。
///
/// 由传输实现者构造；发现层不会改写其消息，只按类别映射为 [`DiscoveryError`]。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("{message}")]
    Communication { message: String },

    #[error("{message}")]
    RemoteExecution { message: String },
}

impl TransportError {
    pub fn communication(message: impl Into<String>) -> Self {
        Self::Communication {
            message: message.into(),
        }
    }

    pub fn remote_execution(message: impl Into<String>) -> Self {
        Self::RemoteExecution {
            message: message.into(),
        }
    }
}

impl From<TransportError> for DiscoveryError {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::Communication { message } => {
                DiscoveryError::CommunicationFailure { message }
            }
            TransportError::RemoteExecution { message } => {
                DiscoveryError::RemoteExecutionFailure { message }
            }
        }
    }
}
