#![doc = r#"
# spark-discovery

## 设计动机（Why）
- **定位**：客户端只连接一个种子节点，但集群成员会随时间增删、轮换地址；本 crate 周期性地
  调用服务端的发现函数询问“我的同伴有哪些”，并把回复转换为干净、校验过、去重后的地址集，
  供连接池按当前存活节点路由流量。
- **信任边界**：发现函数由服务端脚本实现，可能返回畸形或旧版形状的数据；所有回复都按
  防御式契约处理，坏回复绝不会让连接池丢掉全部连接。
- **向前兼容**：只有第一个返回值具有语义，后续返回值为协议扩展预留，一律忽略。

## 核心契约（What）
- [`address::syntax::is_valid`]：单个 `host[:port]` 记号的纯校验谓词；
- [`validator::extract_addresses`]：校验回复形状并提取有序去重的 [`AddressSet`]；
- [`ClusterDiscoverer`]：发现能力的抽象，默认实现为 [`StoredFunctionDiscoverer`]；
- [`TopologyRefresher`]：定时轮询、差分、原子发布快照，并异步通知连接池增删。

## 实现策略（How）
- 快照通过 `arc_swap::ArcSwap` 原子替换，读者只会看到完整的旧集合或新集合；
- 轮询任务运行在 Tokio 上，阻塞式 RPC 交给 `spawn_blocking` 并受 `call_timeout` 约束；
- 错误使用 `thiserror` 枚举建模，携带稳定错误码；日志统一走 `tracing`。

## 风险与考量（Trade-offs）
- 地址语法按 `:` 朴素切分，无法区分 IPv6 字面量与多冒号的畸形记号，带多个冒号的记号一律视为非法；
- 超时的 RPC 无法被强行中断，只能等待其自然结束后再发起下一轮，期间的定时刻度被跳过。
"#]

pub mod address;
pub mod config;
pub mod discoverer;
pub mod error;
pub mod refresher;
pub mod reply;
pub mod transport;
pub mod validator;

pub use address::{Address, AddressParseError, AddressSet};
pub use config::{ConfigError, DiscoveryConfig};
pub use discoverer::{ClusterDiscoverer, StaticDiscoverer, StoredFunctionDiscoverer};
pub use error::{ContractViolation, DiscoveryError, TransportError};
pub use refresher::{
    RefresherState, StartError, TopologyChange, TopologyListener, TopologyRefresher,
    TopologySnapshot,
};
pub use reply::{DiscoveryReply, ReplyValue};
pub use transport::RpcTransport;
