//! 集群节点地址模型。
//!
//! - [`Address`]：不可变的 `host[:port]`，相等性与哈希均以规范字符串为准；
//! - [`AddressSet`]：保持插入顺序、按规范字符串去重的有序集合；
//! - [`syntax`]：单个记号的纯语法校验。

mod set;
pub mod syntax;

use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use thiserror::Error;

pub use set::AddressSet;

/// 单个可寻址的集群成员。
///
/// # 教案式说明
/// - **意图 (Why)**：发现函数返回的是原始字符串，连接池需要的是结构化的主机与端口；
///   在进入地址集之前完成解析，避免下游重复切分字符串。
/// - **契约 (What)**：
///   - 规范字符串为 `host` 或 `host:port`，两个地址相等当且仅当规范字符串相等；
///   - `host` 非空白，`port` 若存在则位于 1..=65535；
///   - 构造后不可变。
/// - **执行 (How)**：构造时预先渲染规范字符串，比较、哈希与格式化都直接复用它。
#[derive(Clone)]
pub struct Address {
    host: String,
    port: Option<u16>,
    canonical: String,
}

/// 地址记号无法解析的原因。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("address token is blank")]
    Blank,

    #[error("malformed address token `{token}`")]
    Malformed { token: String },
}

impl Address {
    /// 以结构化字段直接构造地址。
    ///
    /// - **前置条件**：`host` 不得为空白且不得包含 `:`；`port` 若存在不得为 0。
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Result<Self, AddressParseError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(AddressParseError::Blank);
        }
        if host.contains(':') || port == Some(0) {
            let token = match port {
                Some(port) => format!("{host}:{port}"),
                None => host,
            };
            return Err(AddressParseError::Malformed { token });
        }
        Ok(Self::assemble(host, port))
    }

    /// 解析 `host[:port]` 记号。
    ///
    /// - 空白记号返回 [`AddressParseError::Blank`]；
    /// - 未通过 [`syntax::is_valid`] 或主机部分为空的记号返回 [`AddressParseError::Malformed`]；
    /// - 端口允许带前导零或 `+` 号，规范字符串中按十进制数值重新渲染。
    pub fn parse(token: &str) -> Result<Self, AddressParseError> {
        if token.trim().is_empty() {
            return Err(AddressParseError::Blank);
        }
        let malformed = || AddressParseError::Malformed {
            token: token.to_owned(),
        };
        if !syntax::is_valid(token) {
            return Err(malformed());
        }
        let (host, port) = match token.split_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<i64>()
                    .ok()
                    .and_then(|port| u16::try_from(port).ok())
                    .ok_or_else(malformed)?;
                (host, Some(port))
            }
            None => (token, None),
        };
        if host.trim().is_empty() {
            return Err(malformed());
        }
        Ok(Self::assemble(host.to_owned(), port))
    }

    fn assemble(host: String, port: Option<u16>) -> Self {
        let canonical = match port {
            Some(port) => format!("{host}:{port}"),
            None => host.clone(),
        };
        Self {
            host,
            port,
            canonical,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// 显式声明的端口；仅主机形式返回 `None`。
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// 以调用方默认端口补齐仅主机形式。
    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }

    /// 规范字符串 `host` 或 `host:port`。
    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.canonical)
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl core::str::FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
