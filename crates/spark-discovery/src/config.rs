//! 发现与刷新的配置。
//!
//! ### 设计目的（Why）
//! - 函数名、轮询间隔、单次调用超时与失败退避都由宿主客户端配置提供，集中在
//!   [`DiscoveryConfig`] 中校验，避免刷新器在运行期才发现非法值；
//! - 支持从 TOML 文本加载，时长统一以毫秒表达。
//!
//! ### 契约说明（What）
//! - 默认值：轮询间隔 60 秒、调用超时 5 秒、失败退避 5 秒、无种子地址；
//! - `validate` 拒绝空白函数名、任意为零的时长以及非法种子记号。

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::address::{Address, AddressSet};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_FAILURE_BACKOFF: Duration = Duration::from_secs(5);

/// 配置解析与校验错误。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("discovery function name must not be blank")]
    EmptyFunctionName,

    #[error("`{field}` must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("invalid seed address `{token}`")]
    InvalidSeed { token: String },

    #[error("failed to parse discovery configuration: {message}")]
    Parse { message: String },
}

/// 集群发现配置。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveryConfig {
    function_name: String,
    poll_interval: Duration,
    call_timeout: Duration,
    failure_backoff: Duration,
    seeds: Vec<String>,
}

impl DiscoveryConfig {
    /// 以发现函数名构造，其余字段取默认值。
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            failure_backoff: DEFAULT_FAILURE_BACKOFF,
            seeds: Vec::new(),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_failure_backoff(mut self, backoff: Duration) -> Self {
        self.failure_backoff = backoff;
        self
    }

    /// 刷新器启动时的初始快照来源。
    pub fn with_seeds<I, S>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seeds = seeds.into_iter().map(Into::into).collect();
        self
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    pub fn failure_backoff(&self) -> Duration {
        self.failure_backoff
    }

    pub fn seeds(&self) -> &[String] {
        &self.seeds
    }

    /// 解析种子记号为地址集；与发现结果不同，非法种子属于配置错误，不做静默跳过。
    pub fn seed_addresses(&self) -> Result<AddressSet, ConfigError> {
        self.seeds
            .iter()
            .map(|token| {
                Address::parse(token).map_err(|_| ConfigError::InvalidSeed {
                    token: token.clone(),
                })
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.function_name.trim().is_empty() {
            return Err(ConfigError::EmptyFunctionName);
        }
        for (field, value) in [
            ("poll_interval", self.poll_interval),
            ("call_timeout", self.call_timeout),
            ("failure_backoff", self.failure_backoff),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration { field });
            }
        }
        self.seed_addresses().map(|_| ())
    }

    /// 从 TOML 文本加载并校验。
    ///
    /// ```toml
    /// function_name = "get_cluster_nodes"
    /// poll_interval_ms = 30000
    /// call_timeout_ms = 2000
    /// failure_backoff_ms = 5000
    /// seeds = ["10.0.0.1:3301"]
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })?;
        let config = Self {
            function_name: raw.function_name,
            poll_interval: raw
                .poll_interval_ms
                .map_or(DEFAULT_POLL_INTERVAL, Duration::from_millis),
            call_timeout: raw
                .call_timeout_ms
                .map_or(DEFAULT_CALL_TIMEOUT, Duration::from_millis),
            failure_backoff: raw
                .failure_backoff_ms
                .map_or(DEFAULT_FAILURE_BACKOFF, Duration::from_millis),
            seeds: raw.seeds,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    function_name: String,
    poll_interval_ms: Option<u64>,
    call_timeout_ms: Option<u64>,
    failure_backoff_ms: Option<u64>,
    #[serde(default)]
    seeds: Vec<String>,
}
