//! 发现函数的原始回复模型。
//!
//! 传输层把一次调用的结果表达为若干个“返回值”，每个返回值自身可以是任意形状的动态值；
//! 这里用 [`ReplyValue`] 建模动态值、用 [`DiscoveryReply`] 建模返回值序列。只有第一个返回值
//! 对发现契约有意义，其余位置为协议扩展预留。

use core::fmt;

/// 动态类型的返回值。
///
/// # 教案式说明
/// - **意图 (Why)**：服务端脚本可以返回任意类型，校验器必须能表达“不是字符串”“不是数组”等情形，
///   因此不能直接把回复反序列化为 `Vec<String>`。
/// - **契约 (What)**：变体覆盖多值 RPC 常见的标量、字节串、数组与映射；`Display` 输出用于告警的
///   展示形式（字符串带引号，`nil` 表示空值）。
#[derive(Clone, Debug, PartialEq)]
pub enum ReplyValue {
    Nil,
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    Array(Vec<ReplyValue>),
    Map(Vec<(ReplyValue, ReplyValue)>),
}

impl ReplyValue {
    /// 以字符串切片构造字符串值。
    pub fn string(value: impl Into<String>) -> Self {
        ReplyValue::String(value.into())
    }

    /// 由字符串列表构造数组值，测试与静态回复中常用。
    pub fn string_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ReplyValue::Array(items.into_iter().map(ReplyValue::string).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ReplyValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ReplyValue]> {
        match self {
            ReplyValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// 值的类型名，用于契约违例的诊断信息。
    pub fn type_name(&self) -> &'static str {
        match self {
            ReplyValue::Nil => "nil",
            ReplyValue::Bool(_) => "boolean",
            ReplyValue::Integer(_) | ReplyValue::Unsigned(_) => "integer",
            ReplyValue::Float(_) => "number",
            ReplyValue::String(_) => "string",
            ReplyValue::Binary(_) => "binary",
            ReplyValue::Array(_) => "array",
            ReplyValue::Map(_) => "map",
        }
    }
}

impl fmt::Display for ReplyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyValue::Nil => f.write_str("nil"),
            ReplyValue::Bool(value) => write!(f, "{value}"),
            ReplyValue::Integer(value) => write!(f, "{value}"),
            ReplyValue::Unsigned(value) => write!(f, "{value}"),
            ReplyValue::Float(value) => write!(f, "{value}"),
            ReplyValue::String(value) => write!(f, "{value:?}"),
            ReplyValue::Binary(bytes) => write!(f, "<binary {} bytes>", bytes.len()),
            ReplyValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ReplyValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for ReplyValue {
    fn from(value: &str) -> Self {
        ReplyValue::String(value.to_owned())
    }
}

impl From<String> for ReplyValue {
    fn from(value: String) -> Self {
        ReplyValue::String(value)
    }
}

impl From<i64> for ReplyValue {
    fn from(value: i64) -> Self {
        ReplyValue::Integer(value)
    }
}

impl From<bool> for ReplyValue {
    fn from(value: bool) -> Self {
        ReplyValue::Bool(value)
    }
}

impl From<Vec<ReplyValue>> for ReplyValue {
    fn from(items: Vec<ReplyValue>) -> Self {
        ReplyValue::Array(items)
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Value> for ReplyValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => ReplyValue::Nil,
            Value::Bool(value) => ReplyValue::Bool(value),
            Value::Number(number) => {
                if let Some(value) = number.as_i64() {
                    ReplyValue::Integer(value)
                } else if let Some(value) = number.as_u64() {
                    ReplyValue::Unsigned(value)
                } else {
                    ReplyValue::Float(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(value) => ReplyValue::String(value),
            Value::Array(items) => ReplyValue::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(entries) => ReplyValue::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (ReplyValue::String(key), value.into()))
                    .collect(),
            ),
        }
    }
}

/// 一次发现调用的返回值序列。
///
/// - 位置 0 是成员列表，必须为字符串数组；
/// - 位置 ≥ 1 为预留槽位，校验器完全忽略。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiscoveryReply {
    values: Vec<ReplyValue>,
}

impl DiscoveryReply {
    pub fn new(values: Vec<ReplyValue>) -> Self {
        Self { values }
    }

    /// 没有任何返回值的回复。
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn first(&self) -> Option<&ReplyValue> {
        self.values.first()
    }

    pub fn values(&self) -> &[ReplyValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<ReplyValue>> for DiscoveryReply {
    fn from(values: Vec<ReplyValue>) -> Self {
        Self::new(values)
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Value> for DiscoveryReply {
    /// 顶层 JSON 数组的每个元素视为一个返回值；其它形状视为单个返回值。
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Array(items) => {
                Self::new(items.into_iter().map(Into::into).collect())
            }
            other => Self::new(vec![other.into()]),
        }
    }
}
