//! `host[:port]` 记号的语法校验。
//!
//! 规则按顺序执行：
//! 1. 以冒号结尾（悬空的端口分隔符）直接拒绝；
//! 2. 按 `:` 切分，超过两段即为畸形（IPv6 字面量不做特殊处理）；
//! 3. 恰好两段时，第二段必须是 1..=65535 之间的整数；
//! 4. 只有一段时视为仅主机形式，端口由调用方的默认值补齐。

/// 端口号的开区间上界。
const PORT_UPPER_EXCLUSIVE: i64 = 65_536;

/// 判断单个地址记号是否满足 `host[:port]` 语法。纯函数，无副作用。
pub fn is_valid(token: &str) -> bool {
    if token.ends_with(':') {
        return false;
    }
    let mut segments = token.split(':');
    let _host = segments.next();
    match (segments.next(), segments.next()) {
        (None, _) => true,
        (Some(port), None) => is_valid_port(port),
        (Some(_), Some(_)) => false,
    }
}

pub(crate) fn is_valid_port(segment: &str) -> bool {
    matches!(segment.parse::<i64>(), Ok(port) if port > 0 && port < PORT_UPPER_EXCLUSIVE)
}
