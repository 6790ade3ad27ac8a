//! 发现回复的形状校验与地址提取。
//!
//! ## 契约（What）
//! 1. 回复没有返回值、或第一个返回值缺失（`nil`）时，返回 [`ContractViolation::NoData`]；
//! 2. 第一个返回值不是数组时，返回 [`ContractViolation::IllegalResultType`]；
//! 3. 依序遍历第一个返回值：非字符串、空白、语法非法的条目记为“已跳过”，其余加入有序去重集合；
//! 4. 位置 ≥ 1 的返回值完全忽略，为协议扩展预留；
//! 5. 存在跳过条目时输出一条告警，列出全部跳过项；
//! 6. 返回的集合可以为空（函数显式返回 `{}`），这与第 1 步的“无数据”严格区分。

use tracing::warn;

use crate::{
    address::{Address, AddressSet},
    error::{ContractViolation, DiscoveryError},
    reply::{DiscoveryReply, ReplyValue},
};

/// 校验回复并提取地址集。
pub fn extract_addresses(reply: &DiscoveryReply) -> Result<AddressSet, DiscoveryError> {
    let entries = match reply.first() {
        None | Some(ReplyValue::Nil) => return Err(ContractViolation::NoData.into()),
        Some(ReplyValue::Array(entries)) => entries,
        Some(other) => {
            return Err(ContractViolation::IllegalResultType {
                found: other.type_name().to_owned(),
            }
            .into());
        }
    };

    let mut addresses = AddressSet::new();
    let mut skipped = Vec::new();
    for entry in entries {
        match entry.as_str().map(Address::parse) {
            Some(Ok(address)) => {
                addresses.insert(address);
            }
            Some(Err(_)) | None => skipped.push(entry.to_string()),
        }
    }

    if !skipped.is_empty() {
        warn!(
            count = skipped.len(),
            skipped = %skipped.join(", "),
            "discovery reply contained entries that are not valid addresses; skipped"
        );
    }
    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::address::syntax;

    fn reply(values: Vec<ReplyValue>) -> DiscoveryReply {
        DiscoveryReply::new(values)
    }

    #[test]
    fn empty_reply_is_a_contract_violation() {
        let err = extract_addresses(&DiscoveryReply::empty()).expect_err("no data");
        assert_eq!(err, DiscoveryError::from(ContractViolation::NoData));

        let err = extract_addresses(&reply(vec![ReplyValue::Nil])).expect_err("nil first value");
        assert_eq!(err, DiscoveryError::from(ContractViolation::NoData));
    }

    #[test]
    fn scalar_or_map_first_value_is_rejected() {
        for first in [
            ReplyValue::Integer(42),
            ReplyValue::string("localhost:3301"),
            ReplyValue::Map(vec![(ReplyValue::Integer(1), ReplyValue::string("a"))]),
        ] {
            let err = extract_addresses(&reply(vec![first])).expect_err("illegal type");
            assert_eq!(err.code(), "discovery.contract.illegal_result_type");
        }
    }

    #[test]
    fn empty_first_value_yields_empty_set() {
        let set = extract_addresses(&reply(vec![ReplyValue::Array(Vec::new())])).expect("empty");
        assert!(set.is_empty());
    }

    #[test]
    fn only_first_return_value_matters() {
        let set = extract_addresses(&reply(vec![
            ReplyValue::string_array(["host1"]),
            ReplyValue::string("host2"),
            ReplyValue::Integer(423),
        ]))
        .expect("extra values ignored");
        assert_eq!(set.to_strings(), vec!["host1"]);
    }

    #[traced_test]
    #[test]
    fn malformed_entries_are_skipped_with_one_warning() {
        let set = extract_addresses(&reply(vec![ReplyValue::Array(vec![
            ReplyValue::string("localhost:3311"),
            ReplyValue::string("127.0.0.1:3301"),
            ReplyValue::string("bad::::token"),
            ReplyValue::Integer(42),
        ])]))
        .expect("soft failures only");

        assert_eq!(set.to_strings(), vec!["localhost:3311", "127.0.0.1:3301"]);
        assert!(set.iter().all(|address| syntax::is_valid(address.as_str())));
        assert!(logs_contain("bad::::token"));
        assert!(logs_contain("42"));
        assert!(logs_contain("count=2"));
    }

    #[traced_test]
    #[test]
    fn blank_entries_are_skipped() {
        let entries = ReplyValue::string_array(["", "  ", "node:3301"]);
        let set = extract_addresses(&reply(vec![entries])).expect("valid");
        assert_eq!(set.to_strings(), vec!["node:3301"]);
        assert!(logs_contain("count=2"));
    }

    #[traced_test]
    #[test]
    fn duplicates_collapse_without_warning() {
        let entries = ReplyValue::string_array(["a:1", "b:2", "a:1"]);
        let set = extract_addresses(&reply(vec![entries])).expect("valid");
        assert_eq!(set.to_strings(), vec!["a:1", "b:2"]);
        assert!(!logs_contain("skipped"));
    }
}
