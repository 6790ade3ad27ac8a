//! 校验器的性质测试。
//!
//! - **Why**：回复来自服务端脚本，形状不可控；以随机回复验证“结果中每个成员都满足语法”
//!   与“去重保持首见顺序”两条不变量。
//! - **How**：`proptest` 生成混合了合法地址、畸形记号与非字符串值的数组，并附带随机的预留返回值。

use proptest::prelude::*;
use spark_discovery::{
    DiscoveryReply, ReplyValue, address::syntax, validator::extract_addresses,
};

fn host() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9-]{0,8}",
        (0u8..=255, 0u8..=255).prop_map(|(a, b)| format!("10.0.{a}.{b}")),
    ]
}

fn token() -> impl Strategy<Value = String> {
    prop_oneof![
        host(),
        (host(), 1u32..=65_535).prop_map(|(h, p)| format!("{h}:{p}")),
        (host(), 65_536u32..200_000).prop_map(|(h, p)| format!("{h}:{p}")),
        host().prop_map(|h| format!("{h}:")),
        host().prop_map(|h| format!("{h}:0")),
        (host(), host()).prop_map(|(a, b)| format!("{a}:{b}:3301")),
        Just(String::new()),
        Just("   ".to_owned()),
    ]
}

fn entry() -> impl Strategy<Value = ReplyValue> {
    prop_oneof![
        4 => token().prop_map(ReplyValue::String),
        1 => any::<i64>().prop_map(ReplyValue::Integer),
        1 => any::<bool>().prop_map(ReplyValue::Bool),
        1 => Just(ReplyValue::Nil),
        1 => prop::collection::vec(token().prop_map(ReplyValue::String), 0..3)
            .prop_map(ReplyValue::Array),
    ]
}

fn reserved() -> impl Strategy<Value = Vec<ReplyValue>> {
    prop::collection::vec(entry(), 0..3)
}

proptest! {
    #[test]
    fn every_extracted_member_is_syntactically_valid(
        entries in prop::collection::vec(entry(), 0..24),
        extra in reserved(),
    ) {
        let mut values = vec![ReplyValue::Array(entries)];
        values.extend(extra);
        let set = extract_addresses(&DiscoveryReply::new(values)).expect("array first value");
        for address in &set {
            prop_assert!(syntax::is_valid(address.as_str()));
            prop_assert!(!address.host().trim().is_empty());
        }
    }

    #[test]
    fn duplicates_collapse_to_first_seen_order(
        tokens in prop::collection::vec(
            (host(), 1u32..=65_535).prop_map(|(h, p)| format!("{h}:{p}")),
            1..16,
        ),
        repeats in prop::collection::vec(any::<prop::sample::Index>(), 0..16),
    ) {
        let mut raw = tokens.clone();
        for index in &repeats {
            raw.push(tokens[index.index(tokens.len())].clone());
        }
        let set = extract_addresses(&DiscoveryReply::new(vec![ReplyValue::string_array(raw)]))
            .expect("array first value");

        let mut expected: Vec<String> = Vec::new();
        for token in &tokens {
            if !expected.contains(token) {
                expected.push(token.clone());
            }
        }
        prop_assert_eq!(set.to_strings(), expected);
    }

    #[test]
    fn non_array_first_value_is_always_rejected(
        first in prop_oneof![
            any::<i64>().prop_map(ReplyValue::Integer),
            token().prop_map(ReplyValue::String),
            any::<bool>().prop_map(ReplyValue::Bool),
        ],
        extra in reserved(),
    ) {
        let mut values = vec![first];
        values.extend(extra);
        let err = extract_addresses(&DiscoveryReply::new(values)).expect_err("not an array");
        prop_assert!(err.is_contract_violation());
    }
}
