use std::collections::HashSet;

use super::Address;

/// 保持插入顺序并按规范字符串去重的地址集合。
///
/// # 教案式解读
/// - **意图（Why）**：发现结果需要稳定的顺序（首见优先）以便连接池按顺序尝试节点，
///   同时重复条目必须折叠为一个；顺序不能依赖某个哈希集合的偶然迭代次序。
/// - **实现策略（How）**：`members` 保存有序成员，`index` 保存规范字符串用于 O(1) 成员判断；
///   两者只通过 [`AddressSet::insert`] 与 [`AddressSet::remove`] 同步更新。
/// - **契约（What）**：集合中不存在空白条目（由 [`Address`] 的构造保证）；快照发布后不再修改，
///   每个发现周期都会创建新的集合。
#[derive(Clone, Debug, Default)]
pub struct AddressSet {
    members: Vec<Address>,
    index: HashSet<String>,
}

impl AddressSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入地址；若规范字符串已存在则忽略并返回 `false`。
    pub fn insert(&mut self, address: Address) -> bool {
        if !self.index.insert(address.as_str().to_owned()) {
            return false;
        }
        self.members.push(address);
        true
    }

    /// 移除地址，其余成员保持原有顺序。
    pub fn remove(&mut self, address: &Address) -> bool {
        if !self.index.remove(address.as_str()) {
            return false;
        }
        self.members.retain(|member| member != address);
        true
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains(address.as_str())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// 按插入顺序遍历。
    pub fn iter(&self) -> core::slice::Iter<'_, Address> {
        self.members.iter()
    }

    /// 返回 `self` 中存在而 `other` 中不存在的成员，保持 `self` 的顺序。
    pub fn difference(&self, other: &AddressSet) -> AddressSet {
        self.iter()
            .filter(|address| !other.contains(address))
            .cloned()
            .collect()
    }

    /// 忽略顺序比较成员是否一致。
    pub fn same_members(&self, other: &AddressSet) -> bool {
        self.len() == other.len() && self.index == other.index
    }

    /// 规范字符串列表，便于日志与断言。
    pub fn to_strings(&self) -> Vec<String> {
        self.members.iter().map(|address| address.to_string()).collect()
    }
}

impl PartialEq for AddressSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for AddressSet {}

impl FromIterator<Address> for AddressSet {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        let mut set = AddressSet::new();
        for address in iter {
            set.insert(address);
        }
        set
    }
}

impl Extend<Address> for AddressSet {
    fn extend<I: IntoIterator<Item = Address>>(&mut self, iter: I) {
        for address in iter {
            self.insert(address);
        }
    }
}

impl IntoIterator for AddressSet {
    type Item = Address;
    type IntoIter = std::vec::IntoIter<Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<'a> IntoIterator for &'a AddressSet {
    type Item = &'a Address;
    type IntoIter = core::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(tokens: &[&str]) -> AddressSet {
        tokens
            .iter()
            .map(|token| Address::parse(token).expect("valid token"))
            .collect()
    }

    #[test]
    fn duplicates_collapse_keeping_first_seen_order() {
        let set = set_of(&["b:1", "a:2", "b:1", "c", "a:2"]);
        assert_eq!(set.to_strings(), vec!["b:1", "a:2", "c"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn difference_preserves_receiver_order() {
        let old = set_of(&["a", "b", "c"]);
        let new = set_of(&["c", "d", "a", "e"]);
        assert_eq!(new.difference(&old).to_strings(), vec!["d", "e"]);
        assert_eq!(old.difference(&new).to_strings(), vec!["b"]);
    }

    #[test]
    fn same_members_ignores_order() {
        let left = set_of(&["a", "b"]);
        let right = set_of(&["b", "a"]);
        assert!(left.same_members(&right));
        assert_ne!(left, right);
        assert!(!left.same_members(&set_of(&["a"])));
    }

    #[test]
    fn remove_keeps_remaining_order_and_allows_reinsert() {
        let mut set = set_of(&["a", "b", "c"]);
        let b = Address::parse("b").expect("valid token");
        assert!(set.remove(&b));
        assert!(!set.remove(&b));
        assert_eq!(set.to_strings(), vec!["a", "c"]);
        assert!(set.insert(b));
        assert_eq!(set.to_strings(), vec!["a", "c", "b"]);
    }
}
