use crate::{
    address::{Address, AddressParseError, AddressSet},
    discoverer::ClusterDiscoverer,
    error::DiscoveryError,
};

/// 返回固定地址集的发现策略。
///
/// 适用于没有部署发现函数的集群，以及需要确定性结果的测试场景。
#[derive(Clone, Debug, Default)]
pub struct StaticDiscoverer {
    addresses: AddressSet,
}

impl StaticDiscoverer {
    pub fn new(addresses: AddressSet) -> Self {
        Self { addresses }
    }

    /// 从记号列表构造；任一记号非法即失败，不做静默跳过。
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, AddressParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let addresses = tokens
            .into_iter()
            .map(|token| Address::parse(token.as_ref()))
            .collect::<Result<AddressSet, _>>()?;
        Ok(Self::new(addresses))
    }

    pub fn addresses(&self) -> &AddressSet {
        &self.addresses
    }
}

impl ClusterDiscoverer for StaticDiscoverer {
    fn get_instances(&self) -> Result<AddressSet, DiscoveryError> {
        Ok(self.addresses.clone())
    }
}
