use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::trace;

use crate::config::Config;
use crate::options::ConfigOptions;
use crate::state::ConfigState;
use crate::value::RawValue;

/// 基于有序映射的内存属性空间。
///
/// ### 设计目的（Why）
/// - 作为最直接的原始存储实现：测试、基准与程序化注入场景都可以直接使用；
/// - 键按字典序保存，枚举顺序稳定，便于比对与快照。
///
/// ### 契约说明（What）
/// - `set_property` / `clear_property` 修改后以自身为 `child` 触发 `config_updated`；
/// - 通知在释放写锁之后发出，监听器可以在回调中再次读取本空间；
/// - `keys` 与 `for_each_property` 基于调用时的快照，遍历期间的修改不会反映到本次遍历。
#[derive(Debug)]
pub struct MapConfig {
    state: ConfigState,
    entries: RwLock<BTreeMap<String, RawValue>>,
}

impl MapConfig {
    pub fn builder() -> MapConfigBuilder {
        MapConfigBuilder::default()
    }

    /// 以自动生成的名称创建空间。
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RawValue>,
    {
        entries
            .into_iter()
            .fold(Self::builder(), |builder, (key, value)| builder.put(key, value))
            .build()
    }

    pub fn set_property(&self, key: impl Into<String>, value: impl Into<RawValue>) {
        let key = key.into();
        trace!(config = %self.name(), key = %key, "property set");
        self.entries.write().insert(key, value.into());
        self.listeners().notify_config_updated(self);
    }

    /// 删除键，返回原值；键不存在时不发出通知。
    pub fn clear_property(&self, key: &str) -> Option<RawValue> {
        let previous = self.entries.write().remove(key);
        if previous.is_some() {
            trace!(config = %self.name(), key, "property cleared");
            self.listeners().notify_config_updated(self);
        }
        previous
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for MapConfig {
    fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn raw_property(&self, key: &str) -> Option<RawValue> {
        self.entries.read().get(key).cloned()
    }

    fn keys(&self) -> Box<dyn Iterator<Item = String> + '_> {
        let snapshot: Vec<String> = self.entries.read().keys().cloned().collect();
        Box::new(snapshot.into_iter())
    }

    fn state(&self) -> &ConfigState {
        &self.state
    }

    fn for_each_property(&self, action: &mut dyn FnMut(&str, &RawValue)) {
        let snapshot = self.entries.read().clone();
        for (key, value) in &snapshot {
            action(key, value);
        }
    }
}

/// [`MapConfig`] 构建器。
#[derive(Debug, Default)]
pub struct MapConfigBuilder {
    name: Option<String>,
    options: Option<ConfigOptions>,
    entries: BTreeMap<String, RawValue>,
}

impl MapConfigBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 使用给定参数初始化分隔符与插值语法；显式设置的名称优先于参数中的名称。
    pub fn options(mut self, options: ConfigOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn put(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> MapConfig {
        let mut options = self.options.unwrap_or_default();
        if self.name.is_some() {
            options.name = self.name;
        }
        MapConfig {
            state: ConfigState::from_options(&options),
            entries: RwLock::new(self.entries),
        }
    }
}
