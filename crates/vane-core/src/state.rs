//! # state 模块说明
//!
//! ## 角色定位（Why）
//! - 每个属性空间都需要一份共享状态：名称、解码器、插值器、列表分隔符与监听器注册表；
//! - 解码器与插值器允许在运行期热替换，读取路径不得看到“半替换”或缺失的协作者。
//!
//! ## 结构（How）
//! - [`Collaborators`] 以 [`ArcSwap`] 保存可替换的协作者，替换为单次原子指针交换；
//! - [`ConfigState`] 组合名称、协作者、列表分隔符与注册表；派生视图共享解码器与插值器，
//!   分隔符与注册表则各自独立；
//! - 匿名名称由进程级原子计数器生成，`unnamed-`、`prefixed-`、`private-` 等前缀共用同一序列。

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use tracing::debug;

use crate::decoder::{Decoder, DefaultDecoder};
use crate::interpolate::{PlaceholderInterpolator, StrInterpolator};
use crate::listener::ListenerRegistry;
use crate::options::ConfigOptions;

static NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// 生成 `<prefix><n>` 形式的唯一名称，序列从 1 开始且全进程共享。
pub fn generate_unique_name(prefix: &str) -> String {
    let sequence = NAME_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("{prefix}{sequence}")
}

/// 可热替换的协作者集合。
pub(crate) struct Collaborators {
    decoder: ArcSwap<Arc<dyn Decoder>>,
    interpolator: ArcSwap<Arc<dyn StrInterpolator>>,
}

impl Collaborators {
    fn new(decoder: Arc<dyn Decoder>, interpolator: Arc<dyn StrInterpolator>) -> Self {
        Self {
            decoder: ArcSwap::from_pointee(decoder),
            interpolator: ArcSwap::from_pointee(interpolator),
        }
    }

    fn from_options(options: &ConfigOptions) -> Self {
        Self::new(
            Arc::new(DefaultDecoder),
            Arc::new(PlaceholderInterpolator::new(options.interpolation.clone())),
        )
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::from_options(&ConfigOptions::default())
    }
}

/// 属性空间的共享状态。
///
/// # 教案式说明
/// - **意图 (Why)**：把“如何读取”与“从哪里读取”分离，任意原始存储只需持有一个 `ConfigState`
///   即可获得完整的解码、插值与通知能力。
/// - **契约 (What)**：
///   - 名称创建后不可变；
///   - 协作者替换只影响替换之后开始的调用，进行中的调用继续使用其开始时读到的实例；
///   - 分隔符修改只影响本状态之后的 `get_list` 调用，不会传播到父空间或派生状态。
/// - **权衡 (Trade-offs)**：解码器与插值器以 `Arc<Collaborators>` 共享，派生视图的替换会同时作用于父空间；
///   分隔符属于各自的读取习惯，派生时复制父空间当时的取值。
pub struct ConfigState {
    name: String,
    shared: Arc<Collaborators>,
    list_delimiter: ArcSwap<String>,
    listeners: ListenerRegistry,
}

impl ConfigState {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(Collaborators::default()),
            list_delimiter: ArcSwap::from_pointee(ConfigOptions::default().list_delimiter),
            listeners: ListenerRegistry::new(),
        }
    }

    /// 以 `unnamed-<n>` 命名。
    pub fn unnamed() -> Self {
        Self::named(generate_unique_name("unnamed-"))
    }

    pub fn from_options(options: &ConfigOptions) -> Self {
        let name = options
            .name
            .clone()
            .unwrap_or_else(|| generate_unique_name("unnamed-"));
        Self {
            name,
            shared: Arc::new(Collaborators::from_options(options)),
            list_delimiter: ArcSwap::from_pointee(options.list_delimiter.clone()),
            listeners: ListenerRegistry::new(),
        }
    }

    /// 与 `other` 共享解码器与插值器；名称、注册表与分隔符独立，分隔符初值取自 `other`。
    pub fn derived(name: impl Into<String>, other: &ConfigState) -> Self {
        Self {
            name: name.into(),
            shared: Arc::clone(&other.shared),
            list_delimiter: ArcSwap::new(other.list_delimiter.load_full()),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn decoder(&self) -> Arc<dyn Decoder> {
        Arc::clone(&**self.shared.decoder.load())
    }

    pub fn set_decoder(&self, decoder: Arc<dyn Decoder>) {
        self.shared.decoder.store(Arc::new(decoder));
        debug!(config = %self.name, "decoder replaced");
    }

    pub fn interpolator(&self) -> Arc<dyn StrInterpolator> {
        Arc::clone(&**self.shared.interpolator.load())
    }

    pub fn set_interpolator(&self, interpolator: Arc<dyn StrInterpolator>) {
        self.shared.interpolator.store(Arc::new(interpolator));
        debug!(config = %self.name, "interpolator replaced");
    }

    pub fn list_delimiter(&self) -> Arc<String> {
        self.list_delimiter.load_full()
    }

    pub fn set_list_delimiter(&self, delimiter: impl Into<String>) {
        let delimiter = delimiter.into();
        debug!(config = %self.name, delimiter = %delimiter, "list delimiter changed");
        self.list_delimiter.store(Arc::new(delimiter));
    }
}

impl Default for ConfigState {
    fn default() -> Self {
        Self::unnamed()
    }
}

impl fmt::Debug for ConfigState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigState")
            .field("name", &self.name)
            .field("list_delimiter", &*self.list_delimiter.load())
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}
