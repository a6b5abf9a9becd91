#![deny(unsafe_code)]

//! # vane-core
//!
//! ## 定位与职责（Why）
//! - 分层动态配置库的通用解析核心：给定任意“原始键值存储”，在其上提供强类型、可插值、可观察的属性读取接口；
//! - 存储如何加载、如何合并成层级不在本 crate 的范围内，核心只定义它们需要遵守的契约。
//!
//! ## 架构嵌入（Where）
//! - `config` 定义原始存储契约 [`Config`]，`state` 承载名称、协作者与监听器注册表；
//! - `coerce` 提供类型化读取 [`PropertyAccess`]，依赖 `value`、`decoder` 与 `interpolate` 完成转换；
//! - `listener` 负责变更通知，`view` 在不复制数据的前提下组合前缀视图与私有视图；
//! - `keys`、`visitor` 提供遍历能力，`map` 是内存中的参考存储，`options` 承接宿主的初始化参数。
//!
//! ## 使用约定（What）
//! - 所有失败通过 [`PropertyError`] 同步返回；只有“缺失且提供默认值”会在本地恢复；
//! - 库本身只发出 `tracing` 事件，不安装任何订阅者。

pub mod coerce;
pub mod config;
pub mod decoder;
pub mod error;
pub mod interpolate;
pub mod keys;
pub mod listener;
pub mod map;
pub mod options;
pub mod state;
pub mod value;
pub mod view;
pub mod visitor;

pub use coerce::{PropertyAccess, PropertyType, native_from_raw, split_list};
pub use config::Config;
pub use decoder::{DecodeError, Decoder, DefaultDecoder};
pub use error::{PropertyError, PropertyErrorKind, ResolutionError};
pub use interpolate::{
    ConfigLookup, InterpolationError, Lookup, PlaceholderInterpolator, Resolver, StrInterpolator,
};
pub use keys::{KeyIterationError, KeysWithPrefix};
pub use listener::{ConfigListener, ListenerRegistry};
pub use map::{MapConfig, MapConfigBuilder};
pub use options::{ConfigOptions, InterpolationSettings};
pub use state::{ConfigState, generate_unique_name};
pub use value::{NativeValue, RawValue, TypeTag};
pub use view::{ConfigViews, PrefixedView, PrivateView};
pub use visitor::{ConfigVisitor, WriterVisitor};
