//! # config 模块说明
//!
//! ## 角色定位（Why）
//! - 定义原始存储的最小契约：存在性检查、原始值读取、键枚举、判空，以及返回共享状态的 `state`；
//! - 在此之上以默认方法提供名称、协作者访问、监听器管理与插值入口，使任意存储只需实现这五个方法
//!   即可接入完整的类型化读取能力（见 [`crate::coerce::PropertyAccess`]）。
//!
//! ## 实现约束（What）
//! - 所有方法都可能被并发调用，实现需 `Send + Sync`；
//! - `keys` 返回惰性迭代器，调用方不应假设其顺序，除非具体存储另有承诺；
//! - 读取路径不持有跨越“读取 → 插值 → 解码”的锁。

use std::sync::Arc;

use crate::decoder::Decoder;
use crate::error::PropertyError;
use crate::interpolate::{ConfigLookup, InterpolationError, StrInterpolator};
use crate::listener::{ConfigListener, ListenerRegistry};
use crate::state::ConfigState;
use crate::value::RawValue;

/// 原始属性存储。
pub trait Config: Send + Sync {
    fn contains_key(&self, key: &str) -> bool;

    fn is_empty(&self) -> bool;

    /// 返回未经插值与转换的原始值，缺失时返回 `None`。
    fn raw_property(&self, key: &str) -> Option<RawValue>;

    fn keys(&self) -> Box<dyn Iterator<Item = String> + '_>;

    /// 返回承载名称、协作者与注册表的共享状态。
    fn state(&self) -> &ConfigState;

    /// 以原始值遍历全部属性。
    ///
    /// 默认实现逐键回查；存储若能一次性产出键值对，应覆盖此方法以避免重复查找。
    fn for_each_property(&self, action: &mut dyn FnMut(&str, &RawValue)) {
        for key in self.keys() {
            if let Some(value) = self.raw_property(&key) {
                action(&key, &value);
            }
        }
    }

    fn name(&self) -> &str {
        self.state().name()
    }

    fn decoder(&self) -> Arc<dyn Decoder> {
        self.state().decoder()
    }

    fn set_decoder(&self, decoder: Arc<dyn Decoder>) {
        self.state().set_decoder(decoder);
    }

    fn interpolator(&self) -> Arc<dyn StrInterpolator> {
        self.state().interpolator()
    }

    fn set_interpolator(&self, interpolator: Arc<dyn StrInterpolator>) {
        self.state().set_interpolator(interpolator);
    }

    fn list_delimiter(&self) -> Arc<String> {
        self.state().list_delimiter()
    }

    fn set_list_delimiter(&self, delimiter: &str) {
        self.state().set_list_delimiter(delimiter);
    }

    fn listeners(&self) -> &ListenerRegistry {
        self.state().listeners()
    }

    fn add_listener(&self, listener: Arc<dyn ConfigListener>) {
        self.listeners().add(listener);
    }

    fn remove_listener(&self, listener: &Arc<dyn ConfigListener>) -> bool {
        self.listeners().remove(listener)
    }

    /// 插值引擎回查入口：文本值原样返回，其余值使用规范文本渲染。
    fn lookup(&self, key: &str) -> Option<String> {
        self.raw_property(key).map(RawValue::into_string)
    }

    /// 以当前插值器解析 `text` 中的引用。每次调用都会创建新的解析器。
    fn resolve(&self, text: &str) -> Result<String, InterpolationError> {
        let lookup = ConfigLookup::new(self);
        self.interpolator().create(&lookup).resolve(text)
    }

    /// 构造“键不存在”错误；存储可覆盖此方法以附带更丰富的诊断信息。
    fn not_found(&self, key: &str) -> PropertyError {
        PropertyError::not_found(key)
    }
}
