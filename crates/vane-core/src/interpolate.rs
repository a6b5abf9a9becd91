//! # interpolate 模块说明
//!
//! ## 角色定位（Why）
//! - 文本值中的 `${key}` 引用需要回指同一属性空间，使多处配置共享一个来源；
//! - 插值语法属于可替换策略：核心层只约定“给定查找函数，把文本解析为文本”，具体引擎可由宿主注入。
//!
//! ## 交互契约（What）
//! - [`Lookup`]：按键返回文本，未命中返回 `None`；
//! - [`StrInterpolator`]：每次解析创建一个绑定到某个 [`Lookup`] 的 [`Resolver`]，解析器生命周期不超过该次调用；
//! - 递归替换、默认值、转义与环检测均由引擎负责，核心层不做二次处理。
//!
//! ## 默认引擎（How）
//! - [`PlaceholderInterpolator`] 实现 `${key}`、`${key:default}` 与 `$${literal}` 三种形式；
//! - 替换结果会继续解析；沿引用链再次遇到同一键时报告 [`InterpolationError::Cycle`]；
//! - 无法解析且没有默认值的引用原样保留在输出中。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::options::InterpolationSettings;

/// 插值失败。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InterpolationError {
    #[error("infinite loop in property interpolation of '{text}': {chain}")]
    Cycle { text: String, chain: String },
    #[error("interpolation of '{text}' exceeded the maximum depth of {max_depth}")]
    DepthExceeded { text: String, max_depth: usize },
}

/// 插值引擎回查属性的入口。
pub trait Lookup {
    fn lookup(&self, key: &str) -> Option<String>;
}

impl Lookup for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Lookup for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// 绑定到某个查找源的一次性解析器。
pub trait Resolver {
    fn resolve(&self, text: &str) -> Result<String, InterpolationError>;
}

/// 插值引擎。
///
/// # 契约说明（What）
/// - `create` 必须是廉价操作：核心层在每次 `resolve` 调用时都会重新创建解析器，
///   以保证引擎热替换后的调用立即生效；
/// - 引擎本身需 `Send + Sync`，解析器则只在单次调用内使用。
pub trait StrInterpolator: Send + Sync {
    fn create<'a>(&self, lookup: &'a dyn Lookup) -> Box<dyn Resolver + 'a>;
}

/// 以属性空间为查找源的适配器。
///
/// 文本值原样返回，其余原始值使用规范文本渲染。
pub struct ConfigLookup<'a, C: ?Sized> {
    config: &'a C,
}

impl<'a, C: ?Sized> ConfigLookup<'a, C> {
    pub fn new(config: &'a C) -> Self {
        Self { config }
    }
}

impl<C> Lookup for ConfigLookup<'_, C>
where
    C: Config + ?Sized,
{
    fn lookup(&self, key: &str) -> Option<String> {
        self.config.lookup(key)
    }
}

/// 默认插值引擎，语法由 [`InterpolationSettings`] 决定。
#[derive(Clone, Debug, Default)]
pub struct PlaceholderInterpolator {
    settings: Arc<InterpolationSettings>,
}

impl PlaceholderInterpolator {
    pub fn new(settings: InterpolationSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &InterpolationSettings {
        &self.settings
    }
}

impl StrInterpolator for PlaceholderInterpolator {
    fn create<'a>(&self, lookup: &'a dyn Lookup) -> Box<dyn Resolver + 'a> {
        Box::new(PlaceholderResolver {
            settings: Arc::clone(&self.settings),
            lookup,
        })
    }
}

struct PlaceholderResolver<'a> {
    settings: Arc<InterpolationSettings>,
    lookup: &'a dyn Lookup,
}

impl Resolver for PlaceholderResolver<'_> {
    fn resolve(&self, text: &str) -> Result<String, InterpolationError> {
        let mut chain = Vec::new();
        self.substitute(text, text, &mut chain)
    }
}

impl PlaceholderResolver<'_> {
    /// 展开 `text` 中的全部引用；`chain` 记录当前正在展开的键。
    fn substitute(
        &self,
        origin: &str,
        text: &str,
        chain: &mut Vec<String>,
    ) -> Result<String, InterpolationError> {
        let InterpolationSettings {
            prefix,
            suffix,
            escape,
            default_separator,
            max_depth,
        } = &*self.settings;
        if prefix.is_empty() || suffix.is_empty() {
            return Ok(text.to_owned());
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(prefix.as_str()) {
            let (before, tail) = rest.split_at(start);
            let after_prefix = &tail[prefix.len()..];

            if let Some(escaped) = escape.and_then(|esc| before.strip_suffix(esc)) {
                out.push_str(escaped);
                out.push_str(prefix);
                rest = after_prefix;
                continue;
            }
            out.push_str(before);

            let Some(end) = after_prefix.find(suffix.as_str()) else {
                out.push_str(tail);
                return Ok(out);
            };
            let expression = &after_prefix[..end];
            rest = &after_prefix[end + suffix.len()..];

            let (key, default) = match default_separator.as_str() {
                "" => (expression, None),
                separator => match expression.split_once(separator) {
                    Some((key, default)) => (key, Some(default)),
                    None => (expression, None),
                },
            };

            if chain.iter().any(|seen| seen == key) {
                let mut path = chain.join("->");
                path.push_str("->");
                path.push_str(key);
                return Err(InterpolationError::Cycle {
                    text: origin.to_owned(),
                    chain: path,
                });
            }
            if chain.len() >= *max_depth {
                return Err(InterpolationError::DepthExceeded {
                    text: origin.to_owned(),
                    max_depth: *max_depth,
                });
            }

            match self.lookup.lookup(key) {
                Some(value) => {
                    chain.push(key.to_owned());
                    let expanded = self.substitute(origin, &value, chain);
                    chain.pop();
                    out.push_str(&expanded?);
                }
                None => match default {
                    Some(default) => out.push_str(&self.substitute(origin, default, chain)?),
                    None => {
                        out.push_str(prefix);
                        out.push_str(expression);
                        out.push_str(suffix);
                    }
                },
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}
