//! # view 模块说明
//!
//! ## 角色定位（Why）
//! - 组件通常只关心某个命名空间下的配置，或需要一个不与他人共享监听器的独立视角；
//! - 视图以组合方式包装父属性空间，不复制任何数据，每次调用时即时创建，不做缓存。
//!
//! ## 两类视图（What）
//! - [`PrefixedView`]：查找时补上 `prefix.`，枚举时只暴露带该前缀的键并去掉前缀；
//!   与父空间共享解码器、插值器、分隔符与监听器，`${...}` 引用按父空间的完整键解析；
//! - [`PrivateView`]：读取原样委托给父空间，但拥有独立名称、列表分隔符与监听器注册表，
//!   父空间的事件会以视图自身作为 `child` 转发给视图的监听器；视图释放时自动从父空间注销转发器。

use std::error::Error;
use std::sync::{Arc, Weak};

use tracing::trace;

use crate::config::Config;
use crate::listener::ConfigListener;
use crate::state::{ConfigState, generate_unique_name};
use crate::value::RawValue;

/// 为共享的属性空间创建视图。
pub trait ConfigViews {
    /// 以 `prefix` 为命名空间创建视图；`None`、`""` 与 `"."` 直接返回父空间本身。
    fn prefixed_view<'a>(&self, prefix: impl Into<Option<&'a str>>) -> Arc<dyn Config>;

    fn private_view(&self) -> Arc<PrivateView>;
}

impl<C> ConfigViews for Arc<C>
where
    C: Config + 'static,
{
    fn prefixed_view<'a>(&self, prefix: impl Into<Option<&'a str>>) -> Arc<dyn Config> {
        let parent: Arc<dyn Config> = Arc::clone(self) as Arc<dyn Config>;
        parent.prefixed_view(prefix)
    }

    fn private_view(&self) -> Arc<PrivateView> {
        PrivateView::new(Arc::clone(self) as Arc<dyn Config>)
    }
}

impl ConfigViews for Arc<dyn Config> {
    fn prefixed_view<'a>(&self, prefix: impl Into<Option<&'a str>>) -> Arc<dyn Config> {
        match prefix.into() {
            None | Some("") | Some(".") => Arc::clone(self),
            Some(prefix) => Arc::new(PrefixedView::new(Arc::clone(self), prefix)),
        }
    }

    fn private_view(&self) -> Arc<PrivateView> {
        PrivateView::new(Arc::clone(self))
    }
}

/// 以固定前缀限定键空间的只读视图。
pub struct PrefixedView {
    parent: Arc<dyn Config>,
    prefix: String,
    name: String,
}

impl PrefixedView {
    /// `prefix` 末尾缺少 `.` 时自动补齐。
    pub fn new(parent: Arc<dyn Config>, prefix: &str) -> Self {
        let prefix = if prefix.ends_with('.') {
            prefix.to_owned()
        } else {
            format!("{prefix}.")
        };
        let name = generate_unique_name("prefixed-");
        trace!(parent = %parent.name(), view = %name, prefix = %prefix, "prefixed view created");
        Self {
            parent,
            prefix,
            name,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn qualify(&self, key: &str) -> String {
        let mut qualified = String::with_capacity(self.prefix.len() + key.len());
        qualified.push_str(&self.prefix);
        qualified.push_str(key);
        qualified
    }
}

impl Config for PrefixedView {
    fn contains_key(&self, key: &str) -> bool {
        self.parent.contains_key(&self.qualify(key))
    }

    fn is_empty(&self) -> bool {
        self.keys().next().is_none()
    }

    fn raw_property(&self, key: &str) -> Option<RawValue> {
        self.parent.raw_property(&self.qualify(key))
    }

    fn keys(&self) -> Box<dyn Iterator<Item = String> + '_> {
        let prefix = self.prefix.as_str();
        Box::new(
            self.parent
                .keys()
                .filter_map(move |key| key.strip_prefix(prefix).map(str::to_owned)),
        )
    }

    fn state(&self) -> &ConfigState {
        self.parent.state()
    }

    fn for_each_property(&self, action: &mut dyn FnMut(&str, &RawValue)) {
        let prefix = self.prefix.as_str();
        self.parent.for_each_property(&mut |key, value| {
            if let Some(stripped) = key.strip_prefix(prefix) {
                action(stripped, value);
            }
        });
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.parent.lookup(key)
    }
}

/// 拥有独立名称与监听器注册表的透明视图。
///
/// # 教案式说明
/// - **意图 (Why)**：组件希望观察父空间的变化，但又不希望自己的监听器暴露给父空间的其他使用者。
/// - **逻辑 (How)**：构造时向父空间注册一个转发监听器，转发器仅持有视图的弱引用；
///   事件到达时升级弱引用，再以视图自身为 `child` 通知视图自己的注册表。
/// - **契约 (What)**：
///   - 所有读取方法逐字委托给父空间；
///   - 解码器与插值器与父空间共享；列表分隔符创建时复制父空间的取值，此后独立修改，不回写父空间；
///   - 视图释放（`Drop`）时从父空间注销转发器，不再留下悬挂监听器。
pub struct PrivateView {
    parent: Arc<dyn Config>,
    state: ConfigState,
    forwarder: Arc<dyn ConfigListener>,
}

impl PrivateView {
    pub fn new(parent: Arc<dyn Config>) -> Arc<Self> {
        let view = Arc::new_cyclic(|weak: &Weak<PrivateView>| {
            let state = ConfigState::derived(generate_unique_name("private-"), parent.state());
            let forwarder: Arc<dyn ConfigListener> = Arc::new(ForwardingListener {
                view: Weak::clone(weak),
            });
            PrivateView {
                parent: Arc::clone(&parent),
                state,
                forwarder,
            }
        });
        parent.add_listener(Arc::clone(&view.forwarder));
        trace!(parent = %parent.name(), view = %view.state.name(), "private view created");
        view
    }
}

impl Config for PrivateView {
    fn contains_key(&self, key: &str) -> bool {
        self.parent.contains_key(key)
    }

    fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    fn raw_property(&self, key: &str) -> Option<RawValue> {
        self.parent.raw_property(key)
    }

    fn keys(&self) -> Box<dyn Iterator<Item = String> + '_> {
        self.parent.keys()
    }

    fn state(&self) -> &ConfigState {
        &self.state
    }

    fn for_each_property(&self, action: &mut dyn FnMut(&str, &RawValue)) {
        self.parent.for_each_property(action);
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.parent.lookup(key)
    }
}

impl Drop for PrivateView {
    fn drop(&mut self) {
        self.parent.remove_listener(&self.forwarder);
    }
}

struct ForwardingListener {
    view: Weak<PrivateView>,
}

impl ConfigListener for ForwardingListener {
    fn on_config_added(&self, _child: &dyn Config) {
        if let Some(view) = self.view.upgrade() {
            view.state.listeners().notify_config_added(&*view);
        }
    }

    fn on_config_updated(&self, _child: &dyn Config) {
        if let Some(view) = self.view.upgrade() {
            view.state.listeners().notify_config_updated(&*view);
        }
    }

    fn on_config_removed(&self, _child: &dyn Config) {
        if let Some(view) = self.view.upgrade() {
            view.state.listeners().notify_config_removed(&*view);
        }
    }

    fn on_error(&self, cause: &(dyn Error + 'static), _child: &dyn Config) {
        if let Some(view) = self.view.upgrade() {
            view.state.listeners().notify_error(cause, &*view);
        }
    }
}
