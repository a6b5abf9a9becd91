//! # listener 模块说明
//!
//! ## 角色定位（Why）
//! - 配置源在加载、刷新、移除或出错时需要告知观察者；观察者可能在回调中再注册或注销自身，
//!   注册表必须对这种重入保持安全；
//! - 采用写时复制列表：写入方复制并原子替换整张列表，通知方持有快照遍历，读写互不阻塞。
//!
//! ## 交付语义（What）
//! - 按注册顺序逐个同步调用；
//! - 回调期间新增的监听器不会收到本次事件，被移除的监听器仍会收到本次事件；
//! - 回调 panic 不做捕获，直接传播给触发通知的一方，剩余监听器不再收到本次事件。

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::trace;

use crate::config::Config;

/// 配置变更观察者。
///
/// 所有回调都有空实现，观察者只需覆盖关心的事件。`child` 为发生变化的属性空间。
pub trait ConfigListener: Send + Sync {
    fn on_config_added(&self, child: &dyn Config) {
        let _ = child;
    }

    fn on_config_updated(&self, child: &dyn Config) {
        let _ = child;
    }

    fn on_config_removed(&self, child: &dyn Config) {
        let _ = child;
    }

    fn on_error(&self, cause: &(dyn Error + 'static), child: &dyn Config) {
        let _ = (cause, child);
    }
}

/// 写时复制的监听器注册表。
///
/// # 教案式说明
/// - **意图 (Why)**：通知路径远比注册路径频繁，读侧必须无锁；同时需要容忍回调内修改注册表。
/// - **逻辑 (How)**：`add`/`remove` 通过 [`ArcSwap::rcu`] 复制并替换列表；`notify_*` 先取一份
///   `Arc<Vec<_>>` 快照再遍历，遍历期间不持有任何锁。
/// - **契约 (What)**：同一监听器可重复注册，每次注册都会单独收到事件；`remove` 仅移除最早的一次注册。
/// - **权衡 (Trade-offs)**：每次注册都会复制整张列表，监听器数量通常很少，复制成本可以忽略。
pub struct ListenerRegistry {
    listeners: ArcSwap<Vec<Arc<dyn ConfigListener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            listeners: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn add(&self, listener: Arc<dyn ConfigListener>) {
        self.listeners.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::clone(&listener));
            next
        });
        trace!(listeners = self.len(), "listener registered");
    }

    /// 移除一次注册，返回监听器此前是否存在。
    pub fn remove(&self, listener: &Arc<dyn ConfigListener>) -> bool {
        let previous = self.listeners.rcu(|current| {
            let mut next: Vec<_> = current.iter().cloned().collect();
            if let Some(position) = next.iter().position(|held| Arc::ptr_eq(held, listener)) {
                next.remove(position);
            }
            next
        });
        let removed = previous.iter().any(|held| Arc::ptr_eq(held, listener));
        if removed {
            trace!(listeners = self.len(), "listener removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.listeners.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.load().is_empty()
    }

    pub fn notify_config_added(&self, child: &dyn Config) {
        for listener in self.snapshot().iter() {
            listener.on_config_added(child);
        }
    }

    pub fn notify_config_updated(&self, child: &dyn Config) {
        for listener in self.snapshot().iter() {
            listener.on_config_updated(child);
        }
    }

    pub fn notify_config_removed(&self, child: &dyn Config) {
        for listener in self.snapshot().iter() {
            listener.on_config_removed(child);
        }
    }

    pub fn notify_error(&self, cause: &(dyn Error + 'static), child: &dyn Config) {
        for listener in self.snapshot().iter() {
            listener.on_error(cause, child);
        }
    }

    fn snapshot(&self) -> Arc<Vec<Arc<dyn ConfigListener>>> {
        self.listeners.load_full()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}
