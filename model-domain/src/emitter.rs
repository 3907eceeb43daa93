//! 实例事件（Emitter）
//!
//! 单实例内部的命名事件注册与触发：
//! - `on`：按事件名注册处理器；
//! - `emit`：同步、同轮次投递给该事件名下的全部处理器，按注册顺序执行；
//! - 仅限单实例内部的最小发布/订阅，不承担跨进程消息职责。
//!
use serde_json::Value;
use std::collections::HashMap;

type Handler = Box<dyn FnMut(&[Value]) + Send + Sync>;

/// 命名事件注册表
#[derive(Default)]
pub struct Emitter {
    handlers: HashMap<String, Vec<Handler>>,
}

impl Emitter {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册处理器；同名事件的处理器按注册顺序保存
    pub fn on(
        &mut self,
        event: impl Into<String>,
        handler: impl FnMut(&[Value]) + Send + Sync + 'static,
    ) {
        self.handlers
            .entry(event.into())
            .or_default()
            .push(Box::new(handler));
    }

    /// 移除某事件名下的全部处理器
    pub fn off(&mut self, event: &str) {
        self.handlers.remove(event);
    }

    /// 触发事件：按注册顺序同步调用全部处理器；无处理器时为空操作
    pub fn emit(&mut self, event: &str, args: &[Value]) {
        if let Some(list) = self.handlers.get_mut(event) {
            for handler in list.iter_mut() {
                handler(args);
            }
        }
    }

    /// 某事件名下已注册的处理器数量
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }
}
