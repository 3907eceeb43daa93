//! 模型实例（Model）
//!
//! 将字段容器、生命周期控制与类型定义装配为单个实例：
//! - 构造协议：默认值 → 初始字段 → 携带 id 则清脏 → `init` 钩子；
//! - 追踪写入：计算属性优先于普通存储，脏键剥离前导下划线；
//! - 生命周期：`save`（校验后按身份分派 create/update）、`fetch`、`destroy`，
//!   均委托给类型上的持久化适配器，仅在成功路径清理脏状态；
//! - 实例事件：组合一个 `Emitter`，同轮次、注册顺序投递。
//!
use crate::emitter::Emitter;
use crate::error::{ModelError, ModelResult};
use crate::fields::{FieldMap, FieldSet};
use crate::model_type::ModelType;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

/// 模型实例：字段状态、类型引用、刷新时间戳与事件注册表
pub struct Model {
    ty: Arc<ModelType>,
    state: FieldSet,
    refreshed_at: Option<DateTime<Utc>>,
    emitter: Emitter,
}

impl Model {
    /// 构造协议：
    /// 1. `initial` 缺省解析为空映射；
    /// 2. 以干净状态起步；
    /// 3. 经追踪写入应用类型默认值；
    /// 4. 经追踪写入应用初始字段（覆盖默认值）；
    /// 5. 初始字段含 `id` 键则清空脏状态（默认值造成的脏记录一并丢弃）；
    /// 6. 运行类型的 `init` 钩子（可挂起，故构造为 async）。
    pub async fn new(ty: Arc<ModelType>, initial: Option<FieldMap>) -> ModelResult<Model> {
        let initial = initial.unwrap_or_default();

        let mut model = Model {
            ty: Arc::clone(&ty),
            state: FieldSet::new(),
            refreshed_at: None,
            emitter: Emitter::new(),
        };

        for (name, value) in ty.defaults().clone() {
            model.set(&name, value);
        }
        for (name, value) in &initial {
            model.set(name, value.clone());
        }
        if initial.contains_key("id") {
            model.state.clear_dirty();
        }

        ty.run_init(&mut model, &initial).await?;

        Ok(model)
    }

    /// 追踪写入单个字段：
    /// - 注册了计算属性时，经 getter 判等后记录脏键并交由 setter 赋值；
    /// - 否则落到字段容器的追踪写入。
    /// 与当前值相等的写入为空操作。
    pub fn set(&mut self, name: &str, value: Value) {
        if let Some(computed) = self.ty.computed(name) {
            if (computed.get)(self).as_ref() == Some(&value) {
                return;
            }
            self.state.mark_dirty(name, value.clone());
            (computed.set)(self, value);
        } else {
            self.state.set(name, value);
        }
    }

    /// 追踪写入一批字段（按插入顺序逐个应用）；
    /// 批内出现 `id` 键时，全部应用完毕后清空脏状态——
    /// 批中携带 id 意味着「视为已持久化」，覆盖同批其他键造成的脏记录。
    /// 注意：单字段形式的 `set("id", v)` 不触发该清理。
    pub fn set_fields(&mut self, bag: FieldMap) {
        let has_id = bag.contains_key("id");
        for (name, value) in bag {
            self.set(&name, value);
        }
        if has_id {
            self.state.clear_dirty();
        }
    }

    /// 读取字段：计算属性 getter 优先，否则读普通存储
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(computed) = self.ty.computed(name) {
            (computed.get)(self)
        } else {
            self.state.get(name).cloned()
        }
    }

    /// 身份字段；null 视同缺失
    pub fn id(&self) -> Option<&Value> {
        self.state.get("id").filter(|value| !value.is_null())
    }

    /// 是否为新建实例（`id` 缺失或为 null）
    pub fn is_new(&self) -> bool {
        self.state.is_new()
    }

    /// 自上一次持久化边界以来是否有字段变更
    pub fn has_changed(&self) -> bool {
        self.state.has_changed()
    }

    /// 脏快照（干净时为共享空映射）
    pub fn changed(&self) -> &FieldMap {
        self.state.changed()
    }

    /// 字段存储的只读视图
    pub fn fields(&self) -> &FieldMap {
        self.state.values()
    }

    /// 字段存储导出为 JSON 对象
    pub fn to_value(&self) -> Value {
        Value::Object(self.state.values().clone())
    }

    /// 最近一次成功 `fetch` 的时间戳；构造、create、update 均不写入
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// 实例的类型定义
    pub fn model_type(&self) -> &Arc<ModelType> {
        &self.ty
    }

    /// 调用类型上注册的实例方法；未注册时报实现错误
    pub fn call(&mut self, name: &str, arg: Value) -> ModelResult<Value> {
        let Some(method) = self.ty.method(name) else {
            return Err(ModelError::implementation(format!(
                "unknown method: {name}"
            )));
        };
        method(self, arg)
    }

    /// 校验后持久化：
    /// 1. 运行类型的 `validate` 钩子（每次调用恰好一次）；
    /// 2. 消息列表非空 → 校验错误，不触达适配器、不触碰脏状态；
    /// 3. 否则按此刻的身份状态一次性分派：
    ///    - 已存在 → `update`，成功清脏，失败原样透传且脏状态不动；
    ///    - 新建 → `create`，成功后若 `id` 仍缺失则判定为实现缺陷，
    ///      否则清脏。
    pub async fn save(&mut self, options: Option<&Value>) -> ModelResult<()> {
        let ty = Arc::clone(&self.ty);

        let messages = ty.run_validate(self).await;
        if !messages.is_empty() {
            return Err(ModelError::validation(messages));
        }

        let data = ty.data();
        if self.is_new() {
            data.create(self, options).await?;
            if self.is_new() {
                return Err(ModelError::implementation(
                    "create reported success without assigning an id",
                ));
            }
            self.state.clear_dirty();
        } else {
            data.update(self, options).await?;
            self.state.clear_dirty();
        }
        Ok(())
    }

    /// 拉取后端状态：成功时写入 `refreshed_at` 并清脏；失败时两者均不动
    pub async fn fetch(&mut self, options: Option<&Value>) -> ModelResult<()> {
        let data = self.ty.data();
        data.fetch(self, options).await?;
        self.refreshed_at = Some(Utc::now());
        self.state.clear_dirty();
        Ok(())
    }

    /// 销毁后端记录：结果原样透传，实例状态由适配器自行决定是否变更
    pub async fn destroy(&mut self, options: Option<&Value>) -> ModelResult<()> {
        let data = self.ty.data();
        data.destroy(self, options).await
    }

    /// 注册命名事件处理器
    pub fn on(
        &mut self,
        event: impl Into<String>,
        handler: impl FnMut(&[Value]) + Send + Sync + 'static,
    ) {
        self.emitter.on(event, handler);
    }

    /// 移除某事件名下的全部处理器
    pub fn off(&mut self, event: &str) {
        self.emitter.off(event);
    }

    /// 触发命名事件（同步、注册顺序投递）
    pub fn emit(&mut self, event: &str, args: &[Value]) {
        self.emitter.emit(event, args);
    }
}
