//! 类型组合引擎（ModelType）
//!
//! 模型类型定义与派生：
//! - 类型定义记录：默认值、实例方法、计算属性、持久化适配器、`init`/`validate` 钩子；
//! - `derive` 以「先拷贝父成员、再覆盖」的方式产出扁平化的新类型，
//!   计算属性按 getter/setter 成对拷贝而非取值快照；
//! - 每次派生记录 `parent` 引用，覆盖实现可经由它显式调用父实现
//!   （`run_init`/`run_validate`），这是唯一受支持的 super 调用机制，
//!   不存在隐式的父子链式调用。
//!
use crate::data_source::{DataSource, NoDataSource};
use crate::error::ModelResult;
use crate::fields::FieldMap;
use crate::model::Model;
use bon::Builder;
use futures_core::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// 初始化钩子：构造协议的最后一步，接收解析后的初始字段；允许异步
pub type InitFn =
    Arc<dyn for<'a> Fn(&'a mut Model, &'a FieldMap) -> BoxFuture<'a, ModelResult<()>> + Send + Sync>;

/// 校验钩子：返回完整的校验消息列表（可能为空）；从不失败、从不恐慌
pub type ValidateFn = Arc<dyn for<'a> Fn(&'a Model) -> BoxFuture<'a, Vec<String>> + Send + Sync>;

/// 实例方法：以名字注册、随派生拷贝的可调用成员
pub type MethodFn = Arc<dyn Fn(&mut Model, Value) -> ModelResult<Value> + Send + Sync>;

/// 计算属性 getter
pub type GetterFn = Arc<dyn Fn(&Model) -> Option<Value> + Send + Sync>;

/// 计算属性 setter（通常将值经追踪写入落到 `_name` 后备字段）
pub type SetterFn = Arc<dyn Fn(&mut Model, Value) + Send + Sync>;

/// 计算属性：成对的 getter/setter，读写路径优先于普通存储
#[derive(Clone)]
pub struct Computed {
    pub get: GetterFn,
    pub set: SetterFn,
}

impl Computed {
    pub fn new(
        get: impl Fn(&Model) -> Option<Value> + Send + Sync + 'static,
        set: impl Fn(&mut Model, Value) + Send + Sync + 'static,
    ) -> Self {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }
}

/// 派生时的覆盖记录：未提供的成员沿用父类型
#[derive(Builder, Default)]
pub struct TypeOverrides {
    /// 新增/覆盖的默认字段值
    #[builder(default)]
    pub defaults: FieldMap,
    /// 新增/覆盖的实例方法（同名后者胜出）
    #[builder(default)]
    pub methods: HashMap<String, MethodFn>,
    /// 新增/覆盖的计算属性（按 getter/setter 成对覆盖）
    #[builder(default)]
    pub computed: HashMap<String, Computed>,
    /// 替换持久化适配器
    pub data: Option<Arc<dyn DataSource>>,
    /// 替换初始化钩子（仅最派生层的 `init` 运行，除非它显式调用父实现）
    pub init: Option<InitFn>,
    /// 替换校验钩子
    pub validate: Option<ValidateFn>,
}

/// 组合后的类型定义：创建后不可变，实例经 `Arc` 共享引用
pub struct ModelType {
    defaults: FieldMap,
    methods: HashMap<String, MethodFn>,
    computed: HashMap<String, Computed>,
    data: Arc<dyn DataSource>,
    init: InitFn,
    validate: ValidateFn,
    parent: Option<Arc<ModelType>>,
}

impl ModelType {
    /// 根类型：空默认值、空操作 `init`、恒为空列表的 `validate`、
    /// 未配置的持久化适配器、无父引用
    pub fn base() -> Arc<Self> {
        Arc::new(Self {
            defaults: FieldMap::new(),
            methods: HashMap::new(),
            computed: HashMap::new(),
            data: Arc::new(NoDataSource),
            init: Arc::new(|_, _| Box::pin(async { Ok(()) })),
            validate: Arc::new(|_| Box::pin(async { Vec::new() })),
            parent: None,
        })
    }

    /// 派生新类型：
    /// 1. 拷贝父类型全部成员（默认值、方法、计算属性、适配器、钩子）；
    /// 2. 按键覆盖 `overrides`（同名后者胜出，钩子与适配器整体替换）；
    /// 3. 记录 `parent` 引用供显式 super 调用；支持任意深度链式派生。
    pub fn derive(self: &Arc<Self>, overrides: TypeOverrides) -> Arc<Self> {
        let mut defaults = self.defaults.clone();
        for (name, value) in overrides.defaults {
            defaults.insert(name, value);
        }

        let mut methods = self.methods.clone();
        methods.extend(overrides.methods);

        let mut computed = self.computed.clone();
        computed.extend(overrides.computed);

        Arc::new(Self {
            defaults,
            methods,
            computed,
            data: overrides.data.unwrap_or_else(|| Arc::clone(&self.data)),
            init: overrides.init.unwrap_or_else(|| Arc::clone(&self.init)),
            validate: overrides
                .validate
                .unwrap_or_else(|| Arc::clone(&self.validate)),
            parent: Some(Arc::clone(self)),
        })
    }

    /// 父类型引用（super）；根类型为 `None`
    pub fn parent(&self) -> Option<&Arc<ModelType>> {
        self.parent.as_ref()
    }

    /// 类型级默认字段值
    pub fn defaults(&self) -> &FieldMap {
        &self.defaults
    }

    /// 当前生效的持久化适配器
    pub fn data(&self) -> Arc<dyn DataSource> {
        Arc::clone(&self.data)
    }

    /// 按名查找实例方法
    pub fn method(&self, name: &str) -> Option<MethodFn> {
        self.methods.get(name).cloned()
    }

    /// 按名查找计算属性
    pub fn computed(&self, name: &str) -> Option<Computed> {
        self.computed.get(name).cloned()
    }

    /// 运行本类型的 `init` 钩子；覆盖实现经 `parent()` 调用此方法即为 super 调用
    pub fn run_init<'a>(
        &self,
        model: &'a mut Model,
        fields: &'a FieldMap,
    ) -> BoxFuture<'a, ModelResult<()>> {
        (self.init)(model, fields)
    }

    /// 运行本类型的 `validate` 钩子
    pub fn run_validate<'a>(&self, model: &'a Model) -> BoxFuture<'a, Vec<String>> {
        (self.validate)(model)
    }
}
