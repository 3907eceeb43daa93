//! Model 领域基础库（model-domain）
//!
//! 提供以「基础模型（Model）」为中心的通用抽象与构件，用于在应用中实现：
//! - 字段容器（`fields`）：脏字段追踪与身份（id）判定
//! - 生命周期（`model`）：校验 → 创建/更新 → 拉取 → 销毁
//! - 类型组合（`model_type`）：基于扁平化合并的类型派生与显式 super 调用
//! - 持久化边界（`data_source`）：可插拔的 CRUD 适配器协议
//! - 实例事件（`emitter`）：注册顺序、同轮次投递的命名事件
//!
//! 本 crate 尽量保持与存储与传输实现解耦，仅定义模型层接口与最小必要的错误类型，
//! 以便在不同基础设施（例如数据库、文件、远端服务等）上进行适配实现。
//!
//! 典型用法：
//! 1. 通过 `ModelType::base().derive(..)` 定义类型：默认值、计算属性、`init`/`validate` 钩子；
//! 2. 为类型提供一个 `DataSource` 实现作为持久化适配器；
//! 3. 使用 `Model::new` 构造实例，按需通过 `set`/`set_fields` 变更字段；
//! 4. 调用 `save`/`fetch`/`destroy` 完成持久化生命周期。
//!
pub mod data_source;
pub mod emitter;
pub mod error;
pub mod fields;
pub mod model;
pub mod model_type;
