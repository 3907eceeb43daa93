//! 持久化适配器协议（DataSource）
//!
//! 模型层唯一的外部边界：四个 CRUD 操作，每个接收 `(模型, 选项, )` 并异步完成。
//! 约定：
//! - `create` 成功返回前必须为模型写入 `id`，否则由生命周期层判定为实现缺陷；
//! - `fetch` 应在返回前通过模型的追踪写入回填取回的字段；
//! - `options` 为不透明选项包，由公开操作原样转发，调用方未提供时为 `None`；
//! - 默认实现（未配置任何适配器时）以「not implemented」错误异步失败，
//!   保证误调用可观测而非挂起或崩溃。
//!
use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// 持久化适配器：按实例身份状态被生命周期层分派调用
#[async_trait]
pub trait DataSource: Send + Sync {
    /// 新建持久化；成功前必须为模型写入 `id`
    async fn create(&self, _model: &mut Model, _options: Option<&Value>) -> ModelResult<()> {
        Err(ModelError::NotImplemented {
            operation: "create",
        })
    }

    /// 更新已存在实例
    async fn update(&self, _model: &mut Model, _options: Option<&Value>) -> ModelResult<()> {
        Err(ModelError::NotImplemented {
            operation: "update",
        })
    }

    /// 拉取后端状态并回填字段
    async fn fetch(&self, _model: &mut Model, _options: Option<&Value>) -> ModelResult<()> {
        Err(ModelError::NotImplemented { operation: "fetch" })
    }

    /// 销毁后端记录
    async fn destroy(&self, _model: &mut Model, _options: Option<&Value>) -> ModelResult<()> {
        Err(ModelError::NotImplemented {
            operation: "destroy",
        })
    }
}

/// 未配置任何持久化操作的占位适配器（根类型默认使用）
pub struct NoDataSource;

#[async_trait]
impl DataSource for NoDataSource {}

#[async_trait]
impl<T> DataSource for Arc<T>
where
    T: DataSource + ?Sized,
{
    async fn create(&self, model: &mut Model, options: Option<&Value>) -> ModelResult<()> {
        (**self).create(model, options).await
    }

    async fn update(&self, model: &mut Model, options: Option<&Value>) -> ModelResult<()> {
        (**self).update(model, options).await
    }

    async fn fetch(&self, model: &mut Model, options: Option<&Value>) -> ModelResult<()> {
        (**self).fetch(model, options).await
    }

    async fn destroy(&self, model: &mut Model, options: Option<&Value>) -> ModelResult<()> {
        (**self).destroy(model, options).await
    }
}
