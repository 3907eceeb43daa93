//! 模型层统一错误定义
//!
//! 聚焦校验、适配器契约与持久化边界的最小必要集合，
//! 便于在各适配实现层统一转换为 `ModelError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ModelError {
    // --- 业务校验 ---
    #[error("validation failed: {}", messages.join("; "))]
    Validation { messages: Vec<String> },

    // --- 适配器契约 ---
    #[error("implementation error: {reason}")]
    Implementation { reason: String },
    #[error("operation not implemented: {operation}")]
    NotImplemented { operation: &'static str },

    // --- 适配器自身错误（原样透传） ---
    #[error("adapter error: {0}")]
    Adapter(#[from] anyhow::Error),
}

impl ModelError {
    /// 构造校验错误（携带完整的校验消息列表）
    pub fn validation(messages: Vec<String>) -> Self {
        Self::Validation { messages }
    }

    /// 构造适配器契约违约错误
    pub fn implementation(reason: impl Into<String>) -> Self {
        Self::Implementation {
            reason: reason.into(),
        }
    }

    /// 包装适配器返回的任意错误
    pub fn adapter(err: impl Into<anyhow::Error>) -> Self {
        Self::Adapter(err.into())
    }
}

/// 统一 Result 类型别名
pub type ModelResult<T> = Result<T, ModelError>;
