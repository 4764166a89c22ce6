//! ### English
//! Error types surfaced by the registry, the frame mailbox and the render dispatcher.
//!
//! Stale handles are deliberately absent: they are absorbed as `None` / no-ops.
//!
//! ### 中文
//! 注册表、帧邮箱与渲染分发器对外暴露的错误类型。
//!
//! 这里刻意没有“过期句柄”错误：过期句柄一律按 `None` / 空操作处理。

use std::collections::TryReserveError;

use thiserror::Error;

/// ### English
/// Errors returned by `HandleRegistry::create`.
///
/// ### 中文
/// `HandleRegistry::create` 返回的错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("renderer registry is full ({max_slots} live slots)")]
    CapacityExceeded { max_slots: u32 },
}

/// ### English
/// Errors returned while copying a producer frame into a pooled buffer.
///
/// ### 中文
/// 将生产者帧拷贝进池化缓冲区时返回的错误。
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame buffer allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
    #[error("invalid frame dimensions {width}x{height} (y stride {ystride})")]
    InvalidDimensions {
        width: u32,
        height: u32,
        ystride: u32,
    },
    #[error("plane {plane} holds {actual} bytes, {needed} required")]
    PlaneTooSmall {
        plane: usize,
        needed: usize,
        actual: usize,
    },
}

/// ### English
/// Failure reported by a `RenderDispatcher` for one renderer's upload.
///
/// ### 中文
/// `RenderDispatcher` 针对单个 renderer 上传所报告的失败。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("upload of plane {plane} was rejected by the host")]
    Rejected { plane: usize },
    #[error("destination texture for plane {plane} is null")]
    NullTexture { plane: usize },
    #[error("{0}")]
    Other(String),
}

/// ### English
/// Errors surfaced by `NativeRenderingRuntime` to its immediate caller.
///
/// ### 中文
/// `NativeRenderingRuntime` 向直接调用方暴露的错误。
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Frame(#[from] FrameError),
}
