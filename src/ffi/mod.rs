//! ### English
//! C ABI surface for `xian_native_renderer`.
//!
//! All exported symbols are `extern "C"` functions; structs are `#[repr(C)]`.
//! Renderer handles cross the boundary as `u64` (`generation << 32 | slot`, `0` = null handle).
//! Errors are reported as `XianNativeRendererResult`; nothing unwinds across the boundary.
//!
//! ### 中文
//! `xian_native_renderer` 的 C ABI 接口层。
//!
//! 所有导出符号均为 `extern "C"` 函数；结构体使用 `#[repr(C)]`。
//! renderer 句柄以 `u64` 跨越边界（`generation << 32 | slot`，`0` 为空句柄）。
//! 错误以 `XianNativeRendererResult` 返回；不会有任何 unwind 跨越边界。
mod abi;
mod dispatcher;
mod frame;
mod log;
mod renderer;
mod runtime;

pub use abi::{xian_native_renderer_abi_version, xian_native_renderer_result_success};
pub use dispatcher::{HostDispatcher, XianUploadPlaneFn};
pub use frame::xian_native_renderer_on_i420_frame;
pub use log::xian_native_renderer_set_logging_functions;
pub use renderer::{
    xian_native_renderer_create, xian_native_renderer_destroy,
    xian_native_renderer_register_textures, xian_native_renderer_try_create,
    xian_native_renderer_unregister_textures,
};
pub use runtime::{
    xian_native_renderer_device_initialize, xian_native_renderer_device_shutdown,
    xian_native_renderer_runtime_create, xian_native_renderer_runtime_destroy,
    xian_native_renderer_runtime_tick,
};

use std::ffi::c_void;

use crate::engine::{FrameError, NativeRenderingRuntime, RegistryError, RuntimeError};

/// ### English
/// Opaque runtime handle owning the renderer registry and the upload scheduler.
///
/// ### 中文
/// 不透明运行时句柄，持有 renderer 注册表与上传调度器。
pub struct XianNativeRenderingRuntime {
    runtime: NativeRenderingRuntime,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
/// ### English
/// One destination texture as registered by the embedder.
///
/// ### 中文
/// 宿主注册的单个目标纹理。
pub struct XianTextureDesc {
    /// ### English
    /// Native texture pointer (never dereferenced by Rust).
    ///
    /// ### 中文
    /// 原生纹理指针（Rust 从不解引用）。
    pub texture: *mut c_void,
    pub width: i32,
    pub height: i32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
/// ### English
/// Borrowed I420 frame from the producer (video decoder thread).
///
/// Plane `Y` spans `ystride × height` bytes; `U` and `V` span `stride × height / 2` bytes. The
/// pointers only need to stay valid for the duration of the call.
///
/// ### 中文
/// 来自生产者（视频解码线程）的借用 I420 帧。
///
/// `Y` 平面长度为 `ystride × height` 字节；`U`、`V` 为 `stride × height / 2` 字节。
/// 指针只需在本次调用期间有效。
pub struct XianI420Frame {
    pub width: i32,
    pub height: i32,
    pub ydata: *const u8,
    pub ystride: i32,
    pub udata: *const u8,
    pub ustride: i32,
    pub vdata: *const u8,
    pub vstride: i32,
}

#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// ### English
/// Result code returned by fallible entry points. Stale renderer handles are not an error and
/// report `Success`.
///
/// ### 中文
/// 可失败入口的返回码。过期的 renderer 句柄不视为错误，返回 `Success`。
pub enum XianNativeRendererResult {
    Success = 0,
    InvalidArgument = 1,
    CapacityExceeded = 2,
    AllocationFailed = 3,
    UnsupportedVideoKind = 4,
    InvalidFrame = 5,
}

impl From<&RuntimeError> for XianNativeRendererResult {
    fn from(value: &RuntimeError) -> Self {
        match value {
            RuntimeError::Registry(RegistryError::CapacityExceeded { .. }) => {
                Self::CapacityExceeded
            }
            RuntimeError::Frame(FrameError::Allocation(_)) => Self::AllocationFailed,
            RuntimeError::Frame(_) => Self::InvalidFrame,
        }
    }
}

impl<T> From<Result<T, RuntimeError>> for XianNativeRendererResult {
    fn from(value: Result<T, RuntimeError>) -> Self {
        match value {
            Ok(_) => Self::Success,
            Err(err) => Self::from(&err),
        }
    }
}

/// ### English
/// C ABI version for `xian_native_renderer`.
///
/// ### 中文
/// `xian_native_renderer` 的 C ABI 版本号。
const XIAN_NATIVE_RENDERER_ABI_VERSION: u32 = 1;

/// ### English
/// Borrows the runtime behind an ABI pointer.
///
/// # Safety
/// `runtime` must be NULL or a live pointer returned by `xian_native_renderer_runtime_create`.
///
/// ### 中文
/// 借用 ABI 指针背后的运行时。
///
/// # Safety
/// `runtime` 必须为 NULL，或为 `xian_native_renderer_runtime_create` 返回且尚未销毁的指针。
unsafe fn runtime_ref<'a>(
    runtime: *const XianNativeRenderingRuntime,
) -> Option<&'a NativeRenderingRuntime> {
    unsafe { runtime.as_ref() }.map(|runtime| &runtime.runtime)
}
