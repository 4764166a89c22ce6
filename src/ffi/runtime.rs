//! ### English
//! C ABI bindings for runtime lifecycle (create/destroy/tick) and the graphics device events.
//!
//! ### 中文
//! 运行时生命周期（create/destroy/tick）及图形设备事件相关的 C ABI 绑定。

use std::ffi::c_void;

use super::dispatcher::{HostDispatcher, XianUploadPlaneFn};
use super::{XianNativeRenderingRuntime, runtime_ref};
use crate::engine::{NativeRenderingRuntime, RuntimeConfig};

#[unsafe(no_mangle)]
/// ### English
/// Creates a runtime.
///
/// - `max_renderers`: maximum number of live renderers; `0` means the default (65 536).
/// - `frame_pool_limit`: recycled frame buffers kept per renderer; `0` means the default (2).
///
/// ### 中文
/// 创建运行时。
///
/// - `max_renderers`：同时存活的 renderer 上限；`0` 表示默认值（65 536）。
/// - `frame_pool_limit`：每个 renderer 保留的可复用帧缓冲数；`0` 表示默认值（2）。
pub extern "C" fn xian_native_renderer_runtime_create(
    max_renderers: u32,
    frame_pool_limit: u32,
) -> *mut XianNativeRenderingRuntime {
    let config = RuntimeConfig::from_abi(max_renderers, frame_pool_limit);
    let runtime = NativeRenderingRuntime::new(config);
    Box::into_raw(Box::new(XianNativeRenderingRuntime { runtime }))
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a runtime created by `xian_native_renderer_runtime_create`.
///
/// Every remaining renderer is destroyed; do not use any renderer handle afterwards.
///
/// ### 中文
/// 销毁由 `xian_native_renderer_runtime_create` 创建的运行时。
///
/// 所有剩余 renderer 都会被销毁；之后不要再使用任何 renderer 句柄。
pub unsafe extern "C" fn xian_native_renderer_runtime_destroy(
    runtime: *mut XianNativeRenderingRuntime,
) {
    if runtime.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(runtime));
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Runs one render tick: uploads the latest frame of every renderer that received one since the
/// previous tick. Call once per external frame from the render thread.
///
/// Returns the number of renderers uploaded.
///
/// ### 中文
/// 执行一次渲染 tick：为自上次 tick 以来收到新帧的每个 renderer 上传最新帧。
/// 每个外部帧在渲染线程上调用一次。
///
/// 返回本次上传的 renderer 数量。
pub unsafe extern "C" fn xian_native_renderer_runtime_tick(
    runtime: *mut XianNativeRenderingRuntime,
) -> u32 {
    let Some(runtime) = (unsafe { runtime_ref(runtime) }) else {
        return 0;
    };
    runtime.run_tick().uploaded as u32
}

#[unsafe(no_mangle)]
/// ### English
/// Graphics device initialized: installs the host upload callback used by ticks.
///
/// `user_data` is passed back unchanged to every `upload` call. Passing a NULL `upload` behaves like
/// `xian_native_renderer_device_shutdown`.
///
/// ### 中文
/// 图形设备已初始化：安装 tick 使用的宿主上传回调。
///
/// `user_data` 会原样传回每次 `upload` 调用。`upload` 为 NULL 时等同于
/// `xian_native_renderer_device_shutdown`。
pub unsafe extern "C" fn xian_native_renderer_device_initialize(
    runtime: *mut XianNativeRenderingRuntime,
    upload: Option<XianUploadPlaneFn>,
    user_data: *mut c_void,
) {
    let Some(runtime) = (unsafe { runtime_ref(runtime) }) else {
        return;
    };
    match upload {
        Some(upload) => runtime.install_dispatcher(Box::new(HostDispatcher::new(upload, user_data))),
        None => drop(runtime.remove_dispatcher()),
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Graphics device shut down: removes the upload callback. Ticks do nothing until the next
/// `xian_native_renderer_device_initialize`; pending frames are kept (latest only).
///
/// ### 中文
/// 图形设备已关闭：移除上传回调。在下一次 `xian_native_renderer_device_initialize` 之前 tick
/// 不做任何事；待处理帧会保留（仅最新一帧）。
pub unsafe extern "C" fn xian_native_renderer_device_shutdown(
    runtime: *mut XianNativeRenderingRuntime,
) {
    let Some(runtime) = (unsafe { runtime_ref(runtime) }) else {
        return;
    };
    drop(runtime.remove_dispatcher());
}
