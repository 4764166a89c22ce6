//! ### English
//! C ABI bindings for renderer lifecycle and destination textures.
//!
//! ### 中文
//! renderer 生命周期与目标纹理相关的 C ABI 绑定。

use std::ffi::c_void;

use super::{XianNativeRendererResult, XianNativeRenderingRuntime, XianTextureDesc, runtime_ref};
use crate::engine::{Handle, OwnerContext, TextureDesc, VideoKind};

#[unsafe(no_mangle)]
/// ### English
/// Creates a renderer for `owner` (opaque, never dereferenced) and writes its handle to
/// `out_handle`.
///
/// ### 中文
/// 为 `owner`（不透明，从不解引用）创建 renderer，并把句柄写入 `out_handle`。
pub unsafe extern "C" fn xian_native_renderer_try_create(
    runtime: *mut XianNativeRenderingRuntime,
    owner: *mut c_void,
    out_handle: *mut u64,
) -> XianNativeRendererResult {
    if out_handle.is_null() {
        return XianNativeRendererResult::InvalidArgument;
    }
    let Some(runtime) = (unsafe { runtime_ref(runtime) }) else {
        return XianNativeRendererResult::InvalidArgument;
    };

    let created = runtime.create_renderer(OwnerContext(owner as usize));
    let raw = created.as_ref().map_or(0, |handle| handle.to_raw());
    unsafe { out_handle.write(raw) };
    created.into()
}

#[unsafe(no_mangle)]
/// ### English
/// Creates a renderer for `owner`. Returns `0` (the null handle) if the runtime pointer is NULL or
/// the runtime is at capacity.
///
/// ### 中文
/// 为 `owner` 创建 renderer。运行时指针为 NULL 或已达容量上限时返回 `0`（空句柄）。
pub unsafe extern "C" fn xian_native_renderer_create(
    runtime: *mut XianNativeRenderingRuntime,
    owner: *mut c_void,
) -> u64 {
    let mut handle = 0u64;
    unsafe { xian_native_renderer_try_create(runtime, owner, &mut handle) };
    handle
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a renderer. Stale, null or repeated handles are ignored.
///
/// A producer call already in flight may still finish; its frame is dropped.
///
/// ### 中文
/// 销毁 renderer。过期、空或重复的句柄会被忽略。
///
/// 已在途的生产者调用可能仍会完成；其帧会被丢弃。
pub unsafe extern "C" fn xian_native_renderer_destroy(
    runtime: *mut XianNativeRenderingRuntime,
    handle: u64,
) {
    let Some(runtime) = (unsafe { runtime_ref(runtime) }) else {
        return;
    };
    drop(runtime.destroy_renderer(Handle::from_raw(handle)));
}

#[unsafe(no_mangle)]
/// ### English
/// Registers the destination textures of a renderer.
///
/// `kind` is a `VideoKind` value. Only I420 (`1`) with exactly 3 textures (Y, U, V) is supported;
/// any other kind clears the destinations and returns `UnsupportedVideoKind`. A stale handle
/// returns `Success` and changes nothing.
///
/// ### 中文
/// 注册 renderer 的目标纹理。
///
/// `kind` 为 `VideoKind` 值。仅支持 I420（`1`）且恰好 3 个纹理（Y、U、V）；其他类型会清空目标并返回
/// `UnsupportedVideoKind`。句柄过期时返回 `Success` 且不做任何改变。
pub unsafe extern "C" fn xian_native_renderer_register_textures(
    runtime: *mut XianNativeRenderingRuntime,
    handle: u64,
    kind: i32,
    textures: *const XianTextureDesc,
    count: u32,
) -> XianNativeRendererResult {
    let Some(runtime) = (unsafe { runtime_ref(runtime) }) else {
        return XianNativeRendererResult::InvalidArgument;
    };
    let handle = Handle::from_raw(handle);

    let kind = VideoKind::from_abi(kind);
    if kind != VideoKind::I420 {
        tracing::debug!(?handle, ?kind, "unsupported video kind; destinations cleared");
        runtime.clear_destinations(handle);
        return XianNativeRendererResult::UnsupportedVideoKind;
    }
    if textures.is_null() || count as usize != kind.plane_count() {
        return XianNativeRendererResult::InvalidArgument;
    }

    let descs = unsafe { std::slice::from_raw_parts(textures, count as usize) };
    let mut destinations = Vec::with_capacity(descs.len());
    for desc in descs {
        if desc.texture.is_null() || desc.width <= 0 || desc.height <= 0 {
            return XianNativeRendererResult::InvalidArgument;
        }
        destinations.push(TextureDesc::new(
            desc.texture as usize,
            desc.width as u32,
            desc.height as u32,
        ));
    }

    runtime.set_destinations(handle, destinations);
    XianNativeRendererResult::Success
}

#[unsafe(no_mangle)]
/// ### English
/// Removes a renderer's destination textures; it stops receiving uploads and drops its pending
/// frame. Stale handles are ignored.
///
/// ### 中文
/// 移除 renderer 的目标纹理；其不再接收上传，并丢弃待处理帧。过期句柄会被忽略。
pub unsafe extern "C" fn xian_native_renderer_unregister_textures(
    runtime: *mut XianNativeRenderingRuntime,
    handle: u64,
) {
    let Some(runtime) = (unsafe { runtime_ref(runtime) }) else {
        return;
    };
    runtime.clear_destinations(Handle::from_raw(handle));
}
