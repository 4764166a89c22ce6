//! ### English
//! C ABI binding for the producer side: frames delivered from the video decoder thread.
//!
//! ### 中文
//! 生产者侧的 C ABI 绑定：由视频解码线程投递的帧。

use super::{XianI420Frame, XianNativeRendererResult, XianNativeRenderingRuntime, runtime_ref};
use crate::engine::{Handle, RawI420Frame};

impl XianI420Frame {
    /// ### English
    /// Borrows the planes as slices. Returns `None` for NULL planes or non-positive sizes.
    ///
    /// # Safety
    /// Each plane pointer must be readable for its documented length during `'a`.
    ///
    /// ### 中文
    /// 以切片形式借用各平面。平面为 NULL 或尺寸非正时返回 `None`。
    ///
    /// # Safety
    /// 在 `'a` 期间，每个平面指针都必须可按其约定长度读取。
    unsafe fn as_raw<'a>(&self) -> Option<RawI420Frame<'a>> {
        if self.ydata.is_null() || self.udata.is_null() || self.vdata.is_null() {
            return None;
        }
        let width = u32::try_from(self.width).ok().filter(|&w| w > 0)?;
        let height = u32::try_from(self.height).ok().filter(|&h| h > 0)?;
        let ystride = u32::try_from(self.ystride).ok()?;
        let ustride = u32::try_from(self.ustride).ok()?;
        let vstride = u32::try_from(self.vstride).ok()?;

        let mut raw = RawI420Frame {
            width,
            height,
            ystride,
            ustride,
            vstride,
            y: &[],
            u: &[],
            v: &[],
        };
        let [ylen, ulen, vlen] = raw.plane_sizes();
        unsafe {
            raw.y = std::slice::from_raw_parts(self.ydata, ylen);
            raw.u = std::slice::from_raw_parts(self.udata, ulen);
            raw.v = std::slice::from_raw_parts(self.vdata, vlen);
        }
        Some(raw)
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Delivers a decoded frame to a renderer. Callable from any thread at any time.
///
/// The frame is copied before returning (latest frame wins; older undelivered frames are
/// replaced). A stale handle returns `Success` and drops the frame.
///
/// ### 中文
/// 向 renderer 投递一帧解码后的画面。可在任意线程、任意时刻调用。
///
/// 返回前会拷贝该帧（最新帧优先；尚未上传的旧帧被替换）。句柄过期时返回 `Success` 并丢弃该帧。
pub unsafe extern "C" fn xian_native_renderer_on_i420_frame(
    runtime: *mut XianNativeRenderingRuntime,
    handle: u64,
    frame: *const XianI420Frame,
) -> XianNativeRendererResult {
    let Some(runtime) = (unsafe { runtime_ref(runtime) }) else {
        return XianNativeRendererResult::InvalidArgument;
    };
    let Some(frame) = (unsafe { frame.as_ref() }) else {
        return XianNativeRendererResult::InvalidArgument;
    };
    let Some(raw) = (unsafe { frame.as_raw() }) else {
        return XianNativeRendererResult::InvalidFrame;
    };

    runtime
        .on_frame_available(Handle::from_raw(handle), &raw)
        .into()
}
