//! ### English
//! `RenderDispatcher` backed by a host upload callback (one call per plane).
//!
//! ### 中文
//! 由宿主上传回调实现的 `RenderDispatcher`（每个平面调用一次）。

use std::ffi::c_void;

use crate::engine::{I420Frame, RenderDispatcher, TextureDesc, UploadError};

/// ### English
/// Host callback uploading one plane into one native texture on the render thread.
///
/// `data` spans `len` bytes laid out in rows of `stride` bytes; it is only valid during the call.
/// Returns `false` if the upload failed.
///
/// ### 中文
/// 宿主回调：在渲染线程上把单个平面上传到单个原生纹理。
///
/// `data` 共 `len` 字节，按每行 `stride` 字节排列；仅在本次调用期间有效。上传失败时返回 `false`。
pub type XianUploadPlaneFn = unsafe extern "C" fn(
    user_data: *mut c_void,
    texture: *mut c_void,
    width: i32,
    height: i32,
    data: *const u8,
    len: usize,
    stride: i32,
) -> bool;

/// ### English
/// Dispatcher forwarding each plane to `XianUploadPlaneFn`.
///
/// ### 中文
/// 把每个平面转发给 `XianUploadPlaneFn` 的分发器。
pub struct HostDispatcher {
    upload: XianUploadPlaneFn,
    /// ### English
    /// Opaque host pointer stored as an address; passed back on every call.
    ///
    /// ### 中文
    /// 以地址形式保存的不透明宿主指针；每次调用时原样传回。
    user_data: usize,
}

impl HostDispatcher {
    pub fn new(upload: XianUploadPlaneFn, user_data: *mut c_void) -> Self {
        Self {
            upload,
            user_data: user_data as usize,
        }
    }
}

impl RenderDispatcher for HostDispatcher {
    fn upload(
        &mut self,
        destinations: &[TextureDesc],
        frame: &I420Frame,
    ) -> Result<(), UploadError> {
        for (plane, destination) in destinations.iter().enumerate().take(frame.plane_count()) {
            if destination.texture == 0 {
                return Err(UploadError::NullTexture { plane });
            }
            let (Some(data), Some(stride)) = (frame.plane(plane), frame.stride(plane)) else {
                return Err(UploadError::Other(format!("frame has no plane {plane}")));
            };

            let accepted = unsafe {
                (self.upload)(
                    self.user_data as *mut c_void,
                    destination.texture as *mut c_void,
                    destination.size.width as i32,
                    destination.size.height as i32,
                    data.as_ptr(),
                    data.len(),
                    stride as i32,
                )
            };
            if !accepted {
                return Err(UploadError::Rejected { plane });
            }
        }
        Ok(())
    }
}
