//! ### English
//! Boundary with the graphics side: destination descriptors and the `RenderDispatcher` trait that
//! performs the actual texture upload.
//!
//! ### 中文
//! 与图形侧的边界：目标描述符，以及执行实际纹理上传的 `RenderDispatcher` trait。

use dpi::PhysicalSize;

use super::error::UploadError;
use super::frame::I420Frame;

/// ### English
/// Pixel layout announced by the embedder when it registers textures.
///
/// ### 中文
/// 宿主注册纹理时声明的像素布局。
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoKind {
    None = 0,
    I420 = 1,
    Argb = 2,
}

impl VideoKind {
    /// ### English
    /// Decodes the ABI value; unknown values map to `None`.
    ///
    /// ### 中文
    /// 解码 ABI 值；未知值映射为 `None`。
    pub fn from_abi(value: i32) -> Self {
        match value {
            1 => Self::I420,
            2 => Self::Argb,
            _ => Self::None,
        }
    }

    /// ### English
    /// Number of destination textures this layout needs (one per plane).
    ///
    /// ### 中文
    /// 该布局所需的目标纹理数量（每个平面一个）。
    pub fn plane_count(self) -> usize {
        match self {
            Self::None => 0,
            Self::I420 => 3,
            Self::Argb => 1,
        }
    }
}

/// ### English
/// One destination texture: an opaque native texture handle owned by the embedder plus the size it
/// was created with.
///
/// ### 中文
/// 单个目标纹理：宿主持有的不透明原生纹理句柄，以及创建时的尺寸。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureDesc {
    /// ### English
    /// Native texture handle (e.g. an `ID3D11Texture2D*` or GL name) cast to `usize`.
    ///
    /// ### 中文
    /// 原生纹理句柄（如 `ID3D11Texture2D*` 或 GL 名称）转为 `usize`。
    pub texture: usize,
    pub size: PhysicalSize<u32>,
}

impl TextureDesc {
    pub fn new(texture: usize, width: u32, height: u32) -> Self {
        Self {
            texture,
            size: PhysicalSize::new(width, height),
        }
    }
}

/// ### English
/// Uploads one renderer's latest frame into its destination textures.
///
/// Called synchronously from the render tick, on the tick thread, with no crate lock held.
/// `destinations` holds at least `frame.plane_count()` entries; plane `i` goes to
/// `destinations[i]`. An error only affects this renderer for this tick.
///
/// ### 中文
/// 把单个 renderer 的最新帧上传到其目标纹理。
///
/// 在渲染 tick 线程上同步调用，调用时不持有本 crate 的任何锁。
/// `destinations` 至少包含 `frame.plane_count()` 项；平面 `i` 对应 `destinations[i]`。
/// 错误只影响该 renderer 的本次 tick。
pub trait RenderDispatcher: Send {
    fn upload(&mut self, destinations: &[TextureDesc], frame: &I420Frame)
    -> Result<(), UploadError>;
}

impl<F> RenderDispatcher for F
where
    F: FnMut(&[TextureDesc], &I420Frame) -> Result<(), UploadError> + Send,
{
    fn upload(
        &mut self,
        destinations: &[TextureDesc],
        frame: &I420Frame,
    ) -> Result<(), UploadError> {
        self(destinations, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_kind_decoding() {
        assert_eq!(VideoKind::from_abi(1), VideoKind::I420);
        assert_eq!(VideoKind::from_abi(2), VideoKind::Argb);
        assert_eq!(VideoKind::from_abi(0), VideoKind::None);
        assert_eq!(VideoKind::from_abi(-7), VideoKind::None);
        assert_eq!(VideoKind::I420.plane_count(), 3);
    }
}
