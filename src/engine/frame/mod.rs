//! ### English
//! Planar I420 frames handed from producer callbacks to the render tick, plus the per-renderer
//! "latest frame wins" mailbox that recycles their buffers.
//!
//! ### 中文
//! 从生产者回调交给渲染 tick 的 I420 平面帧，以及按 renderer 划分、“最新帧优先”并回收缓冲区的邮箱。

mod mailbox;

pub use mailbox::FrameMailbox;

use dpi::PhysicalSize;

use super::error::FrameError;

/// ### English
/// Plane count of an I420 frame (Y, U, V).
///
/// ### 中文
/// I420 帧的平面数（Y、U、V）。
pub const I420_PLANE_COUNT: usize = 3;

/// ### English
/// Borrowed producer frame: three planes plus their strides, valid for the duration of the
/// producer callback only.
///
/// ### 中文
/// 借用的生产者帧：三个平面及其 stride，仅在生产者回调期间有效。
#[derive(Clone, Copy, Debug)]
pub struct RawI420Frame<'a> {
    pub width: u32,
    pub height: u32,
    pub ystride: u32,
    pub ustride: u32,
    pub vstride: u32,
    pub y: &'a [u8],
    pub u: &'a [u8],
    pub v: &'a [u8],
}

impl RawI420Frame<'_> {
    /// ### English
    /// Byte sizes of the Y, U and V planes: `stride × height` for luma and `stride × height / 2`
    /// for both chroma planes.
    ///
    /// ### 中文
    /// Y、U、V 平面的字节数：亮度为 `stride × height`，两个色度平面为 `stride × height / 2`。
    #[inline]
    pub fn plane_sizes(&self) -> [usize; I420_PLANE_COUNT] {
        i420_plane_sizes(self.ystride, self.ustride, self.vstride, self.height)
    }

    /// ### English
    /// Checks the dimensions and that every plane slice covers its computed size.
    ///
    /// ### 中文
    /// 检查尺寸，并确认每个平面切片都覆盖其计算大小。
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 || self.ystride < self.width {
            return Err(FrameError::InvalidDimensions {
                width: self.width,
                height: self.height,
                ystride: self.ystride,
            });
        }

        let sources = [self.y, self.u, self.v];
        for (plane, (needed, source)) in self.plane_sizes().into_iter().zip(sources).enumerate() {
            if source.len() < needed {
                return Err(FrameError::PlaneTooSmall {
                    plane,
                    needed,
                    actual: source.len(),
                });
            }
        }
        Ok(())
    }
}

#[inline]
fn i420_plane_sizes(ystride: u32, ustride: u32, vstride: u32, height: u32) -> [usize; 3] {
    let height = height as usize;
    [
        ystride as usize * height,
        ustride as usize * height / 2,
        vstride as usize * height / 2,
    ]
}

/// ### English
/// Owned I420 frame stored in a renderer's mailbox or pool.
///
/// Buffers are reused across deposits: `copy_from` resizes each plane in place (no allocation when
/// the capacity already fits) and overwrites it completely.
///
/// ### 中文
/// 存放在 renderer 邮箱或帧池中的自有 I420 帧。
///
/// 缓冲区在多次投递之间复用：`copy_from` 原地调整各平面大小（容量足够时不分配）并完整覆盖。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct I420Frame {
    width: u32,
    height: u32,
    strides: [u32; I420_PLANE_COUNT],
    planes: [Vec<u8>; I420_PLANE_COUNT],
}

impl I420Frame {
    /// ### English
    /// Copies `raw` into this frame, replacing all three planes.
    ///
    /// Returns `FrameError::Allocation` if a plane cannot grow; the frame content is unspecified
    /// afterwards but the frame stays reusable.
    ///
    /// ### 中文
    /// 把 `raw` 拷贝到本帧，替换全部三个平面。
    ///
    /// 若某个平面无法扩容则返回 `FrameError::Allocation`；此后帧内容未定义，但帧仍可复用。
    pub fn copy_from(&mut self, raw: &RawI420Frame<'_>) -> Result<(), FrameError> {
        raw.validate()?;

        let sources = [raw.y, raw.u, raw.v];
        for ((plane, size), source) in self.planes.iter_mut().zip(raw.plane_sizes()).zip(sources) {
            plane.clear();
            plane.try_reserve(size)?;
            plane.extend_from_slice(&source[..size]);
        }

        self.width = raw.width;
        self.height = raw.height;
        self.strides = [raw.ystride, raw.ustride, raw.vstride];
        Ok(())
    }

    /// ### English
    /// Frame size in pixels.
    ///
    /// ### 中文
    /// 帧尺寸（像素）。
    #[inline]
    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.width, self.height)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn plane_count(&self) -> usize {
        I420_PLANE_COUNT
    }

    /// ### English
    /// Row stride in bytes of plane `index` (0 = Y, 1 = U, 2 = V).
    ///
    /// ### 中文
    /// 平面 `index` 的行跨度（字节；0 = Y，1 = U，2 = V）。
    #[inline]
    pub fn stride(&self, index: usize) -> Option<u32> {
        self.strides.get(index).copied()
    }

    /// ### English
    /// Bytes of plane `index` (0 = Y, 1 = U, 2 = V).
    ///
    /// ### 中文
    /// 平面 `index` 的字节数据（0 = Y，1 = U，2 = V）。
    #[inline]
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes.get(index).map(Vec::as_slice)
    }

    /// ### English
    /// Current buffer capacity of every plane (used to observe recycling).
    ///
    /// ### 中文
    /// 各平面当前的缓冲区容量（用于观察复用情况）。
    pub fn capacities(&self) -> [usize; I420_PLANE_COUNT] {
        [
            self.planes[0].capacity(),
            self.planes[1].capacity(),
            self.planes[2].capacity(),
        ]
    }
}
