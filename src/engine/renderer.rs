//! ### English
//! Registered renderer object: destination textures plus the frame mailbox, behind one
//! per-renderer lock.
//!
//! Lock order: the registry table lock and the scheduler's dirty-set lock always come first.
//! Nothing in this module takes either of them while `state` is locked.
//!
//! ### 中文
//! 已注册的 renderer 对象：目标纹理 + 帧邮箱，由单把 renderer 级锁保护。
//!
//! 锁顺序：注册表表锁与调度器 dirty 集合锁总是先获取。
//! 本模块在持有 `state` 锁时绝不获取上述两把锁。

use std::sync::Arc;

use parking_lot::Mutex;

use super::dispatch::TextureDesc;
use super::error::FrameError;
use super::frame::{FrameMailbox, I420Frame, RawI420Frame};
use super::handle::Handle;

/// ### English
/// Opaque embedder context a renderer was created for (e.g. a peer connection pointer cast to
/// `usize`). Never dereferenced by this crate.
///
/// ### 中文
/// 创建 renderer 时关联的不透明宿主上下文（例如转为 `usize` 的 peer connection 指针）。
/// 本 crate 从不解引用它。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OwnerContext(pub usize);

struct RendererState {
    destinations: Arc<[TextureDesc]>,
    mailbox: FrameMailbox,
}

/// ### English
/// Outcome of taking a renderer's frame for one tick.
///
/// ### 中文
/// 某次 tick 中从 renderer 取帧的结果。
pub enum UploadCandidate {
    /// ### English
    /// Nothing pending.
    ///
    /// ### 中文
    /// 没有待处理帧。
    Empty,
    /// ### English
    /// A frame was pending but fewer destinations than planes are registered; the frame was
    /// recycled.
    ///
    /// ### 中文
    /// 存在待处理帧，但已注册的目标数少于平面数；该帧已被回收。
    DestinationMismatch { destinations: usize, planes: usize },
    /// ### English
    /// Frame ready for upload, with a snapshot of the destinations.
    ///
    /// ### 中文
    /// 可上传的帧，附带目标列表快照。
    Ready {
        destinations: Arc<[TextureDesc]>,
        frame: I420Frame,
    },
}

/// ### English
/// Consumer-side object registered in the `HandleRegistry`.
///
/// Shared between the registry (one strong reference) and any in-flight producer callback that
/// resolved the handle before `destroy`.
///
/// ### 中文
/// 注册在 `HandleRegistry` 中的消费侧对象。
///
/// 由注册表（一个强引用）与在 `destroy` 之前解析过句柄的在途生产者回调共享。
pub struct NativeRenderer {
    handle: Handle,
    owner: OwnerContext,
    state: Mutex<RendererState>,
}

impl NativeRenderer {
    pub fn new(handle: Handle, owner: OwnerContext, frame_pool_limit: usize) -> Self {
        Self {
            handle,
            owner,
            state: Mutex::new(RendererState {
                destinations: Arc::from(Vec::new()),
                mailbox: FrameMailbox::new(frame_pool_limit),
            }),
        }
    }

    /// ### English
    /// Handle this renderer was registered under.
    ///
    /// ### 中文
    /// 该 renderer 注册时使用的句柄。
    #[inline]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    #[inline]
    pub fn owner(&self) -> OwnerContext {
        self.owner
    }

    /// ### English
    /// Replaces the destination textures.
    ///
    /// ### 中文
    /// 替换目标纹理。
    pub fn set_destinations(&self, destinations: Vec<TextureDesc>) {
        tracing::debug!(
            handle = ?self.handle,
            count = destinations.len(),
            "renderer destinations registered"
        );
        self.state.lock().destinations = Arc::from(destinations);
    }

    /// ### English
    /// Removes all destinations and drops the pending frame: an inactive renderer keeps no
    /// backlog.
    ///
    /// ### 中文
    /// 移除所有目标并丢弃待处理帧：非活动 renderer 不保留积压帧。
    pub fn clear_destinations(&self) {
        tracing::debug!(handle = ?self.handle, "renderer destinations cleared");
        let mut state = self.state.lock();
        state.destinations = Arc::from(Vec::new());
        state.mailbox.clear();
    }

    pub fn destinations(&self) -> Arc<[TextureDesc]> {
        self.state.lock().destinations.clone()
    }

    /// ### English
    /// Whether destinations are registered (the renderer takes part in ticks).
    ///
    /// ### 中文
    /// 是否已注册目标（renderer 会参与 tick）。
    pub fn is_active(&self) -> bool {
        !self.state.lock().destinations.is_empty()
    }

    /// ### English
    /// Copies a producer frame into the mailbox (latest wins).
    ///
    /// ### 中文
    /// 把生产者帧拷贝进邮箱（最新帧优先）。
    pub fn deposit(&self, raw: &RawI420Frame<'_>) -> Result<(), FrameError> {
        self.state.lock().mailbox.deposit(raw)
    }

    /// ### English
    /// Takes the pending frame together with the destinations it should be uploaded to.
    ///
    /// ### 中文
    /// 取出待处理帧以及其应上传到的目标列表。
    pub fn take_for_upload(&self) -> UploadCandidate {
        let mut state = self.state.lock();
        let Some(frame) = state.mailbox.take_latest() else {
            return UploadCandidate::Empty;
        };

        let planes = frame.plane_count();
        let destinations = state.destinations.len();
        if destinations < planes {
            state.mailbox.recycle(frame);
            return UploadCandidate::DestinationMismatch {
                destinations,
                planes,
            };
        }

        UploadCandidate::Ready {
            destinations: state.destinations.clone(),
            frame,
        }
    }

    /// ### English
    /// Returns a consumed frame to this renderer's pool.
    ///
    /// ### 中文
    /// 将已消费的帧归还到该 renderer 的帧池。
    pub fn recycle(&self, frame: I420Frame) {
        self.state.lock().mailbox.recycle(frame);
    }

    /// ### English
    /// Teardown after the renderer left the registry.
    ///
    /// ### 中文
    /// renderer 离开注册表之后的清理。
    pub(crate) fn shutdown(&self) {
        tracing::debug!(handle = ?self.handle, "renderer shutdown");
        self.clear_destinations();
    }

    pub fn has_pending_frame(&self) -> bool {
        self.state.lock().mailbox.has_pending()
    }

    pub fn pooled_frames(&self) -> usize {
        self.state.lock().mailbox.pooled()
    }

    /// ### English
    /// Number of frame buffers this renderer ever allocated.
    ///
    /// ### 中文
    /// 该 renderer 累计分配的帧缓冲数量。
    pub fn frame_allocations(&self) -> u64 {
        self.state.lock().mailbox.allocations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::frame::test_util::TestPlanes;

    fn renderer() -> NativeRenderer {
        NativeRenderer::new(Handle::new(0, 1), OwnerContext(0xfeed), 2)
    }

    fn three_textures() -> Vec<TextureDesc> {
        (1..=3).map(|t| TextureDesc::new(t, 8, 4)).collect()
    }

    #[test]
    fn ready_when_destinations_cover_all_planes() {
        let renderer = renderer();
        let planes = TestPlanes::new(8, 4, 3);
        renderer.set_destinations(three_textures());
        renderer.deposit(&planes.raw()).unwrap();

        match renderer.take_for_upload() {
            UploadCandidate::Ready {
                destinations,
                frame,
            } => {
                assert_eq!(destinations.len(), 3);
                assert_eq!(frame.plane(0).unwrap(), &planes.y[..]);
            }
            _ => panic!("expected a ready frame"),
        }
        assert!(matches!(renderer.take_for_upload(), UploadCandidate::Empty));
    }

    #[test]
    fn too_few_destinations_recycles_the_frame() {
        let renderer = renderer();
        let planes = TestPlanes::new(8, 4, 3);
        renderer.set_destinations(vec![TextureDesc::new(1, 8, 4)]);
        renderer.deposit(&planes.raw()).unwrap();

        assert!(matches!(
            renderer.take_for_upload(),
            UploadCandidate::DestinationMismatch {
                destinations: 1,
                planes: 3
            }
        ));
        assert!(!renderer.has_pending_frame());
        assert_eq!(renderer.pooled_frames(), 1);
    }

    #[test]
    fn clearing_destinations_drops_the_backlog() {
        let renderer = renderer();
        let planes = TestPlanes::new(8, 4, 3);
        renderer.set_destinations(three_textures());
        renderer.deposit(&planes.raw()).unwrap();
        assert!(renderer.is_active());

        renderer.clear_destinations();
        assert!(!renderer.is_active());
        assert!(!renderer.has_pending_frame());

        renderer.set_destinations(three_textures());
        assert!(matches!(renderer.take_for_upload(), UploadCandidate::Empty));
    }

    #[test]
    fn identity_is_kept() {
        let renderer = renderer();
        assert_eq!(renderer.handle(), Handle::new(0, 1));
        assert_eq!(renderer.owner(), OwnerContext(0xfeed));
    }
}
