//! ### English
//! Dirty-set update scheduler: producers mark renderer handles dirty from any thread, the render
//! tick drains the set once and uploads each renderer's latest frame.
//!
//! Per-tick cost is O(dirty renderers), independent of how many renderers exist.
//!
//! ### 中文
//! dirty 集合更新调度器：生产者可在任意线程标记 renderer 句柄为 dirty，渲染 tick 每次 drain 一次
//! 并上传每个 renderer 的最新帧。
//!
//! 每次 tick 的开销为 O(dirty renderer 数)，与 renderer 总数无关。

use std::mem;

use parking_lot::Mutex;

use super::dispatch::RenderDispatcher;
use super::handle::Handle;
use super::registry::HandleRegistry;
use super::renderer::{NativeRenderer, UploadCandidate};
use super::u32_hash::SlotMap;

/// ### English
/// Deduplicated set of dirty handles, one entry per slot, in first-mark order.
///
/// ### 中文
/// 去重后的 dirty 句柄集合：每个槽位一项，按首次标记顺序排列。
#[derive(Default)]
struct DirtySet {
    handles: Vec<Handle>,
    positions: SlotMap<usize>,
    /// ### English
    /// Buffer returned by the previous drain, swapped in on the next one.
    ///
    /// ### 中文
    /// 上一次 drain 归还的缓冲区，下次 drain 时换入。
    spare: Vec<Handle>,
}

/// ### English
/// Counters describing one tick.
///
/// ### 中文
/// 描述单次 tick 的计数。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// ### English
    /// Handles taken out of the dirty set.
    ///
    /// ### 中文
    /// 从 dirty 集合取出的句柄数。
    pub drained: usize,
    /// ### English
    /// Frames forwarded to the dispatcher successfully.
    ///
    /// ### 中文
    /// 成功转交给分发器的帧数。
    pub uploaded: usize,
    /// ### English
    /// Handles whose renderer was destroyed between mark and drain.
    ///
    /// ### 中文
    /// 在标记与 drain 之间已被销毁的句柄数。
    pub stale: usize,
    /// ### English
    /// Renderers skipped because fewer destinations than planes were registered.
    ///
    /// ### 中文
    /// 因已注册目标数少于平面数而跳过的 renderer 数。
    pub skipped: usize,
    /// ### English
    /// Renderers that had no pending frame.
    ///
    /// ### 中文
    /// 没有待处理帧的 renderer 数。
    pub idle: usize,
    /// ### English
    /// Uploads the dispatcher reported as failed.
    ///
    /// ### 中文
    /// 分发器报告失败的上传数。
    pub failed: usize,
}

/// Wrapping generation order: `candidate` was issued after `current` for the same slot.
#[inline]
fn is_newer_generation(candidate: Handle, current: Handle) -> bool {
    (candidate.generation().wrapping_sub(current.generation()) as i32) > 0
}

/// ### English
/// Dirty-set scheduler shared by producer threads (`mark_dirty`) and the single tick thread
/// (`drain` / `dispatch_tick`).
///
/// The dirty-set lock is only held for the insert or the swap; it is never held while a renderer
/// lock or the registry table lock is taken.
///
/// ### 中文
/// 由生产者线程（`mark_dirty`）与唯一的 tick 线程（`drain` / `dispatch_tick`）共享的 dirty 集合调度器。
///
/// dirty 集合锁只在插入或交换期间持有；持有期间绝不获取 renderer 锁或注册表表锁。
#[derive(Default)]
pub struct UpdateScheduler {
    dirty: Mutex<DirtySet>,
}

impl UpdateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// ### English
    /// Marks `handle` dirty for the next drain.
    ///
    /// Returns `true` iff the slot was not already marked. A second mark for the same slot never
    /// adds an entry; it replaces the stored handle only if it carries a newer generation, so a
    /// late mark from a destroyed renderer cannot hide the renderer that reused its slot.
    ///
    /// ### 中文
    /// 把 `handle` 标记为 dirty，等待下一次 drain。
    ///
    /// 当且仅当该槽位此前未被标记时返回 `true`。同一槽位的重复标记不会新增条目；只有携带更新
    /// generation 的句柄才会替换已存储的句柄，因此已销毁 renderer 的迟到标记不会遮蔽复用该槽位的 renderer。
    pub fn mark_dirty(&self, handle: Handle) -> bool {
        if handle.is_null() {
            return false;
        }

        let mut dirty = self.dirty.lock();
        let DirtySet {
            handles, positions, ..
        } = &mut *dirty;
        match positions.get(&handle.slot()) {
            Some(&index) => {
                if is_newer_generation(handle, handles[index]) {
                    handles[index] = handle;
                }
                false
            }
            None => {
                positions.insert(handle.slot(), handles.len());
                handles.push(handle);
                true
            }
        }
    }

    /// ### English
    /// Swaps the dirty set for an empty one and returns the previous contents.
    ///
    /// Must only be called from the tick thread. Pass the returned buffer to `reclaim` to reuse
    /// its allocation.
    ///
    /// ### 中文
    /// 把 dirty 集合换成空集合，并返回之前的内容。
    ///
    /// 只能在 tick 线程调用。可把返回的缓冲区交给 `reclaim` 以复用其分配。
    pub fn drain(&self) -> Vec<Handle> {
        let mut dirty = self.dirty.lock();
        let mut drained = mem::take(&mut dirty.spare);
        mem::swap(&mut drained, &mut dirty.handles);
        dirty.positions.clear();
        drained
    }

    /// ### English
    /// Hands a drained buffer back for the next drain.
    ///
    /// ### 中文
    /// 归还 drain 得到的缓冲区，供下一次 drain 使用。
    pub fn reclaim(&self, mut buffer: Vec<Handle>) {
        buffer.clear();
        let mut dirty = self.dirty.lock();
        if buffer.capacity() > dirty.spare.capacity() {
            dirty.spare = buffer;
        }
    }

    /// ### English
    /// Number of handles currently marked.
    ///
    /// ### 中文
    /// 当前已标记的句柄数量。
    pub fn pending_len(&self) -> usize {
        self.dirty.lock().handles.len()
    }

    /// ### English
    /// One render tick: drain, resolve every handle under a single table-lock acquisition, and
    /// upload each live renderer's latest frame.
    ///
    /// Destroyed renderers are skipped silently, renderers without enough destinations drop their
    /// frame, and dispatcher errors are logged per renderer. Nothing here aborts the tick.
    ///
    /// ### 中文
    /// 单次渲染 tick：drain、在一次表锁内解析所有句柄，并上传每个存活 renderer 的最新帧。
    ///
    /// 已销毁的 renderer 静默跳过，目标不足的 renderer 丢弃其帧，分发器错误按 renderer 记录日志。
    /// 这里的任何情况都不会中止 tick。
    pub fn dispatch_tick(
        &self,
        registry: &HandleRegistry<NativeRenderer>,
        dispatcher: &mut dyn RenderDispatcher,
    ) -> TickReport {
        let handles = self.drain();
        let mut report = TickReport {
            drained: handles.len(),
            ..TickReport::default()
        };
        if handles.is_empty() {
            self.reclaim(handles);
            return report;
        }

        let renderers = registry.resolve_many(&handles);
        for (&handle, renderer) in handles.iter().zip(renderers) {
            let Some(renderer) = renderer else {
                tracing::trace!(?handle, "dirty renderer destroyed before tick");
                report.stale += 1;
                continue;
            };

            match renderer.take_for_upload() {
                UploadCandidate::Empty => report.idle += 1,
                UploadCandidate::DestinationMismatch {
                    destinations,
                    planes,
                } => {
                    tracing::trace!(
                        ?handle,
                        destinations,
                        planes,
                        "renderer skipped: not enough destinations"
                    );
                    report.skipped += 1;
                }
                UploadCandidate::Ready {
                    destinations,
                    frame,
                } => {
                    match dispatcher.upload(&destinations, &frame) {
                        Ok(()) => report.uploaded += 1,
                        Err(err) => {
                            tracing::warn!(?handle, error = %err, "frame upload failed");
                            report.failed += 1;
                        }
                    }
                    renderer.recycle(frame);
                }
            }
        }

        self.reclaim(handles);
        report
    }
}
