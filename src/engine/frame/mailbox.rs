//! ### English
//! Single-slot "latest frame wins" mailbox with a bounded free pool.
//!
//! The mailbox has no lock of its own: it is owned by a `NativeRenderer` and only ever touched
//! under that renderer's lock.
//!
//! ### 中文
//! 单槽位、“最新帧优先”的邮箱，附带有界的空闲帧池。
//!
//! 邮箱本身不带锁：它归 `NativeRenderer` 所有，只会在该 renderer 的锁内被访问。

use super::{I420Frame, RawI420Frame};
use crate::engine::error::FrameError;

/// ### English
/// Pending frame + retired-frame pool for one renderer.
///
/// - `deposit` overwrites any pending frame; the displaced frame goes back to the pool.
/// - `take_latest` hands the pending frame to the consumer.
/// - `recycle` returns a consumed frame; the pool never grows beyond `pool_limit`.
///
/// Peak memory per renderer is therefore one pending frame, one frame in flight on the consumer
/// side and `pool_limit` retired frames.
///
/// ### 中文
/// 单个 renderer 的待处理帧 + 已退役帧池。
///
/// - `deposit` 覆盖任何待处理帧；被替换的帧回到帧池。
/// - `take_latest` 把待处理帧交给消费者。
/// - `recycle` 归还已消费的帧；帧池大小永远不超过 `pool_limit`。
///
/// 因此每个 renderer 的峰值内存为：一个待处理帧、一个消费侧在途帧，以及 `pool_limit` 个退役帧。
#[derive(Debug)]
pub struct FrameMailbox {
    pending: Option<I420Frame>,
    pool: Vec<I420Frame>,
    pool_limit: usize,
    /// ### English
    /// Fresh frame allocations made because the pool was empty.
    ///
    /// ### 中文
    /// 因帧池为空而新分配的帧数量。
    allocations: u64,
}

impl FrameMailbox {
    pub fn new(pool_limit: usize) -> Self {
        let pool_limit = pool_limit.max(1);
        Self {
            pending: None,
            pool: Vec::with_capacity(pool_limit),
            pool_limit,
            allocations: 0,
        }
    }

    /// ### English
    /// Copies `raw` into a pooled (or freshly allocated) frame and makes it the pending frame.
    ///
    /// On error the pending frame is left untouched.
    ///
    /// ### 中文
    /// 将 `raw` 拷贝到池化（或新分配）的帧中，并设为待处理帧。
    ///
    /// 出错时待处理帧保持不变。
    pub fn deposit(&mut self, raw: &RawI420Frame<'_>) -> Result<(), FrameError> {
        raw.validate()?;

        let mut frame = match self.pool.pop() {
            Some(frame) => frame,
            None => {
                self.allocations += 1;
                I420Frame::default()
            }
        };

        if let Err(err) = frame.copy_from(raw) {
            self.recycle(frame);
            return Err(err);
        }

        if let Some(displaced) = self.pending.replace(frame) {
            self.recycle(displaced);
        }
        Ok(())
    }

    /// ### English
    /// Takes the pending frame, leaving the mailbox empty.
    ///
    /// ### 中文
    /// 取走待处理帧，邮箱随之变空。
    #[inline]
    pub fn take_latest(&mut self) -> Option<I420Frame> {
        self.pending.take()
    }

    /// ### English
    /// Returns a consumed frame to the pool (dropped if the pool is full).
    ///
    /// ### 中文
    /// 把已消费的帧归还帧池（帧池已满时直接释放）。
    #[inline]
    pub fn recycle(&mut self, frame: I420Frame) {
        if self.pool.len() < self.pool_limit {
            self.pool.push(frame);
        }
    }

    /// ### English
    /// Drops the pending frame into the pool (used when the renderer goes inactive).
    ///
    /// ### 中文
    /// 把待处理帧放回帧池（renderer 变为非活动状态时使用）。
    pub fn clear(&mut self) {
        if let Some(frame) = self.pending.take() {
            self.recycle(frame);
        }
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[inline]
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    #[inline]
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// ### English
    /// Pooled frames, most recently retired last.
    ///
    /// ### 中文
    /// 帧池中的帧，最近退役的位于末尾。
    pub fn pool(&self) -> &[I420Frame] {
        &self.pool
    }
}
