//! ### English
//! Process-scoped runtime tying the registry, the renderers' mailboxes and the update scheduler
//! together. One instance is created by the embedder at startup and passed explicitly to every
//! entry point (the C ABI hands it out as an opaque pointer).
//!
//! Lock order (outer to inner, never reversed):
//! 1. dispatcher slot (held by the tick for its whole duration; device calls wait on it);
//! 2. registry table lock, then the scheduler's dirty-set lock, each held only briefly;
//! 3. one renderer's lock.
//!
//! ### 中文
//! 进程级运行时：把注册表、各 renderer 的邮箱与更新调度器组合在一起。宿主在启动时创建一个实例，
//! 并显式传给每个入口（C ABI 以不透明指针形式交给宿主）。
//!
//! 锁顺序（由外到内，绝不反向）：
//! 1. 分发器槽位（tick 在整个执行期间持有；设备调用会等待它）；
//! 2. 注册表表锁，其后是调度器的 dirty 集合锁，均只短暂持有；
//! 3. 单个 renderer 的锁。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::config::RuntimeConfig;
use super::dispatch::{RenderDispatcher, TextureDesc};
use super::error::RuntimeError;
use super::frame::RawI420Frame;
use super::handle::Handle;
use super::registry::HandleRegistry;
use super::renderer::{NativeRenderer, OwnerContext};
use super::scheduler::{TickReport, UpdateScheduler};

/// ### English
/// Native rendering runtime: renderer lifecycle, producer entry point and the per-tick upload.
///
/// ### 中文
/// 原生渲染运行时：renderer 生命周期、生产者入口以及每次 tick 的上传。
pub struct NativeRenderingRuntime {
    /// ### English
    /// Normalized configuration this runtime was built with.
    ///
    /// ### 中文
    /// 构建本运行时所用的（已规范化的）配置。
    config: RuntimeConfig,
    /// ### English
    /// Handle → renderer table.
    ///
    /// ### 中文
    /// 句柄 → renderer 表。
    registry: HandleRegistry<NativeRenderer>,
    /// ### English
    /// Dirty set drained once per tick.
    ///
    /// ### 中文
    /// 每次 tick drain 一次的 dirty 集合。
    scheduler: UpdateScheduler,
    /// ### English
    /// Upload backend; present between graphics-device initialize and shutdown.
    ///
    /// ### 中文
    /// 上传后端；在图形设备初始化与关闭之间存在。
    dispatcher: Mutex<Option<Box<dyn RenderDispatcher>>>,
    /// ### English
    /// Set while a tick runs; overlapping `run_tick` calls see it and return early.
    ///
    /// ### 中文
    /// tick 运行期间置位；重叠的 `run_tick` 调用看到它后直接返回。
    ticking: AtomicBool,
}

/// ### English
/// Clears `ticking` when the tick ends, including on unwind.
///
/// ### 中文
/// tick 结束时（包括 unwind）清除 `ticking`。
struct TickGuard<'a>(&'a AtomicBool);

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl NativeRenderingRuntime {
    pub fn new(config: RuntimeConfig) -> Self {
        let config = config.normalized();
        tracing::debug!(
            max_renderers = config.max_renderers,
            frame_pool_limit = config.frame_pool_limit,
            "native rendering runtime created"
        );
        Self {
            config,
            registry: HandleRegistry::with_capacity(config.max_renderers),
            scheduler: UpdateScheduler::new(),
            dispatcher: Mutex::new(None),
            ticking: AtomicBool::new(false),
        }
    }

    /// ### English
    /// Configuration in effect (after clamping).
    ///
    /// ### 中文
    /// 当前生效的配置（已钳制）。
    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    /// ### English
    /// Registers a new renderer for `owner`.
    ///
    /// Fails with `RegistryError::CapacityExceeded` once `max_renderers` are alive.
    ///
    /// ### 中文
    /// 为 `owner` 注册一个新的 renderer。
    ///
    /// 存活数量达到 `max_renderers` 后返回 `RegistryError::CapacityExceeded`。
    pub fn create_renderer(&self, owner: OwnerContext) -> Result<Handle, RuntimeError> {
        let pool_limit = self.config.frame_pool_limit;
        let created = self
            .registry
            .create_with(|handle| Arc::new(NativeRenderer::new(handle, owner, pool_limit)));

        match created {
            Ok((handle, _)) => {
                tracing::debug!(?handle, owner = owner.0, "renderer created");
                Ok(handle)
            }
            Err(err) => {
                tracing::warn!(error = %err, "renderer creation failed");
                Err(err.into())
            }
        }
    }

    /// ### English
    /// Unregisters `handle` and tears the renderer down outside the registry lock.
    ///
    /// Returns the renderer so the embedder may keep it for its own teardown; stale or repeated
    /// destroys return `None` and change nothing.
    ///
    /// ### 中文
    /// 注销 `handle`，并在注册表锁之外清理该 renderer。
    ///
    /// 返回该 renderer，便于宿主进行自身的清理；过期或重复的销毁返回 `None` 且不做任何改变。
    pub fn destroy_renderer(&self, handle: Handle) -> Option<Arc<NativeRenderer>> {
        let renderer = self.registry.destroy(handle)?;
        renderer.shutdown();
        Some(renderer)
    }

    /// ### English
    /// Resolves `handle` to its live renderer.
    ///
    /// ### 中文
    /// 把 `handle` 解析为存活的 renderer。
    pub fn renderer(&self, handle: Handle) -> Option<Arc<NativeRenderer>> {
        self.registry.resolve(handle)
    }

    /// ### English
    /// Replaces the destination textures of a renderer. Returns `false` for a stale handle.
    ///
    /// ### 中文
    /// 替换 renderer 的目标纹理。句柄过期时返回 `false`。
    pub fn set_destinations(&self, handle: Handle, destinations: Vec<TextureDesc>) -> bool {
        let Some(renderer) = self.registry.resolve(handle) else {
            return false;
        };
        renderer.set_destinations(destinations);
        true
    }

    /// ### English
    /// Removes a renderer's destinations (it stops taking part in ticks and drops its pending
    /// frame). Returns `false` for a stale handle.
    ///
    /// ### 中文
    /// 移除 renderer 的目标（其不再参与 tick，并丢弃待处理帧）。句柄过期时返回 `false`。
    pub fn clear_destinations(&self, handle: Handle) -> bool {
        let Some(renderer) = self.registry.resolve(handle) else {
            return false;
        };
        renderer.clear_destinations();
        true
    }

    /// ### English
    /// Producer entry point: may be called from any thread at any time.
    ///
    /// Deposits the frame (latest wins) and marks the renderer dirty. A stale handle is a silent
    /// no-op; only invalid frames and allocation failures are reported.
    ///
    /// ### 中文
    /// 生产者入口：可在任意线程、任意时刻调用。
    ///
    /// 投递帧（最新帧优先）并把 renderer 标记为 dirty。句柄过期时静默忽略；只报告非法帧与分配失败。
    pub fn on_frame_available(
        &self,
        handle: Handle,
        frame: &RawI420Frame<'_>,
    ) -> Result<(), RuntimeError> {
        let Some(renderer) = self.registry.resolve(handle) else {
            return Ok(());
        };
        renderer.deposit(frame)?;
        drop(renderer);

        if self.registry.contains(handle) {
            self.scheduler.mark_dirty(handle);
        }
        Ok(())
    }

    /// ### English
    /// Installs the upload backend (graphics device initialized). Replaces any previous one.
    ///
    /// Must not be called from inside `RenderDispatcher::upload`.
    ///
    /// ### 中文
    /// 安装上传后端（图形设备已初始化）。会替换之前的后端。
    ///
    /// 不得在 `RenderDispatcher::upload` 内部调用。
    pub fn install_dispatcher(&self, dispatcher: Box<dyn RenderDispatcher>) {
        tracing::debug!("render dispatcher installed");
        *self.dispatcher.lock() = Some(dispatcher);
    }

    /// ### English
    /// Removes the upload backend (graphics device shut down). Ticks become no-ops until a new
    /// dispatcher is installed.
    ///
    /// ### 中文
    /// 移除上传后端（图形设备已关闭）。在安装新的分发器之前 tick 为空操作。
    pub fn remove_dispatcher(&self) -> Option<Box<dyn RenderDispatcher>> {
        let removed = self.dispatcher.lock().take();
        if removed.is_some() {
            tracing::debug!("render dispatcher removed");
        }
        removed
    }

    pub fn has_dispatcher(&self) -> bool {
        self.dispatcher.lock().is_some()
    }

    /// ### English
    /// Runs one render tick. Call exactly once per external frame from the render thread.
    ///
    /// Without a dispatcher the dirty set is left untouched. Overlapping calls are detected and
    /// ignored. Device calls (`install_dispatcher`, `remove_dispatcher`, `has_dispatcher`) from
    /// other threads only delay a tick, they never cause it to be skipped.
    ///
    /// ### 中文
    /// 执行一次渲染 tick。每个外部帧在渲染线程上调用一次。
    ///
    /// 没有分发器时 dirty 集合保持不变。检测到重叠调用时直接忽略。其他线程上的设备调用
    /// （`install_dispatcher`、`remove_dispatcher`、`has_dispatcher`）只会推迟 tick，不会导致其被跳过。
    pub fn run_tick(&self) -> TickReport {
        if self
            .ticking
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            tracing::warn!("run_tick called while another tick is running; ignored");
            return TickReport::default();
        }
        let _guard = TickGuard(&self.ticking);

        let mut slot = self.dispatcher.lock();
        let Some(dispatcher) = slot.as_mut() else {
            return TickReport::default();
        };

        let report = self
            .scheduler
            .dispatch_tick(&self.registry, dispatcher.as_mut());
        if report.drained > 0 {
            tracing::trace!(?report, "render tick");
        }
        report
    }

    /// ### English
    /// Number of live renderers.
    ///
    /// ### 中文
    /// 存活 renderer 数量。
    pub fn renderer_count(&self) -> usize {
        self.registry.len()
    }

    /// ### English
    /// Number of renderers marked dirty and waiting for the next tick.
    ///
    /// ### 中文
    /// 已标记为 dirty、等待下一次 tick 的 renderer 数量。
    pub fn dirty_count(&self) -> usize {
        self.scheduler.pending_len()
    }

    pub fn registry(&self) -> &HandleRegistry<NativeRenderer> {
        &self.registry
    }

    /// ### English
    /// Removes the dispatcher and destroys every remaining renderer. All outstanding handles
    /// become stale.
    ///
    /// ### 中文
    /// 移除分发器并销毁所有剩余 renderer。所有未归还的句柄都将失效。
    pub fn shutdown(&self) {
        self.remove_dispatcher();
        let renderers = self.registry.drain_live();
        if !renderers.is_empty() {
            tracing::debug!(count = renderers.len(), "destroying remaining renderers");
        }
        for renderer in renderers {
            renderer.shutdown();
        }
        drop(self.scheduler.drain());
    }
}

impl Default for NativeRenderingRuntime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Drop for NativeRenderingRuntime {
    /// ### English
    /// Ensures remaining renderers are torn down when the runtime is dropped.
    ///
    /// ### 中文
    /// 确保运行时 drop 时清理剩余的 renderer。
    fn drop(&mut self) {
        self.shutdown();
    }
}
