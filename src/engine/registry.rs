//! ### English
//! Generational handle registry: maps opaque [`Handle`]s to shared `Arc<T>` objects.
//!
//! One coarse table lock guards the slot array, the generations and the free list. It ranks above
//! every per-renderer lock: callers must never hold a renderer lock while calling into the registry.
//!
//! ### 中文
//! 带代数的句柄注册表：把不透明的 [`Handle`] 映射到共享的 `Arc<T>` 对象。
//!
//! 一把粗粒度表锁保护槽位数组、generation 与空闲链表。它的层级高于所有 renderer 锁：
//! 调用方在持有 renderer 锁时绝不能再调用注册表。

use std::sync::Arc;

use parking_lot::Mutex;

use super::error::RegistryError;
use super::handle::{Handle, next_generation};

/// ### English
/// One table slot. A free slot has no object and keeps the generation it last issued.
///
/// ### 中文
/// 单个表槽位。空闲槽位没有对象，并保留其最后签发的 generation。
struct RegistryEntry<T> {
    object: Option<Arc<T>>,
    generation: u32,
}

/// ### English
/// State guarded by the table lock.
///
/// ### 中文
/// 由表锁保护的状态。
struct RegistryTable<T> {
    /// ### English
    /// Slot array indexed by `Handle::slot`; never shrinks.
    ///
    /// ### 中文
    /// 以 `Handle::slot` 为下标的槽位数组；从不收缩。
    entries: Vec<RegistryEntry<T>>,
    /// ### English
    /// Free slots, reused LIFO.
    ///
    /// ### 中文
    /// 空闲槽位，按 LIFO 复用。
    free_slots: Vec<u32>,
    /// ### English
    /// Number of occupied slots.
    ///
    /// ### 中文
    /// 已占用的槽位数量。
    live: usize,
}

impl<T> RegistryTable<T> {
    #[inline]
    fn lookup(&self, handle: Handle) -> Option<Arc<T>> {
        if handle.is_null() {
            return None;
        }
        let entry = self.entries.get(handle.slot() as usize)?;
        if entry.generation != handle.generation() {
            return None;
        }
        entry.object.clone()
    }
}

/// ### English
/// Table of live objects addressed by generational handles.
///
/// - `create` reuses a free slot (LIFO) or appends one, bumping the slot generation.
/// - `destroy` clears the slot but keeps its generation, so old handles stay invalid forever.
/// - Stale or null handles are never errors: lookups return `None`, destroys are no-ops.
///
/// ### 中文
/// 通过带代数句柄寻址的存活对象表。
///
/// - `create` 复用空闲槽位（LIFO）或追加新槽位，并递增该槽位 generation。
/// - `destroy` 清空槽位但保留其 generation，使旧句柄永久失效。
/// - 过期句柄或空句柄从不视为错误：查找返回 `None`，销毁为空操作。
pub struct HandleRegistry<T> {
    table: Mutex<RegistryTable<T>>,
    max_slots: u32,
}

impl<T> HandleRegistry<T> {
    /// ### English
    /// Creates an empty registry holding at most `max_slots` live objects (minimum 1).
    ///
    /// ### 中文
    /// 创建一个最多容纳 `max_slots` 个存活对象的空注册表（最小为 1）。
    pub fn with_capacity(max_slots: u32) -> Self {
        Self {
            table: Mutex::new(RegistryTable {
                entries: Vec::new(),
                free_slots: Vec::new(),
                live: 0,
            }),
            max_slots: max_slots.max(1),
        }
    }

    /// ### English
    /// Registers `object` and returns a freshly valid handle.
    ///
    /// ### 中文
    /// 注册 `object` 并返回一个新的有效句柄。
    pub fn create(&self, object: Arc<T>) -> Result<Handle, RegistryError> {
        self.create_with(move |_| object).map(|(handle, _)| handle)
    }

    /// ### English
    /// Registers the object built by `build`, which receives the handle it is being registered
    /// under (so the object can identify itself in callbacks).
    ///
    /// `build` runs under the table lock and must not call back into this registry.
    ///
    /// ### 中文
    /// 注册由 `build` 构造的对象；`build` 会收到该对象即将使用的句柄（便于对象在回调中自我标识）。
    ///
    /// `build` 在表锁内执行，不得回调本注册表。
    pub fn create_with<F>(&self, build: F) -> Result<(Handle, Arc<T>), RegistryError>
    where
        F: FnOnce(Handle) -> Arc<T>,
    {
        let mut table = self.table.lock();

        let slot = match table.free_slots.pop() {
            Some(slot) => slot,
            None => {
                if table.entries.len() >= self.max_slots as usize {
                    return Err(RegistryError::CapacityExceeded {
                        max_slots: self.max_slots,
                    });
                }
                table.entries.push(RegistryEntry {
                    object: None,
                    generation: 0,
                });
                (table.entries.len() - 1) as u32
            }
        };

        let entry = &mut table.entries[slot as usize];
        entry.generation = next_generation(entry.generation);
        let handle = Handle::new(slot, entry.generation);
        let object = build(handle);
        entry.object = Some(object.clone());
        table.live += 1;

        Ok((handle, object))
    }

    /// ### English
    /// Unregisters `handle` and returns the object so the caller can run teardown outside the
    /// table lock. Stale, null or already-destroyed handles return `None` (double destroy is fine).
    ///
    /// ### 中文
    /// 注销 `handle` 并返回对象，调用方可在表锁之外执行清理。
    /// 过期、空或已销毁的句柄返回 `None`（允许重复销毁）。
    pub fn destroy(&self, handle: Handle) -> Option<Arc<T>> {
        let mut table = self.table.lock();
        let object = table.lookup(handle)?;

        table.entries[handle.slot() as usize].object = None;
        table.free_slots.push(handle.slot());
        table.live -= 1;
        Some(object)
    }

    /// ### English
    /// Returns the live object for `handle`, or `None` if the handle is stale.
    ///
    /// ### 中文
    /// 返回 `handle` 对应的存活对象；句柄过期时返回 `None`。
    pub fn resolve(&self, handle: Handle) -> Option<Arc<T>> {
        self.table.lock().lookup(handle)
    }

    /// ### English
    /// Resolves a batch under a single lock acquisition. The result is sparse: same length and
    /// order as `handles`, with `None` in place of every stale entry.
    ///
    /// ### 中文
    /// 在一次加锁内批量解析。结果是稀疏的：长度与顺序和 `handles` 相同，过期项对应位置为 `None`。
    pub fn resolve_many(&self, handles: &[Handle]) -> Vec<Option<Arc<T>>> {
        let table = self.table.lock();
        handles.iter().map(|&handle| table.lookup(handle)).collect()
    }

    /// ### English
    /// Returns whether `handle` currently names a live object.
    ///
    /// ### 中文
    /// 返回 `handle` 当前是否指向存活对象。
    pub fn contains(&self, handle: Handle) -> bool {
        self.table.lock().lookup(handle).is_some()
    }

    /// ### English
    /// Number of live objects.
    ///
    /// ### 中文
    /// 存活对象数量。
    pub fn len(&self) -> usize {
        self.table.lock().live
    }

    /// ### English
    /// Returns `true` if no object is live.
    ///
    /// ### 中文
    /// 没有存活对象时返回 `true`。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// ### English
    /// Number of slots waiting on the free list.
    ///
    /// ### 中文
    /// 空闲链表中等待复用的槽位数量。
    pub fn free_len(&self) -> usize {
        self.table.lock().free_slots.len()
    }

    /// ### English
    /// Number of slots ever allocated (live + free).
    ///
    /// ### 中文
    /// 曾分配过的槽位总数（存活 + 空闲）。
    pub fn slot_count(&self) -> usize {
        self.table.lock().entries.len()
    }

    /// ### English
    /// Upper bound on live objects (and on allocated slots).
    ///
    /// ### 中文
    /// 存活对象（以及已分配槽位）的上限。
    pub fn max_slots(&self) -> u32 {
        self.max_slots
    }

    /// ### English
    /// Removes every live object and returns them for teardown (runtime shutdown).
    /// Generations are kept, so all outstanding handles become stale.
    ///
    /// ### 中文
    /// 移除所有存活对象并返回以便清理（运行时关闭时使用）。
    /// generation 会保留，因此所有未归还的句柄都将失效。
    pub fn drain_live(&self) -> Vec<Arc<T>> {
        let mut table = self.table.lock();
        let mut drained = Vec::with_capacity(table.live);
        let RegistryTable {
            entries,
            free_slots,
            live,
        } = &mut *table;
        for (slot, entry) in entries.iter_mut().enumerate() {
            if let Some(object) = entry.object.take() {
                free_slots.push(slot as u32);
                drained.push(object);
            }
        }
        *live = 0;
        drained
    }
}
