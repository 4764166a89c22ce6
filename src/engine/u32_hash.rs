//! ### English
//! Fast hash map for registry slot lookups (`u32 -> V`, avoids SipHash overhead).
//!
//! ### 中文
//! 用于注册表槽位查找的快速 HashMap（`u32 -> V`，避免 SipHash 的开销）。

use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hasher};

/// ### English
/// Identity hasher for slot indices. Slots are dense small integers handed out by the registry,
/// so no mixing is needed.
///
/// ### 中文
/// 槽位下标的恒等哈希。槽位是注册表分配的稠密小整数，无需额外混淆。
#[derive(Default)]
pub(crate) struct SlotIdentityHasher(
    /// ### English
    /// Current hash state (the last written slot).
    ///
    /// ### 中文
    /// 当前哈希状态（最后写入的槽位）。
    u64,
);

impl Hasher for SlotIdentityHasher {
    fn write(&mut self, bytes: &[u8]) {
        let mut hash = 0u64;
        for chunk in bytes.chunks(8) {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            hash ^= u64::from_le_bytes(buf);
        }
        self.0 = hash;
    }

    fn write_u32(&mut self, i: u32) {
        self.0 = i as u64;
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

/// ### English
/// HashMap keyed by registry slot.
///
/// ### 中文
/// 以注册表槽位为 key 的 HashMap。
pub(crate) type SlotMap<V> = HashMap<u32, V, BuildHasherDefault<SlotIdentityHasher>>;
