//! ### English
//! Generational renderer handle shared with the embedder through the C ABI.
//!
//! ### 中文
//! 通过 C ABI 与宿主共享的带代数（generation）的 renderer 句柄。

use std::fmt;

/// ### English
/// Bit shift of the generation inside the raw `u64` form.
///
/// ### 中文
/// generation 在原始 `u64` 形式中的位移。
const GENERATION_SHIFT: u32 = 32;

/// ### English
/// Opaque identifier of a registered renderer: a slot index plus the slot's generation at the time
/// the handle was issued.
///
/// The handle carries no address; it is only meaningful to the registry that issued it. A handle
/// is valid iff its generation equals the registry's current generation for its slot, so a handle
/// kept across `destroy` never matches the next object that reuses the slot.
///
/// Generation `0` is reserved: [`Handle::NULL`] (raw value `0`) never names a live object.
///
/// ### 中文
/// 已注册 renderer 的不透明标识：槽位下标 + 句柄签发时该槽位的 generation。
///
/// 句柄不包含任何地址，只对签发它的注册表有意义。当且仅当句柄的 generation 等于注册表中该槽位的
/// 当前 generation 时句柄有效，因此在 `destroy` 之后保留的旧句柄永远不会匹配复用该槽位的新对象。
///
/// generation `0` 被保留：[`Handle::NULL`]（原始值 `0`）永远不指向存活对象。
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Handle {
    slot: u32,
    generation: u32,
}

impl Handle {
    /// ### English
    /// The null handle (returned across the ABI on capacity exhaustion).
    ///
    /// ### 中文
    /// 空句柄（容量耗尽时通过 ABI 返回）。
    pub const NULL: Handle = Handle {
        slot: 0,
        generation: 0,
    };

    #[inline]
    pub(crate) const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// ### English
    /// Slot index inside the registry table.
    ///
    /// ### 中文
    /// 注册表中的槽位下标。
    #[inline]
    pub const fn slot(self) -> u32 {
        self.slot
    }

    /// ### English
    /// Generation of the slot when this handle was issued.
    ///
    /// ### 中文
    /// 签发该句柄时槽位的 generation。
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// ### English
    /// Returns `true` for the null handle (generation `0`).
    ///
    /// ### 中文
    /// 若为空句柄（generation 为 `0`）则返回 `true`。
    #[inline]
    pub const fn is_null(self) -> bool {
        self.generation == 0
    }

    /// ### English
    /// Packs the handle into its ABI form: generation in the high 32 bits, slot in the low 32 bits.
    ///
    /// ### 中文
    /// 打包为 ABI 形式：高 32 位为 generation，低 32 位为槽位。
    #[inline]
    pub const fn to_raw(self) -> u64 {
        ((self.generation as u64) << GENERATION_SHIFT) | self.slot as u64
    }

    /// ### English
    /// Unpacks an ABI value. Any value with a zero generation becomes [`Handle::NULL`].
    ///
    /// ### 中文
    /// 解包 ABI 值。generation 为 0 的任何值都会变为 [`Handle::NULL`]。
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        let generation = (raw >> GENERATION_SHIFT) as u32;
        if generation == 0 {
            return Self::NULL;
        }
        Self {
            slot: raw as u32,
            generation,
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("Handle(null)");
        }
        write!(f, "Handle({}v{})", self.slot, self.generation)
    }
}

/// ### English
/// Next generation for a slot being (re)issued; skips `0` on wrap-around.
///
/// ### 中文
/// 槽位被（再次）签发时的下一个 generation；回绕时跳过 `0`。
#[inline]
pub(crate) const fn next_generation(current: u32) -> u32 {
    match current.wrapping_add(1) {
        0 => 1,
        next => next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_layout_is_generation_high_slot_low() {
        let handle = Handle::new(7, 3);
        assert_eq!(handle.to_raw(), (3u64 << 32) | 7);
        assert_eq!(Handle::from_raw(handle.to_raw()), handle);
    }

    #[test]
    fn zero_generation_decodes_to_null() {
        assert!(Handle::from_raw(0).is_null());
        assert_eq!(Handle::from_raw(42), Handle::NULL);
        assert_eq!(Handle::NULL.to_raw(), 0);
    }

    #[test]
    fn generation_wrap_skips_zero() {
        assert_eq!(next_generation(0), 1);
        assert_eq!(next_generation(41), 42);
        assert_eq!(next_generation(u32::MAX), 1);
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Handle::new(2, 9)), "Handle(2v9)");
        assert_eq!(format!("{:?}", Handle::NULL), "Handle(null)");
    }
}
