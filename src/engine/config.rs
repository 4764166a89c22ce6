//! ### English
//! Runtime configuration (capacity and frame pool sizing).
//!
//! ### 中文
//! 运行时配置（容量与帧池大小）。

/// ### English
/// Default maximum number of live renderers (the 16-bit slot space of the legacy handle format).
///
/// ### 中文
/// 默认的最大存活 renderer 数量（旧句柄格式中 16 位槽位空间）。
pub const DEFAULT_MAX_RENDERERS: u32 = 0x10000;

/// ### English
/// Default number of retired frames each renderer keeps for reuse.
///
/// ### 中文
/// 每个 renderer 默认保留以供复用的已退役帧数量。
pub const DEFAULT_FRAME_POOL_LIMIT: usize = 2;

/// ### English
/// Configuration for one `NativeRenderingRuntime`.
///
/// ### 中文
/// 单个 `NativeRenderingRuntime` 的配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// ### English
    /// Hard cap on live renderers; `create` fails once reached and no slot is free.
    ///
    /// ### 中文
    /// 存活 renderer 的硬上限；达到上限且无空闲槽位时 `create` 失败。
    pub max_renderers: u32,
    /// ### English
    /// Retired frames kept per renderer; extra frames are freed on recycle.
    ///
    /// ### 中文
    /// 每个 renderer 保留的已退役帧数量；超出部分在回收时释放。
    pub frame_pool_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_renderers: DEFAULT_MAX_RENDERERS,
            frame_pool_limit: DEFAULT_FRAME_POOL_LIMIT,
        }
    }
}

impl RuntimeConfig {
    /// ### English
    /// Builds a config from ABI integers where `0` means "use the default".
    ///
    /// ### 中文
    /// 由 ABI 整数构建配置，`0` 表示“使用默认值”。
    pub fn from_abi(max_renderers: u32, frame_pool_limit: u32) -> Self {
        let defaults = Self::default();
        Self {
            max_renderers: if max_renderers == 0 {
                defaults.max_renderers
            } else {
                max_renderers
            },
            frame_pool_limit: if frame_pool_limit == 0 {
                defaults.frame_pool_limit
            } else {
                frame_pool_limit as usize
            },
        }
    }

    /// ### English
    /// Clamps every field to its valid range.
    ///
    /// ### 中文
    /// 将各字段限制在合法范围内。
    pub fn normalized(self) -> Self {
        Self {
            max_renderers: self.max_renderers.max(1),
            frame_pool_limit: self.frame_pool_limit.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_abi_values_fall_back_to_defaults() {
        assert_eq!(RuntimeConfig::from_abi(0, 0), RuntimeConfig::default());
        let config = RuntimeConfig::from_abi(16, 4);
        assert_eq!(config.max_renderers, 16);
        assert_eq!(config.frame_pool_limit, 4);
    }

    #[test]
    fn normalized_clamps_to_one() {
        let config = RuntimeConfig {
            max_renderers: 0,
            frame_pool_limit: 0,
        }
        .normalized();
        assert_eq!(config.max_renderers, 1);
        assert_eq!(config.frame_pool_limit, 1);
    }
}
