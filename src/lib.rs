/// ### English
/// `xian_native_renderer` crate root.
/// Exposes the C ABI via `ffi`; the handle registry, frame mailbox and update scheduler live
/// under `engine`.
///
/// ### 中文
/// `xian_native_renderer` 的 crate 根。
/// 通过 `ffi` 导出 C ABI；句柄注册表、帧邮箱与更新调度器位于 `engine` 模块。
pub mod engine;
pub mod ffi;
