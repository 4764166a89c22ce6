use super::XianNativeRendererResult;

#[unsafe(no_mangle)]
/// ### English
/// Returns the C ABI version.
///
/// ### 中文
/// 返回 C ABI 版本号。
pub extern "C" fn xian_native_renderer_abi_version() -> u32 {
    super::XIAN_NATIVE_RENDERER_ABI_VERSION
}

#[unsafe(no_mangle)]
/// ### English
/// Returns the numeric value of `XianNativeRendererResult::Success`.
/// (Panama-friendly constant getter; avoids relying on C headers.)
///
/// ### 中文
/// 返回 `XianNativeRendererResult::Success` 的数值。
/// （Panama 友好的常量获取函数；避免依赖 C 头文件。）
pub extern "C" fn xian_native_renderer_result_success() -> i32 {
    XianNativeRendererResult::Success as i32
}
