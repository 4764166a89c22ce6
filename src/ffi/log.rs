use crate::engine::logging::{self, HostLogFn, HostLogFunctions};

#[unsafe(no_mangle)]
/// ### English
/// Registers the host log callbacks (any may be NULL). Events at `info` and below go to `debug`.
///
/// The filter defaults to `info` and can be changed with the `XIAN_NATIVE_RENDERER_LOG`
/// environment variable before the first call. Returns `false` if a different global `tracing`
/// subscriber was already installed in this process.
///
/// ### 中文
/// 注册宿主日志回调（均可为 NULL）。`info` 及以下级别的事件发送给 `debug`。
///
/// 过滤级别默认 `info`，可在首次调用前通过环境变量 `XIAN_NATIVE_RENDERER_LOG` 修改。
/// 若进程中已安装其他全局 `tracing` 订阅器则返回 `false`。
pub extern "C" fn xian_native_renderer_set_logging_functions(
    debug: Option<HostLogFn>,
    error: Option<HostLogFn>,
    warning: Option<HostLogFn>,
) -> bool {
    logging::install_host_logging(HostLogFunctions {
        debug,
        error,
        warning,
    })
}
