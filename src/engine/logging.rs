//! ### English
//! Host log bridge: forwards `tracing` events to C callbacks supplied by the embedder.
//!
//! The subscriber (`EnvFilter` + `HostLogLayer`) is installed globally the first time the host
//! registers callbacks. The filter reads `XIAN_NATIVE_RENDERER_LOG` and defaults to `info`.
//! Registering again only swaps the callbacks.
//!
//! ### 中文
//! 宿主日志桥：把 `tracing` 事件转发给宿主提供的 C 回调。
//!
//! 宿主第一次注册回调时全局安装订阅器（`EnvFilter` + `HostLogLayer`）。过滤器读取
//! `XIAN_NATIVE_RENDERER_LOG`，默认 `info`。再次注册只会替换回调。

use std::ffi::{CString, c_char};
use std::fmt::{self, Write as _};
use std::sync::Once;

use parking_lot::RwLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// ### English
/// Environment variable holding the `EnvFilter` directives.
///
/// ### 中文
/// 存放 `EnvFilter` 指令的环境变量。
pub const LOG_FILTER_ENV: &str = "XIAN_NATIVE_RENDERER_LOG";

const DEFAULT_FILTER: &str = "info";

/// ### English
/// Host log sink. Receives one NUL-terminated UTF-8 line, valid only for the duration of the call.
///
/// ### 中文
/// 宿主日志回调。接收一行以 NUL 结尾的 UTF-8 文本，仅在本次调用期间有效。
pub type HostLogFn = unsafe extern "C" fn(message: *const c_char);

/// ### English
/// Callbacks per severity. `debug` also receives `info` and `trace` events.
///
/// ### 中文
/// 按严重级别划分的回调。`debug` 同时接收 `info` 与 `trace` 事件。
#[derive(Clone, Copy, Debug, Default)]
pub struct HostLogFunctions {
    pub debug: Option<HostLogFn>,
    pub error: Option<HostLogFn>,
    pub warning: Option<HostLogFn>,
}

impl HostLogFunctions {
    fn sink_for(&self, level: Level) -> Option<HostLogFn> {
        match level {
            Level::ERROR => self.error,
            Level::WARN => self.warning,
            _ => self.debug,
        }
    }

    fn is_empty(&self) -> bool {
        self.debug.is_none() && self.error.is_none() && self.warning.is_none()
    }
}

static HOST_LOG_FUNCTIONS: RwLock<Option<HostLogFunctions>> = parking_lot::const_rwlock(None);
static SUBSCRIBER_INIT: Once = Once::new();

/// ### English
/// Registers the host callbacks and installs the global subscriber on first use.
///
/// Passing all-`None` functions detaches the host; events are then discarded. Returns `false` if
/// another global subscriber was already installed by someone else (callbacks are stored anyway
/// but only fire if that subscriber includes a `HostLogLayer`).
///
/// ### 中文
/// 注册宿主回调，并在首次使用时安装全局订阅器。
///
/// 传入全为 `None` 的回调表示与宿主解绑，此后事件被丢弃。若他人已安装全局订阅器则返回 `false`
/// （回调仍会保存，但仅当该订阅器包含 `HostLogLayer` 时才会触发）。
pub fn install_host_logging(functions: HostLogFunctions) -> bool {
    *HOST_LOG_FUNCTIONS.write() = (!functions.is_empty()).then_some(functions);

    let mut installed = true;
    SUBSCRIBER_INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        installed = tracing_subscriber::registry()
            .with(filter)
            .with(HostLogLayer)
            .try_init()
            .is_ok();
    });
    installed
}

/// ### English
/// `tracing_subscriber` layer writing each event as `"[target] message key=value ..."` to the
/// registered host callback for its level.
///
/// ### 中文
/// `tracing_subscriber` layer：把每个事件格式化为 `"[target] message key=value ..."`，
/// 写入对应级别的宿主回调。
#[derive(Clone, Copy, Debug, Default)]
pub struct HostLogLayer;

impl<S: Subscriber> Layer<S> for HostLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let Some(functions) = *HOST_LOG_FUNCTIONS.read() else {
            return;
        };
        let metadata = event.metadata();
        let Some(sink) = functions.sink_for(*metadata.level()) else {
            return;
        };

        let mut line = EventLine::default();
        event.record(&mut line);
        let text = line.finish(metadata.target());

        // Interior NULs would truncate the C string.
        let Ok(text) = CString::new(text.replace('\0', " ")) else {
            return;
        };
        unsafe { sink(text.as_ptr()) };
    }
}

#[derive(Default)]
struct EventLine {
    message: String,
    fields: String,
}

impl EventLine {
    fn finish(self, target: &str) -> String {
        format!("[{target}] {}{}", self.message, self.fields)
    }
}

impl Visit for EventLine {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use parking_lot::Mutex;

    use super::*;

    static CAPTURED: Mutex<Vec<(char, String)>> = parking_lot::const_mutex(Vec::new());

    fn capture(kind: char, message: *const c_char) {
        let text = unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned();
        CAPTURED.lock().push((kind, text));
    }

    unsafe extern "C" fn debug_sink(message: *const c_char) {
        capture('d', message);
    }

    unsafe extern "C" fn warning_sink(message: *const c_char) {
        capture('w', message);
    }

    #[test]
    fn events_are_routed_by_level() {
        *HOST_LOG_FUNCTIONS.write() = Some(HostLogFunctions {
            debug: Some(debug_sink),
            error: None,
            warning: Some(warning_sink),
        });

        let subscriber = tracing_subscriber::registry().with(HostLogLayer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "renderer", plane = 1, "upload failed");
            tracing::debug!(target: "renderer", "created");
            tracing::error!(target: "renderer", "dropped");
        });
        *HOST_LOG_FUNCTIONS.write() = None;

        let captured = CAPTURED.lock().clone();
        assert_eq!(
            captured,
            vec![
                ('w', "[renderer] upload failed plane=1".to_owned()),
                ('d', "[renderer] created".to_owned()),
            ]
        );
    }
}
