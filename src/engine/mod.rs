/// ### English
/// Engine internal modules (handle registry, frame hand-off, tick scheduling, logging).
///
/// ### 中文
/// 引擎内部模块（句柄注册表、帧交接、tick 调度、日志）。
pub mod config;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod handle;
pub mod logging;
pub mod registry;
pub mod renderer;
pub mod runtime;
pub mod scheduler;
pub(crate) mod u32_hash;

pub use config::RuntimeConfig;
pub use dispatch::{RenderDispatcher, TextureDesc, VideoKind};
pub use error::{FrameError, RegistryError, RuntimeError, UploadError};
pub use frame::{I420Frame, RawI420Frame};
pub use handle::Handle;
pub use registry::HandleRegistry;
pub use renderer::{NativeRenderer, OwnerContext};
pub use runtime::NativeRenderingRuntime;
pub use scheduler::{TickReport, UpdateScheduler};
