use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, unbounded};
use xian_native_renderer::engine::{
    Handle, I420Frame, NativeRenderingRuntime, OwnerContext, RawI420Frame, RuntimeConfig,
    TextureDesc, TickReport, UploadError,
};

const WIDTH: u32 = 8;
const HEIGHT: u32 = 4;

/// Backing storage for a synthetic frame whose bytes are all `fill`.
struct Planes {
    y: Vec<u8>,
    u: Vec<u8>,
    v: Vec<u8>,
}

impl Planes {
    fn filled(fill: u8) -> Self {
        let chroma = (WIDTH / 2 * HEIGHT / 2) as usize;
        Self {
            y: vec![fill; (WIDTH * HEIGHT) as usize],
            u: vec![fill; chroma],
            v: vec![fill; chroma],
        }
    }

    fn raw(&self) -> RawI420Frame<'_> {
        RawI420Frame {
            width: WIDTH,
            height: HEIGHT,
            ystride: WIDTH,
            ustride: WIDTH / 2,
            vstride: WIDTH / 2,
            y: &self.y,
            u: &self.u,
            v: &self.v,
        }
    }
}

/// One upload observed by the recording dispatcher: first texture id and the Y fill byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Upload {
    texture: usize,
    fill: u8,
}

fn install_recorder(runtime: &NativeRenderingRuntime) -> Receiver<Upload> {
    let (tx, rx) = unbounded();
    runtime.install_dispatcher(Box::new(
        move |destinations: &[TextureDesc], frame: &I420Frame| -> Result<(), UploadError> {
            let fill = frame.plane(0).and_then(|y| y.first().copied()).unwrap_or_default();
            let _ = tx.send(Upload {
                texture: destinations[0].texture,
                fill,
            });
            Ok(())
        },
    ));
    rx
}

fn textures(base: usize) -> Vec<TextureDesc> {
    vec![
        TextureDesc::new(base, WIDTH, HEIGHT),
        TextureDesc::new(base + 1, WIDTH / 2, HEIGHT / 2),
        TextureDesc::new(base + 2, WIDTH / 2, HEIGHT / 2),
    ]
}

fn active_renderer(runtime: &NativeRenderingRuntime, base: usize) -> Handle {
    let handle = runtime.create_renderer(OwnerContext(base)).unwrap();
    assert!(runtime.set_destinations(handle, textures(base)));
    handle
}

#[test]
fn tick_uploads_each_dirty_renderer_once_and_skips_destroyed() {
    let runtime = NativeRenderingRuntime::default();
    let uploads = install_recorder(&runtime);

    let a = active_renderer(&runtime, 100);
    let b = active_renderer(&runtime, 200);
    let c = active_renderer(&runtime, 300);
    for (handle, fill) in [(a, 1), (b, 2), (c, 3)] {
        runtime.on_frame_available(handle, &Planes::filled(fill).raw()).unwrap();
    }
    runtime.destroy_renderer(b);

    let report = runtime.run_tick();
    assert_eq!(
        report,
        TickReport {
            drained: 3,
            uploaded: 2,
            stale: 1,
            ..TickReport::default()
        }
    );

    let mut seen: Vec<Upload> = uploads.try_iter().collect();
    seen.sort_by_key(|upload| upload.texture);
    assert_eq!(
        seen,
        vec![
            Upload { texture: 100, fill: 1 },
            Upload { texture: 300, fill: 3 },
        ]
    );

    assert_eq!(runtime.run_tick(), TickReport::default());
    assert!(uploads.try_recv().is_err());
}

#[test]
fn only_the_latest_frame_is_uploaded() {
    let runtime = NativeRenderingRuntime::default();
    let uploads = install_recorder(&runtime);
    let handle = active_renderer(&runtime, 10);

    for fill in 1..=5 {
        runtime.on_frame_available(handle, &Planes::filled(fill).raw()).unwrap();
    }
    assert_eq!(runtime.dirty_count(), 1);

    assert_eq!(runtime.run_tick().uploaded, 1);
    assert_eq!(uploads.try_recv().unwrap(), Upload { texture: 10, fill: 5 });
    assert!(uploads.try_recv().is_err());
}

#[test]
fn steady_state_reuses_frame_buffers() {
    let runtime = NativeRenderingRuntime::default();
    let _uploads = install_recorder(&runtime);
    let handle = active_renderer(&runtime, 10);
    let planes = Planes::filled(9);

    for _ in 0..100 {
        runtime.on_frame_available(handle, &planes.raw()).unwrap();
        runtime.on_frame_available(handle, &planes.raw()).unwrap();
        assert_eq!(runtime.run_tick().uploaded, 1);
    }

    let renderer = runtime.renderer(handle).unwrap();
    assert!(renderer.frame_allocations() <= 2);
    assert!(renderer.pooled_frames() <= RuntimeConfig::default().frame_pool_limit);
}

#[test]
fn renderer_without_destinations_is_skipped() {
    let runtime = NativeRenderingRuntime::default();
    let uploads = install_recorder(&runtime);
    let handle = runtime.create_renderer(OwnerContext(1)).unwrap();

    runtime.on_frame_available(handle, &Planes::filled(4).raw()).unwrap();
    let report = runtime.run_tick();
    assert_eq!((report.drained, report.skipped, report.uploaded), (1, 1, 0));
    assert!(uploads.try_recv().is_err());

    runtime.set_destinations(handle, textures(50));
    runtime.on_frame_available(handle, &Planes::filled(6).raw()).unwrap();
    assert_eq!(runtime.run_tick().uploaded, 1);
    assert_eq!(uploads.try_recv().unwrap(), Upload { texture: 50, fill: 6 });
}

#[test]
fn device_shutdown_keeps_latest_frame_until_next_initialize() {
    let runtime = NativeRenderingRuntime::default();
    let handle = active_renderer(&runtime, 10);

    runtime.on_frame_available(handle, &Planes::filled(1).raw()).unwrap();
    runtime.on_frame_available(handle, &Planes::filled(2).raw()).unwrap();
    assert_eq!(runtime.run_tick(), TickReport::default());

    let uploads = install_recorder(&runtime);
    assert_eq!(runtime.run_tick().uploaded, 1);
    assert_eq!(uploads.try_recv().unwrap(), Upload { texture: 10, fill: 2 });

    runtime.remove_dispatcher();
    runtime.on_frame_available(handle, &Planes::filled(3).raw()).unwrap();
    assert_eq!(runtime.run_tick(), TickReport::default());
    assert_eq!(runtime.dirty_count(), 1);
}

#[test]
fn destroy_is_idempotent_and_slots_are_reused_with_new_generation() {
    let runtime = NativeRenderingRuntime::new(RuntimeConfig {
        max_renderers: 1,
        ..RuntimeConfig::default()
    });
    let first = runtime.create_renderer(OwnerContext(1)).unwrap();
    assert!(runtime.destroy_renderer(first).is_some());
    assert!(runtime.destroy_renderer(first).is_none());

    let second = runtime.create_renderer(OwnerContext(2)).unwrap();
    assert_eq!(second.slot(), first.slot());
    assert_ne!(second, first);
    assert!(runtime.renderer(first).is_none());
    assert_eq!(runtime.renderer(second).unwrap().owner(), OwnerContext(2));
}

#[test]
fn concurrent_producers_deliver_in_order_per_renderer() {
    const PRODUCERS: usize = 4;
    const FRAMES: u8 = 200;

    let runtime = NativeRenderingRuntime::default();
    let uploads = install_recorder(&runtime);
    let handles: Vec<Handle> = (0..PRODUCERS)
        .map(|i| active_renderer(&runtime, (i + 1) * 1000))
        .collect();
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        let producers: Vec<_> = handles
            .iter()
            .map(|&handle| {
                let runtime = &runtime;
                scope.spawn(move || {
                    for fill in 1..=FRAMES {
                        runtime
                            .on_frame_available(handle, &Planes::filled(fill).raw())
                            .unwrap();
                    }
                })
            })
            .collect();

        let runtime = &runtime;
        let done = &done;
        scope.spawn(move || {
            while !done.load(Ordering::Acquire) {
                runtime.run_tick();
                thread::yield_now();
            }
        });

        for producer in producers {
            producer.join().unwrap();
        }
        done.store(true, Ordering::Release);
    });
    runtime.run_tick();

    let seen: Vec<Upload> = uploads.try_iter().collect();
    for handle in &handles {
        let base = runtime.renderer(*handle).unwrap().destinations()[0].texture;
        let fills: Vec<u8> = seen
            .iter()
            .filter(|upload| upload.texture == base)
            .map(|upload| upload.fill)
            .collect();
        assert!(fills.windows(2).all(|pair| pair[0] < pair[1]), "{fills:?}");
        assert_eq!(fills.last(), Some(&FRAMES));
    }
}

#[test]
fn producer_racing_destroy_never_panics() {
    let runtime = Arc::new(NativeRenderingRuntime::default());
    let _uploads = install_recorder(&runtime);

    for round in 0..50 {
        let handle = active_renderer(&runtime, round * 10);
        let producer = {
            let runtime = Arc::clone(&runtime);
            thread::spawn(move || {
                let planes = Planes::filled(1);
                for _ in 0..100 {
                    runtime.on_frame_available(handle, &planes.raw()).unwrap();
                }
            })
        };
        runtime.destroy_renderer(handle);
        runtime.run_tick();
        producer.join().unwrap();
    }

    runtime.run_tick();
    assert_eq!(runtime.renderer_count(), 0);
    assert_eq!(runtime.dirty_count(), 0);
}
