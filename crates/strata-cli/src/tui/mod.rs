//! TUI mode: wires the sampler worker, optional HTTP workers, and the
//! render/input loop together around one shared store.

mod app;
mod input;
mod ui;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use strata_core::{
    CollectorSet, Error, MetricStore, Platform, PollingSampler, PowerMetricsSampler,
};

use crate::RunConfig;

pub fn run(platform: Platform, config: &RunConfig) -> Result<(), Error> {
    let store = Arc::new(MetricStore::new(config.buffer_size));
    let shutdown = Arc::new(AtomicBool::new(false));
    let fatal: Arc<Mutex<Option<Error>>> = Arc::new(Mutex::new(None));

    if let Some(port) = config.http_port {
        let _ = strata_server::spawn_json_server(Arc::clone(&store), config.http_host.clone(), port);
    }
    if let Some(port) = config.prometheus_port {
        let _ = strata_server::spawn_prometheus_server(
            Arc::clone(&store),
            config.http_host.clone(),
            port,
        );
    }

    let mut collectors = CollectorSet::new(platform, config.refresh_ms);
    let on_sample = {
        let store = Arc::clone(&store);
        move |sample: strata_core::Sample| {
            store.ingest(collectors.run(&sample.context));
        }
    };

    // The powermetrics child is spawned before the terminal goes raw so the
    // user can still answer the sudo prompt; its handle lets the main
    // thread unblock the reader on quit.
    let (sampler_thread, kill_handle) = match platform {
        Platform::MacOS => {
            let sampler = PowerMetricsSampler::spawn(config.refresh_ms)?;
            let handle = sampler.handle();
            let flag = Arc::clone(&shutdown);
            let fatal = Arc::clone(&fatal);
            let thread = thread::spawn(move || {
                if let Err(e) = sampler.run(&flag, on_sample) {
                    *fatal.lock().unwrap_or_else(|p| p.into_inner()) = Some(e);
                }
            });
            (thread, Some(handle))
        }
        Platform::Linux => {
            let refresh_ms = config.refresh_ms;
            let flag = Arc::clone(&shutdown);
            let thread = thread::spawn(move || {
                PollingSampler::new(refresh_ms).run(&flag, on_sample);
            });
            (thread, None)
        }
    };

    let mut app = app::App::new(
        Arc::clone(&store),
        config,
        Arc::clone(&shutdown),
        Arc::clone(&fatal),
    );
    let result = app.run();

    shutdown.store(true, Ordering::Relaxed);
    if let Some(handle) = kill_handle {
        handle.kill();
    }
    let _ = sampler_thread.join();

    if let Some(e) = fatal.lock().unwrap_or_else(|p| p.into_inner()).take() {
        return Err(e);
    }
    result
}
