use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // Load .env before the subscriber so RUST_LOG and LOG_FORMAT apply.
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service = "catalog", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    init_logging();

    let instance_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "catalog",
            event = "panic",
            %instance_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg.server.worker_threads,
        Err(_) => std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()),
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "catalog", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "catalog",
        event = "start",
        %instance_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "catalog server starting"
    );

    rt.block_on(async move {
        let server_task = tokio::spawn(async move {
            let res = server::run().await;
            if let Err(e) = &res {
                error!(service = "catalog", event = "run_failed", error = %e, "server::run returned error");
            }
            res
        });

        tokio::select! {
            res = server_task => match res {
                Ok(Ok(())) => {
                    info!(service = "catalog", event = "stop", %instance_id, pid, "server stopped normally");
                    std::process::ExitCode::SUCCESS
                }
                Ok(Err(_)) => std::process::ExitCode::FAILURE,
                Err(e) => {
                    error!(service = "catalog", event = "task_join_error", error = %e, "server task join error");
                    std::process::ExitCode::FAILURE
                }
            },
            _ = tokio::signal::ctrl_c() => {
                // In-flight requests are dropped, not drained.
                info!(service = "catalog", event = "shutdown_signal", %instance_id, pid, "received Ctrl+C, shutting down");
                std::process::ExitCode::SUCCESS
            }
        }
    })
}
