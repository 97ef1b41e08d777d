use std::process::ExitCode;

use tracing::{debug, error, info};
use uuid::Uuid;

fn init_logging() {
    // .env first so RUST_LOG and LOG_FORMAT apply
    let dotenv = common::env::load_dotenv();
    common::utils::logging::init_logging_from_env();
    info!(service = "customer_manager", event = "logger_init", "tracing subscriber initialized");
    match dotenv {
        Some(path) => info!(service = "customer_manager", event = "dotenv_loaded", path = %path.display(), "loaded .env"),
        None => debug!(service = "customer_manager", event = "dotenv_missing", "no .env file found"),
    }
}

fn main() -> ExitCode {
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "customer_manager",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "customer_manager", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "customer_manager", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "customer_manager",
        event = "start",
        %service_id,
        pid,
        version,
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "customer manager starting"
    );

    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "customer_manager", event = "stop", %service_id, pid, "server stopped normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "customer_manager", event = "run_failed", error = %e, "server::run returned error");
            ExitCode::FAILURE
        }
    }
}
