//! Video generation worker binary.
//!
//! Reads generation request JSON files from the command line and runs each
//! as an independent job, bounded by the configured job concurrency.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sreel_models::Job;
use sreel_worker::{GenerationRequest, PipelineContext, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("sreel=info".parse().unwrap())
        .add_directive("aws=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting sreel-worker");

    let request_files: Vec<String> = std::env::args().skip(1).collect();
    if request_files.is_empty() {
        error!("Usage: sreel-worker <request.json>...");
        std::process::exit(1);
    }

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let ctx = match PipelineContext::new(config.clone()).await {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            error!("Failed to create pipeline context: {}", e);
            std::process::exit(1);
        }
    };

    // Ctrl-c flips the cancel signal; in-flight FFmpeg runs are killed and
    // jobs clean up their working directories before exiting.
    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        cancel_tx.send(true).ok();
    });

    let job_semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));
    let mut handles = Vec::new();
    let mut failures = 0usize;

    for file in request_files {
        let request: GenerationRequest = match tokio::fs::read_to_string(&file).await {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(request) => request,
                Err(e) => {
                    error!("Invalid request file {}: {}", file, e);
                    failures += 1;
                    continue;
                }
            },
            Err(e) => {
                error!("Cannot read request file {}: {}", file, e);
                failures += 1;
                continue;
            }
        };

        let ctx = Arc::clone(&ctx);
        let cancel_rx = cancel_rx.clone();
        let permit = match Arc::clone(&job_semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        handles.push(tokio::spawn(async move {
            let _permit = permit;
            let mut job = Job::new(
                request.user_id.clone(),
                request.title.clone(),
                request.aspect,
                request.effect_preset.clone(),
                request.caption_style.clone(),
            );
            let job_id = job.id.clone();
            match ctx.run_job(&mut job, &request, cancel_rx).await {
                Ok(()) => {
                    info!(
                        job_id = %job_id,
                        url = job.final_url.as_deref().unwrap_or(""),
                        "Job finished"
                    );
                    true
                }
                Err(e) => {
                    error!(
                        job_id = %job_id,
                        error = %e,
                        retryable = e.is_retryable(),
                        "Job failed"
                    );
                    false
                }
            }
        }));
    }

    for handle in handles {
        match handle.await {
            Ok(true) => {}
            _ => failures += 1,
        }
    }

    if failures > 0 {
        error!("{} job(s) failed", failures);
        std::process::exit(1);
    }
    info!("Worker shutdown complete");
}
