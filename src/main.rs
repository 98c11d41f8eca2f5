//! Capture binary: receives a DCA1000 stream and reports assembled frames.

mod cli;

use std::{error::Error, fs, time::Duration};

use adcframe::{
    sensor::SensorConfig,
    session::{CaptureSession, SessionConfig},
    sink::SinkPolicy,
    source::UdpPacketSource,
};
use clap::Parser;
use cli::{Cli, PolicyArg};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    install_metrics(&cli)?;

    let config = session_config(&cli)?;
    let source = UdpPacketSource::bind(cli.bind).await?;
    let (session, mut frames) = CaptureSession::start(config, source)?;

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    let mut received = 0_u64;
    loop {
        tokio::select! {
            biased;

            res = &mut interrupt => {
                res?;
                info!("interrupt received; stopping capture");
                break;
            }
            frame = frames.recv() => {
                let Some(frame) = frame else { break };
                received += 1;
                info!(frame = %frame.index(), bytes = frame.len(), "frame received");
                if cli.frames.is_some_and(|limit| received >= limit) {
                    break;
                }
            }
        }
    }

    session.stop();
    let summary = session.wait().await?;
    println!(
        "received {received} frames; dropped {} frames and {} packets ({:?})",
        summary.stats.dropped_frames(),
        summary.stats.dropped_packets(),
        summary.reason,
    );
    Ok(())
}

fn session_config(cli: &Cli) -> Result<SessionConfig, Box<dyn Error>> {
    let mut builder = match (&cli.radar_cfg, cli.frame_bytes) {
        (Some(path), _) => {
            let sensor = SensorConfig::from_radar_cfg(&fs::read_to_string(path)?)?;
            info!(?sensor, "loaded radar profile");
            SessionConfig::for_sensor(&sensor)?
        }
        (None, Some(bytes)) => SessionConfig::builder(bytes),
        (None, None) => return Err("either --radar-cfg or --frame-bytes is required".into()),
    };
    if let Some(period) = cli.frame_period_ms {
        builder = builder.gap_timeout(Duration::from_millis(period).saturating_mul(2));
    }
    let policy = match cli.policy {
        PolicyArg::DropOldest => SinkPolicy::DropOldest,
        PolicyArg::DropNewest => SinkPolicy::DropNewest,
        PolicyArg::Block => SinkPolicy::BlockWithTimeout(Duration::from_millis(cli.block_timeout_ms)),
    };
    Ok(builder
        .reorder_capacity(cli.reorder_window)
        .sink_capacity(cli.sink_capacity)
        .sink_policy(policy)
        .build()?)
}

#[cfg(feature = "metrics")]
fn install_metrics(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if let Some(addr) = cli.metrics_listen {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!(%addr, "serving Prometheus metrics");
    }
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if cli.metrics_listen.is_some() {
        tracing::warn!("built without the `metrics` feature; ignoring --metrics-listen");
    }
    Ok(())
}
