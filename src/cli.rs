//! Command line interface for the `adcframe` capture binary.
//!
//! Also compiled by the build script to generate the man page, so it may
//! only depend on `clap` and the standard library.

use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, ValueEnum};

/// Command line arguments for the `adcframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "adcframe",
    version,
    about = "Reassemble raw radar ADC frames from a DCA1000 UDP stream"
)]
pub struct Cli {
    /// Address to receive capture datagrams on.
    #[arg(long, default_value = "192.168.33.30:4098")]
    pub bind: SocketAddr,
    /// mmWave CLI profile (`.cfg`) the radar was programmed with.
    #[arg(long, value_name = "PATH", conflicts_with = "frame_bytes")]
    pub radar_cfg: Option<PathBuf>,
    /// Frame length in bytes, when no radar profile is given.
    #[arg(long, value_name = "BYTES", required_unless_present = "radar_cfg")]
    pub frame_bytes: Option<usize>,
    /// Frame period in milliseconds; incomplete frames older than two
    /// periods are abandoned.
    #[arg(long, value_name = "MS")]
    pub frame_period_ms: Option<u64>,
    /// Packets held while waiting for a missing one.
    #[arg(long, value_name = "PACKETS", default_value_t = 64)]
    pub reorder_window: usize,
    /// Frames queued for the consumer.
    #[arg(long, value_name = "FRAMES", default_value_t = 8)]
    pub sink_capacity: usize,
    /// What to do when the frame queue is full.
    #[arg(long, value_enum, default_value_t = PolicyArg::DropOldest)]
    pub policy: PolicyArg,
    /// Longest wait for queue space under `--policy block`.
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub block_timeout_ms: u64,
    /// Stop after this many frames.
    #[arg(long, value_name = "N")]
    pub frames: Option<u64>,
    /// Serve Prometheus metrics on this address.
    #[arg(long, value_name = "ADDR")]
    pub metrics_listen: Option<SocketAddr>,
}

/// Full-queue behaviour selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Replace the oldest queued frame.
    DropOldest,
    /// Discard the incoming frame.
    DropNewest,
    /// Wait up to `--block-timeout-ms`, then discard the incoming frame.
    Block,
}
