//! Parser for mmWave CLI profiles.
//!
//! Only the commands that shape the raw stream are read: `channelCfg` for
//! the antenna masks, `chirpComnCfg` for the samples per chirp and
//! `frameCfg` for the chirp count and frame period. Every other command is
//! skipped. A later occurrence of a command replaces an earlier one.

use std::{str::FromStr, time::Duration};

use super::{SensorConfig, SensorConfigError};

const CHANNEL_CFG: &str = "channelCfg";
const CHIRP_COMN_CFG: &str = "chirpComnCfg";
const FRAME_CFG: &str = "frameCfg";

#[derive(Clone, Copy)]
struct Channels {
    rx: u32,
    tx: u32,
}

#[derive(Clone, Copy)]
struct FrameShape {
    chirps: u64,
    period: Duration,
}

pub(super) fn parse(text: &str) -> Result<SensorConfig, SensorConfigError> {
    let mut channels = None;
    let mut adc_samples = None;
    let mut frame = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some(command) = tokens.next() else {
            continue;
        };
        let args: Vec<&str> = tokens.collect();
        match command {
            CHANNEL_CFG => channels = Some(parse_channels(&args)?),
            CHIRP_COMN_CFG => adc_samples = Some(parse_adc_samples(&args)?),
            FRAME_CFG => frame = Some(parse_frame(&args)?),
            _ => {}
        }
    }

    let channels = channels.ok_or(SensorConfigError::MissingCommand(CHANNEL_CFG))?;
    let adc_samples = adc_samples.ok_or(SensorConfigError::MissingCommand(CHIRP_COMN_CFG))?;
    let frame = frame.ok_or(SensorConfigError::MissingCommand(FRAME_CFG))?;

    let tx = u64::from(channels.tx);
    if frame.chirps % tx != 0 {
        return Err(SensorConfigError::UnevenChirps {
            chirps: frame.chirps,
            tx_antennas: channels.tx,
        });
    }
    let chirp_loops =
        u32::try_from(frame.chirps / tx).map_err(|_| SensorConfigError::FrameLengthOverflow)?;

    Ok(SensorConfig::new(
        chirp_loops,
        channels.rx,
        channels.tx,
        adc_samples,
        frame.period,
    ))
}

fn parse_channels(args: &[&str]) -> Result<Channels, SensorConfigError> {
    let rx = parse_mask(args, 0, "rx channel mask")?;
    let tx = parse_mask(args, 1, "tx channel mask")?;
    Ok(Channels {
        rx: rx.count_ones(),
        tx: tx.count_ones(),
    })
}

fn parse_adc_samples(args: &[&str]) -> Result<u32, SensorConfigError> {
    let samples: u32 = field(args, CHIRP_COMN_CFG, 3, "adc samples")?;
    if samples == 0 {
        return Err(invalid(CHIRP_COMN_CFG, "adc samples", args[3]));
    }
    Ok(samples)
}

fn parse_frame(args: &[&str]) -> Result<FrameShape, SensorConfigError> {
    let per_burst: u64 = field(args, FRAME_CFG, 0, "chirps per burst")?;
    let accumulated: u64 = field(args, FRAME_CFG, 1, "chirps accumulated")?;
    let bursts: u64 = field(args, FRAME_CFG, 3, "bursts per frame")?;
    let period_ms: f64 = field(args, FRAME_CFG, 4, "frame period")?;

    // Accumulated chirps are summed on chip and stream as one.
    let per_burst = if accumulated > 1 {
        if per_burst % accumulated != 0 {
            return Err(invalid(FRAME_CFG, "chirps accumulated", args[1]));
        }
        per_burst / accumulated
    } else {
        per_burst
    };
    let chirps = per_burst
        .checked_mul(bursts)
        .ok_or(SensorConfigError::FrameLengthOverflow)?;
    if chirps == 0 {
        return Err(SensorConfigError::EmptyFrame);
    }

    let period = Duration::try_from_secs_f64(period_ms / 1000.0)
        .ok()
        .filter(|period| !period.is_zero())
        .ok_or_else(|| invalid(FRAME_CFG, "frame period", args[4]))?;
    Ok(FrameShape { chirps, period })
}

fn parse_mask(args: &[&str], index: usize, name: &'static str) -> Result<u32, SensorConfigError> {
    let raw = *args.get(index).ok_or(SensorConfigError::MissingField {
        command: CHANNEL_CFG,
        field: name,
    })?;
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    match parsed {
        Ok(mask) if mask != 0 => Ok(mask),
        _ => Err(invalid(CHANNEL_CFG, name, raw)),
    }
}

fn field<T: FromStr>(
    args: &[&str],
    command: &'static str,
    index: usize,
    name: &'static str,
) -> Result<T, SensorConfigError> {
    let raw = args.get(index).ok_or(SensorConfigError::MissingField {
        command,
        field: name,
    })?;
    raw.parse().map_err(|_| invalid(command, name, raw))
}

fn invalid(command: &'static str, field: &'static str, value: &str) -> SensorConfigError {
    SensorConfigError::InvalidField {
        command,
        field,
        value: value.to_owned(),
    }
}
