use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use voxlpc::audio::{AudioSource, WavAudioSource, write_wav_file};
use voxlpc::cli::{Cli, Commands, render_config};
use voxlpc::codec::{CodecConfig, LpcPipeline};
use voxlpc::config::Config;
use voxlpc::lpc::LevinsonLpc;
use voxlpc::streaming::{StreamingCodec, StreamingConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(version = %voxlpc::version_string(), "voxlpc starting");

    let config = load_config(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Analyze {
            input,
            coefficients,
            save,
        } => handle_analyze(&config, &input, coefficients, save.as_deref())?,
        Commands::Roundtrip { input, output } => handle_roundtrip(&config, &input, &output)?,
        Commands::Stream {
            input,
            fast,
            output,
        } => handle_stream(&config, &input, fast, output.as_deref())?,
        Commands::Config => {
            print!("{}", render_config(&config)?);
        }
    }

    Ok(())
}

/// Installs the fmt subscriber; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/voxlpc/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path).with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    Ok(config.with_env_overrides())
}

/// Codec parameters for a source, preferring the file's own sample rate.
fn codec_config_for(config: &Config, source_rate: u32) -> CodecConfig {
    let mut codec = config.codec_config();
    if source_rate != codec.sample_rate {
        tracing::info!(
            configured = codec.sample_rate,
            source = source_rate,
            "using the source sample rate"
        );
        codec.sample_rate = source_rate;
    }
    codec
}

fn open_wav(path: &Path) -> Result<WavAudioSource> {
    WavAudioSource::open(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn handle_analyze(
    config: &Config,
    input: &Path,
    coefficients: usize,
    save: Option<&Path>,
) -> Result<()> {
    let source = open_wav(input)?;
    let codec_config = codec_config_for(config, source.sample_rate());
    let pipeline = LpcPipeline::new(LevinsonLpc::default(), codec_config)?;

    let signal = pipeline.encode(&source.into_samples())?;
    for (index, frame) in signal.frames().iter().enumerate() {
        let voicing = if frame.is_voiced() { "voiced" } else { "unvoiced" };
        let shown: Vec<String> = frame
            .coefficients
            .iter()
            .take(coefficients)
            .map(|c| format!("{:+.4}", c))
            .collect();
        println!(
            "{:5}  {:8}  pitch {:9.4}  [{}]",
            index,
            voicing,
            frame.pitch,
            shown.join(", ")
        );
    }
    println!(
        "{} frames, {} voiced, {} ms",
        signal.frame_count(),
        signal.voiced_count(),
        signal.duration_ms()
    );

    if let Some(path) = save {
        let text = toml::to_string(&signal)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Encoded signal saved to {}", path.display());
    }

    Ok(())
}

fn handle_roundtrip(config: &Config, input: &Path, output: &Path) -> Result<()> {
    let source = open_wav(input)?;
    let sample_rate = source.sample_rate();
    let pipeline = LpcPipeline::new(
        LevinsonLpc::default(),
        codec_config_for(config, sample_rate),
    )?;

    let signal = pipeline.encode(&source.into_samples())?;
    let decoded = pipeline.decode(&signal)?;
    write_wav_file(output, &decoded, sample_rate)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} frames ({} voiced) resynthesized to {}",
        signal.frame_count(),
        signal.voiced_count(),
        output.display()
    );
    Ok(())
}

fn handle_stream(config: &Config, input: &Path, fast: bool, output: Option<&Path>) -> Result<()> {
    let source = open_wav(input)?.with_realtime(!fast);
    let sample_rate = source.sample_rate();
    let pipeline = Arc::new(LpcPipeline::new(
        LevinsonLpc::default(),
        codec_config_for(config, sample_rate),
    )?);
    let stream = StreamingCodec::new(pipeline, StreamingConfig::from_config(config))?;

    let (blocks, voiced, decoded, stats) = match output {
        Some(_) => {
            let (handle, decoded_rx) = stream.start_roundtrip(source)?;
            let mut samples = Vec::new();
            let mut blocks = 0usize;
            for block in decoded_rx.iter() {
                samples.extend_from_slice(&block.samples);
                blocks += 1;
            }
            let stats = handle.join()?;
            (blocks, None, Some(samples), stats)
        }
        None => {
            let (handle, encoded_rx) = stream.start_encoder(source)?;
            let mut blocks = 0usize;
            let mut voiced = 0usize;
            for block in encoded_rx.iter() {
                blocks += 1;
                if block.frame.is_voiced() {
                    voiced += 1;
                }
            }
            let stats = handle.join()?;
            (blocks, Some(voiced), None, stats)
        }
    };

    match voiced {
        Some(voiced) => println!(
            "{} blocks captured, {} analyzed ({} voiced), {} overwritten",
            stats.published, blocks, voiced, stats.overwritten
        ),
        None => println!(
            "{} blocks captured, {} resynthesized, {} overwritten",
            stats.published, blocks, stats.overwritten
        ),
    }

    if let (Some(path), Some(samples)) = (output, decoded) {
        write_wav_file(path, &samples, sample_rate)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Resynthesis written to {}", path.display());
    }

    Ok(())
}
