//! monosynth - monophonic subtractive synthesizer

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use monosynth::config;
use monosynth::engine::player::{self, Player};
use monosynth::engine::{recorder, AudioContext, Sequence, Synth};
use monosynth::notes;
use monosynth::params::{
    AdsrTarget, ParamId, ParamSet, Waveform, MAX_ADSR_STAGE_DURATION, MAX_ECHO_DURATION,
    MAX_FILTER_Q, MAX_UNISON_WIDTH, MIN_FILTER_FREQ,
};
use monosynth::viz::{self, OutputTap, PlayState};

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            output,
            notes: note_names,
            note_length,
            gate,
            tail,
            set,
            config: config_path,
        } => {
            let cfg = config::load_or_default(config_path.as_deref())?;

            let frequencies = note_names
                .iter()
                .map(|name| notes::parse(name))
                .collect::<Result<Vec<_>, _>>()?;

            let context = AudioContext::new(f64::from(cfg.audio.sample_rate))?;
            let mut synth = Synth::with_params(context, ParamSet::with_overrides(set))
                .with_tap(OutputTap::new(cfg.analyser.fft_size));

            let sequence = Sequence::from_notes(&frequencies, note_length, gate);
            let duration = recorder::render_to_wav(
                &output,
                &mut synth,
                &sequence,
                tail,
                cfg.audio.buffer_size,
            )?;

            println!("{}", output.display());
            info!(notes = frequencies.len(), duration, "done");
        }

        Commands::Play {
            set,
            config: config_path,
        } => {
            let cfg = config::load_or_default(config_path.as_deref())?;

            let mut player = Player::open(cfg.audio.device.as_deref())?;
            if player.sample_rate() != cfg.audio.sample_rate {
                warn!(
                    device = player.sample_rate(),
                    configured = cfg.audio.sample_rate,
                    "live playback follows the device sample rate"
                );
            }

            let tap = OutputTap::new(cfg.analyser.fft_size);
            let context = AudioContext::new(f64::from(player.sample_rate()))?;
            let synth = Arc::new(Mutex::new(
                Synth::with_params(context, ParamSet::with_overrides(set)).with_tap(tap.clone()),
            ));

            player.start(synth.clone())?;
            let mut state = PlayState::new();
            let result = viz::run_play(synth, tap, &mut state);
            player.stop();
            result.context("keyboard view failed")?;
        }

        Commands::Params => print_params(),

        Commands::Devices => {
            let default = player::default_device_name();
            println!("Output devices:");
            for (name, sample_rate, channels) in player::list_output_devices()? {
                let marker = if default.as_deref() == Some(name.as_str()) { "*" } else { " " };
                println!(" {marker} {name} ({sample_rate} Hz, {channels} ch)");
            }
        }

        Commands::Check {
            config: config_path,
        } => {
            let cfg = config::load_config(&config_path)?;
            println!("Configuration is valid");
            println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
            println!("  Buffer size: {}", cfg.audio.buffer_size);
            println!("  Analyser window: {}", cfg.analyser.fft_size);
        }

        Commands::Init => print!("{}", config::example_yaml()),
    }

    Ok(())
}

fn print_params() {
    println!("{:<14} {:>8}  choices", "parameter", "default");
    for id in ParamId::ALL {
        let choices = id.choices().map(|c| c.join(", ")).unwrap_or_default();
        println!("{:<14} {:>8.3}  {}", id.name(), id.default_value(), choices);
    }

    println!();
    println!("waveforms:    {}", Waveform::NAMES.join(", "));
    println!("adsr targets: {}", AdsrTarget::NAMES.join(", "));
    println!();
    println!("MAX_UNISON_WIDTH        {MAX_UNISON_WIDTH} cents");
    println!("MAX_ADSR_STAGE_DURATION {MAX_ADSR_STAGE_DURATION} s");
    println!("MAX_ECHO_DURATION       {MAX_ECHO_DURATION} s");
    println!("MIN_FILTER_FREQ         {MIN_FILTER_FREQ} Hz");
    println!("MAX_FILTER_Q            {MAX_FILTER_Q} dB");
}
