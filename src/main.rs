use std::process;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use sakura_letter::{
    audio,
    config::AppConfig,
    logging::{self, LogTarget},
    narrative::{Session, Variant},
    player::Player,
    provider::{GeminiClient, Generate, OfflineGenerator},
    transcript,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const PLAY_USAGE: &str = "sakura-letter play [--batch] [--offline]";
const PRINT_USAGE: &str = "sakura-letter print [--batch] [--offline]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Print,
}

#[derive(Debug, PartialEq, Eq)]
struct Options {
    variant: Variant,
    offline: bool,
}

fn usage() -> String {
    format!(
        "Sakura Letter: a love letter among falling petals\n\nUsage:\n  {PLAY_USAGE}\n  {PRINT_USAGE}"
    )
}

fn parse_options(args: impl Iterator<Item = String>) -> Result<Options> {
    let mut options = Options {
        variant: Variant::Letter,
        offline: false,
    };
    for arg in args {
        match arg.as_str() {
            "--batch" => options.variant = Variant::Proposal,
            "--offline" => options.offline = true,
            other => bail!("Unknown option {other}\n\n{}", usage()),
        }
    }
    Ok(options)
}

fn parse_command(mut args: impl Iterator<Item = String>) -> Result<(Command, Options)> {
    let command = match args.next().as_deref() {
        Some("play") => Command::Play,
        Some("print") => Command::Print,
        _ => bail!(usage()),
    };
    Ok((command, parse_options(args)?))
}

fn run() -> Result<()> {
    match parse_command(std::env::args().skip(1))? {
        (Command::Play, options) => {
            logging::init(LogTarget::File)?;
            block_on(play(options))
        }
        (Command::Print, options) => {
            logging::init(LogTarget::Stderr)?;
            block_on(print(options))
        }
    }
}

fn block_on(fut: impl std::future::Future<Output = Result<()>>) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(fut)
}

fn generator(config: &AppConfig, offline: bool) -> Result<Arc<dyn Generate>> {
    if offline {
        info!("offline mode: fallback text only");
        return Ok(Arc::new(OfflineGenerator));
    }
    match &config.generation.api_key {
        Some(key) => {
            info!(model = %config.generation.model, "using Gemini for letter text");
            Ok(Arc::new(GeminiClient::new(&config.generation, key.clone())?))
        }
        None => {
            info!("no API key configured: fallback text only");
            Ok(Arc::new(OfflineGenerator))
        }
    }
}

async fn play(options: Options) -> Result<()> {
    let config = AppConfig::load();
    let session = Session::new(generator(&config, options.offline)?, options.variant);
    let playback = audio::from_command(&config.audio.command);

    let mut player = Player::new(session, config, playback);
    player.play().await
}

async fn print(options: Options) -> Result<()> {
    let config = AppConfig::load();
    let mut session = Session::new(generator(&config, options.offline)?, options.variant);

    let letter = transcript::read_through(&mut session).await;
    print!("{letter}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<(Command, Options)> {
        parse_command(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn defaults_to_the_lazy_letter() {
        let (command, options) = parse(&["play"]).unwrap();
        assert_eq!(command, Command::Play);
        assert_eq!(
            options,
            Options {
                variant: Variant::Letter,
                offline: false
            }
        );
    }

    #[test]
    fn flags_select_proposal_and_offline() {
        let (command, options) = parse(&["print", "--offline", "--batch"]).unwrap();
        assert_eq!(command, Command::Print);
        assert_eq!(options.variant, Variant::Proposal);
        assert!(options.offline);
    }

    #[test]
    fn unknown_flag_is_rejected_with_usage() {
        let err = parse(&["play", "--loud"]).unwrap_err().to_string();
        assert!(err.contains("Unknown option --loud"));
        assert!(err.contains(PLAY_USAGE));
    }

    #[test]
    fn missing_or_unknown_command_prints_usage() {
        let cases: [&[&str]; 2] = [&[], &["show"]];
        for args in cases {
            let err = parse(args).unwrap_err().to_string();
            assert!(err.contains("Usage:"));
            assert!(err.contains(PRINT_USAGE));
        }
    }
}
