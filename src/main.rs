use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use entities::aspect::AspectRatio;
use usecases::gateways::{NoProgress, Progress};
use usecases::generate::GenerateRequest;

mod common;
mod container;
mod entities;
mod gateways;
mod settings;
mod usecases;

/// Builds a collage out of the avatars of every member of a Discord guild.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Your Discord bot token
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    token: String,

    /// The guild id to create the avatar collage for
    #[arg(long)]
    target: u64,

    /// Aspect ratio in the format WIDTH:HEIGHT (e.g. 16:9)
    #[arg(long, default_value = "1:1")]
    ar: AspectRatio,

    /// Size of each avatar in pixels
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    size: u32,

    /// Output file name
    #[arg(long, default_value = "output.png")]
    name: PathBuf,

    /// Skip fetching and downloading, compose from avatars already on disk
    #[arg(long)]
    skip_download: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let container = match container::new(settings, &args.token) {
        Ok(container) => container,
        Err(e) => {
            tracing::error!("could not start: {:#}", e);
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let request = GenerateRequest {
        guild_id: args.target,
        aspect: args.ar,
        avatar_size: args.size,
        output: args.name,
        skip_download: args.skip_download,
    };

    let run_id = Uuid::new_v4();
    let span = info_span!("run", %run_id, guild_id = request.guild_id);

    tracing::info!(
        parent: &span,
        aspect = %request.aspect,
        avatar_size = request.avatar_size,
        output = %request.output.display(),
        skip_download = request.skip_download,
        avatar_directory = %container.settings.avatar_directory(),
        "starting collage run"
    );

    let interactive = io::stdout().is_terminal();
    let progress: Box<dyn Progress> = if interactive {
        Box::new(gateways::progress::new())
    } else {
        Box::new(NoProgress)
    };
    let result = container
        .generate
        .execute(&request, progress.as_ref())
        .instrument(span)
        .await;
    if interactive {
        println!();
    }

    match result {
        Ok(summary) => {
            tracing::info!(
                images = summary.image_count,
                columns = summary.grid.columns(),
                rows = summary.grid.rows(),
                width = summary.width,
                height = summary.height,
                "collage saved"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("collage run failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
