//! devlog: turn git commit history into blog posts
//!
//! This binary reads a repository's recent commits, asks a text-generation
//! service to write a post about them and stores the post as Markdown.

use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use devlog::config::{Command, Config};
use devlog::pipeline::Pipeline;
use devlog::report::{render_posts, render_stats};
use devlog_git::GitRepo;
use devlog_post::PostIndex;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Logs go to stderr; stdout carries command output only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;

    match &config.command {
        Some(Command::Stats) => {
            let repo = GitRepo::open(&config.repo)?;
            print!("{}", render_stats(&repo.stats()?));
        }
        Some(Command::Posts { limit }) => {
            let entries = PostIndex::in_dir(&config.output_dir).load()?;
            print!("{}", render_posts(&entries, *limit));
        }
        None => {
            let range = config.commit_range(Utc::now());
            let post = Pipeline::from_config(config)
                .run(&config.repo, &range)
                .await?;
            info!(title = %post.document.title(), "Post written");
            println!("{}", post.storage_path.display());
        }
    }
    Ok(())
}
