//! music_page CLI - Publish a Dropbox music folder as an HTML page.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use music_page::{
    collect_records, http_client, normalize_folder_path, render_page, sort_newest_first,
    write_page, Authenticator, Credentials, DropboxClient, LinkResolver,
};

const DEFAULT_INTRO: &str = "A rolling list of tracks, hosted on Dropbox.";

/// Build a static HTML listing of the audio files in a Dropbox folder.
#[derive(Parser)]
#[command(name = "music_page")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dropbox app key.
    #[arg(long, env = "DROPBOX_APP_KEY", hide_env_values = true)]
    app_key: Option<String>,

    /// Dropbox app secret.
    #[arg(long, env = "DROPBOX_APP_SECRET", hide_env_values = true)]
    app_secret: Option<String>,

    /// Long-lived Dropbox refresh token.
    #[arg(long, env = "DROPBOX_REFRESH_TOKEN", hide_env_values = true)]
    refresh_token: Option<String>,

    /// Folder path or dropbox.com/home URL to list.
    #[arg(long, env = "DROPBOX_FOLDER", default_value = "/Public/Music")]
    folder: String,

    /// Directory that receives index.html.
    #[arg(long, env = "OUTPUT_DIR", default_value = "out")]
    output_dir: PathBuf,

    /// Page title.
    #[arg(long, env = "PAGE_TITLE", default_value = "Music")]
    title: String,

    /// HTML blurb shown under the title.
    #[arg(long, env = "PAGE_INTRO", default_value = DEFAULT_INTRO)]
    intro: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "music_page=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Validate all configuration before any network call
    let credentials = Credentials::new(cli.app_key, cli.app_secret, cli.refresh_token)?;
    let folder = normalize_folder_path(&cli.folder)?;

    let http = http_client().context("Failed to build HTTP client")?;

    info!(folder = %folder, "Listing folder from Dropbox");
    let token = Authenticator::new(credentials, http.clone())
        .get_access_token()
        .await
        .context("Failed to obtain Dropbox access token")?;

    let client = DropboxClient::new(http, token);
    let report: &(dyn Fn(&str) + Send + Sync) = &|message: &str| eprintln!("   {}", message);

    let mut records = collect_records(&client, &LinkResolver::default(), &folder, Some(report))
        .await
        .with_context(|| format!("Failed to list music in folder: {}", folder))?;
    sort_newest_first(&mut records);

    let html = render_page(&records, &cli.title, Some(&cli.intro), Utc::now());

    let out_path = write_page(&cli.output_dir, &html)
        .await
        .with_context(|| format!("Failed to write page to {:?}", cli.output_dir))?;

    info!(items = records.len(), path = %out_path.display(), "Wrote music page");
    println!("Wrote {} ({} items).", out_path.display(), records.len());

    Ok(())
}
