use baxathon::api::{AssetApi, ChatApi, PredictApi};
use baxathon::chat::ChatController;
use baxathon::cli::{Cli, Commands, CHAT_HELP};
use baxathon::config::Config;
use baxathon::display::{honey_barrel_page, render_header};
use baxathon::error::Result;
use baxathon::logging;
use baxathon::media::MediaController;
use baxathon::repl;
use baxathon::upload::UploadController;
use baxathon_common::{MediaOutcome, Route, UploadStatus};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load()?;
    if let Some(env) = cli.env {
        config.environment = env;
    }

    match cli.command {
        Commands::Routes => {
            println!("{}\n", render_header(Some(Route::DEFAULT)));
            for route in Route::ALL {
                println!("  {:<16} {:<16} {}", route.path(), route.nav_label(), route.title());
            }
            println!("\n  /                -> {}", Route::DEFAULT.path());
        }

        Commands::Media { route } => {
            let active = Route::from_path(&route);
            if active.is_none() {
                tracing::warn!(route = route.as_str(), "unknown route, using default background");
            }
            println!("{}\n", render_header(active));

            let assets = AssetApi::with_default_client()?;
            let mut controller = MediaController::new(assets, &config.asset_base_url()?);
            controller.set_route(&route);
            if let Some((tier, uri)) = controller.loader().displayed() {
                println!("  {:<6} {}", tier, uri);
            }

            for outcome in controller.settle().await {
                match outcome {
                    MediaOutcome::Upgraded { tier, uri, .. } => println!("  {:<6} {}", tier, uri),
                    MediaOutcome::Failed { tier, error } => {
                        println!("  {:<6} 読み込み失敗: {}", tier, error)
                    }
                    MediaOutcome::Stale => {}
                }
            }
        }

        Commands::Predict { file } => {
            println!("{}\n", render_header(Some(Route::WhiskeyGoggles)));

            let mut controller = UploadController::new(PredictApi::from_config(&config)?);
            let spinner = start_spinner("Checking service status...");
            controller.activate();
            let status = controller.settle().await;
            spinner.finish_and_clear();

            if status == UploadStatus::ServiceDown {
                println!("✖ {}", controller.flow().error_message().unwrap_or_default());
                return Ok(());
            }

            controller.select_file(&file)?;
            let spinner = start_spinner("Identifying bottle...");
            let status = controller.settle().await;
            spinner.finish_and_clear();

            match status {
                UploadStatus::Success => {
                    let session = controller.flow().session();
                    if let Some(prediction) = session.and_then(|s| s.result.as_ref()) {
                        println!("✔ {} (id: {})", prediction.name, prediction.id);
                        println!("  信頼度: {:.1}%", prediction.confidence());
                    }
                    if let Some(preview) = session.and_then(|s| s.preview.as_ref()) {
                        tracing::debug!(bytes = preview.len(), "preview generated");
                    }
                }
                _ => println!("✖ {}", controller.flow().error_message().unwrap_or_default()),
            }
        }

        Commands::Chat { username } => {
            println!("{}\n", render_header(Some(Route::Bob)));
            let username = match username {
                Some(name) => name,
                None => dialoguer::Input::<String>::new()
                    .with_prompt("Username")
                    .interact_text()
                    .map_err(std::io::Error::other)?,
            };
            let mut controller = ChatController::new(ChatApi::from_config(&config)?);
            controller.set_username(&username)?;
            println!("{}\n", CHAT_HELP);
            repl::run(&mut controller, BufReader::new(tokio::io::stdin())).await?;
        }

        Commands::Honeybarrel => {
            println!("{}\n", render_header(Some(Route::HoneyBarrel)));
            println!("{}", honey_barrel_page());
        }

        Commands::Config { set_env, show } => {
            if let Some(env) = set_env {
                config.set_environment(env)?;
                println!("✔ 接続先を {} に設定しました", env);
            }

            if show || set_env.is_none() {
                println!("設定:");
                println!("  環境: {}", config.environment);
                let api = config.api_base_url().unwrap_or_else(|e| e.to_string());
                let predict = config.predict_base_url().unwrap_or_else(|e| e.to_string());
                let assets = config.asset_base_url().unwrap_or_else(|e| e.to_string());
                println!("  チャットAPI: {}", api);
                println!("  判定API: {}", predict);
                println!("  背景画像: {}", assets);
                println!("  APIバージョン: {}", config.api_version);
            }
        }
    }

    Ok(())
}

fn start_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
