use std::process::ExitCode;

use clap::Parser;
use desbravadores_cli::{cli::Cli, commands, AppConfig, AppContext};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // 加载配置
    let config = AppConfig::load(cli.config.as_deref())?;

    // 初始化日志
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("desbravadores_cli={0},desbravadores_sdk={0}", level).into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Loaded config: {:?}", config);

    let ctx = AppContext::new(config).await?;
    let today = chrono::Local::now().date_naive();

    match commands::run(cli.command, &ctx, today).await {
        Ok(output) => {
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Erro: {}", e);
            if e.requires_sign_in() {
                eprintln!("Faça login novamente: desbravadores login --email <email>");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
