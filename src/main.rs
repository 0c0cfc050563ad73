use tracing_subscriber::EnvFilter;
use worktick::commands::Cli;
use worktick::libs::messages::macros::is_debug_mode;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    if is_debug_mode() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("worktick=debug")))
            .init();
    }

    Cli::menu().await
}
