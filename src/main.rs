/// homecam controller entry point
use homecam::{config::ServerConfig, context::AppContext, error::CamResult, jobs, server};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> CamResult<()> {
    let config = ServerConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(config.logging.env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    let ctx = Arc::new(AppContext::new(config).await?);

    let scheduler = Arc::new(jobs::JobScheduler::new(Arc::clone(&ctx)));
    scheduler.start();

    server::serve((*ctx).clone()).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    __
   / /_  ____  ____ ___  ___  _________ _____ ___
  / __ \/ __ \/ __ `__ \/ _ \/ ___/ __ `/ __ `__ \
 / / / / /_/ / / / / / /  __/ /__/ /_/ / / / / / /
/_/ /_/\____/_/ /_/ /_/\___/\___/\__,_/_/ /_/ /_/

        Home camera controller v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
