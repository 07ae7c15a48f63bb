use paperscope::{init, init_tracing, server::run_server, Configuration};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment variables from .env
    init();
    init_tracing();

    let config = Configuration::from_env();
    run_server(config).await
}
