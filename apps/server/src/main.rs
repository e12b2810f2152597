use anyhow::Context;
use showroom_domain::config::ApiConfig;
use showroom_kernel::config::load_config;
use showroom_logger::Logger;
use showroom_server::Server;

#[showroom_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).init()?;

    let cfg: ApiConfig = load_config(Some("showroom")).context("Critical: Configuration is malformed")?;

    Server::builder().config(cfg).build().await?.run().await
}
