use log::info;
use rans_client::{
    bootstrap::{BootstrapPlan, Bootstrapper},
    config::DbConfig,
    db::ArangoHttpStore,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = DbConfig::from_env()?;
    info!("Bootstrapping database {} at {}", config.name, config.url);

    let store = ArangoHttpStore::new(&config)?;
    let report = Bootstrapper::new(store, config.name.as_str())
        .run(&BootstrapPlan::default())
        .await?;

    for (name, ensured) in &report.collections {
        info!("Collection {}: {:?}", name, ensured);
    }
    for (collection, field, ensured) in &report.indexes {
        info!("Unique index {}.{}: {:?}", collection, field, ensured);
    }
    Ok(())
}
