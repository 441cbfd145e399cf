//! Entry point: one reset pass per invocation.
//!
//! Configuration comes from the environment, or from a TOML file passed
//! as the first argument. An external scheduler (cron, systemd timer)
//! owns invocation cadence.

use std::path::Path;

use taskcycle::config::EngineConfig;
use taskcycle::engine::ResetEngine;
use taskcycle::notify::SmsDispatcher;
use taskcycle::store::NotionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_file(Path::new(&path))?,
        None => EngineConfig::from_env()?,
    };

    let _guard = taskcycle::logging::init(&config.log.directory);

    let store = NotionStore::new(&config.store)?;
    let mut engine = ResetEngine::new(store, &config.store);
    if config.notify.is_configured() {
        let dispatcher = SmsDispatcher::new(&config.notify);
        engine = engine.with_dispatcher(Box::new(dispatcher), config.notify.recipients.clone());
    } else {
        tracing::warn!("sms credentials not configured, running without notifications");
    }

    let today = chrono::Local::now().date_naive();
    // All run failures are contained and logged inside run_once; the
    // process itself only fails on startup/config problems above.
    engine.run_once(today).await;
    Ok(())
}
