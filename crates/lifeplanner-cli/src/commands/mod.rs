pub mod ads;
pub mod config;
pub mod emotion;
pub mod project;
pub mod subscription;
pub mod task;

use std::future::Future;
use std::sync::Arc;

use lifeplanner_core::{
    AdThrottle, BackendClient, Clock, Config, Database, EntitlementService, KeyValueStore,
    Planner, SimulatedPresenter, SystemClock,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Services shared by the commands, wired from the on-disk config and store.
pub struct Context {
    pub config: Config,
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub entitlements: Arc<EntitlementService>,
}

impl Context {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load_or_default();
        let store: Arc<dyn KeyValueStore> = Arc::new(Database::open()?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let entitlements = Arc::new(EntitlementService::new(
            store.clone(),
            clock.clone(),
            config.entitlements.clone(),
        ));
        Ok(Self {
            config,
            store,
            clock,
            entitlements,
        })
    }

    /// The CLI has no ad SDK, so only simulated ads are available.
    pub fn ads(&self) -> Result<AdThrottle, Box<dyn std::error::Error>> {
        if !self.config.ads.simulate {
            return Err("ads.simulate is false and the CLI has no ad SDK".into());
        }
        Ok(AdThrottle::new(
            self.entitlements.clone(),
            self.store.clone(),
            Arc::new(SimulatedPresenter::new()),
            self.clock.clone(),
            self.config.ads.clone(),
        ))
    }

    pub fn planner(&self) -> Result<Planner, Box<dyn std::error::Error>> {
        let client = BackendClient::new(&self.config.api)?;
        Ok(Planner::new(
            client,
            self.entitlements.clone(),
            self.clock.clone(),
        ))
    }
}

/// Run one async backend call to completion.
pub fn block_on<F: Future>(future: F) -> Result<F::Output, std::io::Error> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
