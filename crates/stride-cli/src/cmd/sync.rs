use crate::output::print_json;
use crate::store::Store;
use anyhow::bail;
use stride_core::sync::{GatewayConfig, ProgressGateway, SaveOutcome};

pub fn run(store: &Store, base_url: &str, user: &str, json: bool) -> anyhow::Result<()> {
    let catalog = store.catalog()?;
    let tracker = store.load(&catalog)?;

    let gateway = ProgressGateway::new(GatewayConfig::new(base_url))?;
    let outcome = gateway.save(user, store.track(), tracker.state());

    match outcome {
        SaveOutcome::Synced => {
            if json {
                return print_json(&serde_json::json!({
                    "user": user,
                    "track": store.track(),
                    "synced": true,
                }));
            }
            println!("progress synced for {user}");
            Ok(())
        }
        SaveOutcome::Deferred => {
            if json {
                return print_json(&serde_json::json!({
                    "user": user,
                    "track": store.track(),
                    "synced": false,
                    "deferred": true,
                }));
            }
            println!("remote unreachable; save deferred to the local cache");
            Ok(())
        }
        SaveOutcome::Failed => bail!("failed to sync progress for {user}"),
    }
}
