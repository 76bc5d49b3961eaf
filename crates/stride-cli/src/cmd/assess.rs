use crate::output::print_json;
use crate::store::Store;
use anyhow::Context;

pub fn run(store: &Store, step: &str, result: &str, json: bool) -> anyhow::Result<()> {
    let payload: serde_json::Value =
        serde_json::from_str(result).context("result must be a JSON document")?;

    let catalog = store.catalog()?;
    let mut tracker = store.load(&catalog)?;
    tracker.record_assessment_result(step, payload);
    store.save(&tracker)?;

    if json {
        return print_json(&serde_json::json!({
            "step": step,
            "recorded": true,
        }));
    }
    println!("assessment result recorded for {step}");
    Ok(())
}
