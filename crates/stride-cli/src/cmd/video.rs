use crate::output::print_json;
use crate::store::Store;
use anyhow::bail;

pub fn run(store: &Store, step: &str, percent: f64, json: bool) -> anyhow::Result<()> {
    let catalog = store.catalog()?;
    if catalog.step(store.track(), step).is_none() {
        bail!("unknown step '{step}' in track {}", store.track());
    }

    let mut tracker = store.load(&catalog)?;
    tracker.record_video_progress(step, percent);
    store.save(&tracker)?;

    let recorded = tracker.video_progress(step);
    if json {
        return print_json(&serde_json::json!({
            "step": step,
            "watchedPercent": recorded,
        }));
    }
    println!("{step}: {recorded:.0}% watched");
    Ok(())
}
