use crate::output::print_json;
use crate::store::Store;

pub fn run(store: &Store, json: bool) -> anyhow::Result<()> {
    let catalog = store.catalog()?;
    let mut tracker = store.load(&catalog)?;
    tracker.reset(&catalog);
    store.save(&tracker)?;

    if json {
        return print_json(tracker.state());
    }
    println!(
        "progress reset; current step is {}",
        tracker.current_step_id()
    );
    Ok(())
}
