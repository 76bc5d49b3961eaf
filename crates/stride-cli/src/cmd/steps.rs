use crate::output::{print_json, Table};
use crate::store::Store;

pub fn run(store: &Store, json: bool) -> anyhow::Result<()> {
    let catalog = store.catalog()?;
    let tracker = store.load(&catalog)?;

    if json {
        #[derive(serde::Serialize)]
        struct StepRow<'a> {
            id: &'a str,
            kind: &'a str,
            requirements: String,
            completed: bool,
            unlocked: bool,
            current: bool,
        }

        let rows: Vec<StepRow> = catalog
            .ordered_steps(store.track())
            .iter()
            .map(|step| StepRow {
                id: &step.id,
                kind: step.kind.as_str(),
                requirements: step.requirements.summary(),
                completed: tracker.is_step_completed(&step.id),
                unlocked: tracker.is_step_unlocked(&step.id),
                current: tracker.current_step_id() == step.id,
            })
            .collect();
        return print_json(&rows);
    }

    let mut table = Table::new(&["STEP", "KIND", "STATUS", "REQUIREMENTS"]);
    for step in catalog.ordered_steps(store.track()) {
        let status = if tracker.is_step_completed(&step.id) {
            "done"
        } else if tracker.current_step_id() == step.id {
            "current"
        } else if tracker.is_step_unlocked(&step.id) {
            "unlocked"
        } else {
            "locked"
        };
        table.row(vec![
            step.id.clone(),
            step.kind.to_string(),
            status.to_string(),
            step.requirements.summary(),
        ]);
    }
    table.print();

    let (done, total) = tracker.progress_count(&catalog);
    println!("\n{done}/{total} completed");
    Ok(())
}
