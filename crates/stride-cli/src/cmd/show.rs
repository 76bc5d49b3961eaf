use crate::output::print_json;
use crate::store::Store;

pub fn run(store: &Store, json: bool) -> anyhow::Result<()> {
    let catalog = store.catalog()?;
    let tracker = store.load(&catalog)?;
    let state = tracker.state();

    if json {
        return print_json(state);
    }

    println!("Track: {}", store.track().title());
    println!("Current step: {}", state.current_step_id);
    let (done, total) = tracker.progress_count(&catalog);
    println!("Completed: {done}/{total}");
    if !state.completed_steps.is_empty() {
        println!("  {}", state.completed_steps.join(", "));
    }

    if !state.video_watch_progress.is_empty() {
        println!("Video progress:");
        for (step, percent) in &state.video_watch_progress {
            println!("  {step}: {percent:.0}%");
        }
    }

    if !state.assessment_results.is_empty() {
        println!("Assessment results:");
        for step in state.assessment_results.keys() {
            println!("  {step}");
        }
    }

    println!("Last visited: {}", state.last_visited_at.to_rfc3339());
    Ok(())
}
