use crate::output::print_json;
use crate::store::Store;
use anyhow::bail;
use stride_core::evaluate::Evidence;
use stride_core::progress::Completion;

pub struct EvidenceArgs {
    pub watched: Option<f64>,
    pub answered: Option<u32>,
    pub required: Option<u32>,
    pub words: Option<u32>,
    pub sliders: bool,
    pub submitted: bool,
}

impl EvidenceArgs {
    fn into_evidence(self) -> Evidence {
        Evidence {
            watched_percent: self.watched,
            answered_count: self.answered,
            required_count: self.required,
            words_selected: self.words,
            sliders_completed: self.sliders,
            data_submitted: self.submitted,
        }
    }
}

pub fn run(store: &Store, step: &str, args: EvidenceArgs, json: bool) -> anyhow::Result<()> {
    let catalog = store.catalog()?;
    let mut tracker = store.load(&catalog)?;
    let result = tracker.mark_step_completed(step, &args.into_evidence(), &catalog);

    match result {
        Completion::Completed { unlocked } => {
            store.save(&tracker)?;
            if json {
                return print_json(&serde_json::json!({
                    "step": step,
                    "completed": true,
                    "unlocked": unlocked,
                    "currentStepId": tracker.current_step_id(),
                }));
            }
            println!("{step} completed");
            if let Some(label) = catalog
                .step(store.track(), step)
                .and_then(|s| s.next_label.as_deref())
            {
                println!("{label}");
            }
            if let Some(next) = unlocked {
                println!("unlocked: {next}");
            }
            Ok(())
        }
        Completion::AlreadyCompleted => {
            if json {
                return print_json(&serde_json::json!({
                    "step": step,
                    "completed": true,
                    "alreadyCompleted": true,
                }));
            }
            println!("{step} was already completed");
            Ok(())
        }
        Completion::Blocked(blocker) => {
            bail!("cannot complete {step}: {blocker}")
        }
    }
}
