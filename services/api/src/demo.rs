use crate::infra::{seed_sample_data, InMemoryStore};
use clap::Args;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use talentflow::error::AppError;
use talentflow::pipeline::{
    AssessmentDraft, AssessmentQuestion, AssessmentSection, CandidateBoard, CandidateFilter,
    ConditionalRule, FixedScorer, JobBoard, NoFaults, QuestionKind, ReconcileError,
    ScriptedFaultPolicy, Stage, SyncEngine,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the assessment upsert/submit portion of the demo.
    #[arg(long)]
    pub(crate) skip_assessment: bool,
}

fn print_board(board: &JobBoard) {
    for job in board.jobs() {
        println!("  [{}] {} ({})", job.order, job.title, job.status.label());
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryStore::default());
    seed_sample_data(store.clone()).await?;

    let engine = SyncEngine::with_scorer(
        store.clone(),
        Arc::new(NoFaults),
        Arc::new(FixedScorer(87)),
    );

    let mut board = JobBoard::load(&engine).await?;
    println!("== Job board ==");
    print_board(&board);

    let bottom = board.jobs().len() - 1;
    println!("\nMoving the top job to the bottom...");
    board.move_job(&engine, 0, bottom).await?;
    print_board(&board);

    println!("\nReplaying a move against a rejecting backend...");
    let scripted = ScriptedFaultPolicy::default();
    scripted.reject_next();
    let flaky_engine = SyncEngine::new(store.clone(), Arc::new(scripted));
    match board.move_job(&flaky_engine, bottom, 0).await {
        Err(ReconcileError::RolledBack { source }) => {
            println!("  rejected ({source}); optimistic splice rolled back:");
            print_board(&board);
        }
        Ok(()) => println!("  move unexpectedly accepted"),
        Err(other) => return Err(other.into()),
    }

    let mut candidates = CandidateBoard::load(&engine, CandidateFilter::default()).await?;
    let applied = candidates
        .candidates()
        .iter()
        .find(|candidate| candidate.stage == Stage::Applied)
        .map(|candidate| (candidate.id.clone(), candidate.name.clone()));

    if let Some((id, name)) = applied {
        println!("\nAdvancing {name} from applied to screen...");
        candidates.move_stage(&engine, &id, Stage::Screen).await?;
        println!("  timeline for {}:", id.0);
        for event in engine.timeline(&id).await? {
            println!(
                "  {}  {}",
                event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                event.event
            );
        }

        if !args.skip_assessment {
            let job_id = board.jobs()[0].id.clone();
            println!("\nPublishing a screening assessment for {}...", job_id.0);
            let assessment = engine
                .upsert_assessment(
                    &job_id,
                    AssessmentDraft {
                        title: "Screening questionnaire".to_string(),
                        description: "Baseline screening for the posting".to_string(),
                        sections: vec![AssessmentSection {
                            id: "s-basics".to_string(),
                            title: "Basics".to_string(),
                            description: None,
                            order: 0,
                            questions: vec![
                                AssessmentQuestion {
                                    id: "q-experience".to_string(),
                                    kind: QuestionKind::Numeric,
                                    question: "Years of relevant experience?".to_string(),
                                    required: true,
                                    options: Vec::new(),
                                    validation: None,
                                    conditional: None,
                                    order: 0,
                                },
                                AssessmentQuestion {
                                    id: "q-remote".to_string(),
                                    kind: QuestionKind::SingleChoice,
                                    question: "Open to remote work?".to_string(),
                                    required: true,
                                    options: vec!["yes".to_string(), "no".to_string()],
                                    validation: None,
                                    conditional: None,
                                    order: 1,
                                },
                                AssessmentQuestion {
                                    id: "q-timezone".to_string(),
                                    kind: QuestionKind::ShortText,
                                    question: "Which timezone do you work from?".to_string(),
                                    required: false,
                                    options: Vec::new(),
                                    validation: None,
                                    conditional: Some(ConditionalRule {
                                        depends_on: "q-remote".to_string(),
                                        show_when: json!("yes"),
                                    }),
                                    order: 2,
                                },
                            ],
                        }],
                    },
                )
                .await?;

            let mut responses = BTreeMap::new();
            responses.insert("q-experience".to_string(), json!(6));
            responses.insert("q-remote".to_string(), json!("yes"));
            responses.insert("q-timezone".to_string(), json!("UTC+1"));
            let receipt = engine.submit_response(&job_id, id, responses).await?;
            println!(
                "  {} submitted against {} scored {}",
                receipt.id.0, assessment.id.0, receipt.score
            );
        }
    }

    Ok(())
}
