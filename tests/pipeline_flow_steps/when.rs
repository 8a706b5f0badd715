//! When steps for candidate pipeline BDD scenarios.

use super::world::{PipelineWorld, run_async};
use rstest_bdd_macros::when;
use synchrohr::pipeline::domain::ScreeningDecision;

fn decide(world: &mut PipelineWorld, decision: ScreeningDecision) -> Result<(), eyre::Report> {
    let id = world.application_id()?;
    let result = run_async(world.state.screening.decide(id, decision, None));
    if let Ok(outcome) = &result {
        world.secret = outcome
            .interview
            .as_ref()
            .map(|interview| interview.secret.clone());
    }
    world.last_decision = Some(result);
    Ok(())
}

#[when("HR selects the candidate")]
fn hr_selects(world: &mut PipelineWorld) -> Result<(), eyre::Report> {
    decide(world, ScreeningDecision::Selected)
}

#[when("HR rejects the candidate")]
fn hr_rejects(world: &mut PipelineWorld) -> Result<(), eyre::Report> {
    decide(world, ScreeningDecision::Rejected)
}

#[when("the candidate completes the interview with their token")]
fn candidate_completes(world: &mut PipelineWorld) -> Result<(), eyre::Report> {
    let secret = world
        .secret
        .clone()
        .ok_or_else(|| eyre::eyre!("missing interview token in scenario world"))?;
    world.last_completion = Some(run_async(world.state.completion.complete(&secret)));
    Ok(())
}
