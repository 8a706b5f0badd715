//! Given steps for candidate pipeline BDD scenarios.

use super::world::{PipelineWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use synchrohr::pipeline::{
    domain::{ApplicationSource, ScreeningDecision},
    services::SubmitApplicationRequest,
};

#[given(r#"a candidate "{name}" applied with email "{email}""#)]
fn candidate_applied(
    world: &mut PipelineWorld,
    name: String,
    email: String,
) -> Result<(), eyre::Report> {
    let request = SubmitApplicationRequest::new(name, email, "Platform Engineer");
    let application = run_async(world.state.applications.submit(request))
        .wrap_err("submit application for pipeline scenario")?;
    world.application_id = Some(application.id());
    Ok(())
}

#[given("a demo application")]
fn demo_application(world: &mut PipelineWorld) -> Result<(), eyre::Report> {
    let request = SubmitApplicationRequest::new("Demo Candidate", "demo@acme.io", "Designer")
        .with_source(ApplicationSource::Demo);
    let application = run_async(world.state.applications.submit(request))
        .wrap_err("submit demo application")?;
    world.application_id = Some(application.id());
    Ok(())
}

#[given("HR has selected the candidate")]
fn candidate_selected(world: &mut PipelineWorld) -> Result<(), eyre::Report> {
    let id = world.application_id()?;
    let outcome = run_async(world.state.screening.decide(
        id,
        ScreeningDecision::Selected,
        Some("hr@synchrohr.test".to_owned()),
    ))
    .wrap_err("select candidate in scenario setup")?;
    let interview = outcome
        .interview
        .ok_or_else(|| eyre::eyre!("selection should schedule an interview"))?;
    world.secret = Some(interview.secret);
    Ok(())
}

#[given("the candidate has completed the interview")]
fn interview_completed(world: &mut PipelineWorld) -> Result<(), eyre::Report> {
    let secret = world
        .secret
        .clone()
        .ok_or_else(|| eyre::eyre!("missing interview token in scenario world"))?;
    run_async(world.state.completion.complete(&secret))
        .wrap_err("complete interview in scenario setup")?;
    Ok(())
}
