//! Pipeline step definitions.

use anyhow::{Context, Result};
use log::info;

use super::{BuildContext, BuildPhase, clean::clean, validate::validate};
use crate::{
    css::FamilyStylesheets,
    jobs::{JobScheduler, build_jobs},
    plan::plan_families,
    registry::Registry,
};

pub type PipelineStep = (BuildPhase, fn(&mut BuildContext<'_>) -> Result<()>);

/// Every phase before `Done`, in execution order.
pub const WEB_DIST_STEPS: &[PipelineStep] = &[
    (BuildPhase::CleanAndPrepare, step_clean),
    (BuildPhase::CopyFullArtifacts, step_copy_full),
    (BuildPhase::RunSubsetJobs, step_subset),
    (BuildPhase::BuildRegistry, step_registry),
    (BuildPhase::GenerateCss, step_css),
    (BuildPhase::Validate, step_validate),
];

fn step_clean(ctx: &mut BuildContext<'_>) -> Result<()> {
    clean(ctx.config, ctx.store)
}

fn step_copy_full(ctx: &mut BuildContext<'_>) -> Result<()> {
    let config = ctx.config;
    let sources = ctx.store.list(&config.source_dir, &config.source_extension)?;
    let full_dir = config.full_dir();

    for source in &sources {
        let name = source
            .file_name()
            .with_context(|| format!("Invalid font path: {}", source.display()))?;
        ctx.store.copy(source, &full_dir.join(name))?;
    }

    ctx.copied = sources.len();
    println!("  Copied {} files to {}", ctx.copied, full_dir.display());
    Ok(())
}

fn step_subset(ctx: &mut BuildContext<'_>) -> Result<()> {
    let plans = plan_families(ctx.config, ctx.reader, ctx.store)?;
    for plan in &plans {
        println!(
            "  {}: {} codepoints -> {} slices",
            plan.family.slug,
            plan.codepoints.len(),
            plan.slices.len()
        );
    }

    let jobs = build_jobs(ctx.config, &plans);
    println!("  Total subset jobs: {} ({} workers)", jobs.len(), ctx.config.workers);

    let report = JobScheduler::new(ctx.subsetter, ctx.store, ctx.config.workers).run(jobs)?;
    println!("  Subsets created: {}", report.succeeded);
    println!("  Empty slices skipped: {}", report.skipped);

    ctx.plans = plans;
    ctx.report = report;
    Ok(())
}

fn step_registry(ctx: &mut BuildContext<'_>) -> Result<()> {
    let registry = Registry::build(ctx.config, &ctx.plans, ctx.store, Some(&ctx.report));
    info!("Registered {} of {} subset jobs", registry.len(), ctx.report.total());
    ctx.registry = registry;
    Ok(())
}

fn step_css(ctx: &mut BuildContext<'_>) -> Result<()> {
    for plan in &ctx.plans {
        let sheets = FamilyStylesheets::generate(ctx.config, plan, &ctx.registry);
        let files = sheets.files(ctx.config, &plan.family);
        for (path, content) in &files {
            ctx.store.write(path, content.as_bytes())?;
        }
        ctx.css_written += files.len();
        println!("  {}: {} CSS files", plan.family.slug, files.len());
    }
    println!("  Total CSS files: {}", ctx.css_written);
    Ok(())
}

fn step_validate(ctx: &mut BuildContext<'_>) -> Result<()> {
    ctx.validation = validate(ctx.config, ctx.store);
    Ok(())
}
