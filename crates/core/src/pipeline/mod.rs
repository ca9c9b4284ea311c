//! Build pipeline for the web distribution.
//!
//! Phases run strictly in order, each finishing before the next starts:
//! clean → copy full fonts → subset → registry → CSS → validate → done.

mod clean;
mod steps;
mod validate;

pub use clean::clean;
pub use steps::{PipelineStep, WEB_DIST_STEPS};
pub use validate::{Validation, ValidationWarning, validate};

use std::{
    fmt::{self, Display},
    path::Path,
    time::{Duration, Instant},
};

use anyhow::{Result, ensure};

use crate::{
    config::BuildConfig,
    engine::{FontReader, FontSubsetter, HarfBuzzEngine},
    io::{ArtifactStore, FsStore},
    jobs::JobReport,
    plan::FamilyPlan,
    registry::Registry,
};

const RULE: &str = "════════════════════════════════════════════════════════════";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildPhase {
    CleanAndPrepare,
    CopyFullArtifacts,
    RunSubsetJobs,
    BuildRegistry,
    GenerateCss,
    Validate,
    Done,
}

impl BuildPhase {
    pub const fn next(self) -> Self {
        match self {
            BuildPhase::CleanAndPrepare => BuildPhase::CopyFullArtifacts,
            BuildPhase::CopyFullArtifacts => BuildPhase::RunSubsetJobs,
            BuildPhase::RunSubsetJobs => BuildPhase::BuildRegistry,
            BuildPhase::BuildRegistry => BuildPhase::GenerateCss,
            BuildPhase::GenerateCss => BuildPhase::Validate,
            BuildPhase::Validate | BuildPhase::Done => BuildPhase::Done,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BuildPhase::CleanAndPrepare => "clean",
            BuildPhase::CopyFullArtifacts => "copy-full",
            BuildPhase::RunSubsetJobs => "subset",
            BuildPhase::BuildRegistry => "registry",
            BuildPhase::GenerateCss => "css",
            BuildPhase::Validate => "validate",
            BuildPhase::Done => "done",
        }
    }
}

impl Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State threaded through the pipeline steps.
pub struct BuildContext<'a> {
    pub config: &'a BuildConfig,
    pub reader: &'a dyn FontReader,
    pub subsetter: &'a dyn FontSubsetter,
    pub store: &'a dyn ArtifactStore,
    pub phase: BuildPhase,
    pub copied: usize,
    pub plans: Vec<FamilyPlan>,
    pub report: JobReport,
    pub registry: Registry,
    pub css_written: usize,
    pub validation: Validation,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        config: &'a BuildConfig,
        reader: &'a dyn FontReader,
        subsetter: &'a dyn FontSubsetter,
        store: &'a dyn ArtifactStore,
    ) -> Self {
        Self {
            config,
            reader,
            subsetter,
            store,
            phase: BuildPhase::CleanAndPrepare,
            copied: 0,
            plans: Vec::new(),
            report: JobReport::default(),
            registry: Registry::default(),
            css_written: 0,
            validation: Validation::default(),
        }
    }
}

pub fn run_step(
    step: &PipelineStep,
    step_num: usize,
    total: usize,
    ctx: &mut BuildContext<'_>,
) -> Result<()> {
    let (phase, f) = *step;
    ensure!(ctx.phase == phase, "Phase {phase} cannot run while in phase {}", ctx.phase);

    println!("\n[{step_num}/{total}] {phase}");
    let start = Instant::now();
    f(ctx)?;
    println!("  ✓ {phase} ({:.2}s)", start.elapsed().as_secs_f64());

    ctx.phase = phase.next();
    Ok(())
}

/// Outcome of a finished build.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub copied: usize,
    pub jobs_run: usize,
    pub jobs_succeeded: usize,
    pub jobs_skipped: usize,
    pub registered_slices: usize,
    pub css_written: usize,
    pub validation: Validation,
    pub elapsed: Duration,
}

impl Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = &self.validation;
        writeln!(f, "{RULE}")?;
        writeln!(f, "BUILD COMPLETE")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "  Time: {:.1}s", self.elapsed.as_secs_f64())?;
        writeln!(f, "  Full fonts copied:     {}", self.copied)?;
        writeln!(
            f,
            "  Subset jobs:           {} run, {} succeeded, {} skipped",
            self.jobs_run, self.jobs_succeeded, self.jobs_skipped
        )?;
        writeln!(f, "  CSS files written:     {}", self.css_written)?;
        writeln!(f, "  woff2/:                {} files", v.full_files)?;
        writeln!(f, "  woff2-dynamic-subset/: {} files", v.subset_files)?;
        writeln!(f, "  css/:                  {} files", v.css_files)?;
        write!(f, "  Empty woff2 files:     {}", v.empty_files)?;
        for warning in &v.warnings {
            write!(f, "\n  WARNING: {warning}")?;
        }
        Ok(())
    }
}

/// Runs the whole pipeline with the given capabilities.
pub struct WebDistBuilder<'a> {
    config: &'a BuildConfig,
    reader: &'a dyn FontReader,
    subsetter: &'a dyn FontSubsetter,
    store: &'a dyn ArtifactStore,
}

impl<'a> WebDistBuilder<'a> {
    pub fn new(
        config: &'a BuildConfig,
        reader: &'a dyn FontReader,
        subsetter: &'a dyn FontSubsetter,
        store: &'a dyn ArtifactStore,
    ) -> Self {
        Self { config, reader, subsetter, store }
    }

    pub fn run(&self) -> Result<BuildSummary> {
        self.config.validate()?;
        let start = Instant::now();

        println!("{RULE}");
        println!("Building web distribution");
        println!("{RULE}");

        let mut ctx = BuildContext::new(self.config, self.reader, self.subsetter, self.store);
        let total = WEB_DIST_STEPS.len();
        for (i, step) in WEB_DIST_STEPS.iter().enumerate() {
            run_step(step, i + 1, total, &mut ctx)?;
        }
        ensure!(ctx.phase == BuildPhase::Done, "Pipeline stopped in phase {}", ctx.phase);

        Ok(BuildSummary {
            copied: ctx.copied,
            jobs_run: ctx.report.total(),
            jobs_succeeded: ctx.report.succeeded,
            jobs_skipped: ctx.report.skipped,
            registered_slices: ctx.registry.len(),
            css_written: ctx.css_written,
            validation: ctx.validation,
            elapsed: start.elapsed(),
        })
    }
}

/// Builds `dist/web` under `root` from the fonts in `fonts/woff2`.
pub fn build_web_dist(root: &Path) -> Result<BuildSummary> {
    let config = BuildConfig::new(root);
    let engine = HarfBuzzEngine::new();
    WebDistBuilder::new(&config, &engine, &engine, &FsStore).run()
}
