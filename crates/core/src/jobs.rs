//! Subsetting jobs and their parallel execution.

use std::{
    fmt,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use log::{debug, info, warn};
use rayon::{ThreadPoolBuilder, prelude::*};

use crate::{
    config::BuildConfig,
    engine::FontSubsetter,
    error::SubsetError,
    io::ArtifactStore,
    plan::FamilyPlan,
};

/// Identity of a job: one (family, weight, slice) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobKey {
    pub family: &'static str,
    pub weight: &'static str,
    pub slice: usize,
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.family, self.weight, self.slice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded { bytes: usize },
    /// Only the placeholder glyph survived; nothing was written.
    EmptyResult,
    Error(String),
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded { .. })
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Succeeded { bytes } => write!(f, "ok ({bytes} bytes)"),
            JobOutcome::EmptyResult => f.write_str("no glyphs besides .notdef"),
            JobOutcome::Error(message) => write!(f, "error: {message}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubsetJob {
    pub key: JobKey,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub codepoints: Arc<[u32]>,
    pub outcome: Option<JobOutcome>,
}

/// One job per family × weight × slice, in configuration order.
pub fn build_jobs(config: &BuildConfig, plans: &[FamilyPlan]) -> Vec<SubsetJob> {
    let mut jobs = Vec::new();
    for plan in plans {
        let family = &plan.family;
        for weight in &config.weights {
            let source = config.source_font(family, weight);
            jobs.extend(plan.slices.iter().map(|slice| SubsetJob {
                key: JobKey { family: family.slug, weight: weight.name, slice: slice.index },
                source: source.clone(),
                destination: config.subset_artifact(family, weight, slice.index),
                codepoints: Arc::clone(&slice.codepoints),
                outcome: None,
            }));
        }
    }
    jobs
}

/// Result of a scheduler run.
#[derive(Debug, Default)]
pub struct JobReport {
    /// Jobs in submission order, each with its outcome filled in.
    pub jobs: Vec<SubsetJob>,
    pub succeeded: usize,
    pub skipped: usize,
}

impl JobReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped
    }

    pub fn all_succeeded(&self) -> bool {
        self.skipped == 0
    }

    pub fn outcomes(&self) -> IndexMap<JobKey, &JobOutcome> {
        self.jobs.iter().filter_map(|job| Some((job.key, job.outcome.as_ref()?))).collect()
    }

    pub fn outcome(&self, key: &JobKey) -> Option<&JobOutcome> {
        self.jobs.iter().find(|job| &job.key == key).and_then(|job| job.outcome.as_ref())
    }
}

type SourceCache = IndexMap<PathBuf, Result<Arc<[u8]>, String>>;

/// Runs subsetting jobs on a fixed-size worker pool.
///
/// Each job runs exactly once; nothing is retried. `run` returns only after
/// every job has reported.
pub struct JobScheduler<'a> {
    subsetter: &'a dyn FontSubsetter,
    store: &'a dyn ArtifactStore,
    workers: NonZeroUsize,
}

impl<'a> JobScheduler<'a> {
    pub fn new(
        subsetter: &'a dyn FontSubsetter,
        store: &'a dyn ArtifactStore,
        workers: NonZeroUsize,
    ) -> Self {
        Self { subsetter, store, workers }
    }

    pub fn run(&self, mut jobs: Vec<SubsetJob>) -> Result<JobReport> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers.get())
            .thread_name(|i| format!("subset-{i}"))
            .build()
            .context("Failed to start subsetting workers")?;

        let sources = pool.install(|| self.load_sources(&jobs));

        info!("Running {} subset jobs on {} workers", jobs.len(), self.workers);

        // `collect` keeps submission order regardless of completion order.
        let outcomes: Vec<JobOutcome> =
            pool.install(|| jobs.par_iter().map(|job| self.execute(job, &sources)).collect());

        let mut report = JobReport::default();
        for (job, outcome) in jobs.iter_mut().zip(outcomes) {
            if outcome.is_success() {
                debug!("{} -> {}", job.key, job.destination.display());
                report.succeeded += 1;
            } else {
                warn!("Skipped {}: {outcome}", job.destination.display());
                report.skipped += 1;
            }
            job.outcome = Some(outcome);
        }
        report.jobs = jobs;
        Ok(report)
    }

    /// Reads and prepares every distinct source once, in parallel.
    fn load_sources(&self, jobs: &[SubsetJob]) -> SourceCache {
        let paths: IndexSet<&Path> = jobs.iter().map(|job| job.source.as_path()).collect();
        let paths: Vec<&Path> = paths.into_iter().collect();
        paths
            .par_iter()
            .map(|path| (path.to_path_buf(), self.read_source(path)))
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }

    fn read_source(&self, path: &Path) -> Result<Arc<[u8]>, String> {
        self.store
            .read(path)
            .and_then(|data| self.subsetter.prepare_source(data))
            .map(Arc::from)
            .map_err(|e| format!("{e:#}"))
    }

    fn execute(&self, job: &SubsetJob, sources: &SourceCache) -> JobOutcome {
        let data = match sources.get(&job.source) {
            Some(Ok(data)) => data,
            Some(Err(message)) => return JobOutcome::Error(message.clone()),
            None => return JobOutcome::Error(format!("{} was not loaded", job.source.display())),
        };

        match self.subsetter.subset(data, &job.codepoints) {
            Ok(bytes) => match self.store.write(&job.destination, &bytes) {
                Ok(()) => JobOutcome::Succeeded { bytes: bytes.len() },
                Err(e) => JobOutcome::Error(format!("{e:#}")),
            },
            Err(SubsetError::EmptyResult) => JobOutcome::EmptyResult,
            Err(SubsetError::Failed(e)) => JobOutcome::Error(format!("{e:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::{anyhow, bail};

    use super::*;
    use crate::{
        codepoints::CodepointSet,
        config::{FAMILIES, Weight},
        io::MemoryStore,
        slicer::make_slices,
    };

    /// Upper-cases each source once, then writes the codepoints back as text.
    /// Fails on a marker codepoint or on a source named `broken`.
    #[derive(Default)]
    struct EchoSubsetter {
        prepared: AtomicUsize,
        calls: AtomicUsize,
    }

    impl FontSubsetter for EchoSubsetter {
        fn prepare_source(&self, font_data: Vec<u8>) -> Result<Vec<u8>> {
            self.prepared.fetch_add(1, Ordering::SeqCst);
            if font_data == b"broken" {
                bail!("not a font");
            }
            Ok(font_data.to_ascii_uppercase())
        }

        fn subset(&self, font_data: &[u8], codepoints: &[u32]) -> Result<Vec<u8>, SubsetError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match codepoints.first() {
                Some(0xE000) => Err(SubsetError::EmptyResult),
                Some(0xE100) => Err(SubsetError::Failed(anyhow!("broken glyph"))),
                _ => Ok([font_data, format!("{codepoints:?}").as_bytes()].concat()),
            }
        }
    }

    fn config() -> BuildConfig {
        BuildConfig::new("/root")
            .with_families([FAMILIES[0]])
            .with_weights([Weight::new("Regular", 400), Weight::new("Bold", 700)])
            .with_slice_size(NonZeroUsize::new(2).unwrap())
            .with_workers(NonZeroUsize::new(3).unwrap())
    }

    fn plan(codepoints: &[u32], config: &BuildConfig) -> FamilyPlan {
        let codepoints: CodepointSet = codepoints.iter().copied().collect();
        let slices = make_slices(&codepoints, config.slice_size);
        FamilyPlan { family: config.families[0], codepoints, slices }
    }

    fn seeded_store(config: &BuildConfig) -> MemoryStore {
        let store = MemoryStore::new();
        for weight in &config.weights {
            store.insert(config.source_font(&config.families[0], weight), weight.name.as_bytes());
        }
        store
    }

    fn artifact(config: &BuildConfig, weight: usize, slice: usize) -> PathBuf {
        config.subset_artifact(&config.families[0], &config.weights[weight], slice)
    }

    #[test]
    fn test_build_jobs_one_per_triple() {
        let config = config();
        let jobs = build_jobs(&config, &[plan(&[0x41, 0x42, 0x43], &config)]);

        let keys: Vec<String> = jobs.iter().map(|j| j.key.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "sunghyun-sans/Regular#0",
                "sunghyun-sans/Regular#1",
                "sunghyun-sans/Bold#0",
                "sunghyun-sans/Bold#1",
            ]
        );
        assert_eq!(
            jobs[3].destination,
            Path::new("/root/dist/web/woff2-dynamic-subset/SunghyunSans-Bold.subset.1.woff2")
        );
        assert_eq!(&*jobs[3].codepoints, &[0x43]);
        assert!(jobs.iter().all(|j| j.outcome.is_none()));
    }

    #[test]
    fn test_run_collects_every_outcome() {
        let config = config();
        let store = seeded_store(&config);
        let subsetter = EchoSubsetter::default();
        let codepoints = [0x41, 0x42, 0xE000, 0xE001, 0xE100];
        let jobs = build_jobs(&config, &[plan(&codepoints, &config)]);

        let report = JobScheduler::new(&subsetter, &store, config.workers).run(jobs).unwrap();

        assert_eq!(subsetter.calls.load(Ordering::SeqCst), 6);
        assert_eq!(report.total(), 6);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.skipped, 4);
        assert!(!report.all_succeeded());

        let key = JobKey { family: "sunghyun-sans", weight: "Bold", slice: 1 };
        assert_eq!(report.outcome(&key), Some(&JobOutcome::EmptyResult));
        let key = JobKey { family: "sunghyun-sans", weight: "Bold", slice: 2 };
        assert!(matches!(
            report.outcome(&key),
            Some(JobOutcome::Error(m)) if m.contains("broken glyph")
        ));

        let written = store.get(&artifact(&config, 1, 0));
        assert_eq!(written.as_deref(), Some(&b"BOLD[65, 66]"[..]));
        assert!(!store.exists(&artifact(&config, 1, 1)));
    }

    #[test]
    fn test_each_source_prepared_once() {
        let config = config();
        let store = seeded_store(&config);
        let subsetter = EchoSubsetter::default();
        let codepoints: Vec<u32> = (0x41..0x41 + 9).collect();
        let jobs = build_jobs(&config, &[plan(&codepoints, &config)]);
        assert_eq!(jobs.len(), 10);

        let report = JobScheduler::new(&subsetter, &store, config.workers).run(jobs).unwrap();

        assert_eq!(report.succeeded, 10);
        assert_eq!(subsetter.prepared.load(Ordering::SeqCst), 2);
        assert_eq!(subsetter.calls.load(Ordering::SeqCst), 10);
        assert!(store.get(&artifact(&config, 0, 4)).unwrap().starts_with(b"REGULAR"));
    }

    #[test]
    fn test_unreadable_source_fails_only_its_jobs() {
        let config = config();
        let store = seeded_store(&config);
        store.remove(&config.source_font(&config.families[0], &config.weights[1]));
        let subsetter = EchoSubsetter::default();
        let jobs = build_jobs(&config, &[plan(&[0x41, 0x42, 0x43], &config)]);

        let report = JobScheduler::new(&subsetter, &store, config.workers).run(jobs).unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(subsetter.calls.load(Ordering::SeqCst), 2);
        let outcomes = report.outcomes();
        assert!(
            outcomes
                .iter()
                .filter(|(k, _)| k.weight == "Bold")
                .all(|(_, o)| !o.is_success())
        );
    }

    #[test]
    fn test_unpreparable_source_fails_only_its_jobs() {
        let config = config();
        let store = seeded_store(&config);
        let source = config.source_font(&config.families[0], &config.weights[0]);
        store.insert(source, b"broken".to_vec());
        let subsetter = EchoSubsetter::default();
        let jobs = build_jobs(&config, &[plan(&[0x41, 0x42, 0x43], &config)]);

        let report = JobScheduler::new(&subsetter, &store, config.workers).run(jobs).unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(subsetter.calls.load(Ordering::SeqCst), 2);
        let key = JobKey { family: "sunghyun-sans", weight: "Regular", slice: 0 };
        assert!(matches!(
            report.outcome(&key),
            Some(JobOutcome::Error(m)) if m.contains("not a font")
        ));
    }

    #[test]
    fn test_run_without_jobs() {
        let store = MemoryStore::new();
        let subsetter = EchoSubsetter::default();
        let scheduler = JobScheduler::new(&subsetter, &store, NonZeroUsize::MIN);
        let report = scheduler.run(Vec::new()).unwrap();
        assert_eq!(report.total(), 0);
        assert!(report.all_succeeded());
        assert_eq!(subsetter.prepared.load(Ordering::SeqCst), 0);
    }
}
