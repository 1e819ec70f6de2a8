//! Run an entry as a Slurm job.
//!
//! The job script comes from a template with a `{target}` placeholder, which
//! is replaced by the bootstrap command for this call's package. How the
//! runner learns that the job ended is a [`Completion`] choice on
//! [`SlurmCli`].

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::assets::Assets;
use crate::entry::Entry;
use crate::error::{Error, ExitInfo, Result};
use crate::package::Package;
use crate::settings::Settings;
use crate::template::{ScriptTemplate, bootstrap_command};

use super::options::SlurmOptions;
use super::scheduler::{JobHandle, JobStatus, Scheduler};
use super::{Launched, Runner, finish, prepare};

/// Poll interval used when a pending job must be waited on and no
/// [`Completion::Poll`] interval was configured.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Consecutive queries without an accounting record before giving up.
const DEFAULT_UNKNOWN_POLL_LIMIT: u32 = 30;

/// Job states after which a job will not run again.
const TERMINAL_STATES: &[&str] = &[
    "COMPLETED",
    "FAILED",
    "CANCELLED",
    "TIMEOUT",
    "OUT_OF_MEMORY",
    "NODE_FAIL",
    "PREEMPTED",
    "BOOT_FAIL",
    "DEADLINE",
    "REVOKED",
];

/// How [`SlurmCli`] detects that a job has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Completion {
    /// `srun <script>`: srun blocks and exits with the job's status.
    #[default]
    Blocking,
    /// `sbatch --parsable --wait <script>`: sbatch blocks until the job ends.
    SubmitWait,
    /// `sbatch --parsable <script>`, then poll `sacct` every `interval`.
    Poll { interval: Duration },
}

/// [`Scheduler`] backed by the Slurm command-line tools.
#[derive(Debug, Clone)]
pub struct SlurmCli {
    options: SlurmOptions,
    completion: Completion,
    unknown_poll_limit: u32,
    srun: PathBuf,
    sbatch: PathBuf,
    sacct: PathBuf,
}

impl SlurmCli {
    pub fn new(options: SlurmOptions) -> Self {
        Self {
            options,
            completion: Completion::default(),
            unknown_poll_limit: DEFAULT_UNKNOWN_POLL_LIMIT,
            srun: PathBuf::from("srun"),
            sbatch: PathBuf::from("sbatch"),
            sacct: PathBuf::from("sacct"),
        }
    }

    pub fn completion(mut self, completion: Completion) -> Self {
        self.completion = completion;
        self
    }

    /// How many queries in a row may find no accounting record for a
    /// submitted job before waiting fails with [`Error::Scheduler`].
    pub fn unknown_poll_limit(mut self, limit: u32) -> Self {
        self.unknown_poll_limit = limit;
        self
    }

    /// Override the `srun`, `sbatch` and `sacct` binaries.
    pub fn binaries(
        mut self,
        srun: impl Into<PathBuf>,
        sbatch: impl Into<PathBuf>,
        sacct: impl Into<PathBuf>,
    ) -> Self {
        self.srun = srun.into();
        self.sbatch = sbatch.into();
        self.sacct = sacct.into();
        self
    }

    pub fn options(&self) -> &SlurmOptions {
        &self.options
    }

    /// Arguments passed before the script path.
    fn submit_args(&self, log: &Path) -> Vec<String> {
        let mut args = Vec::new();
        match self.completion {
            Completion::Blocking => {}
            Completion::SubmitWait => {
                args.push("--parsable".to_string());
                args.push("--wait".to_string());
            }
            Completion::Poll { .. } => args.push("--parsable".to_string()),
        }

        let batch = self.completion != Completion::Blocking;
        if batch && !self.options.contains("output") && !self.options.contains("o") {
            args.push(format!("--output={}", log.display()));
        }

        args.extend(self.options.to_args());
        args
    }

    fn run(&self, program: &Path, args: &[String], script: &Path) -> Result<Output> {
        tracing::debug!("{} {} {}", program.display(), args.join(" "), script.display());

        Command::new(program)
            .args(args)
            .arg(script)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Launch {
                program: program.display().to_string(),
                message: e.to_string(),
            })
    }

    fn poll_interval(&self) -> Duration {
        match self.completion {
            Completion::Poll { interval } => interval,
            _ => DEFAULT_POLL_INTERVAL,
        }
    }

    /// Current `(state, exit)` of a job, `None` while accounting has no record.
    fn query(&self, id: &str, cluster: Option<&str>) -> Result<Option<(String, ExitInfo)>> {
        let mut command = Command::new(&self.sacct);
        if let Some(cluster) = cluster {
            command.args(["-M", cluster]);
        }
        let output = command
            .args(["-j", id, "-X", "-n", "-P", "-o", "State,ExitCode"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Scheduler(format!("failed to run {}: {}", self.sacct.display(), e)))?;

        if !output.status.success() {
            return Err(Error::Scheduler(format!(
                "{} exited with {}: {}",
                self.sacct.display(),
                ExitInfo::from(output.status),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_sacct(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Scheduler for SlurmCli {
    fn submit(&self, script: &Path, log: &Path) -> Result<JobHandle> {
        let args = self.submit_args(log);

        match self.completion {
            Completion::Blocking => {
                let output = self.run(&self.srun, &args, script)?;
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

                if !output.status.success() && srun_rejected(&stderr) {
                    return Err(Error::Launch {
                        program: self.srun.display().to_string(),
                        message: stderr.trim().to_string(),
                    });
                }

                std::fs::write(log, format!("{}{}", stdout, stderr))?;
                let status = JobStatus {
                    exit: output.status.into(),
                    state: None,
                    stdout,
                    stderr,
                };
                Ok(JobHandle::finished(None, log, status))
            }

            Completion::SubmitWait => {
                let output = self.run(&self.sbatch, &args, script)?;
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                let (id, cluster) = parse_job_id(&String::from_utf8_lossy(&output.stdout))
                    .ok_or_else(|| Error::Launch {
                        program: self.sbatch.display().to_string(),
                        message: submission_message(&output, &stderr),
                    })?;

                tracing::info!("Job {} finished", id);
                let status = JobStatus {
                    exit: output.status.into(),
                    state: None,
                    stdout: std::fs::read_to_string(log).unwrap_or_default(),
                    stderr,
                };
                Ok(JobHandle::finished(Some(id), log, status).on_cluster(cluster))
            }

            Completion::Poll { .. } => {
                let output = self.run(&self.sbatch, &args, script)?;
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                let (id, cluster) = parse_job_id(&String::from_utf8_lossy(&output.stdout))
                    .filter(|_| output.status.success())
                    .ok_or_else(|| Error::Launch {
                        program: self.sbatch.display().to_string(),
                        message: submission_message(&output, &stderr),
                    })?;

                Ok(JobHandle::pending(id, log).on_cluster(cluster))
            }
        }
    }

    fn wait(&self, job: &JobHandle) -> Result<JobStatus> {
        if let Some(status) = job.status() {
            return Ok(status.clone());
        }

        let id = job
            .id()
            .ok_or_else(|| Error::Scheduler("pending job without an id".to_string()))?;
        let interval = self.poll_interval();
        let mut unknown = 0;

        loop {
            match self.query(id, job.cluster())? {
                Some((state, exit)) if TERMINAL_STATES.contains(&state.as_str()) => {
                    tracing::info!("Job {} ended in state {}", id, state);
                    return Ok(JobStatus {
                        exit,
                        state: Some(state),
                        stdout: std::fs::read_to_string(job.log()).unwrap_or_default(),
                        stderr: String::new(),
                    });
                }
                Some((state, _)) => {
                    unknown = 0;
                    tracing::debug!("Job {} is {}", id, state);
                }
                None => {
                    unknown += 1;
                    if unknown >= self.unknown_poll_limit {
                        return Err(Error::Scheduler(format!(
                            "job {} has no accounting record after {} queries",
                            id, unknown
                        )));
                    }
                    tracing::debug!("Job {} not in accounting yet", id);
                }
            }
            std::thread::sleep(interval);
        }
    }
}

fn submission_message(output: &Output, stderr: &str) -> String {
    if stderr.trim().is_empty() {
        format!("no job id returned ({})", ExitInfo::from(output.status))
    } else {
        stderr.trim().to_string()
    }
}

/// Job id and cluster from `sbatch --parsable` output (`<id>` or
/// `<id>;<cluster>`).
fn parse_job_id(stdout: &str) -> Option<(String, Option<String>)> {
    let line = stdout.lines().map(str::trim).find(|l| !l.is_empty())?;
    let (id, cluster) = match line.split_once(';') {
        Some((id, cluster)) => (id.trim(), Some(cluster.trim())),
        None => (line, None),
    };
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit() || c == '_') {
        return None;
    }
    let cluster = cluster.filter(|c| !c.is_empty()).map(str::to_string);
    Some((id.to_string(), cluster))
}

/// Parse `sacct -P -o State,ExitCode` output.
fn parse_sacct(stdout: &str) -> Result<Option<(String, ExitInfo)>> {
    let Some(line) = stdout.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return Ok(None);
    };

    let mut fields = line.split('|');
    let state = fields
        .next()
        .and_then(|s| s.split_whitespace().next())
        .ok_or_else(|| Error::Scheduler(format!("unexpected sacct output: {}", line)))?;
    let exit = fields
        .next()
        .ok_or_else(|| Error::Scheduler(format!("unexpected sacct output: {}", line)))?;

    let (code, signal) = exit
        .split_once(':')
        .and_then(|(c, s)| Some((c.trim().parse::<i32>().ok()?, s.trim().parse::<i32>().ok()?)))
        .ok_or_else(|| Error::Scheduler(format!("unexpected exit code in sacct output: {}", exit)))?;

    let exit = if signal != 0 {
        ExitInfo {
            code: None,
            signal: Some(signal),
        }
    } else {
        ExitInfo::code(code)
    };

    Ok(Some((state.to_string(), exit)))
}

/// Whether srun failed before the job ran (allocation or option errors).
///
/// Failures of the job itself are reported by srun as
/// `srun: error: <node>: task <n>: Exited with exit code <c>`.
fn srun_rejected(stderr: &str) -> bool {
    let errors: Vec<&str> = stderr
        .lines()
        .filter(|l| l.trim_start().starts_with("srun: error:"))
        .collect();
    !errors.is_empty() && !errors.iter().any(|l| l.contains("task "))
}

/// Turn a job's final status into what the pipeline expects.
fn to_launched(job: &JobHandle, status: JobStatus) -> Launched {
    let success = status.success();
    let mut exit = status.exit;
    let mut stderr = status.stderr;

    if !success {
        if let Some(state) = &status.state {
            let id = job.id().unwrap_or("?");
            stderr = format!("job {} ended in state {}\n{}", id, state, stderr);
        }
        if exit.success() {
            exit = ExitInfo {
                code: None,
                signal: None,
            };
        }
    }

    Launched {
        status: exit,
        stdout: status.stdout,
        stderr,
    }
}

/// Runs entries as scheduler jobs built from a script template.
#[derive(Debug, Clone)]
pub struct Slurm {
    template: ScriptTemplate,
    program: Option<PathBuf>,
    scheduler: Arc<dyn Scheduler>,
    settings: Settings,
}

/// Decorator running entries as Slurm jobs.
///
/// Fails with [`Error::Template`] if `template` has no `{target}`.
pub fn slurm(options: impl Into<SlurmOptions>, template: &str) -> Result<Slurm> {
    Slurm::new(SlurmCli::new(options.into()), template)
}

impl Slurm {
    /// Use any scheduler with `template`.
    pub fn new(scheduler: impl Scheduler + 'static, template: &str) -> Result<Self> {
        Ok(Self {
            template: ScriptTemplate::new(template)?,
            program: None,
            scheduler: Arc::new(scheduler),
            settings: Settings::from_env(),
        })
    }

    /// Executable placed in `{target}`. Defaults to the current executable.
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn template(&self) -> &ScriptTemplate {
        &self.template
    }

    fn resolve_program(&self) -> Result<PathBuf> {
        match &self.program {
            Some(program) => which::which(program).map_err(|e| Error::Launch {
                program: program.display().to_string(),
                message: format!("not an executable: {}", e),
            }),
            None => std::env::current_exe().map_err(|e| Error::Launch {
                program: "<current executable>".to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn submit_assets(&self, assets: &Assets) -> Result<JobHandle> {
        let program = self.resolve_program()?;
        let script = self
            .template
            .render(&bootstrap_command(&program, &assets.package));
        assets.write_script(&script)?;
        tracing::debug!("Generated job script:\n{}", script);

        let job = self.scheduler.submit(&assets.script, &assets.log)?;
        match job.id() {
            Some(id) => tracing::info!("Submitted job {}", id),
            None => tracing::debug!("Submitted {}", assets.script.display()),
        }
        Ok(job)
    }

    /// Submit `entry(args)` without waiting for the result.
    ///
    /// With [`Completion::Blocking`] submission itself blocks, so the job has
    /// already run when this returns.
    pub fn submit<A, R>(&self, entry: Entry<A, R>, args: A) -> Result<SubmittedJob<R>>
    where
        A: Serialize,
        R: DeserializeOwned,
    {
        let (package, assets) = prepare(self, entry, &args)?;
        let job = self.submit_assets(&assets)?;

        Ok(SubmittedJob {
            job,
            package,
            assets,
            scheduler: Arc::clone(&self.scheduler),
            settings: self.settings.clone(),
            _result: PhantomData,
        })
    }
}

impl Runner for Slurm {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Job scripts and results must be visible from compute nodes, so assets
    /// default to the current directory rather than a node-local temp dir.
    fn default_work_dir(&self) -> PathBuf {
        std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir())
    }

    fn preflight(&self) -> Result<()> {
        self.resolve_program().map(|_| ())
    }

    fn launch(&self, assets: &Assets) -> Result<Launched> {
        let job = self.submit_assets(assets)?;
        let status = self.scheduler.wait(&job)?;
        Ok(to_launched(&job, status))
    }
}

/// A job submitted with [`Slurm::submit`].
///
/// Owns the call's assets until [`SubmittedJob::wait`] returns.
#[derive(Debug)]
pub struct SubmittedJob<R> {
    job: JobHandle,
    package: Package,
    assets: Assets,
    scheduler: Arc<dyn Scheduler>,
    settings: Settings,
    _result: PhantomData<fn() -> R>,
}

impl<R: DeserializeOwned> SubmittedJob<R> {
    pub fn id(&self) -> Option<&str> {
        self.job.id()
    }

    pub fn assets_dir(&self) -> &Path {
        self.assets.path()
    }

    /// Block until the job ends and return its result.
    pub fn wait(self) -> Result<R> {
        let status = self.scheduler.wait(&self.job)?;
        let launched = to_launched(&self.job, status);
        finish(launched, &self.package, self.assets, &self.settings)
    }
}

/// Many submissions of one entry.
#[derive(Debug)]
pub struct JobGroup<R> {
    jobs: Vec<Result<SubmittedJob<R>>>,
}

impl<R: DeserializeOwned> JobGroup<R> {
    /// Submit `entry` once per argument. Failed submissions are kept as errors.
    pub fn submit<A, I>(slurm: &Slurm, entry: Entry<A, R>, args: I) -> Self
    where
        A: Serialize,
        I: IntoIterator<Item = A>,
    {
        let jobs = args
            .into_iter()
            .enumerate()
            .map(|(index, args)| {
                let job = slurm.submit(entry, args);
                match &job {
                    Ok(job) => tracing::info!(
                        "Submitted '{}' #{} as job {}",
                        entry.name(),
                        index,
                        job.id().unwrap_or("?")
                    ),
                    Err(e) => tracing::warn!("Failed to submit '{}' #{}: {}", entry.name(), index, e),
                }
                job
            })
            .collect();

        Self { jobs }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Job ids in submission order; `None` for failed submissions.
    pub fn ids(&self) -> Vec<Option<&str>> {
        self.jobs
            .iter()
            .map(|job| job.as_ref().ok().and_then(|j| j.id()))
            .collect()
    }

    /// Number of submissions that failed.
    pub fn failures(&self) -> usize {
        self.jobs.iter().filter(|job| job.is_err()).count()
    }

    /// Wait for every job, in submission order.
    pub fn wait_all(self) -> Vec<Result<R>> {
        self.jobs
            .into_iter()
            .map(|job| job.and_then(SubmittedJob::wait))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::ResultEnvelope;
    use crate::runner::Decorator;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn answer(_: ()) -> u32 {
        42
    }

    const ANSWER: Entry<(), u32> = Entry::new("test.answer", answer);

    /// Pretends to be a scheduler: reads the package named in the script
    /// and answers it in-process.
    #[derive(Debug, Default)]
    struct FakeScheduler {
        state: Option<&'static str>,
        exit: i32,
        scripts: Mutex<Vec<String>>,
    }

    impl Scheduler for FakeScheduler {
        fn submit(&self, script: &Path, log: &Path) -> Result<JobHandle> {
            let text = fs::read_to_string(script)?;
            self.scripts.lock().unwrap().push(text.clone());

            let package_path = text
                .split('\'')
                .find(|s| s.ends_with("package.json"))
                .expect("package path in script");
            let package = Package::read(Path::new(package_path))?;
            if self.exit == 0 {
                ResultEnvelope {
                    invocation: package.invocation,
                    entry: package.entry.clone(),
                    value: serde_json::json!(42),
                }
                .write(&package.result_path)?;
            }

            let count = self.scripts.lock().unwrap().len();
            Ok(JobHandle::pending(format!("{}", 1000 + count), log))
        }

        fn wait(&self, _job: &JobHandle) -> Result<JobStatus> {
            Ok(JobStatus {
                exit: ExitInfo::code(self.exit),
                state: self.state.map(str::to_string),
                stdout: "job output\n".to_string(),
                stderr: String::new(),
            })
        }
    }

    fn quiet(work: &Path) -> Settings {
        Settings::default().with_work_dir(work).echo_output(false)
    }

    #[test]
    fn test_template_without_target_is_rejected() {
        let err = slurm(SlurmOptions::new(), "#!/bin/bash\necho nothing\n").unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }

    #[test]
    fn test_script_contains_bootstrap_command() {
        let work = TempDir::new().unwrap();
        let runner = Slurm::new(
            FakeScheduler::default(),
            "#!/bin/bash\nmodule load apptainer\n{target}\n",
        )
        .unwrap()
        .program("/bin/sh")
        .with_settings(quiet(work.path()));

        assert_eq!(runner.wrap(ANSWER).call(()).unwrap(), 42);
    }

    #[test]
    fn test_submit_then_wait() {
        let work = TempDir::new().unwrap();
        let scheduler = FakeScheduler {
            state: Some("COMPLETED"),
            ..Default::default()
        };
        let runner = Slurm::new(scheduler, "{target}")
            .unwrap()
            .program("/bin/sh")
            .with_settings(quiet(work.path()));

        let job = runner.submit(ANSWER, ()).unwrap();
        assert_eq!(job.id(), Some("1001"));
        assert!(job.assets_dir().join("job.sh").exists());

        let dir = job.assets_dir().to_path_buf();
        assert_eq!(job.wait().unwrap(), 42);
        assert!(!dir.exists());
    }

    #[test]
    fn test_failed_state_is_runtime_error() {
        let work = TempDir::new().unwrap();
        let scheduler = FakeScheduler {
            state: Some("TIMEOUT"),
            ..Default::default()
        };
        let runner = Slurm::new(scheduler, "{target}")
            .unwrap()
            .program("/bin/sh")
            .with_settings(quiet(work.path()));

        let err = runner.wrap(ANSWER).call(()).unwrap_err();
        match &err {
            Error::Runtime { stderr, stdout, .. } => {
                assert!(stderr.contains("ended in state TIMEOUT"), "{stderr}");
                assert_eq!(stdout, "job output\n");
            }
            other => panic!("Expected Runtime error, got {:?}", other),
        }
    }

    #[test]
    fn test_job_exit_code_reaches_error() {
        let work = TempDir::new().unwrap();
        let scheduler = FakeScheduler {
            state: Some("FAILED"),
            exit: 5,
            ..Default::default()
        };
        let runner = Slurm::new(scheduler, "{target}")
            .unwrap()
            .program("/bin/sh")
            .with_settings(quiet(work.path()));

        let err = runner.wrap(ANSWER).call(()).unwrap_err();
        assert!(err.to_string().contains("exit code 5"));
        assert_eq!(fs::read_dir(work.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let work = TempDir::new().unwrap();
        let runner = Slurm::new(FakeScheduler::default(), "{target}")
            .unwrap()
            .program("/no/such/program")
            .with_settings(quiet(work.path()));

        let err = runner.wrap(ANSWER).call(()).unwrap_err();
        assert!(matches!(err, Error::Launch { .. }));
        assert_eq!(fs::read_dir(work.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_job_group() {
        fn double(x: u32) -> u32 {
            x * 2
        }
        const DOUBLE: Entry<u32, u32> = Entry::new("test.double", double);

        let work = TempDir::new().unwrap();
        let runner = Slurm::new(FakeScheduler::default(), "{target}")
            .unwrap()
            .program("/bin/sh")
            .with_settings(quiet(work.path()));

        let group = JobGroup::submit(&runner, DOUBLE, [1, 2, 3]);
        assert_eq!(group.len(), 3);
        assert_eq!(group.failures(), 0);
        assert_eq!(group.ids(), vec![Some("1001"), Some("1002"), Some("1003")]);

        // the fake always answers 42
        let results: Vec<u32> = group.wait_all().into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(results, vec![42, 42, 42]);
    }

    #[test]
    fn test_submit_args_per_completion() {
        let log = Path::new("/scratch/runwith_x/job.log");
        let options = SlurmOptions::new().partition("short");

        let cli = SlurmCli::new(options.clone());
        assert_eq!(cli.submit_args(log), vec!["--partition=short"]);

        let cli = SlurmCli::new(options.clone()).completion(Completion::SubmitWait);
        assert_eq!(
            cli.submit_args(log),
            vec![
                "--parsable",
                "--wait",
                "--output=/scratch/runwith_x/job.log",
                "--partition=short"
            ]
        );

        let cli = SlurmCli::new(options.set("output", "slurm-%j.out")).completion(Completion::Poll {
            interval: Duration::from_millis(10),
        });
        assert_eq!(
            cli.submit_args(log),
            vec!["--parsable", "--output=slurm-%j.out", "--partition=short"]
        );
    }

    #[test]
    fn test_parse_job_id() {
        assert_eq!(parse_job_id("12345\n"), Some(("12345".to_string(), None)));
        assert_eq!(
            parse_job_id("\n678;cluster-a\n"),
            Some(("678".to_string(), Some("cluster-a".to_string())))
        );
        assert_eq!(parse_job_id("sbatch: error: invalid partition"), None);
        assert_eq!(parse_job_id(""), None);
    }

    #[test]
    fn test_parse_sacct() {
        assert_eq!(parse_sacct("").unwrap(), None);
        assert_eq!(
            parse_sacct("COMPLETED|0:0\n").unwrap(),
            Some(("COMPLETED".to_string(), ExitInfo::code(0)))
        );
        assert_eq!(
            parse_sacct("FAILED|3:0\n").unwrap(),
            Some(("FAILED".to_string(), ExitInfo::code(3)))
        );
        assert_eq!(
            parse_sacct("CANCELLED by 1000|0:15\n").unwrap(),
            Some((
                "CANCELLED".to_string(),
                ExitInfo {
                    code: None,
                    signal: Some(15)
                }
            ))
        );
        assert!(parse_sacct("RUNNING").is_err());
        assert!(parse_sacct("RUNNING|x:y").is_err());
    }

    #[test]
    fn test_srun_rejected() {
        assert!(srun_rejected(
            "srun: error: Unable to allocate resources: Invalid partition name specified\n"
        ));
        assert!(!srun_rejected(
            "srun: error: node01: task 0: Exited with exit code 3\n"
        ));
        assert!(!srun_rejected("thread 'main' panicked\n"));
        assert!(!srun_rejected(""));
    }
}
