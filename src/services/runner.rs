//! Script lifecycle wrapper.
//!
//! Resolves the package root, moves the process into it, runs the caller's
//! task, and prints the start/finish lines.

use super::resolver::RootResolver;
use super::shell::VerbosityControl;
use crate::config::{default_quiet_aliases, ScriptConfig};
use crate::domain::{ActivityKind, QuietFlag, Reporting, RunContext, ScriptContext};
use crate::error::{Result, ScriptError};
use std::future::Future;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

/// Runs script bodies inside their package root
pub struct ScriptRunner<W> {
    resolver: RootResolver,
    quiet_aliases: Vec<String>,
    out: W,
}

impl ScriptRunner<io::Stdout> {
    /// Runner with default settings writing to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ScriptRunner<W> {
    /// Create a runner with default settings
    pub fn new(out: W) -> Self {
        Self {
            resolver: RootResolver::default(),
            quiet_aliases: default_quiet_aliases(),
            out,
        }
    }

    /// Create a runner from loaded configuration
    pub fn from_config(config: &ScriptConfig, out: W) -> Self {
        Self {
            resolver: RootResolver::new(config.resolver.marker.clone()),
            quiet_aliases: config.quiet.aliases.clone(),
            out,
        }
    }

    /// Console writer
    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Run `task` inside the package root found from `ctx.start_dir`.
    ///
    /// Subprocess verbosity is switched off first, whatever the quiet flag
    /// says. The task's error is returned untouched and suppresses the
    /// completion line. The working directory is left at the package root.
    pub async fn run<F, Fut, T, E>(
        &mut self,
        verbosity: &dyn VerbosityControl,
        ctx: &ScriptContext,
        reporting: Reporting,
        task: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<ScriptError>,
    {
        let (run, announce) = self.prepare(verbosity, ctx, reporting)?;

        let start = Instant::now();
        let value = task().await?;

        if let Some(kind) = announce {
            let seconds = elapsed_seconds(start.elapsed());
            self.say(&kind.completion_message(&run.package_name, seconds));
        }

        Ok(value)
    }

    fn prepare(
        &mut self,
        verbosity: &dyn VerbosityControl,
        ctx: &ScriptContext,
        reporting: Reporting,
    ) -> Result<(RunContext, Option<ActivityKind>)> {
        verbosity.set_verbose(false);

        let quiet = QuietFlag::from_args(&ctx.args, &self.quiet_aliases);

        let root = self
            .resolver
            .resolve(&ctx.start_dir)
            .ok_or_else(|| ScriptError::RootNotFound(ctx.start_dir.clone()))?;
        let run = RunContext::new(root);
        tracing::debug!(
            "Package {} at {:?} (quiet: {})",
            run.package_name,
            run.root,
            quiet.is_quiet()
        );

        let announce = if quiet.is_quiet() {
            None
        } else {
            reporting.activity()
        };

        if let Some(kind) = announce {
            self.say(&kind.start_message(&run.package_name));
        }

        std::env::set_current_dir(&run.root).map_err(|source| ScriptError::ChangeDirectory {
            path: run.root.clone(),
            source,
        })?;

        Ok((run, announce))
    }

    /// Status lines are best effort; a closed stdout never fails the script.
    fn say(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|()| self.out.flush()) {
            tracing::warn!("Could not write status line: {}", e);
        }
    }
}

/// Whole seconds, truncated
pub fn elapsed_seconds(elapsed: Duration) -> u64 {
    elapsed.as_secs()
}

/// Run a task for the package that `script_dir` belongs to, with configured
/// settings and the process arguments, printing to stdout.
///
/// `script_dir` is where the script lives; [`script_dir!`](crate::script_dir)
/// gives the calling crate's directory.
pub async fn script<F, Fut, T, E>(
    verbosity: &dyn VerbosityControl,
    script_dir: &Path,
    reporting: Reporting,
    task: F,
) -> std::result::Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: From<ScriptError>,
{
    let config = ScriptConfig::load().map_err(ScriptError::from)?;
    let ctx = ScriptContext::from_script_dir(script_dir);

    let mut runner = ScriptRunner::from_config(&config, io::stdout());
    runner.run(verbosity, &ctx, reporting, task).await
}

/// See [`script`].
pub async fn build_script<F, Fut, T, E>(
    verbosity: &dyn VerbosityControl,
    script_dir: &Path,
    task: F,
) -> std::result::Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: From<ScriptError>,
{
    script(
        verbosity,
        script_dir,
        Reporting::Announce(ActivityKind::Build),
        task,
    )
    .await
}

/// See [`script`].
pub async fn lint_script<F, Fut, T, E>(
    verbosity: &dyn VerbosityControl,
    script_dir: &Path,
    task: F,
) -> std::result::Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: From<ScriptError>,
{
    script(
        verbosity,
        script_dir,
        Reporting::Announce(ActivityKind::Lint),
        task,
    )
    .await
}

/// See [`script`].
pub async fn test_script<F, Fut, T, E>(
    verbosity: &dyn VerbosityControl,
    script_dir: &Path,
    task: F,
) -> std::result::Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: From<ScriptError>,
{
    script(
        verbosity,
        script_dir,
        Reporting::Announce(ActivityKind::Test),
        task,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::shell::Shell;
    use serial_test::serial;
    use std::cell::Cell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    #[derive(Debug, PartialEq)]
    enum TaskError {
        Script(String),
        Failed(&'static str),
    }

    impl From<ScriptError> for TaskError {
        fn from(e: ScriptError) -> Self {
            Self::Script(e.to_string())
        }
    }

    /// Restores the working directory when dropped
    struct CwdGuard(PathBuf);

    impl CwdGuard {
        fn new() -> Self {
            Self(std::env::current_dir().unwrap())
        }
    }

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    fn create_package() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("repo/packages/foo");
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(temp.path().join("repo/package.json"), "{}").unwrap();
        fs::write(root.join("package.json"), r#"{ "name": "foo" }"#).unwrap();
        (temp, root)
    }

    fn context(start: &Path, args: &[&str]) -> ScriptContext {
        ScriptContext::new(start, args.iter().map(|s| s.to_string()).collect())
    }

    fn same_dir(a: &Path, b: &Path) -> bool {
        fs::canonicalize(a).unwrap() == fs::canonicalize(b).unwrap()
    }

    fn output(runner: &ScriptRunner<Vec<u8>>) -> String {
        String::from_utf8(runner.writer().clone()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    #[serial]
    async fn test_build_prints_start_and_finish() {
        let _cwd = CwdGuard::new();
        let (_temp, root) = create_package();
        let shell = Shell::new();
        let mut runner = ScriptRunner::new(Vec::new());

        let result: std::result::Result<(), TaskError> = runner
            .run(
                &shell,
                &context(&root.join("src"), &[]),
                Reporting::Announce(ActivityKind::Build),
                || async {
                    tokio::time::sleep(Duration::from_millis(2500)).await;
                    Ok(())
                },
            )
            .await;

        assert_eq!(result, Ok(()));
        assert_eq!(
            output(&runner),
            "Building: foo\nSuccessfully built foo in 2 seconds.\n"
        );
    }

    #[tokio::test(start_paused = true)]
    #[serial]
    async fn test_elapsed_is_truncated() {
        let _cwd = CwdGuard::new();
        let (_temp, root) = create_package();
        let shell = Shell::new();
        let mut runner = ScriptRunner::new(Vec::new());

        let result: std::result::Result<(), TaskError> = runner
            .run(
                &shell,
                &context(&root, &[]),
                Reporting::Announce(ActivityKind::Lint),
                || async {
                    tokio::time::sleep(Duration::from_millis(999)).await;
                    Ok(())
                },
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(
            output(&runner),
            "Linting: foo\nSuccessfully linted foo in 0 seconds.\n"
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_quiet_runs_task_in_root_without_output() {
        let _cwd = CwdGuard::new();
        let (_temp, root) = create_package();
        let shell = Shell::new();

        for flag in ["quiet", "--quiet", "-q"] {
            let mut runner = ScriptRunner::new(Vec::new());
            let ran = Cell::new(false);

            let cwd: std::result::Result<PathBuf, TaskError> = runner
                .run(
                    &shell,
                    &context(&root.join("src"), &["--fix", flag]),
                    Reporting::Announce(ActivityKind::Test),
                    || async {
                        ran.set(true);
                        Ok(std::env::current_dir().unwrap())
                    },
                )
                .await;

            assert!(ran.get());
            assert!(same_dir(&cwd.unwrap(), &root));
            assert_eq!(output(&runner), "");
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_silent_reporting_prints_nothing() {
        let _cwd = CwdGuard::new();
        let (_temp, root) = create_package();
        let shell = Shell::new();
        let mut runner = ScriptRunner::new(Vec::new());

        let value: std::result::Result<u32, TaskError> = runner
            .run(&shell, &context(&root, &[]), Reporting::Silent, || async {
                Ok(7)
            })
            .await;

        assert_eq!(value, Ok(7));
        assert_eq!(output(&runner), "");
        assert!(same_dir(&std::env::current_dir().unwrap(), &root));
    }

    #[tokio::test]
    #[serial]
    async fn test_task_failure_is_propagated() {
        let _cwd = CwdGuard::new();
        let (_temp, root) = create_package();
        let shell = Shell::new();
        let mut runner = ScriptRunner::new(Vec::new());

        let result: std::result::Result<(), TaskError> = runner
            .run(
                &shell,
                &context(&root, &[]),
                Reporting::Announce(ActivityKind::Build),
                || async { Err(TaskError::Failed("tsc reported 3 errors")) },
            )
            .await;

        assert_eq!(result, Err(TaskError::Failed("tsc reported 3 errors")));
        assert_eq!(output(&runner), "Building: foo\n");
        // The directory change is not undone on failure.
        assert!(same_dir(&std::env::current_dir().unwrap(), &root));
    }

    #[tokio::test]
    #[serial]
    async fn test_root_not_found_skips_task() {
        let _cwd = CwdGuard::new();
        let temp = TempDir::new().unwrap();
        let start = temp.path().join("no/manifest/here");
        fs::create_dir_all(&start).unwrap();

        let shell = Shell::new();
        let config = ScriptConfig {
            resolver: crate::config::ResolverConfig {
                marker: "pkg-script-test-marker.json".to_string(),
            },
            ..ScriptConfig::default()
        };
        let mut runner = ScriptRunner::from_config(&config, Vec::new());
        let ran = Cell::new(false);

        let result: std::result::Result<(), TaskError> = runner
            .run(
                &shell,
                &context(&start, &[]),
                Reporting::Announce(ActivityKind::Build),
                || async {
                    ran.set(true);
                    Ok(())
                },
            )
            .await;

        match result {
            Err(TaskError::Script(message)) => {
                assert!(message.contains(&start.display().to_string()));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!ran.get());
        assert_eq!(output(&runner), "");
    }

    #[tokio::test]
    #[serial]
    async fn test_verbosity_forced_off() {
        let _cwd = CwdGuard::new();
        let (_temp, root) = create_package();
        let shell = Shell::new();
        let captured = shell.clone();
        assert!(shell.is_verbose());

        let mut runner = ScriptRunner::new(Vec::new());
        let verbose_inside: std::result::Result<bool, TaskError> = runner
            .run(&shell, &context(&root, &["quiet"]), Reporting::Silent, || async {
                Ok(captured.is_verbose())
            })
            .await;

        assert_eq!(verbose_inside, Ok(false));
        assert!(!shell.is_verbose());
    }

    #[tokio::test(start_paused = true)]
    #[serial]
    async fn test_repeated_runs_are_independent() {
        let _cwd = CwdGuard::new();
        let (temp, foo) = create_package();
        let repo = temp.path().join("repo");
        let shell = Shell::new();
        let mut runner = ScriptRunner::new(Vec::new());

        let lint: std::result::Result<(), TaskError> = runner
            .run(
                &shell,
                &context(&foo, &[]),
                Reporting::Announce(ActivityKind::Lint),
                || async {
                    tokio::time::sleep(Duration::from_millis(1500)).await;
                    Ok(())
                },
            )
            .await;
        let test: std::result::Result<(), TaskError> = runner
            .run(
                &shell,
                &context(&repo, &[]),
                Reporting::Announce(ActivityKind::Test),
                || async { Ok(()) },
            )
            .await;

        assert!(lint.is_ok() && test.is_ok());
        assert_eq!(
            output(&runner),
            "Linting: foo\nSuccessfully linted foo in 1 seconds.\n\
             Testing: repo\nSuccessfully tested repo in 0 seconds.\n"
        );
    }

    /// Writer whose every write fails, like a closed stdout
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_status_write_failure_keeps_task_result() {
        let _cwd = CwdGuard::new();
        let (_temp, root) = create_package();
        let shell = Shell::new();
        let mut runner = ScriptRunner::new(ClosedPipe);

        let value: std::result::Result<&str, TaskError> = runner
            .run(
                &shell,
                &context(&root, &[]),
                Reporting::Announce(ActivityKind::Build),
                || async { Ok("done") },
            )
            .await;

        assert_eq!(value, Ok("done"));
    }

    #[tokio::test]
    #[serial]
    async fn test_build_script_starts_from_script_dir() {
        let _cwd = CwdGuard::new();
        let (temp, root) = create_package();
        // Run from somewhere unrelated; only the script directory matters.
        std::env::set_current_dir(temp.path()).unwrap();
        let shell = Shell::new();
        let ran = Cell::new(false);

        let cwd: std::result::Result<PathBuf, TaskError> =
            build_script(&shell, &root.join("src"), || async {
                ran.set(true);
                Ok(std::env::current_dir().unwrap())
            })
            .await;

        assert!(ran.get());
        assert!(same_dir(&cwd.unwrap(), &root));
        assert!(!shell.is_verbose());
    }

    #[tokio::test]
    #[serial]
    async fn test_lint_and_test_script_propagate_failure() {
        let _cwd = CwdGuard::new();
        let (_temp, root) = create_package();
        let shell = Shell::new();

        let lint: std::result::Result<(), TaskError> =
            lint_script(&shell, &root, || async { Err(TaskError::Failed("lint")) }).await;
        assert_eq!(lint, Err(TaskError::Failed("lint")));

        let test: std::result::Result<(), TaskError> =
            test_script(&shell, &root, || async { Err(TaskError::Failed("test")) }).await;
        assert_eq!(test, Err(TaskError::Failed("test")));
        assert!(same_dir(&std::env::current_dir().unwrap(), &root));
    }

    #[test]
    fn test_elapsed_seconds() {
        assert_eq!(elapsed_seconds(Duration::from_millis(0)), 0);
        assert_eq!(elapsed_seconds(Duration::from_millis(999)), 0);
        assert_eq!(elapsed_seconds(Duration::from_millis(1000)), 1);
        assert_eq!(elapsed_seconds(Duration::from_millis(2500)), 2);
        assert_eq!(elapsed_seconds(Duration::from_secs(61)), 61);
    }
}
