use crate::command::{Delegate, ExitCode, TaskCommand};
use crate::config::LaunchConfig;
use crate::env::Environment;
use crate::error::{LaunchError, Result};
use crate::external::find_command_path;
use crate::locate;
use log::{debug, info};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Runs the `start` task of the npm project installed next to the launcher.
///
/// The launcher owns an [`Environment`] snapshot and the resolved install
/// directory; both are computed once and passed down explicitly. A launch is
/// a straight sequence: add the overlay, check the target directory, resolve
/// the task runner, then hand over to the configured [`Delegate`].
///
/// Example
/// ```no_run
/// use www_launcher::Launcher;
/// let launcher = Launcher::from_current_exe().unwrap();
/// let code = launcher.launch().unwrap();
/// std::process::exit(code);
/// ```
pub struct Launcher {
    base_dir: PathBuf,
    env: Environment,
    config: LaunchConfig,
    delegate: Box<dyn Delegate>,
}

impl Launcher {
    /// Create a launcher for an already resolved install directory.
    pub fn new(base_dir: PathBuf, env: Environment, config: LaunchConfig) -> Self {
        let delegate = config.strategy.delegate();
        Self {
            base_dir,
            env,
            config,
            delegate,
        }
    }

    /// Production setup: locate the running executable and snapshot the
    /// process environment.
    pub fn from_current_exe() -> Result<Self> {
        let base_dir = locate::current_base_dir()?;
        info!("launcher installed in {}", base_dir.display());
        Ok(Self::new(
            base_dir,
            Environment::capture(),
            LaunchConfig::default(),
        ))
    }

    /// Replace the delegation strategy picked from the config.
    pub fn with_delegate(mut self, delegate: Box<dyn Delegate>) -> Self {
        self.delegate = delegate;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory the task runs in.
    pub fn target_dir(&self) -> PathBuf {
        self.base_dir.join(&self.config.target_dir)
    }

    /// Build the task invocation without running it.
    ///
    /// Fails when the target directory is missing or the task runner cannot
    /// be found; in both cases nothing has been started.
    pub fn prepare(&self) -> Result<TaskCommand> {
        let mut env = self.env.clone();
        for (key, value) in &self.config.overlay {
            debug!(
                "child env: {}={}",
                key.to_string_lossy(),
                value.to_string_lossy()
            );
            env.set_var(key.clone(), value.clone());
        }

        let target = self.target_dir();
        check_target(&target)?;
        env.current_dir = target;

        let search_paths = env.get_var("PATH").unwrap_or(OsStr::new(""));
        let program = find_command_path(search_paths, &env.current_dir, &self.config.program)
            .ok_or_else(|| LaunchError::TaskRunnerNotFound {
                program: self.config.program.display().to_string(),
            })?
            .into_owned();

        Ok(TaskCommand {
            program,
            args: self.config.args.clone(),
            env,
        })
    }

    /// Prepare the task and delegate to it.
    ///
    /// Returns the task's exit code. With the exec strategy a successful
    /// launch never returns.
    pub fn launch(&self) -> Result<ExitCode> {
        let task = self.prepare()?;
        info!(
            "running `{}` in {} ({})",
            task.display(),
            task.current_dir().display(),
            self.delegate.name()
        );
        let code = self.delegate.delegate(&task)?;
        info!("task exited with code {}", code);
        Ok(code)
    }
}

fn check_target(target: &Path) -> Result<()> {
    match fs::metadata(target) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(LaunchError::TargetNotDirectory {
            path: target.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LaunchError::MissingTarget {
            path: target.to_path_buf(),
        }),
        Err(source) => Err(LaunchError::TargetUnreadable {
            path: target.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;
    use crate::env::{LEGACY_OPENSSL_VALUE, LEGACY_OPENSSL_VAR};
    use std::cell::RefCell;
    use std::collections::{BTreeMap, HashMap};
    use std::ffi::OsString;
    use std::fs::File;
    use std::rc::Rc;

    /// Delegate that records what it would have run.
    struct Recorder {
        calls: Rc<RefCell<Vec<TaskCommand>>>,
        code: ExitCode,
    }

    impl Recorder {
        fn with_handle(code: ExitCode) -> (Box<dyn Delegate>, Rc<RefCell<Vec<TaskCommand>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            let recorder = Recorder {
                calls: calls.clone(),
                code,
            };
            (Box::new(recorder), calls)
        }
    }

    impl Delegate for Recorder {
        fn name(&self) -> &str {
            "record"
        }

        fn delegate(&self, task: &TaskCommand) -> Result<ExitCode> {
            self.calls.borrow_mut().push(task.clone());
            Ok(self.code)
        }
    }

    fn env_with(vars: &[(&str, &str)]) -> Environment {
        let inherited: HashMap<OsString, OsString> = vars
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect();
        Environment {
            inherited,
            overlay: BTreeMap::new(),
            current_dir: PathBuf::from("/"),
        }
    }

    /// Install dir with a `www` subdirectory and a fake `npm` on its own PATH.
    fn install() -> (tempfile::TempDir, PathBuf, Environment) {
        let tmp = tempfile::tempdir().expect("tempdir");
        let base = fs::canonicalize(tmp.path()).expect("canonicalize");
        fs::create_dir(base.join("www")).expect("create www");
        fs::create_dir(base.join("bin")).expect("create bin");
        let npm = base.join("bin").join(crate::config::TASK_RUNNER);
        File::create(&npm).expect("touch npm");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&npm, fs::Permissions::from_mode(0o755)).expect("chmod npm");
        }
        let path = base.join("bin");
        let env = env_with(&[
            ("PATH", path.to_str().expect("utf8 path")),
            ("HOME", "/home/dev"),
        ]);
        (tmp, base, env)
    }

    #[test]
    fn prepare_targets_www_with_overlay() {
        let (_tmp, base, env) = install();
        let launcher = Launcher::new(base.clone(), env, LaunchConfig::default());

        let task = launcher.prepare().expect("prepare");
        assert_eq!(task.current_dir(), base.join("www"));
        assert_eq!(task.program, base.join("bin").join(crate::config::TASK_RUNNER));
        assert_eq!(task.args, vec![OsString::from("run"), OsString::from("start")]);
        assert_eq!(
            task.env.get_var(LEGACY_OPENSSL_VAR),
            Some(OsStr::new(LEGACY_OPENSSL_VALUE))
        );
        assert_eq!(task.env.get_var("HOME"), Some(OsStr::new("/home/dev")));
        // the overlay is additive: the snapshot never gains the variable
        assert!(!task.env.inherited.contains_key(OsStr::new(LEGACY_OPENSSL_VAR)));
    }

    #[test]
    fn missing_www_does_not_delegate() {
        let (_tmp, base, env) = install();
        fs::remove_dir(base.join("www")).expect("remove www");
        let (recorder, calls) = Recorder::with_handle(0);
        let launcher =
            Launcher::new(base.clone(), env, LaunchConfig::default()).with_delegate(recorder);

        match launcher.launch() {
            Err(LaunchError::MissingTarget { path }) => assert_eq!(path, base.join("www")),
            other => panic!("expected MissingTarget, got {:?}", other),
        }
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn www_file_is_rejected() {
        let (_tmp, base, env) = install();
        fs::remove_dir(base.join("www")).expect("remove www");
        File::create(base.join("www")).expect("touch www");
        let (recorder, calls) = Recorder::with_handle(0);
        let launcher = Launcher::new(base, env, LaunchConfig::default()).with_delegate(recorder);

        let err = launcher.launch().unwrap_err();
        assert!(matches!(err, LaunchError::TargetNotDirectory { .. }));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn unreadable_target_keeps_the_io_error() {
        let (_tmp, base, env) = install();
        // a file where the install dir should be: stat fails with ENOTDIR
        let not_a_dir = base.join("launcher");
        File::create(&not_a_dir).expect("touch launcher");
        let (recorder, calls) = Recorder::with_handle(0);
        let launcher =
            Launcher::new(not_a_dir, env, LaunchConfig::default()).with_delegate(recorder);

        let err = launcher.launch().unwrap_err();
        assert!(matches!(err, LaunchError::TargetUnreadable { .. }), "{:?}", err);
        assert!(!err.to_string().contains("does not exist"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.exit_code(), 1);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn stale_runner_earlier_in_path_is_skipped() {
        let (_tmp, base, _) = install();
        let stale = base.join("stale");
        fs::create_dir(&stale).expect("create stale");
        File::create(stale.join("sh")).expect("touch stale sh");
        let path = format!("{}:/bin:/usr/bin", stale.display());
        let launcher = Launcher::new(base, env_with(&[("PATH", path.as_str())]), sh_config("exit 0"));

        assert_eq!(launcher.launch().expect("launch"), 0);
    }

    #[test]
    fn unknown_task_runner_does_not_delegate() {
        let (_tmp, base, _) = install();
        let (recorder, calls) = Recorder::with_handle(0);
        let launcher = Launcher::new(base, env_with(&[("PATH", "")]), LaunchConfig::default())
            .with_delegate(recorder);

        let err = launcher.launch().unwrap_err();
        assert!(matches!(err, LaunchError::TaskRunnerNotFound { .. }));
        assert_eq!(err.exit_code(), 127);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn delegate_code_is_returned() {
        let (_tmp, base, env) = install();
        let (recorder, calls) = Recorder::with_handle(42);
        let launcher = Launcher::new(base, env, LaunchConfig::default()).with_delegate(recorder);

        assert_eq!(launcher.launch().expect("launch"), 42);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn repeated_launches_are_identical() {
        let (_tmp, base, env) = install();
        let (recorder, calls) = Recorder::with_handle(0);
        let launcher = Launcher::new(base, env, LaunchConfig::default()).with_delegate(recorder);

        launcher.launch().expect("first launch");
        launcher.launch().expect("second launch");

        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[cfg(unix)]
    fn sh_config(script: &str) -> LaunchConfig {
        LaunchConfig {
            program: PathBuf::from("sh"),
            args: vec!["-c".into(), script.into()],
            strategy: Strategy::Spawn,
            ..LaunchConfig::default()
        }
    }

    #[test]
    #[cfg(unix)]
    fn child_exit_codes_propagate() {
        let (_tmp, base, _) = install();
        for code in [0, 1, 127] {
            let launcher = Launcher::new(
                base.clone(),
                env_with(&[("PATH", "/bin:/usr/bin")]),
                sh_config(&format!("exit {code}")),
            );
            assert_eq!(launcher.launch().expect("launch"), code);
        }
    }

    #[test]
    #[cfg(unix)]
    fn child_sees_overlay_and_www_as_cwd() {
        let (_tmp, base, _) = install();
        let out = base.join("report.txt");
        let env = env_with(&[
            ("PATH", "/bin:/usr/bin"),
            ("REPORT", out.to_str().expect("utf8 path")),
            ("UNRELATED", "kept"),
        ]);
        let launcher = Launcher::new(
            base.clone(),
            env,
            sh_config(r#"printf '%s\n%s\n%s\n' "$NODE_OPTIONS" "$UNRELATED" "$(pwd -P)" > "$REPORT""#),
        );

        let parent_before = std::env::var_os(LEGACY_OPENSSL_VAR);
        assert_eq!(launcher.launch().expect("launch"), 0);
        assert_eq!(std::env::var_os(LEGACY_OPENSSL_VAR), parent_before);

        let report = fs::read_to_string(&out).expect("read report");
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], LEGACY_OPENSSL_VALUE);
        assert_eq!(lines[1], "kept");
        assert_eq!(Path::new(lines[2]), base.join("www"));
    }
}
