/* 📖 # How is the hosting runtime detected?

Detection probes in a fixed order and stops at the first match:
1. `VSCODE_PID` is set and non-empty: running inside an editor extension host (`Code`)
2. an embedding engine registered itself on the probe: that engine's runtime
3. compiled for the browser (`wasm32`): `Dom`
4. otherwise a plain process (`Native`)

The platform follows from the runtime. Processes map the OS name reported by the
standard library, engines are asked through `EngineHost::platform` (any failure
there means `Unknown`), and the browser is always `Browser`.

The process-wide result lives in a `OnceLock`. Components take an `&Environment`
so tests can hand them any classification they like.
*/

mod app_info;

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::{EfxError, EfxResult, ErrorKind};

pub use app_info::{AppInfo, UNKNOWN, default_roots, resolve_local_path};

/// Which host the code runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeType {
    /// A plain operating system process.
    Native,
    /// An editor extension host.
    Code,
    Cocos,
    Unity,
    Unreal,
    /// A browser page.
    Dom,
}

impl RuntimeType {
    pub fn name(self) -> &'static str {
        match self {
            RuntimeType::Native => "Native",
            RuntimeType::Code => "Code",
            RuntimeType::Cocos => "Cocos",
            RuntimeType::Unity => "Unity",
            RuntimeType::Unreal => "Unreal",
            RuntimeType::Dom => "Dom",
        }
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which operating system or platform the host runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformType {
    Unknown,
    Windows,
    Linux,
    MacOS,
    Android,
    Ios,
    Browser,
}

impl PlatformType {
    pub fn name(self) -> &'static str {
        match self {
            PlatformType::Unknown => "Unknown",
            PlatformType::Windows => "Windows",
            PlatformType::Linux => "Linux",
            PlatformType::MacOS => "MacOS",
            PlatformType::Android => "Android",
            PlatformType::Ios => "iOS",
            PlatformType::Browser => "Browser",
        }
    }

    /// Maps an OS name as reported by `std::env::consts::OS`.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => PlatformType::Windows,
            "macos" => PlatformType::MacOS,
            "linux" => PlatformType::Linux,
            "android" => PlatformType::Android,
            "ios" => PlatformType::Ios,
            _ => PlatformType::Unknown,
        }
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bridge to a game engine that embeds this library.
pub trait EngineHost: fmt::Debug + Send + Sync {
    /// The runtime this engine is reported as.
    fn runtime(&self) -> RuntimeType;

    /// Asks the engine for its platform. Errors are treated as `Unknown`.
    fn platform(&self) -> EfxResult<PlatformType>;

    /// Directory the engine lets the application write to.
    fn writable_path(&self) -> Option<String> {
        None
    }

    /// Product information known to the engine.
    fn app_info(&self) -> Option<AppInfo> {
        None
    }
}

/// Source of the markers runtime detection looks at.
pub trait HostProbe {
    fn var(&self, key: &str) -> Option<String>;

    fn os(&self) -> String;

    fn is_browser(&self) -> bool;

    fn engine(&self) -> Option<Arc<dyn EngineHost>>;
}

/// Probe reading the markers of the current process.
#[derive(Debug, Clone, Default)]
pub struct ProcessProbe {
    engine: Option<Arc<dyn EngineHost>>,
}

impl ProcessProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe for a process embedded in the given engine.
    pub fn with_engine(engine: impl EngineHost + 'static) -> Self {
        Self {
            engine: Some(Arc::new(engine)),
        }
    }
}

impl HostProbe for ProcessProbe {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn os(&self) -> String {
        std::env::consts::OS.to_string()
    }

    fn is_browser(&self) -> bool {
        cfg!(target_arch = "wasm32")
    }

    fn engine(&self) -> Option<Arc<dyn EngineHost>> {
        self.engine.clone()
    }
}

static CURRENT: OnceLock<Environment> = OnceLock::new();

/// The runtime and platform classification of a host.
#[derive(Debug, Clone)]
pub struct Environment {
    runtime: RuntimeType,
    platform: PlatformType,
    engine: Option<Arc<dyn EngineHost>>,
}

impl Environment {
    /// An explicit classification, mostly for tests and embedding hosts.
    pub fn new(runtime: RuntimeType, platform: PlatformType) -> Self {
        Self {
            runtime,
            platform,
            engine: None,
        }
    }

    /// Attaches the engine bridge queried for writable paths and app info.
    pub fn with_engine(mut self, engine: Arc<dyn EngineHost>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Classifies the host described by `probe`.
    pub fn detect(probe: &dyn HostProbe) -> Self {
        let engine = probe.engine();
        let runtime = if probe.var("VSCODE_PID").is_some_and(|pid| !pid.is_empty()) {
            RuntimeType::Code
        } else if let Some(engine) = &engine {
            engine.runtime()
        } else if probe.is_browser() {
            RuntimeType::Dom
        } else {
            RuntimeType::Native
        };

        let platform = match runtime {
            RuntimeType::Native | RuntimeType::Code => PlatformType::from_os(&probe.os()),
            RuntimeType::Dom => PlatformType::Browser,
            RuntimeType::Cocos | RuntimeType::Unity | RuntimeType::Unreal => match &engine {
                Some(engine) => engine.platform().unwrap_or_else(|e| {
                    debug!(error = %e, "engine platform probe failed");
                    PlatformType::Unknown
                }),
                None => PlatformType::Unknown,
            },
        };

        debug!(%runtime, %platform, "detected environment");
        Self {
            runtime,
            platform,
            engine,
        }
    }

    /// The classification of the current process, detected on first use.
    pub fn current() -> &'static Environment {
        CURRENT.get_or_init(|| Self::detect(&ProcessProbe::new()))
    }

    /// Installs the process-wide classification from `probe`.
    ///
    /// Fails once the classification has been set, including by an earlier
    /// call to [`Environment::current`].
    pub fn initialize(probe: &dyn HostProbe) -> EfxResult<&'static Environment> {
        CURRENT
            .set(Self::detect(probe))
            .map_err(|_| crate::err!("Environment is already initialized"))?;
        CURRENT
            .get()
            .ok_or_else(|| crate::err!("Environment is not initialized"))
    }

    pub fn runtime(&self) -> RuntimeType {
        self.runtime
    }

    pub fn platform(&self) -> PlatformType {
        self.platform
    }

    pub fn engine(&self) -> Option<&Arc<dyn EngineHost>> {
        self.engine.as_ref()
    }

    /// A general purpose process, plain or editor-hosted.
    pub fn is_node(&self) -> bool {
        matches!(self.runtime, RuntimeType::Native | RuntimeType::Code)
    }

    pub fn is_code(&self) -> bool {
        self.runtime == RuntimeType::Code
    }

    pub fn is_cocos(&self) -> bool {
        self.runtime == RuntimeType::Cocos
    }

    pub fn is_unity(&self) -> bool {
        self.runtime == RuntimeType::Unity
    }

    pub fn is_unreal(&self) -> bool {
        self.runtime == RuntimeType::Unreal
    }

    /// Anything that is not a browser.
    pub fn is_native(&self) -> bool {
        self.platform != PlatformType::Browser
    }

    pub fn is_browser(&self) -> bool {
        self.platform == PlatformType::Browser
    }

    /// The error for an operation with no implementation on this host.
    pub fn unsupported(&self) -> Box<EfxError> {
        Box::new(EfxError::new(ErrorKind::Unsupported {
            runtime: self.runtime.to_string(),
            platform: self.platform.to_string(),
        }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    pub(crate) struct FakeProbe {
        pub vars: HashMap<String, String>,
        pub os: String,
        pub browser: bool,
        pub engine: Option<Arc<dyn EngineHost>>,
    }

    impl HostProbe for FakeProbe {
        fn var(&self, key: &str) -> Option<String> {
            self.vars.get(key).cloned()
        }

        fn os(&self) -> String {
            self.os.clone()
        }

        fn is_browser(&self) -> bool {
            self.browser
        }

        fn engine(&self) -> Option<Arc<dyn EngineHost>> {
            self.engine.clone()
        }
    }

    #[derive(Debug)]
    pub(crate) struct FakeEngine {
        pub runtime: RuntimeType,
        pub platform: Option<PlatformType>,
        pub writable: Option<String>,
    }

    impl EngineHost for FakeEngine {
        fn runtime(&self) -> RuntimeType {
            self.runtime
        }

        fn platform(&self) -> EfxResult<PlatformType> {
            self.platform
                .ok_or_else(|| crate::err!("system info is not available"))
        }

        fn writable_path(&self) -> Option<String> {
            self.writable.clone()
        }
    }

    fn probe_with_os(os: &str) -> FakeProbe {
        FakeProbe {
            os: os.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_native_process() {
        let env = Environment::detect(&probe_with_os("linux"));
        assert_eq!(env.runtime(), RuntimeType::Native);
        assert_eq!(env.platform(), PlatformType::Linux);
        assert!(env.is_node());
        assert!(env.is_native());
        assert!(!env.is_code());
        assert!(!env.is_browser());
    }

    #[test]
    fn test_os_mapping() {
        let cases = [
            ("windows", PlatformType::Windows),
            ("macos", PlatformType::MacOS),
            ("linux", PlatformType::Linux),
            ("android", PlatformType::Android),
            ("ios", PlatformType::Ios),
            ("freebsd", PlatformType::Unknown),
        ];
        for (os, expected) in cases {
            assert_eq!(Environment::detect(&probe_with_os(os)).platform(), expected, "{}", os);
        }
    }

    #[test]
    fn test_editor_host_wins_over_everything() {
        let mut probe = probe_with_os("windows");
        probe.vars.insert("VSCODE_PID".into(), "4242".into());
        probe.browser = true;
        probe.engine = Some(Arc::new(FakeEngine {
            runtime: RuntimeType::Cocos,
            platform: Some(PlatformType::Android),
            writable: None,
        }));

        let env = Environment::detect(&probe);

        assert_eq!(env.runtime(), RuntimeType::Code);
        assert_eq!(env.platform(), PlatformType::Windows);
        assert!(env.is_code());
        assert!(env.is_node());
    }

    #[test]
    fn test_empty_editor_pid_is_ignored() {
        let mut probe = probe_with_os("linux");
        probe.vars.insert("VSCODE_PID".into(), String::new());
        assert_eq!(Environment::detect(&probe).runtime(), RuntimeType::Native);
    }

    #[test]
    fn test_engine_platform() {
        let mut probe = probe_with_os("linux");
        probe.engine = Some(Arc::new(FakeEngine {
            runtime: RuntimeType::Unity,
            platform: Some(PlatformType::Ios),
            writable: None,
        }));

        let env = Environment::detect(&probe);

        assert_eq!(env.runtime(), RuntimeType::Unity);
        assert_eq!(env.platform(), PlatformType::Ios);
        assert!(env.is_unity());
        assert!(!env.is_node());
        assert!(env.engine().is_some());
    }

    #[test]
    fn test_failing_engine_probe_is_unknown() {
        let mut probe = probe_with_os("linux");
        probe.engine = Some(Arc::new(FakeEngine {
            runtime: RuntimeType::Unreal,
            platform: None,
            writable: None,
        }));

        let env = Environment::detect(&probe);

        assert_eq!(env.runtime(), RuntimeType::Unreal);
        assert_eq!(env.platform(), PlatformType::Unknown);
        assert!(env.is_unreal());
    }

    #[test]
    fn test_browser() {
        let mut probe = probe_with_os("linux");
        probe.browser = true;

        let env = Environment::detect(&probe);

        assert_eq!(env.runtime(), RuntimeType::Dom);
        assert_eq!(env.platform(), PlatformType::Browser);
        assert!(env.is_browser());
        assert!(!env.is_native());
        assert!(!env.is_node());
    }

    #[test]
    fn test_unsupported_error() {
        let env = Environment::new(RuntimeType::Cocos, PlatformType::Android);
        let error = env.unsupported();
        assert_eq!(
            error.to_string(),
            "Unsupported runtime: Cocos on platform: Android"
        );
    }

    #[test]
    fn test_current_is_memoized() {
        let first = Environment::current();
        let second = Environment::current();
        assert!(std::ptr::eq(first, second));
        assert!(Environment::initialize(&probe_with_os("linux")).is_err());
    }

    #[test]
    fn test_current_process_is_not_a_browser() {
        let env = Environment::detect(&ProcessProbe::new());
        assert!(env.is_native());
        assert!(env.is_node());
        assert_eq!(env.platform(), PlatformType::from_os(std::env::consts::OS));
    }
}
