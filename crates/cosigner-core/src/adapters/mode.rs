//! # Mode Detection
//!
//! Two probes tried in fixed order: the host's native context flag, then the
//! `COSIGNER_DRY_RUN` override. Using the override is always logged; if
//! neither answers, detection fails instead of defaulting.

use crate::config::{RunToggles, DRY_RUN_VAR};
use crate::domain::entities::RunMode;
use crate::errors::ConfigError;
use crate::ports::outbound::ModeProbe;
use tracing::{info, warn};

/// Reads the host's broadcast context flag (`true` → proposal).
pub struct NativeDetector {
    flag: Box<dyn Fn() -> Option<bool> + Send + Sync>,
}

impl NativeDetector {
    /// Detector backed by `flag`; `None` means the flag is unavailable.
    pub fn new(flag: impl Fn() -> Option<bool> + Send + Sync + 'static) -> Self {
        Self {
            flag: Box::new(flag),
        }
    }

    /// Detector for hosts without a context flag.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(|| None)
    }
}

impl ModeProbe for NativeDetector {
    fn name(&self) -> &'static str {
        "native"
    }

    fn probe(&self) -> Option<RunMode> {
        (self.flag)().map(|broadcasting| {
            if broadcasting {
                RunMode::Proposal
            } else {
                RunMode::Simulation
            }
        })
    }
}

/// Explicit override (`true` → simulation, `false` → proposal).
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvOverrideDetector {
    dry_run: Option<bool>,
}

impl EnvOverrideDetector {
    /// Override taken from run toggles.
    #[must_use]
    pub fn from_toggles(toggles: &RunToggles) -> Self {
        Self {
            dry_run: toggles.dry_run,
        }
    }
}

impl ModeProbe for EnvOverrideDetector {
    fn name(&self) -> &'static str {
        DRY_RUN_VAR
    }

    fn probe(&self) -> Option<RunMode> {
        self.dry_run.map(|dry| {
            if dry {
                RunMode::Simulation
            } else {
                RunMode::Proposal
            }
        })
    }

    fn is_override(&self) -> bool {
        true
    }
}

/// Ordered list of probes; the first answer wins.
pub struct ModeDetector {
    probes: Vec<Box<dyn ModeProbe>>,
}

impl ModeDetector {
    /// Native flag first, then the override.
    #[must_use]
    pub fn new(native: NativeDetector, fallback: EnvOverrideDetector) -> Self {
        Self {
            probes: vec![Box::new(native), Box::new(fallback)],
        }
    }

    /// Only the override (hosts without a context flag).
    #[must_use]
    pub fn from_toggles(toggles: &RunToggles) -> Self {
        Self::new(
            NativeDetector::unavailable(),
            EnvOverrideDetector::from_toggles(toggles),
        )
    }

    /// A detector that always reports `mode`.
    #[must_use]
    pub fn fixed(mode: RunMode) -> Self {
        Self::new(
            NativeDetector::new(move || Some(mode == RunMode::Proposal)),
            EnvOverrideDetector::default(),
        )
    }

    /// Runs the probes in order.
    pub fn detect(&self) -> Result<RunMode, ConfigError> {
        for probe in &self.probes {
            if let Some(mode) = probe.probe() {
                if probe.is_override() {
                    warn!(source = probe.name(), %mode, "context flag unavailable, mode override applied");
                } else {
                    info!(source = probe.name(), %mode, "run mode detected");
                }
                return Ok(mode);
            }
        }
        Err(ConfigError::ModeUndetermined {
            override_var: DRY_RUN_VAR.to_string(),
        })
    }
}
