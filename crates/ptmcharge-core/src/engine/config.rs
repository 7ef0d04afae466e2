use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Problem-size thresholds on `N = Σ copies` used by the adaptive selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionThresholds {
    /// Enumeration is offered as a ground truth up to this many site copies.
    pub enumeration_max_copies: u64,
    pub exact_max_copies: u64,
    pub fft_max_copies: u64,
    /// Select enumeration outright whenever it is offered and within the combination cap.
    pub prefer_enumeration: bool,
}

impl Default for SelectionThresholds {
    fn default() -> Self {
        Self {
            enumeration_max_copies: 12,
            exact_max_copies: 50,
            fft_max_copies: 200,
            prefer_enumeration: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FftConfig {
    /// Convolutions where either operand is shorter than this use the direct sum.
    pub min_operand_len: usize,
    /// Largest negative round-off magnitude silently clipped to zero.
    pub noise_floor: f64,
}

impl Default for FftConfig {
    fn default() -> Self {
        Self {
            min_operand_len: 64,
            noise_floor: 1e-12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianConfig {
    /// Half-width of the evaluated window in standard deviations.
    pub tail_sigmas: f64,
}

impl Default for GaussianConfig {
    fn default() -> Self {
        Self { tail_sigmas: 6.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericsConfig {
    /// Total-mass drift up to which a result is renormalized rather than rejected.
    pub max_drift: f64,
}

impl Default for NumericsConfig {
    fn default() -> Self {
        Self { max_drift: 1e-9 }
    }
}

/// How closely two aligned distributions agree, judged by their maximum absolute difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Agreement {
    Identical,
    Exact,
    Approximate,
    Divergent,
}

impl std::fmt::Display for Agreement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Agreement::Identical => "identical",
            Agreement::Exact => "exact",
            Agreement::Approximate => "approximate",
            Agreement::Divergent => "divergent",
        };
        f.write_str(label)
    }
}

/// Upper bounds (exclusive) on the maximum absolute difference for each agreement class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgreementBands {
    pub identical: f64,
    pub exact: f64,
    pub approximate: f64,
}

impl Default for AgreementBands {
    fn default() -> Self {
        Self {
            identical: 1e-10,
            exact: 1e-6,
            approximate: 1e-2,
        }
    }
}

impl AgreementBands {
    pub fn classify(&self, max_abs_diff: f64) -> Agreement {
        if max_abs_diff < self.identical {
            Agreement::Identical
        } else if max_abs_diff < self.exact {
            Agreement::Exact
        } else if max_abs_diff < self.approximate {
            Agreement::Approximate
        } else {
            Agreement::Divergent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub selection: SelectionThresholds,
    pub enumeration_max_combinations: u64,
    pub fft: FftConfig,
    pub gaussian: GaussianConfig,
    pub numerics: NumericsConfig,
    pub agreement: AgreementBands,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selection: SelectionThresholds::default(),
            enumeration_max_combinations: 100_000_000,
            fft: FftConfig::default(),
            gaussian: GaussianConfig::default(),
            numerics: NumericsConfig::default(),
            agreement: AgreementBands::default(),
        }
    }
}

/// Builds an [`EngineConfig`], starting from the defaults for every unset value.
#[derive(Default)]
pub struct EngineConfigBuilder {
    enumeration_max_copies: Option<u64>,
    exact_max_copies: Option<u64>,
    fft_max_copies: Option<u64>,
    prefer_enumeration: Option<bool>,
    enumeration_max_combinations: Option<u64>,
    fft_min_operand_len: Option<usize>,
    fft_noise_floor: Option<f64>,
    tail_sigmas: Option<f64>,
    max_drift: Option<f64>,
    agreement: Option<AgreementBands>,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enumeration_max_copies(mut self, n: u64) -> Self {
        self.enumeration_max_copies = Some(n);
        self
    }
    pub fn exact_max_copies(mut self, n: u64) -> Self {
        self.exact_max_copies = Some(n);
        self
    }
    pub fn fft_max_copies(mut self, n: u64) -> Self {
        self.fft_max_copies = Some(n);
        self
    }
    pub fn prefer_enumeration(mut self, prefer: bool) -> Self {
        self.prefer_enumeration = Some(prefer);
        self
    }
    pub fn enumeration_max_combinations(mut self, cap: u64) -> Self {
        self.enumeration_max_combinations = Some(cap);
        self
    }
    pub fn fft_min_operand_len(mut self, len: usize) -> Self {
        self.fft_min_operand_len = Some(len);
        self
    }
    pub fn fft_noise_floor(mut self, floor: f64) -> Self {
        self.fft_noise_floor = Some(floor);
        self
    }
    pub fn tail_sigmas(mut self, k: f64) -> Self {
        self.tail_sigmas = Some(k);
        self
    }
    pub fn max_drift(mut self, drift: f64) -> Self {
        self.max_drift = Some(drift);
        self
    }
    pub fn agreement(mut self, bands: AgreementBands) -> Self {
        self.agreement = Some(bands);
        self
    }

    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let defaults = EngineConfig::default();

        let selection = SelectionThresholds {
            enumeration_max_copies: self
                .enumeration_max_copies
                .unwrap_or(defaults.selection.enumeration_max_copies),
            exact_max_copies: self
                .exact_max_copies
                .unwrap_or(defaults.selection.exact_max_copies),
            fft_max_copies: self
                .fft_max_copies
                .unwrap_or(defaults.selection.fft_max_copies),
            prefer_enumeration: self
                .prefer_enumeration
                .unwrap_or(defaults.selection.prefer_enumeration),
        };
        if selection.enumeration_max_copies > selection.exact_max_copies {
            return Err(invalid(
                "enumeration_max_copies",
                format!(
                    "{} exceeds exact_max_copies ({})",
                    selection.enumeration_max_copies, selection.exact_max_copies
                ),
            ));
        }
        if selection.exact_max_copies > selection.fft_max_copies {
            return Err(invalid(
                "exact_max_copies",
                format!(
                    "{} exceeds fft_max_copies ({})",
                    selection.exact_max_copies, selection.fft_max_copies
                ),
            ));
        }

        let enumeration_max_combinations = self
            .enumeration_max_combinations
            .unwrap_or(defaults.enumeration_max_combinations);
        if enumeration_max_combinations == 0 {
            return Err(invalid(
                "enumeration_max_combinations",
                "must be positive".to_string(),
            ));
        }

        let fft = FftConfig {
            min_operand_len: self
                .fft_min_operand_len
                .unwrap_or(defaults.fft.min_operand_len),
            noise_floor: self.fft_noise_floor.unwrap_or(defaults.fft.noise_floor),
        };
        if fft.min_operand_len == 0 {
            return Err(invalid("fft_min_operand_len", "must be at least 1".to_string()));
        }
        require_non_negative("fft_noise_floor", fft.noise_floor)?;

        let gaussian = GaussianConfig {
            tail_sigmas: self.tail_sigmas.unwrap_or(defaults.gaussian.tail_sigmas),
        };
        require_positive("tail_sigmas", gaussian.tail_sigmas)?;

        let numerics = NumericsConfig {
            max_drift: self.max_drift.unwrap_or(defaults.numerics.max_drift),
        };
        require_positive("max_drift", numerics.max_drift)?;

        let agreement = self.agreement.unwrap_or(defaults.agreement);
        require_non_negative("agreement.identical", agreement.identical)?;
        require_non_negative("agreement.exact", agreement.exact)?;
        require_non_negative("agreement.approximate", agreement.approximate)?;
        if !(agreement.identical <= agreement.exact && agreement.exact <= agreement.approximate) {
            return Err(invalid(
                "agreement",
                "bands must satisfy identical <= exact <= approximate".to_string(),
            ));
        }

        Ok(EngineConfig {
            selection,
            enumeration_max_combinations,
            fft,
            gaussian,
            numerics,
            agreement,
        })
    }
}

fn invalid(name: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidParameter { name, reason }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, format!("must be a positive finite number, got {}", value)))
    }
}

fn require_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(name, format!("must be a non-negative finite number, got {}", value)))
    }
}
