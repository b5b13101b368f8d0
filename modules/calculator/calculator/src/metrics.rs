//! Prometheus metrics for evaluations.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

/// Which RPC produced an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Stream,
    Batch,
}

impl Mode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stream => "stream",
            Self::Batch => "batch",
        }
    }
}

/// Counters and histograms for completed evaluations, in a private registry.
#[derive(Debug, Clone)]
pub struct EvaluationMetrics {
    registry: Registry,
    evaluations: IntCounterVec,
    tokens: HistogramVec,
}

impl EvaluationMetrics {
    /// # Errors
    /// Returns an error if a metric cannot be registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let evaluations = IntCounterVec::new(
            Opts::new(
                "calculator_evaluations_total",
                "Completed evaluations by mode and gRPC status code",
            ),
            &["mode", "code"],
        )?;
        let tokens = HistogramVec::new(
            HistogramOpts::new(
                "calculator_evaluation_tokens",
                "Tokens received per evaluation",
            )
            .buckets(vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0]),
            &["mode"],
        )?;

        registry.register(Box::new(evaluations.clone()))?;
        registry.register(Box::new(tokens.clone()))?;

        Ok(Self {
            registry,
            evaluations,
            tokens,
        })
    }

    /// Record one finished evaluation.
    #[allow(clippy::use_debug)]
    pub fn observe(&self, mode: Mode, code: tonic::Code, tokens: usize) {
        let code = format!("{code:?}");
        self.evaluations
            .with_label_values(&[mode.as_str(), code.as_str()])
            .inc();
        let tokens = u32::try_from(tokens).unwrap_or(u32::MAX);
        self.tokens
            .with_label_values(&[mode.as_str()])
            .observe(f64::from(tokens));
    }

    /// Render all metrics in the Prometheus text exposition format.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}
