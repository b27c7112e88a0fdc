//! Numeric power kernels.
//!
//! The analyzer runs its sliding-window work through a [`PowerKernel`]. The
//! portable kernel is the reference; the accelerated kernel precomputes prefix
//! sums and must produce bit-identical outputs. Both take every window sum as
//! the difference of two running totals accumulated in sample order.
//!
//! The kernel is chosen once, when an [`Engine`](crate::engine::Engine) is
//! built, and handed to its consumers.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::smoothing::{NormalizedPowerAccumulator, RollingAverage};
#[cfg(feature = "accelerated")]
use crate::metrics::smoothing::NP_WINDOW_SECS;

/// Sliding-window power computations.
pub trait PowerKernel: Send + Sync + fmt::Debug {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Normalized Power of `watts`, 0 for an empty slice.
    fn normalized_power(&self, watts: &[f64]) -> f64;

    /// Best mean power over any contiguous `window` samples.
    ///
    /// Returns `None` when `window` is 0 or longer than the series.
    fn max_average_power(&self, watts: &[f64], window: usize) -> Option<f64>;
}

/// Which kernel the engine should try to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelPreference {
    /// Accelerated when available, portable otherwise
    #[default]
    Auto,
    /// Always the portable reference kernel
    Portable,
    /// Accelerated kernel requested explicitly (still falls back)
    Accelerated,
}

impl fmt::Display for KernelPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelPreference::Auto => write!(f, "auto"),
            KernelPreference::Portable => write!(f, "portable"),
            KernelPreference::Accelerated => write!(f, "accelerated"),
        }
    }
}

/// Reasons the accelerated kernel could not be initialised.
#[derive(Debug, Error)]
pub enum KernelUnavailable {
    #[error("accelerated kernel not compiled in (enable the `accelerated` feature)")]
    NotCompiled,

    #[error("accelerated kernel self-check failed: {0}")]
    SelfCheckFailed(String),
}

/// Reference kernel built on the streaming smoothing primitives.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableKernel;

impl PowerKernel for PortableKernel {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn normalized_power(&self, watts: &[f64]) -> f64 {
        let mut np = NormalizedPowerAccumulator::new();
        for &w in watts {
            np.add(w);
        }
        np.normalized_power()
    }

    fn max_average_power(&self, watts: &[f64], window: usize) -> Option<f64> {
        if window == 0 || window > watts.len() {
            return None;
        }

        let mut rolling = RollingAverage::new(window);
        let best = watts
            .iter()
            .filter_map(|&w| {
                let avg = rolling.add(w);
                rolling.is_full().then_some(avg)
            })
            .fold(f64::NEG_INFINITY, f64::max);

        Some(best)
    }
}

/// Prefix-sum kernel: O(n) per call.
#[derive(Debug, Clone, Copy)]
pub struct AcceleratedKernel {
    _private: (),
}

impl AcceleratedKernel {
    /// Initialise the accelerated kernel and verify it against the portable one.
    #[cfg(feature = "accelerated")]
    pub fn try_new() -> Result<Self, KernelUnavailable> {
        let kernel = Self { _private: () };
        kernel.self_check()?;
        Ok(kernel)
    }

    #[cfg(not(feature = "accelerated"))]
    pub fn try_new() -> Result<Self, KernelUnavailable> {
        Err(KernelUnavailable::NotCompiled)
    }

    #[cfg(feature = "accelerated")]
    fn self_check(&self) -> Result<(), KernelUnavailable> {
        // Whole-watt and fractional rides with surges, long enough for full windows.
        let whole: Vec<f64> = (0..240u32)
            .map(|i| f64::from(150 + (i * 37) % 200 + if i % 60 < 10 { 300 } else { 0 }))
            .collect();
        let fractional: Vec<f64> = (0..240u32)
            .map(|i| {
                let base = 150.3 + f64::from(i % 50) * 0.7;
                if i % 45 < 8 {
                    base + 412.9
                } else {
                    base
                }
            })
            .collect();

        for series in [&whole, &fractional] {
            self.check_against_reference(series)?;
        }
        Ok(())
    }

    #[cfg(feature = "accelerated")]
    fn check_against_reference(&self, series: &[f64]) -> Result<(), KernelUnavailable> {
        let reference = PortableKernel;

        let (np_fast, np_ref) = (self.normalized_power(series), reference.normalized_power(series));
        if np_fast != np_ref {
            return Err(KernelUnavailable::SelfCheckFailed(format!(
                "normalized power {np_fast} != {np_ref}"
            )));
        }

        for window in [1usize, 5, 30, 60, series.len()] {
            let fast = self.max_average_power(series, window);
            let slow = reference.max_average_power(series, window);
            if fast != slow {
                return Err(KernelUnavailable::SelfCheckFailed(format!(
                    "max average power over {window}s: {fast:?} != {slow:?}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(feature = "accelerated")]
fn prefix_sums(watts: &[f64]) -> Vec<f64> {
    let mut prefix = Vec::with_capacity(watts.len() + 1);
    prefix.push(0.0);
    let mut running = 0.0;
    for &w in watts {
        running += w;
        prefix.push(running);
    }
    prefix
}

#[cfg(feature = "accelerated")]
impl PowerKernel for AcceleratedKernel {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn normalized_power(&self, watts: &[f64]) -> f64 {
        if watts.is_empty() {
            return 0.0;
        }

        let prefix = prefix_sums(watts);
        let sum_fourth_power: f64 = (0..watts.len())
            .map(|i| {
                let start = (i + 1).saturating_sub(NP_WINDOW_SECS);
                let avg = (prefix[i + 1] - prefix[start]) / (i + 1 - start) as f64;
                avg.powi(4)
            })
            .sum();

        (sum_fourth_power / watts.len() as f64).powf(0.25)
    }

    fn max_average_power(&self, watts: &[f64], window: usize) -> Option<f64> {
        if window == 0 || window > watts.len() {
            return None;
        }

        let prefix = prefix_sums(watts);
        let best = (window..=watts.len())
            .map(|end| (prefix[end] - prefix[end - window]) / window as f64)
            .fold(f64::NEG_INFINITY, f64::max);

        Some(best)
    }
}

// Without the feature `try_new` always fails, so this impl only satisfies the
// trait bound; it delegates to the reference implementation.
#[cfg(not(feature = "accelerated"))]
impl PowerKernel for AcceleratedKernel {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn normalized_power(&self, watts: &[f64]) -> f64 {
        PortableKernel.normalized_power(watts)
    }

    fn max_average_power(&self, watts: &[f64], window: usize) -> Option<f64> {
        PortableKernel.max_average_power(watts, window)
    }
}

/// Pick the kernel for `preference`, falling back to the portable kernel
/// whenever the accelerated one cannot be initialised.
pub fn select_kernel(preference: KernelPreference) -> Arc<dyn PowerKernel> {
    if preference == KernelPreference::Portable {
        tracing::info!("Using portable power kernel");
        return Arc::new(PortableKernel);
    }

    match AcceleratedKernel::try_new() {
        Ok(kernel) => {
            tracing::info!(preference = %preference, "Using accelerated power kernel");
            Arc::new(kernel)
        }
        Err(err) => {
            if preference == KernelPreference::Accelerated {
                tracing::warn!(
                    error = %err,
                    "Accelerated kernel unavailable, falling back to portable"
                );
            } else {
                tracing::info!(reason = %err, "Using portable power kernel");
            }
            Arc::new(PortableKernel)
        }
    }
}
