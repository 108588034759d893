//! Adaptive beam skipping.
//!
//! Once the cloud has converged, a beam that most particles cannot explain is
//! more likely an unmapped obstacle than evidence against the cloud. Such
//! beams are dropped from every particle's score for the cycle.
//!
//! ```text
//!              beam 0   beam 1   beam 2  ...
//! particle 0   p, ✓     p, ✗     p, ✓
//! particle 1   p, ✓     p, ✗     p, ✓
//! particle 2   p, ✗     p, ✗     p, ✓
//!              ───────────────────────
//! agree        2/3      0/3      3/3      keep iff agree > beam_skip_threshold
//! ```
//!
//! If too many beams would be skipped the map is probably wrong rather than
//! the environment cluttered, so the cycle falls back to integrating every
//! beam.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::params::BeamSkipParams;
use crate::core::ParticleSample;

/// Which beams survive skipping this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeamMask {
    keep: Vec<bool>,
    skipped: usize,
    fail_open: bool,
}

impl BeamMask {
    /// Per-beam keep flags (all `true` on fail-open).
    pub fn keep(&self) -> &[bool] {
        &self.keep
    }

    /// Beams the agreement test rejected, before any fail-open.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Whether skipping was abandoned for this cycle.
    pub fn fail_open(&self) -> bool {
        self.fail_open
    }
}

/// Reusable particle × beam scratch arena.
///
/// Rows are particles, columns are scored beams. Capacity only grows, doubling
/// in whichever dimension is exceeded.
#[derive(Debug, Clone, Default)]
pub struct BeamSkipTracker {
    max_samples: usize,
    max_beams: usize,
    samples: usize,
    beams: usize,
    probs: Vec<f64>,
    agrees: Vec<bool>,
}

impl BeamSkipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocated (particles, beams).
    pub fn capacity(&self) -> (usize, usize) {
        (self.max_samples, self.max_beams)
    }

    /// Size the arena for this cycle and clear it.
    pub fn reset(&mut self, samples: usize, beams: usize) {
        if samples > self.max_samples || beams > self.max_beams {
            let max_samples = grow(self.max_samples, samples);
            let max_beams = grow(self.max_beams, beams);
            log::debug!(
                "Beam skip arena grown from {}x{} to {}x{}",
                self.max_samples,
                self.max_beams,
                max_samples,
                max_beams
            );
            self.max_samples = max_samples;
            self.max_beams = max_beams;
            self.probs = vec![0.0; max_samples * max_beams];
            self.agrees = vec![false; max_samples * max_beams];
        } else {
            let used = samples * self.max_beams;
            self.probs[..used].fill(0.0);
            self.agrees[..used].fill(false);
        }
        self.samples = samples;
        self.beams = beams;
    }

    /// Fill one row per particle.
    ///
    /// `fill` receives the particle and its row of per-beam probabilities and
    /// agreement flags, each exactly as long as the beam count passed to
    /// [`reset`](Self::reset).
    pub fn record<F>(&mut self, samples: &[ParticleSample], fill: F)
    where
        F: Fn(&ParticleSample, &mut [f64], &mut [bool]) + Sync + Send,
    {
        let rows = samples.len().min(self.samples);
        let (stride, beams) = (self.max_beams, self.beams);
        if rows == 0 || beams == 0 {
            return;
        }
        let probs = &mut self.probs[..rows * stride];
        let agrees = &mut self.agrees[..rows * stride];

        #[cfg(feature = "rayon")]
        probs
            .par_chunks_mut(stride)
            .zip(agrees.par_chunks_mut(stride))
            .zip(samples[..rows].par_iter())
            .for_each(|((p, a), sample)| fill(sample, &mut p[..beams], &mut a[..beams]));

        #[cfg(not(feature = "rayon"))]
        for ((p, a), sample) in probs
            .chunks_mut(stride)
            .zip(agrees.chunks_mut(stride))
            .zip(&samples[..rows])
        {
            fill(sample, &mut p[..beams], &mut a[..beams]);
        }
    }

    /// Decide which beams to keep.
    pub fn mask(&self, params: &BeamSkipParams) -> BeamMask {
        let mut keep = vec![true; self.beams];
        let mut skipped = 0;

        if self.samples > 0 {
            for (beam, flag) in keep.iter_mut().enumerate() {
                let agree = (0..self.samples)
                    .filter(|&row| self.agrees[row * self.max_beams + beam])
                    .count();
                if agree as f64 / self.samples as f64 > params.beam_skip_threshold {
                    *flag = true;
                } else {
                    *flag = false;
                    skipped += 1;
                }
            }
        }

        let fail_open = skipped as f64 >= self.beams as f64 * params.beam_skip_error_threshold;
        if fail_open {
            keep.fill(true);
        }

        BeamMask {
            keep,
            skipped,
            fail_open,
        }
    }

    /// Log-likelihood of one particle over the kept beams.
    pub fn log_likelihood(&self, row: usize, mask: &BeamMask) -> f64 {
        if row >= self.samples {
            return 0.0;
        }
        let start = row * self.max_beams;
        self.probs[start..start + self.beams]
            .iter()
            .zip(&mask.keep)
            .filter(|(_, keep)| **keep)
            .map(|(p, _)| p.ln())
            .sum()
    }
}

fn grow(current: usize, needed: usize) -> usize {
    if needed <= current {
        current
    } else {
        needed.max(current * 2)
    }
}
