//! Particle samples owned by the external filter.
//!
//! The sensor models only ever touch `weight`; poses are read-only here.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::pose::Pose2D;

/// A single particle representing a possible robot pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSample {
    /// Hypothesized robot pose.
    pub pose: Pose2D,
    /// Importance weight (unnormalized, never negative).
    pub weight: f64,
}

impl ParticleSample {
    /// Create a new particle with unit weight.
    pub fn new(pose: Pose2D) -> Self {
        Self { pose, weight: 1.0 }
    }

    /// Create a new particle with specified weight.
    pub fn with_weight(pose: Pose2D, weight: f64) -> Self {
        Self { pose, weight }
    }
}

/// Fixed-size ordered set of particles for one filter cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleSampleSet {
    samples: Vec<ParticleSample>,
    converged: bool,
}

impl ParticleSampleSet {
    pub fn new(samples: Vec<ParticleSample>) -> Self {
        Self {
            samples,
            converged: false,
        }
    }

    /// Uniformly weighted set over the given poses.
    pub fn from_poses(poses: impl IntoIterator<Item = Pose2D>) -> Self {
        let mut samples: Vec<ParticleSample> = poses.into_iter().map(ParticleSample::new).collect();
        let uniform = 1.0 / samples.len().max(1) as f64;
        for s in &mut samples {
            s.weight = uniform;
        }
        Self::new(samples)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn samples(&self) -> &[ParticleSample] {
        &self.samples
    }

    /// Mutable view for the owning filter (resampling, normalization).
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [ParticleSample] {
        &mut self.samples
    }

    /// Whether the filter considers the cloud converged.
    ///
    /// Maintained by the filter; beam skipping only runs on a converged set.
    #[inline]
    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn set_converged(&mut self, converged: bool) {
        self.converged = converged;
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.samples.iter().map(|s| s.weight).sum()
    }

    /// Multiply each weight by `score(index, pose)` and return the new total.
    pub(crate) fn reweight<F>(&mut self, score: F) -> f64
    where
        F: Fn(usize, &Pose2D) -> f64 + Sync + Send,
    {
        #[cfg(feature = "rayon")]
        self.samples
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, s)| s.weight *= score(i, &s.pose));

        #[cfg(not(feature = "rayon"))]
        for (i, s) in self.samples.iter_mut().enumerate() {
            s.weight *= score(i, &s.pose);
        }

        self.total_weight()
    }
}
