//! # Scenario Generator
//!
//! $$
//! s_v^\*=\arg\min_{s\in\mathcal A_v}\sum_{m<j} D_m\big(R_{s,m}\big),\qquad v=1,\dots,N
//! $$
//!
//! Greedy margin-by-margin rank assignment. Margin 0 is the reference and keeps ranks
//! `1..=N` in scenario order. Every later margin `j` hands out ranks `v = 1..N` in turn;
//! each rank goes to the still-available scenario whose ranks on the prior margins
//! produce the smallest total deviation from the empirical pair copulas `C(X_m, X_j)`.
//! Deviations are compared as exact integers, so equal deviations always go to the lowest
//! scenario index.
use std::time::Instant;

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Uniform;
use tracing::debug;
use tracing::info;

use super::dataset::Dataset;
use super::deviation_cache::DeviationCache;
use super::margin::MarginType;
use super::rank_matrix::ScenarioRankMatrix;
use crate::copulas::EmpiricalCopula;
use crate::copulas::RunningCopulaTrack;
use crate::error::Result;
use crate::error::ScengenError;

/// Runtime configuration for [`ScenarioGenerator`].
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
  /// Seed of the jitter applied to discrete margins.
  pub seed: u64,
  /// Compute deviation-cache rows on the rayon pool.
  pub parallel: bool,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self {
      seed: 42,
      parallel: false,
    }
  }
}

/// Position of the first minimum; later equal values never replace it.
pub(crate) fn argmin_first<T, I>(values: I) -> Option<(usize, T)>
where
  T: PartialOrd + Copy,
  I: IntoIterator<Item = T>,
{
  let mut best: Option<(usize, T)> = None;
  for (pos, value) in values.into_iter().enumerate() {
    match best {
      Some((_, current)) if value >= current => {}
      _ => best = Some((pos, value)),
    }
  }
  best
}

/// Assigns copula-matching ranks to every margin of a dataset.
#[derive(Clone, Debug)]
pub struct ScenarioGenerator {
  /// Dataset with discrete margins jittered; used only to estimate pair copulas.
  data: Array2<f64>,
  config: GeneratorConfig,
}

impl ScenarioGenerator {
  /// Prepare a generator. Discrete margins get an independent `Uniform(0, 1)` draw
  /// subtracted from every observation so that ties are broken at random.
  pub fn new(
    dataset: &Dataset,
    margin_types: &[MarginType],
    config: GeneratorConfig,
  ) -> Result<Self> {
    if margin_types.len() != dataset.n_margins() {
      return Err(ScengenError::Shape(format!(
        "expected {} margin types, got {}",
        dataset.n_margins(),
        margin_types.len()
      )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut data = dataset.values().to_owned();
    let n = data.nrows();
    for (mut column, margin_type) in data.axis_iter_mut(Axis(1)).zip(margin_types) {
      if margin_type.is_discrete() {
        let jitter = Array1::random_using(n, Uniform::new(0.0, 1.0), &mut rng);
        column -= &jitter;
      }
    }

    Ok(Self { data, config })
  }

  pub fn config(&self) -> &GeneratorConfig {
    &self.config
  }

  /// Dataset used for copula estimation, after jitter.
  pub fn jittered(&self) -> &Array2<f64> {
    &self.data
  }

  /// Produce an `n_scenarios x d` rank matrix whose columns are permutations of
  /// `1..=n_scenarios`.
  pub fn generate(&self, n_scenarios: usize) -> Result<ScenarioRankMatrix> {
    let started = Instant::now();
    let mut ranks = ScenarioRankMatrix::initialize(n_scenarios)?;

    for margin in 1..self.data.ncols() {
      let margin_started = Instant::now();
      let new_ranks = self.assign_ranks_to_margin(&ranks, margin)?;
      ranks = ranks.extend(new_ranks)?;
      debug!(
        margin,
        elapsed_ms = margin_started.elapsed().as_millis() as u64,
        "assigned ranks to margin"
      );
    }

    info!(
      n_scenarios,
      margins = self.data.ncols(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "generated scenario ranks"
    );
    Ok(ranks)
  }

  fn assign_ranks_to_margin(
    &self,
    ranks: &ScenarioRankMatrix,
    margin: usize,
  ) -> Result<Array1<usize>> {
    let n_scenarios = ranks.n_scenarios();

    let mut tracks = vec![RunningCopulaTrack::new(n_scenarios)?; margin];
    // C(X_prior, X_margin) on the rank grid, fixed for every target rank of this margin
    let grids = (0..margin)
      .map(|prior| {
        EmpiricalCopula::from_columns(self.data.column(prior), self.data.column(margin))?
          .grid(n_scenarios)
      })
      .collect::<Result<Vec<_>>>()?;

    // ascending scenario order; removal keeps it sorted so ties go to the lowest index
    let mut available: Vec<usize> = (0..n_scenarios).collect();
    let mut new_ranks = Array1::<usize>::zeros(n_scenarios);

    for new_rank in 1..=n_scenarios {
      let cache = DeviationCache::compute(&tracks, &grids, new_rank, self.config.parallel)?;

      let deviations = available
        .iter()
        .map(|&scenario| cache.total_numerator(ranks.scenario(scenario)))
        .collect::<Result<Vec<i64>>>()?;
      let (pos, _) = argmin_first(deviations).ok_or_else(|| {
        ScengenError::Range(format!("no scenario left for rank {new_rank}"))
      })?;

      let scenario = available.remove(pos);
      new_ranks[scenario] = new_rank;

      tracks = tracks
        .iter()
        .zip(ranks.scenario(scenario))
        .map(|(track, &prior_rank)| track.assign(prior_rank))
        .collect::<Result<_>>()?;
    }

    Ok(new_ranks)
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;
  use ndarray::Array2;
  use rand::Rng;
  use tracing_test::traced_test;

  use super::*;

  fn is_permutation(column: ndarray::ArrayView1<usize>) -> bool {
    let mut sorted = column.to_vec();
    sorted.sort_unstable();
    sorted == (1..=column.len()).collect::<Vec<_>>()
  }

  fn random_dataset(seed: u64, n: usize) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let values = Array2::from_shape_fn((n, 4), |(_, j)| match j {
      0 => rng.gen_range(-1.0..1.0),
      1 => f64::from(rng.gen_range(0..3_i32)),
      2 => rng.gen_range(0.0..10.0),
      _ => f64::from(rng.gen_range(0..2_i32)),
    });
    Dataset::new(values).unwrap()
  }

  #[test]
  fn argmin_keeps_the_first_minimum() {
    assert_eq!(argmin_first([3.0, 1.0, 2.0, 1.0]), Some((1, 1.0)));
    assert_eq!(argmin_first([0.5, 0.5, 0.5]), Some((0, 0.5)));
    assert_eq!(argmin_first(Vec::<f64>::new()), None);
    assert_eq!(argmin_first([80_i64, 99, 80, 79, 79]), Some((3, 79)));
  }

  /// Stable 0-based ranks of a column.
  fn stable_ranks(column: ndarray::ArrayView1<f64>) -> Vec<i64> {
    let mut order: Vec<usize> = (0..column.len()).collect();
    order.sort_by(|&a, &b| column[a].partial_cmp(&column[b]).unwrap());
    let mut ranks = vec![0; column.len()];
    for (rank, &idx) in order.iter().enumerate() {
      ranks[idx] = rank as i64;
    }
    ranks
  }

  /// Replays every greedy step of `generate` and checks that the chosen scenario is the
  /// lowest-index minimizer of the exact deviation, recomputed from scratch in integers.
  fn assert_lowest_exact_minimizers(data: &Array2<f64>, ranks: &ScenarioRankMatrix) {
    let n = data.nrows() as i64;
    let n_scen = ranks.n_scenarios();
    let big_n = n_scen as i64;
    let r = ranks.ranks();
    let pseudo: Vec<Vec<i64>> = data.axis_iter(Axis(1)).map(stable_ranks).collect();

    for margin in 1..ranks.n_margins() {
      for v in 1..=n_scen {
        let deviation = |candidate: usize| -> i64 {
          (0..margin)
            .map(|prior| {
              (1..=n_scen)
                .map(|i| {
                  let assigned = (0..n_scen)
                    .filter(|&s| r[[s, margin]] < v || s == candidate)
                    .filter(|&s| r[[s, prior]] <= i)
                    .count() as i64;
                  let dominated = (0..data.nrows())
                    .filter(|&t| {
                      pseudo[prior][t] * big_n <= i as i64 * n
                        && pseudo[margin][t] * big_n <= v as i64 * n
                    })
                    .count() as i64;
                  (assigned * n - dominated * big_n).abs()
                })
                .sum::<i64>()
            })
            .sum()
        };

        let chosen = (0..n_scen).find(|&s| r[[s, margin]] == v).unwrap();
        let available: Vec<usize> = (0..n_scen).filter(|&s| r[[s, margin]] >= v).collect();
        let best = available.iter().map(|&s| deviation(s)).min().unwrap();
        let first = available.iter().copied().find(|&s| deviation(s) == best).unwrap();
        assert_eq!(
          chosen, first,
          "margin {margin} rank {v}: chose {chosen}, lowest exact minimizer is {first}"
        );
      }
    }
  }

  #[test]
  fn equal_deviations_go_to_the_lowest_scenario() {
    for seed in 0..15 {
      let mut rng = StdRng::seed_from_u64(seed);
      // coarse values make many copula grid points, and so many deviations, coincide
      let values = Array2::from_shape_fn((12, 3), |_| f64::from(rng.gen_range(0..5_i32)) + 0.5);
      let ds = Dataset::new(values).unwrap();
      let generator = ScenarioGenerator::new(
        &ds,
        &[MarginType::Continuous; 3],
        GeneratorConfig::default(),
      )
      .unwrap();
      let ranks = generator.generate(9).unwrap();
      assert_lowest_exact_minimizers(generator.jittered(), &ranks);
    }

    let ds = random_dataset(17, 14);
    let generator =
      ScenarioGenerator::new(&ds, &ds.classify_margins(), GeneratorConfig::default()).unwrap();
    let ranks = generator.generate(7).unwrap();
    assert_lowest_exact_minimizers(generator.jittered(), &ranks);
  }

  #[test]
  fn fixed_continuous_dataset_gives_known_ranks() {
    let ds = Dataset::new(array![
      [0.3, 2.5, -1.0],
      [1.7, 0.5, 4.0],
      [0.9, 3.5, 2.0],
      [2.4, 1.5, -3.0],
      [1.1, 4.5, 0.5],
      [0.2, 2.0, 1.5],
      [3.1, 0.0, -0.5],
      [1.4, 3.0, 2.5]
    ])
    .unwrap();
    let ranks = ScenarioGenerator::new(&ds, &ds.classify_margins(), GeneratorConfig::default())
      .unwrap()
      .generate(6)
      .unwrap();
    assert_eq!(
      ranks.into_ranks(),
      array![[1usize, 3, 1], [2, 4, 4], [3, 5, 5], [4, 1, 3], [5, 2, 2], [6, 6, 6]]
    );
  }

  #[test]
  fn every_column_is_a_permutation() {
    let ds = random_dataset(3, 40);
    let generator =
      ScenarioGenerator::new(&ds, &ds.classify_margins(), GeneratorConfig::default()).unwrap();
    let ranks = generator.generate(12).unwrap();

    assert_eq!(ranks.n_scenarios(), 12);
    assert_eq!(ranks.n_margins(), 4);
    for column in ranks.ranks().axis_iter(Axis(1)) {
      assert!(is_permutation(column));
    }
  }

  #[test]
  fn same_seed_same_ranks() {
    let ds = random_dataset(5, 30);
    let types = ds.classify_margins();
    let a = ScenarioGenerator::new(&ds, &types, GeneratorConfig::default())
      .unwrap()
      .generate(8)
      .unwrap();
    let b = ScenarioGenerator::new(
      &ds,
      &types,
      GeneratorConfig {
        seed: 42,
        parallel: true,
      },
    )
    .unwrap()
    .generate(8)
    .unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn comonotone_margins_copy_the_reference_ranks() {
    let x = array![3.0, 1.0, 4.0, 1.5, 9.0, 2.6];
    let values = ndarray::stack(
      Axis(1),
      &[x.view(), x.mapv(|v| 2.0 * v + 1.0).view(), x.mapv(|v| v * v).view()],
    )
    .unwrap();
    let ds = Dataset::new(values).unwrap();
    let types = vec![MarginType::Continuous; 3];

    let ranks = ScenarioGenerator::new(&ds, &types, GeneratorConfig::default())
      .unwrap()
      .generate(6)
      .unwrap();
    let reference = array![1usize, 2, 3, 4, 5, 6];
    for column in ranks.ranks().axis_iter(Axis(1)) {
      assert_eq!(column, reference);
    }
  }

  #[test]
  fn jitter_only_touches_discrete_margins() {
    let ds = Dataset::new(array![[1.0, 0.25], [2.0, 0.5], [2.0, 0.75]]).unwrap();
    let generator = ScenarioGenerator::new(
      &ds,
      &[MarginType::Discrete, MarginType::Continuous],
      GeneratorConfig::default(),
    )
    .unwrap();
    let jittered = generator.jittered();

    assert_eq!(jittered.column(1), ds.column(1));
    for (raw, shifted) in ds.column(0).iter().zip(jittered.column(0)) {
      assert!(shifted <= raw && *shifted > raw - 1.0);
    }
  }

  #[test]
  fn single_margin_and_bad_inputs() {
    let ds = Dataset::new(array![[1.0], [2.0], [3.0]]).unwrap();
    let generator =
      ScenarioGenerator::new(&ds, &[MarginType::Continuous], GeneratorConfig::default()).unwrap();
    let ranks = generator.generate(5).unwrap();
    assert_eq!(ranks.n_margins(), 1);
    assert_eq!(ranks.margin(0), array![1usize, 2, 3, 4, 5]);

    assert!(matches!(
      generator.generate(0),
      Err(ScengenError::Range(_))
    ));
    assert!(matches!(
      ScenarioGenerator::new(&ds, &[], GeneratorConfig::default()),
      Err(ScengenError::Shape(_))
    ));
  }

  #[test]
  #[traced_test]
  fn logs_each_margin() {
    let ds = random_dataset(9, 10);
    ScenarioGenerator::new(&ds, &ds.classify_margins(), GeneratorConfig::default())
      .unwrap()
      .generate(4)
      .unwrap();
    assert!(logs_contain("assigned ranks to margin"));
    assert!(logs_contain("generated scenario ranks"));
  }
}
