use anyhow::Result;
use copula_scengen::scengen::Dataset;
use copula_scengen::scengen::GeneratorConfig;
use copula_scengen::scengen::MarginType;
use copula_scengen::scengen::ScenarioEngine;
use copula_scengen::scengen::ScenarioEngineConfig;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Random 0/1 dataset, the smallest setting where every margin is discrete.
fn generate_binary_dataset(
  rng: &mut StdRng,
  n_samples: usize,
  n_features: usize,
) -> Result<Dataset> {
  let values =
    Array2::from_shape_fn((n_samples, n_features), |_| f64::from(rng.gen_range(0..2_i32)));
  Ok(Dataset::new(values)?)
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let mut rng = StdRng::seed_from_u64(42);
  let dataset = generate_binary_dataset(&mut rng, 1000, 10)?;

  let engine = ScenarioEngine::new(ScenarioEngineConfig {
    n_scenarios: 20,
    generator: GeneratorConfig {
      seed: 42,
      parallel: true,
    },
  });
  // optional override, e.g. `copula-scengen continuous`
  let run = match std::env::args().nth(1) {
    Some(arg) => {
      let margin_type: MarginType = arg.parse()?;
      engine.run_with_types(&dataset, vec![margin_type; dataset.n_margins()])?
    }
    None => engine.run(&dataset)?,
  };

  debug!(ranks = ?run.ranks.ranks(), "copula sample");
  println!("{:?}", run.scenarios.columns());
  for row in run.scenarios.values().rows() {
    println!("{row}");
  }

  Ok(())
}
