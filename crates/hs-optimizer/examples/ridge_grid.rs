use hs_estimators::{KFold, Metric, MetricScorer, RidgeRegression};
use hs_optimizer::{LogUniform, ParameterGrid, RandomState, SearchConfig, SearchCv};
use hs_types::ParameterSpec;
use ndarray::{array, s, Array1, Array2};
use serde_json::json;

fn synthetic(n: usize) -> (Array2<f64>, Array1<f64>) {
    let x = Array2::from_shape_fn((n, 3), |(i, j)| {
        let t = i as f64 / n as f64;
        match j {
            0 => t,
            1 => (t * 6.0).sin(),
            _ => (i % 5) as f64,
        }
    });
    let noise = Array1::from_shape_fn(n, |i| 0.1 * (i as f64 * 1.7).cos());
    let y = x.dot(&array![4.0, -1.5, 0.2]) + noise;
    (x, y)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hs_optimizer=info".into()),
        )
        .init();

    let (x, y) = synthetic(200);
    let config = SearchConfig::new()
        .with_n_jobs(-1)
        .with_verbose(1)
        .with_random_state(RandomState::Seed(7));

    println!("Exhaustive search");
    let grid = ParameterGrid::from_json(&json!({
        "alpha": [0.001, 0.01, 0.1, 1.0, 10.0],
        "fit_intercept": [true, false],
    }))?;
    let mut search = SearchCv::grid(RidgeRegression::default(), grid)
        .with_cv(KFold::new(5).with_shuffle(Some(7)))
        .with_config(config.clone());
    let outcome = search.fit(&x, Some(&y))?;
    println!("  best params: {}", outcome.best_params());
    println!("  best r2:     {:.4}", outcome.best_score());
    for score in &outcome.candidate_scores {
        println!(
            "  {:<40} {:>8.4} ± {:.4}",
            score.candidate.to_string(),
            score.mean_score,
            score.std_score
        );
    }

    println!("Randomized search");
    let spec = ParameterSpec::new()
        .distribution("alpha", LogUniform::new(1e-4, 1e2)?)
        .values("fit_intercept", [true, false]);
    let mut random = SearchCv::randomized(RidgeRegression::default(), spec, 12)
        .with_cv(KFold::new(5).with_shuffle(Some(7)))
        .with_scorer(MetricScorer::new(Metric::MeanSquaredError))
        .with_config(config);
    let outcome = random.fit(&x, Some(&y))?;
    println!("  best params: {}", outcome.best_params());
    println!("  best -mse:   {:.6}", outcome.best_score());

    let preview = random.predict(&x)?;
    println!("  first predictions: {}", preview.slice(s![..3]));
    println!("{}", serde_json::to_string_pretty(random.status())?);

    Ok(())
}
