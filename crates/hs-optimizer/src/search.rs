//! Cross-validated search orchestration.

use hs_types::{
    config_error, consistency_error, validation_error, Candidate, Estimator, Fold,
    ModelResult, ParameterSpec, Scorer, SearchError, SearchResult, Splitter,
};
use ndarray::{Array1, Array2};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, select_best, CandidateScore};
use crate::config::{ErrorScore, SearchConfig};
use crate::dispatch;
use crate::evaluator::{EstimatorScore, FoldEvaluator, FoldResult};
use crate::grid::{CandidateSequence, ParameterGrid};
use crate::sampler::ParameterSampler;
use crate::status::{SearchState, SearchStatus};

/// Where the candidates of a run come from.
#[derive(Debug, Clone)]
pub enum SearchStrategy {
    /// Every candidate of a grid, decoded on demand.
    Grid(ParameterGrid),
    /// `n_iter` sampled candidates, drawn before dispatch.
    Randomized { spec: ParameterSpec, n_iter: usize },
}

impl SearchStrategy {
    pub fn name(&self) -> &str {
        match self {
            Self::Grid(_) => "grid",
            Self::Randomized { .. } => "randomized",
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct SearchOutcome<M> {
    /// One entry per candidate, in candidate order (not score order).
    pub candidate_scores: Vec<CandidateScore>,
    pub best_index: usize,
    pub best: CandidateScore,
    /// The best candidate refitted on the full data; `None` without refit.
    pub best_estimator: Option<M>,
    /// Every fold result, candidate-major and fold-minor.
    pub fold_results: Vec<FoldResult>,
    pub n_folds: usize,
}

impl<M> SearchOutcome<M> {
    pub fn best_params(&self) -> &Candidate {
        &self.best.candidate
    }

    pub fn best_score(&self) -> f64 {
        self.best.mean_score
    }

    /// Scores and candidates as a JSON report.
    pub fn cv_results_json(&self) -> serde_json::Value {
        let candidates: Vec<serde_json::Value> = self
            .candidate_scores
            .iter()
            .map(|s| {
                json!({
                    "params": s.candidate,
                    "mean_score": s.mean_score,
                    "std_score": s.std_score,
                    "fold_scores": s.fold_scores,
                    "n_failed": s.n_failed,
                })
            })
            .collect();
        json!({
            "n_folds": self.n_folds,
            "best_index": self.best_index,
            "best_params": self.best.candidate,
            "best_score": self.best.mean_score,
            "candidates": candidates,
        })
    }
}

/// Exhaustive or randomized search over an estimator's parameters, scored by
/// cross-validation.
pub struct SearchCv<M> {
    estimator: M,
    strategy: Arc<SearchStrategy>,
    config: SearchConfig,
    scorer: Option<Arc<dyn Scorer<M>>>,
    cv: Option<Arc<dyn Splitter>>,
    status: SearchStatus,
    outcome: Option<SearchOutcome<M>>,
}

impl<M: fmt::Debug> fmt::Debug for SearchCv<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCv")
            .field("estimator", &self.estimator)
            .field("strategy", &self.strategy.name())
            .field("config", &self.config)
            .field("scorer", &self.scorer.as_ref().map(|s| s.name().to_string()))
            .field("cv", &self.cv)
            .field("status", &self.status.state)
            .finish()
    }
}

impl<M: Estimator> SearchCv<M> {
    pub fn new(estimator: M, strategy: SearchStrategy) -> Self {
        Self {
            estimator,
            strategy: Arc::new(strategy),
            config: SearchConfig::default(),
            scorer: None,
            cv: None,
            status: SearchStatus::new(),
            outcome: None,
        }
    }

    /// Exhaustive search over `grid`.
    pub fn grid(estimator: M, grid: ParameterGrid) -> Self {
        Self::new(estimator, SearchStrategy::Grid(grid))
    }

    /// `n_iter` candidates sampled from `spec` using the configured
    /// `random_state`.
    pub fn randomized(estimator: M, spec: ParameterSpec, n_iter: usize) -> Self {
        Self::new(estimator, SearchStrategy::Randomized { spec, n_iter })
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Score folds with `scorer` instead of the estimator's own `score`.
    pub fn with_scorer<S>(mut self, scorer: S) -> Self
    where
        S: Scorer<M> + 'static,
    {
        self.scorer = Some(Arc::new(scorer));
        self
    }

    pub fn with_cv<S>(mut self, cv: S) -> Self
    where
        S: Splitter + 'static,
    {
        self.cv = Some(Arc::new(cv));
        self
    }

    pub fn estimator(&self) -> &M {
        &self.estimator
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn strategy(&self) -> &SearchStrategy {
        &self.strategy
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn outcome(&self) -> Option<&SearchOutcome<M>> {
        self.outcome.as_ref()
    }

    /// Candidate scores of the last completed run, in candidate order.
    pub fn candidate_scores(&self) -> &[CandidateScore] {
        self.outcome
            .as_ref()
            .map_or(&[], |o| o.candidate_scores.as_slice())
    }

    pub fn best_params(&self) -> Option<&Candidate> {
        self.outcome.as_ref().map(SearchOutcome::best_params)
    }

    pub fn best_score(&self) -> Option<f64> {
        self.outcome.as_ref().map(SearchOutcome::best_score)
    }

    pub fn best_estimator(&self) -> Option<&M> {
        self.outcome.as_ref().and_then(|o| o.best_estimator.as_ref())
    }

    /// Run the configured search on `x` (and `y`, when given).
    ///
    /// Any previous outcome is discarded first.
    pub fn fit(&mut self, x: &Array2<f64>, y: Option<&Array1<f64>>) -> SearchResult<&SearchOutcome<M>> {
        let strategy = Arc::clone(&self.strategy);
        match &*strategy {
            SearchStrategy::Grid(grid) => self.fit_candidates(grid, x, y),
            SearchStrategy::Randomized { spec, n_iter } => {
                let sampled = ParameterSampler::new(spec, *n_iter, self.config.random_state)
                    .map(ParameterSampler::sample_all);
                match sampled {
                    Ok(candidates) => self.fit_candidates(&candidates, x, y),
                    Err(err) => {
                        self.status = SearchStatus::new();
                        self.outcome = None;
                        self.status.mark_failed(err.to_string());
                        Err(err)
                    }
                }
            }
        }
    }

    /// Run the search over an explicit candidate sequence.
    pub fn fit_candidates(
        &mut self,
        candidates: &dyn CandidateSequence,
        x: &Array2<f64>,
        y: Option<&Array1<f64>>,
    ) -> SearchResult<&SearchOutcome<M>> {
        self.status = SearchStatus::new();
        self.outcome = None;

        match self.run(candidates, x, y) {
            Ok(outcome) => {
                self.status.mark_done();
                Ok(&*self.outcome.insert(outcome))
            }
            Err(err) => {
                warn!(run = %self.status.id, error = %err, "search failed");
                self.status.mark_failed(err.to_string());
                Err(err)
            }
        }
    }

    fn run(
        &mut self,
        candidates: &dyn CandidateSequence,
        x: &Array2<f64>,
        y: Option<&Array1<f64>>,
    ) -> SearchResult<SearchOutcome<M>> {
        if let Some(y) = y {
            if y.len() != x.nrows() {
                return Err(validation_error!(
                    "found inconsistent numbers of samples: {} feature rows, {} targets",
                    x.nrows(),
                    y.len()
                ));
            }
        }

        let workers = self.config.workers()?;
        let scorer: Arc<dyn Scorer<M>> = match &self.scorer {
            Some(scorer) => Arc::clone(scorer),
            None if self.estimator.supports_score() => Arc::new(EstimatorScore),
            None => {
                return Err(config_error!(
                    "no scorer was given and the estimator does not implement score"
                ))
            }
        };
        let cv = self
            .cv
            .clone()
            .ok_or_else(|| config_error!("no cross-validation splitter was given"))?;

        if candidates.is_empty() {
            return Err(validation_error!("the candidate sequence is empty"));
        }
        let folds = cv.split(x.nrows(), y)?;
        check_folds(&folds, x.nrows())?;

        let n_candidates = candidates.len();
        let n_folds = folds.len();
        self.status.mark_dispatching(n_candidates, n_folds);
        if self.config.verbose > 0 {
            info!(
                run = %self.status.id,
                strategy = self.strategy.name(),
                "fitting {n_folds} folds for each of {n_candidates} candidates, totalling {} fits",
                n_candidates * n_folds
            );
        }

        let units = dispatch::plan(n_candidates, n_folds);
        let evaluator = FoldEvaluator::new(&self.estimator, x, y, scorer.as_ref());
        let error_score = self.config.error_score;
        let verbose = self.config.verbose;
        let results = dispatch::execute(
            &units,
            workers,
            self.config.queue_capacity(workers),
            |unit| {
                let candidate = candidates.get(unit.candidate_index)?;
                let fold = &folds[unit.fold_index];
                let outcome = evaluator.evaluate(
                    unit.candidate_index,
                    candidate.clone(),
                    unit.fold_index,
                    fold,
                );
                let result = apply_error_score(outcome, error_score, unit, candidate, fold)?;
                if verbose > 1 {
                    info!(
                        candidate = %result.candidate,
                        fold = unit.fold_index,
                        score = result.score,
                        fit_seconds = result.fit_duration,
                        "fold evaluated"
                    );
                }
                Ok(result)
            },
        )?;
        self.status.units_completed = results.len();
        self.status.units_substituted = results.iter().filter(|r| r.failed()).count();

        self.status.advance(SearchState::Aggregating);
        let candidate_scores = aggregate(&results, n_folds, self.config.iid)?;

        self.status.advance(SearchState::Selecting);
        let best_index = select_best(&candidate_scores)
            .ok_or_else(|| consistency_error!("aggregation produced no candidate scores"))?;
        let best = candidate_scores[best_index].clone();
        if self.config.verbose > 0 {
            info!(
                best_index,
                params = %best.candidate,
                score = best.mean_score,
                "best candidate selected"
            );
        }

        let best_estimator = if self.config.refit {
            self.status.advance(SearchState::Refitting);
            let mut model = self.estimator.clone();
            model.set_params(&best.candidate)?;
            model.fit(x, y)?;
            debug!(params = %best.candidate, "refitted best candidate on the full data");
            Some(model)
        } else {
            None
        };

        Ok(SearchOutcome {
            candidate_scores,
            best_index,
            best,
            best_estimator,
            fold_results: results,
            n_folds,
        })
    }

    fn fitted_best(&self, operation: &str) -> SearchResult<&M> {
        if !self.config.refit {
            return Err(config_error!(
                "{operation} is not available without refit; the search was configured with refit = false"
            ));
        }
        self.best_estimator().ok_or_else(|| {
            config_error!("{operation} is not available without refit; call fit first")
        })
    }

    /// Predict with the refitted best estimator.
    pub fn predict(&self, x: &Array2<f64>) -> SearchResult<Array1<f64>> {
        Ok(self.fitted_best("predict")?.predict(x)?)
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> SearchResult<Array2<f64>> {
        Ok(self.fitted_best("predict_proba")?.predict_proba(x)?)
    }

    pub fn decision_function(&self, x: &Array2<f64>) -> SearchResult<Array1<f64>> {
        Ok(self.fitted_best("decision_function")?.decision_function(x)?)
    }

    pub fn transform(&self, x: &Array2<f64>) -> SearchResult<Array2<f64>> {
        Ok(self.fitted_best("transform")?.transform(x)?)
    }

    pub fn inverse_transform(&self, x: &Array2<f64>) -> SearchResult<Array2<f64>> {
        Ok(self.fitted_best("inverse_transform")?.inverse_transform(x)?)
    }

    /// Score the refitted best estimator with the search's scorer, or with
    /// the estimator's own `score` when none was given.
    pub fn score(&self, x: &Array2<f64>, y: Option<&Array1<f64>>) -> SearchResult<f64> {
        let best = self.fitted_best("score")?;
        let score = match &self.scorer {
            Some(scorer) => scorer.score(best, x, y)?,
            None => best.score(x, y)?,
        };
        Ok(score)
    }
}

/// Turn a failed evaluation into a fatal error or a substituted score.
fn apply_error_score(
    outcome: ModelResult<FoldResult>,
    error_score: ErrorScore,
    unit: dispatch::WorkUnit,
    candidate: Candidate,
    fold: &Fold,
) -> SearchResult<FoldResult> {
    match (outcome, error_score) {
        (Ok(result), _) => Ok(result),
        (Err(source), ErrorScore::Raise) => Err(SearchError::Evaluation {
            candidate_index: unit.candidate_index,
            fold_index: unit.fold_index,
            source,
        }),
        (Err(source), ErrorScore::Value(score)) => {
            warn!(
                candidate = %candidate,
                fold = unit.fold_index,
                error = %source,
                score,
                "evaluation failed; using error_score"
            );
            Ok(FoldResult {
                candidate_index: unit.candidate_index,
                fold_index: unit.fold_index,
                candidate,
                score,
                test_size: fold.test.len(),
                fit_duration: 0.0,
                score_duration: 0.0,
                error: Some(source.to_string()),
            })
        }
    }
}

fn check_folds(folds: &[Fold], n_samples: usize) -> SearchResult<()> {
    if folds.is_empty() {
        return Err(validation_error!("the splitter produced no folds"));
    }
    for (i, fold) in folds.iter().enumerate() {
        if fold.test.is_empty() {
            return Err(validation_error!("fold {i} has an empty test split"));
        }
        if let Some(bad) = fold
            .train
            .iter()
            .chain(&fold.test)
            .find(|&&idx| idx >= n_samples)
        {
            return Err(validation_error!(
                "fold {i} refers to sample {bad} but only {n_samples} samples exist"
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hs_types::{column, ModelError, ParameterValue};
    use ndarray::array;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scores `-(slope - 2)^2`, independent of the data. Fails to fit when
    /// `slope` is negative.
    #[derive(Debug, Clone, Default)]
    struct Quadratic {
        slope: f64,
        fitted: bool,
        fits: Arc<AtomicUsize>,
    }

    impl Estimator for Quadratic {
        fn set_params(&mut self, params: &Candidate) -> ModelResult<()> {
            if let Some(v) = params.get_f64("slope") {
                self.slope = v;
            }
            Ok(())
        }

        fn fit(&mut self, _x: &Array2<f64>, _y: Option<&Array1<f64>>) -> ModelResult<()> {
            self.fits.fetch_add(1, Ordering::SeqCst);
            if self.slope < 0.0 {
                return Err(ModelError::fit("negative slope"));
            }
            self.fitted = true;
            Ok(())
        }

        fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
            if !self.fitted {
                return Err(ModelError::NotFitted);
            }
            Ok(x.column(0).mapv(|v| v * self.slope))
        }

        fn supports_score(&self) -> bool {
            true
        }

        fn score(&self, _x: &Array2<f64>, _y: Option<&Array1<f64>>) -> ModelResult<f64> {
            Ok(-(self.slope - 2.0).powi(2))
        }
    }

    /// Contiguous folds without shuffling.
    #[derive(Debug, Clone)]
    struct Contiguous(usize);

    impl Splitter for Contiguous {
        fn split(&self, n_samples: usize, _y: Option<&Array1<f64>>) -> SearchResult<Vec<Fold>> {
            let size = n_samples / self.0;
            Ok((0..self.0)
                .map(|k| {
                    let test: Vec<usize> = (k * size..(k + 1) * size).collect();
                    let train = (0..n_samples).filter(|i| !test.contains(i)).collect();
                    Fold { train, test }
                })
                .collect())
        }
    }

    fn data() -> (Array2<f64>, Array1<f64>) {
        let xs: Vec<f64> = (0..12).map(f64::from).collect();
        let x = column(xs);
        let y = x.column(0).mapv(|v| 2.0 * v);
        (x, y)
    }

    fn slope_grid(values: &[f64]) -> ParameterGrid {
        ParameterGrid::single(ParameterSpec::new().values("slope", values.iter().copied())).unwrap()
    }

    #[test]
    fn grid_search_selects_and_refits() {
        let (x, y) = data();
        let mut search = SearchCv::grid(Quadratic::default(), slope_grid(&[0.0, 1.0, 2.0, 3.0]))
            .with_cv(Contiguous(3));
        let outcome = search.fit(&x, Some(&y)).unwrap();

        assert_eq!(outcome.n_folds, 3);
        assert_eq!(outcome.candidate_scores.len(), 4);
        assert_eq!(outcome.fold_results.len(), 12);
        assert_eq!(outcome.best_index, 2);
        assert_eq!(outcome.best_params().get_f64("slope"), Some(2.0));

        assert_eq!(search.status().state, SearchState::Done);
        assert_eq!(search.status().units_completed, 12);
        assert_eq!(search.best_score(), Some(0.0));
        assert_eq!(search.predict(&column(vec![1.5])).unwrap(), array![3.0]);
        assert_eq!(search.score(&x, Some(&y)).unwrap(), 0.0);
    }

    #[test]
    fn mismatched_targets_fail_before_any_fit() {
        let (x, _) = data();
        let base = Quadratic::default();
        let fits = Arc::clone(&base.fits);
        let mut search = SearchCv::grid(base, slope_grid(&[1.0])).with_cv(Contiguous(3));
        let err = search.fit(&x, Some(&array![1.0, 2.0])).unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
        assert_eq!(fits.load(Ordering::SeqCst), 0);
        assert_eq!(search.status().state, SearchState::Failed);
        assert!(search.outcome().is_none());
    }

    #[test]
    fn error_score_policy() {
        let (x, y) = data();
        let grid = slope_grid(&[-1.0, 2.0]);

        let mut raising = SearchCv::grid(Quadratic::default(), grid.clone()).with_cv(Contiguous(3));
        let err = raising.fit(&x, Some(&y)).unwrap_err();
        assert!(matches!(
            err,
            SearchError::Evaluation {
                candidate_index: 0,
                fold_index: 0,
                ..
            }
        ));

        let mut lenient = SearchCv::grid(Quadratic::default(), grid)
            .with_cv(Contiguous(3))
            .with_config(
                SearchConfig::new()
                    .with_error_score(ErrorScore::Value(0.0))
                    .with_refit(false),
            );
        let outcome = lenient.fit(&x, Some(&y)).unwrap();
        assert_eq!(outcome.fold_results[0].score, 0.0);
        assert!(outcome.fold_results[0].failed());
        assert_eq!(outcome.candidate_scores[0].n_failed, 3);
        // Tied at 0.0, so the earlier (failed) candidate wins.
        assert_eq!(outcome.best_index, 0);
        assert_eq!(lenient.status().units_substituted, 3);
    }

    #[test]
    fn refit_failure_is_reported() {
        let (x, y) = data();
        let mut search = SearchCv::grid(Quadratic::default(), slope_grid(&[-1.0]))
            .with_cv(Contiguous(2))
            .with_config(SearchConfig::new().with_error_score(ErrorScore::Value(0.0)));
        let err = search.fit(&x, Some(&y)).unwrap_err();
        assert!(matches!(err, SearchError::Model(ModelError::Fit { .. })));
    }

    #[test]
    fn delegation_requires_refit() {
        let (x, y) = data();
        let mut search = SearchCv::grid(Quadratic::default(), slope_grid(&[2.0]))
            .with_cv(Contiguous(2))
            .with_config(SearchConfig::new().with_refit(false));

        let before = search.predict(&x).unwrap_err();
        assert!(before.to_string().contains("predict is not available without refit"));

        search.fit(&x, Some(&y)).unwrap();
        assert!(search.best_estimator().is_none());
        assert_eq!(search.best_params().and_then(|c| c.get_f64("slope")), Some(2.0));
        let err = search.score(&x, Some(&y)).unwrap_err();
        assert!(matches!(err, SearchError::Configuration(ref m) if m.contains("score")));
        assert!(search.transform(&x).is_err());
    }

    #[test]
    fn unsupported_delegated_operation_is_a_model_error() {
        let (x, y) = data();
        let mut search =
            SearchCv::grid(Quadratic::default(), slope_grid(&[2.0])).with_cv(Contiguous(2));
        search.fit(&x, Some(&y)).unwrap();
        let err = search.transform(&x).unwrap_err();
        assert!(matches!(err, SearchError::Model(ModelError::Unsupported { .. })));
    }

    #[test]
    fn missing_collaborators_are_configuration_errors() {
        let (x, y) = data();
        let mut no_cv = SearchCv::grid(Quadratic::default(), slope_grid(&[2.0]));
        assert!(matches!(
            no_cv.fit(&x, Some(&y)),
            Err(SearchError::Configuration(_))
        ));

        #[derive(Debug, Clone)]
        struct NoScore;
        impl Estimator for NoScore {
            fn set_params(&mut self, _: &Candidate) -> ModelResult<()> {
                Ok(())
            }
            fn fit(&mut self, _: &Array2<f64>, _: Option<&Array1<f64>>) -> ModelResult<()> {
                Ok(())
            }
            fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
                Ok(Array1::zeros(x.nrows()))
            }
        }
        let mut no_scorer = SearchCv::grid(NoScore, slope_grid(&[2.0])).with_cv(Contiguous(2));
        assert!(matches!(
            no_scorer.fit(&x, Some(&y)),
            Err(SearchError::Configuration(_))
        ));

        let constant = |_: &NoScore, _: &Array2<f64>, _: Option<&Array1<f64>>| -> ModelResult<f64> { Ok(1.0) };
        let mut scored = SearchCv::grid(NoScore, slope_grid(&[2.0]))
            .with_cv(Contiguous(2))
            .with_scorer(constant);
        assert_eq!(scored.fit(&x, Some(&y)).unwrap().best_score(), 1.0);
    }

    #[test]
    fn bad_folds_are_rejected() {
        #[derive(Debug)]
        struct Broken(Vec<Fold>);
        impl Splitter for Broken {
            fn split(&self, _: usize, _: Option<&Array1<f64>>) -> SearchResult<Vec<Fold>> {
                Ok(self.0.clone())
            }
        }
        let (x, y) = data();
        for folds in [
            vec![],
            vec![Fold { train: vec![0], test: vec![] }],
            vec![Fold { train: vec![0], test: vec![99] }],
        ] {
            let mut search =
                SearchCv::grid(Quadratic::default(), slope_grid(&[2.0])).with_cv(Broken(folds));
            assert!(matches!(
                search.fit(&x, Some(&y)),
                Err(SearchError::Validation(_))
            ));
        }
    }

    #[test]
    fn randomized_search_is_reproducible() {
        let (x, y) = data();
        let spec = ParameterSpec::new().values("slope", [0.0, 1.0, 2.0, 3.0, 4.0]);
        let config = SearchConfig::new().with_seed(21);

        let mut a = SearchCv::randomized(Quadratic::default(), spec.clone(), 6)
            .with_cv(Contiguous(2))
            .with_config(config.clone());
        let mut b = SearchCv::randomized(Quadratic::default(), spec, 6)
            .with_cv(Contiguous(2))
            .with_config(config);
        let first: Vec<CandidateScore> = a.fit(&x, Some(&y)).unwrap().candidate_scores.clone();
        let second = b.fit(&x, Some(&y)).unwrap().candidate_scores.clone();
        assert_eq!(first.len(), 6);
        assert_eq!(first, second);
        assert_eq!(a.strategy().name(), "randomized");
    }

    #[test]
    fn refitting_replaces_the_previous_outcome() {
        let (x, y) = data();
        let mut search =
            SearchCv::grid(Quadratic::default(), slope_grid(&[1.0, 2.0])).with_cv(Contiguous(2));
        let first_id = {
            search.fit(&x, Some(&y)).unwrap();
            search.status().id
        };
        let err = search.fit(&x, Some(&array![0.0])).unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
        assert!(search.outcome().is_none());
        assert_ne!(search.status().id, first_id);
    }

    #[test]
    fn explicit_candidate_sequence() {
        let (x, y) = data();
        let candidates = vec![
            Candidate::new().with("slope", 2.0),
            Candidate::new().with("slope", 2.0),
        ];
        let mut search =
            SearchCv::grid(Quadratic::default(), slope_grid(&[0.0])).with_cv(Contiguous(2));
        let outcome = search.fit_candidates(&candidates, &x, Some(&y)).unwrap();
        assert_eq!(outcome.best_index, 0);

        let report = outcome.cv_results_json();
        assert_eq!(report["n_folds"], 2);
        assert_eq!(report["candidates"].as_array().map(Vec::len), Some(2));
        assert_eq!(report["best_params"]["slope"], 2.0);
        assert_eq!(
            outcome.best.candidate.get("slope"),
            Some(&ParameterValue::Float(2.0))
        );

        let empty: Vec<Candidate> = Vec::new();
        assert!(matches!(
            search.fit_candidates(&empty, &x, Some(&y)),
            Err(SearchError::Validation(_))
        ));
    }
}
