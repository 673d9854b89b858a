//! Parameter values, candidates and parameter specifications.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A concrete parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Null,
}

impl ParameterValue {
    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for ParameterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// One concrete assignment of values to parameter names.
///
/// Keys are kept sorted so equality, display and serialization are
/// independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate {
    values: BTreeMap<String, ParameterValue>,
}

impl Candidate {
    /// The empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParameterValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParameterValue::as_f64)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParameterValue::as_i64)
    }

    pub fn get_usize(&self, name: &str) -> Option<usize> {
        self.get_i64(name).and_then(|v| usize::try_from(v).ok())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParameterValue::as_bool)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParameterValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameters in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(String, ParameterValue)> for Candidate {
    fn from_iter<I: IntoIterator<Item = (String, ParameterValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Something that can produce a random parameter value.
///
/// The random source is always passed in by the caller; implementations
/// must not keep their own generator.
pub trait Distribution: Send + Sync + fmt::Debug {
    fn draw(&self, rng: &mut dyn RngCore) -> ParameterValue;
}

/// How values are produced for one parameter.
#[derive(Debug, Clone)]
pub enum ParamDomain {
    /// A finite ordered sequence of values.
    Values(Vec<ParameterValue>),
    /// A distribution to draw from.
    Distribution(Arc<dyn Distribution>),
}

/// Parameter name to domain mapping. An empty spec denotes exactly one
/// candidate: the empty assignment.
#[derive(Debug, Clone, Default)]
pub struct ParameterSpec {
    domains: BTreeMap<String, ParamDomain>,
}

impl ParameterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a finite value list.
    pub fn values<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParameterValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.domains.insert(name.into(), ParamDomain::Values(values));
        self
    }

    /// Add (or replace) a distribution.
    pub fn distribution<D>(mut self, name: impl Into<String>, dist: D) -> Self
    where
        D: Distribution + 'static,
    {
        self.domains
            .insert(name.into(), ParamDomain::Distribution(Arc::new(dist)));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamDomain> {
        self.domains.get(name)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Domains in ascending name order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &ParamDomain)> {
        self.domains.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Later entries replace earlier ones with the same name.
impl FromIterator<(String, ParamDomain)> for ParameterSpec {
    fn from_iter<I: IntoIterator<Item = (String, ParamDomain)>>(iter: I) -> Self {
        Self {
            domains: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_equality_ignores_insertion_order() {
        let a = Candidate::new().with("b", true).with("a", 1);
        let b = Candidate::new().with("a", 1).with("b", true);
        assert_eq!(a, b);
        assert_ne!(a, Candidate::new().with("a", 2).with("b", true));
    }

    #[test]
    fn candidate_display_is_sorted() {
        let c = Candidate::new().with("kernel", "rbf").with("c", 0.5);
        assert_eq!(c.to_string(), "{c: 0.5, kernel: \"rbf\"}");
        assert_eq!(Candidate::new().to_string(), "{}");
    }

    #[test]
    fn typed_getters() {
        let c = Candidate::new()
            .with("alpha", 2)
            .with("fit_intercept", false)
            .with("weights", "distance");
        assert_eq!(c.get_f64("alpha"), Some(2.0));
        assert_eq!(c.get_usize("alpha"), Some(2));
        assert_eq!(c.get_bool("fit_intercept"), Some(false));
        assert_eq!(c.get_str("weights"), Some("distance"));
        assert_eq!(c.get_i64("weights"), None);
        assert!(Candidate::new().with("k", -1).get_usize("k").is_none());
    }

    #[test]
    fn parameter_value_json_round_trip() {
        let c = Candidate::new()
            .with("a", 1)
            .with("b", 0.25)
            .with("c", "x")
            .with("d", true);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json, serde_json::json!({"a": 1, "b": 0.25, "c": "x", "d": true}));
        let back: Candidate = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn spec_builder_replaces_domains() {
        let spec = ParameterSpec::new()
            .values("a", [1, 2])
            .values("a", [3])
            .values("b", ["x", "y"]);
        assert_eq!(spec.len(), 2);
        match spec.get("a") {
            Some(ParamDomain::Values(v)) => assert_eq!(v, &vec![ParameterValue::Int(3)]),
            other => panic!("unexpected domain: {other:?}"),
        }
    }

    #[test]
    fn spec_collects_from_domains() {
        let spec: ParameterSpec = [
            ("b".to_string(), ParamDomain::Values(vec![1.into(), 2.into()])),
            ("a".to_string(), ParamDomain::Values(vec![true.into()])),
            ("b".to_string(), ParamDomain::Values(vec![3.into()])),
        ]
        .into_iter()
        .collect();
        assert_eq!(spec.len(), 2);
        let names: Vec<&str> = spec.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(matches!(
            spec.get("b"),
            Some(ParamDomain::Values(values)) if values == &vec![ParameterValue::Int(3)]
        ));
    }
}
