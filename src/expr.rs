//! Declarative filter and paint expressions in the map widget's JSON syntax,
//! e.g. `["all", [">=", ["get", "area_in_meters"], 50], ["<", ["get", "area_in_meters"], 100]]`.

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::{classes::SizeClasses, geojson::DamageState};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// True if any operand is true; `Any([])` matches nothing.
    Any(Vec<Expr>),
    All(Vec<Expr>),
    Ge(Box<Expr>, f64),
    Lt(Box<Expr>, f64),
    Get(String),
    /// `["step", input, base, stop1, out1, ...]`
    Step { input: Box<Expr>, base: Value, stops: Vec<(f64, Value)> },
    /// `["match", input, label1, out1, ..., fallback]`
    Match { input: Box<Expr>, arms: Vec<(Value, Value)>, fallback: Value },
    /// `["interpolate", ["linear"], input, stop1, out1, ...]`
    Linear { input: Box<Expr>, stops: Vec<(f64, Value)> },
}

impl Expr {
    pub fn get(attr: &str) -> Self { Expr::Get(attr.to_string()) }

    pub fn to_json(&self) -> Value {
        match self {
            Expr::Any(items) => prefixed("any", items.iter().map(Expr::to_json)),
            Expr::All(items) => prefixed("all", items.iter().map(Expr::to_json)),
            Expr::Ge(lhs, rhs) => json!([">=", lhs.to_json(), rhs]),
            Expr::Lt(lhs, rhs) => json!(["<", lhs.to_json(), rhs]),
            Expr::Get(attr) => json!(["get", attr]),
            Expr::Step { input, base, stops } => {
                let mut out = vec![json!("step"), input.to_json(), base.clone()];
                for (stop, value) in stops { out.push(json!(stop)); out.push(value.clone()); }
                Value::Array(out)
            }
            Expr::Match { input, arms, fallback } => {
                let mut out = vec![json!("match"), input.to_json()];
                for (label, value) in arms { out.push(label.clone()); out.push(value.clone()); }
                out.push(fallback.clone());
                Value::Array(out)
            }
            Expr::Linear { input, stops } => {
                let mut out = vec![json!("interpolate"), json!(["linear"]), input.to_json()];
                for (stop, value) in stops { out.push(json!(stop)); out.push(value.clone()); }
                Value::Array(out)
            }
        }
    }

    /// Evaluate a predicate against feature properties. Missing or non-numeric
    /// attributes compare false, as on the widget side.
    pub fn matches(&self, properties: &Value) -> bool {
        match self {
            Expr::Any(items) => items.iter().any(|e| e.matches(properties)),
            Expr::All(items) => items.iter().all(|e| e.matches(properties)),
            Expr::Ge(lhs, rhs) => lhs.number(properties).is_some_and(|v| v >= *rhs),
            Expr::Lt(lhs, rhs) => lhs.number(properties).is_some_and(|v| v < *rhs),
            _ => false,
        }
    }

    fn number(&self, properties: &Value) -> Option<f64> {
        match self {
            Expr::Get(attr) => properties.get(attr).and_then(Value::as_f64),
            _ => None,
        }
    }
}

fn prefixed(op: &str, items: impl Iterator<Item = Value>) -> Value {
    Value::Array(std::iter::once(json!(op)).chain(items).collect())
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Filter selecting buildings whose footprint area falls in any active class.
/// Terms follow table order, whatever order the active labels are kept in.
pub fn size_filter(classes: &SizeClasses, is_active: impl Fn(&str) -> bool, attr: &str) -> Expr {
    let mut terms = Vec::new();
    for class in classes {
        if !is_active(&class.label) { continue }
        let lower = Expr::Ge(Box::new(Expr::get(attr)), class.lower);
        match class.upper {
            Some(upper) => terms.push(Expr::All(vec![lower, Expr::Lt(Box::new(Expr::get(attr)), upper)])),
            None => terms.push(lower),
        }
    }
    Expr::Any(terms)
}

/// Fill colour stepped on footprint area, one colour per size class.
pub fn size_color_step(classes: &SizeClasses, attr: &str) -> Expr {
    let mut iter = classes.iter();
    let base = iter.next().map(|c| json!(c.color)).unwrap_or(Value::Null);
    let stops = iter.map(|c| (c.lower, json!(c.color))).collect();
    Expr::Step { input: Box::new(Expr::get(attr)), base, stops }
}

/// Colour stepped on `attr`: `base` below the first threshold, then each
/// stop's colour from its threshold up.
pub fn color_step(attr: &str, base: &str, stops: &[(f64, &str)]) -> Expr {
    Expr::Step {
        input: Box::new(Expr::get(attr)),
        base: json!(base),
        stops: stops.iter().map(|&(at, color)| (at, json!(color))).collect(),
    }
}

/// Fill colour matched on the damage-state label, black for anything else.
pub fn damage_color_match(attr: &str) -> Expr {
    let arms = DamageState::ALL.iter()
        .map(|state| (json!(state.source_label()), json!(state.color())))
        .collect();
    Expr::Match { input: Box::new(Expr::get(attr)), arms, fallback: json!("#000000") }
}

/// Commune fill ramp on population.
pub fn population_ramp() -> Expr {
    Expr::Linear {
        input: Box::new(Expr::get("Population")),
        stops: vec![
            (0.0, json!("#f1eef6")),
            (5000.0, json!("#bdc9e1")),
            (10000.0, json!("#74a9cf")),
            (20000.0, json!("#0570b0")),
        ],
    }
}
