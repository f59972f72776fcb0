use serde_json::Value;

use crate::{arguments::ArgumentValues, CostSpec, Multiplier};

/// The cost settings that apply to one selected field: its [`CostSpec`] laid
/// over the defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct FieldCost<'a> {
    pub complexity: f64,
    pub tokens: f64,
    pub multipliers: &'a [Multiplier],
    pub use_multipliers: bool,
    pub provides: &'a [String],
    pub recursion_multiplier: Option<f64>,
}

impl<'a> FieldCost<'a> {
    /// Without an entry, a field costs `default_cost` and ignores its parent's
    /// multiplier. With one, the parent's multiplier applies unless disabled.
    pub fn resolve(spec: Option<&'a CostSpec>, default_cost: f64) -> Self {
        let defaults = FieldCost {
            complexity: default_cost,
            tokens: 0.0,
            multipliers: &[],
            use_multipliers: false,
            provides: &[],
            recursion_multiplier: None,
        };

        let Some(spec) = spec else {
            return defaults;
        };

        FieldCost {
            complexity: spec.complexity.unwrap_or(defaults.complexity),
            tokens: spec.tokens.unwrap_or(defaults.tokens),
            multipliers: spec.multipliers.as_deref().unwrap_or(defaults.multipliers),
            use_multipliers: spec.use_multipliers.unwrap_or(true),
            provides: spec.provides.as_deref().unwrap_or(defaults.provides),
            recursion_multiplier: spec.recursion_multiplier.filter(|base| *base > 0.0),
        }
    }

    /// Sum of the field's multiplier arguments: list length for lists, the
    /// value itself for numbers. Anything else, or a missing argument, adds 0.
    pub fn own_multiplier(&self, arguments: &ArgumentValues) -> f64 {
        self.multipliers
            .iter()
            .map(|multiplier| match multiplier {
                Multiplier::Literal(value) => *value,
                Multiplier::Argument(name) => match arguments.get(name) {
                    Some(Value::Array(items)) => items.len() as f64,
                    Some(Value::Number(number)) => number.as_f64().unwrap_or_default(),
                    _ => 0.0,
                },
            })
            .sum()
    }

    /// Returns the field's own cost and its effective multiplier.
    ///
    /// Tokens are never scaled by the field's own multiplier, only by the one
    /// inherited from its parent.
    pub fn compute(&self, arguments: &ArgumentValues, parent_multiplier: f64) -> (f64, f64) {
        let own_multiplier = self.own_multiplier(arguments);
        let inherits = self.use_multipliers && parent_multiplier > 0.0;

        let multiplier = if inherits {
            let own_multiplier = if own_multiplier > 0.0 { own_multiplier } else { 1.0 };
            own_multiplier * parent_multiplier
        } else {
            own_multiplier
        };

        let mut cost = if multiplier > 0.0 {
            self.complexity * multiplier
        } else {
            self.complexity
        };

        if self.tokens != 0.0 {
            cost += if inherits {
                self.tokens * parent_multiplier
            } else {
                self.tokens
            };
        }

        (cost, multiplier)
    }
}
