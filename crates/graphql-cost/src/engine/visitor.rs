use cynic_parser::{
    executable::{FieldSelection, FragmentSpread, OperationDefinition, Selection},
    ExecutableDocument,
};
use itertools::Itertools as _;

use super::{field_cost::FieldCost, CostOptions, DEFAULT_RECURSION_MULTIPLIER, PAGINATION_WRAPPERS};
use crate::{
    arguments::{self, Variables},
    schema::{operation_kind, FieldDefinition},
    CostError, CostMap, Schema,
};

type CostResult<T> = Result<T, CostError>;

const TYPENAME: &str = "__typename";

/// Walks the selections of a document and folds them into a single cost.
///
/// Nothing is recorded on the document: all the state of the walk lives in the
/// [`Context`] handed down to each selection set, so a fragment spread at two
/// places is costed independently at each.
pub(super) struct CostVisitor<'a> {
    schema: &'a Schema,
    cost_map: Option<&'a CostMap>,
    default_cost: f64,
    variables: Option<&'a Variables>,
    operation_name: Option<&'a str>,
}

/// State of the walk for one selection set.
#[derive(Clone, Copy)]
struct Context<'c> {
    /// Type the selected fields belong to, `None` when it is not known.
    parent_type: Option<&'c str>,
    /// Multiplier inherited from the enclosing fields, 0 when there is none.
    multiplier: f64,
    recursion_multiplier: f64,
    /// Enclosing fields, innermost first.
    ancestors: Option<&'c Lineage<'c>>,
    /// Enclosing fragment spreads, innermost first.
    fragments: Option<&'c Lineage<'c>>,
}

impl<'c> Context<'c> {
    fn root(root_type: &'c str) -> Self {
        Context {
            parent_type: Some(root_type),
            multiplier: 0.0,
            recursion_multiplier: DEFAULT_RECURSION_MULTIPLIER,
            ancestors: None,
            fragments: None,
        }
    }
}

/// A stack of names kept on the call stack.
struct Lineage<'c> {
    name: &'c str,
    parent: Option<&'c Lineage<'c>>,
}

impl<'c> Lineage<'c> {
    fn names(lineage: Option<&'c Lineage<'c>>) -> impl Iterator<Item = &'c str> {
        std::iter::successors(lineage, |lineage| lineage.parent).map(|lineage| lineage.name)
    }
}

impl<'a> CostVisitor<'a> {
    pub fn new(schema: &'a Schema, options: &CostOptions<'a>) -> Self {
        CostVisitor {
            schema,
            cost_map: options.cost_map,
            default_cost: options.default_cost,
            variables: options.variables,
            operation_name: options.operation_name,
        }
    }

    pub fn document_cost(&self, document: &ExecutableDocument) -> CostResult<f64> {
        if let Some(name) = self.operation_name {
            let operation = document
                .operations()
                .find(|operation| operation.name() == Some(name))
                .ok_or_else(|| CostError::UnknownOperation(name.to_owned()))?;

            return self.operation_cost(operation);
        }

        document
            .operations()
            .map(|operation| self.operation_cost(operation))
            .sum()
    }

    fn operation_cost(&self, operation: OperationDefinition<'_>) -> CostResult<f64> {
        let operation_type = operation.operation_type();

        let root_type = self
            .schema
            .root_type(operation_type)
            .ok_or(CostError::UnsupportedOperation {
                operation: operation_kind(operation_type),
            })?;

        let cost = self.selection_set_cost(operation.selection_set(), Context::root(root_type))?;

        tracing::debug!(
            "Cost of {} operation {}: {cost}",
            operation_kind(operation_type),
            operation.name().unwrap_or("(anonymous)")
        );

        Ok(cost)
    }

    fn selection_set_cost<'d>(
        &self,
        selections: impl Iterator<Item = Selection<'d>>,
        ctx: Context<'_>,
    ) -> CostResult<f64> {
        let mut cost = 0.0;

        for selection in selections {
            cost += match selection {
                Selection::Field(field) => self.field_cost(field, ctx)?,
                Selection::InlineFragment(fragment) => {
                    let parent_type = match fragment.type_condition() {
                        Some(type_condition) => self.known_type(type_condition),
                        None => ctx.parent_type,
                    };

                    self.selection_set_cost(fragment.selection_set(), Context { parent_type, ..ctx })?
                }
                Selection::FragmentSpread(spread) => self.fragment_spread_cost(spread, ctx)?,
            };
        }

        Ok(cost)
    }

    fn fragment_spread_cost(&self, spread: FragmentSpread<'_>, ctx: Context<'_>) -> CostResult<f64> {
        let name = spread.fragment_name();

        if Lineage::names(ctx.fragments).any(|fragment| fragment == name) {
            let mut cycle = Lineage::names(ctx.fragments).map(str::to_owned).collect_vec();
            cycle.reverse();
            cycle.push(name.to_owned());

            return Err(CostError::FragmentCycle { cycle });
        }

        let Some(fragment) = spread.fragment() else {
            return Err(CostError::UnknownFragment { name: name.to_owned() });
        };

        let fragments = Lineage {
            name,
            parent: ctx.fragments,
        };

        self.selection_set_cost(
            fragment.selection_set(),
            Context {
                parent_type: self.known_type(fragment.type_condition()),
                fragments: Some(&fragments),
                ..ctx
            },
        )
    }

    fn field_cost(&self, field: FieldSelection<'_>, ctx: Context<'_>) -> CostResult<f64> {
        let name = field.name();
        let definition = ctx.parent_type.and_then(|ty| self.schema.field(ty, name));
        let spec = ctx.parent_type.and_then(|ty| self.cost_map?.get(ty, name));

        let cost = FieldCost::resolve(spec, self.default_cost);
        let recursion_multiplier = cost.recursion_multiplier.unwrap_or(ctx.recursion_multiplier);
        let has_selections = field.selection_set().next().is_some();

        let fully_provided = has_selections
            && !cost.provides.is_empty()
            && self.is_provided(field.selection_set(), cost.provides, None);

        let (own_cost, multiplier) = if fully_provided {
            (1.0, 0.0)
        } else {
            let arguments = arguments::evaluate(field, definition, self.variables);
            cost.compute(&arguments, ctx.multiplier)
        };

        if !has_selections {
            tracing::trace!("{}.{name}: {own_cost}", ctx.parent_type.unwrap_or("?"));
            return Ok(own_cost);
        }

        let penalty = recursion_penalty(name, ctx.ancestors, recursion_multiplier);

        let ancestors = Lineage {
            name,
            parent: ctx.ancestors,
        };

        let children_cost = self.selection_set_cost(
            field.selection_set(),
            Context {
                parent_type: definition.map(FieldDefinition::ty),
                multiplier: if multiplier > 0.0 { multiplier } else { ctx.multiplier },
                recursion_multiplier,
                ancestors: Some(&ancestors),
                fragments: ctx.fragments,
            },
        )?;

        let total = (own_cost + children_cost) * penalty;
        tracing::trace!("{}.{name}: {total}", ctx.parent_type.unwrap_or("?"));

        Ok(total)
    }

    /// Whether every field in `selections` is in `provides`, looking through
    /// fragments. `__typename` is always provided.
    fn is_provided<'d>(
        &self,
        mut selections: impl Iterator<Item = Selection<'d>>,
        provides: &[String],
        fragments: Option<&Lineage<'_>>,
    ) -> bool {
        selections.all(|selection| match selection {
            Selection::Field(field) => field.name() == TYPENAME || provides.iter().any(|name| name == field.name()),
            Selection::InlineFragment(fragment) => {
                self.is_provided(fragment.selection_set(), provides, fragments)
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.fragment_name();
                if Lineage::names(fragments).any(|fragment| fragment == name) {
                    return false;
                }

                let lineage = Lineage {
                    name,
                    parent: fragments,
                };

                spread.fragment().is_some_and(|fragment| {
                    self.is_provided(fragment.selection_set(), provides, Some(&lineage))
                })
            }
        })
    }

    fn known_type<'t>(&self, type_name: &'t str) -> Option<&'t str> {
        self.schema.has_type(type_name).then_some(type_name)
    }
}

/// Factor applied to a field that repeats the name of an enclosing field:
/// `base` raised to the number of repeats.
fn recursion_penalty(name: &str, ancestors: Option<&Lineage<'_>>, base: f64) -> f64 {
    if PAGINATION_WRAPPERS.contains(&name) {
        return 1.0;
    }

    let repeats = Lineage::names(ancestors).filter(|ancestor| *ancestor == name).count();
    if repeats == 0 {
        return 1.0;
    }

    let penalty = base.powi(i32::try_from(repeats).unwrap_or(i32::MAX));

    tracing::debug!(
        "Recursion detected at {}.{name}: repeated {repeats} times, cost multiplied by {penalty}",
        Lineage::names(ancestors).collect_vec().into_iter().rev().join(".")
    );

    penalty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_counts_every_repeat() {
        let root = Lineage {
            name: "user",
            parent: None,
        };
        let friends = Lineage {
            name: "friends",
            parent: Some(&root),
        };
        let user = Lineage {
            name: "user",
            parent: Some(&friends),
        };

        assert_eq!(recursion_penalty("friends", Some(&root), 100.0), 1.0);
        assert_eq!(recursion_penalty("user", Some(&friends), 100.0), 100.0);
        assert_eq!(recursion_penalty("user", Some(&user), 3.0), 9.0);
        assert_eq!(recursion_penalty("user", Some(&user), 1.0), 1.0);
    }

    #[test]
    fn pagination_wrappers_are_exempt() {
        let edges = Lineage { name: "edges", parent: None };
        let node = Lineage {
            name: "node",
            parent: Some(&edges),
        };

        assert_eq!(recursion_penalty("edges", Some(&node), 100.0), 1.0);
        assert_eq!(recursion_penalty("node", Some(&node), 100.0), 1.0);
    }
}
