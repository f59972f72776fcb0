//! Static cost analysis of GraphQL operations.
//!
//! Schemas declare the cost of their fields with the `@cost` directive.
//! [`extract_costs`] turns those annotations into a [`CostMap`] and a schema
//! safe to serve, and [`calculate_cost`] estimates what an operation would cost
//! to execute, so that expensive operations can be rejected before running.
#![cfg_attr(test, allow(unused_crate_dependencies))]

mod arguments;
mod control;
mod cost_map;
mod directive;
mod engine;
mod error;
mod schema;

pub use self::{
    arguments::{evaluate as evaluate_arguments, ArgumentValues, Variables},
    control::{CostControl, CostControlConfig, CostControlMode, CostLimitExceeded},
    cost_map::{CostMap, CostSpec, Multiplier},
    directive::{extract_costs, ExtractedCosts, COST_DIRECTIVE, TOKEN_UNIT_COST},
    engine::{
        calculate_cost, CostOptions, QuerySource, SchemaSource, DEFAULT_RECURSION_MULTIPLIER, PAGINATION_WRAPPERS,
    },
    error::CostError,
    schema::{FieldDefinition, Schema},
};
