use std::{fs, path::Path};

use anyhow::{anyhow, Context as _};
use graphql_cost::{calculate_cost, extract_costs, CostControl, CostMap, CostOptions, Variables};

use crate::{
    args::{CostArgs, ExtractArgs},
    config,
};

pub(crate) fn extract(args: &ExtractArgs) -> anyhow::Result<()> {
    let extracted = extract_costs(&read(&args.schema)?)?;

    if let Some(path) = &args.clean_schema {
        fs::write(path, &extracted.clean_schema).with_context(|| format!("could not write {}", path.display()))?;
    }

    println!("{}", serde_json::to_string_pretty(&extracted.cost_map)?);

    Ok(())
}

pub(crate) fn cost(args: &CostArgs) -> anyhow::Result<()> {
    let config = config::load(args.config.as_deref())?;
    let control = CostControl::from(&config.cost_control);

    let cost = compute(args, &control)?;
    println!("{cost}");

    control.check(cost, args.operation_name.as_deref())?;

    Ok(())
}

fn compute(args: &CostArgs, control: &CostControl) -> anyhow::Result<f64> {
    let extracted = extract_costs(&read(&args.schema)?)?;

    let cost_map: CostMap = match &args.cost_map {
        Some(path) => {
            serde_json::from_str(&read(path)?).with_context(|| format!("invalid cost table in {}", path.display()))?
        }
        None => extracted.cost_map,
    };

    let variables = args.variables.as_deref().map(read_variables).transpose()?;

    let mut options = CostOptions::default()
        .with_cost_map(&cost_map)
        .with_default_cost(args.default_cost.unwrap_or_else(|| control.default_cost()));

    if let Some(variables) = &variables {
        options = options.with_variables(variables);
    }

    if let Some(operation_name) = &args.operation_name {
        options = options.with_operation_name(operation_name);
    }

    let query = read(&args.query)?;
    let cost = calculate_cost(&query, &extracted.clean_schema, &options)?;

    tracing::info!("Computed a cost of {cost} for {}", args.query.display());

    Ok(cost)
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
}

fn read_variables(path: &Path) -> anyhow::Result<Variables> {
    match serde_json::from_str(&read(path)?)? {
        serde_json::Value::Object(variables) => Ok(variables),
        _ => Err(anyhow!("the variables in {} must be a JSON object", path.display())),
    }
}
