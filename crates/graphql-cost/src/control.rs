//! Admission of operations based on their computed cost.

use serde::Deserialize;

const DEFAULT_FIELD_COST: f64 = 1.0;

/// The `[cost_control]` configuration section.
#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CostControlConfig {
    pub mode: Option<CostControlMode>,
    pub limit: Option<f64>,
    /// Cost of fields without a cost entry.
    pub default_cost: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CostControlMode {
    Measure,
    Enforce,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum CostControl {
    #[default]
    Disabled,
    /// Operations costing more than the limit are rejected.
    Enforce { limit: f64, default_cost: f64 },
    /// Costs are computed and logged.
    ///
    /// An optional limit is only used to report operations that would have
    /// been rejected.
    Measure { limit: Option<f64>, default_cost: f64 },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Cost ({cost}) exceeded the limit ({limit}) for query operation {operation}")]
pub struct CostLimitExceeded {
    pub cost: f64,
    pub limit: f64,
    pub operation: String,
}

impl CostControl {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, CostControl::Disabled)
    }

    pub fn is_enforce(&self) -> bool {
        matches!(self, CostControl::Enforce { .. })
    }

    pub fn limit(&self) -> Option<f64> {
        match self {
            CostControl::Disabled => None,
            CostControl::Enforce { limit, .. } => Some(*limit),
            CostControl::Measure { limit, .. } => *limit,
        }
    }

    pub fn default_cost(&self) -> f64 {
        match self {
            CostControl::Disabled => DEFAULT_FIELD_COST,
            CostControl::Enforce { default_cost, .. } | CostControl::Measure { default_cost, .. } => *default_cost,
        }
    }

    /// Decides whether an operation of the given cost may run.
    ///
    /// Only enforcement rejects. Measuring logs operations above the limit and
    /// lets them through.
    pub fn check(&self, cost: f64, operation_name: Option<&str>) -> Result<(), CostLimitExceeded> {
        let Some(limit) = self.limit() else {
            return Ok(());
        };

        if cost <= limit {
            return Ok(());
        }

        let error = CostLimitExceeded {
            cost,
            limit,
            operation: operation_name.unwrap_or("(anonymous)").to_owned(),
        };

        if self.is_enforce() {
            return Err(error);
        }

        tracing::info!("{error}. Operation allowed since cost control only measures.");
        Ok(())
    }
}

impl From<&CostControlConfig> for CostControl {
    fn from(config: &CostControlConfig) -> Self {
        let default_cost = config.default_cost.unwrap_or(DEFAULT_FIELD_COST);

        match (config.mode, config.limit) {
            (None, _) => CostControl::Disabled,
            (Some(CostControlMode::Enforce), Some(limit)) => CostControl::Enforce { limit, default_cost },
            (Some(CostControlMode::Enforce), None) => {
                tracing::warn!(
                    "Cost control is configured to enforce limits but a limit was not configured.  Cost will only be measured"
                );
                CostControl::Measure {
                    limit: None,
                    default_cost,
                }
            }
            (Some(CostControlMode::Measure), limit) => CostControl::Measure { limit, default_cost },
        }
    }
}
