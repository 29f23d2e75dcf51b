use serde::{Deserialize, Serialize};
use simcore::ConfigError;

/// Lambda reported when no fuel reaches the cylinder.
pub const LEAN_SENTINEL_LAMBDA: f64 = 5.0;

/// Exhaust oxygen saturates here on the lean side (%).
pub const O2_CEILING_PERCENT: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantParameters {
    /// Intake air flow at idle, before disturbances (g/s)
    pub base_air_flow_gs: f64,
    /// Air mass per fuel mass for complete combustion
    pub stoich_ratio: f64,
    /// Fraction of injected fuel that burns (1.0 = ideal fuel)
    pub fuel_quality_factor: f64,
}

impl Default for PlantParameters {
    fn default() -> Self {
        PlantParameters {
            base_air_flow_gs: 10.0,
            stoich_ratio: 14.7,
            fuel_quality_factor: 1.0,
        }
    }
}

impl PlantParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("base_air_flow_gs", self.base_air_flow_gs)?;
        ConfigError::require_positive("stoich_ratio", self.stoich_ratio)?;
        ConfigError::require_non_negative("fuel_quality_factor", self.fuel_quality_factor)?;
        Ok(())
    }
}

/// Result of one combustion event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combustion {
    pub lambda: f64,
    pub o2_percent: f64,
}

/// Normalized air/fuel ratio. Non-positive fuel flow maps to the lean sentinel
/// instead of dividing.
pub fn lambda_from_flows(air_flow: f64, fuel_flow: f64, stoich_ratio: f64) -> f64 {
    if fuel_flow > 0.0 {
        (air_flow / fuel_flow) / stoich_ratio
    } else {
        LEAN_SENTINEL_LAMBDA
    }
}

/// Residual exhaust oxygen as a function of lambda. Both branches meet at 0.5 % for lambda = 1.
pub fn o2_percent(lambda: f64) -> f64 {
    if lambda < 1.0 {
        // Rich: little oxygen left over
        0.1 + 0.4 * lambda
    } else {
        (0.5 + 3.5 * (lambda - 1.0)).min(O2_CEILING_PERCENT)
    }
}

#[derive(Debug, Clone)]
pub struct CombustionPlant {
    params: PlantParameters,
}

impl CombustionPlant {
    pub fn new(params: PlantParameters) -> Self {
        CombustionPlant { params }
    }

    /// Intake air after the step disturbance and flow noise are added (g/s)
    pub fn air_flow(&self, disturbance: f64, noise: f64) -> f64 {
        self.params.base_air_flow_gs + disturbance + noise
    }

    /// Fuel that actually burns, given the injector's commanded flow (g/s)
    pub fn effective_fuel_flow(&self, commanded_fuel_flow: f64) -> f64 {
        commanded_fuel_flow * self.params.fuel_quality_factor
    }

    pub fn combust(&self, air_flow: f64, fuel_flow_effective: f64) -> Combustion {
        let lambda = lambda_from_flows(air_flow, fuel_flow_effective, self.params.stoich_ratio);
        Combustion {
            lambda,
            o2_percent: o2_percent(lambda),
        }
    }

    pub fn parameters(&self) -> &PlantParameters {
        &self.params
    }
}
