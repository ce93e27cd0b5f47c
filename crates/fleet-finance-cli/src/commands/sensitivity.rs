use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fleet_finance_core::sensitivity::{self, Model, SensitivityInput, SensitivityVariable};

use crate::input;

/// Arguments for sensitivity analysis
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a JSON file holding a complete sensitivity request
    #[arg(long)]
    pub input: Option<String>,

    /// Model to sweep: emi (loan), tco, freight, passenger
    #[arg(long)]
    pub model: Option<String>,

    /// First sensitivity variable in format name:min:max:step
    /// (e.g. "fuel_price:85:110:5")
    #[arg(long)]
    pub var1: Option<String>,

    /// Second sensitivity variable (optional, creates a 2D table)
    #[arg(long)]
    pub var2: Option<String>,

    /// Path to JSON file with base case inputs for the model
    #[arg(long)]
    pub base_inputs: Option<String>,

    /// Output field to tabulate, dotted for nested fields (e.g. "monthly.profit")
    #[arg(long)]
    pub metric: Option<String>,
}

fn parse_sens_var(spec: &str) -> Result<SensitivityVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sensitivity variable must be name:min:max:step, got '{}'",
            spec
        )
        .into());
    }
    Ok(SensitivityVariable {
        name: parts[0].to_string(),
        min: parts[1].parse::<Decimal>()?,
        max: parts[2].parse::<Decimal>()?,
        step: parts[3].parse::<Decimal>()?,
    })
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input: SensitivityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else {
        let model: Model = args
            .model
            .as_deref()
            .ok_or("--model is required (or provide --input)")?
            .parse()?;
        let var1 = parse_sens_var(
            args.var1
                .as_deref()
                .ok_or("--var1 is required (or provide --input)")?,
        )?;
        let var2 = args.var2.as_deref().map(parse_sens_var).transpose()?;
        let base_inputs: Value = match args.base_inputs {
            Some(ref path) => input::file::read_json_value(path)?,
            None => input::stdin::read_stdin()?
                .ok_or("--base-inputs file or piped JSON is required")?,
        };
        SensitivityInput {
            model,
            base_inputs,
            variable_1: var1,
            variable_2: var2,
            output_metric: args
                .metric
                .ok_or("--metric is required (or provide --input)")?,
        }
    };

    let _span = tracing::info_span!("sensitivity", model = %sens_input.model).entered();
    tracing::debug!(
        var1 = %sens_input.variable_1.name,
        var2 = ?sens_input.variable_2.as_ref().map(|v| v.name.as_str()),
        metric = %sens_input.output_metric,
        "running sweep"
    );
    let result = sensitivity::run_sensitivity(&sens_input)?;
    tracing::info!(
        rows = result.result.matrix.len(),
        warnings = result.warnings.len(),
        "sweep complete"
    );
    Ok(serde_json::to_value(result)?)
}
