use anyhow::Result;
use clap::Args;
use lytics_sdk::LyticsClient;
use serde_json::Value;
use tracing::info;

#[derive(Args, Debug)]
pub struct FunctionArgs {
    /// Function name, e.g. `todate`
    name: String,

    /// Literal parameters passed to the function
    params: Vec<String>,
}

/// Strings print without quotes; everything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub async fn run(client: &LyticsClient, args: FunctionArgs) -> Result<()> {
    let params: Vec<&str> = args.params.iter().map(String::as_str).collect();
    info!("Calling {}({})", args.name, params.join(", "));

    match client.test_function(&args.name, &params).await? {
        Some(value) => info!("Result: {}", display_value(&value)),
        None => info!("Result: no value"),
    }
    Ok(())
}
