use crate::cli::{SchemaArgs, SchemaTarget};
use crate::config::Config;
use crate::rules::RulePayload;
use crate::specialist::CombinedAnalysis;
use schemars::schema_for;

pub fn execute(args: SchemaArgs) -> anyhow::Result<()> {
    let schema = match args.target {
        SchemaTarget::Config => schema_for!(Config),
        SchemaTarget::Analysis => schema_for!(CombinedAnalysis),
        SchemaTarget::Payload => schema_for!(RulePayload),
    };
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{}", json);
    Ok(())
}
