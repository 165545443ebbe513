//! `kbflow validate`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use kbflow_runtime::graph::NodeId;
use serde::{Deserialize, Serialize};

use super::load_workflow;

/// Arguments for `kbflow validate`.
#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct ValidateArgs {
    /// Path to the workflow definition JSON.
    #[arg(long, short)]
    pub workflow: PathBuf,
}

pub(super) async fn execute(args: &ValidateArgs) -> anyhow::Result<()> {
    let definition = load_workflow(&args.workflow).await?;
    let order = definition
        .execution_order()
        .context("workflow is not valid")?;

    println!("{}", format_order(&order));
    Ok(())
}

fn format_order(order: &[NodeId]) -> String {
    order
        .iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_arrow_separated() {
        let order: Vec<NodeId> = ["q", "kb", "llm", "out"].into_iter().map(NodeId::from).collect();
        assert_eq!(format_order(&order), "q -> kb -> llm -> out");
    }

    #[test]
    fn single_node_has_no_arrow() {
        assert_eq!(format_order(&[NodeId::from("q")]), "q");
    }
}
