use anyhow::Result;

use crate::context::Context;
use crate::export::ResourceKind;

pub struct ListCommand;

impl ListCommand {
    /// Execute the list command
    pub fn execute(ctx: &Context) -> Result<()> {
        ctx.output.section("Supported resource types");

        crate::output::table_header(&["COMMAND", "TERRAFORM TYPE", "DESCRIPTION"]);
        for (command, tf_type, description) in Self::rows() {
            crate::output::table_row(&[command, tf_type, description]);
        }

        Ok(())
    }

    fn rows() -> Vec<(&'static str, &'static str, &'static str)> {
        ResourceKind::ALL
            .iter()
            .map(|kind| {
                let info = kind.info();
                (info.command, info.tf_type, info.description)
            })
            .collect()
    }
}
