//! Agent config command - Render the sync agent's folder configuration
//!
//! Resolves the requested volumes the same way `devsync mounts` does, then
//! turns each mount into an agent folder entry. The result is printed, or
//! written as `folders.json` with `--write`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use devsync_sync::AgentFolders;
use tracing::info;

use super::{resolve_volumes, CliContext, VolumeArgs};

#[derive(Debug, Args)]
pub struct AgentConfigCommand {
    #[command(flatten)]
    pub volumes: VolumeArgs,

    /// Write folders.json instead of printing it (defaults to agent.config_dir)
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    pub write: Option<Option<PathBuf>>,
}

impl AgentConfigCommand {
    pub fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();

        let volumes = self.volumes.collect(&ctx.config, formatter.as_ref())?;
        let resolution = resolve_volumes(&volumes, ctx.config.sync.strict, formatter.as_ref())?;
        let folders = AgentFolders::from_mounts(&resolution.mounts, &ctx.config.agent);
        info!(folders = folders.folders.len(), "Rendered agent folders");

        let Some(target) = &self.write else {
            // Printed even with --quiet
            println!("{}", folders.to_json()?);
            return Ok(());
        };

        let dir = target
            .clone()
            .unwrap_or_else(|| ctx.config.agent.config_dir.clone());
        let written = folders.write_to(&dir)?;

        if ctx.format.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "path": written.display().to_string(),
                "folders": folders.folders.len(),
            }));
        } else {
            formatter.success(&format!(
                "Wrote {} folder{} to {}",
                folders.folders.len(),
                if folders.folders.len() == 1 { "" } else { "s" },
                written.display()
            ));
        }

        Ok(())
    }
}
