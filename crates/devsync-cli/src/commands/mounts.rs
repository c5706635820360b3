//! Mounts command - Show the watch roots for a set of volumes
//!
//! Provides the `devsync mounts` CLI command which:
//! 1. Collects volume paths from the command line or the compose file
//! 2. Resolves them into the minimal set of mounts
//! 3. Prints each mount with what it synchronizes

use anyhow::Result;
use clap::Args;
use devsync_core::domain::Mount;
use tracing::info;

use super::{resolution_json, resolve_volumes, CliContext, VolumeArgs};

#[derive(Debug, Args)]
pub struct MountsCommand {
    #[command(flatten)]
    pub volumes: VolumeArgs,
}

impl MountsCommand {
    pub fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();

        let volumes = self.volumes.collect(&ctx.config, formatter.as_ref())?;
        info!(volumes = volumes.len(), "Resolving mounts");
        let resolution = resolve_volumes(&volumes, ctx.config.sync.strict, formatter.as_ref())?;

        if ctx.format.is_json() {
            formatter.print_json(&resolution_json(&resolution)?);
            return Ok(());
        }

        formatter.success(&format!(
            "{} mount{} for {} volume{}",
            resolution.mounts.len(),
            plural(resolution.mounts.len()),
            volumes.len(),
            plural(volumes.len()),
        ));
        for mount in &resolution.mounts {
            formatter.item(&describe(mount));
        }

        Ok(())
    }
}

/// One-line description of a mount
fn describe(mount: &Mount) -> String {
    if mount.sync_all {
        format!("{}  (entire directory)", mount.path)
    } else {
        format!("{}  include: {}", mount.path, mount.include.join(", "))
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
