//! Export every supported resource kind in one run
//!
//! Kinds are exported concurrently. A kind that fails is reported and the
//! command exits non-zero, but fragments of the kinds that succeeded are
//! still emitted.

use anyhow::{Context as _, Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::export::{
    ClientSource, build_renderer, destination, emit, load_base, report_collisions,
    report_duplicate_blocks, state_text, validate_destination,
};
use crate::config::Config;
use crate::context::Context;
use crate::export::batch::{KindResult, export_parallel};
use crate::export::{RenderedTemplate, ResourceKind, StateAssembler, StateEntry};

#[derive(Debug, Clone, Default)]
pub struct AllOptions {
    pub tfstate: bool,
    pub merge: Option<PathBuf>,
    pub overwrite: bool,
    pub output: Option<PathBuf>,
    pub profile: Option<String>,
    pub region: Option<String>,
    /// Directory with one saved describe response per kind
    pub snapshot_dir: Option<PathBuf>,
    pub parallel: Option<usize>,
}

impl AllOptions {
    pub fn wants_state(&self) -> bool {
        self.tfstate || self.merge.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        validate_destination(self.merge.as_deref(), self.overwrite, self.output.as_deref())
    }

    pub fn destination(&self) -> Option<&Path> {
        destination(self.merge.as_deref(), self.overwrite, self.output.as_deref())
    }
}

/// Output of one kind
enum Fragment {
    Entries(Vec<(String, StateEntry)>),
    Text(RenderedTemplate),
}

pub struct AllCommand;

impl AllCommand {
    /// Execute the all command
    pub fn execute(ctx: &Context, config: &Config, options: &AllOptions) -> Result<()> {
        let (content, failures) = Self::run(ctx, config, options)?;
        emit(ctx, &content, options.destination())?;

        if failures > 0 {
            return Err(anyhow!(
                "{} of {} resource types failed to export",
                failures,
                ResourceKind::ALL.len()
            ));
        }

        Ok(())
    }

    /// Produce the combined content and the number of failed kinds
    pub fn run(ctx: &Context, config: &Config, options: &AllOptions) -> Result<(String, usize)> {
        options.validate()?;

        let source = match &options.snapshot_dir {
            Some(dir) => ClientSource::SnapshotDir(ctx.fs.clone(), dir.clone()),
            None => ClientSource::resolve(
                ctx,
                config,
                None,
                options.profile.clone(),
                options.region.clone(),
            ),
        };

        let parallelism = options.parallel.unwrap_or_else(|| config.parallelism());
        let wants_state = options.wants_state();

        // Loaded before any provider call so a bad base fails fast
        let base = options
            .merge
            .as_deref()
            .map(|path| load_base(ctx, path))
            .transpose()?;

        let renderer = if wants_state {
            None
        } else {
            Some(Arc::new(build_renderer(ctx, config, None)?))
        };

        ctx.output.section("Exporting all resource types");
        ctx.output.key_value("Source", &source.describe());
        ctx.output.key_value("Parallelism", &parallelism.to_string());

        let source = Arc::new(source);
        let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

        let results = runtime.block_on(export_parallel(
            ResourceKind::ALL.to_vec(),
            parallelism,
            move |kind| {
                let exporter = source.exporter(kind);
                match &renderer {
                    Some(renderer) => exporter.render_template(renderer).map(Fragment::Text),
                    None => exporter.entries().map(Fragment::Entries),
                }
            },
        ));

        let failures = Self::report(ctx, &results);

        let content = if wants_state {
            let entries = results
                .into_iter()
                .filter_map(|r| r.outcome.ok())
                .flat_map(|fragment| match fragment {
                    Fragment::Entries(entries) => entries,
                    Fragment::Text(_) => Vec::new(),
                });

            let assembled = StateAssembler::assemble(entries, base)?;
            report_collisions(ctx, &assembled.collisions);
            state_text(&assembled.document)?
        } else {
            let mut text = String::new();
            for fragment in results.into_iter().filter_map(|r| r.outcome.ok()) {
                if let Fragment::Text(rendered) = fragment {
                    report_duplicate_blocks(ctx, &rendered.collisions);
                    text.push_str(&rendered.text);
                }
            }
            text
        };

        Ok((content, failures))
    }

    /// Print one line per kind and return the number of failures
    fn report(ctx: &Context, results: &[KindResult<Fragment>]) -> usize {
        let mut failures = 0;

        for result in results {
            let tf_type = result.kind.info().tf_type;
            match &result.outcome {
                Ok(_) => ctx.output.success(&format!("{} exported", tf_type)),
                Err(e) => {
                    failures += 1;
                    ctx.output.error(&format!("{} failed: {}", tf_type, e));
                }
            }
        }

        failures
    }
}
