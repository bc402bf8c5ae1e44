use anyhow::{Context as _, Result, bail};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::context::Context;
use crate::export::{KindExporter, ResourceKind, StateDocument, exporter_for};
use crate::provider::{AwsCliClient, SnapshotClient};
use crate::template::TemplateRenderer;
use crate::traits::FileSystem;

/// Options shared by the single-kind export commands
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub tfstate: bool,
    pub merge: Option<PathBuf>,
    pub overwrite: bool,
    pub output: Option<PathBuf>,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub from_file: Option<PathBuf>,
    pub template: Option<PathBuf>,
}

impl ExportOptions {
    /// `--merge` implies `--tfstate`
    pub fn wants_state(&self) -> bool {
        self.tfstate || self.merge.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        validate_destination(self.merge.as_deref(), self.overwrite, self.output.as_deref())?;

        if self.template.is_some() && self.wants_state() {
            bail!("--template only applies to Terraform configuration, not to --tfstate");
        }

        Ok(())
    }

    /// Where generated content goes; `None` means stdout
    pub fn destination(&self) -> Option<&Path> {
        destination(self.merge.as_deref(), self.overwrite, self.output.as_deref())
    }
}

pub(crate) fn validate_destination(
    merge: Option<&Path>,
    overwrite: bool,
    output: Option<&Path>,
) -> Result<()> {
    if overwrite && merge.is_none() {
        bail!("--overwrite requires --merge");
    }

    if overwrite && output.is_some() {
        bail!("--overwrite writes to the --merge file and cannot be combined with --output");
    }

    Ok(())
}

pub(crate) fn destination<'a>(
    merge: Option<&'a Path>,
    overwrite: bool,
    output: Option<&'a Path>,
) -> Option<&'a Path> {
    if overwrite { merge } else { output }
}

/// Where provider records come from
pub enum ClientSource {
    /// One saved describe response
    SnapshotFile(Arc<dyn FileSystem>, PathBuf),
    /// A directory holding one saved response per kind
    SnapshotDir(Arc<dyn FileSystem>, PathBuf),
    AwsCli(Arc<AwsCliClient>),
}

impl ClientSource {
    /// Snapshot file when given, otherwise the aws CLI with layered settings
    pub fn resolve(
        ctx: &Context,
        config: &Config,
        from_file: Option<&Path>,
        profile: Option<String>,
        region: Option<String>,
    ) -> Self {
        match from_file {
            Some(path) => ClientSource::SnapshotFile(ctx.fs.clone(), path.to_path_buf()),
            None => ClientSource::AwsCli(Arc::new(AwsCliClient::new(
                ctx.command.clone(),
                config.aws_settings(profile, region),
            ))),
        }
    }

    pub fn exporter(&self, kind: ResourceKind) -> Box<dyn KindExporter> {
        match self {
            ClientSource::SnapshotFile(fs, path) => {
                exporter_for(kind, Arc::new(SnapshotClient::new(fs.clone(), path.clone())))
            }
            ClientSource::SnapshotDir(fs, dir) => exporter_for(
                kind,
                Arc::new(SnapshotClient::new(
                    fs.clone(),
                    dir.join(kind.info().snapshot_file),
                )),
            ),
            ClientSource::AwsCli(client) => exporter_for(kind, client.clone()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ClientSource::SnapshotFile(_, path) => format!("snapshot {}", path.display()),
            ClientSource::SnapshotDir(_, dir) => format!("snapshots in {}", dir.display()),
            ClientSource::AwsCli(_) => "aws CLI".to_string(),
        }
    }
}

/// Read and validate the state document passed with `--merge`
pub fn load_base(ctx: &Context, path: &Path) -> Result<StateDocument> {
    let content = ctx
        .fs
        .read_to_string(path)
        .with_context(|| format!("Failed to read base state: {}", path.display()))?;

    StateDocument::from_json(&content)
        .with_context(|| format!("Cannot merge into {}", path.display()))
}

/// Renderer with configured overrides and an optional per-kind template file
pub fn build_renderer(
    ctx: &Context,
    config: &Config,
    template: Option<(ResourceKind, &Path)>,
) -> Result<TemplateRenderer> {
    let mut renderer = TemplateRenderer::new()?;

    if let Some(dir) = &config.templates_dir {
        for path in renderer.load_overrides(&*ctx.fs, dir)? {
            ctx.output
                .dimmed(&format!("Using template override {}", path.display()));
        }
    }

    if let Some((kind, path)) = template {
        renderer.register_file(&*ctx.fs, kind.info().template, path)?;
    }

    Ok(renderer)
}

/// Warn about composite keys produced by more than one record
pub fn report_collisions(ctx: &Context, collisions: &[String]) {
    for key in collisions {
        ctx.output.warning(&format!(
            "Several resources map to '{}'; only the last one is kept",
            key
        ));
    }
}

/// Warn about resource addresses rendered as more than one block
pub fn report_duplicate_blocks(ctx: &Context, collisions: &[String]) {
    for address in collisions {
        ctx.output.warning(&format!(
            "Several resources render as '{}'; Terraform rejects duplicate resource blocks",
            address
        ));
    }
}

/// Write generated content to `destination`, or to stdout
pub fn emit(ctx: &Context, content: &str, destination: Option<&Path>) -> Result<()> {
    match destination {
        Some(path) => {
            ctx.fs
                .write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            ctx.output.success(&format!("Wrote {}", path.display()));
        }
        None => print!("{}", content),
    }

    Ok(())
}

/// Pretty JSON with a trailing newline
pub fn state_text(document: &StateDocument) -> Result<String> {
    let mut text = document.to_json_pretty()?;
    text.push('\n');
    Ok(text)
}

pub struct ExportCommand;

impl ExportCommand {
    /// Execute the export command for a single resource kind
    pub fn execute(
        ctx: &Context,
        config: &Config,
        kind: ResourceKind,
        options: &ExportOptions,
    ) -> Result<()> {
        let content = Self::run(ctx, config, kind, options)?;
        emit(ctx, &content, options.destination())
    }

    /// Produce the generated content without emitting it
    pub fn run(
        ctx: &Context,
        config: &Config,
        kind: ResourceKind,
        options: &ExportOptions,
    ) -> Result<String> {
        options.validate()?;

        let source = ClientSource::resolve(
            ctx,
            config,
            options.from_file.as_deref(),
            options.profile.clone(),
            options.region.clone(),
        );
        let exporter = source.exporter(kind);
        let info = kind.info();

        ctx.output
            .info(&format!("Exporting {} from {}", info.description, source.describe()));

        if options.wants_state() {
            let base = options
                .merge
                .as_deref()
                .map(|path| load_base(ctx, path))
                .transpose()?;

            let assembled = exporter
                .render_state(base)
                .with_context(|| format!("Failed to export {}", info.tf_type))?;

            report_collisions(ctx, &assembled.collisions);
            ctx.output.dimmed(&format!(
                "{} resources in state, serial {}",
                assembled.document.resource_count(),
                assembled.document.serial
            ));

            state_text(&assembled.document)
        } else {
            let renderer = build_renderer(
                ctx,
                config,
                options.template.as_deref().map(|path| (kind, path)),
            )?;

            let rendered = exporter
                .render_template(&renderer)
                .with_context(|| format!("Failed to export {}", info.tf_type))?;

            report_duplicate_blocks(ctx, &rendered.collisions);
            Ok(rendered.text)
        }
    }
}
