//! Per-resource-type export pipeline
//!
//! fetch -> project -> assemble for state, fetch -> render for templates.

use serde_json::{Map, Value};
use std::sync::Arc;

use super::error::ExportResult;
use super::kind::ResourceKind;
use super::projector::{AttributeProjector, CacheClusterProjector, Ec2Projector};
use super::state::{AssembledState, StateAssembler, StateDocument, StateEntry, repeated_keys};
use crate::provider::{Ec2Api, ElastiCacheApi};
use crate::template::TemplateRenderer;

type FetchFn<R> = Box<dyn Fn() -> ExportResult<Vec<R>> + Send + Sync>;

/// Rendered configuration of one kind
#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    pub text: String,
    /// Resource addresses rendered by more than one record
    pub collisions: Vec<String>,
}

/// Exports every record of one resource kind
pub struct Exporter<P: AttributeProjector> {
    kind: ResourceKind,
    projector: P,
    fetch: FetchFn<P::Record>,
}

impl<P: AttributeProjector> Exporter<P> {
    pub fn new<F>(kind: ResourceKind, projector: P, fetch: F) -> Self
    where
        F: Fn() -> ExportResult<Vec<P::Record>> + Send + Sync + 'static,
    {
        Self {
            kind,
            projector,
            fetch: Box::new(fetch),
        }
    }

    /// Describe all records through the provider client
    pub fn fetch(&self) -> ExportResult<Vec<P::Record>> {
        (self.fetch)()
    }

    /// Render the declarative template from the unprojected records
    pub fn render_template(&self, renderer: &TemplateRenderer) -> ExportResult<RenderedTemplate> {
        let records = self.fetch()?;
        let info = self.kind.info();

        let collisions = repeated_keys(records.iter().map(|r| self.projector.composite_key(r)));

        let mut context = Map::new();
        context.insert(info.collection.to_string(), serde_json::to_value(&records)?);

        Ok(RenderedTemplate {
            text: renderer.render(info.template, &Value::Object(context))?,
            collisions,
        })
    }

    /// Keyed state entries for every record, in provider order
    pub fn entries(&self) -> ExportResult<Vec<(String, StateEntry)>> {
        self.fetch()?
            .iter()
            .map(|record| self.projector.entry(record))
            .collect()
    }

    /// Project every record and fold the entries into `base`
    pub fn render_state(&self, base: Option<StateDocument>) -> ExportResult<AssembledState> {
        StateAssembler::assemble(self.entries()?, base)
    }
}

impl Exporter<Ec2Projector> {
    pub fn ec2(client: Arc<dyn Ec2Api>) -> Self {
        Self::new(ResourceKind::Ec2Instance, Ec2Projector::new(), move || {
            client.describe_instances()
        })
    }
}

impl Exporter<CacheClusterProjector> {
    pub fn cache_clusters(client: Arc<dyn ElastiCacheApi>) -> Self {
        Self::new(
            ResourceKind::CacheCluster,
            CacheClusterProjector::new(),
            move || client.describe_cache_clusters(true),
        )
    }
}

/// Object-safe view of an exporter, used where kinds are handled uniformly
pub trait KindExporter: Send + Sync {
    fn render_template(&self, renderer: &TemplateRenderer) -> ExportResult<RenderedTemplate>;
    fn entries(&self) -> ExportResult<Vec<(String, StateEntry)>>;
    fn render_state(&self, base: Option<StateDocument>) -> ExportResult<AssembledState>;
}

impl<P: AttributeProjector> KindExporter for Exporter<P> {
    fn render_template(&self, renderer: &TemplateRenderer) -> ExportResult<RenderedTemplate> {
        Exporter::render_template(self, renderer)
    }

    fn entries(&self) -> ExportResult<Vec<(String, StateEntry)>> {
        Exporter::entries(self)
    }

    fn render_state(&self, base: Option<StateDocument>) -> ExportResult<AssembledState> {
        Exporter::render_state(self, base)
    }
}

/// Build the exporter for `kind` from the matching provider client
pub fn exporter_for<T>(kind: ResourceKind, client: Arc<T>) -> Box<dyn KindExporter>
where
    T: Ec2Api + ElastiCacheApi + 'static,
{
    match kind {
        ResourceKind::Ec2Instance => Box::new(Exporter::ec2(client)),
        ResourceKind::CacheCluster => Box::new(Exporter::cache_clusters(client)),
    }
}
