use handlebars::{
    Handlebars, Helper, HelperResult, Output, RenderContext, RenderError, RenderErrorReason,
};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::export::classifier::{Ec2VpcClassifier, NetworkClassifier};
use crate::export::error::{ExportError, ExportResult};
use crate::export::identifier;
use crate::export::projector::CacheClusterProjector;
use crate::provider::types::{CacheCluster, Instance};
use crate::traits::FileSystem;

/// Suffix of template files, both built-in and overrides
pub const TEMPLATE_SUFFIX: &str = ".tf.hbs";

/// Templates compiled into the binary, keyed by template name
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("ec2", include_str!("../../templates/ec2.tf.hbs")),
    (
        "elasticache_cluster",
        include_str!("../../templates/elasticache_cluster.tf.hbs"),
    ),
];

/// Renders Terraform configuration using Handlebars
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Create a renderer with the built-in templates registered
    pub fn new() -> ExportResult<Self> {
        let mut handlebars = Handlebars::new();

        // Terraform source, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        // Register custom helpers
        handlebars.register_helper("eq", Box::new(eq_helper));
        handlebars.register_helper("contains", Box::new(contains_helper));
        handlebars.register_helper("tf_name", Box::new(tf_name_helper));
        handlebars.register_helper("quoted_list", Box::new(quoted_list_helper));
        handlebars.register_helper("tag_value", Box::new(tag_value_helper));
        handlebars.register_helper("in_vpc", Box::new(in_vpc_helper));
        handlebars.register_helper("cluster_port", Box::new(cluster_port_helper));
        handlebars.register_helper("required", Box::new(required_helper));

        for (name, source) in BUILTIN_TEMPLATES {
            handlebars.register_template_string(name, *source)?;
        }

        Ok(Self { handlebars })
    }

    /// Replace built-in templates with same-named files found in `dir`
    ///
    /// Returns the files that replaced a built-in. Files that do not match a
    /// built-in template name are ignored.
    pub fn load_overrides(&mut self, fs: &dyn FileSystem, dir: &Path) -> ExportResult<Vec<PathBuf>> {
        if !fs.is_dir(dir) {
            return Err(ExportError::InvalidInput(format!(
                "Templates directory not found: {}",
                dir.display()
            )));
        }

        let entries = fs
            .walk_dir(dir, 1)
            .map_err(|e| ExportError::Template(format!("{:#}", e)))?;

        let mut overridden = Vec::new();

        for path in entries.iter().filter(|p| fs.is_file(p)) {
            let Some(name) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(TEMPLATE_SUFFIX))
            else {
                continue;
            };

            if !self.has_builtin(name) {
                continue;
            }

            self.register_file(fs, name, path)?;
            overridden.push(path.clone());
        }

        Ok(overridden)
    }

    /// Register (or replace) template `name` with the contents of `path`
    pub fn register_file(&mut self, fs: &dyn FileSystem, name: &str, path: &Path) -> ExportResult<()> {
        let source = fs.read_to_string(path).map_err(|e| {
            ExportError::Template(format!("Failed to read template {}: {:#}", path.display(), e))
        })?;

        self.handlebars
            .register_template_string(name, source)
            .map_err(|e| {
                ExportError::Template(format!("Invalid template {}: {}", path.display(), e))
            })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    fn has_builtin(&self, name: &str) -> bool {
        BUILTIN_TEMPLATES.iter().any(|(builtin, _)| *builtin == name)
    }

    /// Render template `name` against `data`
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> ExportResult<String> {
        if !self.has_template(name) {
            return Err(ExportError::Template(format!("Unknown template: {}", name)));
        }

        Ok(self.handlebars.render(name, data)?)
    }
}

fn helper_error(helper: &str, message: impl std::fmt::Display) -> RenderError {
    RenderErrorReason::Other(format!("{}: {}", helper, message)).into()
}

/// Helper function for equality comparison
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).map(|v| v.value());
    let param2 = h.param(1).map(|v| v.value());

    if let (Some(p1), Some(p2)) = (param1, param2) {
        if p1 == p2 {
            out.write("true")?;
        }
    }

    Ok(())
}

/// Helper function to check if an array contains a value
fn contains_helper(
    h: &Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let array = h.param(0).and_then(|v| v.value().as_array());
    let search_value = h.param(1).and_then(|v| v.value().as_str());

    if let (Some(arr), Some(search)) = (array, search_value) {
        if arr.iter().any(|item| item.as_str() == Some(search)) {
            out.write("true")?;
        }
    }

    Ok(())
}

/// Value of the tag called `key` in a raw `[{Key, Value}]` list
fn find_tag<'a>(tags: &'a [Value], key: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.get("Key").and_then(Value::as_str) == Some(key))
        .and_then(|tag| tag.get("Value").and_then(Value::as_str))
}

/// `{{tf_name Tags InstanceId}}` or `{{tf_name CacheClusterId}}`
fn tf_name_helper(
    h: &Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let first = h.param(0).map(|p| p.value());
    let fallback = h.param(1).and_then(|p| p.value().as_str());

    let label = match first {
        Some(Value::Array(tags)) => find_tag(tags, "Name")
            .filter(|name| !name.is_empty())
            .or(fallback)
            .unwrap_or_default(),
        Some(Value::String(label)) => label.as_str(),
        _ => fallback.unwrap_or_default(),
    };

    out.write(identifier::normalize(label).as_str())?;
    Ok(())
}

/// `{{quoted_list SecurityGroups "GroupId"}}` renders `["sg-1", "sg-2"]`
fn quoted_list_helper(
    h: &Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let items = h
        .param(0)
        .and_then(|v| v.value().as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();
    let field = h.param(1).and_then(|v| v.value().as_str());

    let quoted: Vec<String> = items
        .iter()
        .filter_map(|item| match field {
            Some(field) => item.get(field).and_then(Value::as_str),
            None => item.as_str(),
        })
        .map(|value| format!("\"{}\"", value))
        .collect();

    out.write(&format!("[{}]", quoted.join(", ")))?;
    Ok(())
}

/// `{{tag_value Tags "Environment"}}`
fn tag_value_helper(
    h: &Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let tags = h.param(0).and_then(|v| v.value().as_array());
    let key = h.param(1).and_then(|v| v.value().as_str());

    if let (Some(tags), Some(key)) = (tags, key) {
        if let Some(value) = find_tag(tags, key) {
            out.write(value)?;
        }
    }

    Ok(())
}

/// Writes `true` when the instance passed in is a VPC member
fn in_vpc_helper(
    h: &Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h
        .param(0)
        .map(|p| p.value().clone())
        .ok_or_else(|| helper_error("in_vpc", "missing instance parameter"))?;

    let instance: Instance =
        serde_json::from_value(value).map_err(|e| helper_error("in_vpc", e))?;

    if Ec2VpcClassifier.is_private_network_member(&instance) {
        out.write("true")?;
    }

    Ok(())
}

/// Writes the port a cache cluster listens on
fn cluster_port_helper(
    h: &Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h
        .param(0)
        .map(|p| p.value().clone())
        .ok_or_else(|| helper_error("cluster_port", "missing cluster parameter"))?;

    let cluster: CacheCluster =
        serde_json::from_value(value).map_err(|e| helper_error("cluster_port", e))?;

    let port = CacheClusterProjector::resolve_port(&cluster).ok_or_else(|| {
        helper_error(
            "cluster_port",
            format!("no port for cache cluster {}", cluster.cache_cluster_id),
        )
    })?;

    out.write(&port.to_string())?;
    Ok(())
}

/// `{{required NumCacheNodes "NumCacheNodes"}}` writes the value or fails the render
fn required_helper(
    h: &Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let field = h
        .param(1)
        .and_then(|p| p.value().as_str())
        .unwrap_or("value");

    match h.param(0).map(|p| p.value()) {
        Some(Value::String(s)) if !s.is_empty() => out.write(s)?,
        Some(Value::Number(n)) => out.write(&n.to_string())?,
        Some(Value::Bool(b)) => out.write(&b.to_string())?,
        _ => return Err(helper_error("required", format!("{} is missing", field))),
    }

    Ok(())
}
