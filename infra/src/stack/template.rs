//! Declarative description of the resources handed to the provisioning
//! collaborator. The layout follows CloudFormation templates so it can be
//! read, diffed and checked by existing template tooling.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Value};

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
}

impl Resource {
    /// `properties` must be a JSON object, anything else yields a resource
    /// without properties.
    pub fn new(resource_type: &str, properties: Value) -> Self {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Resource {
            resource_type: resource_type.to_string(),
            properties,
            depends_on: vec![],
            deletion_policy: None,
            update_replace_policy: None,
        }
    }

    pub fn depends_on<I, S>(mut self, logical_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(logical_ids.into_iter().map(Into::into));
        self
    }

    /// Removes the physical resource when it leaves the template.
    pub fn destroy_on_removal(mut self) -> Self {
        self.deletion_policy = Some(String::from("Delete"));
        self.update_replace_policy = Some(String::from("Delete"));
        self
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    pub name: String,
}

impl Output {
    pub fn new(value: Value) -> Self {
        Output {
            description: None,
            value,
            export: None,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn export(mut self, name: String) -> Self {
        self.export = Some(Export { name });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Resources")]
    pub resources: IndexMap<String, Resource>,
    #[serde(rename = "Outputs", skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, Output>,
}

impl Template {
    pub fn new(description: String) -> Self {
        Template {
            format_version: String::from(TEMPLATE_FORMAT_VERSION),
            description,
            resources: IndexMap::new(),
            outputs: IndexMap::new(),
        }
    }

    /// Adds `resource` under `logical_id`, replacing any previous resource
    /// with the same id.
    pub fn add_resource(&mut self, logical_id: &str, resource: Resource) {
        if self.resources.insert(logical_id.to_string(), resource).is_some() {
            log::warn!("resource {} defined twice, keeping the last definition", logical_id);
        }
    }

    pub fn add_output(&mut self, name: &str, output: Output) {
        self.outputs.insert(name.to_string(), output);
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }

    pub fn resources_of_type<'t>(
        &'t self,
        resource_type: &'t str,
    ) -> impl Iterator<Item = (&'t String, &'t Resource)> + 't {
        self.resources
            .iter()
            .filter(move |(_, resource)| resource.resource_type == resource_type)
    }

    pub fn count_of_type(&self, resource_type: &str) -> usize {
        self.resources_of_type(resource_type).count()
    }

    /// Number of resources per type, in order of first appearance.
    pub fn type_counts(&self) -> IndexMap<&str, usize> {
        self.resources
            .values()
            .fold(IndexMap::new(), |mut counts, resource| {
                *counts.entry(resource.resource_type.as_str()).or_insert(0) += 1;
                counts
            })
    }

    pub fn to_json(&self) -> crate::errors::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

//
// Intrinsic functions
//

pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

pub fn sub(template: String) -> Value {
    json!({ "Fn::Sub": template })
}
