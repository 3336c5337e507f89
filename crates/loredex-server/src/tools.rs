//! Tool catalog and result envelopes
//!
//! The five tools the dispatcher advertises, their parameter schemas,
//! and the typed result envelopes they answer with. Every envelope
//! carries a `success` discriminator; failures surface here as data,
//! not as protocol errors.

use loredex_search::{LoadedResource, StatsSnapshot};
use loredex_types::{KindFields, Resource};
use serde::Serialize;
use serde_json::{json, Value};

/// One advertised tool: name, human-readable description, parameter schema
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

const KIND_VALUES: [&str; 4] = ["skill", "agent", "prompt", "instruction"];

/// The fixed tool catalog advertised at startup and via `tools/list`
pub fn tool_catalog() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "search_resources".into(),
            description: "Search for skills, agents, prompts, or instructions by keyword. \
                          Returns metadata only (lightweight). Use get_resource to load full content."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query (searches in name and description)"
                    },
                    "kind": {
                        "type": "string",
                        "enum": KIND_VALUES,
                        "description": "Filter by resource kind (optional)"
                    },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Filter by tags (optional)"
                    },
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of results (default: 10)",
                        "default": 10
                    }
                },
                "required": ["query"]
            }),
        },
        ToolSpec {
            name: "get_resource".into(),
            description: "Load full content of a specific resource by name. \
                          Use this after search_resources to get detailed instructions."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Exact name of the resource"
                    },
                    "kind": {
                        "type": "string",
                        "enum": KIND_VALUES,
                        "description": "Resource kind (optional, disambiguates shared names)"
                    }
                },
                "required": ["name"]
            }),
        },
        ToolSpec {
            name: "list_resources".into(),
            description: "List all available resources with metadata (no content). \
                          Useful for browsing available resources."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "kind": {
                        "type": "string",
                        "enum": KIND_VALUES,
                        "description": "Filter by resource kind (optional)"
                    }
                }
            }),
        },
        ToolSpec {
            name: "get_system_rules".into(),
            description: "Retrieve the system rules and governance guidelines that apply to all work. \
                          Returns the current system rules from the knowledge base."
                .into(),
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolSpec {
            name: "get_resource_stats".into(),
            description: "Get statistics about indexed resources (counts, last update time).".into(),
            input_schema: json!({ "type": "object", "properties": {} }),
        },
    ]
}

/// Metadata-only view of a resource as tools report it.
///
/// `size` is rendered human-readable; the raw byte count stays in the
/// index. The kind-specific field is present exactly for the kinds it
/// applies to, `path` only where the caller can act on it.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSummary {
    pub name: String,
    pub kind: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "toolRefs", skip_serializing_if = "Option::is_none")]
    pub tool_refs: Option<Vec<String>>,
    #[serde(rename = "appliesTo", skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<String>,
}

impl ResourceSummary {
    /// Search-hit view: includes the backing path
    pub fn hit(resource: &Resource) -> Self {
        Self::build(resource, true)
    }

    /// Listing view: metadata without the path
    pub fn listing(resource: &Resource) -> Self {
        Self::build(resource, false)
    }

    fn build(resource: &Resource, with_path: bool) -> Self {
        let (tags, tool_refs, applies_to) = match &resource.fields {
            KindFields::Skill { tags } | KindFields::Prompt { tags } => {
                (Some(tags.clone()), None, None)
            }
            KindFields::Agent { tool_refs } => (None, Some(tool_refs.clone()), None),
            KindFields::Instruction { applies_to } => (None, None, Some(applies_to.clone())),
        };
        Self {
            name: resource.name.clone(),
            kind: resource.kind().to_string(),
            description: resource.description.clone(),
            path: with_path.then(|| resource.path.clone()),
            size: format_size(resource.size),
            tags,
            tool_refs,
            applies_to,
        }
    }
}

/// Full view of a resource with its body attached
#[derive(Debug, Clone, Serialize)]
pub struct ResourceDetail {
    #[serde(flatten)]
    pub summary: ResourceSummary,
    pub content: String,
}

impl From<&LoadedResource> for ResourceDetail {
    fn from(loaded: &LoadedResource) -> Self {
        Self {
            summary: ResourceSummary::hit(&loaded.resource),
            content: loaded.content.clone(),
        }
    }
}

/// Result envelope of one tool call.
///
/// One variant per tool result shape plus a shared failure shape; all
/// variants carry the `success` discriminator.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ToolResponse {
    Search {
        success: bool,
        results: Vec<ResourceSummary>,
        count: usize,
        message: String,
    },
    Resource {
        success: bool,
        resource: ResourceDetail,
    },
    List {
        success: bool,
        resources: Vec<ResourceSummary>,
        count: usize,
    },
    SystemRules {
        success: bool,
        #[serde(rename = "systemRules")]
        system_rules: String,
        message: String,
    },
    Stats {
        success: bool,
        stats: StatsSnapshot,
    },
    Failure {
        success: bool,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
}

impl ToolResponse {
    /// Search result envelope, with the follow-up hint message
    pub fn search(results: Vec<ResourceSummary>) -> Self {
        let count = results.len();
        let message = if count > 0 {
            format!("Found {count} resource(s). Use get_resource to load full content.")
        } else {
            "No resources found matching your query.".to_string()
        };
        ToolResponse::Search {
            success: true,
            results,
            count,
            message,
        }
    }

    /// Single-resource envelope
    pub fn resource(detail: ResourceDetail) -> Self {
        ToolResponse::Resource {
            success: true,
            resource: detail,
        }
    }

    /// Listing envelope
    pub fn list(resources: Vec<ResourceSummary>) -> Self {
        let count = resources.len();
        ToolResponse::List {
            success: true,
            resources,
            count,
        }
    }

    /// System rules envelope
    pub fn system_rules(rules: String) -> Self {
        ToolResponse::SystemRules {
            success: true,
            system_rules: rules,
            message: "System rules loaded. These rules apply to all work sessions.".to_string(),
        }
    }

    /// Stats envelope
    pub fn stats(snapshot: StatsSnapshot) -> Self {
        ToolResponse::Stats {
            success: true,
            stats: snapshot,
        }
    }

    /// Failure envelope carried inside a successful protocol response
    pub fn failure(error: impl Into<String>) -> Self {
        ToolResponse::Failure {
            success: false,
            error: error.into(),
            path: None,
        }
    }

    /// Failure envelope that names the path the operation tried
    pub fn failure_at(error: impl Into<String>, path: impl Into<String>) -> Self {
        ToolResponse::Failure {
            success: false,
            error: error.into(),
            path: Some(path.into()),
        }
    }
}

/// Render a byte count the way the tools report sizes
fn format_size(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}
