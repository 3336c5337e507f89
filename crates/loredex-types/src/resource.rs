use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The four resource categories loredex indexes.
///
/// Names are unique only within a kind; the same name may appear under
/// several kinds and is disambiguated by passing the kind on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Skill,
    Agent,
    Prompt,
    Instruction,
}

impl ResourceKind {
    /// All kinds in the fixed scan/build order.
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Skill,
        ResourceKind::Agent,
        ResourceKind::Prompt,
        ResourceKind::Instruction,
    ];

    /// Wire name of the kind (`"skill"`, `"agent"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Skill => "skill",
            ResourceKind::Agent => "agent",
            ResourceKind::Prompt => "prompt",
            ResourceKind::Instruction => "instruction",
        }
    }

    /// File name of the standalone per-kind index artifact.
    pub fn index_file_name(&self) -> &'static str {
        match self {
            ResourceKind::Skill => "skills-index.json",
            ResourceKind::Agent => "agents-index.json",
            ResourceKind::Prompt => "prompts-index.json",
            ResourceKind::Instruction => "instructions-index.json",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a kind string does not name a known kind
#[derive(Debug, Error)]
#[error("unknown resource kind '{0}' (expected skill, agent, prompt or instruction)")]
pub struct KindParseError(pub String);

impl FromStr for ResourceKind {
    type Err = KindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skill" => Ok(ResourceKind::Skill),
            "agent" => Ok(ResourceKind::Agent),
            "prompt" => Ok(ResourceKind::Prompt),
            "instruction" => Ok(ResourceKind::Instruction),
            other => Err(KindParseError(other.to_string())),
        }
    }
}

/// Kind tag plus the kind-specific metadata payload.
///
/// Serialized internally tagged on `kind`, so a flattened [`Resource`]
/// carries a flat `kind` field next to the payload field that applies
/// to it (`tags`, `toolRefs` or `appliesTo`) and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum KindFields {
    Skill {
        #[serde(default)]
        tags: Vec<String>,
    },
    Agent {
        #[serde(default, rename = "toolRefs")]
        tool_refs: Vec<String>,
    },
    Prompt {
        #[serde(default)]
        tags: Vec<String>,
    },
    Instruction {
        #[serde(default, rename = "appliesTo")]
        applies_to: String,
    },
}

impl KindFields {
    /// The kind this payload belongs to
    pub fn kind(&self) -> ResourceKind {
        match self {
            KindFields::Skill { .. } => ResourceKind::Skill,
            KindFields::Agent { .. } => ResourceKind::Agent,
            KindFields::Prompt { .. } => ResourceKind::Prompt,
            KindFields::Instruction { .. } => ResourceKind::Instruction,
        }
    }
}

/// One indexed document: lightweight metadata plus the path of the
/// backing file. Bodies are never stored in the index; `path` is the
/// single source of truth and is read on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Identifier, unique within its kind
    pub name: String,
    /// Declared description, or a summary extracted from the body
    pub description: String,
    /// Backing document, relative to the workspace root, `/`-separated
    pub path: String,
    /// Byte length of the raw document at scan time
    pub size: u64,
    /// Kind tag and kind-specific payload
    #[serde(flatten)]
    pub fields: KindFields,
}

impl Resource {
    /// The resource's kind
    pub fn kind(&self) -> ResourceKind {
        self.fields.kind()
    }

    /// Declared tags. Empty for kinds that carry none (agents,
    /// instructions).
    pub fn tags(&self) -> &[String] {
        match &self.fields {
            KindFields::Skill { tags } | KindFields::Prompt { tags } => tags,
            _ => &[],
        }
    }

    /// Tool references (agents only)
    pub fn tool_refs(&self) -> &[String] {
        match &self.fields {
            KindFields::Agent { tool_refs } => tool_refs,
            _ => &[],
        }
    }

    /// Applicability pattern (instructions only)
    pub fn applies_to(&self) -> &str {
        match &self.fields {
            KindFields::Instruction { applies_to } => applies_to,
            _ => "",
        }
    }

    /// True if this resource carries at least one of the given tags.
    /// A resource with no tags never matches a non-empty filter.
    pub fn has_any_tag(&self, wanted: &[String]) -> bool {
        let own = self.tags();
        wanted.iter().any(|w| own.iter().any(|t| t == w))
    }
}
