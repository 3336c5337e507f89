//! Resource scanners, one per kind
//!
//! Each scanner walks its configured root, reads matching documents,
//! and produces one [`Resource`] record per document via the
//! frontmatter parser. A missing root is logged and yields an empty
//! collection; it never aborts the other kinds.

use crate::frontmatter::{
    extract_summary, parse_frontmatter, parse_tag_list, parse_tool_list, MAX_SUMMARY_LENGTH,
};
use loredex_types::{KindFields, Resource, ResourceKind, ResourceSet};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Sentinel file marking a directory as a skill
pub const SKILL_SENTINEL: &str = "SKILL.md";

/// Suffix of agent definition files
pub const AGENT_SUFFIX: &str = ".agent.md";
/// Suffix of prompt template files
pub const PROMPT_SUFFIX: &str = ".prompt.md";
/// Suffix of instruction document files
pub const INSTRUCTION_SUFFIX: &str = ".instruction.md";

/// Directory layout the scanners walk.
///
/// `workspace` anchors the relative `path` recorded on every resource;
/// the four kind roots may live anywhere under (or outside) it.
#[derive(Debug, Clone)]
pub struct ScanRoots {
    /// Root the recorded resource paths are relative to
    pub workspace: PathBuf,
    /// Skills root: one subdirectory per skill
    pub skills: PathBuf,
    /// Agents root: flat `*.agent.md` files
    pub agents: PathBuf,
    /// Prompts root: flat `*.prompt.md` files
    pub prompts: PathBuf,
    /// Instructions root: flat `*.instruction.md` files
    pub instructions: PathBuf,
}

impl ScanRoots {
    /// Resolve kind roots given as paths relative to the workspace
    pub fn under(
        workspace: impl Into<PathBuf>,
        skills: impl AsRef<Path>,
        agents: impl AsRef<Path>,
        prompts: impl AsRef<Path>,
        instructions: impl AsRef<Path>,
    ) -> Self {
        let workspace = workspace.into();
        Self {
            skills: workspace.join(skills),
            agents: workspace.join(agents),
            prompts: workspace.join(prompts),
            instructions: workspace.join(instructions),
            workspace,
        }
    }
}

/// Scans the four kind roots into resource records
pub struct ResourceScanner {
    roots: ScanRoots,
}

impl ResourceScanner {
    /// Create a scanner over the given roots
    pub fn new(roots: ScanRoots) -> Self {
        Self { roots }
    }

    /// Run all four scanners in fixed kind order
    pub fn scan_all(&self) -> ResourceSet {
        ResourceSet {
            skills: self.scan_kind(ResourceKind::Skill),
            agents: self.scan_kind(ResourceKind::Agent),
            prompts: self.scan_kind(ResourceKind::Prompt),
            instructions: self.scan_kind(ResourceKind::Instruction),
        }
    }

    /// Scan one kind's root
    pub fn scan_kind(&self, kind: ResourceKind) -> Vec<Resource> {
        match kind {
            ResourceKind::Skill => self.scan_skills(),
            ResourceKind::Agent => self.scan_suffixed(kind, &self.roots.agents, AGENT_SUFFIX),
            ResourceKind::Prompt => self.scan_suffixed(kind, &self.roots.prompts, PROMPT_SUFFIX),
            ResourceKind::Instruction => {
                self.scan_suffixed(kind, &self.roots.instructions, INSTRUCTION_SUFFIX)
            }
        }
    }

    /// Scan the skills root: one resource per subdirectory carrying a
    /// `SKILL.md` sentinel; directories without it are skipped.
    fn scan_skills(&self) -> Vec<Resource> {
        let Some(entries) = self.read_root(ResourceKind::Skill, &self.roots.skills) else {
            return Vec::new();
        };

        let mut skills = Vec::new();
        for dir in entries {
            if !dir.is_dir() {
                continue;
            }
            let skill_file = dir.join(SKILL_SENTINEL);
            if !skill_file.exists() {
                debug!("Skipping {:?}: no {}", dir, SKILL_SENTINEL);
                continue;
            }

            let Some((content, frontmatter)) = self.read_document(&skill_file) else {
                continue;
            };
            let dir_name = file_stem(&dir);
            let tags = frontmatter
                .get("tags")
                .map(|raw| parse_tag_list(raw))
                .unwrap_or_default();

            skills.push(self.assemble(
                &frontmatter,
                dir_name,
                &content,
                &skill_file,
                KindFields::Skill { tags },
            ));
        }
        skills
    }

    /// Scan a flat root of suffix-matched files into one kind
    fn scan_suffixed(&self, kind: ResourceKind, root: &Path, suffix: &str) -> Vec<Resource> {
        let Some(entries) = self.read_root(kind, root) else {
            return Vec::new();
        };

        let mut resources = Vec::new();
        for path in entries {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !path.is_file() || !file_name.ends_with(suffix) {
                continue;
            }

            let Some((content, frontmatter)) = self.read_document(&path) else {
                continue;
            };
            let default_name = file_name.trim_end_matches(suffix).to_string();
            let fields = match kind {
                ResourceKind::Agent => KindFields::Agent {
                    tool_refs: frontmatter
                        .get("tools")
                        .map(|raw| parse_tool_list(raw))
                        .unwrap_or_default(),
                },
                ResourceKind::Prompt => KindFields::Prompt {
                    tags: frontmatter
                        .get("tags")
                        .map(|raw| parse_tag_list(raw))
                        .unwrap_or_default(),
                },
                ResourceKind::Instruction => KindFields::Instruction {
                    applies_to: frontmatter
                        .get("appliesTo")
                        .or_else(|| frontmatter.get("patterns"))
                        .cloned()
                        .unwrap_or_default(),
                },
                ResourceKind::Skill => unreachable!("skills are directory-scanned"),
            };

            resources.push(self.assemble(&frontmatter, default_name, &content, &path, fields));
        }
        resources
    }

    /// List a kind root, sorted by name.
    ///
    /// Directory iteration order is not portable; sorting keeps the
    /// built index byte-identical across runs and platforms. A missing
    /// root yields `None` after a log line and is never fatal.
    fn read_root(&self, kind: ResourceKind, root: &Path) -> Option<Vec<PathBuf>> {
        if !root.exists() {
            warn!("No {} directory found: {:?}", kind, root);
            return None;
        }

        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read {} directory {:?}: {}", kind, root, e);
                return None;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    debug!("Skipping unreadable entry under {:?}: {}", root, e);
                    None
                }
            })
            .collect();
        paths.sort();
        Some(paths)
    }

    /// Read one document and parse its header; unreadable documents
    /// are skipped with a log line.
    fn read_document(&self, path: &Path) -> Option<(String, HashMap<String, String>)> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let frontmatter = parse_frontmatter(&content);
                Some((content, frontmatter))
            }
            Err(e) => {
                warn!("Skipping {:?}: {}", path, e);
                None
            }
        }
    }

    /// Apply the field defaulting order: declared metadata value, then
    /// derived default (name from the file system, description from
    /// the body), then empty.
    fn assemble(
        &self,
        frontmatter: &HashMap<String, String>,
        default_name: String,
        content: &str,
        path: &Path,
        fields: KindFields,
    ) -> Resource {
        let name = frontmatter
            .get("name")
            .cloned()
            .filter(|n| !n.is_empty())
            .unwrap_or(default_name);
        let description = frontmatter
            .get("description")
            .cloned()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| extract_summary(content, MAX_SUMMARY_LENGTH));

        debug!("Discovered {} '{}' at {:?}", fields.kind(), name, path);

        Resource {
            name,
            description,
            path: self.relative_path(path),
            size: content.len() as u64,
            fields,
        }
    }

    /// Workspace-relative, `/`-separated form of a document path
    fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.roots.workspace).unwrap_or(path);
        let mut parts: Vec<String> = Vec::new();
        for component in relative.components() {
            parts.push(component.as_os_str().to_string_lossy().into_owned());
        }
        parts.join("/")
    }
}

fn file_stem(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
