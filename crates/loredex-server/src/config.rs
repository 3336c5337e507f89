use loredex_index::ScanRoots;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Default config template created when no config exists
const DEFAULT_CONFIG: &str = r#"
[resources]
root = "."  # workspace the resource directories live under
skills_dir = ".claude/skills"
agents_dir = "reference/agents"
prompts_dir = "reference/prompts"
instructions_dir = "reference/instructions"
system_rules = "reference/SYSTEM_RULES.md"

[index]
output_dir = "indexes"

[logging]
level = "info"  # trace, debug, info, warn, error
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct ResourcesConfig {
    pub root: String,
    pub skills_dir: String,
    pub agents_dir: String,
    pub prompts_dir: String,
    pub instructions_dir: String,
    pub system_rules: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    pub output_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub resources: ResourcesConfig,
    pub index: IndexConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Get the global config path: ~/.loredex/loredex.toml
    fn global_config_path() -> PathBuf {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".loredex")
            .join("loredex.toml")
    }

    /// Ensure global config directory and file exist, creating defaults if needed
    fn ensure_global_config() -> anyhow::Result<PathBuf> {
        let config_path = Self::global_config_path();
        let config_dir = config_path.parent().unwrap();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            eprintln!("Created config directory: {}", config_dir.display());
        }

        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG.trim())?;
            eprintln!("Created default config: {}", config_path.display());
            eprintln!("Please edit this file or set environment variables.");
        }

        Ok(config_path)
    }

    /// Load configuration with layered approach:
    /// 1. Global config: ~/.loredex/loredex.toml (auto-created if missing)
    /// 2. Local override: ./loredex.toml (workspace, optional)
    /// 3. Environment variables (highest priority)
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        // Ensure global config exists
        let global_config_path = Self::ensure_global_config()?;

        // Build config with layered sources (later sources override earlier ones)
        let mut config_builder = config::Config::builder()
            // Layer 1: Global config (required - we just created it if missing)
            .add_source(config::File::from(global_config_path))
            // Layer 2: Local workspace config (optional override)
            .add_source(config::File::with_name("loredex").required(false))
            // Layer 3: Environment variables with LOREDEX__ prefix
            .add_source(config::Environment::with_prefix("LOREDEX").separator("__"));

        // Layer 4: Apply convenience env var overrides (highest priority)
        if let Ok(root) = env::var("LOREDEX_ROOT") {
            config_builder = config_builder.set_override("resources.root", root)?;
        }

        if let Ok(dir) = env::var("LOREDEX_INDEX_DIR") {
            config_builder = config_builder.set_override("index.output_dir", dir)?;
        }

        let config = config_builder.build()?;

        let config: Self = config.try_deserialize()?;
        Ok(config)
    }

    /// Workspace root the resource directories and recorded paths
    /// resolve against
    pub fn workspace_root(&self) -> PathBuf {
        PathBuf::from(&self.resources.root)
    }

    /// Scanner layout derived from the configured directories
    pub fn scan_roots(&self) -> ScanRoots {
        ScanRoots::under(
            self.workspace_root(),
            &self.resources.skills_dir,
            &self.resources.agents_dir,
            &self.resources.prompts_dir,
            &self.resources.instructions_dir,
        )
    }

    /// Directory the index artifacts are written to and loaded from
    pub fn index_dir(&self) -> PathBuf {
        self.workspace_root().join(&self.index.output_dir)
    }

    /// The system rules document served by `get_system_rules`
    pub fn system_rules_path(&self) -> PathBuf {
        self.workspace_root().join(&self.resources.system_rules)
    }
}
