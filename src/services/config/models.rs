use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Bumped whenever the default lists change; older files are merged on load.
pub const CONFIG_VERSION: u32 = 2;

pub const DEFAULT_CONTENT_FOLDERS: &[&str] = &[
    "aniBlocks",
    "data",
    "Environments",
    "General",
    "Light Presets",
    "People",
    "Props",
    "Render Presets",
    "Render Settings",
    "Runtime",
    "Scene Builder",
    "Scenes",
    "Scripts",
    "Shader Presets",
    "Shaders",
];

pub const DEFAULT_STORES: &[(&str, &str)] = &[
    ("DAZ 3D", "IM"),
    ("Renderosity", "RO"),
    ("Renderhub", "RH"),
    ("Renderotica", "RE"),
    ("CGBytes", "CB"),
    ("CGTrader", "CG"),
    ("DeviantArt", "DA"),
    ("ShareCG", "SH"),
    ("Sketchfab", "SF"),
    ("Free3D", "F3D"),
    ("Turbosquid", "TS"),
    ("3DExport", "3DX"),
    ("Patreon", "PR"),
    ("Forender", "FR"),
    ("LOCAL USER", "IM"),
];

pub const DEFAULT_TAGS: &[&str] = &[
    "Bryce",
    "CarraraLegacy",
    "Carrara7",
    "Carrara7_2",
    "Carrara8",
    "Carrara8_5",
    "DAZStudioLegacy",
    "DAZStudio3",
    "DAZStudio4",
    "DAZStudio4_5",
    "DSON_Poser",
    "General",
    "Hexagon",
    "InstallManager",
    "LightWave",
    "Mac32",
    "Mac64",
    "Photoshop",
    "Plugin",
    "PoserLegacy",
    "Poser9",
    "PrivateBuild",
    "PublicBuild",
    "Software",
    "Vue",
    "Win32",
    "Win64",
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub name: String,
    pub prefix: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TemplateConfig {
    pub copy_templates: bool,
    pub destination: Option<PathBuf>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            copy_templates: false,
            destination: home::home_dir().map(|h| h.join("Downloads")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompressorConfig {
    pub prefer_external: bool,
    pub seven_zip_path: Option<PathBuf>,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            prefer_external: true,
            seven_zip_path: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub content_folders: Vec<String>,
    pub stores: Vec<StoreConfig>,
    pub tags: Vec<String>,
    pub templates: TemplateConfig,
    pub compressor: CompressorConfig,
    pub build_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            content_folders: DEFAULT_CONTENT_FOLDERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            stores: DEFAULT_STORES
                .iter()
                .map(|(name, prefix)| StoreConfig {
                    name: name.to_string(),
                    prefix: prefix.to_string(),
                })
                .collect(),
            tags: DEFAULT_TAGS.iter().map(|s| s.to_string()).collect(),
            templates: TemplateConfig::default(),
            compressor: CompressorConfig::default(),
            build_dir: default_build_dir(),
        }
    }
}

impl AppConfig {
    /// Folder that becomes the `Content/` entries of the package.
    pub fn content_dir(&self) -> PathBuf {
        self.build_dir.join("Content")
    }

    /// Prefix registered for `store` (case-insensitive name match).
    pub fn store_prefix(&self, store: &str) -> Option<&str> {
        self.stores
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(store))
            .map(|s| s.prefix.as_str())
    }
}

fn default_build_dir() -> PathBuf {
    home::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("DIMCreator")
        .join("DIMBuild")
}
