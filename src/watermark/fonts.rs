//! Startup-time font registry
//!
//! All fonts are loaded once into a shared font database. The overlay
//! rasterizer only ever reads from it, so rendering never touches the disk.
//!
//! A monospace face is compiled into the binary and always loaded first, so
//! a host without font files still renders the watermark text.

use resvg::usvg::fontdb::Database;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::spec::FontId;

/// Face compiled into the binary; the fallback for every family
const EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");

/// Family name of the embedded face
pub const EMBEDDED_FAMILY: &str = "DejaVu Sans Mono";

/// Where fonts come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Directory holding the font files of the family table
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Also load the fonts installed on the host
    #[serde(default = "default_load_system_fonts")]
    pub load_system_fonts: bool,
}

fn default_load_system_fonts() -> bool {
    true
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            dir: None,
            load_system_fonts: default_load_system_fonts(),
        }
    }
}

/// Loaded font faces plus the families of the table that are available
#[derive(Clone)]
pub struct FontRegistry {
    database: Arc<Database>,
    available: Vec<FontId>,
}

impl std::fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontRegistry")
            .field("faces", &self.database.len())
            .field("available", &self.available)
            .finish()
    }
}

impl FontRegistry {
    /// Load the embedded face, the font table from `config.dir` and
    /// optionally the system fonts.
    ///
    /// Missing files are logged and skipped. The embedded face is always
    /// present, so the result is never empty.
    pub fn load(config: &FontConfig) -> Self {
        let mut database = embedded_database();

        if let Some(dir) = &config.dir {
            for font in FontId::ALL {
                let path = dir.join(font.file_name());
                if !path.is_file() {
                    debug!(font = %font, path = %path.display(), "Font file not found");
                    continue;
                }
                if let Err(e) = database.load_font_file(&path) {
                    warn!(font = %font, path = %path.display(), error = %e, "Failed to load font file");
                }
            }
        }

        if config.load_system_fonts {
            database.load_system_fonts();
        }

        let registry = Self::from_database(database);
        info!(
            faces = registry.face_count(),
            available = ?registry.available,
            "Font registry loaded"
        );
        registry
    }

    /// Registry holding only the embedded face.
    pub fn embedded() -> Self {
        Self::from_database(embedded_database())
    }

    /// Registry with no faces at all. Overlays rendered from it fail.
    pub fn empty() -> Self {
        Self::from_database(Database::new())
    }

    pub fn from_database(mut database: Database) -> Self {
        let available: Vec<FontId> = FontId::ALL
            .into_iter()
            .filter(|font| has_family(&database, font.family_name()))
            .collect();

        // Generic `monospace` in the overlay markup resolves to the default
        // family when it is installed, else to the embedded face
        if available.contains(&FontId::default()) {
            database.set_monospace_family(FontId::default().family_name());
        } else if has_family(&database, EMBEDDED_FAMILY) {
            database.set_monospace_family(EMBEDDED_FAMILY);
        }

        Self {
            database: Arc::new(database),
            available,
        }
    }

    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.database)
    }

    pub fn face_count(&self) -> usize {
        self.database.len()
    }

    pub fn is_empty(&self) -> bool {
        self.database.len() == 0
    }

    /// Whether the family of `font` has at least one loaded face.
    pub fn is_available(&self, font: FontId) -> bool {
        self.available.contains(&font)
    }

    pub fn available(&self) -> &[FontId] {
        &self.available
    }
}

fn embedded_database() -> Database {
    let mut database = Database::new();
    database.load_font_data(EMBEDDED_FONT.to_vec());
    database
}

fn has_family(database: &Database, family: &str) -> bool {
    database.faces().any(|face| {
        face.families
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(family))
    })
}
