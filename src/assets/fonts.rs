use std::{collections::HashMap, path::Path, sync::Arc};

use usvg::fontdb;

use crate::foundation::error::{PhotostripError, PhotostripResult};

/// Font file bytes resolved for a caption font family.
#[derive(Clone)]
pub struct ResolvedFont {
    /// Raw font file bytes (may be a collection).
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside `bytes`.
    pub index: u32,
    /// Family name reported by the font itself.
    pub family: String,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .field("family", &self.family)
            .finish()
    }
}

/// Font database mapping CSS-style family stacks to font bytes.
pub struct FontBook {
    db: fontdb::Database,
    cache: HashMap<String, Arc<ResolvedFont>>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::with_system_fonts()
    }
}

impl FontBook {
    /// A book with no fonts loaded.
    pub fn empty() -> Self {
        Self {
            db: fontdb::Database::new(),
            cache: HashMap::new(),
        }
    }

    pub fn with_system_fonts() -> Self {
        let mut book = Self::empty();
        book.db.load_system_fonts();
        book
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Load every `.ttf`/`.otf`/`.ttc` file in `dir`; unreadable entries are skipped.
    pub fn load_fonts_dir(&mut self, dir: &Path) {
        let Ok(rd) = std::fs::read_dir(dir) else {
            return;
        };

        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            let ext = ext.to_ascii_lowercase();
            if ext != "ttf" && ext != "otf" && ext != "ttc" {
                continue;
            }
            if let Err(e) = self.db.load_font_file(&path) {
                tracing::debug!(path = %path.display(), error = %e, "skipping unreadable font");
            }
        }
        self.cache.clear();
    }

    pub fn load_font_data(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
        self.cache.clear();
    }

    /// Resolve a family stack such as `"Pacifico, cursive"`.
    ///
    /// Falls back to any sans-serif, serif or monospace face, then to the first face loaded.
    pub fn resolve(&mut self, family_stack: &str) -> PhotostripResult<Arc<ResolvedFont>> {
        if let Some(hit) = self.cache.get(family_stack) {
            return Ok(hit.clone());
        }

        let names: Vec<&str> = family_stack
            .split(',')
            .map(|s| s.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|s| !s.is_empty())
            .collect();
        let mut families: Vec<fontdb::Family<'_>> = names.iter().map(|n| css_family(n)).collect();
        families.push(fontdb::Family::SansSerif);
        families.push(fontdb::Family::Serif);
        families.push(fontdb::Family::Monospace);

        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight::NORMAL,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };
        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))
            .ok_or_else(|| {
                PhotostripError::font(format!("no font available for \"{family_stack}\""))
            })?;

        let family = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| "unknown".to_string());
        let (bytes, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| PhotostripError::font(format!("font data for \"{family}\" is unreadable")))?;

        let resolved = Arc::new(ResolvedFont {
            bytes: Arc::new(bytes),
            index,
            family,
        });
        tracing::debug!(stack = family_stack, family = %resolved.family, "font resolved");
        self.cache.insert(family_stack.to_string(), resolved.clone());
        Ok(resolved)
    }
}

fn css_family(name: &str) -> fontdb::Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => fontdb::Family::Serif,
        "sans-serif" | "system-ui" => fontdb::Family::SansSerif,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        "monospace" => fontdb::Family::Monospace,
        _ => fontdb::Family::Name(name),
    }
}
