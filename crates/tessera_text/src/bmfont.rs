//! Text `.fnt` files in the AngelCode BMFont format

use std::{collections::HashMap, path::Path, str::FromStr};

use tessera_render::AssetLoadError;

use crate::FontError;

/// Metrics of one glyph, in pixels of its page texture
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BmChar {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub advance_x: i32,
    pub page: u32,
    pub channel: u32,
    /// Extra x offset keyed by the preceding character
    pub kernings: HashMap<char, i32>,
}

impl BmChar {
    pub fn kerning(&self, previous: Option<char>) -> i32 {
        previous
            .and_then(|c| self.kernings.get(&c).copied())
            .unwrap_or(0)
    }
}

/// Font-wide info & metrics plus the glyph table
#[derive(Debug, Clone, Default)]
pub struct BmFont {
    // info
    pub face: String,
    pub size: i32,
    pub bold: bool,
    pub italic: bool,
    pub unicode: bool,
    pub stretch_h: i32,
    pub smooth: bool,
    pub super_sampling: i32,
    /// up, right, down, left
    pub padding: [i32; 4],
    /// horizontal, vertical
    pub spacing: [i32; 2],
    // common
    pub line_height: i32,
    pub base: i32,
    pub page_width: i32,
    pub page_height: i32,
    pub packed: bool,
    pub pages: i32,

    pub page_files: HashMap<u32, String>,
    pub chars: HashMap<char, BmChar>,
}

impl BmFont {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| AssetLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Self::parse(&source)?;
        log::debug!(
            "loaded font {} ({} glyphs)",
            path.display(),
            font.chars.len()
        );
        Ok(font)
    }

    pub fn parse(source: &str) -> Result<Self, FontError> {
        let mut font = BmFont::default();

        for (index, line) in source.lines().enumerate() {
            let Some((section, values)) = tokenize_line(line) else {
                continue;
            };
            let fields = Fields {
                line: index + 1,
                values,
            };
            match section {
                "info" => font.parse_info(&fields)?,
                "common" => font.parse_common(&fields)?,
                "page" => {
                    let id = fields.get("id")?;
                    font.page_files.insert(id, fields.text("file").to_string());
                }
                "char" => font.parse_char(&fields)?,
                "kerning" => font.parse_kerning(&fields)?,
                _ => {}
            }
        }

        if font.line_height <= 0 || font.page_width <= 0 || font.page_height <= 0 {
            return Err(FontError::Parse {
                line: 0,
                reason: "missing or empty `common` section".into(),
            });
        }
        Ok(font)
    }

    pub fn char(&self, c: char) -> Option<&BmChar> {
        self.chars.get(&c)
    }

    fn parse_info(&mut self, f: &Fields) -> Result<(), FontError> {
        self.face = f.text("face").to_string();
        self.size = f.get_or("size", 0)?;
        self.bold = f.flag("bold");
        self.italic = f.flag("italic");
        self.unicode = f.flag("unicode");
        self.stretch_h = f.get_or("stretchH", 100)?;
        self.smooth = f.flag("smooth");
        self.super_sampling = f.get_or("aa", 1)?;
        self.padding = f.list("padding")?;
        self.spacing = f.list("spacing")?;
        Ok(())
    }

    fn parse_common(&mut self, f: &Fields) -> Result<(), FontError> {
        self.line_height = f.get("lineHeight")?;
        self.base = f.get_or("base", 0)?;
        self.page_width = f.get("scaleW")?;
        self.page_height = f.get("scaleH")?;
        self.packed = f.flag("packed");
        self.pages = f.get_or("pages", 1)?;
        Ok(())
    }

    fn parse_char(&mut self, f: &Fields) -> Result<(), FontError> {
        let id = f.get("id")?;
        let Some(c) = char::from_u32(id) else {
            log::warn!("line {}: glyph id {id} is not a valid character", f.line);
            return Ok(());
        };
        let glyph = BmChar {
            id,
            x: f.get("x")?,
            y: f.get("y")?,
            width: f.get("width")?,
            height: f.get("height")?,
            offset_x: f.get_or("xoffset", 0)?,
            offset_y: f.get_or("yoffset", 0)?,
            advance_x: f.get("xadvance")?,
            page: f.get_or("page", 0)?,
            channel: f.get_or("chnl", 15)?,
            kernings: HashMap::new(),
        };
        self.chars.insert(c, glyph);
        Ok(())
    }

    /// Stored on the second glyph so layout can look it up by the previous char
    fn parse_kerning(&mut self, f: &Fields) -> Result<(), FontError> {
        let first: u32 = f.get("first")?;
        let second: u32 = f.get("second")?;
        let amount = f.get("amount")?;

        let first = char::from_u32(first);
        let glyph = char::from_u32(second).and_then(|c| self.chars.get_mut(&c));
        match (first, glyph) {
            (Some(first), Some(glyph)) => {
                glyph.kernings.insert(first, amount);
            }
            _ => log::warn!(
                "line {}: kerning pair {first:?} -> {second} has no glyph",
                f.line
            ),
        }
        Ok(())
    }
}

/// Splits a line into its section keyword & `key=value` pairs
///
/// Values may be quoted to hold spaces: `face="Open Sans"`
fn tokenize_line(line: &str) -> Option<(&str, Vec<(&str, &str)>)> {
    let line = line.trim();
    let (section, mut rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    if section.is_empty() || !section.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    let mut values = Vec::new();
    loop {
        rest = rest.trim_start();
        let Some((key, after)) = rest.split_once('=') else {
            break;
        };
        let key = key.trim();
        let (value, remaining) = match after.strip_prefix('"') {
            Some(quoted) => quoted.split_once('"').unwrap_or((quoted, "")),
            None => after
                .split_once(char::is_whitespace)
                .unwrap_or((after, "")),
        };
        values.push((key, value.trim()));
        rest = remaining;
    }
    Some((section, values))
}

struct Fields<'a> {
    line: usize,
    values: Vec<(&'a str, &'a str)>,
}

impl Fields<'_> {
    fn raw(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    fn text(&self, key: &str) -> &str {
        self.raw(key).unwrap_or_default()
    }

    fn flag(&self, key: &str) -> bool {
        matches!(self.raw(key), Some("1" | "true"))
    }

    fn error(&self, reason: String) -> FontError {
        FontError::Parse {
            line: self.line,
            reason,
        }
    }

    fn parse<T: FromStr>(&self, key: &str, value: &str) -> Result<T, FontError> {
        value
            .parse()
            .map_err(|_| self.error(format!("invalid `{key}` value `{value}`")))
    }

    fn get<T: FromStr>(&self, key: &str) -> Result<T, FontError> {
        let value = self
            .raw(key)
            .ok_or_else(|| self.error(format!("missing `{key}`")))?;
        self.parse(key, value)
    }

    fn get_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, FontError> {
        match self.raw(key) {
            Some(value) => self.parse(key, value),
            None => Ok(default),
        }
    }

    /// Comma separated integers, missing entries stay 0
    fn list<const N: usize>(&self, key: &str) -> Result<[i32; N], FontError> {
        let mut out = [0; N];
        if let Some(value) = self.raw(key) {
            for (slot, part) in out.iter_mut().zip(value.split(',')) {
                *slot = self.parse(key, part.trim())?;
            }
        }
        Ok(out)
    }
}
