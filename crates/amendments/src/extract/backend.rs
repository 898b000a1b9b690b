use std::collections::BTreeMap;

use lopdf::{self, content::Content};

use crate::AmendError;

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

/// Font information extracted from a page's resource dictionary.
///
/// Only the base font name matters downstream: the amendment layout is
/// driven entirely by boldness, which is detected from the name.
#[derive(Debug, Clone)]
pub struct FontInfo {
    /// The font name key as it appears in the resource dictionary (e.g. `b"F1"`).
    pub name: Vec<u8>,
    /// Base font name from the font dictionary, if present.
    pub base_font: Option<String>,
    /// Encoding entry from the font dictionary, if present.
    pub encoding: Option<String>,
}

/// A simplified, lopdf-independent representation of a PDF value.
///
/// Decouples the extraction state machine from `lopdf::Object` so it can
/// be exercised against mock backends in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(Vec<(Vec<u8>, PdfValue)>),
    Reference(PageId),
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

/// Extract an `f32` from a [`PdfValue`], accepting both `Integer` and `Real`.
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(f) => Some(*f),
        _ => None,
    }
}

/// Convert a `lopdf::Object` into a [`PdfValue`].
///
/// References are preserved as `PdfValue::Reference`.  Stream
/// dictionaries are converted but the raw stream bytes are discarded.
fn convert_object(obj: &lopdf::Object) -> PdfValue {
    match obj {
        lopdf::Object::Null => PdfValue::Null,
        lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
        lopdf::Object::Integer(i) => PdfValue::Integer(*i),
        lopdf::Object::Real(f) => PdfValue::Real(*f),
        lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
        lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
        lopdf::Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        lopdf::Object::Dictionary(dict) => {
            let entries = dict
                .iter()
                .map(|(k, v)| (k.clone(), convert_object(v)))
                .collect();
            PdfValue::Dict(entries)
        }
        lopdf::Object::Stream(stream) => {
            let entries = stream
                .dict
                .iter()
                .map(|(k, v)| (k.clone(), convert_object(v)))
                .collect();
            PdfValue::Dict(entries)
        }
        lopdf::Object::Reference(id) => PdfValue::Reference(*id),
    }
}

/// Best-effort decoding of raw PDF string bytes into a Rust `String`.
///
/// Handles three cases in order:
/// 1. UTF-16BE with BOM (`\xFE\xFF` prefix) -- strips BOM and decodes.
/// 2. Valid UTF-8 -- returned as-is.
/// 3. Fallback to Latin-1 (ISO 8859-1) -- each byte mapped to its Unicode
///    code point.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let payload = &bytes[2..];
        let code_units: Vec<u16> = payload
            .chunks(2)
            .filter_map(|chunk| {
                if chunk.len() == 2 {
                    Some(u16::from_be_bytes([chunk[0], chunk[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16_lossy(&code_units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

/// Abstraction over the PDF parsing backend (currently backed by `lopdf`).
///
/// The fragment extractor only talks to this trait, so it can be tested
/// against mock implementations carrying pre-decoded content operations.
pub trait PdfBackend {
    /// Return a mapping from 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return font information for every font referenced by the given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<FontInfo>, AmendError>;

    /// Return the raw (possibly compressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, AmendError>;

    /// Decode raw content-stream bytes into a sequence of [`ContentOp`]s.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, AmendError>;

    /// Decode raw string bytes found in a text-showing operator, using any
    /// font-specific encoding information the backend can find.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Height of the page in points, from the MediaBox.
    ///
    /// Needed to flip extracted y coordinates from PDF user space
    /// (origin bottom-left) to the top-left origin the layout thresholds
    /// are written against.
    fn page_height(&self, page: PageId) -> Result<f32, AmendError>;
}

/// Concrete [`PdfBackend`] implementation backed by [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    /// Parse a PDF from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self, AmendError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| AmendError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(AmendError::Encrypted);
        }

        Ok(Self { doc })
    }

    /// Total number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    // -- private helpers ----------------------------------------------------

    /// Walk up the page tree to find the MediaBox array.
    fn find_media_box(&self, dict: &lopdf::Dictionary) -> Option<Vec<lopdf::Object>> {
        if let Ok(obj) = dict.get(b"MediaBox") {
            if let Some(arr) = self.resolve_array(obj) {
                return Some(arr);
            }
        }

        // Recurse into Parent.
        if let Ok(parent_ref) = dict.get(b"Parent") {
            if let Ok(parent_id) = parent_ref.as_reference() {
                if let Ok(parent_obj) = self.doc.get_object(parent_id) {
                    if let Ok(parent_dict) = parent_obj.as_dict() {
                        return self.find_media_box(parent_dict);
                    }
                }
            }
        }

        None
    }

    /// Resolve an object to an array, following a single level of indirection.
    fn resolve_array(&self, obj: &lopdf::Object) -> Option<Vec<lopdf::Object>> {
        match obj {
            lopdf::Object::Array(arr) => Some(arr.clone()),
            lopdf::Object::Reference(id) => {
                if let Ok(resolved) = self.doc.get_object(*id) {
                    if let Ok(arr) = resolved.as_array() {
                        return Some(arr.clone());
                    }
                }
                None
            }
            _ => None,
        }
    }

    /// Convert a vector of lopdf objects to `f32` values.
    fn array_to_f32s(&self, objects: &[lopdf::Object]) -> Result<Vec<f32>, AmendError> {
        objects
            .iter()
            .map(|obj| {
                let resolved = match obj {
                    lopdf::Object::Reference(id) => self
                        .doc
                        .get_object(*id)
                        .map_err(|e| AmendError::Parse(e.to_string()))?,
                    other => other,
                };
                match resolved {
                    lopdf::Object::Integer(i) => Ok(*i as f32),
                    lopdf::Object::Real(f) => Ok(*f),
                    _ => Err(AmendError::Parse(format!(
                        "expected number in MediaBox, got {:?}",
                        resolved
                    ))),
                }
            })
            .collect()
    }

    /// Look up the encoding name for a font on a page.
    fn font_encoding_name(&self, page: PageId, font_name: &[u8]) -> Option<String> {
        let fonts = self.doc.get_page_fonts(page).ok()?;
        let font_dict = fonts.get(font_name)?;
        let enc_obj = font_dict.get(b"Encoding").ok()?;
        match enc_obj {
            lopdf::Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<FontInfo>, AmendError> {
        let fonts_map = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| AmendError::Parse(format!("cannot get page fonts: {}", e)))?;

        let mut result = Vec::with_capacity(fonts_map.len());
        for (name, dict) in &fonts_map {
            let base_font = dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned());

            let encoding = dict.get(b"Encoding").ok().and_then(|o| match o {
                lopdf::Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
                _ => None,
            });

            result.push(FontInfo {
                name: name.clone(),
                base_font,
                encoding,
            });
        }

        Ok(result)
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, AmendError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| AmendError::Parse(format!("cannot get page content: {}", e)))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, AmendError> {
        let content = Content::decode(data)
            .map_err(|e| AmendError::Parse(format!("content stream decode error: {}", e)))?;

        let ops = content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect();

        Ok(ops)
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        // Identity-H / Identity-V fonts typically use 2-byte CID codes
        // that map to Unicode.  Try UTF-16BE decoding first for those.
        if let Some(enc_name) = self.font_encoding_name(page, font_name) {
            if enc_name.contains("Identity") && bytes.len() >= 2 && bytes.len() % 2 == 0 {
                let code_units: Vec<u16> = bytes
                    .chunks(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                let decoded = String::from_utf16_lossy(&code_units);
                if !decoded.is_empty() && !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                    return decoded;
                }
            }
        }

        decode_text_simple(bytes)
    }

    fn page_height(&self, page: PageId) -> Result<f32, AmendError> {
        let page_obj = self
            .doc
            .get_object(page)
            .map_err(|e| AmendError::Parse(format!("cannot get page object: {}", e)))?;

        let page_dict = page_obj
            .as_dict()
            .map_err(|e| AmendError::Parse(format!("page object is not a dictionary: {}", e)))?;

        let media_box = self
            .find_media_box(page_dict)
            .ok_or_else(|| AmendError::Parse("MediaBox not found for page".into()))?;

        let nums = self.array_to_f32s(&media_box)?;
        if nums.len() < 4 {
            return Err(AmendError::Parse(format!(
                "MediaBox has {} elements, expected 4",
                nums.len()
            )));
        }

        Ok(nums[3] - nums[1])
    }
}
