use super::backend::{get_number_from_value, ContentOp, FontInfo, PageId, PdfBackend, PdfValue};
use crate::{clean, AmendError, Fragment, LayoutConfig};

/// Approximate character width as a fraction of font size.  We never see
/// real glyph metrics, so horizontal advances are estimated.  0.5 is a
/// reasonable default for proportional fonts and is accurate enough for
/// column classification, which only needs the *start* x of each run.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// The identity 2x3 text matrix: [a, b, c, d, tx, ty].
const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Mutable state tracked while walking a page's content stream.
#[derive(Debug, Clone)]
struct TextState {
    /// Current font resource name (the `/F1`-style key).
    font_key: Vec<u8>,
    /// Current font size in text-space units.
    font_size: f32,
    /// Elements [a, b, c, d, tx, ty] of the current text matrix.
    text_matrix: [f32; 6],
    /// Text line matrix -- set by BT and updated by Td/TD/T*/Tm.
    line_matrix: [f32; 6],
    /// Horizontal scaling factor (percent / 100).  Default 1.0.
    horiz_scale: f32,
    /// Character spacing (Tc).
    char_spacing: f32,
    /// Word spacing (Tw).
    word_spacing: f32,
    /// Text rise (Ts).
    text_rise: f32,
    /// Leading (TL).
    leading: f32,
    /// Bold detected from the current base-font name.
    bold: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
            bold: false,
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.text_matrix[4]
    }

    fn y(&self) -> f32 {
        self.text_matrix[5]
    }

    /// Effective font size accounting for the text matrix vertical scale.
    fn effective_font_size(&self) -> f32 {
        let scale = (self.text_matrix[1].powi(2) + self.text_matrix[3].powi(2)).sqrt();
        (self.font_size * scale).abs()
    }

    /// Advance the text matrix horizontally by `dx` text-space units.
    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Multiply the text line matrix by a translation (used by Td / TD).
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    /// Apply the `Tf` operator: set font and size, detect bold from the
    /// base-font name.
    fn set_font(&mut self, key: Vec<u8>, base_font: &str, size: f32) {
        self.font_key = key;
        self.font_size = size;
        self.bold = base_font.to_uppercase().contains("BOLD");
    }
}

fn resolve_font<'a>(key: &[u8], fonts: &'a [FontInfo]) -> Option<&'a FontInfo> {
    fonts.iter().find(|info| info.name == key)
}

/// Advance the text matrix after rendering `text`.
fn advance_after_show(text: &str, state: &mut TextState) {
    let mut total_dx: f32 = 0.0;
    for ch in text.chars() {
        let char_w = state.font_size * APPROX_CHAR_WIDTH_RATIO * state.horiz_scale;
        total_dx += char_w + state.char_spacing;
        if ch == ' ' {
            total_dx += state.word_spacing;
        }
    }
    state.advance_x(total_dx);
}

/// Decode a single [`PdfValue::Str`] operand using the backend's
/// font-aware decoder, falling back to the byte-level heuristic.
fn decode_string(
    val: &PdfValue,
    backend: &dyn PdfBackend,
    page_id: PageId,
    font_key: &[u8],
) -> String {
    match val {
        PdfValue::Str(bytes) => {
            let decoded = backend.decode_text(page_id, font_key, bytes);
            if decoded.is_empty() {
                super::backend::decode_text_simple(bytes)
            } else {
                decoded
            }
        }
        _ => String::new(),
    }
}

/// Collects fragments for one page, applying the exclusion policy.
struct FragmentSink<'a> {
    cfg: &'a LayoutConfig,
    page: u32,
    page_height: f32,
    out: Vec<Fragment>,
}

impl FragmentSink<'_> {
    /// Record a decoded text run at the current text position.
    ///
    /// Flips y to a top-left origin, then drops footer-zone and
    /// watermark-sized runs -- that exclusion is fragment-source policy,
    /// not the segmenter's concern.
    fn push(&mut self, text: &str, state: &TextState) {
        let text = clean::normalize(text);
        if text.is_empty() {
            return;
        }

        let font_size = state.effective_font_size();
        let y = self.page_height - (state.y() + state.text_rise);

        if y > self.cfg.footer_y {
            return;
        }
        if font_size >= self.cfg.watermark_font_size {
            return;
        }

        self.out.push(Fragment {
            text,
            x: state.x(),
            y,
            page: self.page,
            font_size,
            bold: state.bold,
        });
    }
}

/// Walk a single page's content stream and produce its [`Fragment`]s.
///
/// Implements a simplified PDF text-rendering state machine covering the
/// positioning operators (`BT`/`ET`, `Tm`, `Td`, `TD`, `T*`, `TL`), the
/// state operators (`Tf`, `Tc`, `Tw`, `Tz`, `Ts`), and the show
/// operators (`Tj`, `TJ`, `'`, `"`).
pub fn extract_page_fragments(
    backend: &dyn PdfBackend,
    page_id: PageId,
    page_num: u32,
    cfg: &LayoutConfig,
) -> Result<Vec<Fragment>, AmendError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;
    let fonts = backend.page_fonts(page_id).unwrap_or_default();
    let page_height = backend.page_height(page_id)?;

    let mut state = TextState::default();
    let mut sink = FragmentSink {
        cfg,
        page: page_num,
        page_height,
        out: Vec::new(),
    };

    for op in &ops {
        match op.operator.as_str() {
            "BT" => {
                state.text_matrix = IDENTITY_MATRIX;
                state.line_matrix = IDENTITY_MATRIX;
            }
            "ET" => {
                // Font state is kept across text objects: some PDFs set
                // the font once and reuse it.
            }

            "Tf" => {
                handle_tf(&op.operands, &fonts, &mut state);
            }

            "Tm" => {
                handle_tm(&op.operands, &mut state);
            }
            "Td" => {
                if op.operands.len() >= 2 {
                    let tx = get_number_from_value(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number_from_value(&op.operands[1]).unwrap_or(0.0);
                    state.translate_line(tx, ty);
                }
            }
            "TD" => {
                // TD is equivalent to: -ty TL ; tx ty Td
                if op.operands.len() >= 2 {
                    let tx = get_number_from_value(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number_from_value(&op.operands[1]).unwrap_or(0.0);
                    state.leading = -ty;
                    state.translate_line(tx, ty);
                }
            }
            "T*" => {
                state.translate_line(0.0, -state.leading);
            }
            "TL" => {
                if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                    state.leading = v;
                }
            }

            "Tc" => {
                if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                    state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                    state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                    state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                    state.text_rise = v;
                }
            }

            "Tj" => {
                if let Some(first) = op.operands.first() {
                    show_string(first, backend, page_id, &mut state, &mut sink);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(arr)) = op.operands.first() {
                    show_tj_array(arr, backend, page_id, &mut state, &mut sink);
                }
            }

            "'" => {
                state.translate_line(0.0, -state.leading);
                if let Some(first) = op.operands.first() {
                    show_string(first, backend, page_id, &mut state, &mut sink);
                }
            }
            "\"" => {
                // " aw ac string  =>  set Tw, Tc, T*, Tj
                if op.operands.len() >= 3 {
                    if let Some(aw) = get_number_from_value(&op.operands[0]) {
                        state.word_spacing = aw;
                    }
                    if let Some(ac) = get_number_from_value(&op.operands[1]) {
                        state.char_spacing = ac;
                    }
                    state.translate_line(0.0, -state.leading);
                    show_string(&op.operands[2], backend, page_id, &mut state, &mut sink);
                }
            }

            _ => { /* Ignore non-text operators */ }
        }
    }

    Ok(sink.out)
}

fn handle_tf(operands: &[PdfValue], fonts: &[FontInfo], state: &mut TextState) {
    if operands.len() < 2 {
        return;
    }
    let key = match &operands[0] {
        PdfValue::Name(n) => n.clone(),
        PdfValue::Str(s) => s.clone(),
        _ => return,
    };
    let size = get_number_from_value(&operands[1]).unwrap_or(0.0);
    if let Some(info) = resolve_font(&key, fonts) {
        let base = info.base_font.as_deref().unwrap_or("");
        state.set_font(key, base, size);
    } else {
        // Font not in the resource dict -- keep the key, assume regular.
        let name = String::from_utf8_lossy(&key).to_string();
        state.set_font(key, &name, size);
    }
}

fn handle_tm(operands: &[PdfValue], state: &mut TextState) {
    if operands.len() < 6 {
        return;
    }
    let vals: Vec<f32> = operands
        .iter()
        .take(6)
        .filter_map(get_number_from_value)
        .collect();
    if vals.len() == 6 {
        state.text_matrix = [vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]];
        state.line_matrix = state.text_matrix;
    }
}

/// Decode an operand, record a fragment, advance the text position.
/// Shared by `Tj`, `'`, and `"`.
fn show_string(
    operand: &PdfValue,
    backend: &dyn PdfBackend,
    page_id: PageId,
    state: &mut TextState,
    sink: &mut FragmentSink<'_>,
) {
    let text = decode_string(operand, backend, page_id, &state.font_key);
    if text.is_empty() {
        return;
    }
    let at = state.clone();
    advance_after_show(&text, state);
    sink.push(&text, &at);
}

/// Process a `TJ` array: strings to render interleaved with numeric
/// kerning adjustments (thousandths of a text-space unit).  A run of
/// strings becomes one fragment; a kerning gap wide enough to look like a
/// word boundary inserts a space into the buffer.
fn show_tj_array(
    arr: &[PdfValue],
    backend: &dyn PdfBackend,
    page_id: PageId,
    state: &mut TextState,
    sink: &mut FragmentSink<'_>,
) {
    let mut buf = String::new();
    let mut start = state.clone();

    for elem in arr {
        match elem {
            PdfValue::Str(_) => {
                let fragment = decode_string(elem, backend, page_id, &state.font_key);
                if buf.is_empty() {
                    start = state.clone();
                }
                buf.push_str(&fragment);
                advance_after_show(&fragment, state);
            }
            val => {
                // Negative adjustment moves right, positive moves left.
                if let Some(adj) = get_number_from_value(val) {
                    let dx = -adj / 1000.0 * state.font_size * state.horiz_scale;
                    let gap_threshold =
                        state.font_size * APPROX_CHAR_WIDTH_RATIO * state.horiz_scale * 0.3;

                    if dx > gap_threshold && !buf.is_empty() {
                        buf.push(' ');
                    }

                    state.advance_x(dx);
                }
            }
        }
    }

    if !buf.is_empty() {
        sink.push(&buf, &start);
    }
}

/// Extract fragments from every page of the document, in page order.
pub fn extract_all_fragments(
    backend: &dyn PdfBackend,
    cfg: &LayoutConfig,
) -> Result<Vec<Fragment>, AmendError> {
    let page_map = backend.pages();
    let mut fragments = Vec::new();

    for (&page_num, &page_id) in &page_map {
        fragments.extend(extract_page_fragments(backend, page_id, page_num, cfg)?);
    }

    Ok(fragments)
}
