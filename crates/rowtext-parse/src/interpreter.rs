//! Content stream interpreter.
//!
//! Walks tokenized operators, keeps the graphics and text state current, and
//! reports one [`TextRunEvent`] per text-show operator. Form XObjects are
//! interpreted recursively with their own resources.

use std::collections::HashMap;

use crate::decode::DecodeOptions;
use crate::error::{DecodeError, DecodeWarning, WarningKind};
use crate::font::FontInfo;
use crate::handler::{ContentHandler, TextRunEvent};
use crate::lopdf_backend::{object_to_f64, resolve_ref, stream_content};
use crate::text_state::{GraphicsState, TextState};
use crate::tokenizer::{Operand, Operator, tokenize};

/// A `TJ` adjustment moving right by more than this many thousandths of an
/// em is read as a word gap and becomes a space in the run's text.
pub const TJ_SPACE_THRESHOLD: f64 = 200.0;

/// Interpreter state shared across a page and the form XObjects it draws.
pub(crate) struct Interpreter<'a> {
    doc: &'a lopdf::Document,
    options: &'a DecodeOptions,
    gstate: GraphicsState,
    tstate: TextState,
}

/// Fonts loaded from one resource dictionary, keyed by resource name.
type FontCache = HashMap<String, FontInfo>;

impl<'a> Interpreter<'a> {
    pub(crate) fn new(doc: &'a lopdf::Document, options: &'a DecodeOptions) -> Self {
        Self {
            doc,
            options,
            gstate: GraphicsState::new(),
            tstate: TextState::new(),
        }
    }

    /// Interpret one content stream.
    ///
    /// `depth` is 0 for a page and grows by one per nested form XObject.
    pub(crate) fn run(
        &mut self,
        content: &[u8],
        resources: &'a lopdf::Dictionary,
        handler: &mut dyn ContentHandler,
        depth: usize,
    ) -> Result<(), DecodeError> {
        if depth > self.options.max_recursion_depth {
            return Err(DecodeError::RecursionLimit {
                depth,
                limit: self.options.max_recursion_depth,
            });
        }

        let operators = tokenize(content)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(depth, operators = operators.len(), "interpreting content stream");

        let mut fonts = FontCache::new();
        let mut warned_outside_bt = false;

        for (index, op) in operators.iter().enumerate() {
            match op.name.as_str() {
                "q" => self.gstate.save(&self.tstate.params),
                "Q" => self.gstate.restore(&mut self.tstate.params),
                "cm" => {
                    if let Some(m) = op.matrix() {
                        self.gstate.concat(m);
                    }
                }

                "BT" => self.tstate.begin_text(),
                "ET" => self.tstate.end_text(),
                "Tf" => {
                    if let (Some(name), Some(size)) =
                        (op.operands.first().and_then(Operand::as_name), op.f64_at(1))
                    {
                        self.tstate.params.font_name = name.to_string();
                        self.tstate.params.font_size = size;
                    }
                }
                "Tc" => set_param(op, &mut self.tstate.params.char_spacing),
                "Tw" => set_param(op, &mut self.tstate.params.word_spacing),
                "Tz" => set_param(op, &mut self.tstate.params.h_scaling),
                "TL" => set_param(op, &mut self.tstate.params.leading),
                "Ts" => set_param(op, &mut self.tstate.params.rise),

                "Td" => {
                    if let (Some(tx), Some(ty)) = (op.f64_at(0), op.f64_at(1)) {
                        self.tstate.move_text_position(tx, ty);
                    }
                }
                "TD" => {
                    if let (Some(tx), Some(ty)) = (op.f64_at(0), op.f64_at(1)) {
                        self.tstate.move_text_position_and_set_leading(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = op.matrix() {
                        self.tstate.set_text_matrix(m);
                    }
                }
                "T*" => self.tstate.move_to_next_line(),

                "Tj" | "TJ" | "'" | "\"" => {
                    if !self.tstate.in_text_object() && !warned_outside_bt {
                        warned_outside_bt = true;
                        handler.on_warning(
                            DecodeWarning::new(
                                WarningKind::TextOutsideObject,
                                format!("{} outside BT/ET", op.name),
                            )
                            .at_operator(index),
                        );
                    }
                    self.show(op, index, resources, &mut fonts, handler);
                }

                "Do" => {
                    if let Some(name) = op.operands.first().and_then(Operand::as_name) {
                        self.draw_xobject(name, index, resources, handler, depth)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn show(
        &mut self,
        op: &Operator,
        index: usize,
        resources: &lopdf::Dictionary,
        fonts: &mut FontCache,
        handler: &mut dyn ContentHandler,
    ) {
        let items: &[Operand] = match op.name.as_str() {
            "Tj" => &op.operands[..op.operands.len().min(1)],
            "'" => {
                self.tstate.move_to_next_line();
                &op.operands[..op.operands.len().min(1)]
            }
            "\"" => {
                if let (Some(aw), Some(ac)) = (op.f64_at(0), op.f64_at(1)) {
                    self.tstate.params.word_spacing = aw;
                    self.tstate.params.char_spacing = ac;
                }
                self.tstate.move_to_next_line();
                op.operands.get(2..).unwrap_or(&[])
            }
            _ => match op.operands.first() {
                Some(Operand::Array(items)) => items.as_slice(),
                _ => &[],
            },
        };

        let font_name = self.tstate.params.font_name.clone();
        if !fonts.contains_key(&font_name) {
            let font = self.load_font(&font_name, index, resources, handler);
            fonts.insert(font_name.clone(), font);
        }
        let Some(font) = fonts.get(&font_name) else {
            return;
        };

        let (x, y) = self.tstate.origin(self.gstate.ctm());
        let mut text = String::new();
        for item in items {
            match item {
                Operand::String(bytes) => {
                    for glyph in font.glyphs(bytes) {
                        if let Some(t) = &glyph.text {
                            text.push_str(t);
                        }
                        let tx = self.tstate.glyph_advance(glyph.width, glyph.is_word_space);
                        self.tstate.advance(tx);
                    }
                }
                other => {
                    if let Some(amount) = other.as_f64() {
                        if -amount > TJ_SPACE_THRESHOLD && !text.is_empty() && !text.ends_with(' ')
                        {
                            text.push(' ');
                        }
                        let tx = self.tstate.adjustment_advance(amount);
                        self.tstate.advance(tx);
                    }
                }
            }
        }

        handler.on_text_run(TextRunEvent {
            text,
            x,
            y,
            font_name,
            font_size: self.tstate.params.font_size,
            operator_index: index,
        });
    }

    fn load_font(
        &self,
        name: &str,
        index: usize,
        resources: &lopdf::Dictionary,
        handler: &mut dyn ContentHandler,
    ) -> FontInfo {
        let dict = resources
            .get(b"Font")
            .ok()
            .map(|o| resolve_ref(self.doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|fonts| fonts.get(name.as_bytes()).ok())
            .map(|o| resolve_ref(self.doc, o))
            .and_then(|o| o.as_dict().ok());

        match dict {
            Some(dict) => {
                let (font, warnings) = FontInfo::load(self.doc, dict);
                for w in warnings {
                    handler.on_warning(w.at_operator(index));
                }
                font
            }
            None => {
                handler.on_warning(
                    DecodeWarning::new(
                        WarningKind::MissingFont,
                        format!("font /{name} not found in resources"),
                    )
                    .at_operator(index),
                );
                FontInfo::default()
            }
        }
    }

    fn draw_xobject(
        &mut self,
        name: &str,
        index: usize,
        resources: &'a lopdf::Dictionary,
        handler: &mut dyn ContentHandler,
        depth: usize,
    ) -> Result<(), DecodeError> {
        let doc = self.doc;
        let stream = resources
            .get(b"XObject")
            .ok()
            .map(|o| resolve_ref(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|xobjects| xobjects.get(name.as_bytes()).ok())
            .map(|o| resolve_ref(doc, o))
            .and_then(|o| o.as_stream().ok());
        let Some(stream) = stream else {
            handler.on_warning(
                DecodeWarning::new(
                    WarningKind::MissingXObject,
                    format!("XObject /{name} not found in resources"),
                )
                .at_operator(index),
            );
            return Ok(());
        };

        let subtype = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .unwrap_or(b"");
        if subtype != b"Form" {
            return Ok(());
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(xobject = name, depth = depth + 1, "entering form XObject");

        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .map(|o| resolve_ref(doc, o))
            .and_then(|o| o.as_dict().ok())
            .unwrap_or(resources);
        let content = stream_content(stream)?;

        self.gstate.save(&self.tstate.params);
        if let Some(m) = form_matrix(doc, &stream.dict) {
            self.gstate.concat(m);
        }
        let result = self.run(&content, form_resources, handler, depth + 1);
        self.gstate.restore(&mut self.tstate.params);
        result
    }
}

fn set_param(op: &Operator, slot: &mut f64) {
    if let Some(v) = op.f64_at(0) {
        *slot = v;
    }
}

fn form_matrix(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Option<[f64; 6]> {
    let arr = dict.get(b"Matrix").ok()?.as_array().ok()?;
    if arr.len() != 6 {
        return None;
    }
    let mut m = [0.0; 6];
    for (slot, obj) in m.iter_mut().zip(arr) {
        *slot = object_to_f64(resolve_ref(doc, obj)).ok()?;
    }
    Some(m)
}
