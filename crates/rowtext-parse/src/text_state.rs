//! Graphics and text state for the content stream interpreter.
//!
//! Tracks only what positions text: the CTM, the text and line matrices, and
//! the text state parameters that feed glyph advances (`Tc`, `Tw`, `Tz`,
//! `TL`, `Ts`, `Tf`).

/// A PDF affine matrix `[a b c d e f]`, applied to row vectors `[x y 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn from_array(m: [f64; 6]) -> Self {
        Self::new(m[0], m[1], m[2], m[3], m[4], m[5])
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }
}

/// Text state parameters saved and restored by `q`/`Q`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    pub char_spacing: f64,
    pub word_spacing: f64,
    /// Horizontal scaling in percent (`Tz`), 100 = normal.
    pub h_scaling: f64,
    pub leading: f64,
    pub rise: f64,
    /// Resource name of the current font (`/F1`).
    pub font_name: String,
    pub font_size: f64,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 100.0,
            leading: 0.0,
            rise: 0.0,
            font_name: String::new(),
            font_size: 0.0,
        }
    }
}

/// Text object state: parameters plus the matrices owned by `BT`/`ET`.
#[derive(Debug, Clone, Default)]
pub struct TextState {
    pub params: TextParams,
    in_text_object: bool,
    text_matrix: Matrix,
    line_matrix: Matrix,
}

impl TextState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_text_object(&self) -> bool {
        self.in_text_object
    }

    pub fn text_matrix(&self) -> &Matrix {
        &self.text_matrix
    }

    /// `BT`
    pub fn begin_text(&mut self) {
        self.text_matrix = Matrix::identity();
        self.line_matrix = Matrix::identity();
        self.in_text_object = true;
    }

    /// `ET`
    pub fn end_text(&mut self) {
        self.in_text_object = false;
    }

    /// `Tm`
    pub fn set_text_matrix(&mut self, m: [f64; 6]) {
        self.text_matrix = Matrix::from_array(m);
        self.line_matrix = self.text_matrix;
    }

    /// `Td`
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `TD`: like `Td`, and sets the leading to `-ty`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.params.leading = -ty;
        self.move_text_position(tx, ty);
    }

    /// `T*`
    pub fn move_to_next_line(&mut self) {
        let leading = self.params.leading;
        self.move_text_position(0.0, -leading);
    }

    /// Shift the text matrix along the baseline by `tx` text space units.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Matrix::translation(tx, 0.0).then(&self.text_matrix);
    }

    /// Horizontal displacement, in text space, of one glyph.
    ///
    /// `width` is in glyph space (1/1000 em). Word spacing applies only to
    /// single-byte code 32.
    pub fn glyph_advance(&self, width: f64, is_word_space: bool) -> f64 {
        let p = &self.params;
        let mut tx = width / 1000.0 * p.font_size + p.char_spacing;
        if is_word_space {
            tx += p.word_spacing;
        }
        tx * p.h_scaling / 100.0
    }

    /// Displacement for a `TJ` number, in text space.
    pub fn adjustment_advance(&self, amount: f64) -> f64 {
        -amount / 1000.0 * self.params.font_size * self.params.h_scaling / 100.0
    }

    /// Origin of the next glyph in user space, honoring the text rise.
    pub fn origin(&self, ctm: &Matrix) -> (f64, f64) {
        self.text_matrix
            .then(ctm)
            .transform_point(0.0, self.params.rise)
    }
}

/// CTM plus a `q`/`Q` stack that also carries the text parameters.
#[derive(Debug, Clone, Default)]
pub struct GraphicsState {
    ctm: Matrix,
    stack: Vec<(Matrix, TextParams)>,
}

impl GraphicsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ctm(&self) -> &Matrix {
        &self.ctm
    }

    /// `cm`: pre-multiply the CTM.
    pub fn concat(&mut self, m: [f64; 6]) {
        self.ctm = Matrix::from_array(m).then(&self.ctm);
    }

    /// `q`
    pub fn save(&mut self, params: &TextParams) {
        self.stack.push((self.ctm, params.clone()));
    }

    /// `Q`. An unbalanced `Q` leaves the state unchanged.
    pub fn restore(&mut self, params: &mut TextParams) {
        if let Some((ctm, saved)) = self.stack.pop() {
            self.ctm = ctm;
            *params = saved;
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
