//! Static glyph-width tables for the standard PDF fonts the report can use.
//!
//! Widths come from the Adobe core-font AFM files, in thousandths of an em.
//! Tables cover ASCII 0x20..=0x7E (95 printable characters); index = (char as usize) - 32.
//! Anything outside that range is measured with `average_char_width`.

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

/// Standard-14 fonts usable without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Helvetica,
    Courier,
}

impl FontFamily {
    /// `BaseFont` name written into the PDF font dictionary.
    pub fn base_font(self) -> &'static str {
        match self {
            FontFamily::Helvetica => "Helvetica",
            FontFamily::Courier => "Courier",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Width table for a font family.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub font: FontFamily,
    widths: [u16; 95],
    pub average_char_width: u16,
    pub space_width: u16,
}

impl FontMetricTable {
    /// Width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        let thousandths: u32 = s
            .chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32] as u32
                } else {
                    self.average_char_width as u32
                }
            })
            .sum();
        thousandths as f32 / 1000.0
    }

    /// Width of a string in points at the given font size.
    pub fn width_pt(&self, s: &str, font_size_pt: f32) -> f32 {
        self.measure_str(s) * font_size_pt
    }

    /// Greedy word-wrap to `max_width_pt`.
    ///
    /// Explicit newlines always break; blank input lines survive as empty lines.
    /// Runs of whitespace inside a line collapse to one space. A single word wider
    /// than the line is split across as many lines as it needs.
    pub fn wrap_text(&self, text: &str, font_size_pt: f32, max_width_pt: f32) -> Vec<String> {
        let space_w = self.space_width as f32 / 1000.0 * font_size_pt;
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let words: Vec<&str> = paragraph.split_whitespace().collect();
            if words.is_empty() {
                lines.push(String::new());
                continue;
            }

            let mut current = String::new();
            let mut current_w = 0.0_f32;

            for word in words {
                let word_w = self.width_pt(word, font_size_pt);

                if word_w > max_width_pt {
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                    let mut pieces = self.split_long_word(word, font_size_pt, max_width_pt);
                    // The tail of a split word can still take following words.
                    let tail = pieces.pop().unwrap_or_default();
                    lines.extend(pieces);
                    current_w = self.width_pt(&tail, font_size_pt);
                    current = tail;
                    continue;
                }

                if current.is_empty() {
                    current.push_str(word);
                    current_w = word_w;
                } else if current_w + space_w + word_w > max_width_pt {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                    current_w = word_w;
                } else {
                    current.push(' ');
                    current.push_str(word);
                    current_w += space_w + word_w;
                }
            }

            lines.push(current);
        }

        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines
    }

    fn split_long_word(&self, word: &str, font_size_pt: f32, max_width_pt: f32) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut piece = String::new();
        let mut piece_w = 0.0_f32;

        for c in word.chars() {
            let mut buf = [0u8; 4];
            let c_w = self.width_pt(c.encode_utf8(&mut buf), font_size_pt);
            if !piece.is_empty() && piece_w + c_w > max_width_pt {
                pieces.push(std::mem::take(&mut piece));
                piece_w = 0.0;
            }
            piece.push(c);
            piece_w += c_w;
        }
        pieces.push(piece);
        pieces
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Helvetica,
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    average_char_width: 556,
    space_width: 278,
};

/// Courier is monospaced.
static COURIER_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Courier,
    widths: [600; 95],
    average_char_width: 600,
    space_width: 600,
};

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Helvetica => &HELVETICA_TABLE,
        FontFamily::Courier => &COURIER_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
