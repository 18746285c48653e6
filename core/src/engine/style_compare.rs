//! Ordered comparison of style snapshots and resolved fonts.
//!
//! Attributes are checked in the order [`StyleSnapshot`] declares them.
//! The default is first-mismatch-wins; exhaustive mode keeps walking and
//! collects every differing attribute in that same order.

use std::fmt::Display;

use crate::diff::Side;
use crate::style::{FontDescriptor, StyleSnapshot};
use crate::view::SpreadsheetView;

/// One attribute whose values disagree between the two sides, with both
/// values already rendered for the event description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct AttributeMismatch {
    pub(super) attribute: &'static str,
    pub(super) value_a: String,
    pub(super) value_b: String,
}

/// Outcome of the font phase for one cell pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum FontFinding {
    /// A font index did not resolve through its view. Reported as a
    /// finding; the run continues.
    Unavailable { side: Side, index: u32 },
    Mismatch(AttributeMismatch),
}

struct Checker {
    all: bool,
    out: Vec<AttributeMismatch>,
}

impl Checker {
    fn new(all: bool) -> Checker {
        Checker {
            all,
            out: Vec::new(),
        }
    }

    fn check<T: PartialEq + Display>(&mut self, attribute: &'static str, a: T, b: T) {
        if !self.all && !self.out.is_empty() {
            return;
        }
        if a != b {
            self.out.push(AttributeMismatch {
                attribute,
                value_a: a.to_string(),
                value_b: b.to_string(),
            });
        }
    }
}

/// Walks the snapshot attributes in declared order. Returns at most one
/// mismatch unless `all` is set.
pub(super) fn compare_styles(
    a: &StyleSnapshot,
    b: &StyleSnapshot,
    all: bool,
) -> Vec<AttributeMismatch> {
    let mut c = Checker::new(all);
    c.check("locked", a.locked, b.locked);
    c.check(
        "horizontal_alignment",
        a.horizontal_alignment,
        b.horizontal_alignment,
    );
    c.check("border_bottom", a.border_bottom, b.border_bottom);
    c.check("border_left", a.border_left, b.border_left);
    c.check("border_right", a.border_right, b.border_right);
    c.check("border_top", a.border_top, b.border_top);
    c.check("wrap_text", a.wrap_text, b.wrap_text);
    c.check(
        "vertical_alignment",
        a.vertical_alignment,
        b.vertical_alignment,
    );
    c.check("top_border_color", &a.top_border_color, &b.top_border_color);
    c.check("rotation", a.rotation, b.rotation);
    c.check(
        "right_border_color",
        &a.right_border_color,
        &b.right_border_color,
    );
    c.check(
        "left_border_color",
        &a.left_border_color,
        &b.left_border_color,
    );
    c.check("indention", a.indention, b.indention);
    c.check("hidden", a.hidden, b.hidden);
    c.check("fill_pattern", a.fill_pattern, b.fill_pattern);
    c.check(
        "fill_foreground_color",
        &a.fill_foreground_color,
        &b.fill_foreground_color,
    );
    c.check(
        "fill_foreground_color_index",
        a.fill_foreground_color_index,
        b.fill_foreground_color_index,
    );
    c.check("data_format", &a.data_format, &b.data_format);
    c.check(
        "bottom_border_color",
        &a.bottom_border_color,
        &b.bottom_border_color,
    );
    c.check(
        "fill_background_color_index",
        a.fill_background_color_index,
        b.fill_background_color_index,
    );
    c.check(
        "fill_background_color",
        &a.fill_background_color,
        &b.fill_background_color,
    );
    c.out
}

/// Resolves both fonts and compares them, first difference wins.
///
/// A failed resolution on side A is reported before one on side B.
pub(super) fn compare_fonts(
    view_a: &dyn SpreadsheetView,
    view_b: &dyn SpreadsheetView,
    style_a: &StyleSnapshot,
    style_b: &StyleSnapshot,
) -> Option<FontFinding> {
    let font_a = match view_a.font(style_a.font_index) {
        Some(font) => font,
        None => {
            return Some(FontFinding::Unavailable {
                side: Side::First,
                index: style_a.font_index,
            });
        }
    };
    let font_b = match view_b.font(style_b.font_index) {
        Some(font) => font,
        None => {
            return Some(FontFinding::Unavailable {
                side: Side::Second,
                index: style_b.font_index,
            });
        }
    };
    first_font_mismatch(font_a, font_b).map(FontFinding::Mismatch)
}

fn first_font_mismatch(a: &FontDescriptor, b: &FontDescriptor) -> Option<AttributeMismatch> {
    let mut c = Checker::new(false);
    c.check("bold_weight", a.bold_weight, b.bold_weight);
    c.check("color", &a.color, &b.color);
    c.check("height", a.height, b.height);
    c.check("name", &a.name, &b.name);
    c.out.into_iter().next()
}
