//! Text measurement for node sizing.
//!
//! Node sizes are derived from the text a node displays: its title, an
//! optional technology tag and an optional description. Measurement goes
//! through the [`TextMeasure`] trait so that callers can choose between the
//! deterministic [`WidthTable`] (the default, no font files required) and,
//! with the `font-shaping` feature, real font metrics via `cosmic-text`.
//!
//! # Overview
//!
//! - [`TextStyle`] - Font size and weight of a text run
//! - [`TextMeasure`] - Measures the width of a single line
//! - [`WidthTable`] - Per-character width table approximating proportional fonts
//! - [`wrap_text`] - Greedy word wrap producing a [`WrappedText`]
//! - [`NodeText`] / [`measure_node`] - Content size of a whole node
//!
//! # Quick Start
//!
//! ```
//! # use astrolabe_core::text::{TextMeasure, TextStyle, WidthTable};
//! let table = WidthTable::new();
//! let narrow = table.line_width("iiii", TextStyle::NORMAL);
//! let wide = table.line_width("MMMM", TextStyle::NORMAL);
//! assert!(wide > narrow);
//! ```

use crate::{
    geometry::{Insets, Size},
    kind::ElementKind,
};

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Maximum width of a wrapped description line, in pixels.
pub const DESCRIPTION_WRAP_WIDTH: f32 = 260.0;

/// Padding added around measured node content (40px horizontal, 30px vertical in total).
pub const NODE_CONTENT_PADDING: Insets = Insets::symmetric(15.0, 20.0);

// =============================================================================
// Text styles
// =============================================================================

/// Font size and weight of a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    font_size: f32,
    bold: bool,
}

impl TextStyle {
    /// Body text: 12pt regular.
    pub const NORMAL: TextStyle = TextStyle::new(12.0, false);

    /// Node titles: 14pt bold.
    pub const TITLE: TextStyle = TextStyle::new(14.0, true);

    pub const fn new(font_size: f32, bold: bool) -> Self {
        Self { font_size, bold }
    }

    /// Returns the font size in points.
    pub fn font_size(self) -> f32 {
        self.font_size
    }

    /// Returns `true` for bold text.
    pub fn is_bold(self) -> bool {
        self.bold
    }

    /// Height of a single line of this style.
    pub fn line_height(self) -> f32 {
        self.font_size * LINE_HEIGHT_FACTOR
    }
}

/// Measures the rendered width of single lines of text.
pub trait TextMeasure {
    /// Width in pixels of `line` rendered in `style`. Newlines are not interpreted.
    fn line_width(&self, line: &str, style: TextStyle) -> f32;
}

// =============================================================================
// Width table
// =============================================================================

/// Character classes of the width table, relative to the base width.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CharClass {
    Whitespace,
    Narrow,
    Wide,
    Upper,
    Regular,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_whitespace() {
            Self::Whitespace
        } else if matches!(c, 'i' | 'l' | 'I' | '1' | '|' | '.' | ',' | ':' | ';' | '\'' | '!') {
            Self::Narrow
        } else if matches!(c, 'm' | 'w' | 'M' | 'W') {
            Self::Wide
        } else if c.is_uppercase() {
            Self::Upper
        } else {
            Self::Regular
        }
    }
}

/// Per-character width table approximating common proportional fonts.
///
/// All widths are defined at 12pt and scale linearly with `font_size / 12`.
/// Bold text is widened by a constant factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthTable {
    base_width: f32,
    whitespace: f32,
    narrow: f32,
    wide: f32,
    upper: f32,
    bold_factor: f32,
}

impl WidthTable {
    pub const fn new() -> Self {
        Self {
            base_width: 7.0,
            whitespace: 0.5,
            narrow: 0.45,
            wide: 1.45,
            upper: 1.2,
            bold_factor: 1.08,
        }
    }

    /// Width of a single character at 12pt regular.
    fn char_width(&self, c: char) -> f32 {
        let factor = match CharClass::of(c) {
            CharClass::Whitespace => self.whitespace,
            CharClass::Narrow => self.narrow,
            CharClass::Wide => self.wide,
            CharClass::Upper => self.upper,
            CharClass::Regular => 1.0,
        };
        self.base_width * factor
    }
}

impl Default for WidthTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for WidthTable {
    fn line_width(&self, line: &str, style: TextStyle) -> f32 {
        let raw: f32 = line.chars().map(|c| self.char_width(c)).sum();
        let scaled = raw * style.font_size() / 12.0;
        if style.is_bold() {
            scaled * self.bold_factor
        } else {
            scaled
        }
    }
}

// =============================================================================
// Word wrap
// =============================================================================

/// Result of wrapping text to a maximum width.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedText {
    lines: Vec<String>,
    width: f32,
    height: f32,
}

impl WrappedText {
    /// The wrapped lines, in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Width of the widest line.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Total height: `line_count × font_size × 1.2`.
    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Greedily wraps `text` so each line stays within `max_width`.
///
/// Words are whitespace-separated and never split; a single word wider than
/// `max_width` occupies a line of its own. Empty or blank text produces no
/// lines and a zero size.
pub fn wrap_text(
    measure: &impl TextMeasure,
    text: &str,
    style: TextStyle,
    max_width: f32,
) -> WrappedText {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure.line_width(&candidate, style) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    let width = lines
        .iter()
        .map(|line| measure.line_width(line, style))
        .fold(0.0_f32, f32::max);
    let height = lines.len() as f32 * style.line_height();

    WrappedText {
        lines,
        width,
        height,
    }
}

// =============================================================================
// Node content sizing
// =============================================================================

/// The text sections displayed inside a node.
#[derive(Debug, Clone, Copy)]
pub struct NodeText<'a> {
    pub title: &'a str,
    pub technology: Option<&'a str>,
    pub description: Option<&'a str>,
}

/// Computes the size of a node from its text, clamped to the kind's bounds.
///
/// Width is the widest section (title, `[technology]` tag, wrapped
/// description); height is the sum of the section heights. Both get
/// [`NODE_CONTENT_PADDING`] before clamping into
/// `[kind.min_size(), kind.max_size()]`.
pub fn measure_node(measure: &impl TextMeasure, text: NodeText<'_>, kind: ElementKind) -> Size {
    let title = Size::new(
        measure.line_width(text.title, TextStyle::TITLE),
        TextStyle::TITLE.line_height(),
    );

    let technology = text
        .technology
        .filter(|tech| !tech.is_empty())
        .map(|tech| {
            Size::new(
                measure.line_width(&format!("[{tech}]"), TextStyle::NORMAL),
                TextStyle::NORMAL.line_height(),
            )
        })
        .unwrap_or_default();

    let description = text
        .description
        .map(|desc| wrap_text(measure, desc, TextStyle::NORMAL, DESCRIPTION_WRAP_WIDTH).size())
        .unwrap_or_default();

    title
        .merge_vertical(technology)
        .merge_vertical(description)
        .add_padding(NODE_CONTENT_PADDING)
        .clamp(kind.min_size(), kind.max_size())
}

// =============================================================================
// Font shaping backend
// =============================================================================

#[cfg(feature = "font-shaping")]
pub use shaping::FontShaper;

#[cfg(feature = "font-shaping")]
mod shaping {
    use std::sync::{Mutex, PoisonError};

    use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Weight};
    use log::info;

    use super::{TextMeasure, TextStyle};

    /// Measures text with real font metrics using `cosmic-text`.
    ///
    /// Owns its `FontSystem`; creating one scans system fonts, so build a
    /// shaper once and reuse it across measurements.
    pub struct FontShaper {
        font_system: Mutex<FontSystem>,
        family: String,
    }

    impl FontShaper {
        /// Create a shaper for the given font family
        pub fn new(family: impl Into<String>) -> Self {
            info!("Initializing FontSystem");
            Self {
                font_system: Mutex::new(FontSystem::new()),
                family: family.into(),
            }
        }
    }

    impl TextMeasure for FontShaper {
        fn line_width(&self, line: &str, style: TextStyle) -> f32 {
            if line.is_empty() {
                return 0.0;
            }

            let mut font_system = self
                .font_system
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            // Points to pixels at standard DPI
            let font_size_px = style.font_size() * 1.33;
            let metrics = Metrics::new(font_size_px, style.line_height());

            let mut buffer = Buffer::new(&mut font_system, metrics);
            let mut buffer = buffer.borrow_with(&mut font_system);

            let weight = if style.is_bold() {
                Weight::BOLD
            } else {
                Weight::NORMAL
            };
            let attrs = Attrs::new()
                .family(Family::Name(&self.family))
                .weight(weight);

            buffer.set_size(None, None);
            buffer.set_text(line, &attrs, Shaping::Advanced, None);
            buffer.shape_until_scroll(true);

            let width = buffer
                .layout_runs()
                .filter_map(|run| run.glyphs.last().map(|last| last.x + last.w))
                .fold(0.0_f32, f32::max);

            if width > 0.0 {
                width
            } else {
                line.chars().count() as f32 * font_size_px * 0.55
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_width_table_character_classes() {
        let table = WidthTable::new();
        let style = TextStyle::NORMAL;
        assert_approx_eq!(f32, table.line_width("a", style), 7.0);
        assert_approx_eq!(f32, table.line_width("i", style), 7.0 * 0.45);
        assert_approx_eq!(f32, table.line_width("W", style), 7.0 * 1.45);
        assert_approx_eq!(f32, table.line_width(" ", style), 3.5);
        assert_approx_eq!(f32, table.line_width("A", style), 7.0 * 1.2);
    }

    #[test]
    fn test_width_table_scales_with_font_size() {
        let table = WidthTable::new();
        let small = table.line_width("Payments", TextStyle::new(12.0, false));
        let large = table.line_width("Payments", TextStyle::new(24.0, false));
        assert_approx_eq!(f32, large, small * 2.0, epsilon = 0.001);
    }

    #[test]
    fn test_width_table_bold_is_wider() {
        let table = WidthTable::new();
        let regular = table.line_width("Title", TextStyle::new(14.0, false));
        let bold = table.line_width("Title", TextStyle::TITLE);
        assert!(bold > regular);
    }

    #[test]
    fn test_wrap_text_empty() {
        let wrapped = wrap_text(&WidthTable::new(), "   ", TextStyle::NORMAL, 100.0);
        assert!(wrapped.lines().is_empty());
        assert_approx_eq!(f32, wrapped.width(), 0.0);
        assert_approx_eq!(f32, wrapped.height(), 0.0);
    }

    #[test]
    fn test_wrap_text_breaks_lines() {
        let table = WidthTable::new();
        // Each "aaaa" is 28px, a space is 3.5px.
        let wrapped = wrap_text(&table, "aaaa aaaa aaaa", TextStyle::NORMAL, 60.0);
        assert_eq!(wrapped.lines(), ["aaaa aaaa", "aaaa"]);
        assert_approx_eq!(f32, wrapped.width(), 59.5);
        assert_approx_eq!(f32, wrapped.height(), 2.0 * 12.0 * 1.2);
    }

    #[test]
    fn test_wrap_text_long_word_keeps_own_line() {
        let table = WidthTable::new();
        let wrapped = wrap_text(&table, "a Supercalifragilistic b", TextStyle::NORMAL, 30.0);
        assert_eq!(wrapped.lines().len(), 3);
        assert!(wrapped.width() > 30.0);
    }

    #[test]
    fn test_measure_node_clamps_to_minimum() {
        let size = measure_node(
            &WidthTable::new(),
            NodeText {
                title: "A",
                technology: None,
                description: None,
            },
            ElementKind::Component,
        );
        assert_eq!(size, ElementKind::Component.min_size());
    }

    #[test]
    fn test_measure_node_clamps_to_maximum() {
        let title = "W".repeat(200);
        let size = measure_node(
            &WidthTable::new(),
            NodeText {
                title: &title,
                technology: None,
                description: None,
            },
            ElementKind::System,
        );
        assert_approx_eq!(f32, size.width(), 500.0);
    }

    #[test]
    fn test_measure_node_description_adds_height() {
        let table = WidthTable::new();
        let description = "Handles every incoming payment request, validates card details, \
                           talks to the acquiring bank and records the outcome for auditing. "
            .repeat(3);
        let plain = measure_node(
            &table,
            NodeText {
                title: "Payments",
                technology: Some("Rust"),
                description: None,
            },
            ElementKind::Container,
        );
        let described = measure_node(
            &table,
            NodeText {
                title: "Payments",
                technology: Some("Rust"),
                description: Some(&description),
            },
            ElementKind::Container,
        );
        assert!(described.height() > plain.height());
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn words_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-zA-Z]{1,12}", 0..30).prop_map(|words| words.join(" "))
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Every wrapped line fits, unless it is a single unbreakable word.
    fn check_wrapped_lines_fit(text: &str, max_width: f32) -> Result<(), TestCaseError> {
        let table = WidthTable::new();
        let wrapped = wrap_text(&table, text, TextStyle::NORMAL, max_width);
        for line in wrapped.lines() {
            let width = table.line_width(line, TextStyle::NORMAL);
            prop_assert!(
                width <= max_width || !line.contains(' '),
                "line `{line}` is {width}px wide, limit {max_width}"
            );
        }
        Ok(())
    }

    /// Wrapping never loses or reorders words.
    fn check_wrap_preserves_words(text: &str, max_width: f32) -> Result<(), TestCaseError> {
        let wrapped = wrap_text(&WidthTable::new(), text, TextStyle::NORMAL, max_width);
        let rejoined = wrapped.lines().join(" ");
        let original: Vec<&str> = text.split_whitespace().collect();
        let after: Vec<&str> = rejoined.split_whitespace().collect();
        prop_assert_eq!(original, after);
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn wrapped_lines_fit(text in words_strategy(), max_width in 20.0f32..400.0) {
            check_wrapped_lines_fit(&text, max_width)?;
        }

        #[test]
        fn wrap_preserves_words(text in words_strategy(), max_width in 20.0f32..400.0) {
            check_wrap_preserves_words(&text, max_width)?;
        }
    }
}
