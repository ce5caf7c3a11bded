// Vikey Output Layer - Accessibility
// Reads and writes the focused text control directly

/// Value and caret of the focused text control. Offsets are in UTF-16
/// code units, as the accessibility API reports them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FocusedText {
    pub value: String,
    pub caret: usize,
    pub selection_len: usize,
}

impl FocusedText {
    pub fn new(value: &str, caret: usize) -> Self {
        Self {
            value: value.to_string(),
            caret,
            selection_len: 0,
        }
    }
}

/// Apply an edit at the caret: remove `backspace_count` characters before
/// it, insert `text`, and leave the caret after the insertion.
///
/// Returns None when the control state does not fit the edit: a live
/// selection, a caret outside the value or inside a surrogate pair, or
/// fewer characters before the caret than must be removed.
pub fn splice(current: &FocusedText, backspace_count: usize, text: &str) -> Option<FocusedText> {
    if current.selection_len > 0 {
        return None;
    }
    let units: Vec<u16> = current.value.encode_utf16().collect();
    if current.caret > units.len() {
        return None;
    }
    let before = String::from_utf16(&units[..current.caret]).ok()?;
    let after = String::from_utf16(&units[current.caret..]).ok()?;

    let kept = before.chars().count().checked_sub(backspace_count)?;
    let mut value: String = before.chars().take(kept).collect();
    value.push_str(text);
    let caret = value.encode_utf16().count();
    value.push_str(&after);

    Some(FocusedText {
        value,
        caret,
        selection_len: 0,
    })
}

/// Access to the focused element. Every query may fail, for missing
/// permission or a control that exposes no value.
pub trait AccessibilityProbe: Send + Sync {
    /// Whether non-whitespace text follows the caret. None when unknown.
    fn has_text_after_cursor(&self) -> Option<bool>;

    fn focused_text(&self) -> Option<FocusedText>;

    /// Write value and caret back. Returns false when the control
    /// rejected the change.
    fn set_focused_text(&self, text: &FocusedText) -> bool;
}

/// Probe for when accessibility is unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAccessibility;

impl AccessibilityProbe for NoAccessibility {
    fn has_text_after_cursor(&self) -> Option<bool> {
        None
    }

    fn focused_text(&self) -> Option<FocusedText> {
        None
    }

    fn set_focused_text(&self, _text: &FocusedText) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splice_replaces_before_caret() {
        let edited = splice(&FocusedText::new("xin vieet", 9), 3, "ệt").unwrap();
        assert_eq!(edited.value, "xin việt");
        assert_eq!(edited.caret, 8);
    }

    #[test]
    fn test_splice_keeps_text_after_caret() {
        let edited = splice(&FocusedText::new("aa end", 2), 2, "â").unwrap();
        assert_eq!(edited.value, "â end");
        assert_eq!(edited.caret, 1);
    }

    #[test]
    fn test_splice_counts_characters_not_units() {
        // 😀 is two UTF-16 units
        let edited = splice(&FocusedText::new("😀a", 3), 1, "á").unwrap();
        assert_eq!(edited.value, "😀á");
        assert_eq!(edited.caret, 3);
    }

    #[test]
    fn test_splice_rejects_bad_state() {
        assert!(splice(&FocusedText::new("ab", 5), 0, "x").is_none());
        assert!(splice(&FocusedText::new("ab", 2), 3, "x").is_none());
        assert!(splice(&FocusedText::new("😀", 1), 0, "x").is_none());

        let mut selected = FocusedText::new("abc", 1);
        selected.selection_len = 1;
        assert!(splice(&selected, 0, "x").is_none());
    }

    #[test]
    fn test_no_accessibility_is_unknown() {
        let probe = NoAccessibility;
        assert_eq!(probe.has_text_after_cursor(), None);
        assert!(probe.focused_text().is_none());
        assert!(!probe.set_focused_text(&FocusedText::default()));
    }
}
