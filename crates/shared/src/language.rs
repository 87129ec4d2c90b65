//! Languages offered by the language selector.
//!
//! The selection is display-only: nothing downstream reads it, and the
//! assistant already answers in the language of the question.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

pub const LANGUAGES: [Language; 5] = [
    Language { code: "en", name: "English", flag: "🇬🇧" },
    Language { code: "hi", name: "हिंदी", flag: "🇮🇳" },
    Language { code: "pa", name: "ਪੰਜਾਬੀ", flag: "🇮🇳" },
    Language { code: "bn", name: "বাংলা", flag: "🇧🇩" },
    Language { code: "te", name: "తెలుగు", flag: "🇮🇳" },
];

pub fn find(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// Dropdown state behind the selector widget.
#[derive(Debug, Clone)]
pub struct LanguageSelection {
    selected: &'static Language,
    is_open: bool,
}

impl Default for LanguageSelection {
    fn default() -> Self {
        Self {
            selected: &LANGUAGES[0],
            is_open: false,
        }
    }
}

impl LanguageSelection {
    /// Start from a saved code, falling back to English for unknown codes.
    pub fn from_code(code: &str) -> Self {
        Self {
            selected: find(code).unwrap_or(&LANGUAGES[0]),
            is_open: false,
        }
    }

    pub fn selected(&self) -> &'static Language {
        self.selected
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Close the dropdown without changing the selection.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Select `code`, close the dropdown and hand the code to `on_change`.
    ///
    /// Unknown codes leave the selection untouched and return `false`.
    pub fn select(&mut self, code: &str, on_change: impl FnOnce(&str)) -> bool {
        let Some(lang) = find(code) else {
            return false;
        };
        self.selected = lang;
        self.is_open = false;
        on_change(lang.code);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_english() {
        let sel = LanguageSelection::default();
        assert_eq!(sel.selected().code, "en");
        assert!(!sel.is_open());
    }

    #[test]
    fn test_select_emits_code_and_closes() {
        let mut sel = LanguageSelection::default();
        sel.toggle();
        let mut emitted = None;
        assert!(sel.select("pa", |code| emitted = Some(code.to_string())));
        assert_eq!(emitted.as_deref(), Some("pa"));
        assert_eq!(sel.selected().name, "ਪੰਜਾਬੀ");
        assert!(!sel.is_open());
    }

    #[test]
    fn test_close_keeps_selection() {
        let mut sel = LanguageSelection::from_code("te");
        sel.toggle();
        sel.close();
        assert!(!sel.is_open());
        assert_eq!(sel.selected().code, "te");
    }

    #[test]
    fn test_unknown_code_is_ignored() {
        let mut sel = LanguageSelection::from_code("hi");
        let mut called = false;
        assert!(!sel.select("fr", |_| called = true));
        assert!(!called);
        assert_eq!(sel.selected().code, "hi");
        assert_eq!(LanguageSelection::from_code("xx").selected().code, "en");
    }
}
