// Vikey Transform - Macros
// Abbreviation table expanded at word break

use indexmap::IndexMap;

/// Ordered abbreviation → expansion table.
///
/// Abbreviations are matched case-insensitively against the keys typed
/// for the current word. With auto-caps, a capitalised abbreviation
/// (`Vn`) capitalises the expansion and an all upper-case one (`VN`)
/// upper-cases it.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    entries: IndexMap<String, String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, abbreviation: &str, expansion: &str) {
        let key = abbreviation.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        self.entries.insert(key, expansion.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Expansion for an exactly matching abbreviation
    pub fn lookup(&self, typed: &str, auto_caps: bool) -> Option<String> {
        let expansion = self.entries.get(&typed.to_lowercase())?;
        if !auto_caps {
            return Some(expansion.clone());
        }
        Some(apply_caps(typed, expansion))
    }

    /// Whether some abbreviation is longer than `typed` and starts with it
    pub fn could_extend(&self, typed: &str) -> bool {
        if typed.is_empty() {
            return false;
        }
        let typed = typed.to_lowercase();
        self.entries
            .keys()
            .any(|k| k.len() > typed.len() && k.starts_with(&typed))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for MacroTable {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (abbreviation, expansion) in iter {
            table.insert(abbreviation, expansion);
        }
        table
    }
}

fn apply_caps(typed: &str, expansion: &str) -> String {
    let letters: Vec<char> = typed.chars().filter(|c| c.is_alphabetic()).collect();
    let Some(first) = letters.first() else {
        return expansion.to_string();
    };
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return expansion.to_uppercase();
    }
    if first.is_uppercase() {
        let mut chars = expansion.chars();
        return match chars.next() {
            Some(c) => c.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    expansion.to_string()
}

/// Raw keys typed since the last word break, matched against the table
#[derive(Debug, Clone, Default)]
pub struct MacroBuffer {
    keys: String,
}

impl MacroBuffer {
    pub fn add_key(&mut self, c: char) {
        self.keys.push(c);
    }

    /// Re-sync after a backspace with the keys still on screen
    pub fn update_on_backspace(&mut self, remaining: &str) {
        self.keys.clear();
        self.keys.push_str(remaining);
    }

    pub fn as_str(&self) -> &str {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MacroTable {
        [("vn", "Việt Nam"), ("ks", "khách sạn"), ("a.b", "alpha beta")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let t = table();
        assert_eq!(t.lookup("ks", false).as_deref(), Some("khách sạn"));
        assert_eq!(t.lookup("KS", false).as_deref(), Some("khách sạn"));
        assert_eq!(t.lookup("k", false), None);
    }

    #[test]
    fn test_auto_caps() {
        let t = table();
        assert_eq!(t.lookup("Ks", true).as_deref(), Some("Khách sạn"));
        assert_eq!(t.lookup("KS", true).as_deref(), Some("KHÁCH SẠN"));
        assert_eq!(t.lookup("ks", true).as_deref(), Some("khách sạn"));
    }

    #[test]
    fn test_could_extend() {
        let t = table();
        assert!(t.could_extend("a"));
        assert!(t.could_extend("a."));
        assert!(!t.could_extend("a.b"));
        assert!(!t.could_extend(""));
    }

    #[test]
    fn test_insertion_order_kept() {
        let t = table();
        let keys: Vec<&str> = t.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["vn", "ks", "a.b"]);
    }

    #[test]
    fn test_buffer_resync() {
        let mut buffer = MacroBuffer::default();
        buffer.add_key('k');
        buffer.add_key('s');
        buffer.update_on_backspace("k");
        assert_eq!(buffer.as_str(), "k");
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
