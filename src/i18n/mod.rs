use dashmap::DashMap;
use std::sync::Arc;

/// Message catalog for a single locale.
///
/// Messages are looked up by their id, which is the English text. Missing
/// entries render as the id itself, like `gettext`.
///
/// # Example
/// ```
/// use st1_axum::i18n::Catalog;
///
/// let catalog = Catalog::new();
/// catalog.insert("Access Denied", "Accès refusé");
///
/// assert_eq!(catalog.gettext("Access Denied"), "Accès refusé");
/// assert_eq!(catalog.gettext("Bad Input"), "Bad Input");
/// ```
#[derive(Clone, Default, Debug)]
pub struct Catalog {
    messages: Arc<DashMap<String, String>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let catalog = Self::new();
        for (msgid, translation) in pairs {
            catalog.insert(msgid, translation);
        }
        catalog
    }

    pub fn insert(&self, msgid: impl Into<String>, translation: impl Into<String>) {
        self.messages.insert(msgid.into(), translation.into());
    }

    pub fn gettext(&self, msgid: &str) -> String {
        self.messages
            .get(msgid)
            .map(|v| v.clone())
            .unwrap_or_else(|| msgid.to_string())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gettext_falls_back_to_msgid() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.gettext("Missing JSON."), "Missing JSON.");
    }

    #[test]
    fn test_from_pairs() {
        let catalog = Catalog::from_pairs([
            ("Access Denied", "Zugriff verweigert"),
            ("Bad Input", "Ungültige Eingabe"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.gettext("Bad Input"), "Ungültige Eingabe");
    }

    #[test]
    fn test_clones_share_entries() {
        let catalog = Catalog::new();
        let shared = catalog.clone();
        catalog.insert("Invalid JSON syntax.", "JSON invalide.");
        assert_eq!(shared.gettext("Invalid JSON syntax."), "JSON invalide.");
    }
}
