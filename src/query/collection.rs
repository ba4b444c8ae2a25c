//! Collection selection
//!
//! Deterministic priority list over keyword groups; total over all inputs
//! with `Clients` as the default.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Clients,
    Preferences,
    Contacts,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Clients => "clients",
            Collection::Preferences => "client_preferences",
            Collection::Contacts => "client_contacts",
        }
    }
}

/// Keyword groups in priority order; the first group with a hit decides.
const COLLECTION_RULES: &[(&[&str], Collection)] = &[
    (
        &["client", "customer", "profile", "demographic"],
        Collection::Clients,
    ),
    (
        &["preference", "risk", "investment"],
        Collection::Preferences,
    ),
    (
        &["contact", "address", "phone", "email"],
        Collection::Contacts,
    ),
];

/// Map a free-text phrase to exactly one collection.
pub fn select(phrase: &str) -> Collection {
    let query = phrase.to_lowercase();
    for (keywords, collection) in COLLECTION_RULES {
        if keywords.iter().any(|kw| query.contains(kw)) {
            return *collection;
        }
    }
    Collection::Clients
}
