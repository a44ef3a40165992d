use crate::models::{Locale, Reason};

/// Render the human-readable justification for a recommendation
///
/// Only the reason payload and the locale are used; the POI itself is never
/// consulted, so the cited category is always the one that caused the match.
pub fn reason_text(reason: &Reason, locale: Locale) -> String {
    match (locale, reason) {
        (Locale::En, Reason::Global) => "Highly rated place near you".to_string(),
        (Locale::En, Reason::SelfLiked { category }) => format!("Because you like {}", category),
        (Locale::En, Reason::Social { friend, category }) => format!("Because {} likes {}", friend, category),
        (Locale::Es, Reason::Global) => "Lugar bien calificado cerca de ti".to_string(),
        (Locale::Es, Reason::SelfLiked { category }) => format!("Porque te gusta {}", category),
        (Locale::Es, Reason::Social { friend, category }) => format!("Porque a {} le gusta {}", friend, category),
    }
}
