/// Locales branch texts are translated into.
pub const SUPPORTED_LOCALES: [&str; 2] = ["ar", "en"];

/// Picks the response locale from an `Accept-Language` header.
///
/// Only the primary language is considered (`ar-SA` -> `ar`). Unsupported or
/// absent values fall back to `default_locale`.
pub fn resolve_locale(accept_language: Option<&str>, default_locale: &str) -> String {
    let Some(primary) = accept_language.and_then(|header| header.get(..2)) else {
        return default_locale.to_string();
    };
    let primary = primary.to_lowercase();
    if SUPPORTED_LOCALES.contains(&primary.as_str()) {
        return primary;
    }
    default_locale.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_primary_language() {
        assert_eq!(resolve_locale(Some("ar-SA"), "en"), "ar");
        assert_eq!(resolve_locale(Some("EN-us,en;q=0.9"), "ar"), "en");
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(resolve_locale(None, "en"), "en");
        assert_eq!(resolve_locale(Some("fr-FR"), "en"), "en");
        assert_eq!(resolve_locale(Some("a"), "ar"), "ar");
        assert_eq!(resolve_locale(Some("é"), "en"), "en");
    }
}
