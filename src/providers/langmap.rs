// src/providers/langmap.rs
// Language-code mapping between internal slugs and backend dialects.

/// Map an internal language slug to the code Google Translate expects.
pub fn google_code(lang: &str) -> String {
    match lang {
        "en" | "en-gb" | "en-us" => "en".to_string(),
        "pt-br" => "pt".to_string(),
        "zh" | "zh-cn" => "zh-CN".to_string(),
        "zh-tw" => "zh-TW".to_string(),
        "nb" | "nn" => "no".to_string(),
        other => other
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .take(2)
            .collect::<String>()
            .to_lowercase(),
    }
}

/// Map an internal language slug to a DeepL target_lang code.
/// DeepL requires regional variants for some languages.
pub fn deepl_target(lang: &str) -> String {
    match lang {
        "en" | "en-gb" => "EN-GB".to_string(),
        "en-us" => "EN-US".to_string(),
        "pt" => "PT-PT".to_string(),
        "pt-br" => "PT-BR".to_string(),
        "de" => "DE".to_string(),
        "fr" => "FR".to_string(),
        "pl" => "PL".to_string(),
        "nl" => "NL".to_string(),
        "it" => "IT".to_string(),
        "es" => "ES".to_string(),
        other => other.to_uppercase(),
    }
}

/// Map an internal language slug to a DeepL source_lang code
/// (sources never carry regional variants).
pub fn deepl_source(lang: &str) -> String {
    match lang {
        "en" | "en-gb" | "en-us" => "EN".to_string(),
        "pt" | "pt-br" => "PT".to_string(),
        other => other
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .take(2)
            .collect::<String>()
            .to_uppercase(),
    }
}
