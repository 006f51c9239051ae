use regex::Regex;
use std::sync::LazyLock;

static CITY_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:город|city)\s*[:\s]\s*([a-zа-яё\s-]+)")
        .expect("city label pattern compiles")
});

const STOP_CHARS: [char; 4] = ['\n', '\r', ',', ';'];

/// Finds the first `Город: ...` / `City: ...` label in free text and
/// returns the lower-cased city name that follows it.
pub fn extract_city(text: &str) -> Option<String> {
    let captures = CITY_LABEL.captures(text)?;
    let raw = captures.get(1)?.as_str();
    let head = raw.split(&STOP_CHARS[..]).next().unwrap_or_default();
    let name = head.trim_matches(|ch: char| ch.is_whitespace() || ch == '-');
    if name.is_empty() {
        return None;
    }
    Some(name.to_lowercase())
}

/// Joining particles that stay lower-case inside compound names.
const PARTICLES: [&str; 4] = ["на", "де", "on", "de"];

/// Upper-cases the first letter of every word, splitting on spaces and
/// hyphens: `нижний новгород` becomes `Нижний Новгород`. Particles after
/// the first word keep their case, so `ростов-на-дону` becomes
/// `Ростов-на-Дону`.
pub fn title_case_city(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut word = String::new();
    let mut first = true;
    for ch in name.trim().chars() {
        if ch.is_whitespace() || ch == '-' {
            if !word.is_empty() {
                push_word(&mut out, &word, first);
                first = false;
                word.clear();
            }
            out.push(ch);
        } else {
            word.push(ch);
        }
    }
    if !word.is_empty() {
        push_word(&mut out, &word, first);
    }
    out
}

fn push_word(out: &mut String, word: &str, first: bool) {
    if !first && PARTICLES.contains(&word.to_lowercase().as_str()) {
        out.push_str(word);
        return;
    }
    let mut chars = word.chars();
    if let Some(head) = chars.next() {
        out.extend(head.to_uppercase());
        out.push_str(chars.as_str());
    }
}
