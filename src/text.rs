use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Script {
    #[default]
    Latin,
    NonLatin,
}

impl Script {
    pub fn from_lang_code(code: &str) -> Self {
        let lower = code.trim().to_lowercase();
        let base = lower.split(['-', '_']).next().unwrap_or_default();
        match base {
            "zh" | "zho" | "chi" | "ja" | "jpn" | "ko" | "kor" | "th" | "tha" | "lo" | "lao"
            | "my" | "mya" | "km" | "khm" => Script::NonLatin,
            _ => Script::Latin,
        }
    }

    pub fn strips_whitespace(self) -> bool {
        matches!(self, Script::NonLatin)
    }
}

pub fn normalize(text: &str, script: Script) -> String {
    let trimmed = text.trim();
    if script.strips_whitespace() {
        trimmed.chars().filter(|ch| !ch.is_whitespace()).collect()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn is_latin_text(value: &str) -> bool {
    value
        .chars()
        .filter(|ch| ch.is_alphabetic())
        .all(|ch| (ch as u32) < 0x0250)
}

pub(crate) fn is_title_case(value: &str) -> bool {
    let mut saw_cased = false;
    for word in value.split_whitespace() {
        let mut prev_cased = false;
        for ch in word.chars() {
            if ch.is_uppercase() {
                if prev_cased {
                    return false;
                }
                prev_cased = true;
                saw_cased = true;
            } else if ch.is_lowercase() {
                if !prev_cased {
                    return false;
                }
                prev_cased = true;
                saw_cased = true;
            } else {
                prev_cased = false;
            }
        }
    }
    saw_cased
}

pub(crate) fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
