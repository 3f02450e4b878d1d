//! Native-script → Latin transliteration keys.
//!
//! A key is the lowercase concatenation of each character's syllable with no
//! separators, so `北京` becomes `beijing`. Keys are only ever compared for
//! equality, never displayed.

use pinyin::ToPinyin;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Turns a native-script name into its transliteration key.
///
/// `None` means some character has no transliteration; such a name never
/// matches anything.
pub trait Romanizer: Send + Sync {
    fn romanize(&self, native: &str) -> Option<String>;
}

/// True if `native` romanizes to exactly `free_text`, case-insensitively.
pub fn matches(romanizer: &dyn Romanizer, native: &str, free_text: &str) -> bool {
    match romanizer.romanize(native) {
        Some(key) => key == free_text.to_lowercase(),
        None => false,
    }
}

const DEFAULT_PHRASES: &[(&str, &str)] = &[
    ("重庆", "chongqing"),
    ("长沙", "changsha"),
    ("长春", "changchun"),
    ("长治", "changzhi"),
    ("长宁", "changning"),
    ("厦门", "xiamen"),
    ("陕西", "shaanxi"),
    ("蚌埠", "bengbu"),
    ("六安", "luan"),
    ("东莞", "dongguan"),
    ("乐山", "leshan"),
    ("朝阳", "chaoyang"),
    ("西藏", "xizang"),
];

/// Whole-phrase keys that take precedence over the per-character scheme.
///
/// Place names with polyphonic characters (`重` in `重庆`) need a reading the
/// single-character table cannot pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhraseOverrides(BTreeMap<String, String>);

impl Default for PhraseOverrides {
    fn default() -> Self {
        Self(
            DEFAULT_PHRASES
                .iter()
                .map(|(native, key)| (native.to_string(), key.to_string()))
                .collect(),
        )
    }
}

impl PhraseOverrides {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, native: impl Into<String>, key: impl Into<String>) {
        self.0.insert(native.into(), key.into().to_lowercase());
    }

    /// Longest phrase that `text` starts with.
    fn longest_prefix<'a>(&'a self, text: &str) -> Option<(&'a str, &'a str)> {
        self.0
            .iter()
            .filter(|(phrase, _)| !phrase.is_empty() && text.starts_with(phrase.as_str()))
            .max_by_key(|(phrase, _)| phrase.len())
            .map(|(phrase, key)| (phrase.as_str(), key.as_str()))
    }
}

/// Han characters take their most common Mandarin reading in plain pinyin
/// (no tone marks), as `lazy_pinyin` style romanizers do. Any other
/// character falls back to `deunicode`.
#[derive(Debug, Clone, Default)]
pub struct PinyinRomanizer {
    phrases: PhraseOverrides,
}

impl PinyinRomanizer {
    pub fn new(phrases: PhraseOverrides) -> Self {
        Self { phrases }
    }
}

fn syllable(c: char) -> Option<&'static str> {
    match c.to_pinyin() {
        Some(p) => Some(p.plain()),
        None => deunicode::deunicode_char(c),
    }
}

impl Romanizer for PinyinRomanizer {
    fn romanize(&self, native: &str) -> Option<String> {
        let mut key = String::with_capacity(native.len() * 2);
        let mut rest = native;

        while !rest.is_empty() {
            if let Some((phrase, roman)) = self.phrases.longest_prefix(rest) {
                key.push_str(roman);
                rest = &rest[phrase.len()..];
                continue;
            }

            let mut chars = rest.chars();
            let c = chars.next()?;
            rest = chars.as_str();
            if c.is_whitespace() {
                continue;
            }

            key.extend(
                syllable(c)?
                    .chars()
                    .filter(|ch| ch.is_ascii_alphanumeric())
                    .map(|ch| ch.to_ascii_lowercase()),
            );
        }

        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static [(&'static str, &'static str)]);

    impl Romanizer for Fixed {
        fn romanize(&self, native: &str) -> Option<String> {
            self.0.iter().find(|(n, _)| *n == native).map(|(_, k)| k.to_string())
        }
    }

    #[test]
    fn test_pinyin_basic_key() {
        let r = PinyinRomanizer::default();
        assert_eq!(r.romanize("北京").as_deref(), Some("beijing"));
        assert_eq!(r.romanize("上海").as_deref(), Some("shanghai"));
    }

    #[test]
    fn test_every_province_short_name() {
        let r = PinyinRomanizer::default();
        let expected = [
            ("北京", "beijing"), ("天津", "tianjin"), ("河北", "hebei"), ("山西", "shanxi"),
            ("内蒙古", "neimenggu"), ("辽宁", "liaoning"), ("吉林", "jilin"),
            ("黑龙江", "heilongjiang"), ("上海", "shanghai"), ("江苏", "jiangsu"),
            ("浙江", "zhejiang"), ("安徽", "anhui"), ("福建", "fujian"), ("江西", "jiangxi"),
            ("山东", "shandong"), ("河南", "henan"), ("湖北", "hubei"), ("湖南", "hunan"),
            ("广东", "guangdong"), ("广西", "guangxi"), ("海南", "hainan"),
            ("重庆", "chongqing"), ("四川", "sichuan"), ("贵州", "guizhou"),
            ("云南", "yunnan"), ("西藏", "xizang"), ("陕西", "shaanxi"), ("甘肃", "gansu"),
            ("青海", "qinghai"), ("宁夏", "ningxia"), ("新疆", "xinjiang"),
            ("台湾", "taiwan"), ("香港", "xianggang"), ("澳门", "aomen"),
        ];
        for (native, key) in expected {
            assert_eq!(r.romanize(native).as_deref(), Some(key), "{}", native);
        }
    }

    #[test]
    fn test_common_city_names() {
        let r = PinyinRomanizer::default();
        for (native, key) in [
            ("广州", "guangzhou"),
            ("武汉", "wuhan"),
            ("深圳", "shenzhen"),
            ("杨浦区", "yangpuqu"),
            ("厦门", "xiamen"),
        ] {
            assert_eq!(r.romanize(native).as_deref(), Some(key), "{}", native);
        }
    }

    #[test]
    fn test_non_han_falls_back() {
        let r = PinyinRomanizer::default();
        assert_eq!(r.romanize("Ａ区").as_deref(), Some("aqu"));
    }

    #[test]
    fn test_phrase_override_wins() {
        let r = PinyinRomanizer::default();
        assert_eq!(r.romanize("重庆").as_deref(), Some("chongqing"));
        assert_eq!(r.romanize("厦门").as_deref(), Some("xiamen"));
    }

    #[test]
    fn test_longest_phrase_selected() {
        let mut phrases = PhraseOverrides::empty();
        phrases.insert("北", "x");
        phrases.insert("北京", "Peking");
        let r = PinyinRomanizer::new(phrases);
        assert_eq!(r.romanize("北京").as_deref(), Some("peking"));
    }

    #[test]
    fn test_empty_name_has_no_key() {
        let r = PinyinRomanizer::default();
        assert_eq!(r.romanize(""), None);
        assert_eq!(r.romanize("  "), None);
    }

    #[test]
    fn test_matches_is_exact_and_case_insensitive() {
        let r = PinyinRomanizer::default();
        assert!(matches(&r, "北京", "Beijing"));
        assert!(matches(&r, "北京", "BEIJING"));
        assert!(!matches(&r, "北京", "Beijing Shi"));
        assert!(!matches(&r, "北京", "bei"));
    }

    #[test]
    fn test_untransliterable_never_matches() {
        let r = Fixed(&[("甲", "jia")]);
        assert!(matches(&r, "甲", "Jia"));
        assert!(!matches(&r, "乙", ""));
        assert!(!matches(&r, "乙", "yi"));
    }
}
