use crate::types::ReuseTitle;
use anyhow::{Context as _, Result, anyhow};
use rust_embed::RustEmbed;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(RustEmbed)]
#[folder = "assets/i18n"]
#[include = "*.json"]
struct Locales;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    ZhCn,
    EnUs,
}

impl Language {
    pub fn detect() -> Self {
        if let Some(locale_tag) = sys_locale::get_locale() {
            return Self::from_locale_tag(&locale_tag);
        }

        Self::EnUs
    }

    fn from_locale_tag(raw: &str) -> Self {
        let tag = raw.trim().to_ascii_lowercase();
        if tag.is_empty() {
            return Self::EnUs;
        }

        let is_chinese = tag.starts_with("zh")
            || tag == "cn"
            || tag.starts_with("cn_")
            || tag.starts_with("cn-")
            || tag.contains("_zh")
            || tag.contains("-zh");
        if is_chinese {
            return Self::ZhCn;
        }

        Self::EnUs
    }

    fn file_name(self) -> &'static str {
        match self {
            Self::ZhCn => "zh_CN.json",
            Self::EnUs => "en_US.json",
        }
    }
}

/// Optional translation collaborator.
pub trait Translator {
    /// Translate `key`. Unknown keys come back unchanged.
    fn fanyi(&self, key: &str) -> String;

    /// Returns true once per language switch since the last call.
    fn take_change(&mut self) -> bool {
        false
    }
}

impl<T: Translator> Translator for Rc<RefCell<T>> {
    fn fanyi(&self, key: &str) -> String {
        self.borrow().fanyi(key)
    }

    fn take_change(&mut self) -> bool {
        self.borrow_mut().take_change()
    }
}

/// Resolves the display text of a tab.
///
/// Without a translator the raw text is shown, even when a key is set.
#[derive(Clone, Copy)]
pub struct TitleResolver<'a> {
    translator: Option<&'a dyn Translator>,
}

impl<'a> TitleResolver<'a> {
    pub fn new(translator: Option<&'a dyn Translator>) -> Self {
        Self { translator }
    }

    pub fn resolve(&self, title: &ReuseTitle) -> String {
        match (title.i18n.as_deref(), self.translator) {
            (Some(key), Some(translator)) => translator.fanyi(key),
            _ => title.text.clone(),
        }
    }
}

/// Flat key/value locale catalog shipped under `assets/i18n`.
#[derive(Debug, Clone)]
pub struct Catalog {
    language: Language,
    messages: HashMap<String, String>,
    changed: bool,
}

impl Catalog {
    /// Load the embedded catalog for `lang`, falling back to English.
    pub fn load(lang: Language) -> Result<Self> {
        match Self::load_embedded(lang) {
            Ok(catalog) => Ok(catalog),
            Err(primary_err) => {
                crate::debug_log!("[i18n] failed to load {}: {:#}", lang.file_name(), primary_err);
                if lang == Language::EnUs {
                    return Err(primary_err);
                }

                let catalog = Self::load_embedded(Language::EnUs).with_context(|| {
                    format!(
                        "failed to load i18n files {} ({:#}) and {}",
                        lang.file_name(),
                        primary_err,
                        Language::EnUs.file_name()
                    )
                })?;
                crate::debug_log!(
                    "[i18n] fallback to {} after {} failed",
                    Language::EnUs.file_name(),
                    lang.file_name()
                );
                Ok(catalog)
            }
        }
    }

    pub fn from_json(lang: Language, raw: &str) -> Result<Self> {
        let messages = serde_json::from_str::<HashMap<String, String>>(raw)
            .with_context(|| format!("{} parse failed", lang.file_name()))?;
        Ok(Self {
            language: lang,
            messages,
            changed: false,
        })
    }

    fn load_embedded(lang: Language) -> Result<Self> {
        let file = Locales::get(lang.file_name())
            .ok_or_else(|| anyhow!("{} not embedded", lang.file_name()))?;
        let raw = std::str::from_utf8(file.data.as_ref())
            .with_context(|| format!("{} is not valid utf-8", lang.file_name()))?;
        crate::debug_log!("[i18n] loading locale {}", lang.file_name());
        Self::from_json(lang, raw)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Switch to another embedded locale and flag a translation change.
    pub fn set_language(&mut self, lang: Language) -> Result<()> {
        if lang == self.language {
            return Ok(());
        }

        let next = Self::load(lang)?;
        self.language = next.language;
        self.messages = next.messages;
        self.changed = true;
        Ok(())
    }
}

impl Translator for Catalog {
    fn fanyi(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn take_change(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}
