use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

static RUSSIAN_STOP_WORDS: OnceLock<HashSet<String>> = OnceLock::new();

fn get_russian_stop_words() -> &'static HashSet<String> {
    RUSSIAN_STOP_WORDS.get_or_init(|| {
        stop_words::get(stop_words::LANGUAGE::Russian)
            .into_iter()
            .map(|x| x.to_string().to_lowercase())
            .collect()
    })
}

/// Lemmas that are frequent on travel pages but say nothing about the trip
/// itself: calendar words, site chrome, generic business vocabulary.
pub const CURATED_EXCLUSIONS: &[&str] = &[
    "личный", "кабинет", "тур", "согласие", "вход", "офис", "агентство", "компания", "ул",
    "поиск", "набор", "реестр", "вариант", "зима", "день", "январь", "декабрь", "дата", "год",
    "средний", "зимний", "выше", "высокий", "область", "край", "регион", "проживание", "новый",
    "каникулы", "вид", "сложность", "лето", "весна", "осень", "человек", "весь", "отдых",
    "нужно", "россия", "среднее", "тот", "который", "рубль", "руб", "ввод", "неверный",
    "нагрузка", "февраль", "март", "серия", "дед", "ноябрь", "апрель", "этот", "данный",
    "статья", "страница", "другой", "свой", "русский", "дек", "апр", "км", "ной", "наш",
];

/// Lowercased grammatical words dropped before morphology.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn russian() -> Self {
        Self {
            words: get_russian_stop_words().clone(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words
            .extend(extra.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        self
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Domain-irrelevance set, matched against lemmas.
#[derive(Debug, Clone, Default)]
pub struct DomainExclusions {
    lemmas: HashSet<String>,
}

impl DomainExclusions {
    pub fn curated() -> Self {
        Self::empty().with_extra(CURATED_EXCLUSIONS)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.lemmas.extend(
            extra
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
        self
    }

    /// Reads one lemma per line; blank lines and `#` comments are skipped.
    pub fn with_file(self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read exclusions from {}", path.display()))?;
        Ok(self.with_extra(
            content
                .lines()
                .filter(|line| !line.trim_start().starts_with('#')),
        ))
    }

    pub fn contains(&self, lemma: &str) -> bool {
        self.lemmas.contains(lemma)
    }

    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_russian_stop_words_cover_prepositions() {
        let stop_words = StopWords::russian();
        assert!(!stop_words.is_empty());
        assert!(stop_words.contains("в"));
        assert!(stop_words.contains("и"));
        assert!(stop_words.contains("не"));
    }

    #[test]
    fn test_russian_stop_words_are_function_words_only() {
        let stop_words = StopWords::russian();
        assert!(stop_words.len() < 200);
        for word in ["москва", "город", "год", "место", "работа", "большой", "хороший", "новый"] {
            assert!(!stop_words.contains(word), "{word} is a content word");
        }
    }

    #[test]
    fn test_stop_words_extra_are_lowercased() {
        let stop_words = StopWords::empty().with_extra(["Цена", " ТАКЖЕ "]);
        assert!(stop_words.contains("цена"));
        assert!(stop_words.contains("также"));
        assert_eq!(stop_words.len(), 2);
    }

    #[test]
    fn test_curated_exclusions() {
        let exclusions = DomainExclusions::curated();
        assert!(exclusions.contains("тур"));
        assert!(exclusions.contains("январь"));
        assert!(!exclusions.contains("море"));
        assert_eq!(exclusions.len(), CURATED_EXCLUSIONS.len());
    }

    #[test]
    fn test_exclusions_from_file() {
        let path = std::env::temp_dir().join(format!(
            "lemmacloud_exclusions_{}.txt",
            std::process::id()
        ));
        std::fs::write(&path, "# calendar\nПятница\n\n  суббота \n").unwrap();
        let exclusions = DomainExclusions::empty().with_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(exclusions.contains("пятница"));
        assert!(exclusions.contains("суббота"));
        assert!(!exclusions.contains("# calendar"));
        assert_eq!(exclusions.len(), 2);
    }

    #[test]
    fn test_exclusions_missing_file() {
        let err = DomainExclusions::curated()
            .with_file(Path::new("/nonexistent/exclusions.txt"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to read exclusions"));
    }
}
