//! Part-of-speech tagging and lemmatization for Russian words.
//!
//! The analyzer is built once at start-up and shared by reference; the
//! per-run [`LemmaCache`] sits in front of it so every distinct surface form
//! is analyzed at most once per normalization run.

use anyhow::{Context as _, Result};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use crate::error::LemmacloudError;

/// Coarse part-of-speech classes, named after the OpenCorpora tag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    /// NOUN
    Noun,
    /// ADJF, full-form adjective
    AdjectiveFull,
    /// ADJS, short-form adjective
    AdjectiveShort,
    Other,
}

impl PartOfSpeech {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "NOUN" => Self::Noun,
            "ADJF" => Self::AdjectiveFull,
            "ADJS" => Self::AdjectiveShort,
            _ => Self::Other,
        }
    }

    pub fn is_content_word(self) -> bool {
        matches!(
            self,
            Self::Noun | Self::AdjectiveFull | Self::AdjectiveShort
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub pos: PartOfSpeech,
    pub lemma: Arc<str>,
}

impl Analysis {
    pub fn new(pos: PartOfSpeech, lemma: &str) -> Self {
        Self {
            pos,
            lemma: Arc::from(lemma),
        }
    }
}

/// Morphological analysis of a single lowercased word.
/// `None` means the analyzer does not know the word.
pub trait MorphAnalyzer: Send + Sync {
    fn analyze(&self, word: &str) -> Option<Analysis>;
}

impl<T: MorphAnalyzer + ?Sized> MorphAnalyzer for Arc<T> {
    fn analyze(&self, word: &str) -> Option<Analysis> {
        (**self).analyze(word)
    }
}

/// Surface form -> analysis memo for one normalization run.
#[derive(Debug, Default)]
pub struct LemmaCache {
    entries: HashMap<String, Option<Analysis>>,
    misses: usize,
}

impl LemmaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_analyze(
        &mut self,
        word: &str,
        analyzer: &dyn MorphAnalyzer,
    ) -> Option<&Analysis> {
        if !self.entries.contains_key(word) {
            self.misses += 1;
            self.entries
                .insert(word.to_string(), analyzer.analyze(word));
        }
        self.entries.get(word).and_then(|a| a.as_ref())
    }

    /// Number of distinct words sent to the analyzer.
    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// In-memory word form index over the OpenCorpora plain-text dictionary
/// (`dict.opcorpora.txt`).
///
/// The file is a sequence of lexemes separated by blank lines. Each lexeme
/// starts with a numeric id line followed by `FORM\tPOS,grammemes ...` lines;
/// the first form is the lemma:
///
/// ```text
/// 1
/// ТУР	NOUN,inan,masc sing,nomn
/// ТУРЫ	NOUN,inan,masc plur,nomn
///
/// 2
/// ...
/// ```
///
/// A form that belongs to several lexemes keeps the analysis of the first one.
///
/// Short adjectives (ADJS) are separate lexemes in the dictionary. After
/// loading, each one is pointed at the lemma of its full form, so "высок"
/// and "высоки" both lemmatize to "высокий". The pairing comes from
/// [`OpenCorporaDictionary::with_links`] when a link list is available and is
/// otherwise derived from the forms: feminine "высока" pairs with "высокая",
/// masculine "высок" with "высокий", "высокый" or "высокой".
#[derive(Debug, Default)]
pub struct OpenCorporaDictionary {
    forms: HashMap<String, FormEntry>,
    lexemes: Vec<Lexeme>,
}

#[derive(Debug)]
struct FormEntry {
    pos: PartOfSpeech,
    lexeme: usize,
}

#[derive(Debug)]
struct Lexeme {
    id: u64,
    pos: PartOfSpeech,
    lemma: Arc<str>,
    short_feminine: Option<String>,
}

/// OpenCorpora link type joining a full adjective (from) to its short form (to).
const ADJF_ADJS_LINK: u64 = 1;

const FULL_ADJECTIVE_ENDINGS: [&str; 3] = ["ый", "ий", "ой"];

impl OpenCorporaDictionary {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| LemmacloudError::Dictionary {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let dict = Self::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse {}", path.display()))?;
        tracing::info!(
            "loaded {} lexemes ({} word forms) from {}",
            dict.lexeme_count(),
            dict.form_count(),
            path.display()
        );
        Ok(dict)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut dict = Self::default();
        let mut pending_id: Option<u64> = None;
        let mut current: Option<usize> = None;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("read error at line {}", line_no + 1))?;
            let line = line.trim_end_matches('\r');

            if line.trim().is_empty() {
                pending_id = None;
                current = None;
                continue;
            }

            let Some(id) = pending_id else {
                // lexeme id line
                let id = line.trim().parse::<u64>().map_err(|_| {
                    anyhow::anyhow!("expected lexeme id at line {}, got {line:?}", line_no + 1)
                })?;
                pending_id = Some(id);
                continue;
            };

            let Some((form, tags)) = line.split_once('\t') else {
                anyhow::bail!("malformed word form at line {}: {line:?}", line_no + 1);
            };
            let form = form.trim().to_lowercase();
            let pos_tag = tags
                .split(|c: char| c == ',' || c.is_whitespace())
                .next()
                .unwrap_or_default();
            let pos = PartOfSpeech::from_tag(pos_tag);

            let lexeme = *current.get_or_insert_with(|| {
                dict.lexemes.push(Lexeme {
                    id,
                    pos,
                    lemma: Arc::from(form.as_str()),
                    short_feminine: None,
                });
                dict.lexemes.len() - 1
            });
            if pos == PartOfSpeech::AdjectiveShort && has_grammeme(tags, "femn") {
                dict.lexemes[lexeme]
                    .short_feminine
                    .get_or_insert_with(|| form.clone());
            }

            if form.contains('ё') {
                dict.insert(form.replace('ё', "е"), FormEntry { pos, lexeme });
            }
            dict.insert(form, FormEntry { pos, lexeme });
        }

        dict.pair_short_adjectives();
        Ok(dict)
    }

    /// Applies an OpenCorpora link list, one `FROM_ID TO_ID TYPE` triple per
    /// line (the attributes of `<link>` in `dict.opcorpora.xml`). Only
    /// ADJF-ADJS links are used; ids missing from the dictionary are skipped.
    pub fn with_links<R: BufRead>(mut self, reader: R) -> Result<Self> {
        let index: HashMap<u64, usize> = self
            .lexemes
            .iter()
            .enumerate()
            .map(|(idx, lexeme)| (lexeme.id, idx))
            .collect();
        let mut applied = 0;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("read error at line {}", line_no + 1))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields = line
                .split_whitespace()
                .map(str::parse::<u64>)
                .collect::<std::result::Result<Vec<u64>, _>>()
                .with_context(|| format!("malformed link at line {}: {line:?}", line_no + 1))?;
            let &[from, to, link_type] = fields.as_slice() else {
                anyhow::bail!("malformed link at line {}: {line:?}", line_no + 1);
            };
            if link_type != ADJF_ADJS_LINK {
                continue;
            }
            let (Some(&full), Some(&short)) = (index.get(&from), index.get(&to)) else {
                continue;
            };
            if self.lexemes[short].pos == PartOfSpeech::AdjectiveShort {
                self.lexemes[short].lemma = self.lexemes[full].lemma.clone();
                applied += 1;
            }
        }

        tracing::debug!("applied {applied} short adjective links");
        Ok(self)
    }

    pub fn load_links(self, path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| LemmacloudError::Dictionary {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.with_links(BufReader::new(file))
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    fn pair_short_adjectives(&mut self) {
        let pairs: Vec<(usize, usize)> = self
            .lexemes
            .iter()
            .enumerate()
            .filter(|(_, lexeme)| lexeme.pos == PartOfSpeech::AdjectiveShort)
            .filter_map(|(idx, lexeme)| Some((idx, self.full_adjective_for(lexeme)?)))
            .collect();
        for (short, full) in pairs {
            self.lexemes[short].lemma = self.lexemes[full].lemma.clone();
        }
    }

    fn full_adjective_for(&self, short: &Lexeme) -> Option<usize> {
        let feminine = short
            .short_feminine
            .as_deref()
            .and_then(|f| f.strip_suffix('а'))
            .map(|stem| format!("{stem}ая"));
        let masculine = FULL_ADJECTIVE_ENDINGS
            .iter()
            .map(|ending| format!("{}{ending}", short.lemma));

        feminine.into_iter().chain(masculine).find_map(|candidate| {
            let entry = self.forms.get(&candidate)?;
            (entry.pos == PartOfSpeech::AdjectiveFull).then_some(entry.lexeme)
        })
    }

    fn insert(&mut self, form: String, entry: FormEntry) {
        if let Entry::Vacant(slot) = self.forms.entry(form) {
            slot.insert(entry);
        }
    }

    pub fn lexeme_count(&self) -> usize {
        self.lexemes.len()
    }

    pub fn form_count(&self) -> usize {
        self.forms.len()
    }
}

fn has_grammeme(tags: &str, grammeme: &str) -> bool {
    tags.split(|c: char| c == ',' || c.is_whitespace())
        .any(|g| g == grammeme)
}

impl MorphAnalyzer for OpenCorporaDictionary {
    fn analyze(&self, word: &str) -> Option<Analysis> {
        let entry = self.forms.get(word)?;
        Some(Analysis {
            pos: entry.pos,
            lemma: self.lexemes[entry.lexeme].lemma.clone(),
        })
    }
}
