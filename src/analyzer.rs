use anyhow::Result;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::sync::Arc;

use crate::lexicon::{DomainExclusions, StopWords};
use crate::morphology::{LemmaCache, MorphAnalyzer};

/// A character filter receives the original text as a stream of characters and can transform the stream by adding,
/// removing, or changing characters. For instance, a character filter could drop soft hyphens so that
/// "пу\u{ad}тешествие" reaches the tokenizer as one word.
pub trait CharacterFilter: Send + Sync {
    fn filter(&self, text: String) -> String;
}

/// Removes format characters that web pages put inside words: soft hyphens,
/// zero-width spaces and joiners, word joiners and stray byte order marks.
pub struct InvisibleCharFilter;

impl InvisibleCharFilter {
    pub fn is_invisible(c: char) -> bool {
        matches!(
            c,
            '\u{ad}' | '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{2060}' | '\u{feff}'
        )
    }
}

impl CharacterFilter for InvisibleCharFilter {
    fn filter(&self, text: String) -> String {
        if !text.chars().any(Self::is_invisible) {
            return text;
        }
        text.chars().filter(|&c| !Self::is_invisible(c)).collect()
    }
}

/// Pulls the visible text out of an HTML document's `<body>`.
#[derive(Debug, Default)]
pub struct HTMLTagFilter;

impl HTMLTagFilter {
    pub fn get_dom(html: &str) -> Result<RcDom> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut std::io::Cursor::new(html))?;
        Ok(dom)
    }

    pub fn is_hidden(local: &str) -> bool {
        matches!(local, "script" | "style" | "noscript" | "template")
    }

    pub fn find_body(handle: &Handle) -> Option<Handle> {
        if let NodeData::Element { name, .. } = &handle.data {
            if &*name.local == "body" {
                return Some(handle.clone());
            }
        }
        handle
            .children
            .borrow()
            .iter()
            .find_map(|child| Self::find_body(child))
    }

    pub fn walk_html(handle: &Handle, out: &mut Vec<String>) {
        match &handle.data {
            NodeData::Text { contents } => {
                let s = contents.borrow();
                let s = s.trim();
                if !s.is_empty() {
                    out.push(s.to_string());
                }
            }
            NodeData::Element { name, .. } => {
                if Self::is_hidden(&name.local) {
                    return;
                }
                for child in handle.children.borrow().iter() {
                    Self::walk_html(child, out);
                }
            }
            NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. } => {}
            _ => {
                for child in handle.children.borrow().iter() {
                    Self::walk_html(child, out);
                }
            }
        }
    }

    /// Body text fragments joined by single spaces; empty when the document has no body.
    pub fn body_text(html: &str) -> Result<String> {
        let dom = Self::get_dom(html)?;
        let Some(body) = Self::find_body(&dom.document) else {
            return Ok(String::new());
        };
        let mut fragments = Vec::new();
        Self::walk_html(&body, &mut fragments);
        Ok(fragments.join(" "))
    }
}

/// A tokenizer receives a stream of characters, breaks it up into individual tokens (usually individual words),
/// and outputs a stream of tokens.
/// For instance, a whitespace tokenizer breaks text into tokens whenever it sees any whitespace.
/// It would convert the text "Туры в Москву." into the terms [Туры, в, Москву.].
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: String) -> Vec<String>;
}

pub struct WhiteSpaceTokenizer;

impl Tokenizer for WhiteSpaceTokenizer {
    fn tokenize(&self, text: String) -> Vec<String> {
        text.split_whitespace()
            .map(|w| w.to_string())
            .collect::<Vec<String>>()
    }
}

/// A token filter receives the token stream and may add, remove, or change tokens.
/// For example, a lowercase token filter converts all tokens to lowercase, a stop token
/// filter removes common words (stop words) from the token stream.
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken>;
}

/// Strips leading and trailing punctuation and drops tokens shorter than `min_length` characters.
pub struct PunctuationStripFilter {
    min_length: usize,
}

impl PunctuationStripFilter {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Default for PunctuationStripFilter {
    fn default() -> Self {
        Self { min_length: 1 }
    }
}

impl TokenFilter for PunctuationStripFilter {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens
            .into_iter()
            .filter_map(|mut token| {
                let trimmed = token.term.trim_matches(|c: char| !c.is_alphanumeric());
                if trimmed.chars().count() >= self.min_length {
                    token.term = trimmed.to_string();
                    Some(token)
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Keeps tokens made of letters only; "2025", "т.е" and "test123" all go.
pub struct AlphabeticTokenFilter;

impl TokenFilter for AlphabeticTokenFilter {
    fn filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens.retain(|t| !t.term.is_empty() && t.term.chars().all(char::is_alphabetic));
        tokens
    }
}

pub struct LowerCaseTokenFilter;

impl TokenFilter for LowerCaseTokenFilter {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens
            .into_iter()
            .map(|mut t| {
                t.term = t.term.to_lowercase();
                t
            })
            .collect()
    }
}

pub struct StopWordTokenFilter {
    stop_words: StopWords,
}

impl StopWordTokenFilter {
    pub fn new(stop_words: StopWords) -> Self {
        Self { stop_words }
    }
}

impl Default for StopWordTokenFilter {
    fn default() -> Self {
        Self::new(StopWords::russian())
    }
}

impl TokenFilter for StopWordTokenFilter {
    fn filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens.retain(|w| !self.stop_words.contains(&w.term));
        tokens
    }
}

/// Keeps nouns and adjectives and replaces them with their lemma.
///
/// Every call owns a fresh [`LemmaCache`], so a surface form reaches the
/// analyzer once per call no matter how often it repeats.
pub struct MorphologyTokenFilter {
    analyzer: Arc<dyn MorphAnalyzer>,
}

impl MorphologyTokenFilter {
    pub fn new(analyzer: Arc<dyn MorphAnalyzer>) -> Self {
        Self { analyzer }
    }
}

impl TokenFilter for MorphologyTokenFilter {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken> {
        let mut cache = LemmaCache::new();
        let filtered = tokens
            .into_iter()
            .filter_map(|mut token| {
                let analysis = cache.get_or_analyze(&token.term, self.analyzer.as_ref())?;
                if !analysis.pos.is_content_word() {
                    return None;
                }
                token.term = analysis.lemma.to_string();
                Some(token)
            })
            .collect();
        tracing::debug!("morphology lookups: {} distinct forms", cache.misses());
        filtered
    }
}

pub struct ExclusionTokenFilter {
    exclusions: DomainExclusions,
}

impl ExclusionTokenFilter {
    pub fn new(exclusions: DomainExclusions) -> Self {
        Self { exclusions }
    }
}

impl TokenFilter for ExclusionTokenFilter {
    fn filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens.retain(|t| !self.exclusions.contains(&t.term));
        tokens
    }
}

/// Upper-cases the first letter: "тур" -> "Тур".
pub struct CapitalizeTokenFilter;

impl CapitalizeTokenFilter {
    pub fn capitalize(term: &str) -> String {
        let mut chars = term.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl TokenFilter for CapitalizeTokenFilter {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens
            .into_iter()
            .map(|mut t| {
                t.term = Self::capitalize(&t.term);
                t
            })
            .collect()
    }
}

/// Pure text analysis pipeline - no async, no network, just text transformations
pub struct TextAnalyzer {
    char_filters: Vec<Box<dyn CharacterFilter>>,
    tokenizer: Box<dyn Tokenizer>,
    token_filters: Vec<Box<dyn TokenFilter>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextToken {
    pub term: String,
    pub pos: usize,
}

impl std::ops::Deref for TextToken {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.term
    }
}

impl TextAnalyzer {
    pub fn new(
        char_filters: Vec<Box<dyn CharacterFilter>>,
        tokenizer: Box<dyn Tokenizer>,
        token_filters: Vec<Box<dyn TokenFilter>>,
    ) -> Self {
        Self {
            char_filters,
            tokenizer,
            token_filters,
        }
    }

    pub fn char_filter(&self, mut content: String) -> String {
        for filter in self.char_filters.iter() {
            content = filter.filter(content);
        }
        content
    }

    pub fn tokenize(&self, content: String) -> Vec<TextToken> {
        let tokens = self.tokenizer.tokenize(content);
        tokens
            .into_iter()
            .enumerate()
            .map(|(idx, term)| TextToken { term, pos: idx })
            .collect()
    }

    pub fn token_filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        for filter in self.token_filters.iter() {
            tokens = filter.filter(tokens);
        }
        tokens
    }

    /// Analyzes raw content and returns a list of tokens
    pub fn analyze(&self, raw_content: String) -> Vec<TextToken> {
        let content = self.char_filter(raw_content);
        let tokens = self.tokenize(content);
        self.token_filter(tokens)
    }
}

/// Turns extracted page text into capitalized noun/adjective lemmas.
pub struct LexicalNormalizer {
    text_analyzer: TextAnalyzer,
}

impl LexicalNormalizer {
    pub fn new(
        morph: Arc<dyn MorphAnalyzer>,
        stop_words: StopWords,
        exclusions: DomainExclusions,
    ) -> Self {
        let text_analyzer = TextAnalyzer::new(
            vec![Box::new(InvisibleCharFilter)],
            Box::new(WhiteSpaceTokenizer),
            vec![
                Box::new(PunctuationStripFilter::default()),
                Box::new(AlphabeticTokenFilter),
                Box::new(LowerCaseTokenFilter),
                Box::new(StopWordTokenFilter::new(stop_words)),
                Box::new(MorphologyTokenFilter::new(morph)),
                Box::new(ExclusionTokenFilter::new(exclusions)),
                Box::new(CapitalizeTokenFilter),
            ],
        );
        Self { text_analyzer }
    }

    /// Joins `texts` with single spaces and normalizes them in one pass.
    /// Output keeps input order and duplicates.
    pub fn normalize<S: AsRef<str>>(&self, texts: &[S]) -> Vec<String> {
        let joined = texts
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<&str>>()
            .join(" ");
        self.text_analyzer
            .analyze(joined)
            .into_iter()
            .map(|t| t.term)
            .collect()
    }
}
