/*!
 * Lexical dependency labeling for both languages.
 *
 * The segmenter only looks at a handful of labels (`punct`, `cc`, `prep`, `sconj`, `case`,
 * `aux:asp`), so a word-list labeler is enough to run the pipeline without an NLP runtime.
 * Every other token is labeled `dep`.
 */

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{is_cjk_punctuation, DependencyParser, ParsedToken};
use crate::errors::ParserError;
use crate::language::Language;

/// Trailing characters peeled off English words as separate tokens
const TRAILING_PUNCTUATION: &[char] = &[',', '.', '!', '?', ';', ':', '%', '"', '\'', ')', ']'];

/// Clitics split from the word they are attached to
const CLITICS: &[&str] = &["n't", "'s", "'re", "'ve", "'ll", "'d", "'m"];

static ENGLISH_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut labels = HashMap::new();
    for word in ["and", "but", "or", "nor", "yet", "so"] {
        labels.insert(word, "cc");
    }
    for word in [
        "about", "above", "across", "after", "against", "along", "among", "around", "at", "before",
        "behind", "below", "beneath", "beside", "between", "beyond", "by", "despite", "during",
        "except", "for", "from", "in", "inside", "into", "like", "near", "of", "off", "on", "onto",
        "outside", "over", "through", "throughout", "to", "toward", "towards", "under", "until",
        "upon", "with", "within", "without",
    ] {
        labels.insert(word, "prep");
    }
    for word in [
        "because", "although", "though", "while", "whereas", "if", "unless", "since", "when",
        "whenever", "whether", "which", "who", "whose", "whom",
    ] {
        labels.insert(word, "sconj");
    }
    labels
});

static CHINESE_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut labels = HashMap::new();
    for word in [
        "和", "与", "或", "但", "而", "并", "但是", "而且", "并且", "或者", "以及", "然后", "所以",
        "因此", "不过", "可是",
    ] {
        labels.insert(word, "cc");
    }
    for word in [
        "在", "从", "向", "对", "把", "被", "给", "跟", "比", "对于", "关于", "通过", "根据", "为了",
        "按照", "除了", "随着", "由于",
    ] {
        labels.insert(word, "prep");
    }
    for word in ["因为", "虽然", "如果", "即使", "尽管", "只要", "除非", "当"] {
        labels.insert(word, "sconj");
    }
    for word in ["了", "过", "着"] {
        labels.insert(word, "aux:asp");
    }
    labels.insert("的", "case");
    labels
});

/// Longest entry of the Chinese lexicon, in characters
const CHINESE_MAX_WORD: usize = 2;

/// Built-in word-list parser
#[derive(Debug, Clone, Copy)]
pub struct RuleParser {
    language: Language,
}

impl RuleParser {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    fn tokenize_english(text: &str) -> Vec<ParsedToken> {
        let mut tokens: Vec<ParsedToken> = Vec::new();
        for word in text.split_whitespace() {
            let (core, trailing) = peel_trailing(word);
            let (stem, clitic) = split_clitic(core);
            if !stem.is_empty() {
                let label = ENGLISH_LABELS
                    .get(stem.to_lowercase().as_str())
                    .copied()
                    .unwrap_or("dep");
                tokens.push(ParsedToken::new(stem, label).with_space_after(false));
            }
            if let Some(clitic) = clitic {
                tokens.push(ParsedToken::new(clitic, "dep").with_space_after(false));
            }
            for mark in trailing {
                tokens.push(ParsedToken::new(mark, "punct").with_space_after(false));
            }
            if let Some(last) = tokens.last_mut() {
                last.space_after = Some(true);
            }
        }
        tokens
    }

    fn tokenize_chinese(text: &str) -> Vec<ParsedToken> {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens: Vec<ParsedToken> = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c.is_whitespace() {
                if let Some(previous) = tokens.last_mut() {
                    previous.space_after = Some(true);
                }
                i += 1;
                continue;
            }
            if c.is_ascii() && !c.is_ascii_punctuation() {
                let start = i;
                while i < chars.len() && chars[i].is_ascii() && !chars[i].is_whitespace() && !chars[i].is_ascii_punctuation() {
                    i += 1;
                }
                tokens.push(ParsedToken::new(chars[start..i].iter().collect::<String>(), "dep"));
                continue;
            }
            if c.is_ascii_punctuation() || is_cjk_punctuation(c) {
                tokens.push(ParsedToken::new(c.to_string(), "punct"));
                i += 1;
                continue;
            }
            let mut matched = None;
            for width in (2..=CHINESE_MAX_WORD).rev() {
                if i + width <= chars.len() {
                    let candidate: String = chars[i..i + width].iter().collect();
                    if let Some(label) = CHINESE_LABELS.get(candidate.as_str()) {
                        matched = Some((candidate, *label, width));
                        break;
                    }
                }
            }
            match matched {
                Some((word, label, width)) => {
                    tokens.push(ParsedToken::new(word, label));
                    i += width;
                }
                None => {
                    let word = c.to_string();
                    let label = CHINESE_LABELS.get(word.as_str()).copied().unwrap_or("dep");
                    tokens.push(ParsedToken::new(word, label));
                    i += 1;
                }
            }
        }
        for token in tokens.iter_mut().filter(|t| t.space_after.is_none()) {
            token.space_after = Some(false);
        }
        tokens
    }
}

impl DependencyParser for RuleParser {
    fn parse(&self, text: &str) -> Result<Vec<ParsedToken>, ParserError> {
        let mut tokens = match self.language {
            Language::Source => Self::tokenize_english(text),
            Language::Target => Self::tokenize_chinese(text),
        };
        let last = tokens.len().saturating_sub(1);
        for (i, token) in tokens.iter_mut().enumerate() {
            token.is_sent_start = i == 0;
            token.is_sent_end = i == last || is_terminal(&token.text);
        }
        Ok(tokens)
    }
}

fn is_terminal(token: &str) -> bool {
    matches!(token, "." | "!" | "?" | "。" | "！" | "？")
}

/// Split a word into its core and the trailing punctuation marks, in order.
/// A word made only of punctuation is kept whole.
fn peel_trailing(word: &str) -> (&str, Vec<String>) {
    let core = word.trim_end_matches(TRAILING_PUNCTUATION);
    if core.is_empty() {
        return (word, Vec::new());
    }
    let trailing = word[core.len()..].chars().map(|c| c.to_string()).collect();
    (core, trailing)
}

fn split_clitic(word: &str) -> (&str, Option<&str>) {
    let lower = word.to_lowercase();
    for clitic in CLITICS {
        if lower.len() > clitic.len() && lower.ends_with(clitic) && lower.len() == word.len() {
            let cut = word.len() - clitic.len();
            if word.is_char_boundary(cut) {
                return (&word[..cut], Some(&word[cut..]));
            }
        }
    }
    (word, None)
}
