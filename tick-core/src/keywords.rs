use once_cell::sync::Lazy;
use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter};

/// Calendar words the built-in date-phrase recognizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    Today,
    Yesterday,
    Tomorrow,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
    #[strum(serialize = "new year's day")]
    NewYearsDay,
    #[strum(serialize = "new year's eve")]
    NewYearsEve,
    Halloween,
    #[strum(serialize = "christmas eve")]
    ChristmasEve,
    Christmas,
    #[strum(serialize = "good friday")]
    GoodFriday,
    Easter,
}

/// Aliases shipped with every registry, on top of the canonical phrases.
const BUILTIN_ALIASES: &[(&str, Keyword)] = &[
    ("new years day", Keyword::NewYearsDay),
    ("new years eve", Keyword::NewYearsEve),
    ("xmas", Keyword::Christmas),
    ("xmas eve", Keyword::ChristmasEve),
    ("easter sunday", Keyword::Easter),
];

/// Phrase registry (input → canonical keyword).
///
/// Keys are stored lowercased, with typographic apostrophes folded to `'`, so
/// lookups are case-insensitive. A registry is a plain value: callers that want
/// user synonyms build their own with [`extend`](Self::extend) and pass it down
/// by reference; everyone else shares [`builtin`](Self::builtin).
#[derive(Debug, Clone)]
pub struct Keywords {
    phrases: HashMap<String, Keyword>,
}

impl Default for Keywords {
    fn default() -> Self {
        let mut phrases: HashMap<String, Keyword> = Keyword::iter()
            .map(|keyword| (keyword.as_ref().to_string(), keyword))
            .collect();
        for (alias, keyword) in BUILTIN_ALIASES {
            phrases.insert((*alias).to_string(), *keyword);
        }
        Self { phrases }
    }
}

impl Keywords {
    /// The registry without any user synonyms.
    pub fn builtin() -> &'static Keywords {
        static BUILTIN: Lazy<Keywords> = Lazy::new(Keywords::default);
        &BUILTIN
    }

    /// Extends the registry with user-defined **synonyms**.
    ///
    /// Each pair is `(alias, target)`. The `target` must already be known to the
    /// registry (a canonical phrase or an earlier synonym); unknown targets are
    /// ignored, and so are aliases that would shadow a canonical phrase.
    ///
    /// ```
    /// # use tick_core::keywords::{Keyword, Keywords};
    /// let mut keywords = Keywords::default();
    /// keywords.extend(&[("ytd".into(), "yesterday".into())]);
    /// assert!(keywords.matches(Keyword::Yesterday, "YTD"));
    /// ```
    pub fn extend(&mut self, synonyms: &[(String, String)]) {
        for (alias, target) in synonyms {
            if Self::is_canonical(alias) {
                continue;
            }
            if let Some(&canonical) = self.phrases.get(&normalize(target)) {
                self.phrases.insert(normalize(alias), canonical);
            }
        }
    }

    /// Returns `true` if `word` is a canonical phrase (eg "today").
    pub fn is_canonical(word: &str) -> bool {
        let word = normalize(word);
        Keyword::iter().any(|key| key.as_ref() == word)
    }

    /// Returns `true` if `input` is the given keyword or one of its synonyms.
    pub fn matches(&self, keyword: Keyword, input: &str) -> bool {
        self.lookup(input) == Some(keyword)
    }

    pub fn lookup(&self, phrase: &str) -> Option<Keyword> {
        self.phrases.get(&normalize(phrase)).copied()
    }

    /// Number of words in the longest registered phrase.
    pub fn longest_phrase(&self) -> usize {
        self.phrases
            .keys()
            .map(|phrase| phrase.split_whitespace().count())
            .max()
            .unwrap_or(1)
    }
}

fn normalize(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace('\u{2019}', "'")
}
