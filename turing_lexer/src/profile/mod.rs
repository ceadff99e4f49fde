//! Language profiles
//!
//! A profile is plain data: reserved words, operator and delimiter tables,
//! quoting and comment conventions and prefixed literal forms. The scanner,
//! classifier and state machine are generic over it, so adding a language is
//! adding a `ProfileDefinition` (in code or TOML), never new control flow.
//!
//! `ProfileDefinition` is the serializable form. `LexiconProfile` is the
//! validated, immutable form with precomputed lookup tables; it is shared
//! read-only across workers as `Arc<LexiconProfile>`.

pub mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::logging::codes;
use crate::tokens::TokenKind;
use crate::{log_success, log_warning};

/// Longest operator the maximal-munch rule will try
pub const MAX_OPERATOR_CHARS: usize = 3;

/// Profile construction errors
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile id must not be empty")]
    EmptyId,

    #[error("Profile '{profile}' declares an empty operator")]
    EmptyOperator { profile: String },

    #[error("Operator '{operator}' is {length} characters (max {MAX_OPERATOR_CHARS})")]
    OperatorTooLong { operator: String, length: usize },

    #[error("'{symbol}' is declared both as operator and delimiter")]
    OperatorDelimiterOverlap { symbol: String },

    #[error("Quote character '{quote}' is also a delimiter")]
    QuoteIsDelimiter { quote: char },

    #[error("Profile '{profile}' declares string prefixes but no quote characters")]
    PrefixWithoutQuotes { profile: String },

    #[error("Comment marker must not be empty ({which})")]
    EmptyCommentMarker { which: &'static str },

    #[error("Literal form '{form}' has an empty sigil or prefix")]
    EmptyLiteralSigil { form: &'static str },

    #[error("Unknown profile '{name}' (available: {available})")]
    UnknownProfile { name: String, available: String },

    #[error("Failed to read profile file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Profile TOML parse failed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Profile TOML serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ProfileError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ProfileError::UnknownProfile { .. } => codes::profile::UNKNOWN_PROFILE,
            ProfileError::Io { .. } | ProfileError::Parse(_) | ProfileError::Serialize(_) => {
                codes::profile::PROFILE_PARSE_FAILURE
            }
            _ => codes::profile::INVALID_PROFILE,
        }
    }
}

/// Whether reserved-word lookup folds case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseRule {
    #[default]
    Sensitive,
    Insensitive,
}

/// Which numeric literal shapes a profile accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericGrammar {
    /// `0x1A`
    pub hex: bool,
    /// `0o17`
    pub octal: bool,
    /// `0b101`
    pub binary: bool,
    /// `1e10`, `2.5E-3`
    pub exponent: bool,
    /// `3/4`
    pub fractions: bool,
    /// `3+4i` style trailing `i`
    pub complex: bool,
    /// `-5` is one number when the sign directly precedes a digit
    pub signed: bool,
}

impl Default for NumericGrammar {
    fn default() -> Self {
        Self {
            hex: false,
            octal: false,
            binary: false,
            exponent: true,
            fractions: false,
            complex: false,
            signed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockComment {
    pub open: String,
    pub close: String,
    /// Inner openers raise the depth (`#| #| |# |#`)
    #[serde(default)]
    pub nesting: bool,
}

/// Literal introduced by a sigil or fixed prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum LiteralForm {
    /// `@name` → VARIABLE
    Variable { sigil: char },
    /// `#t`, `#false` → BOOLEAN, only at a word boundary
    Boolean { spellings: Vec<String> },
    /// `#\a`, `#\newline` → CHARACTER
    Character {
        prefix: String,
        #[serde(default)]
        names: Vec<String>,
    },
    /// `'sym`, `'(a b)` → SYMBOL
    QuotedSymbol { sigil: char },
}

impl LiteralForm {
    pub fn kind(&self) -> TokenKind {
        match self {
            LiteralForm::Variable { .. } => TokenKind::Variable,
            LiteralForm::Boolean { .. } => TokenKind::Boolean,
            LiteralForm::Character { .. } => TokenKind::Character,
            LiteralForm::QuotedSymbol { .. } => TokenKind::Symbol,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LiteralForm::Variable { .. } => "variable",
            LiteralForm::Boolean { .. } => "boolean",
            LiteralForm::Character { .. } => "character",
            LiteralForm::QuotedSymbol { .. } => "quoted_symbol",
        }
    }

    /// First character of every spelling this form can start with
    fn leading_chars(&self) -> Vec<char> {
        match self {
            LiteralForm::Variable { sigil } | LiteralForm::QuotedSymbol { sigil } => vec![*sigil],
            LiteralForm::Boolean { spellings } => {
                spellings.iter().filter_map(|s| s.chars().next()).collect()
            }
            LiteralForm::Character { prefix, .. } => prefix.chars().next().into_iter().collect(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            LiteralForm::Boolean { spellings } => {
                spellings.is_empty() || spellings.iter().any(|s| s.is_empty())
            }
            LiteralForm::Character { prefix, .. } => prefix.is_empty(),
            LiteralForm::Variable { .. } | LiteralForm::QuotedSymbol { .. } => false,
        }
    }
}

/// Serializable profile description, loadable from TOML
///
/// Plain values come before tables so the TOML rendering stays flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDefinition {
    pub id: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub case_rule: CaseRule,
    /// Operators must end at a word boundary, else scanning falls through
    #[serde(default)]
    pub operator_boundary: bool,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub builtins: Vec<String>,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub datatypes: Vec<String>,
    #[serde(default)]
    pub operators: Vec<String>,
    /// Single-character delimiters
    #[serde(default)]
    pub delimiters: String,
    /// String quote characters
    #[serde(default)]
    pub quotes: String,
    #[serde(default)]
    pub string_prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_comment: Option<String>,
    /// Extra identifier start characters beyond ASCII letters and `_`
    #[serde(default)]
    pub identifier_start: String,
    /// Extra identifier continue characters beyond ASCII alphanumerics and `_`
    #[serde(default)]
    pub identifier_continue: String,
    /// Extra alphabet characters not mentioned anywhere else
    #[serde(default)]
    pub alphabet: String,
    #[serde(default)]
    pub numbers: NumericGrammar,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_comment: Option<BlockComment>,
    #[serde(default)]
    pub literals: Vec<LiteralForm>,
}

impl ProfileDefinition {
    /// Empty definition to build on in code
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            aliases: Vec::new(),
            description: String::new(),
            case_rule: CaseRule::Sensitive,
            operator_boundary: false,
            keywords: Vec::new(),
            builtins: Vec::new(),
            functions: Vec::new(),
            datatypes: Vec::new(),
            operators: Vec::new(),
            delimiters: String::new(),
            quotes: String::new(),
            string_prefixes: Vec::new(),
            line_comment: None,
            identifier_start: String::new(),
            identifier_continue: String::new(),
            alphabet: String::new(),
            numbers: NumericGrammar::default(),
            block_comment: None,
            literals: Vec::new(),
        }
    }

    fn validate(&self) -> Result<(), ProfileError> {
        if self.id.trim().is_empty() {
            return Err(ProfileError::EmptyId);
        }

        for op in &self.operators {
            let length = op.chars().count();
            if length == 0 {
                return Err(ProfileError::EmptyOperator {
                    profile: self.id.clone(),
                });
            }
            if length > MAX_OPERATOR_CHARS {
                return Err(ProfileError::OperatorTooLong {
                    operator: op.clone(),
                    length,
                });
            }
            let mut chars = op.chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                if self.delimiters.contains(ch) {
                    return Err(ProfileError::OperatorDelimiterOverlap { symbol: op.clone() });
                }
            }
        }

        if let Some(quote) = self.quotes.chars().find(|q| self.delimiters.contains(*q)) {
            return Err(ProfileError::QuoteIsDelimiter { quote });
        }

        if !self.string_prefixes.is_empty() && self.quotes.is_empty() {
            return Err(ProfileError::PrefixWithoutQuotes {
                profile: self.id.clone(),
            });
        }

        if matches!(&self.line_comment, Some(marker) if marker.is_empty()) {
            return Err(ProfileError::EmptyCommentMarker { which: "line" });
        }
        if let Some(block) = &self.block_comment {
            if block.open.is_empty() {
                return Err(ProfileError::EmptyCommentMarker { which: "block open" });
            }
            if block.close.is_empty() {
                return Err(ProfileError::EmptyCommentMarker { which: "block close" });
            }
        }

        if let Some(form) = self.literals.iter().find(|f| f.is_empty()) {
            return Err(ProfileError::EmptyLiteralSigil { form: form.name() });
        }

        Ok(())
    }
}

/// Validated, immutable profile with lookup tables
#[derive(Debug, Clone)]
pub struct LexiconProfile {
    definition: ProfileDefinition,
    keywords: HashSet<String>,
    builtins: HashSet<String>,
    functions: HashSet<String>,
    datatypes: HashSet<String>,
    operators: HashSet<String>,
    max_operator_chars: usize,
    delimiters: HashSet<char>,
    quotes: HashSet<char>,
    /// Longest first so `rb"..."` wins over `r`
    string_prefixes: Vec<String>,
    identifier_start: HashSet<char>,
    identifier_continue: HashSet<char>,
    literal_leads: HashSet<char>,
    alphabet: HashSet<char>,
}

impl LexiconProfile {
    pub fn from_definition(definition: ProfileDefinition) -> Result<Self, ProfileError> {
        definition.validate()?;

        let fold = definition.case_rule;
        let word_set = |words: &[String]| -> HashSet<String> {
            words.iter().map(|w| normalize(fold, w)).collect()
        };

        let mut string_prefixes = definition.string_prefixes.clone();
        string_prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        string_prefixes.dedup();

        let identifier_start: HashSet<char> = definition.identifier_start.chars().collect();
        let identifier_continue: HashSet<char> = definition
            .identifier_continue
            .chars()
            .chain(identifier_start.iter().copied())
            .collect();

        let literal_leads = definition
            .literals
            .iter()
            .flat_map(|form| form.leading_chars())
            .collect();

        let profile = Self {
            keywords: word_set(&definition.keywords),
            builtins: word_set(&definition.builtins),
            functions: word_set(&definition.functions),
            datatypes: word_set(&definition.datatypes),
            operators: definition.operators.iter().cloned().collect(),
            max_operator_chars: definition
                .operators
                .iter()
                .map(|op| op.chars().count())
                .max()
                .unwrap_or(0),
            delimiters: definition.delimiters.chars().collect(),
            quotes: definition.quotes.chars().collect(),
            string_prefixes,
            identifier_start,
            identifier_continue,
            literal_leads,
            alphabet: derive_alphabet(&definition),
            definition,
        };

        for op in profile.unreachable_operators() {
            log_warning!(codes::profile::UNREACHABLE_OPERATOR,
                "Operator starts with a delimiter or quote and can never be scanned",
                "profile" => profile.id(),
                "operator" => op
            );
        }

        Ok(profile)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ProfileError> {
        let definition: ProfileDefinition = toml::from_str(text)?;
        let profile = Self::from_definition(definition)?;
        log_success!(codes::success::PROFILE_LOADED, "Profile loaded from TOML",
            "profile" => profile.id(),
            "keywords" => profile.keywords.len(),
            "operators" => profile.operators.len()
        );
        Ok(profile)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ProfileError> {
        Ok(toml::to_string(&self.definition)?)
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn description(&self) -> &str {
        &self.definition.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.definition.aliases
    }

    pub fn definition(&self) -> &ProfileDefinition {
        &self.definition
    }

    pub fn case_rule(&self) -> CaseRule {
        self.definition.case_rule
    }

    pub fn numbers(&self) -> &NumericGrammar {
        &self.definition.numbers
    }

    pub fn operator_boundary(&self) -> bool {
        self.definition.operator_boundary
    }

    pub fn line_comment(&self) -> Option<&str> {
        self.definition.line_comment.as_deref()
    }

    pub fn block_comment(&self) -> Option<&BlockComment> {
        self.definition.block_comment.as_ref()
    }

    pub fn literals(&self) -> &[LiteralForm] {
        &self.definition.literals
    }

    pub fn string_prefixes(&self) -> &[String] {
        &self.string_prefixes
    }

    pub fn max_operator_chars(&self) -> usize {
        self.max_operator_chars
    }

    /// Reserved-word kind, checking keywords before builtins, functions and datatypes
    pub fn word_kind(&self, word: &str) -> Option<TokenKind> {
        let key = normalize(self.definition.case_rule, word);
        if self.keywords.contains(&key) {
            Some(TokenKind::Keyword)
        } else if self.builtins.contains(&key) {
            Some(TokenKind::Builtin)
        } else if self.functions.contains(&key) {
            Some(TokenKind::Function)
        } else if self.datatypes.contains(&key) {
            Some(TokenKind::Datatype)
        } else {
            None
        }
    }

    pub fn is_operator(&self, text: &str) -> bool {
        self.operators.contains(text)
    }

    /// Some operator starts with `prefix`
    pub fn is_operator_prefix(&self, prefix: &str) -> bool {
        self.operators.iter().any(|op| op.starts_with(prefix))
    }

    pub fn is_delimiter(&self, ch: char) -> bool {
        self.delimiters.contains(&ch)
    }

    pub fn is_quote(&self, ch: char) -> bool {
        self.quotes.contains(&ch)
    }

    pub fn in_alphabet(&self, ch: char) -> bool {
        self.alphabet.contains(&ch)
    }

    pub fn is_identifier_start(&self, ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_' || self.identifier_start.contains(&ch)
    }

    pub fn is_identifier_continue(&self, ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '_' || self.identifier_continue.contains(&ch)
    }

    /// `ch` can open one of the prefixed literal forms
    pub fn is_literal_lead(&self, ch: char) -> bool {
        self.literal_leads.contains(&ch)
    }

    /// Operators the delimiter and string rules always claim first
    pub fn unreachable_operators(&self) -> Vec<&str> {
        let mut unreachable: Vec<&str> = self
            .definition
            .operators
            .iter()
            .filter(|op| {
                op.chars()
                    .next()
                    .is_some_and(|first| self.is_delimiter(first) || self.is_quote(first))
            })
            .map(String::as_str)
            .collect();
        unreachable.sort_unstable();
        unreachable
    }

    pub fn alphabet_size(&self) -> usize {
        self.alphabet.len()
    }

    pub fn reserved_word_count(&self) -> usize {
        self.keywords.len() + self.builtins.len() + self.functions.len() + self.datatypes.len()
    }

    pub fn operator_count(&self) -> usize {
        self.operators.len()
    }
}

fn normalize(rule: CaseRule, word: &str) -> String {
    match rule {
        CaseRule::Sensitive => word.to_string(),
        CaseRule::Insensitive => word.to_uppercase(),
    }
}

/// ASCII alphanumerics, basic whitespace, declared extras and every character
/// the tables mention
fn derive_alphabet(definition: &ProfileDefinition) -> HashSet<char> {
    let mut alphabet: HashSet<char> = ('a'..='z')
        .chain('A'..='Z')
        .chain('0'..='9')
        .chain([' ', '\t', '\n', '\r', '_'])
        .collect();

    let word_lists = [
        &definition.keywords,
        &definition.builtins,
        &definition.functions,
        &definition.datatypes,
        &definition.operators,
        &definition.string_prefixes,
    ];
    for list in word_lists {
        alphabet.extend(list.iter().flat_map(|w| w.chars()));
    }

    for text in [
        &definition.delimiters,
        &definition.quotes,
        &definition.identifier_start,
        &definition.identifier_continue,
        &definition.alphabet,
    ] {
        alphabet.extend(text.chars());
    }

    if let Some(marker) = &definition.line_comment {
        alphabet.extend(marker.chars());
    }
    if let Some(block) = &definition.block_comment {
        alphabet.extend(block.open.chars().chain(block.close.chars()));
    }

    for form in &definition.literals {
        match form {
            LiteralForm::Variable { sigil } | LiteralForm::QuotedSymbol { sigil } => {
                alphabet.insert(*sigil);
            }
            LiteralForm::Boolean { spellings } => {
                alphabet.extend(spellings.iter().flat_map(|s| s.chars()));
            }
            LiteralForm::Character { prefix, names } => {
                alphabet.extend(prefix.chars());
                alphabet.extend(names.iter().flat_map(|n| n.chars()));
            }
        }
    }

    alphabet
}
