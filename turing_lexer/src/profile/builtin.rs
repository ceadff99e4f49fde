//! Built-in profiles: imperative (Python-like), symbolic (Racket-like) and
//! query (SQL-like)
use std::sync::Arc;

use super::{
    BlockComment, CaseRule, LexiconProfile, LiteralForm, NumericGrammar, ProfileDefinition,
    ProfileError,
};

pub const IMPERATIVE: &str = "imperative";
pub const SYMBOLIC: &str = "symbolic";
pub const QUERY: &str = "query";

/// Canonical ids, in listing order
pub const NAMES: [&str; 3] = [IMPERATIVE, SYMBOLIC, QUERY];

const IMPERATIVE_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "break", "class", "continue", "def", "del",
    "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with",
    "yield", "async", "await",
];

const IMPERATIVE_BUILTINS: &[&str] = &[
    "print", "len", "range", "int", "str", "float", "list", "dict", "set", "tuple", "bool",
    "open", "input", "enumerate", "zip", "map", "filter", "sorted", "reversed", "sum", "min",
    "max", "abs", "isinstance", "type", "super", "iter", "next",
];

const IMPERATIVE_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "//", "%", "**", "=", "+=", "-=", "*=", "/=", "//=", "%=", "**=", "==",
    "!=", "<", ">", "<=", ">=", "<>", "&", "|", "^", "~", "<<", ">>", "&=", "|=", "^=", "<<=",
    ">>=", "!", "@", "@=",
];

const SYMBOLIC_KEYWORDS: &[&str] = &[
    "define", "define-values", "define-syntax", "define-struct", "define-macro",
    "define-for-syntax", "if", "cond", "case", "when", "unless", "and", "or", "not", "lambda",
    "λ", "procedure?", "apply", "curry", "compose", "let", "let*", "letrec", "let-values",
    "let*-values", "parameterize", "with-handlers", "for", "for/list", "for/vector", "for/hash",
    "for/sum", "for/fold", "for*", "for*/list", "do", "map", "filter", "foldl", "foldr",
    "andmap", "ormap", "eval", "compile", "expand", "syntax-e", "syntax->datum",
    "datum->syntax", "quote", "quasiquote", "unquote", "unquote-splicing", "module", "module*",
    "module+", "require", "provide", "only-in", "except-in", "prefix-in", "rename-in",
    "syntax-rules", "syntax-case", "syntax", "with-syntax", "syntax-parameter",
    "syntax-parameterize", "contract", "define/contract", "provide/contract", "class",
    "class*", "interface", "mixin", "new", "instantiate", "send", "send*", "send/apply",
    "super", "inner", "raise", "raise-argument-error", "raise-type-error", "raise-arity-error",
    "raise-syntax-error", "call/cc", "call-with-current-continuation", "call/ec",
    "call-with-escape-continuation", "with-input-from-file", "with-output-to-file",
    "call-with-input-file", "call-with-output-file", "begin", "begin0", "set!", "values",
    "void", "time", "match", "match-lambda", "match-let", "#lang",
];

const SYMBOLIC_BUILTINS: &[&str] = &[
    // lists
    "cons", "car", "cdr", "caar", "cadr", "cdar", "cddr", "caaar", "caadr", "cadar", "caddr",
    "cdaar", "cdadr", "cddar", "cdddr", "list", "list*", "append", "reverse", "length",
    "list-ref", "list-tail", "member", "memq", "memv", "assoc", "assq", "assv", "null?",
    "pair?", "list?",
    // numbers
    "number?", "complex?", "real?", "rational?", "integer?", "exact?", "inexact?", "zero?",
    "positive?", "negative?", "odd?", "even?", "max", "min", "abs", "quotient", "remainder",
    "modulo", "gcd", "lcm", "numerator", "denominator", "floor", "ceiling", "truncate", "round",
    "exp", "log", "sin", "cos", "tan", "asin", "acos", "atan", "sqrt", "expt",
    "make-rectangular", "make-polar", "real-part", "imag-part", "magnitude", "angle",
    "exact->inexact", "inexact->exact",
    // strings
    "string?", "string-length", "string-ref", "string-set!", "string=?", "string<?",
    "string>?", "string<=?", "string>=?", "string-ci=?", "string-ci<?", "string-ci>?",
    "string-ci<=?", "string-ci>=?", "substring", "string-append", "string->list",
    "list->string", "string-copy", "string-fill!", "string->number", "number->string",
    "string->symbol", "symbol->string", "string-upcase", "string-downcase",
    // characters
    "char?", "char=?", "char<?", "char>?", "char<=?", "char>=?", "char-ci=?", "char-ci<?",
    "char-ci>?", "char-ci<=?", "char-ci>=?", "char-alphabetic?", "char-numeric?",
    "char-whitespace?", "char-upper-case?", "char-lower-case?", "char->integer",
    "integer->char", "char-upcase", "char-downcase",
    // vectors and symbols
    "vector?", "make-vector", "vector", "vector-length", "vector-ref", "vector-set!",
    "vector->list", "list->vector", "vector-fill!", "symbol?", "gensym", "boolean?",
    // predicates
    "eq?", "eqv?", "equal?", "port?", "input-port?", "output-port?",
    // io
    "read", "read-char", "peek-char", "eof-object?", "char-ready?", "write", "display",
    "newline", "write-char", "load", "open-input-file", "open-output-file",
    "close-input-port", "close-output-port", "current-input-port", "current-output-port",
    "error",
];

const SYMBOLIC_OPERATORS: &[&str] = &["+", "-", "*", "/", "=", "<", ">", "<=", ">="];

const QUERY_KEYWORDS: &[&str] = &[
    // data manipulation
    "SELECT", "INSERT", "UPDATE", "DELETE", "WITH", "FROM", "WHERE", "JOIN", "INNER", "LEFT",
    "RIGHT", "FULL", "OUTER", "ON", "USING", "GROUP", "BY", "HAVING", "ORDER", "ASC", "DESC",
    "LIMIT", "OFFSET", "UNION", "INTERSECT", "EXCEPT", "ALL", "DISTINCT", "INTO", "VALUES",
    "SET",
    // data definition
    "CREATE", "ALTER", "DROP", "TRUNCATE", "RENAME", "TABLE", "VIEW", "INDEX", "SEQUENCE",
    "SCHEMA", "DATABASE", "CONSTRAINT", "PRIMARY", "KEY", "FOREIGN", "REFERENCES", "UNIQUE",
    "CHECK", "DEFAULT", "AUTO_INCREMENT", "ADD", "MODIFY", "CHANGE", "COLUMN",
    // access and transactions
    "GRANT", "REVOKE", "DENY", "COMMIT", "ROLLBACK", "SAVEPOINT", "BEGIN", "START",
    "TRANSACTION",
    // core types
    "INT", "INTEGER", "BIGINT", "SMALLINT", "TINYINT", "DECIMAL", "NUMERIC", "FLOAT", "DOUBLE",
    "REAL", "CHAR", "VARCHAR", "TEXT", "NCHAR", "NVARCHAR", "DATE", "TIME", "DATETIME",
    "TIMESTAMP", "YEAR", "BOOLEAN", "BOOL", "BIT", "BINARY", "VARBINARY", "BLOB", "CLOB",
    "JSON", "XML",
    // logic
    "AND", "OR", "NOT", "IN", "EXISTS", "BETWEEN", "LIKE", "ILIKE", "IS", "NULL", "TRUE",
    "FALSE",
    // aggregates
    "COUNT", "SUM", "AVG", "MIN", "MAX", "STDDEV", "VARIANCE",
    // windows
    "OVER", "PARTITION", "ROWS", "RANGE", "UNBOUNDED", "PRECEDING", "FOLLOWING", "CURRENT",
    "ROW",
    // conditionals
    "CASE", "WHEN", "THEN", "ELSE", "END", "IF", "ELSEIF", "ENDIF",
    // procedural and misc
    "AS", "ALIAS", "CAST", "CONVERT", "EXTRACT", "SUBSTRING", "TRIM", "COALESCE", "NULLIF",
    "GREATEST", "LEAST", "EXPLAIN", "DESCRIBE", "SHOW", "USE", "CALL", "PROCEDURE", "FUNCTION",
    "TRIGGER", "CURSOR", "DECLARE", "OPEN", "FETCH", "CLOSE", "WHILE", "LOOP", "FOR", "REPEAT",
    "UNTIL", "LEAVE", "ITERATE", "HANDLER", "CONDITION", "SQLSTATE", "SQLEXCEPTION",
    "SQLWARNING", "CONTINUE", "EXIT", "UNDO",
];

const QUERY_FUNCTIONS: &[&str] = &[
    // strings
    "CONCAT", "LENGTH", "UPPER", "LOWER", "LTRIM", "RTRIM", "TRIM", "SUBSTRING", "SUBSTR",
    "REPLACE", "REVERSE", "LEFT", "RIGHT", "CHARINDEX", "POSITION", "LOCATE", "INSTR", "LPAD",
    "RPAD",
    // dates
    "NOW", "CURDATE", "CURTIME", "TODAY", "SYSDATE", "GETDATE", "DATEADD", "DATEDIFF",
    "DATEPART", "YEAR", "MONTH", "DAY", "HOUR", "MINUTE", "SECOND", "DAYOFWEEK", "DAYOFYEAR",
    "WEEK", "QUARTER", "LAST_DAY", "DATE_FORMAT", "STR_TO_DATE",
    // math
    "ABS", "CEIL", "CEILING", "FLOOR", "ROUND", "TRUNCATE", "TRUNC", "MOD", "POWER", "POW",
    "SQRT", "EXP", "LOG", "LOG10", "LN", "SIN", "COS", "TAN", "ASIN", "ACOS", "ATAN", "ATAN2",
    "DEGREES", "RADIANS", "PI", "RAND", "RANDOM", "SIGN",
    // conversion
    "CAST", "CONVERT", "TO_CHAR", "TO_DATE", "TO_NUMBER", "FORMAT", "PARSE", "TRY_CAST",
    "TRY_CONVERT",
    // conditionals
    "COALESCE", "ISNULL", "NULLIF", "IIF", "CHOOSE", "GREATEST", "LEAST",
    // windows
    "ROW_NUMBER", "RANK", "DENSE_RANK", "NTILE", "PERCENT_RANK", "CUME_DIST", "LAG", "LEAD",
    "FIRST_VALUE", "LAST_VALUE", "NTH_VALUE",
];

const QUERY_DATATYPES: &[&str] = &[
    "VARCHAR2", "NVARCHAR2", "CLOB", "NCLOB", "BLOB", "BFILE", "NUMBER", "BINARY_FLOAT",
    "BINARY_DOUBLE", "TIMESTAMP", "INTERVAL", "RAW", "LONG", "ROWID", "UROWID", "MEDIUMINT",
    "MEDIUMTEXT", "LONGTEXT", "TINYTEXT", "ENUM", "SET", "GEOMETRY", "POINT", "LINESTRING",
    "POLYGON",
];

// `_` and `%` wildcards stay out: `_` would split identifiers
const QUERY_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "=", "==", "!=", "<>", "<", ">", "<=", ">=", "||", "&&", ":=",
    "+=", "-=", "*=", "/=", "!", "@", "::", ":",
];

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

pub fn imperative_definition() -> ProfileDefinition {
    let mut def = ProfileDefinition::new(IMPERATIVE);
    def.aliases = words(&["python", "py"]);
    def.description = "Python-like imperative language".to_string();
    def.keywords = words(IMPERATIVE_KEYWORDS);
    def.builtins = words(IMPERATIVE_BUILTINS);
    def.operators = words(IMPERATIVE_OPERATORS);
    def.delimiters = "()[]{},:;.".to_string();
    def.quotes = "\"'".to_string();
    def.string_prefixes = words(&["f", "r", "b", "u", "rb", "br", "fr", "rf"]);
    def.line_comment = Some("#".to_string());
    def.numbers = NumericGrammar {
        hex: true,
        octal: true,
        binary: true,
        exponent: true,
        ..NumericGrammar::default()
    };
    def
}

pub fn symbolic_definition() -> ProfileDefinition {
    let mut def = ProfileDefinition::new(SYMBOLIC);
    def.aliases = words(&["racket", "lisp", "scheme"]);
    def.description = "Racket-like symbolic language".to_string();
    def.operator_boundary = true;
    def.keywords = words(SYMBOLIC_KEYWORDS);
    def.builtins = words(SYMBOLIC_BUILTINS);
    def.operators = words(SYMBOLIC_OPERATORS);
    def.delimiters = "()[]{}.".to_string();
    def.quotes = "\"".to_string();
    def.line_comment = Some(";".to_string());
    def.identifier_start = "+-*/<>=!?:$%&^~@_λ#".to_string();
    def.alphabet = "|\\".to_string();
    def.numbers = NumericGrammar {
        exponent: true,
        fractions: true,
        complex: true,
        signed: true,
        ..NumericGrammar::default()
    };
    def.block_comment = Some(BlockComment {
        open: "#|".to_string(),
        close: "|#".to_string(),
        nesting: true,
    });
    def.literals = vec![
        LiteralForm::Boolean {
            spellings: words(&["#true", "#false", "#t", "#f"]),
        },
        LiteralForm::Character {
            prefix: "#\\".to_string(),
            names: words(&["newline", "space", "tab"]),
        },
        LiteralForm::QuotedSymbol { sigil: '\'' },
        LiteralForm::QuotedSymbol { sigil: '`' },
        LiteralForm::QuotedSymbol { sigil: ',' },
    ];
    def
}

pub fn query_definition() -> ProfileDefinition {
    let mut def = ProfileDefinition::new(QUERY);
    def.aliases = words(&["sql"]);
    def.description = "SQL-like query language".to_string();
    def.case_rule = CaseRule::Insensitive;
    def.keywords = words(QUERY_KEYWORDS);
    def.functions = words(QUERY_FUNCTIONS);
    def.datatypes = words(QUERY_DATATYPES);
    def.operators = words(QUERY_OPERATORS);
    def.delimiters = "()[]{},;.".to_string();
    def.quotes = "\"'`".to_string();
    def.string_prefixes = words(&["N"]);
    def.line_comment = Some("--".to_string());
    def.alphabet = "#".to_string();
    def.block_comment = Some(BlockComment {
        open: "/*".to_string(),
        close: "*/".to_string(),
        nesting: false,
    });
    def.literals = vec![LiteralForm::Variable { sigil: '@' }];
    def
}

pub fn definitions() -> Vec<ProfileDefinition> {
    vec![imperative_definition(), symbolic_definition(), query_definition()]
}

pub fn imperative() -> Result<Arc<LexiconProfile>, ProfileError> {
    Ok(LexiconProfile::from_definition(imperative_definition())?.into_shared())
}

pub fn symbolic() -> Result<Arc<LexiconProfile>, ProfileError> {
    Ok(LexiconProfile::from_definition(symbolic_definition())?.into_shared())
}

pub fn query() -> Result<Arc<LexiconProfile>, ProfileError> {
    Ok(LexiconProfile::from_definition(query_definition())?.into_shared())
}

/// Resolves a canonical id or alias, ignoring case
pub fn by_name(name: &str) -> Result<Arc<LexiconProfile>, ProfileError> {
    let wanted = name.trim().to_lowercase();
    let definition = definitions()
        .into_iter()
        .find(|def| def.id == wanted || def.aliases.iter().any(|alias| *alias == wanted))
        .ok_or_else(|| ProfileError::UnknownProfile {
            name: name.to_string(),
            available: NAMES.join(", "),
        })?;
    Ok(LexiconProfile::from_definition(definition)?.into_shared())
}

pub fn all() -> Result<Vec<Arc<LexiconProfile>>, ProfileError> {
    NAMES.iter().map(|name| by_name(name)).collect()
}
