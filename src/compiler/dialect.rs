use serde::{Deserialize, Serialize};

/// Target SQL flavour.
///
/// - `Postgres`: `$1, $2, ...` placeholders and native `ILIKE`.
/// - `Sqlite`: `?` placeholders; `ILIKE` is rewritten with `LOWER(..)` and,
///   since SQLite's own `LIKE` ignores ASCII case, `LIKE` becomes `GLOB`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Sqlite => "?".to_string(),
        }
    }

    pub fn quote_identifier(identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    pub fn false_literal(&self) -> &'static str {
        match self {
            Dialect::Postgres => "FALSE",
            Dialect::Sqlite => "1 = 0",
        }
    }

    pub fn true_literal(&self) -> &'static str {
        match self {
            Dialect::Postgres => "TRUE",
            Dialect::Sqlite => "1 = 1",
        }
    }

    pub fn has_ilike(&self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Whether `LIKE` compares case-sensitively on this engine.
    pub fn has_case_sensitive_like(&self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Rewrite a `LIKE` pattern as a `GLOB` pattern matching the same strings.
    ///
    /// `%` and `_` become `*` and `?`; GLOB metacharacters in the pattern are
    /// wrapped in a one-character class so they match literally.
    pub fn glob_pattern(like: &str) -> String {
        let mut glob = String::with_capacity(like.len());
        for ch in like.chars() {
            match ch {
                '%' => glob.push('*'),
                '_' => glob.push('?'),
                '*' | '?' | '[' => {
                    glob.push('[');
                    glob.push(ch);
                    glob.push(']');
                }
                c => glob.push(c),
            }
        }
        glob
    }
}
