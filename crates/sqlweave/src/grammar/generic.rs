use super::{Dialect, Grammar, IdentifierQuote};

/// ANSI-flavoured grammar with a configurable identifier quote.
///
/// This is the grammar used when no dialect is configured.
#[derive(Debug, Clone, Default)]
pub struct GenericGrammar {
    table_prefix: String,
    quote: IdentifierQuote,
}

impl GenericGrammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different identifier quote, e.g. [`IdentifierQuote::BRACKET`].
    pub fn with_quote(mut self, quote: IdentifierQuote) -> Self {
        self.quote = quote;
        self
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }
}

impl Grammar for GenericGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Generic
    }

    fn quote(&self) -> IdentifierQuote {
        self.quote
    }

    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    fn set_table_prefix(&mut self, prefix: &str) {
        self.table_prefix = prefix.to_string();
    }
}
