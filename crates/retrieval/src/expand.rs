use std::sync::Arc;
use tracing::debug;

use generation::{GenerationError, GenerationProvider};

/// A user query and the alternative phrasings generated for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedQuerySet {
    pub original: String,
    pub variants: Vec<String>,
}

impl ExpandedQuerySet {
    /// Just the original query, used when expansion is skipped.
    pub fn single(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            variants: Vec::new(),
        }
    }

    /// Queries to search, in order.
    ///
    /// The original comes first when requested or when there are no variants.
    pub fn queries(&self, include_original: bool) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.variants.len() + 1);
        if include_original || self.variants.is_empty() {
            out.push(self.original.as_str());
        }
        out.extend(
            self.variants
                .iter()
                .map(String::as_str)
                .filter(|v| !(include_original && *v == self.original)),
        );
        out
    }
}

/// Asks the chat model for alternative phrasings of a question.
#[derive(Clone)]
pub struct QueryExpander {
    provider: Arc<dyn GenerationProvider>,
    num_variants: usize,
}

impl QueryExpander {
    pub fn new(provider: Arc<dyn GenerationProvider>, num_variants: usize) -> Self {
        Self {
            provider,
            num_variants,
        }
    }

    pub async fn expand(&self, query: &str) -> Result<ExpandedQuerySet, GenerationError> {
        let prompt = expansion_prompt(query, self.num_variants);
        let completion = self.provider.complete(&prompt).await?;
        let variants = parse_variants(&completion.text, self.num_variants);
        debug!(variants = variants.len(), "query_expanded");
        Ok(ExpandedQuerySet {
            original: query.to_string(),
            variants,
        })
    }
}

impl std::fmt::Debug for QueryExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExpander")
            .field("model", &self.provider.model_name())
            .field("num_variants", &self.num_variants)
            .finish()
    }
}

pub fn expansion_prompt(query: &str, num_variants: usize) -> String {
    format!(
        "You are an AI language model assistant. Your task is to generate {num_variants} \
         different versions of the given user question to retrieve relevant documents from \
         a vector database. By generating multiple perspectives on the user question, your \
         goal is to help the user overcome some of the limitations of the distance-based \
         similarity search. Provide these alternative questions separated by newlines.\n\
         Original question: {query}"
    )
}

/// One variant per line; list markers, blanks and duplicates dropped, capped at `max`.
pub fn parse_variants(output: &str, max: usize) -> Vec<String> {
    let mut variants: Vec<String> = Vec::new();
    for line in output.lines() {
        let line = strip_list_marker(line.trim());
        if line.is_empty() || variants.iter().any(|v| v == line) {
            continue;
        }
        variants.push(line.to_string());
        if variants.len() == max {
            break;
        }
    }
    variants
}

fn strip_list_marker(line: &str) -> &str {
    if let Some(rest) = line.strip_prefix(['-', '*', '•']) {
        return rest.trim_start();
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim_start();
        }
    }
    line
}
