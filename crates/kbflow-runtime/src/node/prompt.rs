//! Prompt templates.

/// Text substituted for `{kb}` when no documents were retrieved.
pub const NO_CONTEXT: &str = "No context available.";

/// A prompt template with `{query}` and `{kb}` placeholders.
///
/// `{{` and `}}` render as literal braces. Any other braced text is kept
/// as written, so templates containing JSON snippets render safely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate<'a> {
    template: &'a str,
}

impl<'a> PromptTemplate<'a> {
    /// Wraps a template string.
    pub fn new(template: &'a str) -> Self {
        Self { template }
    }

    /// Renders the template with the given query and documents.
    ///
    /// Documents are joined with blank lines; an absent or empty list
    /// renders as [`NO_CONTEXT`].
    pub fn render(&self, query: &str, documents: Option<&[String]>) -> String {
        let kb = match documents {
            Some(documents) if !documents.is_empty() => documents.join("\n\n"),
            _ => NO_CONTEXT.to_owned(),
        };

        let mut rendered = String::with_capacity(self.template.len() + query.len() + kb.len());
        let mut rest = self.template;
        while let Some(position) = rest.find(['{', '}']) {
            rendered.push_str(&rest[..position]);
            let tail = &rest[position..];
            rest = if let Some(after) = tail.strip_prefix("{{") {
                rendered.push('{');
                after
            } else if let Some(after) = tail.strip_prefix("}}") {
                rendered.push('}');
                after
            } else if let Some(after) = tail.strip_prefix("{query}") {
                rendered.push_str(query);
                after
            } else if let Some(after) = tail.strip_prefix("{kb}") {
                rendered.push_str(&kb);
                after
            } else {
                rendered.push_str(&tail[..1]);
                &tail[1..]
            };
        }
        rendered.push_str(rest);
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::DEFAULT_SYSTEM_PROMPT;

    #[test]
    fn renders_default_template() {
        let docs = vec!["X is a letter.".to_owned()];
        let prompt =
            PromptTemplate::new(DEFAULT_SYSTEM_PROMPT).render("What is X?", Some(docs.as_slice()));
        assert_eq!(
            prompt,
            "You are a helpful assistant. Answer the question based on the context provided.\n\n\
             Context: X is a letter.\n\nQuestion: What is X?"
        );
    }

    #[test]
    fn joins_documents_with_blank_lines() {
        let docs = vec!["a".to_owned(), "b".to_owned()];
        let prompt = PromptTemplate::new("{kb}").render("", Some(docs.as_slice()));
        assert_eq!(prompt, "a\n\nb");
    }

    #[test]
    fn missing_or_empty_documents_render_marker() {
        let template = PromptTemplate::new("[{kb}]");
        assert_eq!(template.render("q", None), "[No context available.]");
        assert_eq!(template.render("q", Some(&[][..])), "[No context available.]");
    }

    #[test]
    fn escaped_and_unknown_braces_are_literal() {
        let template = PromptTemplate::new("{{\"q\": \"{query}\"}} {other} } {");
        assert_eq!(template.render("hi", None), "{\"q\": \"hi\"} {other} } {");
    }

    #[test]
    fn placeholders_repeat() {
        let template = PromptTemplate::new("{query}/{query}");
        assert_eq!(template.render("x", None), "x/x");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let template = PromptTemplate::new("{query}");
        assert_eq!(template.render("{kb}", None), "{kb}");
    }
}
