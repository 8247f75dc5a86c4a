// Shared prompt fragments and the template renderer used by every stage.
// Each stage defines its own templates alongside it (see analysis/prompts.rs).

use std::collections::HashMap;

use thiserror::Error;

/// System prompt sent with every gateway call. Enforces JSON-only output.
pub const ANALYST_SYSTEM: &str = "You are a precise resume analysis assistant. \
    You MUST follow the output format requested in the prompt exactly. \
    Do NOT include explanations or apologies.";

#[derive(Debug, Error, PartialEq)]
pub enum PromptError {
    #[error("Prompt '{template}' is missing variable '{variable}'")]
    MissingVariable {
        template: &'static str,
        variable: &'static str,
    },
}

/// A named instruction template with `{variable}` placeholders.
///
/// Only the declared variables are substituted. Any other braces (such as the
/// JSON schema examples embedded in the text) are left untouched.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub text: &'static str,
    pub variables: &'static [&'static str],
}

impl PromptTemplate {
    /// Renders the template in a single left-to-right pass, so substituted
    /// values are never themselves scanned for placeholders.
    pub fn render(&self, vars: &HashMap<&str, String>) -> Result<String, PromptError> {
        for &variable in self.variables {
            if !vars.contains_key(variable) {
                return Err(PromptError::MissingVariable {
                    template: self.name,
                    variable,
                });
            }
        }

        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let placeholder = after.find('}').and_then(|close| {
                let name = &after[..close];
                self.variables
                    .contains(&name)
                    .then(|| (vars.get(name), close))
            });
            match placeholder {
                Some((Some(value), close)) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREETING: PromptTemplate = PromptTemplate {
        name: "greeting",
        text: "Hello {name}! Reply as {\"ok\": true} about {topic}.",
        variables: &["name", "topic"],
    };

    fn vars(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_render_substitutes_declared_variables() {
        let rendered = GREETING
            .render(&vars(&[("name", "Ada"), ("topic", "engines")]))
            .unwrap();
        assert_eq!(rendered, "Hello Ada! Reply as {\"ok\": true} about engines.");
    }

    #[test]
    fn test_render_missing_variable() {
        let err = GREETING.render(&vars(&[("name", "Ada")])).unwrap_err();
        assert_eq!(
            err,
            PromptError::MissingVariable {
                template: "greeting",
                variable: "topic"
            }
        );
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let rendered = GREETING
            .render(&vars(&[("name", "{topic}"), ("topic", "x")]))
            .unwrap();
        assert!(rendered.starts_with("Hello {topic}!"));
    }

    #[test]
    fn test_render_unclosed_brace_is_literal() {
        let template = PromptTemplate {
            name: "open",
            text: "a { b {name",
            variables: &["name"],
        };
        assert_eq!(template.render(&vars(&[("name", "n")])).unwrap(), "a { b {name");
    }
}
