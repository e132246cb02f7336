//! `{{var}}` template rendering.
//!
//! Rendering is a single left-to-right pass: a placeholder whose name has a
//! value in the variable map is substituted; anything else (unknown names,
//! unclosed braces) is copied through literally. Rendering never fails.

use std::collections::HashMap;

/// Substitute `{{var}}` placeholders from `vars`. Unmatched placeholders
/// remain literal.
#[must_use]
pub fn render_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        match after_open.find("}}") {
            Some(close) => {
                let name = after_open[..close].trim();
                if let Some(value) = vars.get(name) {
                    out.push_str(value);
                } else {
                    out.push_str(&rest[open..open + 2 + close + 2]);
                }
                rest = &after_open[close + 2..];
            }
            None => {
                // Unclosed braces: keep the tail verbatim.
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Placeholder names appearing in a template, first occurrence order,
/// deduplicated.
#[must_use]
pub fn extract_placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            break;
        };
        let name = after_open[..close].trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        rest = &after_open[close + 2..];
    }

    names
}

#[cfg(test)]
mod tests {
    use super::{extract_placeholders, render_template};
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn substitutes_known_placeholders() {
        let rendered = render_template(
            "Hello {{name}}, tell me about {{topic}}.",
            &vars(&[("name", "Rose"), ("topic", "the farm")]),
        );
        assert_eq!(rendered, "Hello Rose, tell me about the farm.");
    }

    #[test]
    fn unknown_placeholders_stay_literal() {
        let rendered = render_template(
            "Hello {{name}}, tell me about {{topic}}.",
            &HashMap::new(),
        );
        assert_eq!(rendered, "Hello {{name}}, tell me about {{topic}}.");
    }

    #[test]
    fn partial_substitution_keeps_the_rest() {
        let rendered = render_template(
            "{{greeting}} {{name}}",
            &vars(&[("greeting", "Welcome")]),
        );
        assert_eq!(rendered, "Welcome {{name}}");
    }

    #[test]
    fn unclosed_braces_are_copied_through() {
        let rendered = render_template("before {{oops after", &vars(&[("oops", "x")]));
        assert_eq!(rendered, "before {{oops after");
    }

    #[test]
    fn values_containing_braces_are_not_rescanned() {
        let rendered = render_template("{{a}} {{b}}", &vars(&[("a", "{{b}}"), ("b", "two")]));
        assert_eq!(rendered, "{{b}} two");
    }

    #[test]
    fn extracts_names_in_order_without_duplicates() {
        let names = extract_placeholders("{{b}} then {{a}} then {{b}} again");
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn repeated_placeholder_renders_everywhere() {
        let rendered = render_template("{{name}} and {{name}}", &vars(&[("name", "Rose")]));
        assert_eq!(rendered, "Rose and Rose");
    }
}
