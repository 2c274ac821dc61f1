//! Template tokenizer.
//!
//! Splits a component template into literal text and `{{ ... }}` directives:
//!
//! | Directive        | Token                  |
//! |------------------|------------------------|
//! | `{{.name}}`      | [`Token::Var`]         |
//! | `{{component}}`  | [`Token::Component`]   |
//! | `{{styles}}`     | [`Token::Styles`]      |
//! | `{{script}}`     | [`Token::Script`]      |
//! | `{{range .name}}`| [`Token::RangeStart`]  |
//! | `{{range end}}`  | [`Token::RangeEnd`]    |
//!
//! Unknown directives are dropped. An unterminated `{{` turns the rest of the
//! input into text.

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Var(String),
    RangeStart(String),
    RangeEnd,
    Component,
    Styles,
    Script,
}

/// Tokenize template text.
pub fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        if start > 0 {
            tokens.push(Token::Text(rest[..start].to_owned()));
        }

        let body_start = start + OPEN.len();
        let Some(len) = rest[body_start..].find(CLOSE) else {
            rest = &rest[start..];
            break;
        };

        if let Some(token) = directive(rest[body_start..body_start + len].trim()) {
            tokens.push(token);
        }
        rest = &rest[body_start + len + CLOSE.len()..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_owned()));
    }
    tokens
}

fn directive(body: &str) -> Option<Token> {
    let token = match body {
        "component" => Token::Component,
        "range end" => Token::RangeEnd,
        "styles" => Token::Styles,
        "script" => Token::Script,
        _ => {
            if let Some(name) = body.strip_prefix("range .") {
                Token::RangeStart(name.to_owned())
            } else if let Some(name) = body.strip_prefix('.') {
                Token::Var(name.to_owned())
            } else {
                return None;
            }
        }
    };
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::*;

    fn text(s: &str) -> Token {
        Text(s.to_owned())
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(tokenize("<p>hi</p>"), vec![text("<p>hi</p>")]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_variables_and_markers() {
        let tokens = tokenize("<h3>{{.header}}</h3>{{component}}{{ styles }}{{script}}");
        assert_eq!(
            tokens,
            vec![
                text("<h3>"),
                Var("header".into()),
                text("</h3>"),
                Component,
                Styles,
                Script,
            ]
        );
    }

    #[test]
    fn test_range_directives() {
        let tokens = tokenize("<ul>{{range .items}}<li>{{.items}}</li>{{range end}}</ul>");
        assert_eq!(
            tokens,
            vec![
                text("<ul>"),
                RangeStart("items".into()),
                text("<li>"),
                Var("items".into()),
                text("</li>"),
                RangeEnd,
                text("</ul>"),
            ]
        );
    }

    #[test]
    fn test_unknown_directive_dropped() {
        assert_eq!(
            tokenize("a{{if .x}}b{{}}c"),
            vec![text("a"), text("b"), text("c")]
        );
    }

    #[test]
    fn test_unterminated_directive_is_text() {
        assert_eq!(
            tokenize("a{{.x}}b{{.y"),
            vec![text("a"), Var("x".into()), text("b"), text("{{.y")]
        );
        assert_eq!(tokenize("{{"), vec![text("{{")]);
    }

    #[test]
    fn test_single_braces_are_text() {
        assert_eq!(tokenize("a { b } c}}"), vec![text("a { b } c}}")]);
    }

    #[test]
    fn test_adjacent_directives() {
        assert_eq!(
            tokenize("{{.a}}{{.b}}"),
            vec![Var("a".into()), Var("b".into())]
        );
    }
}
