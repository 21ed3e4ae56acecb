//! YAML frontmatter parsing and rendering
//!
//! Records are stored as markdown with YAML frontmatter delimited by `---`:
//!
//! ```markdown
//! ---
//! anolancemento: 2021
//! genero: ficção científica
//! nome: Duna
//! ---
//!
//! Paul Atreides leads nomadic tribes in a battle for Arrakis.
//! ```
//!
//! `render` followed by `parse` returns the exact fields and body.

use super::document::Fields;
use crate::{Error, Result};

const DELIMITER: &str = "---";

/// Parse YAML frontmatter from markdown content
pub fn parse(content: &str) -> Result<(Fields, String)> {
    let content = content.trim_start_matches('\u{feff}');

    let Some(rest) = content.strip_prefix(DELIMITER) else {
        // No frontmatter, entire content is body
        return Ok((Fields::new(), content.to_string()));
    };

    let end_pos = rest
        .find("\n---")
        .ok_or_else(|| Error::Frontmatter("unclosed frontmatter: missing closing ---".into()))?;

    let yaml = rest[..end_pos].trim();
    let after = &rest[end_pos + 1 + DELIMITER.len()..];

    // Closing delimiter line, then the blank separator line
    let after = after.strip_prefix('\n').unwrap_or(after);
    let after = after.strip_prefix('\n').unwrap_or(after);
    let body = after.strip_suffix('\n').unwrap_or(after).to_string();

    let fields = if yaml.is_empty() {
        Fields::new()
    } else {
        serde_yaml::from_str::<Option<Fields>>(yaml)?.unwrap_or_default()
    };

    Ok((fields, body))
}

/// Render fields and body back to markdown with frontmatter
pub fn render(fields: &Fields, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(fields)?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n\n{body}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::document::Value;

    #[test]
    fn test_parse_frontmatter() {
        let content = r#"---
nome: Duna
anolancemento: 2021
avaliacao: 8.5
dataEdicao: null
---

# Sinopse

Some content here.
"#;

        let (fields, body) = parse(content).unwrap();

        assert_eq!(fields.get("nome"), Some(&Value::String("Duna".into())));
        assert_eq!(fields.get("anolancemento"), Some(&Value::Int(2021)));
        assert_eq!(fields.get("avaliacao"), Some(&Value::Float(8.5)));
        assert_eq!(fields.get("dataEdicao"), Some(&Value::Null));
        assert_eq!(body, "# Sinopse\n\nSome content here.");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just a document\n\nWith no frontmatter.";
        let (fields, body) = parse(content).unwrap();

        assert!(fields.is_empty());
        assert!(body.contains("Just a document"));
    }

    #[test]
    fn test_unclosed_frontmatter() {
        let err = parse("---\nnome: Duna\n").unwrap_err();
        assert!(matches!(err, Error::Frontmatter(_)));
    }

    #[test]
    fn test_render_roundtrip_keeps_numeric_looking_strings() {
        let mut fields = Fields::new();
        fields.insert("nome".into(), Value::String("1917".into()));
        fields.insert("duracao".into(), Value::Int(119));
        fields.insert("avaliacao".into(), Value::Float(0.0));

        let body = "Body with a rule\n---\nbelow it";
        let rendered = render(&fields, body).unwrap();
        let (parsed_fields, parsed_body) = parse(&rendered).unwrap();

        assert_eq!(parsed_fields, fields);
        assert_eq!(parsed_body, body);
    }

    #[test]
    fn test_render_empty_body() {
        let mut fields = Fields::new();
        fields.insert("autor".into(), Value::String("Ana".into()));

        let rendered = render(&fields, "").unwrap();
        let (parsed_fields, parsed_body) = parse(&rendered).unwrap();
        assert_eq!(parsed_fields, fields);
        assert_eq!(parsed_body, "");
    }
}
