//! Text search compiler.

use crate::mapping::EntitySearchConfig;
use crate::types::TextQuery;

use super::clause::Clause;

/// Compiles a free-text query into `should` clauses.
///
/// Each text field gets a `match` on the normalized term, followed by a
/// `prefix` clause when the field has prefixes enabled. Fields are visited in
/// declaration order. Returns no clauses when `query` is `None`.
pub fn compile_text_search(config: &EntitySearchConfig, query: Option<&TextQuery>) -> Vec<Clause> {
    let Some(query) = query else {
        return Vec::new();
    };

    let term = query.normalized_term();
    let mut clauses = Vec::new();

    for field in config.text_fields() {
        clauses.push(Clause::text_match(&field.field_name, term.as_str()));
        if field.prefix_enabled {
            clauses.push(Clause::prefix(&field.field_name, term.as_str()));
        }
    }

    clauses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::SearchDeclaration;

    fn config() -> EntitySearchConfig {
        let declaration = SearchDeclaration::new()
            .text_with_prefixes("name")
            .keyword("company_id")
            .text("description");
        EntitySearchConfig::from_declaration("applications", &declaration).unwrap()
    }

    #[test]
    fn test_no_query_no_clauses() {
        assert!(compile_text_search(&config(), None).is_empty());
    }

    #[test]
    fn test_text_fields_with_prefix() {
        let query = TextQuery::new("Café");
        let clauses = compile_text_search(&config(), Some(&query));
        assert_eq!(
            clauses,
            vec![
                Clause::text_match("name", "cafe"),
                Clause::prefix("name", "cafe"),
                Clause::text_match("description", "cafe"),
            ]
        );
    }

    #[test]
    fn test_entity_without_text_fields() {
        let declaration = SearchDeclaration::new().keyword("id");
        let config = EntitySearchConfig::from_declaration("ids", &declaration).unwrap();
        let query = TextQuery::new("anything");
        assert!(compile_text_search(&config, Some(&query)).is_empty());
    }

    #[test]
    fn test_empty_term_still_compiles() {
        let clauses = compile_text_search(&config(), Some(&TextQuery::default()));
        assert_eq!(clauses.len(), 3);
        assert_eq!(clauses[0], Clause::text_match("name", ""));
    }
}
