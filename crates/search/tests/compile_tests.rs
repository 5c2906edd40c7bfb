//! End-to-end compilation tests against the public API.

use lookout_search::entities::{Message, MessageCache};
use lookout_search::{
    ConfigurationError, EntityRegistry, FilterSet, QueryAssembler, SearchDeclaration, SearchError,
    SearchOptions, SearchableEntity, UnsupportedOperatorError, ValidationError,
};
use serde_json::{Value, json};

fn registry() -> EntityRegistry {
    let mut registry = EntityRegistry::with_builtin_entities().unwrap();
    registry
        .register(
            "documents",
            &SearchDeclaration::new()
                .text_with_prefixes("title")
                .text("body")
                .keyword("status")
                .keyword("tag")
                .boolean("archived"),
        )
        .unwrap();
    registry
        .register(
            "boards",
            &SearchDeclaration::new().index("kanban_boards").text("name"),
        )
        .unwrap();
    registry
}

fn root(registry: &EntityRegistry, entity: &str, filters: Value, options: Value) -> Value {
    let compiled = QueryAssembler::new(registry)
        .assemble_json(entity, &filters, &options)
        .unwrap();
    compiled.body()["query"]["bool"].clone()
}

#[test]
fn test_empty_request_has_only_boost() {
    let registry = registry();
    let root = root(&registry, "documents", json!({}), json!({}));
    assert_eq!(root, json!({ "boost": 1.0 }));
}

#[test]
fn test_single_equality_filter() {
    let registry = registry();
    let root = root(&registry, "documents", json!({ "status": "open" }), json!(null));

    assert_eq!(
        root["must"],
        json!([{ "match": { "status": { "query": "open", "operator": "AND" } } }])
    );
    assert!(root.get("should").is_none());
    assert!(root.get("minimum_should_match").is_none());
}

#[test]
fn test_membership_with_values() {
    let registry = registry();
    let root = root(
        &registry,
        "documents",
        json!({}),
        json!({ "$in": [["tag", ["a", "b"]]] }),
    );

    assert_eq!(
        root["must"],
        json!([{
            "bool": {
                "should": [
                    { "match": { "tag": { "query": "a", "operator": "AND" } } },
                    { "match": { "tag": { "query": "b", "operator": "AND" } } }
                ],
                "minimum_should_match": 1
            }
        }])
    );
}

#[test]
fn test_membership_with_empty_list() {
    let registry = registry();
    let root = root(
        &registry,
        "documents",
        json!({}),
        json!({ "$in": [["tag", []]] }),
    );
    assert!(root.get("must").is_none());
}

#[test]
fn test_text_search_over_mapped_fields() {
    let registry = registry();
    let root = root(
        &registry,
        "documents",
        json!({}),
        json!({ "$text": { "$search": "Café" } }),
    );

    assert_eq!(
        root["should"],
        json!([
            { "match": { "title": { "query": "cafe" } } },
            { "prefix": { "title": { "value": "cafe" } } },
            { "match": { "body": { "query": "cafe" } } }
        ])
    );
    assert_eq!(root["minimum_should_match"], 1);
    assert!(root.get("must").is_none());
}

#[test]
fn test_text_with_filters_keeps_must_mandatory() {
    let registry = registry();
    let root = root(
        &registry,
        "documents",
        json!({ "archived": false }),
        json!({ "$text": { "$search": "plan" } }),
    );

    assert_eq!(root["must"].as_array().unwrap().len(), 1);
    assert_eq!(root["should"].as_array().unwrap().len(), 3);
    assert_eq!(root["minimum_should_match"], 1);
    assert_eq!(root["boost"], 1.0);
}

#[test]
fn test_unknown_entity_type() {
    let registry = registry();
    let assembler = QueryAssembler::new(&registry);

    for options in [json!({}), json!({ "$text": { "$search": "x" } })] {
        let err = assembler
            .assemble_json("calendars", &json!({}), &options)
            .unwrap_err();
        assert!(matches!(
            err,
            SearchError::Configuration(ConfigurationError::UnknownEntity { .. })
        ));
    }
}

#[test]
fn test_index_resolution() {
    let registry = registry();
    let assembler = QueryAssembler::new(&registry);
    let compile = |entity: &str| {
        assembler
            .assemble(entity, &FilterSet::new(), &SearchOptions::new())
            .unwrap()
            .index
    };

    assert_eq!(compile("documents"), "documents");
    assert_eq!(compile("boards"), "kanban_boards");
    assert_eq!(compile("messages"), "messages");
}

#[test]
fn test_unsupported_operators_fail_fast() {
    let registry = registry();
    let assembler = QueryAssembler::new(&registry);

    let err = assembler
        .assemble_json("documents", &json!({ "status": { "$ne": "closed" } }), &json!({}))
        .unwrap_err();
    assert_eq!(
        err,
        SearchError::UnsupportedOperator(UnsupportedOperatorError {
            operator: "$ne".to_string(),
            field: "status".to_string(),
        })
    );

    let err = assembler
        .assemble_json("documents", &json!({}), &json!({ "$regex": [["title", "^a"]] }))
        .unwrap_err();
    assert!(matches!(err, SearchError::UnsupportedOperator(_)));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_raw_filters_bypass_validation() {
    let registry = registry();
    let assembler = QueryAssembler::new(&registry);

    let err = assembler
        .assemble_json("documents", &json!({ "legacy_id": 7 }), &json!({}))
        .unwrap_err();
    assert!(matches!(
        err,
        SearchError::Validation(ValidationError::UnknownField { .. })
    ));

    let root = root(
        &registry,
        "documents",
        json!({ "status": "open" }),
        json!({ "$raw": { "legacy_id": 7, "origin": ["a", "b"] } }),
    );
    let must = root["must"].as_array().unwrap();
    assert_eq!(must.len(), 3);
    assert_eq!(must[1]["match"]["legacy_id"]["query"], 7);
    assert_eq!(must[2]["bool"]["should"].as_array().unwrap().len(), 2);
}

#[test]
fn test_pagination_and_count() {
    let registry = registry();
    let compiled = QueryAssembler::new(&registry)
        .assemble_json(
            "documents",
            &json!({ "status": "open" }),
            &json!({ "limit": "50", "page_token": "100" }),
        )
        .unwrap();

    let body = compiled.body();
    assert_eq!(body["size"], 50);
    assert_eq!(body["from"], 100);

    let count = compiled.count_body();
    assert_eq!(count["size"], 0);
    assert!(count.get("from").is_none());
    assert_eq!(count["query"], body["query"]);
}

#[test]
fn test_execution_options_are_fixed() {
    let registry = registry();
    let assembler = QueryAssembler::new(&registry);
    let a = assembler
        .assemble_json("documents", &json!({}), &json!({}))
        .unwrap();
    let b = assembler
        .assemble_json("documents", &json!({ "tag": ["x"] }), &json!({ "limit": 1 }))
        .unwrap();

    assert_eq!(a.options, b.options);
    assert!(a.options.tolerates(404));
    assert_eq!(a.options.max_retries, 3);
}

#[test]
fn test_compilation_is_deterministic() {
    let registry = registry();
    let assembler = QueryAssembler::new(&registry);
    let filters = json!({ "status": "open", "tag": ["b", "a"], "archived": true });
    let options = json!({ "$text": { "$search": "Ünïcödé" }, "$in": [["tag", ["c"]]] });

    let first = serde_json::to_string(&assembler.assemble_json("documents", &filters, &options).unwrap())
        .unwrap();
    let second = serde_json::to_string(&assembler.assemble_json("documents", &filters, &options).unwrap())
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_indexed_message_is_findable_by_filters() {
    let registry = registry();
    let message = Message {
        id: "m1".to_string(),
        user_id: "u1".to_string(),
        text: "hello".to_string(),
        files: vec![],
        cache: Some(MessageCache {
            company_id: "c1".to_string(),
            workspace_id: "w1".to_string(),
            channel_id: "general".to_string(),
        }),
    };
    let document = message.search_document();

    // Every field of the projected document is declared for the entity, so
    // filtering on any of them passes validation.
    let filters = document
        .as_object()
        .unwrap()
        .iter()
        .fold(FilterSet::new(), |set, (field, value)| {
            set.equals(field.as_str(), value.clone())
        });

    let compiled = QueryAssembler::new(&registry)
        .assemble(Message::ENTITY_TYPE, &filters, &SearchOptions::new())
        .unwrap();
    assert_eq!(
        compiled.body()["query"]["bool"]["must"].as_array().unwrap().len(),
        document.as_object().unwrap().len()
    );
}

#[test]
fn test_registry_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<EntityRegistry>();
    assert_send_sync::<lookout_search::EntitySearchConfig>();

    let registry = std::sync::Arc::new(registry());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = std::sync::Arc::clone(&registry);
            std::thread::spawn(move || {
                QueryAssembler::new(&registry)
                    .assemble_json("documents", &json!({ "tag": [i] }), &json!({}))
                    .unwrap()
                    .index
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), "documents");
    }
}
