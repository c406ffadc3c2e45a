//! Integration tests for reqmodel-validation

use reqmodel_core::{HttpRequest, HttpResponse, MiddlewareChain, handler};
use reqmodel_validation::*;
use serde_json::{Value, json};
use std::sync::Arc;

fn factory() -> RequestErrorFactory {
    RequestErrorFactory::default()
}

#[test]
fn test_models_without_rules_accept_anything() {
    let model = Model::new()
        .field("a", FieldRule::new())
        .field("b", FieldRule::new());

    for object in [json!({}), json!({"a": null}), json!({"a": [1], "b": {"c": 2}, "z": 0})] {
        assert!(validate(&object, &model, &factory()).is_ok());
    }
}

#[test]
fn test_required_field() {
    let model = Model::new().field("a", FieldRule::new().required(true));

    let err = validate(&json!({}), &model, &factory()).unwrap_err();
    assert_eq!(err.property(), "a");
    assert_eq!(err.message(), "Missing parameter: a");

    for present in [json!(0), json!(""), Value::Null, json!(-1), json!(false)] {
        assert!(validate(&json!({ "a": present }), &model, &factory()).is_ok());
    }
}

#[test]
fn test_type_then_min() {
    let model = Model::new().field("a", FieldRule::new().of_type(FieldType::Number).min(10));

    let err = validate(&json!({"a": "9"}), &model, &factory()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.model_value(), Some(&ModelValue::Type(FieldType::Number)));

    assert!(validate(&json!({"a": 11}), &model, &factory()).is_ok());
    assert!(validate(&json!({}), &model, &factory()).is_ok());
}

#[test]
fn test_fresh_factories_give_equal_errors() {
    let model = Model::new().field("a", FieldRule::new().required(true).max(2));
    let object = json!({"a": [1, 2, 3]});

    let first = validate(&object, &model, &factory()).unwrap_err();
    let second = validate(&object, &model, &factory()).unwrap_err();
    assert_eq!(first, second);
    assert_eq!(first.to_json(), second.to_json());
}

#[test]
fn test_each_with_builtin_predicate() {
    let model = Model::new().field(
        "ids",
        FieldRule::new()
            .of_type(FieldType::Array)
            .each_rule(Rule::new(predicates::uuid().negate()).message("ids must be UUIDs")),
    );

    let ok = json!({"ids": ["550e8400-e29b-41d4-a716-446655440000"]});
    assert!(validate(&ok, &model, &factory()).is_ok());

    let bad = json!({"ids": ["550e8400-e29b-41d4-a716-446655440000", "42"]});
    let err = validate(&bad, &model, &factory()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ElementValidationFailure);
    assert_eq!(err.message(), "ids must be UUIDs");
    assert_eq!(err.key(), Some("1"));
}

#[test]
fn test_one_of_validator() {
    let model = Model::new().field(
        "sort",
        FieldRule::new().validate_rule(predicates::one_of(["asc", "desc"])),
    );

    assert!(validate(&json!({"sort": "asc"}), &model, &factory()).is_ok());
    assert_eq!(
        validate(&json!({"sort": "up"}), &model, &factory())
            .unwrap_err()
            .message(),
        "Invalid parameter: sort"
    );
}

#[test]
fn test_shared_model_across_threads() {
    let model = Arc::new(
        Model::new().field("n", FieldRule::new().of_type(FieldType::Number).max(100)),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let model = Arc::clone(&model);
            std::thread::spawn(move || {
                let object = json!({ "n": i * 50 });
                validate(&object, &model, &factory()).is_ok()
            })
        })
        .collect();

    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![true, true, true, false]);
}

#[test]
fn test_query_and_body_sources() {
    let model = Model::new()
        .field("page", FieldRule::new().of_type(FieldType::Number))
        .field("name", FieldRule::new().required(true).min(2));

    let mut req = HttpRequest::from_uri("POST", "/users?page=2")
        .with_body(br#"{"name": "x"}"#.to_vec());
    let err = req
        .validate_sources(&model, &[Source::Body])
        .unwrap()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::BelowMinimum);
    assert_eq!(err.property(), "name");

    // The query has no name, so it fails before the body is read
    let err = req
        .validate_sources(&model, &[Source::Query, Source::Body])
        .unwrap()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
}

#[test]
fn test_middleware_from_config() {
    let config = ValidatorConfig::from_toml_str(
        r#"
        status = 422
        error_name = "ParamError"
        sources = ["body"]
        "#,
    )
    .unwrap();

    let mut chain = MiddlewareChain::new();
    chain.use_middleware(RequestValidator::from_config(&config));

    let app = handler(|mut req: HttpRequest| async move {
        let model = Model::new().field("q", FieldRule::new().required(true));
        Ok(match req.validate(&model)? {
            Some(err) => err.into_response(),
            None => HttpResponse::ok(),
        })
    });

    let req = HttpRequest::from_uri("POST", "/search?q=rust").with_body(b"{}".to_vec());
    let response = tokio_test::block_on(chain.apply(req, app)).unwrap();

    assert_eq!(response.status, 422);
    let body: Value = response.body_json().unwrap();
    assert_eq!(body["name"], "ParamError");
    assert_eq!(body["kind"], "MissingRequiredField");
    assert_eq!(body["property"], "q");
}
