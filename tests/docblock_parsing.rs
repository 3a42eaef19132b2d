//! Doc comment parsing through the public `phpantom_doc::docblock` API.

use phpantom_doc::docblock::*;
use phpantom_doc::resolution::TypeContext;
use phpantom_doc::types::*;

// ─── Descriptions ───────────────────────────────────────────────────────────

#[test]
fn short_and_long_description_split_at_blank_line() {
    let doc = DocBlock::parse("/**\n * Short line.\n *\n * Long text\n * here.\n */");
    assert_eq!(doc.short_desc, "Short line.");
    assert_eq!(doc.long_desc, "Long text\nhere.");
    assert!(doc.tags.is_empty());
    assert!(doc.errors.is_empty());
}

#[test]
fn wrapped_short_description_is_collapsed() {
    let doc = DocBlock::parse("/**\n * Returns the\n * user name.\n */");
    assert_eq!(doc.short_desc, "Returns the user name.");
    assert_eq!(doc.long_desc, "");
}

#[test]
fn inline_inheritdoc_marker() {
    let doc = DocBlock::parse("/** {@inheritdoc} */");
    assert!(doc.inherit_doc);
    assert_eq!(doc.short_desc, INHERITDOC);
}

#[test]
fn bare_inheritdoc_tag_is_not_stored() {
    let doc = DocBlock::parse("/**\n * Own text.\n * @inheritdoc\n */");
    assert!(doc.inherit_doc);
    assert_eq!(doc.short_desc, "Own text.");
    assert!(!doc.has_tag("inheritdoc"));
}

// ─── @param ─────────────────────────────────────────────────────────────────

#[test]
fn param_tag_with_union_and_array_alternative() {
    let doc = DocBlock::parse(
        "/**\n * @param SingleClass|\\MultipleClass[] $paramName Param Description\n */",
    );
    let params = doc.params();
    assert_eq!(params.len(), 1);
    let param = params[0];
    assert_eq!(param.name.as_deref(), Some("paramName"));
    assert_eq!(param.description, "Param Description");
    assert_eq!(
        param.hint,
        vec![
            TypeHint::new("\\SingleClass", false),
            TypeHint::new("\\MultipleClass", true),
        ]
    );
    assert_eq!(hint_to_string(&param.hint), "\\SingleClass|\\MultipleClass[]");
}

#[test]
fn param_tag_without_type() {
    let doc = DocBlock::parse("/** @param $value The value */");
    let param = doc.params()[0];
    assert!(param.hint.is_empty());
    assert_eq!(param.name.as_deref(), Some("value"));
    assert_eq!(param.description, "The value");
}

#[test]
fn param_tag_with_sub_params() {
    let doc = DocBlock::parse(
        r#"/**
 * @param array $options {
 *     Connection options.
 *
 *     @type string $host Required. Server name.
 *     @type int    $port Optional. Port number. Default 3306.
 * }
 */"#,
    );
    assert!(doc.errors.is_empty(), "errors: {:?}", doc.errors);
    let param = doc.params()[0];
    assert_eq!(param.name.as_deref(), Some("options"));
    assert_eq!(param.description, "Connection options.");

    let keys: Vec<&str> = param.sub_params.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["host", "port"]);

    let host = &param.sub_params["host"];
    assert!(host.required);
    assert_eq!(host.hint.as_deref(), Some("string"));
    assert_eq!(host.description, "Server name.");
    assert_eq!(host.default, None);

    let port = &param.sub_params["port"];
    assert!(!port.required);
    assert_eq!(port.description, "Port number. Default 3306.");
    assert_eq!(port.default.as_deref(), Some("3306"));
}

#[test]
fn nested_sub_params_under_a_list_become_an_item_schema() {
    let doc = DocBlock::parse(
        r#"/**
 * @param array $query {
 *     @type array[] $joins {
 *         @type string $table Joined table.
 *     }
 * }
 */"#,
    );
    let param = doc.params()[0];
    let joins = &param.sub_params["joins"];
    assert!(joins.properties.is_empty());
    let item = joins.item_schema.as_ref().expect("item schema");
    assert_eq!(item.name, "joins[]");
    assert_eq!(item.properties["table"].description, "Joined table.");
}

#[test]
fn braces_without_type_lines_stay_in_the_description() {
    let doc = DocBlock::parse("/** @param array $map Shaped like {key: value} */");
    let param = doc.params()[0];
    assert!(param.sub_params.is_empty());
    assert_eq!(param.description, "Shaped like {key: value}");
}

#[test]
fn stray_brace_in_a_description_keeps_later_tags() {
    let doc = DocBlock::parse(
        "/**\n * Count.\n *\n * @param string $s A '{' char\n * @return int Count\n */",
    );
    assert!(doc.errors.is_empty(), "errors: {:?}", doc.errors);
    let param = doc.params()[0];
    assert_eq!(param.name.as_deref(), Some("s"));
    assert_eq!(param.description, "A '{' char");
    let ret = doc.return_tag().expect("return tag");
    assert_eq!(ret.hint, vec![TypeHint::new("int", false)]);
    assert_eq!(ret.description, "Count");
}

#[test]
fn unclosed_sub_param_block_is_an_error_for_that_tag_only() {
    let doc = DocBlock::parse(
        "/**\n * @param array $opts {\n *     @type string $a First.\n * @return bool Done\n */",
    );
    assert!(doc.params().is_empty());
    assert_eq!(doc.errors.len(), 1);
    assert!(doc.errors[0].starts_with("@param tag:"), "{}", doc.errors[0]);
    assert_eq!(doc.return_tag().expect("return tag").description, "Done");
}

// ─── Other tags ─────────────────────────────────────────────────────────────

#[test]
fn return_and_var_tags() {
    let doc = DocBlock::parse("/**\n * @return string|null The name\n */");
    let ret = doc.return_tag().expect("return tag");
    assert_eq!(
        ret.hint,
        vec![TypeHint::new("string", false), TypeHint::new("null", false)]
    );
    assert_eq!(ret.description, "The name");

    let doc = DocBlock::parse("/** @var int $count Number of rows */");
    let var = doc.var_tag().expect("var tag");
    assert_eq!(var.hint, vec![TypeHint::new("int", false)]);
    assert_eq!(var.description, "Number of rows");
}

#[test]
fn throws_tags_resolve_against_the_namespace() {
    let ctx = TypeContext::new("App");
    let doc = DocBlock::parse_in(
        "/**\n * @throws \\RuntimeException when it fails\n * @throws NotFound\n */",
        &ctx,
    );
    let throws = doc.throws();
    assert_eq!(throws.len(), 2);
    assert_eq!(throws[0].class, "\\RuntimeException");
    assert_eq!(throws[0].description, "when it fails");
    assert_eq!(throws[1].class, "\\App\\NotFound");
}

#[test]
fn throws_with_a_union_is_an_error() {
    let doc = DocBlock::parse("/**\n * Does things.\n * @throws A|B\n */");
    assert!(doc.throws().is_empty());
    assert_eq!(doc.errors.len(), 1);
    assert!(doc.errors[0].starts_with("@throws tag:"), "{}", doc.errors[0]);
    assert_eq!(doc.short_desc, "Does things.");
}

#[test]
fn malformed_type_drops_only_that_tag() {
    let doc = DocBlock::parse("/**\n * @param array<int $a Broken\n * @return int Fine\n */");
    assert!(doc.params().is_empty());
    assert!(doc.return_tag().is_some());
    assert_eq!(doc.errors.len(), 1);
}

#[test]
fn marker_tags_are_kept_with_empty_body() {
    let doc = DocBlock::parse("/**\n * @api\n * @deprecated\n * @whatever\n */");
    assert_eq!(doc.tag("api"), &[DocTag::Text(String::new())]);
    assert_eq!(doc.tag("deprecated"), &[DocTag::Text(String::new())]);
    assert!(!doc.has_tag("whatever"));
}

#[test]
fn tag_names_are_case_insensitive() {
    let doc = DocBlock::parse("/** @Return int The count */");
    assert!(doc.return_tag().is_some());
}

#[test]
fn see_tag_resolves_class_members() {
    let ctx = TypeContext::new("App");
    let doc = DocBlock::parse_in(
        "/**\n * @see Foo::bar() Related\n * @see https://example.com/docs\n */",
        &ctx,
    );
    let see: Vec<&SeeTag> = doc
        .tag("see")
        .iter()
        .filter_map(|t| match t {
            DocTag::See(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(see.len(), 2);
    assert_eq!(see[0].reference, "\\App\\Foo::bar()");
    assert_eq!(see[0].description, "Related");
    assert_eq!(see[1].reference, "https://example.com/docs");
}

#[test]
fn property_tags() {
    let doc = DocBlock::parse(
        "/**\n * @property-read int $id Primary key\n * @property $name\n */",
    );
    match &doc.tag("property-read")[0] {
        DocTag::Property(p) => {
            assert_eq!(p.name, "id");
            assert_eq!(p.description, "Primary key");
            let property = property_from_tag(p, 4);
            assert!(property.is_virtual);
            assert_eq!(property.short_desc, "Primary key");
        }
        other => panic!("unexpected payload {other:?}"),
    }
    match &doc.tag("property")[0] {
        DocTag::Property(p) => assert!(p.hint.is_empty()),
        other => panic!("unexpected payload {other:?}"),
    }
}

#[test]
fn example_tag_keeps_path_and_description() {
    let doc = DocBlock::parse("/** @example queue/basic Pushing a job */");
    match &doc.tag("example")[0] {
        DocTag::Example(example) => {
            assert_eq!(example.path, "queue/basic");
            assert_eq!(example.description, "Pushing a job");
            assert!(example.code.is_none());
        }
        other => panic!("unexpected payload {other:?}"),
    }
}

#[test]
fn method_tags_are_kept_as_text() {
    let doc = DocBlock::parse("/** @method static self make(array $data) Builds one. */");
    let body = doc.tag("method")[0].as_text().expect("text payload");
    assert_eq!(body, "static self make(array $data) Builds one.");

    let ctx = TypeContext::new("App").for_class("App\\Model", None);
    let method = parse_method_tag(body, &ctx, 1).expect("method");
    assert_eq!(method.name, "make");
    assert!(method.modifiers.is_static);
    assert_eq!(method.hint, vec![TypeHint::new("\\App\\Model", false)]);
    assert_eq!(method.parameters["data"].hint, vec![TypeHint::new("array", false)]);
}

#[test]
fn method_tag_without_parentheses_is_ignored() {
    assert!(parse_method_tag("string name", &TypeContext::default(), 1).is_none());
}

// ─── Hint refinement ────────────────────────────────────────────────────────

#[test]
fn refinement_only_for_broad_native_hints() {
    assert!(should_refine_hint(&[]));
    assert!(should_refine_hint(&[TypeHint::new("array", false)]));
    assert!(should_refine_hint(&[TypeHint::new("\\Foo", false)]));
    assert!(!should_refine_hint(&[TypeHint::new("int", false)]));
}
