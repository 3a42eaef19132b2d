mod common;

use common::{parse_class, parse_php};
use phpantom_doc::parser::extract_file;
use phpantom_doc::parser::filter::{ApiFilter, TrueFilter};
use phpantom_doc::types::*;

// ─── Declaration extraction ─────────────────────────────────────────────────

#[test]
fn test_class_names_resolve_through_namespace_and_aliases() {
    let php = r#"<?php
namespace App\Model;

use Vendor\Lib\Base;
use Vendor\Contracts\{Jsonable, Arrayable as Arr};

/**
 * A user.
 */
class User extends Base implements Jsonable, Arr
{
    /** The name. */
    public string $name;

    /**
     * Find one.
     *
     * @param int $id The id
     * @return static|null
     */
    public static function find(int $id): ?self {}
}
"#;
    let outcome = parse_php(php);
    assert!(!outcome.syntax_error);
    assert!(outcome.errors.is_empty(), "errors: {:?}", outcome.errors);
    assert_eq!(outcome.classes.len(), 1);

    let user = &outcome.classes[0];
    assert_eq!(user.name, "App\\Model\\User");
    assert_eq!(user.namespace, "App\\Model");
    assert_eq!(user.kind, ClassKind::Class);
    assert_eq!(user.line, 10);
    assert_eq!(user.file, "test.php");
    assert_eq!(user.hash, "test-hash");
    assert_eq!(user.short_desc, "A user.");
    assert_eq!(user.parent.as_deref(), Some("Vendor\\Lib\\Base"));
    assert_eq!(
        user.interfaces,
        vec!["Vendor\\Contracts\\Jsonable", "Vendor\\Contracts\\Arrayable"]
    );
    assert_eq!(user.aliases.get("Arr").map(String::as_str), Some("Vendor\\Contracts\\Arrayable"));

    let name = &user.properties["name"];
    assert_eq!(name.short_desc, "The name.");
    assert_eq!(name.hint, vec![TypeHint::new("string", false)]);

    let find = user.method("find").expect("find");
    assert!(find.modifiers.is_static);
    assert_eq!(find.short_desc, "Find one.");
    assert!(find.has_doc_comment);
    assert!(!find.inherits_doc);
    assert_eq!(
        find.hint,
        vec![
            TypeHint::new("\\App\\Model\\User", false),
            TypeHint::new("null", false)
        ]
    );
    let id = find.parameter("id").expect("id");
    assert_eq!(id.short_desc, "The id");
    assert_eq!(id.hint, vec![TypeHint::new("int", false)]);
    assert_eq!(id.position, 0);
}

#[test]
fn test_aliases_are_scoped_to_their_namespace_block() {
    let php = r#"<?php
namespace A {
    use X\Y;
    class One extends Y {}
}
namespace B {
    class Two extends Y {}
}
"#;
    let outcome = parse_php(php);
    let names: Vec<&str> = outcome.classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["A\\One", "B\\Two"]);
    assert_eq!(outcome.classes[0].parent.as_deref(), Some("X\\Y"));
    assert_eq!(outcome.classes[1].parent.as_deref(), Some("B\\Y"));
}

#[test]
fn test_interface_extends_are_interfaces() {
    let class = parse_class(
        "<?php\ninterface Countable2 extends \\Countable, Sized {}\n",
        "Countable2",
    );
    assert_eq!(class.kind, ClassKind::Interface);
    assert!(class.parent.is_none());
    assert_eq!(class.interfaces, vec!["Countable", "Sized"]);
}

#[test]
fn test_traits_and_constants() {
    let php = r#"<?php
namespace Shop;
abstract class Cart {
    use Totals, \Common\Logs;

    /** Upper bound. */
    const MAX = 10;
    protected const SECRET = 'x';
}
"#;
    let cart = parse_class(php, "Shop\\Cart");
    assert!(cart.modifiers.is_abstract);
    assert_eq!(cart.traits, vec!["Shop\\Totals", "Common\\Logs"]);
    let max = &cart.constants["MAX"];
    assert_eq!(max.value.as_deref(), Some("10"));
    assert_eq!(max.short_desc, "Upper bound.");
    assert_eq!(cart.constants["SECRET"].modifiers.visibility, Visibility::Protected);
}

#[test]
fn test_constant_var_tag_and_doc_errors() {
    let php = r#"<?php
class Limits {
    /** @var int Upper bound */
    const MAX = 10;
    /** @var array<int Broken */
    const BAD = [];
    /** Plain. */
    const PLAIN = 'x';
}
"#;
    let outcome = parse_php(php);
    let limits = &outcome.classes[0];

    let max = &limits.constants["MAX"];
    assert_eq!(max.hint, vec![TypeHint::new("int", false)]);
    assert_eq!(max.hint_desc, "Upper bound");
    assert!(max.errors.is_empty());

    let bad = &limits.constants["BAD"];
    assert!(bad.hint.is_empty());
    assert_eq!(bad.errors.len(), 1);
    assert_eq!(limits.constants["PLAIN"].short_desc, "Plain.");

    assert_eq!(outcome.errors.len(), 1);
    assert!(
        outcome.errors[0].starts_with("An error occurred while parsing \"Limits::BAD\" line \"6\":"),
        "{}",
        outcome.errors[0]
    );
}

#[test]
fn test_aliases_match_case_insensitively() {
    let php = r#"<?php
namespace App;
use Vendor\Http\Response;
class Controller {
    /** @return response The reply */
    public function show() {}
}
"#;
    let controller = parse_class(php, "App\\Controller");
    assert_eq!(
        controller.method("show").expect("show").hint,
        vec![TypeHint::new("\\Vendor\\Http\\Response", false)]
    );
}

#[test]
fn test_enum_is_a_final_class_with_case_constants() {
    let php = r#"<?php
enum Suit: string implements HasLabel {
    /** Red. */
    case Hearts = 'H';
    case Spades = 'S';

    public function label(): string {}
}
"#;
    let suit = parse_class(php, "Suit");
    assert_eq!(suit.kind, ClassKind::Class);
    assert!(suit.modifiers.is_final);
    assert_eq!(suit.interfaces, vec!["HasLabel"]);
    assert_eq!(suit.constants["Hearts"].value.as_deref(), Some("'H'"));
    assert_eq!(suit.constants["Hearts"].short_desc, "Red.");
    assert_eq!(suit.constants["Spades"].value.as_deref(), Some("'S'"));
    assert!(suit.method("label").is_some());
}

#[test]
fn test_signature_details() {
    let php = r#"<?php
class Io {
    public function &buffer() {}
    public function write(string &$out, int $flags = 0, string ...$parts): void {}
}
"#;
    let io = parse_class(php, "Io");
    assert!(io.method("buffer").expect("buffer").is_by_ref);

    let write = io.method("write").expect("write");
    assert!(!write.is_by_ref);
    assert!(write.parameters["out"].is_by_ref);
    assert_eq!(write.parameters["flags"].default.as_deref(), Some("0"));
    assert_eq!(write.parameters["flags"].position, 1);
    assert!(write.parameters["parts"].is_variadic);
    assert_eq!(write.hint, vec![TypeHint::new("void", false)]);
}

#[test]
fn test_doc_comment_refines_broad_native_hints_only() {
    let php = r#"<?php
namespace App;
class Repo {
    /**
     * @param User[] $users The users
     * @return string Never used
     */
    public function save(array $users): int {}
}
"#;
    let save = parse_class(php, "App\\Repo").methods["save"].clone();
    assert_eq!(
        save.parameters["users"].hint,
        vec![TypeHint::new("\\App\\User", true)]
    );
    assert_eq!(save.hint, vec![TypeHint::new("int", false)]);
    assert_eq!(save.hint_desc, "Never used");
}

#[test]
fn test_undocumented_method_inherits_doc() {
    let class = parse_class("<?php\nclass A { public function run() {} }\n", "A");
    let run = class.method("run").expect("run");
    assert!(!run.has_doc_comment);
    assert!(run.inherits_doc);
}

#[test]
fn test_promoted_constructor_parameters_become_properties() {
    let php = r#"<?php
class Point {
    /**
     * @param int $x Horizontal
     * @param int $y Vertical
     */
    public function __construct(public int $x, private int $y) {}
}
"#;
    let point = parse_class(php, "Point");
    assert_eq!(point.properties["x"].short_desc, "Horizontal");
    assert_eq!(point.properties["x"].hint, vec![TypeHint::new("int", false)]);
    assert!(!point.properties.contains_key("y"), "private property filtered");
}

// ─── Diagnostics ────────────────────────────────────────────────────────────

#[test]
fn test_param_count_and_name_mismatches() {
    let php = r#"<?php
class Calc {
    /**
     * @param int $a
     */
    public function add(int $a, int $b) {}

    /**
     * @param int $x
     * @param int $b
     */
    public function sub(int $a, int $b) {}
}
"#;
    let outcome = parse_php(php);
    let calc = &outcome.classes[0];

    let add = calc.method("add").expect("add");
    assert_eq!(add.errors, vec!["\"2\" @param tags are expected but only \"1\" found"]);
    let sub = calc.method("sub").expect("sub");
    assert_eq!(
        sub.errors,
        vec!["The \"x\" @param tag variable name is wrong (should be \"a\")"]
    );

    assert_eq!(outcome.errors.len(), 2);
    assert_eq!(
        outcome.errors[0],
        "An error occurred while parsing \"Calc::add\" line \"6\": \"2\" @param tags are expected but only \"1\" found"
    );
    assert!(outcome.errors[1].contains("\"Calc::sub\""));
}

#[test]
fn test_broken_class_doc_comment_is_reported() {
    let php = "<?php\n/**\n * Summary.\n * @throws A|B\n */\nclass Broken {}\n";
    let outcome = parse_php(php);
    let broken = &outcome.classes[0];
    assert_eq!(broken.short_desc, "Summary.");
    assert_eq!(broken.errors.len(), 1);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("\"Broken\""));
}

#[test]
fn test_syntax_error_yields_no_classes() {
    let outcome = parse_php("<?php\nclass {\n");
    assert!(outcome.syntax_error);
    assert!(outcome.classes.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert!(
        outcome.errors[0].starts_with("An error occurred while parsing \"test.php\" line \"0\":"),
        "{}",
        outcome.errors[0]
    );
}

// ─── Filters ────────────────────────────────────────────────────────────────

const MEMBERS: &str = r#"<?php
class Service {
    public function open() {}
    protected function guard() {}
    private function secret() {}
    private $state;
}
"#;

#[test]
fn test_default_filter_keeps_public_members() {
    let service = parse_class(MEMBERS, "Service");
    let methods: Vec<&str> = service.methods.keys().map(String::as_str).collect();
    assert_eq!(methods, vec!["open"]);
    assert!(service.properties.is_empty());
}

#[test]
fn test_true_filter_keeps_everything() {
    let outcome = extract_file(MEMBERS, "a.php", "h", &TrueFilter);
    let service = &outcome.classes[0];
    assert_eq!(service.methods.len(), 3);
    assert!(service.properties.contains_key("state"));
}

#[test]
fn test_api_filter_requires_api_tags() {
    let php = r#"<?php
/** @api */
class Public1 {
    /** @api */
    public function exposed() {}
    public function hidden() {}
}
class Internal1 {
    /** @api */
    public function exposed() {}
}
"#;
    let outcome = extract_file(php, "a.php", "h", &ApiFilter);
    assert_eq!(outcome.classes.len(), 2, "rejected classes are still registered");

    let public = &outcome.classes[0];
    assert!(public.is_project_class);
    let methods: Vec<&str> = public.methods.keys().map(String::as_str).collect();
    assert_eq!(methods, vec!["exposed"]);

    let internal = &outcome.classes[1];
    assert!(!internal.is_project_class);
    assert!(internal.methods.is_empty());
}
