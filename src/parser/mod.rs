/// PHP parsing and declaration extraction.
///
/// This module contains the logic for parsing PHP source text using the
/// mago_syntax parser and extracting class information (methods, properties,
/// constants, doc comments), `use` statement mappings, and namespace
/// declarations from the resulting AST.
///
/// Sub-modules:
/// - [`classes`]: Class, interface, trait, and enum extraction
/// - [`use_statements`]: `use` statement and namespace handling
/// - [`filter`]: Member filters deciding what gets documented
mod classes;
pub mod filter;
mod use_statements;

use std::collections::BTreeMap;

use mago_syntax::ast::*;

use crate::error::diagnostic;
use crate::resolution::TypeContext;
use crate::types::{ClassInfo, Visibility};

use filter::Filter;

/// Context for resolving PHPDoc comments attached to AST nodes.
///
/// Bundles the program's trivia (comments/whitespace) and the raw source
/// text so that extraction functions can look up the `/** ... */` comment
/// preceding any AST node.
pub(crate) struct DocblockCtx<'a> {
    pub trivias: &'a [Trivia<'a>],
    pub content: &'a str,
}

/// Mutable state of one file's extraction walk.
pub struct ParserContext<'f> {
    pub filter: &'f dyn Filter,
    /// Path of the file being walked.
    pub file: String,
    /// Content hash shared by every class in the file.
    pub hash: String,
    /// Current namespace (`""` for the global namespace).
    pub namespace: String,
    /// `use` aliases of the current namespace block.
    pub aliases: BTreeMap<String, String>,
    /// Class currently being populated.
    pub class: Option<ClassInfo>,
    /// Classes finished so far, in declaration order.
    pub classes: Vec<ClassInfo>,
    /// Diagnostics collected for the file.
    pub errors: Vec<String>,
}

impl<'f> ParserContext<'f> {
    pub fn new(filter: &'f dyn Filter, file: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            filter,
            file: file.into(),
            hash: hash.into(),
            namespace: String::new(),
            aliases: BTreeMap::new(),
            class: None,
            classes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Aliases are scoped to a namespace block; entering one resets them.
    pub fn enter_namespace(&mut self, namespace: &str) {
        self.namespace = namespace.trim_matches('\\').to_string();
        self.aliases.clear();
    }

    pub fn leave_namespace(&mut self) {
        self.namespace.clear();
        self.aliases.clear();
    }

    pub fn add_alias(&mut self, alias: impl Into<String>, fqn: impl Into<String>) {
        self.aliases.insert(alias.into(), fqn.into());
    }

    pub fn enter_class(&mut self, class: ClassInfo) {
        self.class = Some(class);
    }

    /// Close the open class and move it to the finished list.
    pub fn leave_class(&mut self) {
        if let Some(class) = self.class.take() {
            self.classes.push(class);
        }
    }

    /// The naming context outside any class body.
    pub fn type_context(&self) -> TypeContext {
        TypeContext::new(self.namespace.clone()).with_aliases(self.aliases.clone())
    }

    /// Record diagnostics for `entity`, formatted with its line.
    pub fn add_errors(&mut self, entity: &str, line: usize, errors: &[String]) {
        for error in errors {
            self.errors.push(diagnostic(entity, line, error));
        }
    }
}

/// Result of extracting one file.
#[derive(Debug, Default)]
pub struct FileOutcome {
    pub classes: Vec<ClassInfo>,
    pub errors: Vec<String>,
    /// Set when the file could not be parsed; `classes` is then empty.
    pub syntax_error: bool,
}

/// Parse PHP source text and extract every class-like declaration.
///
/// A syntax error (or a parser panic) yields no classes and a single
/// diagnostic at line 0.
pub fn extract_file(content: &str, file: &str, hash: &str, filter: &dyn Filter) -> FileOutcome {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let arena = bumpalo::Bump::new();
        let file_id = mago_database::file::FileId::new("input.php");
        let program = mago_syntax::parser::parse_file_content(&arena, file_id, content);

        if let Some(error) = program.errors.iter().next() {
            return Err(error.to_string());
        }

        let doc_ctx = DocblockCtx {
            trivias: program.trivia.as_slice(),
            content,
        };

        let mut ctx = ParserContext::new(filter, file, hash);
        extract_from_statements(program.statements.iter(), &mut ctx, &doc_ctx);
        Ok((ctx.classes, ctx.errors))
    }));

    let message = match result {
        Ok(Ok((classes, errors))) => {
            return FileOutcome {
                classes,
                errors,
                syntax_error: false,
            };
        }
        Ok(Err(message)) => message,
        Err(_) => {
            tracing::warn!(file, "parser panicked");
            "the parser failed unexpectedly".to_string()
        }
    };

    FileOutcome {
        classes: Vec::new(),
        errors: vec![diagnostic(file, 0, &message)],
        syntax_error: true,
    }
}

/// Walk statements in order, tracking namespaces and `use` imports, and
/// extract class-like declarations.
pub(crate) fn extract_from_statements<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    ctx: &mut ParserContext<'_>,
    doc_ctx: &DocblockCtx<'a>,
) {
    for statement in statements {
        match statement {
            Statement::Namespace(namespace) => {
                let name = namespace.name.as_ref().map(|n| n.value()).unwrap_or("");
                ctx.enter_namespace(name);
                extract_from_statements(namespace.statements().iter(), ctx, doc_ctx);
                ctx.leave_namespace();
            }
            Statement::Use(use_stmt) => {
                use_statements::extract_use_items(&use_stmt.items, ctx);
            }
            Statement::Class(_)
            | Statement::Interface(_)
            | Statement::Trait(_)
            | Statement::Enum(_) => classes::extract_class_like(statement, ctx, doc_ctx),
            _ => {}
        }
    }
}

/// Extract a string representation of a type hint from the AST.
pub(crate) fn extract_hint_string(hint: &Hint) -> String {
    match hint {
        Hint::Identifier(ident) => ident.value().to_string(),
        Hint::Nullable(nullable) => {
            format!("?{}", extract_hint_string(nullable.hint))
        }
        Hint::Union(union) => {
            let left = extract_hint_string(union.left);
            let right = extract_hint_string(union.right);
            format!("{}|{}", left, right)
        }
        Hint::Intersection(intersection) => {
            let left = extract_hint_string(intersection.left);
            let right = extract_hint_string(intersection.right);
            format!("{}&{}", left, right)
        }
        Hint::Void(ident)
        | Hint::Never(ident)
        | Hint::Float(ident)
        | Hint::Bool(ident)
        | Hint::Integer(ident)
        | Hint::String(ident)
        | Hint::Object(ident)
        | Hint::Mixed(ident)
        | Hint::Iterable(ident) => ident.value.to_string(),
        Hint::Null(keyword)
        | Hint::True(keyword)
        | Hint::False(keyword)
        | Hint::Array(keyword)
        | Hint::Callable(keyword)
        | Hint::Static(keyword)
        | Hint::Self_(keyword)
        | Hint::Parent(keyword) => keyword.value.to_string(),
        Hint::Parenthesized(paren) => {
            format!("({})", extract_hint_string(paren.hint))
        }
    }
}

/// Extract visibility from a set of modifiers.
/// Defaults to `Public` if no visibility modifier is present.
pub(crate) fn extract_visibility<'a>(
    modifiers: impl Iterator<Item = &'a Modifier<'a>>,
) -> Visibility {
    for m in modifiers {
        if m.is_private() {
            return Visibility::Private;
        }
        if m.is_protected() {
            return Visibility::Protected;
        }
        if m.is_public() {
            return Visibility::Public;
        }
    }
    Visibility::Public
}
