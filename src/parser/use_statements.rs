/// `use` statement handling.
///
/// This module handles PHP `use` statements, registering a mapping of
/// short (imported) names to their fully-qualified equivalents in the
/// active [`ParserContext`].
use mago_syntax::ast::*;

use crate::util::short_name;

use super::ParserContext;

/// Extract individual use items from a `UseItems` node.
pub(crate) fn extract_use_items(items: &UseItems, ctx: &mut ParserContext<'_>) {
    match items {
        UseItems::Sequence(seq) => {
            // `use Foo\Bar;` or `use Foo\Bar, Baz\Qux;`
            for item in seq.items.iter() {
                register_use_item(item, None, ctx);
            }
        }
        UseItems::TypedSequence(seq) => {
            // `use function Foo\bar;` and `use const Foo\BAR;` never name classes.
            if seq.r#type.is_function() || seq.r#type.is_const() {
                return;
            }
            for item in seq.items.iter() {
                register_use_item(item, None, ctx);
            }
        }
        UseItems::TypedList(list) => {
            if list.r#type.is_function() || list.r#type.is_const() {
                return;
            }
            let prefix = list.namespace.value();
            for item in list.items.iter() {
                register_use_item(item, Some(prefix), ctx);
            }
        }
        UseItems::MixedList(list) => {
            // `use Foo\{Bar, function baz, const QUX};`
            let prefix = list.namespace.value();
            for maybe_typed in list.items.iter() {
                if let Some(ref t) = maybe_typed.r#type
                    && (t.is_function() || t.is_const())
                {
                    continue;
                }
                register_use_item(&maybe_typed.item, Some(prefix), ctx);
            }
        }
    }
}

/// Register a single `UseItem` as an alias.
///
/// If `group_prefix` is `Some`, the item name is relative to that prefix
/// (e.g. for `use Foo\{Bar}`, prefix is `"Foo"` and item name is `"Bar"`,
/// giving FQN `"Foo\Bar"`).
fn register_use_item(item: &UseItem, group_prefix: Option<&str>, ctx: &mut ParserContext<'_>) {
    let item_name = item.name.value().trim_start_matches('\\');

    let fqn = match group_prefix {
        Some(prefix) => format!("{}\\{}", prefix.trim_matches('\\'), item_name),
        None => item_name.to_string(),
    };

    // The short (imported) name is either the alias or the last segment.
    let alias_name = match item.alias {
        Some(ref alias) => alias.identifier.value.to_string(),
        None => short_name(&fqn).to_string(),
    };

    ctx.add_alias(alias_name, fqn);
}
