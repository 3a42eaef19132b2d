/// Class, interface, trait, and enum extraction.
///
/// This module builds a [`ClassInfo`] for every class-like declaration,
/// attaches its parsed doc comment, and populates its methods, properties,
/// constants and trait uses.  Enums are documented as final classes whose
/// cases are constants.
///
/// Type hints are resolved while extracting: the inline hint wins unless it
/// is broad enough for the doc comment to refine it, and tag descriptions
/// always supplement the declaration.
use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::docblock::{self, DocBlock};
use crate::resolution::TypeContext;
use crate::types::*;
use crate::util::{line_at, qualify};

use super::{DocblockCtx, ParserContext, extract_hint_string, extract_visibility};

/// Header data shared by all class-like kinds.
struct ClassHeader<'s> {
    kind: ClassKind,
    name: &'s str,
    parent: Option<&'s str>,
    interfaces: Vec<&'s str>,
    is_abstract: bool,
    is_final: bool,
}

/// Extract a class-like statement into the context's class list.
pub(crate) fn extract_class_like<'a>(
    statement: &'a Statement<'a>,
    ctx: &mut ParserContext<'_>,
    doc_ctx: &DocblockCtx<'a>,
) {
    match statement {
        Statement::Class(class) => {
            let header = ClassHeader {
                kind: ClassKind::Class,
                name: class.name.value,
                parent: class
                    .extends
                    .as_ref()
                    .and_then(|ext| ext.types.first().map(|ident| ident.value())),
                interfaces: class
                    .implements
                    .as_ref()
                    .map(|imp| imp.types.iter().map(|ident| ident.value()).collect())
                    .unwrap_or_default(),
                is_abstract: class.modifiers.contains_abstract(),
                is_final: class.modifiers.contains_final(),
            };
            build_class(header, class, class.members.iter(), ctx, doc_ctx);
        }
        Statement::Interface(iface) => {
            // Interfaces use `extends` for parent interfaces; all of them
            // are recorded as interfaces, never as a parent.
            let header = ClassHeader {
                kind: ClassKind::Interface,
                name: iface.name.value,
                parent: None,
                interfaces: iface
                    .extends
                    .as_ref()
                    .map(|ext| ext.types.iter().map(|ident| ident.value()).collect())
                    .unwrap_or_default(),
                is_abstract: false,
                is_final: false,
            };
            build_class(header, iface, iface.members.iter(), ctx, doc_ctx);
        }
        Statement::Trait(trait_def) => {
            let header = ClassHeader {
                kind: ClassKind::Trait,
                name: trait_def.name.value,
                parent: None,
                interfaces: Vec::new(),
                is_abstract: false,
                is_final: false,
            };
            build_class(header, trait_def, trait_def.members.iter(), ctx, doc_ctx);
        }
        Statement::Enum(enum_def) => {
            // Enums are implicitly final and cannot be extended.
            let header = ClassHeader {
                kind: ClassKind::Class,
                name: enum_def.name.value,
                parent: None,
                interfaces: enum_def
                    .implements
                    .as_ref()
                    .map(|imp| imp.types.iter().map(|ident| ident.value()).collect())
                    .unwrap_or_default(),
                is_abstract: false,
                is_final: true,
            };
            build_class(header, enum_def, enum_def.members.iter(), ctx, doc_ctx);
        }
        _ => {}
    }
}

fn build_class<'a>(
    header: ClassHeader<'_>,
    node: &impl HasSpan,
    members: impl Iterator<Item = &'a ClassLikeMember<'a>>,
    ctx: &mut ParserContext<'_>,
    doc_ctx: &DocblockCtx<'a>,
) {
    let outer = ctx.type_context();
    let name = qualify(&ctx.namespace, header.name);
    let line = line_at(doc_ctx.content, node.span().start.offset);
    let parent = header.parent.map(|p| outer.resolve_class(p));

    let mut class = ClassInfo::new(name.clone(), header.kind, line);
    class.namespace = ctx.namespace.clone();
    class.file = ctx.file.clone();
    class.hash = ctx.hash.clone();
    class.aliases = ctx.aliases.clone();
    class.modifiers.is_abstract = header.is_abstract;
    class.modifiers.is_final = header.is_final;
    class.interfaces = header
        .interfaces
        .iter()
        .map(|i| outer.resolve_class(i))
        .collect();
    class.parent = parent;

    let type_ctx = outer.for_class(&name, class.parent.as_deref());

    if let Some(text) = docblock::get_docblock_text_for_node(doc_ctx.trivias, doc_ctx.content, node)
    {
        let doc = DocBlock::parse_in(text, &type_ctx);
        class.short_desc = doc.short_desc;
        class.long_desc = doc.long_desc;
        class.tags = doc.tags;
        if !doc.errors.is_empty() {
            ctx.add_errors(&name, line, &doc.errors);
            class.errors.extend(doc.errors);
        }
    }

    if !ctx.filter.accept_class(&class) {
        class.is_project_class = false;
        ctx.enter_class(class);
        ctx.leave_class();
        return;
    }

    ctx.enter_class(class);
    {
        let mut extractor = MemberExtractor {
            ctx: &mut *ctx,
            doc_ctx,
            type_ctx: &type_ctx,
        };
        for member in members {
            extractor.member(member);
        }
    }
    ctx.leave_class();
}

/// Pulls members out of a class body into the context's open class.
struct MemberExtractor<'c, 'f, 'a> {
    ctx: &'c mut ParserContext<'f>,
    doc_ctx: &'c DocblockCtx<'a>,
    type_ctx: &'c TypeContext,
}

impl<'a> MemberExtractor<'_, '_, 'a> {
    fn line(&self, node: &impl HasSpan) -> usize {
        line_at(self.doc_ctx.content, node.span().start.offset)
    }

    fn source(&self, node: &impl HasSpan) -> &'a str {
        let span = node.span();
        self.doc_ctx
            .content
            .get(span.start.offset as usize..span.end.offset as usize)
            .unwrap_or("")
    }

    fn doc_for(&self, node: &impl HasSpan) -> Option<DocBlock> {
        docblock::get_docblock_text_for_node(self.doc_ctx.trivias, self.doc_ctx.content, node)
            .map(|text| DocBlock::parse_in(text, self.type_ctx))
    }

    fn class_name(&self) -> String {
        self.ctx
            .class
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    fn errors(&mut self, entity: &str, line: usize, errors: &[String]) {
        self.ctx.add_errors(entity, line, errors);
    }

    fn member(&mut self, member: &'a ClassLikeMember<'a>) {
        match member {
            ClassLikeMember::Method(method) => self.method(member, method),
            ClassLikeMember::Property(property) => self.property(member, property),
            ClassLikeMember::Constant(constant) => self.constant(member, constant),
            ClassLikeMember::EnumCase(enum_case) => {
                let name = enum_case.item.name().value.to_string();
                let source = self.source(enum_case);
                let value = source
                    .split_once('=')
                    .map(|(_, v)| v.trim().trim_end_matches(';').trim().to_string());
                let line = self.line(enum_case);
                let mut info = ConstantInfo::new(name, line);
                info.value = value;
                if let Some(doc) = self.doc_for(member) {
                    apply_constant_doc(&mut info, &doc);
                    let entity = format!("{}::{}", self.class_name(), info.name);
                    self.errors(&entity, line, &doc.errors);
                }
                if let Some(class) = self.ctx.class.as_mut() {
                    class.add_constant(info);
                }
            }
            ClassLikeMember::TraitUse(trait_use) => {
                let traits: Vec<String> = trait_use
                    .trait_names
                    .iter()
                    .map(|ident| self.type_ctx.resolve_class(ident.value()))
                    .collect();
                if let Some(class) = self.ctx.class.as_mut() {
                    class.traits.extend(traits);
                }
            }
        }
    }

    fn method(&mut self, member: &'a ClassLikeMember<'a>, method: &'a Method<'a>) {
        let line = self.line(method);
        let mut info = MethodInfo::new(method.name.value, line);
        info.modifiers = Modifiers {
            visibility: extract_visibility(method.modifiers.iter()),
            is_static: method.modifiers.iter().any(|m| m.is_static()),
            is_abstract: method.modifiers.contains_abstract(),
            is_final: method.modifiers.contains_final(),
        };

        // `function &name()` returns by reference.
        let head_end = method.name.span.start.offset as usize;
        let head_start = method.span().start.offset as usize;
        info.is_by_ref = self
            .doc_ctx
            .content
            .get(head_start..head_end)
            .is_some_and(|head| head.contains('&'));

        for param in method.parameter_list.parameters.iter() {
            let parameter = ParameterInfo {
                name: param.variable.name.trim_start_matches('$').to_string(),
                line: self.line(param),
                hint: param
                    .hint
                    .as_ref()
                    .map(|h| self.type_ctx.resolve_hint(&extract_hint_string(h)))
                    .unwrap_or_default(),
                default: param
                    .default_value
                    .as_ref()
                    .map(|d| self.source(&d.value).to_string()),
                is_by_ref: param.ampersand.is_some(),
                is_variadic: param.ellipsis.is_some(),
                ..ParameterInfo::default()
            };
            info.add_parameter(parameter);
        }

        info.hint = method
            .return_type_hint
            .as_ref()
            .map(|rth| self.type_ctx.resolve_hint(&extract_hint_string(&rth.hint)))
            .unwrap_or_default();

        let doc = self.doc_for(member);
        info.has_doc_comment = doc.is_some();
        let doc = doc.unwrap_or_default();
        info.short_desc = doc.short_desc.clone();
        info.long_desc = doc.long_desc.clone();
        info.inherits_doc = doc.inherit_doc || !info.has_doc_comment;
        info.exceptions = doc.throws();
        if let Some(ret) = doc.return_tag() {
            info.hint = merge_hint(&info.hint, &ret.hint);
            info.hint_desc = ret.description.clone();
        }

        let mut errors = doc.errors.clone();
        errors.extend(apply_param_tags(&mut info, &doc));
        info.tags = doc.tags;

        if !self.ctx.filter.accept_method(&info) {
            return;
        }

        let entity = format!("{}::{}", self.class_name(), info.name);
        self.errors(&entity, line, &errors);
        info.errors = errors;

        // Constructor parameters with a visibility modifier also declare
        // properties.
        if info.name.eq_ignore_ascii_case("__construct") {
            for param in method.parameter_list.parameters.iter() {
                if !param.is_promoted_property() {
                    continue;
                }
                let name = param.variable.name.trim_start_matches('$');
                let Some(source) = info.parameters.get(name) else {
                    continue;
                };
                let mut property = PropertyInfo::new(name, source.line);
                property.hint = source.hint.clone();
                property.short_desc = source.short_desc.clone();
                property.modifiers.visibility = extract_visibility(param.modifiers.iter());
                if self.ctx.filter.accept_property(&property)
                    && let Some(class) = self.ctx.class.as_mut()
                {
                    class.add_property(property);
                }
            }
        }

        if let Some(class) = self.ctx.class.as_mut() {
            class.add_method(info);
        }
    }

    fn property(&mut self, member: &'a ClassLikeMember<'a>, property: &'a Property<'a>) {
        let modifiers = Modifiers {
            visibility: extract_visibility(property.modifiers().iter()),
            is_static: property.modifiers().iter().any(|m| m.is_static()),
            ..Modifiers::default()
        };
        let native = property
            .hint()
            .map(|h| self.type_ctx.resolve_hint(&extract_hint_string(h)))
            .unwrap_or_default();
        let doc = self.doc_for(member).unwrap_or_default();
        let line = self.line(property);

        for var in property.variables().iter() {
            let mut info = PropertyInfo::new(var.name.trim_start_matches('$'), line);
            info.modifiers = modifiers;
            info.hint = native.clone();
            info.short_desc = doc.short_desc.clone();
            info.long_desc = doc.long_desc.clone();
            info.tags = doc.tags.clone();
            info.errors = doc.errors.clone();
            if let Some(var_tag) = doc.var_tag() {
                info.hint = merge_hint(&info.hint, &var_tag.hint);
                info.hint_desc = var_tag.description.clone();
            }

            if !self.ctx.filter.accept_property(&info) {
                continue;
            }
            let entity = format!("{}::${}", self.class_name(), info.name);
            self.errors(&entity, line, &doc.errors);
            if let Some(class) = self.ctx.class.as_mut() {
                class.add_property(info);
            }
        }
    }

    fn constant(&mut self, member: &'a ClassLikeMember<'a>, constant: &'a ClassLikeConstant<'a>) {
        let visibility = extract_visibility(constant.modifiers.iter());
        let doc = self.doc_for(member).unwrap_or_default();

        for item in constant.items.iter() {
            let line = self.line(item);
            let mut info = ConstantInfo::new(item.name.value, line);
            info.value = Some(self.source(&item.value).to_string());
            info.modifiers = Modifiers {
                visibility,
                ..Modifiers::default()
            };
            apply_constant_doc(&mut info, &doc);

            let entity = format!("{}::{}", self.class_name(), info.name);
            self.errors(&entity, line, &doc.errors);
            if let Some(class) = self.ctx.class.as_mut() {
                class.add_constant(info);
            }
        }
    }
}

fn apply_constant_doc(info: &mut ConstantInfo, doc: &DocBlock) {
    info.short_desc = doc.short_desc.clone();
    info.long_desc = doc.long_desc.clone();
    info.tags = doc.tags.clone();
    info.errors = doc.errors.clone();
    if let Some(var_tag) = doc.var_tag() {
        info.hint = var_tag.hint.clone();
        info.hint_desc = var_tag.description.clone();
    }
}

/// Combine an inline hint with a doc comment hint.
///
/// The inline hint wins unless it is broad enough (`array`, `mixed`, a
/// class name, …) for the documented type to refine it.
pub(crate) fn merge_hint(native: &[TypeHint], documented: &[TypeHint]) -> crate::types::Hint {
    if documented.is_empty() {
        return native.to_vec();
    }
    if docblock::should_refine_hint(native) {
        documented.to_vec()
    } else {
        native.to_vec()
    }
}

/// Cross-check `@param` tags against the signature and copy their data onto
/// the parameters.
///
/// Returns diagnostics for a count mismatch and for each tag naming the
/// wrong parameter.  Tags are still applied where they can be matched: by
/// name, or by position when the tag has no name.
pub(crate) fn apply_param_tags(method: &mut MethodInfo, doc: &DocBlock) -> Vec<String> {
    let tags = doc.params();
    if tags.is_empty() {
        return Vec::new();
    }

    let mut errors = Vec::new();
    if tags.len() != method.parameters.len() {
        errors.push(format!(
            "\"{}\" @param tags are expected but only \"{}\" found",
            method.parameters.len(),
            tags.len()
        ));
    }

    let positional: Vec<String> = method.parameters.keys().cloned().collect();
    for (i, tag) in tags.iter().enumerate() {
        let target = match &tag.name {
            Some(name) => {
                if let Some(expected) = positional.get(i)
                    && expected != name
                    && tags.len() == positional.len()
                {
                    errors.push(format!(
                        "The \"{}\" @param tag variable name is wrong (should be \"{}\")",
                        name, expected
                    ));
                }
                name.clone()
            }
            None => match positional.get(i) {
                Some(name) => name.clone(),
                None => continue,
            },
        };

        let Some(parameter) = method.parameters.get_mut(&target) else {
            continue;
        };
        parameter.short_desc = tag.description.clone();
        parameter.hint = merge_hint(&parameter.hint, &tag.hint);
        parameter.sub_params = tag.sub_params.clone();
    }

    errors
}
