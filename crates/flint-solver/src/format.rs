//! Type printing.
//!
//! Produces the surface syntax users write: `{|a: number|}` for exact
//! objects, `{a: number, ...}` for inexact ones, `mixed`/`empty` for the
//! top and bottom types. Named types print by name, so recursive aliases
//! print in finite space; remaining structural depth is bounded by the
//! printing profile of [`RecursionGuard`].

use crate::def::TypeResolver;
use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile};
use crate::types::*;
use flint_common::Atom;

pub struct TypePrinter<'a> {
    interner: &'a TypeInterner,
    resolver: &'a dyn TypeResolver,
    guard: RecursionGuard<TypeId>,
}

/// Print `ty` with a fresh printer.
pub fn format_type(interner: &TypeInterner, resolver: &dyn TypeResolver, ty: TypeId) -> String {
    TypePrinter::new(interner, resolver).print(ty)
}

impl<'a> TypePrinter<'a> {
    pub fn new(interner: &'a TypeInterner, resolver: &'a dyn TypeResolver) -> Self {
        Self {
            interner,
            resolver,
            guard: RecursionGuard::with_profile(RecursionProfile::Printing),
        }
    }

    pub fn atom(&self, atom: Atom) -> String {
        self.interner.resolve_atom(atom)
    }

    pub fn print(&mut self, ty: TypeId) -> String {
        if let Some(kind) = IntrinsicKind::from_type_id(ty) {
            return kind.name().to_string();
        }
        match self.guard.enter(ty) {
            crate::recursion::RecursionResult::Entered => {}
            _ => return "...".to_string(),
        }
        let out = self.print_data(ty);
        self.guard.leave(ty);
        out
    }

    fn def_name(&self, def_id: crate::def::DefId) -> String {
        self.resolver
            .def_name(def_id)
            .map_or_else(|| "any".to_string(), |name| self.atom(name))
    }

    fn list(&mut self, list: TypeListId) -> Vec<String> {
        let members = self.interner.type_list(list);
        members.iter().map(|&m| self.print(m)).collect()
    }

    /// Print a union or intersection member, parenthesizing function types.
    fn member(&mut self, ty: TypeId) -> String {
        let text = self.print(ty);
        match self.interner.lookup(ty) {
            Some(TypeData::Function(_) | TypeData::Union(_) | TypeData::Intersection(_)) => {
                format!("({text})")
            }
            _ => text,
        }
    }

    fn print_data(&mut self, ty: TypeId) -> String {
        let Some(data) = self.interner.lookup(ty) else {
            return "any".to_string();
        };
        match data {
            TypeData::Intrinsic(kind) => kind.name().to_string(),
            TypeData::Literal(lit) => self.literal(lit),
            TypeData::Object(shape_id) => {
                let shape = self.interner.object_shape(shape_id);
                self.object(&shape)
            }
            TypeData::Union(list) => {
                let members = self.interner.declared_members(ty, list);
                members
                    .iter()
                    .map(|&m| self.member(m))
                    .collect::<Vec<_>>()
                    .join(" | ")
            }
            TypeData::Intersection(list) => {
                let members = self.interner.declared_members(ty, list);
                members
                    .iter()
                    .map(|&m| self.member(m))
                    .collect::<Vec<_>>()
                    .join(" & ")
            }
            TypeData::Array { element, readonly } => {
                let element = self.print(element);
                if readonly {
                    format!("$ReadOnlyArray<{element}>")
                } else {
                    format!("Array<{element}>")
                }
            }
            TypeData::Tuple(list) => format!("[{}]", self.list(list).join(", ")),
            TypeData::Function(shape_id) => {
                let shape = self.interner.function_shape(shape_id);
                self.function(&shape)
            }
            TypeData::TypeParameter(info) | TypeData::Infer(info) => self.atom(info.name),
            TypeData::Application(app_id) => {
                let app = self.interner.type_application(app_id);
                let base = self.print(app.base);
                let args: Vec<String> = app.args.iter().map(|&a| self.print(a)).collect();
                format!("{base}<{}>", args.join(", "))
            }
            TypeData::Lazy(def_id) | TypeData::Opaque(def_id) | TypeData::Instance(def_id) => {
                self.def_name(def_id)
            }
            TypeData::Class(def_id) => format!("Class<{}>", self.def_name(def_id)),
            TypeData::Mapped(mapped_id) => {
                let mapped = self.interner.mapped_type(mapped_id);
                self.mapped(&mapped)
            }
            TypeData::KeyOf(inner) => format!("$Keys<{}>", self.print(inner)),
            TypeData::IndexAccess(object, index) => {
                format!("{}[{}]", self.print(object), self.print(index))
            }
            TypeData::Conditional(cond_id) => {
                let cond = self.interner.conditional_type(cond_id);
                format!(
                    "{} extends {} ? {} : {}",
                    self.print(cond.check_type),
                    self.print(cond.extends_type),
                    self.print(cond.true_type),
                    self.print(cond.false_type)
                )
            }
            TypeData::Iterator(it) => format!(
                "$Iterator<{}, {}, {}>",
                self.print(it.yield_type),
                self.print(it.return_type),
                self.print(it.next_type)
            ),
            TypeData::Component(c) => format!(
                "React.AbstractComponent<{}, {}, {}>",
                self.print(c.config),
                self.print(c.instance),
                self.print(c.renders)
            ),
            TypeData::Element(component) => format!("React.Element<{}>", self.print(component)),
            TypeData::Builtin(kind, list) => {
                format!("{}<{}>", kind.name(), self.list(list).join(", "))
            }
            TypeData::Spread(list, exact) => {
                let operands: Vec<String> =
                    self.list(list).into_iter().map(|o| format!("...{o}")).collect();
                if exact {
                    format!("{{|{}|}}", operands.join(", "))
                } else {
                    format!("{{{}}}", operands.join(", "))
                }
            }
            TypeData::ReadOnly { inner, deep } => {
                let inner = self.print(inner);
                if deep {
                    format!("$ReactDeepReadOnly<{inner}>")
                } else {
                    format!("$ReadOnly<{inner}>")
                }
            }
            TypeData::Diff(left, right) => {
                format!("$Diff<{}, {}>", self.print(left), self.print(right))
            }
        }
    }

    fn literal(&self, lit: LiteralValue) -> String {
        match lit {
            LiteralValue::String(atom) => format!("'{}'", self.atom(atom)),
            LiteralValue::Number(bits) => format_number(bits.value()),
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::BigInt(atom) => format!("{}n", self.atom(atom)),
        }
    }

    fn object(&mut self, shape: &ObjectShape) -> String {
        let mut fields = Vec::with_capacity(shape.properties.len() + 1);
        for prop in &shape.properties {
            let optional = if prop.optional { "?" } else { "" };
            let name = self.atom(prop.name);
            let value = self.print(prop.type_id);
            fields.push(format!("{}{name}{optional}: {value}", prop.variance.sigil()));
        }
        if let Some(indexer) = &shape.indexer {
            let key = self.print(indexer.key_type);
            let value = self.print(indexer.value_type);
            fields.push(format!("{}[key: {key}]: {value}", indexer.variance.sigil()));
        }

        if shape.exact {
            format!("{{|{}|}}", fields.join(", "))
        } else if fields.is_empty() {
            "{...}".to_string()
        } else {
            format!("{{{}, ...}}", fields.join(", "))
        }
    }

    fn function(&mut self, shape: &FunctionShape) -> String {
        let mut out = String::new();
        if !shape.type_params.is_empty() {
            let params: Vec<String> = shape
                .type_params
                .iter()
                .map(|p| self.type_param(p))
                .collect();
            out.push('<');
            out.push_str(&params.join(", "));
            out.push('>');
        }

        let params: Vec<String> = shape
            .params
            .iter()
            .map(|p| {
                let ty = self.print(p.type_id);
                let rest = if p.rest { "..." } else { "" };
                let optional = if p.optional { "?" } else { "" };
                match p.name {
                    Some(name) => format!("{rest}{}{optional}: {ty}", self.atom(name)),
                    None => format!("{rest}{ty}"),
                }
            })
            .collect();
        out.push('(');
        out.push_str(&params.join(", "));
        out.push_str(") => ");

        match &shape.predicate {
            Some(pred) => {
                let name = shape
                    .params
                    .get(pred.param_index as usize)
                    .and_then(|p| p.name)
                    .map_or_else(|| "x".to_string(), |n| self.atom(n));
                let guarded = self.print(pred.type_id);
                out.push_str(&format!("{name} is {guarded}"));
            }
            None => out.push_str(&self.print(shape.return_type)),
        }
        out
    }

    fn type_param(&mut self, param: &TypeParamInfo) -> String {
        let mut out = self.atom(param.name);
        if let Some(bound) = param.bound {
            out.push_str(": ");
            out.push_str(&self.print(bound));
        }
        if let Some(default) = param.default {
            out.push_str(" = ");
            out.push_str(&self.print(default));
        }
        out
    }

    fn mapped(&mut self, mapped: &MappedType) -> String {
        let key = self.atom(mapped.key_param.name);
        let source = match mapped.source {
            KeySource::KeyOf(object) => format!("keyof {}", self.print(object)),
            KeySource::Keys(keys) => self.print(keys),
        };
        let variance = mapped.variance.map_or("", Variance::sigil);
        let optional = match mapped.optional {
            Some(MappedModifier::Add) => "?",
            Some(MappedModifier::Remove) => "-?",
            None => "",
        };
        let template = self.print(mapped.template);
        format!("{{{variance}[{key} in {source}]{optional}: {template}}}")
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
