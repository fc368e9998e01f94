//! Annotation lowering: `flint_ast::TypeNode` to interned types.
//!
//! Lowering is a pure translation. Names are resolved through a
//! [`TypeScope`] provided by the caller; type parameters bound inside the
//! annotation (generic function types, mapped keys, `infer`) are tracked
//! here.
//!
//! Only structurally invalid annotations fail (`MalformedAnnotation`).
//! Recoverable problems (unknown names, type argument arity) are recorded in
//! [`TypeLowering::errors`] and lowered to the recovery type. Bound checks
//! on type arguments need a subtype checker and are handed back as
//! [`PendingBoundCheck`]s.

use crate::component::abstract_component;
use crate::errors::{ArityKind, ArityTarget, CheckError, CheckResult};
use crate::intern::TypeInterner;
use crate::iterators::iterable_of;
use crate::types::*;
use flint_ast::{
    FunctionTypeNode, Keyword, MappedTypeNode, ObjectMember, OptionalModifier, TypeNode,
    TypeNodeKind, TypeParamNode, VarianceAnnotation,
};
use flint_common::Span;
use tracing::trace;

/// A named type visible at the annotation site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedType {
    /// `Lazy`, `Instance` or `Opaque` reference, or any concrete type.
    pub base: TypeId,
    pub params: Vec<TypeParamInfo>,
}

impl NamedType {
    pub fn plain(base: TypeId) -> Self {
        Self {
            base,
            params: Vec::new(),
        }
    }
}

/// Name resolution for lowering.
pub trait TypeScope {
    fn lookup_type(&self, name: &str) -> Option<NamedType>;

    /// Type of a value binding, for `typeof x`.
    fn value_type(&self, name: &str) -> Option<TypeId>;
}

/// Scope with no names; only built-ins resolve.
pub struct EmptyScope;

impl TypeScope for EmptyScope {
    fn lookup_type(&self, _name: &str) -> Option<NamedType> {
        None
    }

    fn value_type(&self, _name: &str) -> Option<TypeId> {
        None
    }
}

/// Type arguments whose bounds still need checking.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingBoundCheck {
    pub span: Span,
    pub name: String,
    pub params: Vec<TypeParamInfo>,
    pub args: Vec<TypeId>,
}

pub struct TypeLowering<'a, S: TypeScope + ?Sized> {
    interner: &'a TypeInterner,
    scope: &'a S,
    type_params: Vec<Vec<(String, TypeId)>>,
    /// `infer` names collected while lowering an `extends` clause.
    infer_frames: Vec<Vec<(String, TypeId)>>,
    allow_placeholder: bool,
    /// Every lowered node with a real span, innermost last.
    pub spans: Vec<(Span, TypeId)>,
    pub errors: Vec<(Span, CheckError)>,
    pub bound_checks: Vec<PendingBoundCheck>,
}

impl<'a, S: TypeScope + ?Sized> TypeLowering<'a, S> {
    pub fn new(interner: &'a TypeInterner, scope: &'a S) -> Self {
        Self {
            interner,
            scope,
            type_params: Vec::new(),
            infer_frames: Vec::new(),
            allow_placeholder: false,
            spans: Vec::new(),
            errors: Vec::new(),
            bound_checks: Vec::new(),
        }
    }

    pub fn interner(&self) -> &'a TypeInterner {
        self.interner
    }

    /// Lower one annotation.
    pub fn lower(&mut self, node: &TypeNode) -> CheckResult<TypeId> {
        let ty = self.lower_kind(node)?;
        if !node.span.is_dummy() {
            self.spans.push((node.span, ty));
        }
        Ok(ty)
    }

    /// Lower explicit call-site type arguments; `_` becomes `TypeId::NONE`.
    pub fn lower_type_args(&mut self, args: &[TypeNode]) -> CheckResult<Vec<TypeId>> {
        let saved = std::mem::replace(&mut self.allow_placeholder, true);
        let result = args.iter().map(|arg| self.lower(arg)).collect();
        self.allow_placeholder = saved;
        result
    }

    /// Declare type parameters in a new frame. Later parameters may refer
    /// to earlier ones in their bounds and defaults.
    pub fn push_type_params(&mut self, params: &[TypeParamNode]) -> CheckResult<Vec<TypeParamInfo>> {
        self.type_params.push(Vec::new());
        let mut infos = Vec::with_capacity(params.len());
        for param in params {
            if infos
                .iter()
                .any(|p: &TypeParamInfo| self.interner.resolve_atom_ref(p.name).as_ref() == param.name)
            {
                return Err(malformed(format!("duplicate type parameter `{}`", param.name)));
            }
            let bound = param.bound.as_ref().map(|b| self.lower(b)).transpose()?;
            let default = param.default.as_ref().map(|d| self.lower(d)).transpose()?;
            let info = TypeParamInfo {
                name: self.interner.intern_string(&param.name),
                bound,
                default,
            };
            let ty = self.interner.type_param(info.clone());
            if let Some(frame) = self.type_params.last_mut() {
                frame.push((param.name.clone(), ty));
            }
            infos.push(info);
        }
        Ok(infos)
    }

    pub fn pop_type_params(&mut self) {
        self.type_params.pop();
    }

    fn local_type(&self, name: &str) -> Option<TypeId> {
        self.infer_frames
            .iter()
            .rev()
            .chain(self.type_params.iter().rev())
            .find_map(|frame| frame.iter().rev().find(|(n, _)| n == name).map(|(_, ty)| *ty))
    }

    fn lower_kind(&mut self, node: &TypeNode) -> CheckResult<TypeId> {
        let interner = self.interner;
        Ok(match &node.kind {
            TypeNodeKind::Keyword { keyword } => keyword_type(*keyword),
            TypeNodeKind::StringLiteral { value } => interner.literal_string(value),
            TypeNodeKind::NumberLiteral { value } => interner.literal_number(*value),
            TypeNodeKind::BooleanLiteral { value } => interner.literal_boolean(*value),
            TypeNodeKind::Reference { name, args } => self.lower_reference(node.span, name, args)?,
            TypeNodeKind::Object { exact, members } => self.lower_object(*exact, members)?,
            TypeNodeKind::Union { members } => {
                let members = self.lower_all(members)?;
                interner.union(members)
            }
            TypeNodeKind::Intersection { members } => {
                let members = self.lower_all(members)?;
                interner.intersection(members)
            }
            TypeNodeKind::Nullable { inner } => {
                let inner = self.lower(inner)?;
                interner.union(vec![TypeId::NULL, TypeId::VOID, inner])
            }
            TypeNodeKind::Array { element } => {
                let element = self.lower(element)?;
                interner.array(element)
            }
            TypeNodeKind::Tuple { elements } => {
                let elements = self.lower_all(elements)?;
                interner.tuple(elements)
            }
            TypeNodeKind::Function(func) => self.lower_function(func)?,
            TypeNodeKind::Typeof { name } => match self.scope.value_type(name) {
                Some(ty) => ty,
                None => self.unresolved(node.span, name),
            },
            TypeNodeKind::KeyOf { inner } => {
                let inner = self.lower(inner)?;
                interner.keyof(inner)
            }
            TypeNodeKind::IndexedAccess { object, index } => {
                let object = self.lower(object)?;
                let index = self.lower(index)?;
                interner.index_access(object, index)
            }
            TypeNodeKind::Mapped(mapped) => self.lower_mapped(mapped)?,
            TypeNodeKind::Conditional {
                check,
                extends,
                true_type,
                false_type,
            } => {
                let check_type = self.lower(check)?;
                self.infer_frames.push(Vec::new());
                let extends_type = self.lower(extends);
                let infer_frame = self.infer_frames.pop().unwrap_or_default();
                let extends_type = extends_type?;
                // `infer` names are visible in the true branch only.
                self.type_params.push(infer_frame);
                let true_type = self.lower(true_type);
                self.type_params.pop();
                let true_type = true_type?;
                let false_type = self.lower(false_type)?;
                interner.conditional(ConditionalType {
                    check_type,
                    extends_type,
                    true_type,
                    false_type,
                })
            }
            TypeNodeKind::Infer { name } => {
                let Some(frame) = self.infer_frames.last_mut() else {
                    return Err(malformed(format!(
                        "`infer {name}` outside of a conditional type's extends clause"
                    )));
                };
                if let Some((_, ty)) = frame.iter().find(|(n, _)| n == name) {
                    *ty
                } else {
                    let ty = interner.infer(TypeParamInfo::new(interner.intern_string(name)));
                    frame.push((name.clone(), ty));
                    ty
                }
            }
            TypeNodeKind::Placeholder => {
                if !self.allow_placeholder {
                    return Err(malformed("`_` is only allowed as a type argument".to_string()));
                }
                TypeId::NONE
            }
        })
    }

    fn lower_all(&mut self, nodes: &[TypeNode]) -> CheckResult<Vec<TypeId>> {
        nodes.iter().map(|node| self.lower(node)).collect()
    }

    fn unresolved(&mut self, span: Span, name: &str) -> TypeId {
        trace!(name, "lower: unresolved name");
        self.errors.push((
            span,
            CheckError::UnresolvedName {
                name: self.interner.intern_string(name),
            },
        ));
        TypeId::ERROR
    }

    fn arity_error(&mut self, span: Span, name: &str, expected: usize, got: usize) -> TypeId {
        let kind = if got > expected {
            ArityKind::TooMany
        } else {
            ArityKind::TooFew
        };
        self.errors.push((
            span,
            CheckError::Arity {
                name: name.to_string(),
                expected,
                got,
                kind,
                target: ArityTarget::TypeArguments,
            },
        ));
        TypeId::ERROR
    }

    fn lower_reference(&mut self, span: Span, name: &str, arg_nodes: &[TypeNode]) -> CheckResult<TypeId> {
        if let Some(ty) = self.local_type(name) {
            if !arg_nodes.is_empty() {
                return Ok(self.arity_error(span, name, 0, arg_nodes.len()));
            }
            return Ok(ty);
        }

        let args = self.lower_all(arg_nodes)?;
        if let Some(ty) = self.lower_builtin(span, name, &args)? {
            return Ok(ty);
        }

        let Some(named) = self.scope.lookup_type(name) else {
            return Ok(self.unresolved(span, name));
        };
        if args.is_empty() {
            if named.params.is_empty() {
                return Ok(named.base);
            }
            let filled = crate::generics::fill_type_arguments(self.interner, &named.params, &[]);
            return Ok(self.interner.application(named.base, filled));
        }
        if args.len() > named.params.len() {
            return Ok(self.arity_error(span, name, named.params.len(), args.len()));
        }
        let filled = crate::generics::fill_type_arguments(self.interner, &named.params, &args);
        self.bound_checks.push(PendingBoundCheck {
            span,
            name: name.to_string(),
            params: named.params.clone(),
            args: args.clone(),
        });
        Ok(self.interner.application(named.base, filled))
    }

    /// Built-in generic types; `None` when `name` is not one.
    fn lower_builtin(&mut self, span: Span, name: &str, args: &[TypeId]) -> CheckResult<Option<TypeId>> {
        let interner = self.interner;
        let arg = |i: usize, default: TypeId| args.get(i).copied().unwrap_or(default);
        let (min, max) = match name {
            "Array" | "$ReadOnlyArray" | "Set" | "Promise" | "Iterable" | "$Iterable"
            | "$ReadOnly" | "$ReactDeepReadOnly" | "$Keys" | "$Values" | "Class" => (1, 1),
            "Map" | "$Diff" | "$Rest" => (2, 2),
            "Iterator" | "$Iterator" | "Generator" => (1, 3),
            "React.Element" | "React$Element" => (0, 1),
            "React.AbstractComponent" | "React$AbstractComponent" => {
                return Ok(Some(match abstract_component(interner, args) {
                    Ok(ty) => ty,
                    Err(err) => {
                        self.errors.push((span, err));
                        TypeId::ERROR
                    }
                }));
            }
            "React.Node" | "React$Node" if args.is_empty() => return Ok(Some(TypeId::REACT_NODE)),
            _ => return Ok(None),
        };
        if args.len() < min || args.len() > max {
            let expected = if args.len() > max { max } else { min };
            return Ok(Some(self.arity_error(span, name, expected, args.len())));
        }
        Ok(Some(match name {
            "Array" => interner.array(args[0]),
            "$ReadOnlyArray" => interner.readonly_array(args[0]),
            "Set" => interner.builtin(BuiltinKind::Set, args.to_vec()),
            "Map" => interner.builtin(BuiltinKind::Map, args.to_vec()),
            "Promise" => interner.promise(args[0]),
            "Iterable" | "$Iterable" => iterable_of(interner, args[0]),
            "Iterator" | "$Iterator" | "Generator" => {
                interner.iterator(args[0], arg(1, TypeId::VOID), arg(2, TypeId::VOID))
            }
            "$ReadOnly" => interner.readonly(args[0], false),
            "$ReactDeepReadOnly" => interner.readonly(args[0], true),
            "$Keys" => interner.keyof(args[0]),
            "$Values" => interner.index_access(args[0], interner.keyof(args[0])),
            "$Diff" | "$Rest" => interner.diff(args[0], args[1]),
            "Class" => match interner.lookup(args[0]) {
                Some(TypeData::Instance(def_id)) => interner.class(def_id),
                _ => return Err(malformed("`Class` expects a class instance type".to_string())),
            },
            _ => interner.element(arg(0, TypeId::ANY)),
        }))
    }

    fn lower_object(&mut self, exact: bool, members: &[ObjectMember]) -> CheckResult<TypeId> {
        let interner = self.interner;
        let mut operands = Vec::new();
        let mut current = ObjectShape {
            properties: Vec::new(),
            indexer: None,
            exact,
        };
        let mut has_spread = false;

        for member in members {
            match member {
                ObjectMember::Property {
                    name,
                    value,
                    optional,
                    variance,
                    method,
                    span,
                } => {
                    let type_id = self.lower(value)?;
                    let name_atom = interner.intern_string(name);
                    if current.has_key(name_atom) {
                        return Err(malformed(format!("duplicate property `{name}`")));
                    }
                    let variance = if *method {
                        Variance::ReadOnly
                    } else {
                        lower_variance(*variance)
                    };
                    if !span.is_dummy() {
                        self.spans.push((*span, type_id));
                    }
                    current.properties.push(PropertyInfo {
                        name: name_atom,
                        type_id,
                        optional: *optional,
                        variance,
                        is_method: *method,
                    });
                }
                ObjectMember::Indexer {
                    key,
                    value,
                    variance,
                } => {
                    if current.indexer.is_some() {
                        return Err(malformed("an object type may have one indexer".to_string()));
                    }
                    current.indexer = Some(IndexSignature {
                        key_type: self.lower(key)?,
                        value_type: self.lower(value)?,
                        variance: lower_variance(*variance),
                    });
                }
                ObjectMember::Spread { argument } => {
                    has_spread = true;
                    if !current.properties.is_empty() || current.indexer.is_some() {
                        let shape = std::mem::replace(
                            &mut current,
                            ObjectShape {
                                properties: Vec::new(),
                                indexer: None,
                                exact,
                            },
                        );
                        operands.push(interner.object_with_shape(shape));
                    }
                    operands.push(self.lower(argument)?);
                }
            }
        }

        if !has_spread {
            return Ok(interner.object_with_shape(current));
        }
        if !current.properties.is_empty() || current.indexer.is_some() {
            operands.push(interner.object_with_shape(current));
        }
        Ok(interner.spread(operands, exact))
    }

    fn lower_function(&mut self, func: &FunctionTypeNode) -> CheckResult<TypeId> {
        let type_params = match self.push_type_params(&func.type_params) {
            Ok(params) => params,
            Err(err) => {
                self.pop_type_params();
                return Err(err);
            }
        };
        let result = self.lower_signature(func, type_params);
        self.pop_type_params();
        Ok(self.interner.function(result?))
    }

    fn lower_signature(
        &mut self,
        func: &FunctionTypeNode,
        type_params: Vec<TypeParamInfo>,
    ) -> CheckResult<FunctionShape> {
        let interner = self.interner;
        let mut params = Vec::with_capacity(func.params.len() + 1);
        let mut seen_optional = false;
        for param in &func.params {
            if seen_optional && !param.optional {
                return Err(malformed(
                    "a required parameter cannot follow an optional one".to_string(),
                ));
            }
            seen_optional |= param.optional;
            params.push(ParamInfo {
                name: param.name.as_deref().map(|n| interner.intern_string(n)),
                type_id: self.lower(&param.annotation)?,
                optional: param.optional,
                rest: false,
            });
        }
        if let Some(rest) = &func.rest {
            let type_id = self.lower(&rest.annotation)?;
            params.push(ParamInfo {
                name: rest.name.as_deref().map(|n| interner.intern_string(n)),
                type_id,
                optional: false,
                rest: true,
            });
        }
        let return_type = self.lower(&func.ret)?;
        let predicate = match &func.guard {
            Some(guard) => {
                let Some(index) = func
                    .params
                    .iter()
                    .position(|p| p.name.as_deref() == Some(guard.param.as_str()))
                else {
                    return Err(malformed(format!(
                        "type guard refers to unknown parameter `{}`",
                        guard.param
                    )));
                };
                Some(TypePredicate {
                    param_index: index as u32,
                    type_id: self.lower(&guard.annotation)?,
                })
            }
            None => None,
        };
        Ok(FunctionShape {
            type_params,
            params,
            return_type: if predicate.is_some() {
                TypeId::BOOLEAN
            } else {
                return_type
            },
            predicate,
        })
    }

    fn lower_mapped(&mut self, mapped: &MappedTypeNode) -> CheckResult<TypeId> {
        let interner = self.interner;
        let source = match &mapped.source.kind {
            TypeNodeKind::KeyOf { inner } => KeySource::KeyOf(self.lower(inner)?),
            _ => KeySource::Keys(self.lower(&mapped.source)?),
        };
        let key_param = TypeParamInfo {
            name: interner.intern_string(&mapped.key),
            bound: None,
            default: None,
        };
        let key_ty = interner.type_param(key_param.clone());
        self.type_params.push(vec![(mapped.key.clone(), key_ty)]);
        let template = self.lower(&mapped.value);
        self.type_params.pop();
        let template = template?;

        let optional = mapped.optional.map(|m| match m {
            OptionalModifier::Add => MappedModifier::Add,
            OptionalModifier::Remove => MappedModifier::Remove,
        });
        let variance = match mapped.variance {
            VarianceAnnotation::None => None,
            other => Some(lower_variance(other)),
        };
        Ok(interner.mapped(MappedType {
            key_param,
            source,
            template,
            optional,
            variance,
        }))
    }
}

pub const fn keyword_type(keyword: Keyword) -> TypeId {
    match keyword {
        Keyword::Number => TypeId::NUMBER,
        Keyword::String => TypeId::STRING,
        Keyword::Boolean => TypeId::BOOLEAN,
        Keyword::Bigint => TypeId::BIGINT,
        Keyword::Symbol => TypeId::SYMBOL,
        Keyword::Void => TypeId::VOID,
        Keyword::Null => TypeId::NULL,
        Keyword::Mixed => TypeId::UNKNOWN,
        Keyword::Empty => TypeId::NEVER,
        Keyword::Any => TypeId::ANY,
    }
}

pub const fn lower_variance(variance: VarianceAnnotation) -> Variance {
    match variance {
        VarianceAnnotation::None => Variance::ReadWrite,
        VarianceAnnotation::Plus => Variance::ReadOnly,
        VarianceAnnotation::Minus => Variance::WriteOnly,
    }
}

fn malformed(reason: String) -> CheckError {
    CheckError::MalformedAnnotation { reason }
}

/// Lower `node` with no surrounding names.
pub fn lower_annotation(interner: &TypeInterner, node: &TypeNode) -> CheckResult<TypeId> {
    TypeLowering::new(interner, &EmptyScope).lower(node)
}

#[cfg(test)]
#[path = "../tests/lower_tests.rs"]
mod tests;
