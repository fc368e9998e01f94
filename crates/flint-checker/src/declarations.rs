//! Hoisted declarations and module signatures.
//!
//! Every block is hoisted before its statements are checked, in phases:
//!
//! 1. imports
//! 2. type definitions (aliases, opaque types, classes) are registered so
//!    that definitions may refer to each other in any order
//! 3. type parameters of those definitions
//! 4. value bindings: functions, components, classes, `declare`s and
//!    placeholders for `let` / `const` / `var`
//! 5. definition bodies and class shapes
//!
//! Function and component bodies are checked later, at their position in
//! the statement list.

use crate::scope::{BindingFlags, LoweringScope};
use crate::session::{ImportedModule, ModuleSignature};
use crate::state::CheckerState;
use flint_ast::{
    ClassDecl, ClassMember, ComponentDecl, Expr, ExprKind, Function, ImportDecl, ImportKind,
    ObjectProp, OpaqueTypeDecl, RendersKind, Stmt, StmtKind, TypeAlias, TypeNode, TypeNodeKind,
    TypeParamNode,
};
use flint_common::Atom;
use flint_solver::component::{RendersMode, props_with_defaults, renders_type};
use flint_solver::lower::lower_variance;
use flint_solver::{
    CheckError, CheckResult, ComponentType, DefId, DefinitionInfo, FunctionShape, NamedType,
    ParamInfo, PropertyAccess, PropertyInfo, TypeData, TypeEvaluator, TypeId, TypeLowering,
    TypeParamInfo,
};
use tracing::{debug, trace};

/// Base classes that make a class a React class component.
const REACT_COMPONENT_BASES: &[&str] = &[
    "React.Component",
    "React.PureComponent",
    "React$Component",
    "React$PureComponent",
];

/// Exports recorded while statements are checked.
#[derive(Clone, Debug, Default)]
pub(crate) struct ExportTable {
    pub default: Option<TypeId>,
}

#[derive(Copy, Clone)]
enum PendingDef<'s> {
    Alias(DefId, &'s TypeAlias),
    Opaque(DefId, &'s OpaqueTypeDecl),
    Class(DefId, &'s ClassDecl),
}

impl PendingDef<'_> {
    fn def_id(self) -> DefId {
        match self {
            Self::Alias(id, _) | Self::Opaque(id, _) | Self::Class(id, _) => id,
        }
    }
}

/// The statement an `export` wraps, or the statement itself.
pub(crate) fn unwrap_export(stmt: &Stmt) -> &Stmt {
    match &stmt.kind {
        StmtKind::Export { declaration } => declaration,
        _ => stmt,
    }
}

pub(crate) fn is_react_component_base(node: &TypeNode) -> bool {
    matches!(&node.kind, TypeNodeKind::Reference { name, .. } if REACT_COMPONENT_BASES.contains(&name.as_str()))
}

impl<'a> CheckerState<'a> {
    pub(crate) fn atom(&self, s: &str) -> Atom {
        self.ctx.interner.intern_string(s)
    }

    /// Hoist the declarations of one block.
    pub(crate) fn hoist_declarations(&mut self, body: &[Stmt]) -> CheckResult<()> {
        let decls: Vec<&Stmt> = body.iter().map(unwrap_export).collect();

        for stmt in &decls {
            if let StmtKind::Import(import) = &stmt.kind {
                self.declare_import(import, stmt);
            }
        }

        let mut pending = Vec::new();
        for stmt in &decls {
            if let Some(def) = self.register_definition(stmt) {
                pending.push(def);
            }
        }
        for &def in &pending {
            self.declare_definition_params(def)?;
        }

        for stmt in &decls {
            self.declare_value(stmt)?;
        }

        for &def in &pending {
            self.define_body(def)?;
        }
        Ok(())
    }

    // =========================================================================
    // Imports
    // =========================================================================

    fn declare_import(&mut self, import: &ImportDecl, stmt: &Stmt) {
        let declared_only = self.ctx.options.whole_program() || self.signature_only;
        let signature = match self.ctx.provider.resolve(&import.source, declared_only) {
            ImportedModule::Signature(signature) => Some(signature),
            ImportedModule::Untyped => None,
            ImportedModule::Missing => {
                let name = self.atom(&import.source);
                self.error(stmt.span, CheckError::UnresolvedName { name });
                self.declare_import_fallback(import, TypeId::ERROR);
                return;
            }
        };
        let Some(signature) = signature else {
            trace!(source = %import.source, "untyped module import");
            self.declare_import_fallback(import, TypeId::ANY);
            return;
        };

        let flags = BindingFlags::IMPORT | BindingFlags::ANNOTATED;
        match &import.kind {
            ImportKind::Named { specifiers } => {
                for spec in specifiers {
                    let ty = signature.types.get(&spec.imported).cloned();
                    let value = signature.values.get(&spec.imported).copied();
                    if ty.is_none() && (import.type_only || value.is_none()) {
                        let name = self.atom(&spec.imported);
                        self.error(spec.local.span, CheckError::UnresolvedName { name });
                        if !import.type_only {
                            self.scopes.declare(&spec.local.name, flags, TypeId::ERROR, spec.local.span);
                        }
                        continue;
                    }
                    if let Some(named) = ty {
                        self.scopes.declare_type(&spec.local.name, named);
                    }
                    if !import.type_only
                        && let Some(value) = value
                    {
                        self.scopes.declare(&spec.local.name, flags, value, spec.local.span);
                        self.record_type(spec.local.span, value);
                    }
                }
            }
            ImportKind::Default { local } => {
                let ty = match signature.default {
                    Some(ty) => ty,
                    None => {
                        let name = self.atom("default");
                        self.error(local.span, CheckError::UnresolvedName { name });
                        TypeId::ERROR
                    }
                };
                self.scopes.declare(&local.name, flags, ty, local.span);
                self.record_type(local.span, ty);
            }
            ImportKind::Namespace { local } => {
                let ty = self.namespace_object(&signature);
                for (name, named) in &signature.types {
                    self.scopes
                        .declare_type(&format!("{}.{name}", local.name), named.clone());
                }
                let flags = BindingFlags::NAMESPACE_IMPORT | BindingFlags::ANNOTATED;
                self.scopes.declare(&local.name, flags, ty, local.span);
                self.record_type(local.span, ty);
            }
        }
    }

    fn declare_import_fallback(&mut self, import: &ImportDecl, ty: TypeId) {
        let flags = BindingFlags::IMPORT | BindingFlags::ANNOTATED;
        match &import.kind {
            ImportKind::Named { specifiers } => {
                for spec in specifiers {
                    self.scopes
                        .declare_type(&spec.local.name, NamedType::plain(ty));
                    if !import.type_only {
                        self.scopes.declare(&spec.local.name, flags, ty, spec.local.span);
                    }
                }
            }
            ImportKind::Default { local } => {
                self.scopes.declare(&local.name, flags, ty, local.span);
            }
            ImportKind::Namespace { local } => {
                let flags = BindingFlags::NAMESPACE_IMPORT | BindingFlags::ANNOTATED;
                self.scopes.declare(&local.name, flags, ty, local.span);
            }
        }
    }

    /// `import * as ns`: an exact object of the module's read-only values.
    fn namespace_object(&self, signature: &ModuleSignature) -> TypeId {
        let interner = self.ctx.interner;
        let mut props: Vec<PropertyInfo> = signature
            .values
            .iter()
            .map(|(name, &ty)| PropertyInfo::readonly(interner.intern_string(name), ty))
            .collect();
        if let Some(default) = signature.default {
            props.push(PropertyInfo::readonly(interner.intern_string("default"), default));
        }
        interner.object(props)
    }

    // =========================================================================
    // Type definitions
    // =========================================================================

    fn register_definition<'s>(&mut self, stmt: &'s Stmt) -> Option<PendingDef<'s>> {
        let module = self.ctx.module;
        let (def, name) = match &stmt.kind {
            StmtKind::TypeAlias(alias) => {
                let info = DefinitionInfo::type_alias(self.atom(&alias.name.name), module, Vec::new());
                (PendingDef::Alias(self.ctx.defs.register(info), alias), &alias.name)
            }
            StmtKind::OpaqueType(opaque) => {
                let info = DefinitionInfo::opaque(self.atom(&opaque.name.name), module, Vec::new());
                (PendingDef::Opaque(self.ctx.defs.register(info), opaque), &opaque.name)
            }
            StmtKind::ClassDecl(class) => {
                let info = DefinitionInfo::class(self.atom(&class.name.name), module, Vec::new());
                (PendingDef::Class(self.ctx.defs.register(info), class), &class.name)
            }
            _ => return None,
        };
        let base = self.definition_base(def);
        trace!(name = %name.name, def_id = def.def_id().0, "register definition");
        self.scopes.declare_type(&name.name, NamedType::plain(base));
        Some(def)
    }

    fn definition_base(&self, def: PendingDef<'_>) -> TypeId {
        let interner = self.ctx.interner;
        match def {
            PendingDef::Alias(id, _) => interner.lazy(id),
            PendingDef::Opaque(id, _) => interner.opaque(id),
            PendingDef::Class(id, _) => interner.instance(id),
        }
    }

    fn declare_definition_params(&mut self, def: PendingDef<'_>) -> CheckResult<()> {
        let (params, name) = match def {
            PendingDef::Alias(_, alias) => (&alias.type_params, &alias.name.name),
            PendingDef::Opaque(_, opaque) => (&opaque.type_params, &opaque.name.name),
            PendingDef::Class(_, class) => (&class.type_params, &class.name.name),
        };
        if params.is_empty() {
            return Ok(());
        }
        let infos = self.lower_type_params(params)?;
        self.ctx.defs.set_type_params(def.def_id(), infos.clone());
        let base = self.definition_base(def);
        self.scopes.declare_type(name, NamedType {
            base,
            params: infos,
        });
        Ok(())
    }

    /// Lower a type parameter list on its own.
    pub(crate) fn lower_type_params(&mut self, params: &[TypeParamNode]) -> CheckResult<Vec<TypeParamInfo>> {
        self.with_lowering(|lowering| {
            let infos = lowering.push_type_params(params);
            lowering.pop_type_params();
            infos
        })
    }

    /// Lower with `params` in scope; `f` also receives the lowered params.
    pub(crate) fn lower_with_params<T>(
        &mut self,
        params: &[TypeParamNode],
        f: impl FnOnce(&mut TypeLowering<'_, LoweringScope<'_>>, Vec<TypeParamInfo>) -> CheckResult<T>,
    ) -> CheckResult<T> {
        self.with_lowering(|lowering| {
            let result = lowering
                .push_type_params(params)
                .and_then(|infos| f(lowering, infos));
            lowering.pop_type_params();
            result
        })
    }

    /// Make lowered type parameters visible as types in the current scope.
    pub(crate) fn declare_type_params(&mut self, infos: &[TypeParamInfo]) {
        for info in infos {
            let name = self.ctx.interner.resolve_atom(info.name);
            let ty = self.ctx.interner.type_param(info.clone());
            self.scopes.declare_type(&name, NamedType::plain(ty));
        }
    }

    fn define_body(&mut self, def: PendingDef<'_>) -> CheckResult<()> {
        match def {
            PendingDef::Alias(id, alias) => {
                let body = self.lower_with_params(&alias.type_params, |lowering, _| {
                    lowering.lower(&alias.body)
                })?;
                self.ctx.defs.set_body(id, body);
            }
            PendingDef::Opaque(id, opaque) => {
                let (bound, body) = self.lower_with_params(&opaque.type_params, |lowering, _| {
                    let bound = opaque.bound.as_ref().map(|b| lowering.lower(b)).transpose()?;
                    let body = opaque.body.as_ref().map(|b| lowering.lower(b)).transpose()?;
                    Ok((bound, body))
                })?;
                if let Some(bound) = bound {
                    self.ctx.defs.set_bound(id, bound);
                }
                if let Some(body) = body {
                    if let Some(bound) = bound {
                        self.check_assignable(body, bound, opaque.name.span);
                    }
                    self.ctx.defs.set_body(id, body);
                }
            }
            PendingDef::Class(id, class) => self.define_class(id, class)?,
        }
        Ok(())
    }

    // =========================================================================
    // Classes
    // =========================================================================

    fn define_class(&mut self, id: DefId, class: &ClassDecl) -> CheckResult<()> {
        let interner = self.ctx.interner;
        let instance = interner.instance(id);
        let react = class.extends.as_ref().is_some_and(is_react_component_base);

        let (parent, react_props, mut props, mut statics, constructor) =
            self.lower_with_params(&class.type_params, |lowering, _| {
                let mut parent = None;
                let mut react_props = None;
                if let Some(extends) = &class.extends {
                    if react {
                        if let TypeNodeKind::Reference { args, .. } = &extends.kind {
                            react_props = args.first().map(|arg| lowering.lower(arg)).transpose()?;
                        }
                    } else {
                        parent = Some(lowering.lower(extends)?);
                    }
                }

                let mut props = Vec::new();
                let mut statics = Vec::new();
                let mut constructor = None;
                for member in &class.members {
                    match member {
                        ClassMember::Property {
                            name,
                            annotation,
                            is_static,
                            variance,
                            ..
                        } => {
                            let ty = match annotation {
                                Some(annotation) => lowering.lower(annotation)?,
                                None => TypeId::ANY,
                            };
                            let prop = PropertyInfo {
                                variance: lower_variance(*variance),
                                ..PropertyInfo::new(interner.intern_string(&name.name), ty)
                            };
                            if *is_static { statics.push(prop) } else { props.push(prop) }
                        }
                        ClassMember::Method { function, is_static } => {
                            let Some(name) = &function.name else { continue };
                            let ty = lowering.push_type_params(&function.type_params).and_then(|infos| {
                                let ty = lower_signature(lowering, function)?;
                                Ok(with_type_params(interner, ty, infos))
                            });
                            lowering.pop_type_params();
                            let ty = ty?;
                            if name.name == "constructor" && !*is_static {
                                constructor = Some(ty);
                                continue;
                            }
                            let prop = PropertyInfo::method(interner.intern_string(&name.name), ty);
                            if *is_static { statics.push(prop) } else { props.push(prop) }
                        }
                    }
                }
                Ok((parent, react_props, props, statics, constructor))
            })?;

        let mut parent_def = None;
        if let Some(parent) = parent {
            match interner.lookup(parent) {
                Some(TypeData::Instance(parent_id)) => {
                    parent_def = Some(parent_id);
                    props = self.inherit_members(interner.instance(parent_id), props);
                    if let Some(parent_statics) = self.ctx.defs.get(parent_id).and_then(|info| info.statics) {
                        statics = self.inherit_members(parent_statics, statics);
                    }
                }
                _ => debug!(class = %class.name.name, parent = parent.0, "superclass is not a class, ignored"),
            }
        }

        if let Some(react_props) = react_props {
            props.push(PropertyInfo::readonly(interner.intern_string("props"), react_props));
        }

        let statics_ty = interner.object(statics.clone());
        self.ctx.defs.set_body(id, interner.inexact_object(props));
        self.ctx.defs.set_class_info(id, parent_def, Some(statics_ty));

        let constructor = match constructor {
            Some(ctor) => with_return(interner, ctor, instance),
            None => parent_def
                .and_then(|parent_id| self.constructors.get(&parent_id).copied())
                .map_or_else(
                    || interner.function(FunctionShape::new(Vec::new(), instance)),
                    |ctor| with_return(interner, ctor, instance),
                ),
        };
        self.constructors.insert(id, constructor);

        if react {
            let component = self.react_class_component(class, instance, react_props, &statics)?;
            if let Some(binding) = self.scopes.lookup_local(&class.name.name) {
                self.scopes.binding_mut(binding).declared = component;
            }
        }
        Ok(())
    }

    /// `own` on top of the members of `parent`; own members win.
    fn inherit_members(&self, parent: TypeId, own: Vec<PropertyInfo>) -> Vec<PropertyInfo> {
        let view = self.view();
        let mut evaluator = TypeEvaluator::new(self.ctx.interner, &view);
        let Some(shape) = evaluator.resolve_object_shape(parent) else {
            return own;
        };
        let mut merged: Vec<PropertyInfo> = shape
            .properties
            .iter()
            .filter(|p| own.iter().all(|o| o.name != p.name))
            .cloned()
            .collect();
        merged.extend(own);
        merged
    }

    /// A class extending `React.Component<Props>` as a component type.
    fn react_class_component(
        &mut self,
        class: &ClassDecl,
        instance: TypeId,
        props: Option<TypeId>,
        statics: &[PropertyInfo],
    ) -> CheckResult<TypeId> {
        let interner = self.ctx.interner;
        let props = props.unwrap_or(TypeId::ANY);
        let default_props = self.atom("defaultProps");
        let render = self.atom("render");

        let mut config = props;
        if let Some(defaults) = self.static_default_props(class)
            .or_else(|| statics.iter().find(|p| p.name == default_props).map(|p| p.type_id))
        {
            let view = self.view();
            let mut evaluator = TypeEvaluator::new(interner, &view);
            config = props_with_defaults(&mut evaluator, props, defaults);
        }

        let view = self.view();
        let mut evaluator = TypeEvaluator::new(interner, &view);
        let renders = match evaluator.property_of(instance, render) {
            PropertyAccess::Found { type_id, .. } => match interner.lookup(evaluator.evaluate(type_id)) {
                Some(TypeData::Function(fn_id)) => interner.function_shape(fn_id).return_type,
                _ => TypeId::REACT_NODE,
            },
            PropertyAccess::Missing => TypeId::REACT_NODE,
        };
        let renders = if renders == TypeId::ANY { TypeId::REACT_NODE } else { renders };

        Ok(interner.component(ComponentType {
            props,
            instance,
            config,
            renders,
        }))
    }

    /// Keys of an unannotated `static defaultProps = {...}`.
    fn static_default_props(&self, class: &ClassDecl) -> Option<TypeId> {
        let interner = self.ctx.interner;
        class.members.iter().find_map(|member| match member {
            ClassMember::Property {
                name,
                annotation: None,
                value: Some(Expr { kind: ExprKind::Object { properties }, .. }),
                is_static: true,
                ..
            } if name.name == "defaultProps" => {
                let keys = properties
                    .iter()
                    .filter_map(|prop| match prop {
                        ObjectProp::Init { key, .. } => Some(key.as_str()),
                        ObjectProp::Shorthand { name } => Some(name.name.as_str()),
                        ObjectProp::Spread { .. } => None,
                    })
                    .map(|key| PropertyInfo::new(interner.intern_string(key), TypeId::ANY))
                    .collect();
                Some(interner.object(keys))
            }
            _ => None,
        })
    }

    // =========================================================================
    // Values
    // =========================================================================

    fn declare_value(&mut self, stmt: &Stmt) -> CheckResult<()> {
        match &stmt.kind {
            StmtKind::FunctionDecl(func) => {
                let Some(name) = &func.name else {
                    return Ok(());
                };
                let ty = self.function_signature(func)?;
                let mut flags = BindingFlags::FUNCTION;
                if func.ret.is_some() {
                    flags |= BindingFlags::ANNOTATED;
                }
                self.scopes.declare_hoisted(&name.name, flags, ty, name.span);
            }
            StmtKind::DeclareFunction { name, annotation } => {
                let ty = self.lower(annotation)?;
                let flags = BindingFlags::FUNCTION | BindingFlags::DECLARED | BindingFlags::ANNOTATED;
                self.scopes.declare_hoisted(&name.name, flags, ty, name.span);
                self.record_type(name.span, ty);
            }
            StmtKind::DeclareVar {
                kind,
                name,
                annotation,
            } => {
                let ty = self.lower(annotation)?;
                let flags = BindingFlags::from_var_kind(*kind) | BindingFlags::DECLARED | BindingFlags::ANNOTATED;
                self.scopes.declare_hoisted(&name.name, flags, ty, name.span);
                self.record_type(name.span, ty);
            }
            StmtKind::VarDecl(decl) => {
                let mut flags = BindingFlags::from_var_kind(decl.kind);
                let ty = match &decl.annotation {
                    Some(annotation) => {
                        flags |= BindingFlags::ANNOTATED;
                        self.lower(annotation)?
                    }
                    None => TypeId::ANY,
                };
                if flags.contains(BindingFlags::VAR) {
                    self.scopes.declare_hoisted(&decl.name.name, flags, ty, decl.name.span);
                } else {
                    self.scopes.declare(&decl.name.name, flags, ty, decl.name.span);
                }
            }
            StmtKind::Destructure(pattern) => {
                let flags = BindingFlags::from_var_kind(pattern.kind);
                for binding in pattern.bindings() {
                    if flags.contains(BindingFlags::VAR) {
                        self.scopes.declare_hoisted(&binding.name, flags, TypeId::ANY, binding.span);
                    } else {
                        self.scopes.declare(&binding.name, flags, TypeId::ANY, binding.span);
                    }
                }
            }
            StmtKind::ComponentDecl(component) => {
                let ty = self.component_signature(component)?;
                let flags = BindingFlags::COMPONENT | BindingFlags::ANNOTATED;
                self.scopes.declare(&component.name.name, flags, ty, component.name.span);
            }
            StmtKind::ClassDecl(class) => {
                let ty = match self.scopes.lookup_type(&class.name.name).map(|named| named.base) {
                    Some(base) => match self.ctx.interner.lookup(base) {
                        Some(TypeData::Instance(id)) => self.ctx.interner.class(id),
                        _ => TypeId::ANY,
                    },
                    None => TypeId::ANY,
                };
                let flags = BindingFlags::CLASS | BindingFlags::ANNOTATED;
                self.scopes.declare(&class.name.name, flags, ty, class.name.span);
            }
            _ => {}
        }
        Ok(())
    }

    /// Declared signature of a function; an unannotated return is `any`
    /// until the body is checked.
    pub(crate) fn function_signature(&mut self, func: &Function) -> CheckResult<TypeId> {
        self.lower_with_params(&func.type_params, |lowering, infos| {
            let ty = lower_signature(lowering, func)?;
            Ok(with_type_params(lowering.interner(), ty, infos))
        })
    }

    fn component_signature(&mut self, component: &ComponentDecl) -> CheckResult<TypeId> {
        let interner = self.ctx.interner;
        let (infos, props, renders) = self.lower_with_params(&component.type_params, |lowering, infos| {
            let mut props = Vec::with_capacity(component.params.len());
            for param in &component.params {
                let ty = lowering.lower(&param.annotation)?;
                let name = interner.intern_string(&param.name.name);
                props.push(if param.optional {
                    PropertyInfo::opt(name, ty)
                } else {
                    PropertyInfo::new(name, ty)
                });
            }
            let renders = match &component.renders {
                Some(renders) => {
                    let rendered = lowering.lower(&renders.annotation)?;
                    let mode = match renders.kind {
                        RendersKind::Normal => RendersMode::Exactly,
                        RendersKind::Maybe => RendersMode::Maybe,
                        RendersKind::Star => RendersMode::Star,
                    };
                    renders_type(interner, mode, rendered)
                }
                None => TypeId::REACT_NODE,
            };
            Ok((infos, props, renders))
        })?;
        let props = interner.object(props);
        if infos.is_empty() {
            return Ok(interner.component(ComponentType {
                props,
                instance: TypeId::VOID,
                config: props,
                renders,
            }));
        }
        // Generic components are generic functions from props to renders.
        Ok(interner.function(FunctionShape {
            type_params: infos,
            params: vec![ParamInfo::required(props)],
            return_type: renders,
            predicate: None,
        }))
    }

    // =========================================================================
    // Module signature
    // =========================================================================

    /// What this module exposes, from the top-level statements and the
    /// bindings left in the module scope.
    pub(crate) fn collect_exports(&mut self, body: &[Stmt]) -> ModuleSignature {
        let mut signature = ModuleSignature::default();
        for stmt in body {
            match &stmt.kind {
                StmtKind::Export { declaration } => {
                    for name in declared_names(declaration) {
                        self.export_name(&mut signature, name, name);
                    }
                }
                StmtKind::ExportNamed { specifiers } => {
                    for spec in specifiers {
                        let exported = spec.exported.as_deref().unwrap_or(&spec.local.name);
                        if !self.export_name(&mut signature, &spec.local.name, exported) {
                            let name = self.atom(&spec.local.name);
                            self.error(spec.local.span, CheckError::UnresolvedName { name });
                        }
                    }
                }
                StmtKind::ExportDefault { expr } => {
                    signature.default = Some(self.exported_expr_type(expr));
                }
                StmtKind::ModuleExports { expr } => {
                    let ty = self.exported_expr_type(expr);
                    signature.default = Some(ty);
                    if let ExprKind::Object { properties } = &expr.kind {
                        self.export_object_members(&mut signature, ty, properties);
                    }
                }
                _ => {}
            }
        }
        debug!(
            module = self.ctx.file,
            values = signature.values.len(),
            types = signature.types.len(),
            "module signature"
        );
        signature
    }

    /// Export the module-scope value and type named `local`; false when
    /// neither exists.
    fn export_name(&self, signature: &mut ModuleSignature, local: &str, exported: &str) -> bool {
        let scope = self.scopes.module_scope();
        let mut found = false;
        if let Some(&id) = scope.values.get(local) {
            signature
                .values
                .insert(exported.to_string(), self.scopes.binding(id).declared);
            found = true;
        }
        if let Some(named) = scope.types.get(local) {
            signature.types.insert(exported.to_string(), named.clone());
            found = true;
        }
        found
    }

    fn exported_expr_type(&self, expr: &Expr) -> TypeId {
        if let Some(ty) = self.exports.default {
            return ty;
        }
        self.declared_expr_type(expr)
    }

    /// Type of an exported expression from declarations alone.
    fn declared_expr_type(&self, expr: &Expr) -> TypeId {
        let interner = self.ctx.interner;
        match &expr.kind {
            ExprKind::Ident { name } => self
                .scopes
                .lookup(name)
                .map_or(TypeId::ANY, |id| self.scopes.binding(id).declared),
            ExprKind::Object { properties } => {
                let mut props = Vec::with_capacity(properties.len());
                for prop in properties {
                    let (key, ty) = match prop {
                        ObjectProp::Init { key, value, .. } => (key.as_str(), self.declared_expr_type(value)),
                        ObjectProp::Shorthand { name } => {
                            let ty = self
                                .scopes
                                .lookup(&name.name)
                                .map_or(TypeId::ANY, |id| self.scopes.binding(id).declared);
                            (name.name.as_str(), ty)
                        }
                        // Spread members are not part of the declared shape.
                        ObjectProp::Spread { .. } => return interner.inexact_object(props),
                    };
                    props.push(PropertyInfo::new(interner.intern_string(key), ty));
                }
                interner.object(props)
            }
            ExprKind::Cast { annotation, .. } => {
                let scope = LoweringScope::new(&self.scopes);
                TypeLowering::new(interner, &scope)
                    .lower(annotation)
                    .unwrap_or(TypeId::ANY)
            }
            ExprKind::String { value } => interner.literal_string(value),
            ExprKind::Number { value } => interner.literal_number(*value),
            ExprKind::Bool { value } => interner.literal_boolean(*value),
            _ => TypeId::ANY,
        }
    }

    fn export_object_members(&self, signature: &mut ModuleSignature, ty: TypeId, properties: &[ObjectProp]) {
        let view = self.view();
        let mut evaluator = TypeEvaluator::new(self.ctx.interner, &view);
        for prop in properties {
            let key = match prop {
                ObjectProp::Init { key, .. } => key.as_str(),
                ObjectProp::Shorthand { name } => name.name.as_str(),
                ObjectProp::Spread { .. } => continue,
            };
            let atom = self.ctx.interner.intern_string(key);
            if let PropertyAccess::Found { type_id, .. } = evaluator.property_of(ty, atom) {
                signature.values.insert(key.to_string(), type_id);
            }
        }
    }
}

/// Names a declaration statement introduces.
pub(crate) fn declared_names(stmt: &Stmt) -> Vec<&str> {
    match &stmt.kind {
        StmtKind::VarDecl(decl) => vec![decl.name.name.as_str()],
        StmtKind::Destructure(pattern) => pattern.bindings().map(|b| b.name.as_str()).collect(),
        StmtKind::FunctionDecl(func) => func.name.iter().map(|n| n.name.as_str()).collect(),
        StmtKind::ClassDecl(class) => vec![class.name.name.as_str()],
        StmtKind::ComponentDecl(component) => vec![component.name.name.as_str()],
        StmtKind::DeclareFunction { name, .. } | StmtKind::DeclareVar { name, .. } => {
            vec![name.name.as_str()]
        }
        StmtKind::TypeAlias(alias) => vec![alias.name.name.as_str()],
        StmtKind::OpaqueType(opaque) => vec![opaque.name.name.as_str()],
        _ => Vec::new(),
    }
}

/// Signature of `func` from its annotations; missing annotations are `any`.
/// Type parameters must already be in scope.
fn lower_signature(
    lowering: &mut TypeLowering<'_, LoweringScope<'_>>,
    func: &Function,
) -> CheckResult<TypeId> {
    let interner = lowering.interner();
    let mut params = Vec::with_capacity(func.params.len());
    for param in &func.params {
        let ty = match &param.annotation {
            Some(annotation) => lowering.lower(annotation)?,
            None => TypeId::ANY,
        };
        params.push(ParamInfo {
            name: Some(interner.intern_string(&param.name.name)),
            type_id: ty,
            optional: param.optional,
            rest: false,
        });
    }
    let return_type = match &func.ret {
        Some(ret) => lowering.lower(ret)?,
        None => TypeId::ANY,
    };
    Ok(interner.function(FunctionShape::new(params, return_type)))
}

fn with_type_params(
    interner: &flint_solver::TypeInterner,
    ty: TypeId,
    infos: Vec<TypeParamInfo>,
) -> TypeId {
    if infos.is_empty() {
        return ty;
    }
    match interner.lookup(ty) {
        Some(TypeData::Function(fn_id)) => {
            let shape = interner.function_shape(fn_id);
            interner.function(FunctionShape {
                type_params: infos,
                ..(*shape).clone()
            })
        }
        _ => ty,
    }
}

/// `ctor` returning `ret`.
fn with_return(interner: &flint_solver::TypeInterner, ctor: TypeId, ret: TypeId) -> TypeId {
    match interner.lookup(ctor) {
        Some(TypeData::Function(fn_id)) => {
            let shape = interner.function_shape(fn_id);
            interner.function(FunctionShape {
                return_type: ret,
                ..(*shape).clone()
            })
        }
        _ => ctor,
    }
}
