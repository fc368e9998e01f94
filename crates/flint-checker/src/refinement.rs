//! Control-flow refinement of binding types.
//!
//! The tracker keeps one frame per lexical block. A narrowing site (an
//! equality or discriminant test, `typeof`, truthiness, a predicate call)
//! records the narrowed type of a binding in the innermost frame; leaving
//! the block drops it. Assignments replace every refinement of the binding
//! and survive the block they happen in.
//!
//! Branches are checked from a snapshot of the tracker and merged back with
//! [`RefinementTracker::join`]: the binding's type after the branch point is
//! the union of its types at the end of every branch that falls through.
//!
//! Suspension points (`await`, `yield`) call [`RefinementTracker::havoc`]
//! for every binding a closure may write, so those bindings go back to their
//! declared type until a later test narrows them again.

use crate::declarations::declared_names;
use crate::scope::BindingId;
use crate::walk::{Visitor, walk_body, walk_expr, walk_stmt};
use flint_ast::{Expr, ExprKind, Function, Stmt, StmtKind};
use flint_solver::TypeId;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Entry {
    ty: TypeId,
    /// Set by assignments, which outlive the block they happen in.
    assigned: bool,
}

/// Refinements holding at the end of one branch.
#[derive(Clone, Debug, Default)]
pub struct BranchState {
    entries: FxHashMap<BindingId, Entry>,
}

impl BranchState {
    pub fn get(&self, id: BindingId) -> Option<TypeId> {
        self.entries.get(&id).map(|entry| entry.ty)
    }
}

#[derive(Clone, Debug)]
pub struct RefinementSnapshot {
    frames: Vec<FxHashMap<BindingId, Entry>>,
}

#[derive(Clone, Debug)]
pub struct RefinementTracker {
    frames: Vec<FxHashMap<BindingId, Entry>>,
}

impl Default for RefinementTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RefinementTracker {
    pub fn new() -> Self {
        Self {
            frames: vec![FxHashMap::default()],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn enter(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    /// Leave the innermost block. Narrowings made in it end here;
    /// assignments carry over to the enclosing block.
    pub fn exit(&mut self) {
        if self.frames.len() <= 1 {
            return;
        }
        let Some(frame) = self.frames.pop() else {
            return;
        };
        if let Some(parent) = self.frames.last_mut() {
            for (id, entry) in frame {
                if entry.assigned {
                    parent.insert(id, entry);
                }
            }
        }
    }

    /// Narrow `id` to `ty` until the innermost block ends.
    pub fn refine(&mut self, id: BindingId, ty: TypeId) {
        trace!(binding = id.0, ty = ty.0, "refine");
        let assigned = self
            .entry(id)
            .is_some_and(|entry| entry.assigned && self.top_has(id));
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(id, Entry { ty, assigned });
        }
    }

    /// `id` was assigned a value of type `ty`.
    pub fn assign(&mut self, id: BindingId, ty: TypeId) {
        self.invalidate(id);
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(id, Entry { ty, assigned: true });
        }
    }

    /// Forget everything known about `id`.
    pub fn invalidate(&mut self, id: BindingId) {
        for frame in &mut self.frames {
            frame.remove(&id);
        }
    }

    /// Forget every binding selected by `pred`; returns how many were
    /// refined.
    pub fn havoc(&mut self, mut pred: impl FnMut(BindingId) -> bool) -> usize {
        let mut count = 0;
        for frame in &mut self.frames {
            let before = frame.len();
            frame.retain(|&id, _| !pred(id));
            count += before - frame.len();
        }
        if count > 0 {
            trace!(count, "havoc refinements");
        }
        count
    }

    pub fn current(&self, id: BindingId) -> Option<TypeId> {
        self.entry(id).map(|entry| entry.ty)
    }

    fn entry(&self, id: BindingId) -> Option<Entry> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(&id).copied())
    }

    fn top_has(&self, id: BindingId) -> bool {
        self.frames.last().is_some_and(|frame| frame.contains_key(&id))
    }

    /// A tracker for a nested function body: one frame holding the
    /// narrowings of the bindings selected by `keep`.
    pub fn inherit(&self, mut keep: impl FnMut(BindingId) -> bool) -> Self {
        let mut frame = FxHashMap::default();
        for (&id, &entry) in &self.branch_state().entries {
            if keep(id) {
                frame.insert(id, Entry {
                    ty: entry.ty,
                    assigned: false,
                });
            }
        }
        Self { frames: vec![frame] }
    }

    pub fn snapshot(&self) -> RefinementSnapshot {
        RefinementSnapshot {
            frames: self.frames.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: RefinementSnapshot) {
        self.frames = snapshot.frames;
    }

    /// The effective refinement of every refined binding.
    pub fn branch_state(&self) -> BranchState {
        let mut entries = FxHashMap::default();
        for frame in &self.frames {
            for (&id, &entry) in frame {
                entries.insert(id, entry);
            }
        }
        BranchState { entries }
    }

    /// Merge the states at the end of the branches that fall through into
    /// the current (pre-branch) state. `declared` gives a binding's type
    /// when a branch holds no refinement for it.
    pub fn join(
        &mut self,
        branches: &[BranchState],
        mut declared: impl FnMut(BindingId) -> TypeId,
        mut union: impl FnMut(Vec<TypeId>) -> TypeId,
    ) {
        let mut ids: Vec<BindingId> = branches
            .iter()
            .flat_map(|branch| branch.entries.keys().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();

        for id in ids {
            let before = self.entry(id);
            let fallback = before.map_or_else(|| declared(id), |entry| entry.ty);
            let mut assigned = false;
            let mut types = Vec::with_capacity(branches.len());
            for branch in branches {
                match branch.entries.get(&id) {
                    Some(entry) => {
                        assigned |= entry.assigned && before != Some(*entry);
                        types.push(entry.ty);
                    }
                    None => types.push(fallback),
                }
            }
            let joined = union(types);
            if Some(joined) == before.map(|entry| entry.ty) && !assigned {
                continue;
            }
            if assigned {
                self.invalidate(id);
            }
            if let Some(frame) = self.frames.last_mut() {
                frame.insert(id, Entry {
                    ty: joined,
                    assigned,
                });
            }
        }
    }
}

/// Assignments to names, resolved to the function that declares them.
///
/// A write is attributed to the innermost enclosing function (or the
/// module) that declares the name, so a closure assigning its own local
/// never counts as writing an outer binding of the same name. A binding
/// owned at depth `d` may be written by a closure when one of its writes
/// happens at a depth greater than `d`.
#[derive(Clone, Debug, Default)]
pub struct CapturedWrites {
    max_depth: FxHashMap<(String, u32), u32>,
    assigned: FxHashSet<String>,
}

impl CapturedWrites {
    pub fn collect(body: &[Stmt]) -> Self {
        struct Collector {
            /// Names declared by each enclosing function; index is depth.
            frames: Vec<FxHashSet<String>>,
            writes: FxHashMap<(String, u32), u32>,
        }

        impl Collector {
            fn depth(&self) -> u32 {
                u32::try_from(self.frames.len().saturating_sub(1)).unwrap_or(u32::MAX)
            }

            fn owner(&self, name: &str) -> u32 {
                self.frames
                    .iter()
                    .rposition(|frame| frame.contains(name))
                    .and_then(|index| u32::try_from(index).ok())
                    .unwrap_or(0)
            }

            fn enter<'n>(&mut self, params: impl Iterator<Item = &'n str>, body: &[Stmt]) {
                let mut frame = local_names(body);
                frame.extend(params.map(str::to_string));
                self.frames.push(frame);
                walk_body(self, body);
                self.frames.pop();
            }
        }

        impl Visitor for Collector {
            fn visit_stmt(&mut self, stmt: &Stmt) {
                match &stmt.kind {
                    StmtKind::ComponentDecl(component) => {
                        let params = component.params.iter().map(|p| p.name.name.as_str());
                        self.enter(params, &component.body);
                    }
                    _ => walk_stmt(self, stmt),
                }
            }

            fn visit_expr(&mut self, expr: &Expr) {
                if let ExprKind::Assign { target, .. } = &expr.kind
                    && let ExprKind::Ident { name } = &target.kind
                {
                    let key = (name.clone(), self.owner(name));
                    let depth = self.depth();
                    let max = self.writes.entry(key).or_insert(0);
                    *max = (*max).max(depth);
                }
                walk_expr(self, expr);
            }

            fn visit_function(&mut self, func: &Function) {
                let params = func.params.iter().map(|p| p.name.name.as_str());
                self.enter(params, &func.body);
            }
        }

        let mut collector = Collector {
            frames: vec![local_names(body)],
            writes: FxHashMap::default(),
        };
        walk_body(&mut collector, body);
        let assigned = collector.writes.keys().map(|(name, _)| name.clone()).collect();
        Self {
            max_depth: collector.writes,
            assigned,
        }
    }

    pub fn is_assigned(&self, name: &str) -> bool {
        self.assigned.contains(name)
    }

    /// Whether a closure may write `name` owned at `owner_depth`.
    pub fn written_by_closure(&self, name: &str, owner_depth: u32) -> bool {
        self.max_depth
            .get(&(name.to_string(), owner_depth))
            .is_some_and(|&depth| depth > owner_depth)
    }
}

/// Names declared directly in a function body, including nested blocks but
/// not nested functions.
fn local_names(body: &[Stmt]) -> FxHashSet<String> {
    struct Locals {
        names: FxHashSet<String>,
    }

    impl Visitor for Locals {
        fn visit_stmt(&mut self, stmt: &Stmt) {
            if let StmtKind::ForOf(for_of) = &stmt.kind {
                self.names.insert(for_of.binding.name.clone());
            }
            self.names
                .extend(declared_names(stmt).into_iter().map(str::to_string));
            match &stmt.kind {
                StmtKind::ComponentDecl(_) => {}
                _ => walk_stmt(self, stmt),
            }
        }

        fn visit_function(&mut self, _func: &Function) {}
    }

    let mut locals = Locals {
        names: FxHashSet::default(),
    };
    walk_body(&mut locals, body);
    locals.names
}

#[cfg(test)]
#[path = "../tests/refinement_tests.rs"]
mod tests;
