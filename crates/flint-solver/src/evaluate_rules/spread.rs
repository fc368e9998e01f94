//! Object spread `{...A, ...B}` and `$Diff<A, B>`.

use crate::def::TypeResolver;
use crate::evaluate::TypeEvaluator;
use crate::objects::{diff_shapes, spread_objects};
use crate::types::*;
use std::sync::Arc;
use tracing::trace;

impl<R: TypeResolver + ?Sized> TypeEvaluator<'_, R> {
    pub(crate) fn evaluate_spread(&mut self, ty: TypeId, operands: &[TypeId], exact: bool) -> TypeId {
        let interner = self.interner();
        let mut ids = Vec::with_capacity(operands.len());
        let mut shapes: Vec<Arc<ObjectShape>> = Vec::with_capacity(operands.len());
        let mut evaluated_operands = Vec::with_capacity(operands.len());
        let mut deferred = false;

        for (index, &operand) in operands.iter().enumerate() {
            let evaluated = self.evaluate(operand);
            evaluated_operands.push(evaluated);
            if matches!(evaluated, TypeId::NULL | TypeId::VOID) {
                continue;
            }
            if evaluated.is_any_or_error() {
                return evaluated;
            }

            if let Some(TypeData::Union(list)) = interner.lookup(evaluated) {
                // {...(A | B)} is {...A} | {...B}
                let members = interner.type_list(list);
                let results = members
                    .iter()
                    .map(|&member| {
                        let mut replaced = operands.to_vec();
                        replaced[index] = member;
                        let spread = interner.spread(replaced, exact);
                        self.evaluate(spread)
                    })
                    .collect();
                return interner.union(results);
            }

            match self.resolve_object_shape(evaluated) {
                Some(shape) => {
                    ids.push(evaluated);
                    shapes.push(shape);
                }
                None => deferred = true,
            }
        }

        if deferred {
            trace!(type_id = ty.0, "spread: operand not concrete, deferring");
            return interner.spread(evaluated_operands, exact);
        }
        spread_objects(interner, &ids, &shapes, exact)
    }

    pub(crate) fn evaluate_diff(&mut self, ty: TypeId, left: TypeId, right: TypeId) -> TypeId {
        let (Some(left), Some(right)) = (
            self.resolve_object_shape(left),
            self.resolve_object_shape(right),
        ) else {
            return self.diff_trailing_spread(left, right).unwrap_or(ty);
        };
        self.interner().object_with_shape(diff_shapes(&left, &right))
    }

    /// `$Diff<{...A, ...B}, {...B}>` is `{...A}` even while `A` and `B`
    /// are unresolved.
    fn diff_trailing_spread(&mut self, left: TypeId, right: TypeId) -> Option<TypeId> {
        let interner = self.interner();
        let left = self.evaluate(left);
        let right = self.evaluate(right);
        let TypeData::Spread(left_list, exact) = interner.lookup(left)? else {
            return None;
        };
        let left_ops = interner.type_list(left_list);
        let right_ops: Vec<TypeId> = match interner.lookup(right)? {
            TypeData::Spread(right_list, _) => interner.type_list(right_list).to_vec(),
            _ => vec![right],
        };
        let kept = left_ops.len().checked_sub(right_ops.len()).filter(|&n| n > 0)?;
        if left_ops[kept..] != right_ops[..] {
            return None;
        }
        trace!(left = left.0, right = right.0, "diff: removed trailing spread operands");
        Some(self.evaluate(interner.spread(left_ops[..kept].to_vec(), exact)))
    }
}
