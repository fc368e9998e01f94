//! Conversion of recorded errors into diagnostics.
//!
//! Each error becomes one diagnostic whose primary message references the
//! offending source span and its line. An incompatibility keeps the
//! subtype failure chain as nested extra info, outermost step first.

use crate::state::CheckerState;
use flint_common::diagnostics::{diagnostic_messages, format_message};
use flint_common::{Diagnostic, LineMap, MessagePart, SourceSpan, Span};
use flint_solver::{ArityKind, ArityTarget, CheckError, TypePrinter};

impl<'a> CheckerState<'a> {
    /// Diagnostics for every recorded error, in source order.
    pub(crate) fn build_diagnostics(&self) -> Vec<Diagnostic> {
        let view = self.view();
        let mut printer = TypePrinter::new(self.ctx.interner, &view);
        let line_map = LineMap::new(self.source);
        let mut errors: Vec<&(Span, CheckError)> = self.errors.iter().collect();
        errors.sort_by_key(|(span, _)| (span.start, span.end));
        errors
            .into_iter()
            .map(|(span, error)| self.build_diagnostic(&mut printer, &line_map, *span, error))
            .collect()
    }

    fn build_diagnostic(
        &self,
        printer: &mut TypePrinter<'_>,
        line_map: &LineMap,
        span: Span,
        error: &CheckError,
    ) -> Diagnostic {
        let text = self.message_text(printer, error);
        let part = if span.is_dummy() {
            MessagePart::text(text)
        } else {
            let context = line_map.line_text(self.source, span.start).to_string();
            MessagePart::with_reference(text, SourceSpan::new(self.ctx.file, span), context)
        };
        let file = self.ctx.file;
        let diagnostic = if error.is_warning() {
            Diagnostic::warning(file, error.code(), vec![part])
        } else {
            Diagnostic::error(file, error.code(), vec![part])
        };
        match error {
            CheckError::IncompatibleType {
                trace: Some(trace), ..
            } => diagnostic.with_extra(trace.to_extra_info(printer)),
            _ => diagnostic,
        }
    }

    fn message_text(&self, printer: &mut TypePrinter<'_>, error: &CheckError) -> String {
        let interner = self.ctx.interner;
        match error {
            CheckError::IncompatibleType { lower, upper, .. } => format_message(
                diagnostic_messages::INCOMPATIBLE_TYPE,
                &[&printer.print(*lower), &printer.print(*upper)],
            ),
            CheckError::Arity {
                name,
                expected,
                got,
                kind,
                target,
            } => {
                let template = match (target, kind) {
                    (ArityTarget::TypeArguments, ArityKind::TooMany) => diagnostic_messages::TOO_MANY_TYPE_ARGUMENTS,
                    (ArityTarget::TypeArguments, ArityKind::TooFew) => diagnostic_messages::TOO_FEW_TYPE_ARGUMENTS,
                    (ArityTarget::Arguments, ArityKind::TooMany) => diagnostic_messages::TOO_MANY_ARGUMENTS,
                    (ArityTarget::Arguments, ArityKind::TooFew) => diagnostic_messages::TOO_FEW_ARGUMENTS,
                };
                format_message(template, &[&format!("`{name}`"), &expected.to_string(), &got.to_string()])
            }
            CheckError::MissingProperty { key, on_type } => format_message(
                diagnostic_messages::MISSING_PROPERTY,
                &[&interner.resolve_atom(*key), &printer.print(*on_type)],
            ),
            CheckError::BoundViolation { param, bound, arg } => format_message(
                diagnostic_messages::BOUND_VIOLATION,
                &[&printer.print(*arg), &printer.print(*bound), &interner.resolve_atom(*param)],
            ),
            CheckError::UnreachableCode => diagnostic_messages::UNREACHABLE_CODE.to_string(),
            CheckError::MalformedAnnotation { reason } => {
                format_message(diagnostic_messages::MALFORMED_ANNOTATION, &[reason])
            }
            CheckError::InvalidReassignment { name, reason } => format_message(
                diagnostic_messages::INVALID_REASSIGNMENT,
                &[&interner.resolve_atom(*name), reason.describe()],
            ),
            CheckError::NotIterable { ty } => {
                format_message(diagnostic_messages::NOT_ITERABLE, &[&printer.print(*ty)])
            }
            CheckError::UnresolvedName { name } => {
                format_message(diagnostic_messages::UNRESOLVED_NAME, &[&interner.resolve_atom(*name)])
            }
            CheckError::NotAComponent { ty } => {
                format_message(diagnostic_messages::NOT_A_COMPONENT, &[&printer.print(*ty)])
            }
            CheckError::NotCallable { ty } => {
                format_message(diagnostic_messages::NOT_CALLABLE, &[&printer.print(*ty)])
            }
        }
    }
}
