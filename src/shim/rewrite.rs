//! Application of resolved bindings to host methods.

use crate::archive::Literal;
use crate::shim::binding::{BindingError, CompanionBinding};
use crate::shim::declaration::BindingStrategy;
use crate::shim::descriptor::{MemberRef, MethodDescriptor};
use crate::shim::host::{HostMethod, Insn, InvokeKind};

/// Rewrites one host method for one binding.
pub struct Rewriter<'a> {
    binding: &'a CompanionBinding,
    strategy: &'a BindingStrategy,
    handler: MethodDescriptor,
}

impl<'a> Rewriter<'a> {
    pub fn new(
        binding: &'a CompanionBinding,
        strategy: &'a BindingStrategy,
    ) -> Result<Self, BindingError> {
        let handler = MethodDescriptor::parse(&binding.descriptor).map_err(|e| {
            BindingError::SignatureMismatch {
                patch: binding.patch.clone(),
                stub: binding.stub.clone(),
                detail: e.to_string(),
            }
        })?;
        Ok(Rewriter {
            binding,
            strategy,
            handler,
        })
    }

    fn mismatch(&self, detail: impl Into<String>) -> BindingError {
        BindingError::SignatureMismatch {
            patch: self.binding.patch.clone(),
            stub: self.binding.stub.clone(),
            detail: detail.into(),
        }
    }

    fn no_injection_point(&self, method: &HostMethod, detail: impl Into<String>) -> BindingError {
        BindingError::InjectionPoint {
            patch: self.binding.patch.clone(),
            stub: self.binding.stub.clone(),
            method: format!("{}{}", method.name, method.descriptor),
            detail: detail.into(),
        }
    }

    fn handler_call(&self) -> Insn {
        Insn::invoke_static(&self.binding.owner, &self.binding.name, &self.binding.descriptor)
    }

    /// Loads supplying the handler parameters from `first_context` on. They
    /// capture the host method's leading arguments, in order.
    fn context_loads(
        &self,
        method: &HostMethod,
        first_context: usize,
    ) -> Result<Vec<Insn>, BindingError> {
        let context = &self.handler.params[first_context..];
        let arguments = method
            .arguments()
            .map_err(|e| self.no_injection_point(method, e.to_string()))?;

        if context.len() > arguments.len() {
            return Err(self.mismatch(format!(
                "captures {} arguments but `{}` only has {}",
                context.len(),
                method.name,
                arguments.len()
            )));
        }

        context
            .iter()
            .zip(arguments.iter())
            .map(|(wanted, (actual, slot))| {
                if wanted == actual {
                    Ok(Insn::load(actual, *slot))
                } else {
                    Err(self.mismatch(format!(
                        "captured argument type {} does not match {}",
                        wanted, actual
                    )))
                }
            })
            .collect()
    }

    /// Apply the binding to `method`.
    pub fn apply(&self, method: &mut HostMethod) -> Result<(), BindingError> {
        match self.strategy {
            BindingStrategy::Redirect {
                target, ordinal, ..
            } => self.redirect(method, target, *ordinal),
            BindingStrategy::ModifyConstant {
                constant, ordinal, ..
            } => self.modify_constant(method, constant, *ordinal),
            BindingStrategy::ModifyVariable {
                at,
                at_ordinal,
                ordinal,
                ..
            } => self.modify_variable(method, at, *at_ordinal, *ordinal),
        }
    }

    fn redirect(
        &self,
        method: &mut HostMethod,
        target: &str,
        ordinal: Option<usize>,
    ) -> Result<(), BindingError> {
        let target = MemberRef::parse(target).map_err(|e| self.mismatch(e.to_string()))?;
        let target_desc =
            MethodDescriptor::parse(&target.descriptor).map_err(|e| self.mismatch(e.to_string()))?;

        let calls: Vec<(usize, InvokeKind)> = method
            .code
            .iter()
            .enumerate()
            .filter_map(|(i, insn)| match insn {
                Insn::Invoke {
                    kind,
                    owner,
                    name,
                    descriptor,
                } if target.matches(owner, name, descriptor) => Some((i, *kind)),
                _ => None,
            })
            .collect();

        let selected: Vec<(usize, InvokeKind)> = match ordinal {
            None => calls,
            Some(n) => calls.get(n).copied().into_iter().collect(),
        };
        if selected.is_empty() {
            return Err(self.no_injection_point(
                method,
                format!(
                    "no call to {}.{}{}{}",
                    target.owner,
                    target.name,
                    target.descriptor,
                    ordinal.map(|n| format!(" with ordinal {}", n)).unwrap_or_default()
                ),
            ));
        }

        if self.handler.ret != target_desc.ret {
            return Err(self.mismatch(format!(
                "returns {} but the redirected call returns {}",
                self.handler.ret, target_desc.ret
            )));
        }

        // Instructions are replaced back to front so earlier indexes stay valid.
        for (index, kind) in selected.into_iter().rev() {
            let mut expected = Vec::new();
            if kind != InvokeKind::Static {
                expected.push(format!("L{};", target.owner));
            }
            expected.extend(target_desc.params.iter().cloned());

            if self.handler.params.len() < expected.len()
                || self.handler.params[..expected.len()] != expected[..]
            {
                return Err(self.mismatch(format!(
                    "must start with the redirected call's arguments ({})",
                    expected.concat()
                )));
            }

            let mut replacement = self.context_loads(method, expected.len())?;
            replacement.push(self.handler_call());
            method.code.splice(index..=index, replacement);
        }
        Ok(())
    }

    fn modify_constant(
        &self,
        method: &mut HostMethod,
        constant: &Literal,
        ordinal: usize,
    ) -> Result<(), BindingError> {
        let ty = literal_type(constant);
        if self.handler.params.first().map(String::as_str) != Some(ty) || self.handler.ret != ty {
            return Err(self.mismatch(format!("must take and return {} to modify {}", ty, constant)));
        }

        let index = method
            .code
            .iter()
            .enumerate()
            .filter(|(_, insn)| matches!(insn, Insn::Const { value } if value == constant))
            .map(|(i, _)| i)
            .nth(ordinal)
            .ok_or_else(|| {
                self.no_injection_point(
                    method,
                    format!("constant {} with ordinal {} not found", constant, ordinal),
                )
            })?;

        let mut inserted = self.context_loads(method, 1)?;
        inserted.push(self.handler_call());
        method.code.splice(index + 1..index + 1, inserted);
        Ok(())
    }

    fn modify_variable(
        &self,
        method: &mut HostMethod,
        at: &str,
        at_ordinal: usize,
        ordinal: usize,
    ) -> Result<(), BindingError> {
        let at = MemberRef::parse(at).map_err(|e| self.mismatch(e.to_string()))?;
        let ty = match self.handler.params.first() {
            Some(ty) if *ty == self.handler.ret => ty.clone(),
            _ => return Err(self.mismatch("must take and return the variable's type")),
        };

        let index = method
            .code
            .iter()
            .enumerate()
            .filter(|(_, insn)| {
                matches!(insn, Insn::Invoke { owner, name, descriptor, .. }
                    if at.matches(owner, name, descriptor))
            })
            .map(|(i, _)| i)
            .nth(at_ordinal)
            .ok_or_else(|| {
                self.no_injection_point(
                    method,
                    format!(
                        "call to {}.{}{} with ordinal {} not found",
                        at.owner, at.name, at.descriptor, at_ordinal
                    ),
                )
            })?;

        let slot = method
            .locals
            .iter()
            .filter(|local| local.descriptor == ty)
            .nth(ordinal)
            .map(|local| local.slot)
            .ok_or_else(|| {
                self.no_injection_point(
                    method,
                    format!("no local of type {} with ordinal {}", ty, ordinal),
                )
            })?;

        let mut inserted = vec![Insn::load(&ty, slot)];
        inserted.extend(self.context_loads(method, 1)?);
        inserted.push(self.handler_call());
        inserted.push(Insn::Store { ty, slot });
        method.code.splice(index..index, inserted);
        Ok(())
    }
}

fn literal_type(literal: &Literal) -> &'static str {
    match literal {
        Literal::Int(_) => "I",
        Literal::Long(_) => "J",
        Literal::Float(_) => "F",
        Literal::Double(_) => "D",
        Literal::String(_) => "Ljava/lang/String;",
    }
}
