use log::trace;

use crate::{
    common::span::Span,
    compiler::syntax::{ErrorKind, Note, Syntax},
    construct::{
        rule::{Binding, Macro},
        tree::{Elif, IrBlock, IrExpr, RecordField},
    },
};

/// Every macro declared so far in a compile, across all included files,
/// in declaration order.
#[derive(Debug, Default)]
pub struct MacroTable {
    macros: Vec<Macro>,
}

impl MacroTable {
    pub fn new() -> MacroTable { MacroTable::default() }

    pub fn declare(&mut self, rule: Macro) {
        trace!(
            "declared macro `{}` with {} formal(s){}",
            rule.name,
            rule.formals.len(),
            if rule.variadic { ", variadic" } else { "" }
        );
        self.macros.push(rule);
    }

    /// The earliest declared macro matching both name and arity.
    pub fn resolve(&self, name: &str, arity: usize) -> Option<&Macro> {
        self.macros
            .iter()
            .find(|rule| rule.name == name && rule.accepts(arity))
    }

    pub fn len(&self) -> usize { self.macros.len() }

    /// Expands an invocation of `name` with `args` into a copy of the
    /// matching macro's body. `span` points at the invocation.
    pub fn expand(&self, name: &str, args: IrBlock, span: &Span) -> Result<IrBlock, Syntax> {
        let arity = args.len();
        let rule = self.resolve(name, arity).ok_or_else(|| self.unresolved(name, arity, span))?;

        trace!("expanding macro `{}` with {} argument(s)", name, arity);
        let expander = Expander {
            rule,
            bindings: rule.bind(args),
            span,
        };
        expander.block(&rule.body)
    }

    fn unresolved(&self, name: &str, arity: usize, span: &Span) -> Syntax {
        let reason = format!(
            "Macro `{}` with {} argument(s) was not defined before usage",
            name, arity
        );

        let arities = self
            .macros
            .iter()
            .filter(|rule| rule.name == name)
            .map(|rule| match rule.variadic {
                true => format!("{} or more", rule.formals.len() - 1),
                false => rule.formals.len().to_string(),
            })
            .collect::<Vec<_>>();

        if arities.is_empty() {
            Syntax::error(ErrorKind::Macro, &reason, span)
        } else {
            let hint = format!("`{}` takes {} argument(s)", name, arities.join(" or "));
            Syntax::error_with_note(ErrorKind::Macro, &reason, Note::new_with_hint(&hint, span))
        }
    }
}

/// Copies a macro body, substituting the actual arguments for every
/// reference to a formal along the way.
struct Expander<'a> {
    rule:     &'a Macro,
    bindings: Vec<(&'a str, Binding)>,
    span:     &'a Span,
}

impl<'a> Expander<'a> {
    fn lookup(&self, name: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|(formal, _)| *formal == name)
            .map(|(_, binding)| binding)
    }

    /// Expands a block. A reference to the variadic formal sitting
    /// directly in the block is replaced by the whole captured run.
    fn block(&self, block: &[IrExpr]) -> Result<IrBlock, Syntax> {
        let mut expanded = Vec::with_capacity(block.len());

        for expr in block {
            if let IrExpr::Ident(name) = expr {
                if let Some(Binding::Rest(run)) = self.lookup(name) {
                    for spliced in run {
                        expanded.push(self.expr(spliced)?);
                    }
                    continue;
                }
            }

            expanded.push(self.expr(expr)?);
        }

        Ok(expanded)
    }

    fn boxed(&self, expr: &IrExpr) -> Result<Box<IrExpr>, Syntax> { Ok(Box::new(self.expr(expr)?)) }

    fn expr(&self, expr: &IrExpr) -> Result<IrExpr, Syntax> {
        let expanded = match expr {
            IrExpr::Block(block) => IrExpr::Block(self.block(block)?),
            IrExpr::FuncDef { name, params, body } => IrExpr::FuncDef {
                name:   name.clone(),
                params: params.clone(),
                body:   self.block(body)?,
            },
            IrExpr::FuncCall { name, args } => IrExpr::FuncCall {
                name: name.clone(),
                args: self.block(args)?,
            },
            IrExpr::VarDef { name, init } => IrExpr::VarDef {
                name: name.clone(),
                init: self.boxed(init)?,
            },
            IrExpr::If {
                cond,
                body,
                elifs,
                else_body,
            } => IrExpr::If {
                cond:      self.boxed(cond)?,
                body:      self.block(body)?,
                elifs:     elifs
                    .iter()
                    .map(|elif| {
                        Ok(Elif {
                            cond: self.boxed(&elif.cond)?,
                            body: self.block(&elif.body)?,
                        })
                    })
                    .collect::<Result<_, Syntax>>()?,
                else_body: else_body
                    .as_ref()
                    .map(|body| self.block(body))
                    .transpose()?,
            },
            IrExpr::While { cond, body } => IrExpr::While {
                cond: self.boxed(cond)?,
                body: self.block(body)?,
            },
            IrExpr::Set { dest, src } => IrExpr::Set {
                dest: dest.clone(),
                src:  self.boxed(src)?,
            },
            IrExpr::Field {
                record,
                name,
                value,
            } => IrExpr::Field {
                record: self.boxed(record)?,
                name:   name.clone(),
                value:  value.as_deref().map(|v| self.boxed(v)).transpose()?,
            },
            IrExpr::List(content) => IrExpr::List(self.block(content)?),
            IrExpr::Record(fields) => IrExpr::Record(
                fields
                    .iter()
                    .map(|field| {
                        Ok(RecordField {
                            key:  field.key.clone(),
                            expr: self.boxed(&field.expr)?,
                        })
                    })
                    .collect::<Result<_, Syntax>>()?,
            ),
            IrExpr::Ident(name) => match self.lookup(name) {
                Some(Binding::Single(actual)) => actual.clone(),
                Some(Binding::Rest(_)) => return Err(self.misplaced_rest(name)),
                None => IrExpr::Ident(name.clone()),
            },
            IrExpr::String(_) | IrExpr::Int(_) | IrExpr::Float(_) | IrExpr::Bool(_) => expr.clone(),
        };

        Ok(expanded)
    }

    fn misplaced_rest(&self, name: &str) -> Syntax {
        Syntax::error_with_note(
            ErrorKind::Unpack,
            &format!(
                "The variadic argument `{}` of macro `{}` can only be unpacked directly inside a block",
                name, self.rule.name
            ),
            Note::new_with_hint("expanded here", self.span),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;

    fn span() -> Span { Span::point(&Source::source("(!m)"), 1) }

    fn ident(name: &str) -> IrExpr { IrExpr::ident(name) }

    fn declare(table: &mut MacroTable, name: &str, formals: &[&str], variadic: bool, body: IrBlock) {
        table.declare(Macro {
            name: name.to_string(),
            formals: formals.iter().map(|f| f.to_string()).collect(),
            variadic,
            body,
        });
    }

    #[test]
    fn substitutes_every_reference() {
        let mut table = MacroTable::new();
        declare(&mut table, "dup", &["x"], false, vec![IrExpr::call("f", vec![ident("x"), ident("x")])]);

        let expanded = table.expand("dup", vec![IrExpr::Int(7)], &span()).unwrap();
        assert_eq!(
            expanded,
            vec![IrExpr::call("f", vec![IrExpr::Int(7), IrExpr::Int(7)])]
        );
    }

    #[test]
    fn template_is_left_alone() {
        let mut table = MacroTable::new();
        declare(&mut table, "id", &["x"], false, vec![ident("x")]);

        let first = table.expand("id", vec![IrExpr::Int(1)], &span()).unwrap();
        let second = table.expand("id", vec![IrExpr::Int(2)], &span()).unwrap();
        assert_eq!(first, vec![IrExpr::Int(1)]);
        assert_eq!(second, vec![IrExpr::Int(2)]);
        assert_eq!(table.resolve("id", 1).unwrap().body, vec![ident("x")]);
    }

    #[test]
    fn reaches_every_slot() {
        let mut table = MacroTable::new();
        let body = vec![
            IrExpr::Block(vec![ident("x")]),
            IrExpr::FuncDef {
                name:   Some("g".into()),
                params: vec!["y".into()],
                body:   vec![ident("x")],
            },
            IrExpr::var_def("v", ident("x")),
            IrExpr::If {
                cond:      Box::new(ident("x")),
                body:      vec![ident("x")],
                elifs:     vec![Elif {
                    cond: Box::new(ident("x")),
                    body: vec![ident("x")],
                }],
                else_body: Some(vec![ident("x")]),
            },
            IrExpr::While {
                cond: Box::new(ident("x")),
                body: vec![ident("x")],
            },
            IrExpr::Set {
                dest: "v".into(),
                src:  Box::new(ident("x")),
            },
            IrExpr::Field {
                record: Box::new(ident("x")),
                name:   "k".into(),
                value:  Some(Box::new(ident("x"))),
            },
            IrExpr::List(vec![ident("x")]),
            IrExpr::Record(vec![RecordField {
                key:  "k".into(),
                expr: Box::new(ident("x")),
            }]),
        ];
        declare(&mut table, "all", &["x"], false, body);

        let expanded = table.expand("all", vec![IrExpr::Int(9)], &span()).unwrap();
        let printed = crate::construct::tree::print_block(&expanded);
        assert!(!printed.contains('x'), "residual formal in {}", printed);
        assert_eq!(printed.matches('9').count(), 15);
    }

    #[test]
    fn splices_rest_into_blocks() {
        let mut table = MacroTable::new();
        declare(
            &mut table,
            "first-and-rest",
            &["a", "rest"],
            true,
            vec![IrExpr::call("f", vec![ident("a"), ident("rest")])],
        );

        let args = vec![IrExpr::Int(1), IrExpr::Int(2), IrExpr::Int(3)];
        let expanded = table.expand("first-and-rest", args, &span()).unwrap();
        assert_eq!(
            expanded,
            vec![IrExpr::call(
                "f",
                vec![IrExpr::Int(1), IrExpr::Int(2), IrExpr::Int(3)]
            )]
        );
    }

    #[test]
    fn empty_rest_splices_nothing() {
        let mut table = MacroTable::new();
        declare(&mut table, "m", &["a", "rest"], true, vec![IrExpr::List(vec![ident("rest"), ident("a")])]);

        let expanded = table.expand("m", vec![IrExpr::Int(1)], &span()).unwrap();
        assert_eq!(expanded, vec![IrExpr::List(vec![IrExpr::Int(1)])]);
    }

    #[test]
    fn rest_outside_block() {
        let mut table = MacroTable::new();
        declare(&mut table, "m", &["rest"], true, vec![IrExpr::var_def("v", ident("rest"))]);

        let error = table.expand("m", vec![IrExpr::Int(1)], &span()).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Unpack);
    }

    #[test]
    fn arity_mismatch() {
        let mut table = MacroTable::new();
        declare(&mut table, "pair", &["a", "b"], false, vec![]);

        let args = vec![IrExpr::Int(1), IrExpr::Int(2), IrExpr::Int(3)];
        let error = table.expand("pair", args, &span()).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Macro);
        assert_eq!(
            error.reason,
            "Macro `pair` with 3 argument(s) was not defined before usage"
        );
        assert_eq!(error.notes[0].hint.as_deref(), Some("`pair` takes 2 argument(s)"));
    }

    #[test]
    fn overloads_by_arity() {
        let mut table = MacroTable::new();
        declare(&mut table, "m", &["a"], false, vec![IrExpr::Int(1)]);
        declare(&mut table, "m", &["a", "b"], false, vec![IrExpr::Int(2)]);

        assert_eq!(table.expand("m", vec![IrExpr::Bool(true)], &span()).unwrap(), vec![IrExpr::Int(1)]);
        assert_eq!(
            table.expand("m", vec![IrExpr::Bool(true), IrExpr::Bool(false)], &span()).unwrap(),
            vec![IrExpr::Int(2)]
        );
    }

    #[test]
    fn actuals_are_not_rewritten() {
        let mut table = MacroTable::new();
        declare(&mut table, "wrap", &["x"], false, vec![IrExpr::List(vec![ident("x")])]);

        let expanded = table.expand("wrap", vec![ident("x")], &span()).unwrap();
        assert_eq!(expanded, vec![IrExpr::List(vec![ident("x")])]);
    }
}
