use crate::construct::tree::{IrBlock, IrExpr};

/// A macro is a named template.
/// When an invocation matches the macro's arity, the actual arguments are
/// bound to the formals and substituted into a copy of the body.
/// The body itself is never touched, so every invocation starts from the
/// same template.
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    pub name:     String,
    pub formals:  Vec<String>,
    /// The last formal captures a trailing run of arguments.
    pub variadic: bool,
    pub body:     IrBlock,
}

/// What a formal stands for while a macro body is being expanded.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// A formal bound to a single actual argument.
    Single(IrExpr),
    /// The variadic formal, bound to the run of trailing arguments.
    Rest(IrBlock),
}

impl Macro {
    /// Whether an invocation with `arity` arguments can use this macro.
    /// A variadic macro accepts an empty run for its last formal.
    pub fn accepts(&self, arity: usize) -> bool {
        if self.variadic {
            arity + 1 >= self.formals.len()
        } else {
            arity == self.formals.len()
        }
    }

    /// Pairs each formal with what it stands for.
    /// Expects `accepts(args.len())` to hold.
    pub fn bind(&self, mut args: IrBlock) -> Vec<(&str, Binding)> {
        let rest = if self.variadic {
            Some(args.split_off(self.formals.len() - 1))
        } else {
            None
        };

        let mut bindings = self
            .formals
            .iter()
            .map(String::as_str)
            .zip(args.into_iter().map(Binding::Single))
            .collect::<Vec<_>>();

        if let (Some(rest), Some(last)) = (rest, self.formals.last()) {
            bindings.push((last.as_str(), Binding::Rest(rest)));
        }

        bindings
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn template(formals: &[&str], variadic: bool) -> Macro {
        Macro {
            name: "m".into(),
            formals: formals.iter().map(|f| f.to_string()).collect(),
            variadic,
            body: vec![],
        }
    }

    #[test]
    fn exact_arity() {
        let m = template(&["a", "b"], false);
        assert!(m.accepts(2));
        assert!(!m.accepts(1));
        assert!(!m.accepts(3));
    }

    #[test]
    fn variadic_arity() {
        let m = template(&["a", "rest"], true);
        assert!(!m.accepts(0));
        assert!(m.accepts(1));
        assert!(m.accepts(5));
    }

    #[test]
    fn binds_trailing_run() {
        let m = template(&["a", "rest"], true);
        let bindings = m.bind(vec![IrExpr::Int(1), IrExpr::Int(2), IrExpr::Int(3)]);
        assert_eq!(
            bindings,
            vec![
                ("a", Binding::Single(IrExpr::Int(1))),
                ("rest", Binding::Rest(vec![IrExpr::Int(2), IrExpr::Int(3)])),
            ]
        );
    }

    #[test]
    fn binds_empty_run() {
        let m = template(&["a", "rest"], true);
        let bindings = m.bind(vec![IrExpr::Int(1)]);
        assert_eq!(bindings[1], ("rest", Binding::Rest(vec![])));
    }

    #[test]
    fn lone_variadic_takes_everything() {
        let m = template(&["all"], true);
        assert!(m.accepts(0));
        let bindings = m.bind(vec![IrExpr::Int(1), IrExpr::Int(2)]);
        assert_eq!(
            bindings,
            vec![("all", Binding::Rest(vec![IrExpr::Int(1), IrExpr::Int(2)]))]
        );
    }
}
