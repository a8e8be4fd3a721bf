use std::fmt::{self, Display, Formatter};

/// An ordered run of expressions.
/// Order is significant to whatever executes the tree.
pub type IrBlock = Vec<IrExpr>;

#[derive(Debug, Clone, PartialEq)]
pub struct Elif {
    pub cond: Box<IrExpr>,
    pub body: IrBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub key:  String,
    pub expr: Box<IrExpr>,
}

/// The tree handed to the serializer once parsing and macro expansion
/// are done. Every walk over the tree matches on this exhaustively, so
/// adding a node kind is checked everywhere it matters.
#[derive(Debug, Clone, PartialEq)]
pub enum IrExpr {
    Block(IrBlock),
    /// A function definition. Without a name it's a lambda.
    FuncDef {
        name:   Option<String>,
        params: Vec<String>,
        body:   IrBlock,
    },
    FuncCall {
        name: String,
        args: IrBlock,
    },
    VarDef {
        name: String,
        init: Box<IrExpr>,
    },
    If {
        cond:      Box<IrExpr>,
        body:      IrBlock,
        elifs:     Vec<Elif>,
        else_body: Option<IrBlock>,
    },
    While {
        cond: Box<IrExpr>,
        body: IrBlock,
    },
    Set {
        dest: String,
        src:  Box<IrExpr>,
    },
    Field {
        record: Box<IrExpr>,
        name:   String,
        value:  Option<Box<IrExpr>>,
    },
    List(IrBlock),
    Ident(String),
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Record(Vec<RecordField>),
}

impl IrExpr {
    pub fn ident(name: &str) -> IrExpr { IrExpr::Ident(name.to_string()) }

    pub fn call(name: &str, args: IrBlock) -> IrExpr {
        IrExpr::FuncCall {
            name: name.to_string(),
            args,
        }
    }

    pub fn var_def(name: &str, init: IrExpr) -> IrExpr {
        IrExpr::VarDef {
            name: name.to_string(),
            init: Box::new(init),
        }
    }

    pub fn is_lambda(&self) -> bool { matches!(self, IrExpr::FuncDef { name: None, .. }) }
}

fn write_seq(f: &mut Formatter<'_>, block: &[IrExpr]) -> fmt::Result {
    for expr in block {
        write!(f, " {}", expr)?;
    }
    Ok(())
}

impl Display for IrExpr {
    /// Prints the tree back in the shape of the surface syntax.
    /// Blocks produced by macros and `use` have no surface syntax and
    /// print as `(block ...)`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IrExpr::Block(block) => {
                write!(f, "(block")?;
                write_seq(f, block)?;
                write!(f, ")")
            },
            IrExpr::FuncDef { name, params, body } => {
                write!(f, "(fun")?;
                if let Some(name) = name {
                    write!(f, " {}", name)?;
                }
                write!(f, " [{}]", params.join(" "))?;
                write_seq(f, body)?;
                write!(f, ")")
            },
            IrExpr::FuncCall { name, args } => {
                write!(f, "({}", name)?;
                write_seq(f, args)?;
                write!(f, ")")
            },
            IrExpr::VarDef { name, init } => write!(f, "(let {} {})", name, init),
            IrExpr::If {
                cond,
                body,
                elifs,
                else_body,
            } => {
                write!(f, "(if {}", cond)?;
                write_seq(f, body)?;
                for elif in elifs {
                    write!(f, " elif {}", elif.cond)?;
                    write_seq(f, &elif.body)?;
                }
                if let Some(else_body) = else_body {
                    write!(f, " else")?;
                    write_seq(f, else_body)?;
                }
                write!(f, ")")
            },
            IrExpr::While { cond, body } => {
                write!(f, "(while {}", cond)?;
                write_seq(f, body)?;
                write!(f, ")")
            },
            IrExpr::Set { dest, src } => write!(f, "(set {} {})", dest, src),
            IrExpr::Field {
                record,
                name,
                value,
            } => {
                write!(f, "(field {} {}", record, name)?;
                if let Some(value) = value {
                    write!(f, " {}", value)?;
                }
                write!(f, ")")
            },
            IrExpr::List(content) => {
                write!(f, "[{}]", print_block(content))
            },
            IrExpr::Ident(name) => write!(f, "{}", name),
            IrExpr::String(string) => write!(f, "{:?}", string),
            IrExpr::Int(n) => write!(f, "{}", n),
            IrExpr::Float(n) => write!(f, "{:?}", n),
            IrExpr::Bool(b) => write!(f, "{}", b),
            IrExpr::Record(fields) => {
                let fields = fields
                    .iter()
                    .map(|field| format!("{}: {}", field.key, field.expr))
                    .collect::<Vec<_>>();
                write!(f, "{{{}}}", fields.join(" "))
            },
        }
    }
}

/// Prints a block as space-separated expressions.
pub fn print_block(block: &[IrExpr]) -> String {
    block
        .iter()
        .map(|expr| expr.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
