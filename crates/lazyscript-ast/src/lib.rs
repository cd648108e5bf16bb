pub mod span {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
    pub struct Span {
        pub offset: usize,
        pub len: usize,
    }
    impl Span {
        pub fn new(offset: usize, len: usize) -> Self {
            Self { offset, len }
        }
    }
}

pub mod ast {
    use crate::span::Span;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub enum PatternKind {
        Wildcard,                                  // _
        Var(String),                               // ~x
        Unit,                                      // ()
        Tuple(Vec<Pattern>),                       // (p1, p2, ...)
        Ctor { name: String, args: Vec<Pattern> }, // Foo p1 p2
        Int(i64),
        Str(String),
        As { name: String, pat: Box<Pattern> }, // ~x @ p
        // List patterns
        List(Vec<Pattern>),               // [p1, p2, ...]
        Cons(Box<Pattern>, Box<Pattern>), // h : t
        Or(Box<Pattern>, Box<Pattern>),   // p1 | p2
        Caret(Box<Pattern>),              // ^(p), matches Bottom only
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct Pattern {
        pub kind: PatternKind,
        pub span: Span,
    }
    impl Pattern {
        pub fn new(kind: PatternKind, span: Span) -> Self {
            Self { kind, span }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub enum ExprKind {
        Unit,
        Int(i64),
        Str(String),
        Ref(String),    // ~name
        Symbol(String), // .name
        Ctor(String),   // Name, applied to build constructor values
        Lambda {
            param: Pattern,
            body: Box<Expr>,
        },
        Apply {
            func: Box<Expr>,
            arg: Box<Expr>,
        },
        Tuple(Vec<Expr>),
        // List literal: [e1, e2, ...]
        List(Vec<Expr>),
        // Let-group: (p1 = e1; ...; body; pN = eN; ...)
        // Bindings can mutually/recursively reference each other within the group scope.
        LetGroup {
            bindings: Vec<(Pattern, Expr)>,
            body: Box<Expr>,
        },
        // Exceptions / control
        Raise(Box<Expr>), // ^(Expr)
        // Alternative lambda composition: (\p1 -> e1) | (\p2 -> e2)
        // Right-associative, lower precedence than || and ->
        AltLambda {
            left: Box<Expr>,
            right: Box<Expr>,
        },
        OrElse {
            left: Box<Expr>,
            right: Box<Expr>,
        }, // a || b
        Catch {
            left: Box<Expr>,
            right: Box<Expr>,
        }, // a ^| b
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct Expr {
        pub kind: ExprKind,
        pub span: Span,
    }
    impl Expr {
        pub fn new(kind: ExprKind, span: Span) -> Self {
            Self { kind, span }
        }
    }
}
