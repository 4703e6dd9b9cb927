//! S-expression rendering of the AST
//!
//! `-7 * (5)` prints as `(* (- 7) (group 5))`. Used by `luria ast` and tests.

use super::*;
use crate::interp::value::format_number;

pub fn print_program(program: &Program) -> String {
    program
        .statements
        .iter()
        .map(print_stmt)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Expression(expr) => parenthesize("expr", [print_expr(expr)]),
        Stmt::Print { value, .. } => parenthesize("print", [print_expr(value)]),
        Stmt::Variable { name, init } => {
            let mut parts = vec![name.lexeme.clone()];
            parts.extend(init.iter().map(print_expr));
            parenthesize("variable", parts)
        }
        Stmt::Block(stmts) => parenthesize("block", stmts.iter().map(print_stmt)),
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let mut parts = vec![print_expr(condition), print_stmt(then_branch)];
            parts.extend(else_branch.iter().map(|s| print_stmt(s)));
            parenthesize("if", parts)
        }
        Stmt::While { condition, body } => {
            parenthesize("while", [print_expr(condition), print_stmt(body)])
        }
        Stmt::Function(decl) => {
            let params = decl
                .params
                .iter()
                .map(|p| p.lexeme.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let mut parts = vec![decl.name.lexeme.clone(), format!("({params})")];
            parts.extend(decl.body.iter().map(print_stmt));
            parenthesize("function", parts)
        }
        Stmt::Return { value, .. } => parenthesize("return", value.iter().map(print_expr)),
        Stmt::Read { kind, target, .. } => parenthesize(kind.as_str(), [print_expr(target)]),
    }
}

pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal { value } => match value {
            Literal::Null => "null".to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Number(n) => format_number(*n),
            Literal::String(s) => format!("\"{s}\""),
        },
        Expr::Grouping { inner } => parenthesize("group", [print_expr(inner)]),
        Expr::Unary { op, operand, .. } => parenthesize(op.as_str(), [print_expr(operand)]),
        Expr::Binary {
            left, op, right, ..
        } => parenthesize(op.as_str(), [print_expr(left), print_expr(right)]),
        Expr::Logical { left, op, right } => {
            parenthesize(op.as_str(), [print_expr(left), print_expr(right)])
        }
        Expr::Assign { name, value } => {
            parenthesize("=", [name.lexeme.clone(), print_expr(value)])
        }
        Expr::Variable { name } => name.lexeme.clone(),
        Expr::Call { callee, args, .. } => {
            let mut parts = vec![print_expr(callee)];
            parts.extend(args.iter().map(print_expr));
            parenthesize("call", parts)
        }
        Expr::Array { elements } => parenthesize("array", elements.iter().map(print_expr)),
        Expr::Index { object, index, .. } => {
            parenthesize("index", [print_expr(object), print_expr(index)])
        }
        Expr::IndexAssign {
            object,
            index,
            value,
            ..
        } => {
            let target = parenthesize("index", [print_expr(object), print_expr(index)]);
            parenthesize("=", [target, print_expr(value)])
        }
    }
}

fn parenthesize(name: &str, parts: impl IntoIterator<Item = String>) -> String {
    let mut out = format!("({name}");
    for part in parts {
        out.push(' ');
        out.push_str(&part);
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn render(source: &str) -> String {
        let lexed = lex(source);
        let parsed = parse(&lexed.tokens);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        print_program(&parsed.program)
    }

    #[test]
    fn negation_times_group() {
        insta::assert_snapshot!(render("-7 * (5);"), @"(expr (* (- 7) (group 5)))");
    }

    #[test]
    fn precedence_is_visible() {
        insta::assert_snapshot!(
            render("print 1 + 2 * 3 ^ 2;"),
            @"(print (+ 1 (* 2 (^ 3 2))))"
        );
    }

    #[test]
    fn statements() {
        let source = r#"
variable a = [1, "two"];
a[0] = null;
function f(x, y) { return x or y; }
if (a) print f(1)[0]; else { readnumber a; }
"#;
        insta::assert_snapshot!(render(source), @r#"
        (variable a (array 1 "two"))
        (expr (= (index a 0) null))
        (function f (x y) (return (or x y)))
        (if a (print (index (call f 1) 0)) (block (readnumber a)))
        "#);
    }
}
