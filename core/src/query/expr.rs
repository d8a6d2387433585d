//! Expressions and conditions of structured queries

use super::flavor::SqlFlavor;

/// Literal value embedded in a query
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// NULL
    Null,
    /// Whole number
    Integer(i64),
    /// Floating point number
    Real(f64),
    /// Text, quoted by the flavor
    Text(String),
}

impl Literal {
    fn to_sql(&self, flavor: &dyn SqlFlavor) -> String {
        match self {
            Literal::Null => "NULL".to_string(),
            Literal::Integer(i) => i.to_string(),
            Literal::Real(f) => f.to_string(),
            Literal::Text(s) => flavor.quote_string(s),
        }
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Integer(value as i64)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Real(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Text(value)
    }
}

/// Scalar or aggregate expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference, optionally qualified (`table.column`)
    Column(String),
    /// Literal value
    Literal(Literal),
    /// `*`
    Star,
    /// Function call
    Function {
        /// Function name, written as is
        name: String,
        /// Arguments
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Column reference
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    /// Literal value
    pub fn value(value: impl Into<Literal>) -> Self {
        Expr::Literal(value.into())
    }

    /// Render the expression
    pub fn to_sql(&self, flavor: &dyn SqlFlavor) -> String {
        match self {
            Expr::Column(name) => flavor.quote_column(name),
            Expr::Literal(literal) => literal.to_sql(flavor),
            Expr::Star => "*".to_string(),
            Expr::Function { name, args } => {
                let args: Vec<String> = args.iter().map(|a| a.to_sql(flavor)).collect();
                format!("{}({})", name, args.join(", "))
            }
        }
    }
}

/// Aggregate and scalar function constructors
#[derive(Debug)]
pub struct Func;

impl Func {
    fn call(name: &str, arg: Expr) -> Expr {
        Expr::Function {
            name: name.to_string(),
            args: vec![arg],
        }
    }

    /// `COUNT(*)`
    pub fn count_all() -> Expr {
        Self::call("COUNT", Expr::Star)
    }

    /// `COUNT(column)`
    pub fn count(column: &str) -> Expr {
        Self::call("COUNT", Expr::column(column))
    }

    /// `SUM(column)`
    pub fn sum(column: &str) -> Expr {
        Self::call("SUM", Expr::column(column))
    }

    /// `MIN(column)`
    pub fn min(column: &str) -> Expr {
        Self::call("MIN", Expr::column(column))
    }

    /// `MAX(column)`
    pub fn max(column: &str) -> Expr {
        Self::call("MAX", Expr::column(column))
    }

    /// `AVG(column)`
    pub fn avg(column: &str) -> Expr {
        Self::call("AVG", Expr::column(column))
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
}

impl CompareOp {
    fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
        }
    }
}

/// Boolean condition used in WHERE clauses
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    /// Binary comparison
    Compare {
        /// Left operand
        left: Expr,
        /// Operator
        op: CompareOp,
        /// Right operand
        right: Expr,
    },
    /// `expr LIKE pattern`
    Like(Expr, String),
    /// `expr IS NULL`
    IsNull(Expr),
    /// Negation
    Not(Box<Cond>),
    /// Conjunction
    And(Vec<Cond>),
    /// Disjunction
    Or(Vec<Cond>),
}

impl Cond {
    fn compare(column: &str, op: CompareOp, value: impl Into<Literal>) -> Self {
        Cond::Compare {
            left: Expr::column(column),
            op,
            right: Expr::value(value),
        }
    }

    /// `column = value`
    pub fn eq(column: &str, value: impl Into<Literal>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    /// `column <> value`
    pub fn ne(column: &str, value: impl Into<Literal>) -> Self {
        Self::compare(column, CompareOp::NotEq, value)
    }

    /// `column > value`
    pub fn gt(column: &str, value: impl Into<Literal>) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    /// `column >= value`
    pub fn gte(column: &str, value: impl Into<Literal>) -> Self {
        Self::compare(column, CompareOp::GtEq, value)
    }

    /// `column < value`
    pub fn lt(column: &str, value: impl Into<Literal>) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    /// `column <= value`
    pub fn lte(column: &str, value: impl Into<Literal>) -> Self {
        Self::compare(column, CompareOp::LtEq, value)
    }

    /// `column LIKE pattern`
    pub fn like(column: &str, pattern: impl Into<String>) -> Self {
        Cond::Like(Expr::column(column), pattern.into())
    }

    /// `column IS NULL`
    pub fn is_null(column: &str) -> Self {
        Cond::IsNull(Expr::column(column))
    }

    /// `NOT (cond)`
    pub fn not(cond: Cond) -> Self {
        Cond::Not(Box::new(cond))
    }

    /// All conditions must hold
    pub fn and(conds: Vec<Cond>) -> Self {
        Cond::And(conds)
    }

    /// Any condition must hold
    pub fn or(conds: Vec<Cond>) -> Self {
        Cond::Or(conds)
    }

    /// Render the condition
    pub fn to_sql(&self, flavor: &dyn SqlFlavor) -> String {
        match self {
            Cond::Compare { left, op, right } => format!(
                "{} {} {}",
                left.to_sql(flavor),
                op.as_sql(),
                right.to_sql(flavor)
            ),
            Cond::Like(expr, pattern) => {
                format!("{} LIKE {}", expr.to_sql(flavor), flavor.quote_string(pattern))
            }
            Cond::IsNull(expr) => format!("{} IS NULL", expr.to_sql(flavor)),
            Cond::Not(cond) => format!("NOT ({})", cond.to_sql(flavor)),
            Cond::And(conds) => join_conditions(conds, " AND ", "1 = 1", flavor),
            Cond::Or(conds) => join_conditions(conds, " OR ", "1 = 0", flavor),
        }
    }
}

fn join_conditions(conds: &[Cond], separator: &str, empty: &str, flavor: &dyn SqlFlavor) -> String {
    if conds.is_empty() {
        return empty.to_string();
    }
    let parts: Vec<String> = conds.iter().map(|c| format!("({})", c.to_sql(flavor))).collect();
    parts.join(separator)
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl Order {
    /// SQL keyword
    pub fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::flavor::{PostgresFlavor, SqliteFlavor};

    #[test]
    fn test_expressions() {
        assert_eq!(Func::count_all().to_sql(&SqliteFlavor), "COUNT(*)");
        assert_eq!(Func::sum("salary").to_sql(&SqliteFlavor), "SUM(`salary`)");
        assert_eq!(Expr::value("it's").to_sql(&SqliteFlavor), "'it''s'");
        assert_eq!(Expr::value(2.5).to_sql(&SqliteFlavor), "2.5");
    }

    #[test]
    fn test_conditions() {
        let cond = Cond::or(vec![
            Cond::like("label", "%jo%"),
            Cond::and(vec![Cond::gte("salary", 60000i64), Cond::not(Cond::is_null("name"))]),
        ]);
        assert_eq!(
            cond.to_sql(&SqliteFlavor),
            "(`label` LIKE '%jo%') OR ((`salary` >= 60000) AND (NOT (`name` IS NULL)))"
        );
        assert_eq!(
            Cond::eq("name", "Ann").to_sql(&PostgresFlavor),
            "\"name\" = 'Ann'"
        );
    }

    #[test]
    fn test_empty_junctions() {
        assert_eq!(Cond::and(vec![]).to_sql(&SqliteFlavor), "1 = 1");
        assert_eq!(Cond::or(vec![]).to_sql(&SqliteFlavor), "1 = 0");
    }
}
