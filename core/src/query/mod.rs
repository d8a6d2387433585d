//! Query model
//!
//! Anything that can render itself to SQL for a given flavor is
//! [`Sequelizable`]. Structured queries are built with [`SelectQuery`],
//! hand-written SQL goes through [`RawQuery`].

mod expr;
mod flavor;
mod raw;
mod select;

pub use expr::{CompareOp, Cond, Expr, Func, Literal, Order};
pub use flavor::{PostgresFlavor, SqlFlavor, SqliteFlavor};
pub use raw::RawQuery;
pub use select::{SelectQuery, Source};

/// A query that renders to SQL text
pub trait Sequelizable: Send + Sync {
    /// Render for the given flavor
    fn to_sql(&self, flavor: &dyn SqlFlavor) -> String;
}

impl<T: Sequelizable + ?Sized> Sequelizable for &T {
    fn to_sql(&self, flavor: &dyn SqlFlavor) -> String {
        (**self).to_sql(flavor)
    }
}

impl<T: Sequelizable + ?Sized> Sequelizable for Box<T> {
    fn to_sql(&self, flavor: &dyn SqlFlavor) -> String {
        (**self).to_sql(flavor)
    }
}

impl Sequelizable for String {
    fn to_sql(&self, _flavor: &dyn SqlFlavor) -> String {
        self.clone()
    }
}

impl Sequelizable for str {
    fn to_sql(&self, _flavor: &dyn SqlFlavor) -> String {
        self.to_string()
    }
}
