//!
//! # Dependency-Ordering Trait and Helpers
//!

// Std-lib
use std::collections::HashSet;
use std::hash::Hash;

///
/// # Dependency-Ordering Trait
///
/// Hierarchical layouts form a graph of dependencies between items:
/// components which reference other components are the prime example.
/// Writers of most layout formats require definitions to appear before their first use,
/// i.e. in dependency order.
///
/// Implementers provide two methods:
/// * `deps` returns the direct dependencies of a single `Item`.
/// * `cycle` creates the `Error` returned when a dependency cycle is detected.
///   It receives the offending path, starting and ending at the same item.
///
/// Unlike a purely item-driven ordering, implementers carry a `&self` context,
/// so `Item`s may be light-weight keys into some other store.
///
/// ```text
/// struct LibOrder<'a>(&'a Library);
/// impl DepOrder for LibOrder<'_> {
///     type Item = Key;
///     type Error = MyError;
///     fn deps(&self, item: &Key) -> Result<Vec<Key>, MyError> {
///         Ok(self.0.children(item))
///     }
///     fn cycle(&self, path: &[Key]) -> MyError {
///         MyError::Cycle(path.to_vec())
///     }
/// }
/// let ordered = LibOrder(&lib).order(&[top])?;
/// ```
///
pub trait DepOrder: Sized {
    /// Item Type. Typically pointers or keys to the nodes in the dependency graph.
    type Item: Clone + Eq + Hash;
    /// Error Type
    type Error;

    /// Direct dependencies of `item`, in the order they should be visited
    fn deps(&self, item: &Self::Item) -> Result<Vec<Self::Item>, Self::Error>;
    /// Create the error for dependency-cycle `path`
    fn cycle(&self, path: &[Self::Item]) -> Self::Error;

    /// Dependency-order all entries in slice `items`, and everything they depend upon.
    /// Dependencies always precede their dependents in the returned vector.
    fn order(&self, items: &[Self::Item]) -> Result<Vec<Self::Item>, Self::Error> {
        let mut orderer = DepOrderer {
            graph: self,
            stack: Vec::with_capacity(items.len()),
            seen: HashSet::with_capacity(items.len()),
            pending: Vec::new(),
        };
        for item in items.iter() {
            orderer.push(item)?;
        }
        Ok(orderer.stack)
    }
}

/// # Dependency Order Helper
/// Internal state of a single [DepOrder::order] call.
struct DepOrderer<'g, G: DepOrder> {
    /// Graph being ordered
    graph: &'g G,
    /// Ordered, completed items
    stack: Vec<G::Item>,
    /// Hash-set of completed items, for quick membership tests
    seen: HashSet<G::Item>,
    /// Currently-open depth-first path, for cycle detection and reporting
    pending: Vec<G::Item>,
}
impl<'g, G: DepOrder> DepOrderer<'g, G> {
    /// Push `item`'s dependencies, and then itself, onto the stack
    fn push(&mut self, item: &G::Item) -> Result<(), G::Error> {
        if self.seen.contains(item) {
            return Ok(());
        }
        // An item already on the open path closes a cycle
        if let Some(pos) = self.pending.iter().position(|p| p == item) {
            let mut path = self.pending[pos..].to_vec();
            path.push(item.clone());
            return Err(self.graph.cycle(&path));
        }
        self.pending.push(item.clone());
        for dep in self.graph.deps(item)?.iter() {
            self.push(dep)?;
        }
        self.pending.pop();
        self.seen.insert(item.clone());
        self.stack.push(item.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Adjacency-list graph of string-named nodes
    struct Graph(HashMap<&'static str, Vec<&'static str>>);
    impl DepOrder for Graph {
        type Item = &'static str;
        type Error = Vec<&'static str>;
        fn deps(&self, item: &Self::Item) -> Result<Vec<Self::Item>, Self::Error> {
            Ok(self.0.get(item).cloned().unwrap_or_default())
        }
        fn cycle(&self, path: &[Self::Item]) -> Self::Error {
            path.to_vec()
        }
    }

    #[test]
    fn test_dep_order() {
        let g = Graph(HashMap::from([
            ("top", vec!["mid", "leaf"]),
            ("mid", vec!["leaf"]),
            ("leaf", vec![]),
        ]));
        let order = g.order(&["top"]).unwrap();
        assert_eq!(order, vec!["leaf", "mid", "top"]);
        // Repeated roots are only ordered once
        let order = g.order(&["mid", "top", "mid"]).unwrap();
        assert_eq!(order, vec!["leaf", "mid", "top"]);
    }
    #[test]
    fn test_dep_cycle() {
        let g = Graph(HashMap::from([
            ("a", vec!["b"]),
            ("b", vec!["c"]),
            ("c", vec!["a"]),
        ]));
        let path = g.order(&["a"]).unwrap_err();
        assert_eq!(path, vec!["a", "b", "c", "a"]);
    }
}
