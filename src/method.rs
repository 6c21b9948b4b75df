//! Method specs: what HTTP methods a route accepts.
//!
//! A route declares its methods as a literal (`"GET"`), the wildcard (`"*"`),
//! or a set (`["POST", "PUT"]`). Matching is case-insensitive on both sides —
//! `"get"` and `"GET"` are the same method. Tokens are lowercased once at
//! registration so lookup compares without allocating.

/// The methods a route accepts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MethodSpec {
    /// The `*` wildcard — matches every method.
    Any,
    /// A single method token, stored lowercase.
    Only(String),
    /// A set of method tokens, each stored lowercase.
    AnyOf(Vec<String>),
}

impl MethodSpec {
    /// Returns true when `method` satisfies this spec.
    ///
    /// `method` is case-folded before comparison. A set matches if any of its
    /// elements matches; an element equal to `*` matches every method.
    pub fn matches(&self, method: &str) -> bool {
        let method = method.to_ascii_lowercase();
        match self {
            Self::Any => true,
            Self::Only(m) => m == "*" || *m == method,
            Self::AnyOf(set) => set.iter().any(|m| m == "*" || *m == method),
        }
    }
}

impl From<&str> for MethodSpec {
    fn from(s: &str) -> Self {
        if s == "*" {
            Self::Any
        } else {
            Self::Only(s.to_ascii_lowercase())
        }
    }
}

impl From<Vec<&str>> for MethodSpec {
    fn from(set: Vec<&str>) -> Self {
        Self::AnyOf(set.into_iter().map(str::to_ascii_lowercase).collect())
    }
}

impl From<&[&str]> for MethodSpec {
    fn from(set: &[&str]) -> Self {
        Self::AnyOf(set.iter().map(|m| m.to_ascii_lowercase()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matches_everything() {
        let spec = MethodSpec::from("*");
        assert!(spec.matches("GET"));
        assert!(spec.matches("delete"));
        assert!(spec.matches("BREW"));
    }

    #[test]
    fn single_is_case_insensitive() {
        let spec = MethodSpec::from("GET");
        assert!(spec.matches("get"));
        assert!(spec.matches("GET"));
        assert!(spec.matches("GeT"));
        assert!(!spec.matches("POST"));
    }

    #[test]
    fn set_matches_any_element() {
        let spec = MethodSpec::from(vec!["post", "GET"]);
        assert!(spec.matches("get"));
        assert!(spec.matches("POST"));
        assert!(!spec.matches("put"));
    }

    #[test]
    fn wildcard_inside_set() {
        let spec = MethodSpec::from(vec!["post", "*"]);
        assert!(spec.matches("head"));
    }

    #[test]
    fn empty_set_never_matches() {
        let spec = MethodSpec::AnyOf(Vec::new());
        assert!(!spec.matches("get"));
    }
}
