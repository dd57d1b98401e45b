use credit_core::Aspect;
use std::collections::BTreeSet;

/// Per-widget presentation flags for one render. Keys are widget
/// identifiers such as `aspect:liquidity`.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    expanded: BTreeSet<String>,
    pub full_reasoning: bool,
}

impl ViewState {
    pub fn with_full_reasoning(full_reasoning: bool) -> Self {
        Self {
            full_reasoning,
            ..Self::default()
        }
    }

    fn aspect_key(aspect: Aspect) -> String {
        format!("aspect:{}", aspect.key())
    }

    pub fn expand(&mut self, key: impl Into<String>) {
        self.expanded.insert(key.into());
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }

    pub fn expand_aspect(&mut self, aspect: Aspect) {
        self.expand(Self::aspect_key(aspect));
    }

    pub fn is_aspect_expanded(&self, aspect: Aspect) -> bool {
        self.is_expanded(&Self::aspect_key(aspect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_independent() {
        let mut state = ViewState::default();
        state.expand_aspect(Aspect::Solvency);
        assert!(state.is_expanded("aspect:solvency"));
        assert!(!state.is_aspect_expanded(Aspect::Liquidity));
        assert!(!state.full_reasoning);
    }

    #[test]
    fn test_full_reasoning_starts_collapsed() {
        let state = ViewState::with_full_reasoning(true);
        assert!(state.full_reasoning);
        assert!(Aspect::ALL.iter().all(|a| !state.is_aspect_expanded(*a)));
    }
}
