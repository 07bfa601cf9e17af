use proptest::prelude::*;

/// One declaration made inside `declare_steps`.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Run,
    /// `in_parallel` block recording this many runs; zero records nothing
    Parallel(usize),
}

impl Declaration {
    pub fn units(&self) -> usize {
        match self {
            Declaration::Run => 1,
            Declaration::Parallel(n) => *n,
        }
    }

    pub fn adds_step(&self) -> bool {
        self.units() > 0
    }
}

/// Strategy for one declaration; parallel blocks range from empty to four units
pub fn declaration_strategy() -> impl Strategy<Value = Declaration> {
    prop_oneof![
        Just(Declaration::Run),
        (0usize..=4).prop_map(Declaration::Parallel),
    ]
}

/// Strategy for a whole `declare_steps` body
pub fn declarations_strategy() -> impl Strategy<Value = Vec<Declaration>> {
    prop::collection::vec(declaration_strategy(), 0..8)
}

/// Strategy for task type names
pub fn task_type_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9]{0,15}"
}

/// Strategy for invocation arguments
pub fn args_strategy() -> impl Strategy<Value = Vec<serde_json::Value>> {
    prop::collection::vec(
        prop_oneof![
            Just(serde_json::json!("some")),
            Just(serde_json::json!(42)),
            Just(serde_json::json!({"order_id": 7})),
            Just(serde_json::Value::Null),
        ],
        0..4,
    )
}
