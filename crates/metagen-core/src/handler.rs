use serde::{Deserialize, Serialize};

/// Target tree a handler writes into.
///
/// Source handlers write into the main source tree, test handlers into the
/// integration-test tree. The infix is inserted into generated class names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerType {
    SourceDomain,
    TestDomain,
}

impl HandlerType {
    pub fn infix(&self) -> &'static str {
        match self {
            HandlerType::SourceDomain => "",
            HandlerType::TestDomain => "Test",
        }
    }
}

/// Stable parser identifiers, also used as configuration keys.
pub mod parser_ids {
    pub const RELATION: &str = "opensaga.RELATION_MODEL_HANDLER";
    pub const DOMAIN_TYPE: &str = "opensaga.DOMAIN_TYPE_MODEL_HANDLER";
    pub const EXTERNAL_DOMAIN_TYPE: &str = "opensaga.EXTERNAL_DOMAIN_TYPE_MODEL_HANDLER";
    pub const PROCESS: &str = "opensaga.PROCESS_MODEL_HANDLER";
    pub const VIEW: &str = "opensaga.VIEW_MODEL_HANDLER";
    pub const TEST_DOMAIN_TYPE: &str = "opensaga.DOMAIN_TEST_TYPE_MODEL_HANDLER";
    pub const TEST_EXTERNAL_DOMAIN_TYPE: &str = "opensaga.EXTERNAL_DOMAIN_TEST_TYPE_MODEL_HANDLER";

    /// View parser configuration key naming the superclass of generated views.
    pub const CONFIG_KEY_EXTENDS_CLASS: &str = "EXTENDS_CLASS";
}
