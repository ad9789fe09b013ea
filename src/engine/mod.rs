// ==========================================
// 柜内接线导入系统 - 引擎层
// ==========================================
// 职责: 标签解析、类型指纹、类型注册、规则目录、连接推断
// 红线: Engine 不拼 SQL；解析/规范化/推断均为纯函数，永不报错
// ==========================================

pub mod connection_inference;
pub mod error;
pub mod fingerprint;
pub mod identifier_parser;
pub mod pair_classifier;
pub mod rule_bootstrap;
pub mod rule_catalog;
pub mod terminal_filter;
pub mod type_registry;
pub mod vertex_classifier;

// 重导出核心引擎
pub use connection_inference::infer;
pub use error::{RuleCatalogError, RuleCatalogResult};
pub use fingerprint::{canonicalize, EMPTY_FINGERPRINT};
pub use identifier_parser::{parse, DEFAULT_TERMINAL};
pub use pair_classifier::classify_pair;
pub use rule_bootstrap::bootstrap;
pub use terminal_filter::{is_cross_device_eligible, is_protective_terminal};
pub use type_registry::{TypeLabelAllocator, TypeRegistry, TypeResolution};
pub use vertex_classifier::{VertexClassifier, DEFAULT_PANEL_LOCATION_PREFIX};
