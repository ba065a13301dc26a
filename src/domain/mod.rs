//! Domain types for rotor
//!
//! - Quota: weekly limits keyed by user, training type and source
//! - Training: training types, content items and training records
//! - Identity: the caller and the authentication context
//! - Definition: the legacy string-tagged quota encoding, read on import

pub mod definition;
pub mod identity;
pub mod quota;
pub mod training;

pub use definition::{DefinitionError, LegacyDefinition};
pub use identity::{AuthContext, Identity, Role};
pub use quota::{Progress, QuotaTarget, SourceId, SourceProgress, UserId, WeeklyQuota};
pub use training::{ContentItem, TrainingMarks, TrainingRecord, TrainingType};
