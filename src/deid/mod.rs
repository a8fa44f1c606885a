//! Deidentification of metadata records and full data sets
//!
//! The policy is configured with [`DeidentifyOptions`] and run through a
//! [`Session`], which keeps UID replacements consistent across a batch.

mod dates;
mod ids;
mod options;
mod policy;
mod session;
mod uid;

pub use dates::shift_date;
pub use ids::{anonymous_patient_id, IdGenerator, SystemIdGenerator, ANONYMOUS_ID_PREFIX};
pub use options::{DeidentificationPolicyInvalid, DeidentifyOptions, OptionsUpdate, PolicyViolation};
pub use policy::{apply_policy, AttributeStore, ANONYMOUS_NAME};
pub use session::{Session, PATIENT_IDENTITY_REMOVED};
pub use uid::{derive_uid, UidMappingCache, UID_ROOT};
