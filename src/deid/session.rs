//! Deidentification session
//!
//! A session owns the UID mapping cache and the identifier source. Records
//! deidentified through the same session share UID mappings, so study,
//! series and instance links survive across a batch. Independent sessions
//! never see each other's mappings.

use tracing::debug;

use super::ids::{anonymous_patient_id, IdGenerator, SystemIdGenerator};
use super::options::DeidentifyOptions;
use super::policy::{apply_policy, AttributeStore};
use super::uid::{derive_uid, UidMappingCache};
use crate::dicom::{dictionary, tags, Dataset, Metadata, Tag, Value, Vr};

/// Value written to Patient Identity Removed
pub const PATIENT_IDENTITY_REMOVED: &str = "YES";

#[derive(Debug, Default)]
pub struct Session<G = SystemIdGenerator> {
    uids: UidMappingCache,
    ids: G,
}

impl Session<SystemIdGenerator> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: IdGenerator> Session<G> {
    /// Session with an injected clock and random source
    #[must_use]
    pub fn with_generator(ids: G) -> Self {
        Self {
            uids: UidMappingCache::new(),
            ids,
        }
    }

    /// Anonymized replacement for `uid`, stable for the session's lifetime
    pub fn anonymize_uid(&self, uid: &str) -> String {
        self.uids.get_or_insert_with(uid, || {
            derive_uid(uid, 100_000 + self.ids.random_below(900_000))
        })
    }

    /// A new patient ID; never cached
    pub fn anonymous_patient_id(&self) -> String {
        anonymous_patient_id(&self.ids)
    }

    #[must_use]
    pub fn uid_cache(&self) -> &UidMappingCache {
        &self.uids
    }

    /// Drop every UID mapping
    pub fn reset(&self) {
        debug!(mappings = self.uids.len(), "Resetting deidentification session");
        self.uids.clear();
    }

    /// Deidentified copy of a metadata record
    #[must_use]
    pub fn deidentify_metadata(&self, metadata: &Metadata, options: &DeidentifyOptions) -> Metadata {
        let mut result = metadata.clone();
        apply_policy(&mut result, options, self);
        result
    }

    /// Deidentified copy of a full data set
    ///
    /// Applies the same policy as [`deidentify_metadata`](Self::deidentify_metadata).
    /// Other tags, private ones included, are kept. With UID anonymization on,
    /// the media storage instance UID, the frame of reference and every UID
    /// inside sequences are remapped through the same cache. Provenance is
    /// recorded in (0012,0062) and (0012,0063).
    #[must_use]
    pub fn deidentify_dataset(&self, dataset: &Dataset, options: &DeidentifyOptions) -> Dataset {
        let mut result = dataset.clone();
        apply_policy(&mut result, options, self);

        if options.anonymize_uids {
            for tag in [tags::MEDIA_STORAGE_SOP_INSTANCE_UID, tags::FRAME_OF_REFERENCE_UID] {
                if let Some(uid) = result.text(tag).filter(|uid| !uid.is_empty()) {
                    result.set_text(tag, self.anonymize_uid(&uid));
                }
            }
            self.remap_nested_uids(&mut result);
        }

        result.insert(
            tags::PATIENT_IDENTITY_REMOVED,
            Vr::CS,
            Value::from(PATIENT_IDENTITY_REMOVED),
        );
        let mut methods: Vec<String> = result
            .text(tags::DEIDENTIFICATION_METHOD)
            .map(|existing| existing.split('\\').map(str::to_string).collect())
            .unwrap_or_default();
        methods.extend(method_description(options));
        result.insert(
            tags::DEIDENTIFICATION_METHOD,
            Vr::LO,
            Value::Str(methods.join("\\")),
        );

        result
    }

    /// Remap UID elements inside sequence items, at any depth
    fn remap_nested_uids(&self, dataset: &mut Dataset) {
        let sequences: Vec<Tag> = dataset
            .iter()
            .filter(|(_, element)| matches!(element.value, Value::Sequence(_)))
            .map(|(tag, _)| tag)
            .collect();

        for tag in sequences {
            let Some(element) = dataset.get(tag) else {
                continue;
            };
            let Value::Sequence(items) = &element.value else {
                continue;
            };
            let items = items
                .iter()
                .map(|item| {
                    let mut item = item.clone();
                    self.remap_item_uids(&mut item);
                    item
                })
                .collect();
            dataset.replace_value(tag, Value::Sequence(items));
        }
    }

    fn remap_item_uids(&self, item: &mut Dataset) {
        let uid_tags: Vec<Tag> = item
            .iter()
            .filter(|(tag, _)| dictionary::is_uid(*tag))
            .map(|(tag, _)| tag)
            .collect();
        for tag in uid_tags {
            if let Some(uid) = item.text(tag).filter(|uid| !uid.is_empty()) {
                item.set_text(tag, self.anonymize_uid(&uid));
            }
        }
        self.remap_nested_uids(item);
    }
}

/// One LO value per applied rule; each fits the 64 character limit
fn method_description(options: &DeidentifyOptions) -> Vec<String> {
    let mut methods = Vec::new();
    if options.remove_patient_name {
        methods.push("Patient name replaced".to_string());
    }
    if options.remove_patient_id {
        methods.push("Patient ID replaced".to_string());
    }
    if options.remove_dates {
        methods.push("Dates and times removed".to_string());
    } else if let Some(days) = options.effective_date_shift() {
        methods.push(format!("Dates shifted by {days} days"));
    }
    if options.remove_institution {
        methods.push("Institution removed".to_string());
    }
    if options.remove_physicians {
        methods.push("Physician names removed".to_string());
    }
    if options.anonymize_uids {
        methods.push("UIDs remapped".to_string());
    }
    if !options.keep_series_info {
        methods.push("Series information removed".to_string());
    }
    methods.push("Address, telephone and accession removed".to_string());
    methods
}
