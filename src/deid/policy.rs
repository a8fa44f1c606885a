//! The deidentification policy, applied through a tag-keyed view
//!
//! [`Metadata`] and [`Dataset`] both implement [`AttributeStore`], so the
//! two deidentification paths run the same [`apply_policy`].

use super::dates::shift_date;
use super::ids::IdGenerator;
use super::options::DeidentifyOptions;
use super::session::Session;
use crate::dicom::{dictionary, tags, Dataset, Metadata, Tag, Value, Vr};

/// Replacement for the patient name
pub const ANONYMOUS_NAME: &str = "ANONYMOUS";

/// Dates that are shifted or removed
pub const DATE_TAGS: [Tag; 5] = [
    tags::PATIENT_BIRTH_DATE,
    tags::STUDY_DATE,
    tags::SERIES_DATE,
    tags::ACQUISITION_DATE,
    tags::CONTENT_DATE,
];

/// Times are removed together with dates but never shifted
pub const TIME_TAGS: [Tag; 4] = [
    tags::STUDY_TIME,
    tags::SERIES_TIME,
    tags::ACQUISITION_TIME,
    tags::CONTENT_TIME,
];

pub const INSTITUTION_TAGS: [Tag; 3] = [
    tags::INSTITUTION_NAME,
    tags::INSTITUTION_ADDRESS,
    tags::INSTITUTIONAL_DEPARTMENT_NAME,
];

pub const PHYSICIAN_TAGS: [Tag; 3] = [
    tags::REFERRING_PHYSICIAN_NAME,
    tags::PERFORMING_PHYSICIAN_NAME,
    tags::OPERATORS_NAME,
];

pub const INSTANCE_UID_TAGS: [Tag; 3] = [
    tags::STUDY_INSTANCE_UID,
    tags::SERIES_INSTANCE_UID,
    tags::SOP_INSTANCE_UID,
];

/// Cleared unless series information is kept
pub const SERIES_INFO_TAGS: [Tag; 4] = [
    tags::SERIES_DESCRIPTION,
    tags::SERIES_NUMBER,
    tags::MODALITY,
    tags::STUDY_DESCRIPTION,
];

/// Cleared regardless of options
pub const ALWAYS_CLEARED_TAGS: [Tag; 3] = [
    tags::PATIENT_ADDRESS,
    tags::PATIENT_TELEPHONE_NUMBERS,
    tags::ACCESSION_NUMBER,
];

/// Text view over a record, keyed by tag
pub trait AttributeStore {
    /// Current value, without padding; `None` when absent
    fn text(&self, tag: Tag) -> Option<String>;

    fn set_text(&mut self, tag: Tag, value: String);

    /// Make the attribute absent
    fn clear(&mut self, tag: Tag);
}

/// Apply the policy in `options` to `store`
pub fn apply_policy<S, G>(store: &mut S, options: &DeidentifyOptions, session: &Session<G>)
where
    S: AttributeStore + ?Sized,
    G: IdGenerator,
{
    if options.remove_patient_name {
        store.set_text(tags::PATIENT_NAME, ANONYMOUS_NAME.to_string());
    }

    if options.remove_patient_id {
        store.set_text(tags::PATIENT_ID, session.anonymous_patient_id());
    }

    if options.remove_dates {
        for tag in DATE_TAGS.iter().chain(TIME_TAGS.iter()) {
            store.clear(*tag);
        }
    } else if let Some(days) = options.effective_date_shift() {
        for tag in DATE_TAGS {
            match store.text(tag).and_then(|date| shift_date(&date, days)) {
                Some(shifted) => store.set_text(tag, shifted),
                None => store.clear(tag),
            }
        }
    }

    if options.remove_institution {
        for tag in INSTITUTION_TAGS {
            store.clear(tag);
        }
    }

    if options.remove_physicians {
        for tag in PHYSICIAN_TAGS {
            store.clear(tag);
        }
    }

    if options.anonymize_uids {
        for tag in INSTANCE_UID_TAGS {
            if let Some(uid) = store.text(tag).filter(|uid| !uid.is_empty()) {
                store.set_text(tag, session.anonymize_uid(&uid));
            }
        }
    }

    if !options.keep_series_info {
        for tag in SERIES_INFO_TAGS {
            store.clear(tag);
        }
    }

    for tag in ALWAYS_CLEARED_TAGS {
        store.clear(tag);
    }
}

macro_rules! metadata_text_fields {
    ($($tag:ident => $group:ident . $field:ident),* $(,)?) => {
        fn text_field(metadata: &Metadata, tag: Tag) -> Option<&Option<String>> {
            match tag {
                $(tags::$tag => Some(&metadata.$group.$field),)*
                _ => None,
            }
        }

        fn text_field_mut(metadata: &mut Metadata, tag: Tag) -> Option<&mut Option<String>> {
            match tag {
                $(tags::$tag => Some(&mut metadata.$group.$field),)*
                _ => None,
            }
        }
    };
}

metadata_text_fields! {
    PATIENT_NAME => patient.name,
    PATIENT_ID => patient.id,
    PATIENT_BIRTH_DATE => patient.birth_date,
    PATIENT_ADDRESS => patient.address,
    PATIENT_TELEPHONE_NUMBERS => patient.telephone_numbers,
    STUDY_INSTANCE_UID => study.instance_uid,
    STUDY_DATE => study.date,
    STUDY_TIME => study.time,
    STUDY_DESCRIPTION => study.description,
    ACCESSION_NUMBER => study.accession_number,
    REFERRING_PHYSICIAN_NAME => study.referring_physician,
    SERIES_INSTANCE_UID => series.instance_uid,
    SERIES_DESCRIPTION => series.description,
    MODALITY => series.modality,
    SERIES_DATE => series.date,
    SERIES_TIME => series.time,
    PERFORMING_PHYSICIAN_NAME => series.performing_physician,
    OPERATORS_NAME => series.operators,
    SOP_INSTANCE_UID => instance.sop_instance_uid,
    ACQUISITION_DATE => instance.acquisition_date,
    ACQUISITION_TIME => instance.acquisition_time,
    CONTENT_DATE => instance.content_date,
    CONTENT_TIME => instance.content_time,
    INSTITUTION_NAME => institution.name,
    INSTITUTION_ADDRESS => institution.address,
    INSTITUTIONAL_DEPARTMENT_NAME => institution.department,
}

impl AttributeStore for Metadata {
    fn text(&self, tag: Tag) -> Option<String> {
        if tag == tags::SERIES_NUMBER {
            return self.series.number.map(|n| n.to_string());
        }
        text_field(self, tag).and_then(Clone::clone)
    }

    fn set_text(&mut self, tag: Tag, value: String) {
        if tag == tags::SERIES_NUMBER {
            self.series.number = value.trim().parse().ok();
        } else if let Some(field) = text_field_mut(self, tag) {
            *field = Some(value);
        }
    }

    fn clear(&mut self, tag: Tag) {
        if tag == tags::SERIES_NUMBER {
            self.series.number = None;
        } else if let Some(field) = text_field_mut(self, tag) {
            *field = None;
        }
    }
}

impl AttributeStore for Dataset {
    fn text(&self, tag: Tag) -> Option<String> {
        match self.value(tag)? {
            Value::Str(s) => Some(s.trim_end_matches([' ', '\0']).to_string()),
            other => other.first_int().map(|n| n.to_string()),
        }
    }

    fn set_text(&mut self, tag: Tag, value: String) {
        let vr = self
            .get(tag)
            .map(|element| element.vr)
            .or_else(|| dictionary::lookup(tag).map(|entry| entry.vr))
            .unwrap_or(Vr::LO);
        self.insert(tag, vr, Value::Str(value));
    }

    fn clear(&mut self, tag: Tag) {
        self.remove(tag);
    }
}
