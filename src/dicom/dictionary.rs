//! Tag dictionary
//!
//! Maps the tags this crate interprets to their keyword and VR, and
//! classifies them for deidentification. Tags outside the table are still
//! parsed and kept; the standard data dictionary from the `dicom` crate is
//! only consulted to give them a readable name.

use dicom::core::dictionary::{DataDictionary, DataDictionaryEntry};
use dicom_dictionary_std::StandardDataDictionary;

use super::dataset::Tag;
use super::vr::Vr;

/// Deidentification class of a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCategory {
    /// Directly identifies a person or institution
    Phi,
    Date,
    Time,
    /// Instance UID that links records together
    Uid,
    Other,
}

#[derive(Debug, Clone, Copy)]
pub struct DictionaryEntry {
    pub tag: Tag,
    pub keyword: &'static str,
    pub vr: Vr,
    pub category: TagCategory,
}

pub mod tags {
    use crate::dicom::dataset::Tag;

    pub const FILE_META_INFORMATION_GROUP_LENGTH: Tag = Tag::new(0x0002, 0x0000);
    pub const FILE_META_INFORMATION_VERSION: Tag = Tag::new(0x0002, 0x0001);
    pub const MEDIA_STORAGE_SOP_CLASS_UID: Tag = Tag::new(0x0002, 0x0002);
    pub const MEDIA_STORAGE_SOP_INSTANCE_UID: Tag = Tag::new(0x0002, 0x0003);
    pub const TRANSFER_SYNTAX_UID: Tag = Tag::new(0x0002, 0x0010);
    pub const IMPLEMENTATION_CLASS_UID: Tag = Tag::new(0x0002, 0x0012);
    pub const IMPLEMENTATION_VERSION_NAME: Tag = Tag::new(0x0002, 0x0013);

    pub const SPECIFIC_CHARACTER_SET: Tag = Tag::new(0x0008, 0x0005);
    pub const IMAGE_TYPE: Tag = Tag::new(0x0008, 0x0008);
    pub const INSTANCE_CREATION_DATE: Tag = Tag::new(0x0008, 0x0012);
    pub const INSTANCE_CREATION_TIME: Tag = Tag::new(0x0008, 0x0013);
    pub const SOP_CLASS_UID: Tag = Tag::new(0x0008, 0x0016);
    pub const SOP_INSTANCE_UID: Tag = Tag::new(0x0008, 0x0018);
    pub const STUDY_DATE: Tag = Tag::new(0x0008, 0x0020);
    pub const SERIES_DATE: Tag = Tag::new(0x0008, 0x0021);
    pub const ACQUISITION_DATE: Tag = Tag::new(0x0008, 0x0022);
    pub const CONTENT_DATE: Tag = Tag::new(0x0008, 0x0023);
    pub const STUDY_TIME: Tag = Tag::new(0x0008, 0x0030);
    pub const SERIES_TIME: Tag = Tag::new(0x0008, 0x0031);
    pub const ACQUISITION_TIME: Tag = Tag::new(0x0008, 0x0032);
    pub const CONTENT_TIME: Tag = Tag::new(0x0008, 0x0033);
    pub const ACCESSION_NUMBER: Tag = Tag::new(0x0008, 0x0050);
    pub const MODALITY: Tag = Tag::new(0x0008, 0x0060);
    pub const MANUFACTURER: Tag = Tag::new(0x0008, 0x0070);
    pub const INSTITUTION_NAME: Tag = Tag::new(0x0008, 0x0080);
    pub const INSTITUTION_ADDRESS: Tag = Tag::new(0x0008, 0x0081);
    pub const REFERRING_PHYSICIAN_NAME: Tag = Tag::new(0x0008, 0x0090);
    pub const STATION_NAME: Tag = Tag::new(0x0008, 0x1010);
    pub const STUDY_DESCRIPTION: Tag = Tag::new(0x0008, 0x1030);
    pub const SERIES_DESCRIPTION: Tag = Tag::new(0x0008, 0x103E);
    pub const INSTITUTIONAL_DEPARTMENT_NAME: Tag = Tag::new(0x0008, 0x1040);
    pub const PERFORMING_PHYSICIAN_NAME: Tag = Tag::new(0x0008, 0x1050);
    pub const OPERATORS_NAME: Tag = Tag::new(0x0008, 0x1070);
    pub const REFERENCED_SOP_CLASS_UID: Tag = Tag::new(0x0008, 0x1150);
    pub const REFERENCED_SOP_INSTANCE_UID: Tag = Tag::new(0x0008, 0x1155);

    pub const PATIENT_NAME: Tag = Tag::new(0x0010, 0x0010);
    pub const PATIENT_ID: Tag = Tag::new(0x0010, 0x0020);
    pub const PATIENT_BIRTH_DATE: Tag = Tag::new(0x0010, 0x0030);
    pub const PATIENT_SEX: Tag = Tag::new(0x0010, 0x0040);
    pub const PATIENT_AGE: Tag = Tag::new(0x0010, 0x1010);
    pub const PATIENT_ADDRESS: Tag = Tag::new(0x0010, 0x1040);
    pub const PATIENT_TELEPHONE_NUMBERS: Tag = Tag::new(0x0010, 0x2154);

    pub const PATIENT_IDENTITY_REMOVED: Tag = Tag::new(0x0012, 0x0062);
    pub const DEIDENTIFICATION_METHOD: Tag = Tag::new(0x0012, 0x0063);

    pub const SLICE_THICKNESS: Tag = Tag::new(0x0018, 0x0050);

    pub const STUDY_INSTANCE_UID: Tag = Tag::new(0x0020, 0x000D);
    pub const SERIES_INSTANCE_UID: Tag = Tag::new(0x0020, 0x000E);
    pub const STUDY_ID: Tag = Tag::new(0x0020, 0x0010);
    pub const SERIES_NUMBER: Tag = Tag::new(0x0020, 0x0011);
    pub const INSTANCE_NUMBER: Tag = Tag::new(0x0020, 0x0013);
    pub const FRAME_OF_REFERENCE_UID: Tag = Tag::new(0x0020, 0x0052);

    pub const SAMPLES_PER_PIXEL: Tag = Tag::new(0x0028, 0x0002);
    pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag::new(0x0028, 0x0004);
    pub const PLANAR_CONFIGURATION: Tag = Tag::new(0x0028, 0x0006);
    pub const NUMBER_OF_FRAMES: Tag = Tag::new(0x0028, 0x0008);
    pub const ROWS: Tag = Tag::new(0x0028, 0x0010);
    pub const COLUMNS: Tag = Tag::new(0x0028, 0x0011);
    pub const PIXEL_ASPECT_RATIO: Tag = Tag::new(0x0028, 0x0034);
    pub const BITS_ALLOCATED: Tag = Tag::new(0x0028, 0x0100);
    pub const BITS_STORED: Tag = Tag::new(0x0028, 0x0101);
    pub const HIGH_BIT: Tag = Tag::new(0x0028, 0x0102);
    pub const PIXEL_REPRESENTATION: Tag = Tag::new(0x0028, 0x0103);
    pub const WINDOW_CENTER: Tag = Tag::new(0x0028, 0x1050);
    pub const WINDOW_WIDTH: Tag = Tag::new(0x0028, 0x1051);
    pub const RESCALE_INTERCEPT: Tag = Tag::new(0x0028, 0x1052);
    pub const RESCALE_SLOPE: Tag = Tag::new(0x0028, 0x1053);

    pub const PIXEL_DATA: Tag = Tag::new(0x7FE0, 0x0010);

    pub const ITEM: Tag = Tag::new(0xFFFE, 0xE000);
    pub const ITEM_DELIMITATION_ITEM: Tag = Tag::new(0xFFFE, 0xE00D);
    pub const SEQUENCE_DELIMITATION_ITEM: Tag = Tag::new(0xFFFE, 0xE0DD);
}

macro_rules! entry {
    ($tag:ident, $keyword:literal, $vr:ident, $category:ident) => {
        DictionaryEntry {
            tag: tags::$tag,
            keyword: $keyword,
            vr: Vr::$vr,
            category: TagCategory::$category,
        }
    };
}

/// Sorted by tag
static ENTRIES: &[DictionaryEntry] = &[
    entry!(FILE_META_INFORMATION_GROUP_LENGTH, "FileMetaInformationGroupLength", UL, Other),
    entry!(FILE_META_INFORMATION_VERSION, "FileMetaInformationVersion", OB, Other),
    entry!(MEDIA_STORAGE_SOP_CLASS_UID, "MediaStorageSOPClassUID", UI, Other),
    entry!(MEDIA_STORAGE_SOP_INSTANCE_UID, "MediaStorageSOPInstanceUID", UI, Uid),
    entry!(TRANSFER_SYNTAX_UID, "TransferSyntaxUID", UI, Other),
    entry!(IMPLEMENTATION_CLASS_UID, "ImplementationClassUID", UI, Other),
    entry!(IMPLEMENTATION_VERSION_NAME, "ImplementationVersionName", SH, Other),
    entry!(SPECIFIC_CHARACTER_SET, "SpecificCharacterSet", CS, Other),
    entry!(IMAGE_TYPE, "ImageType", CS, Other),
    entry!(INSTANCE_CREATION_DATE, "InstanceCreationDate", DA, Date),
    entry!(INSTANCE_CREATION_TIME, "InstanceCreationTime", TM, Time),
    entry!(SOP_CLASS_UID, "SOPClassUID", UI, Other),
    entry!(SOP_INSTANCE_UID, "SOPInstanceUID", UI, Uid),
    entry!(STUDY_DATE, "StudyDate", DA, Date),
    entry!(SERIES_DATE, "SeriesDate", DA, Date),
    entry!(ACQUISITION_DATE, "AcquisitionDate", DA, Date),
    entry!(CONTENT_DATE, "ContentDate", DA, Date),
    entry!(STUDY_TIME, "StudyTime", TM, Time),
    entry!(SERIES_TIME, "SeriesTime", TM, Time),
    entry!(ACQUISITION_TIME, "AcquisitionTime", TM, Time),
    entry!(CONTENT_TIME, "ContentTime", TM, Time),
    entry!(ACCESSION_NUMBER, "AccessionNumber", SH, Phi),
    entry!(MODALITY, "Modality", CS, Other),
    entry!(MANUFACTURER, "Manufacturer", LO, Other),
    entry!(INSTITUTION_NAME, "InstitutionName", LO, Phi),
    entry!(INSTITUTION_ADDRESS, "InstitutionAddress", ST, Phi),
    entry!(REFERRING_PHYSICIAN_NAME, "ReferringPhysicianName", PN, Phi),
    entry!(STATION_NAME, "StationName", SH, Phi),
    entry!(STUDY_DESCRIPTION, "StudyDescription", LO, Other),
    entry!(SERIES_DESCRIPTION, "SeriesDescription", LO, Other),
    entry!(INSTITUTIONAL_DEPARTMENT_NAME, "InstitutionalDepartmentName", LO, Phi),
    entry!(PERFORMING_PHYSICIAN_NAME, "PerformingPhysicianName", PN, Phi),
    entry!(OPERATORS_NAME, "OperatorsName", PN, Phi),
    entry!(REFERENCED_SOP_CLASS_UID, "ReferencedSOPClassUID", UI, Other),
    entry!(REFERENCED_SOP_INSTANCE_UID, "ReferencedSOPInstanceUID", UI, Uid),
    entry!(PATIENT_NAME, "PatientName", PN, Phi),
    entry!(PATIENT_ID, "PatientID", LO, Phi),
    entry!(PATIENT_BIRTH_DATE, "PatientBirthDate", DA, Date),
    entry!(PATIENT_SEX, "PatientSex", CS, Other),
    entry!(PATIENT_AGE, "PatientAge", AS, Other),
    entry!(PATIENT_ADDRESS, "PatientAddress", LO, Phi),
    entry!(PATIENT_TELEPHONE_NUMBERS, "PatientTelephoneNumbers", SH, Phi),
    entry!(PATIENT_IDENTITY_REMOVED, "PatientIdentityRemoved", CS, Other),
    entry!(DEIDENTIFICATION_METHOD, "DeidentificationMethod", LO, Other),
    entry!(SLICE_THICKNESS, "SliceThickness", DS, Other),
    entry!(STUDY_INSTANCE_UID, "StudyInstanceUID", UI, Uid),
    entry!(SERIES_INSTANCE_UID, "SeriesInstanceUID", UI, Uid),
    entry!(STUDY_ID, "StudyID", SH, Other),
    entry!(SERIES_NUMBER, "SeriesNumber", IS, Other),
    entry!(INSTANCE_NUMBER, "InstanceNumber", IS, Other),
    entry!(FRAME_OF_REFERENCE_UID, "FrameOfReferenceUID", UI, Uid),
    entry!(SAMPLES_PER_PIXEL, "SamplesPerPixel", US, Other),
    entry!(PHOTOMETRIC_INTERPRETATION, "PhotometricInterpretation", CS, Other),
    entry!(PLANAR_CONFIGURATION, "PlanarConfiguration", US, Other),
    entry!(NUMBER_OF_FRAMES, "NumberOfFrames", IS, Other),
    entry!(ROWS, "Rows", US, Other),
    entry!(COLUMNS, "Columns", US, Other),
    entry!(PIXEL_ASPECT_RATIO, "PixelAspectRatio", IS, Other),
    entry!(BITS_ALLOCATED, "BitsAllocated", US, Other),
    entry!(BITS_STORED, "BitsStored", US, Other),
    entry!(HIGH_BIT, "HighBit", US, Other),
    entry!(PIXEL_REPRESENTATION, "PixelRepresentation", US, Other),
    entry!(WINDOW_CENTER, "WindowCenter", DS, Other),
    entry!(WINDOW_WIDTH, "WindowWidth", DS, Other),
    entry!(RESCALE_INTERCEPT, "RescaleIntercept", DS, Other),
    entry!(RESCALE_SLOPE, "RescaleSlope", DS, Other),
    entry!(PIXEL_DATA, "PixelData", OW, Other),
];

#[must_use]
pub fn lookup(tag: Tag) -> Option<&'static DictionaryEntry> {
    ENTRIES
        .binary_search_by_key(&tag, |entry| entry.tag)
        .ok()
        .map(|idx| &ENTRIES[idx])
}

/// Reverse lookup by keyword, e.g. `"PatientName"`
#[must_use]
pub fn tag_by_name(keyword: &str) -> Option<Tag> {
    ENTRIES
        .iter()
        .find(|entry| entry.keyword == keyword)
        .map(|entry| entry.tag)
}

/// VR used when reading implicit VR data sets
#[must_use]
pub fn implicit_vr(tag: Tag) -> Vr {
    if let Some(entry) = lookup(tag) {
        return entry.vr;
    }
    // Group length elements are always UL
    if tag.element == 0x0000 {
        return Vr::UL;
    }
    // Context-dependent VRs (US/SS, OB/OW) resolve the relaxed way
    StandardDataDictionary
        .by_tag(dicom::core::Tag(tag.group, tag.element))
        .and_then(|entry| {
            let vr = entry.vr().relaxed().to_string().as_bytes();
            Vr::from_bytes([*vr.first()?, *vr.get(1)?])
        })
        .unwrap_or(Vr::UN)
}

#[must_use]
pub fn category(tag: Tag) -> TagCategory {
    lookup(tag).map_or(TagCategory::Other, |entry| entry.category)
}

#[inline]
#[must_use]
pub fn is_phi(tag: Tag) -> bool {
    category(tag) == TagCategory::Phi
}

#[inline]
#[must_use]
pub fn is_date(tag: Tag) -> bool {
    category(tag) == TagCategory::Date
}

#[inline]
#[must_use]
pub fn is_uid(tag: Tag) -> bool {
    category(tag) == TagCategory::Uid
}

/// Human-readable name of any tag
#[must_use]
pub fn display_name(tag: Tag) -> String {
    if let Some(entry) = lookup(tag) {
        return entry.keyword.to_string();
    }

    StandardDataDictionary
        .by_tag(dicom::core::Tag(tag.group, tag.element))
        .map_or_else(|| tag.to_string(), |entry| entry.alias().to_string())
}
