use crate::dicom::Metadata;
use crate::types::TransferSyntax;

pub fn print_metadata(metadata: &Metadata, transfer_syntax: Option<&TransferSyntax>) {
    let patient = &metadata.patient;
    print_field("Patient Name", patient.name.as_ref());
    print_field("Patient ID", patient.id.as_ref());
    print_field("Birth Date", patient.birth_date.as_ref());
    print_field("Sex", patient.sex.as_ref());

    let study = &metadata.study;
    print_field("Accession Number", study.accession_number.as_ref());
    print_field("Study Date", study.date.as_ref());
    print_field("Study Description", study.description.as_ref());
    print_field("Study UID", study.instance_uid.as_ref());
    print_field("Referring Physician", study.referring_physician.as_ref());

    let series = &metadata.series;
    print_field("Modality", series.modality.as_ref());
    print_field("Series Description", series.description.as_ref());
    if let Some(number) = series.number {
        println!("{:20}: {}", "Series Number", number);
    }
    print_field("Series UID", series.instance_uid.as_ref());
    print_field("SOP Instance UID", metadata.instance.sop_instance_uid.as_ref());
    print_field("Institution", metadata.institution.name.as_ref());

    print_dimensions(metadata);

    print_pixel_aspect_ratio(metadata);
    print_window(metadata);
    print_sop_class_info(metadata);
    if let Some(transfer_syntax) = transfer_syntax {
        println!("{:20}: {}", "Transfer Syntax", transfer_syntax);
    }

    if let Some(thickness) = series.slice_thickness {
        println!("{:20}: {}", "Slice Thickness", thickness);
    }

    println!();
}

fn print_field(name: &str, value: Option<&String>) {
    if let Some(v) = value {
        println!("{name:20}: {v}");
    }
}

fn print_dimensions(metadata: &Metadata) {
    let Some(dims) = metadata.dimensions() else {
        return;
    };
    let image = &metadata.image;
    let photometric = image
        .photometric_interpretation
        .as_ref()
        .map_or_else(|| "?".to_string(), ToString::to_string);
    println!(
        "{:20}: {} x{} [{}]",
        "Dimensions",
        dims,
        image.samples_per_pixel.unwrap_or(1),
        photometric
    );
    if let Some(frames) = image.number_of_frames.filter(|&n| n > 1) {
        println!("{:20}: {}", "Frames", frames);
    }
}

fn print_pixel_aspect_ratio(metadata: &Metadata) {
    if let Some(par) = &metadata.image.pixel_aspect_ratio {
        println!("{:20}: {}", "Pixel Aspect Ratio", par);
    }
}

fn print_window(metadata: &Metadata) {
    if let Some(window) = metadata.default_window() {
        println!("{:20}: {}", "Window", window);
    }
}

fn print_sop_class_info(metadata: &Metadata) {
    if let Some(sop_class) = &metadata.sop_class {
        println!("{:20}: {}", "SOP Class UID", sop_class);
    }
}
