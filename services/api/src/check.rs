use std::path::PathBuf;

use clap::Args;
use student_intake::error::AppError;
use student_intake::intake::{
    CollectionChange, Payload, SectionOutcome, SectionRequest, SubmissionProcessor,
    DEFAULT_MAX_UPLOAD_BYTES,
};

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Section index (1-4)
    #[arg(long)]
    pub(crate) section: i64,
    /// JSON file holding the section payload
    #[arg(long)]
    pub(crate) payload: PathBuf,
    /// Apply the mandatory-field rules of a section save
    #[arg(long)]
    pub(crate) section_save: bool,
    /// Largest accepted upload in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub(crate) max_upload_bytes: usize,
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.payload)?;
    let payload = Payload::from_value(serde_json::from_str(&raw)?)?;
    let request = SectionRequest {
        section_number: Some(args.section),
        is_section_save: args.section_save,
        payload,
    };

    let outcome = SubmissionProcessor::new(args.max_upload_bytes).process(&request)?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &SectionOutcome) {
    let mode = if outcome.is_section_save {
        "section save"
    } else {
        "autosave"
    };
    println!(
        "Section {} ({}) accepted as {}",
        outcome.section.index(),
        outcome.section.label(),
        mode
    );

    println!("Field updates:");
    for (field, value) in outcome.updates.iter() {
        match serde_json::to_string(value) {
            Ok(json) => println!("  {field} = {json}"),
            Err(err) => println!("  {field} = <unprintable: {err}>"),
        }
    }

    if !outcome.collections.is_empty() {
        println!("Collections:");
        for plan in &outcome.collections {
            let summary = match &plan.change {
                CollectionChange::Replace(rows) => format!("replace with {} row(s)", rows.len()),
                CollectionChange::Clear => "clear".to_string(),
                CollectionChange::Keep => "keep".to_string(),
            };
            println!("  {}: {}", plan.collection.label(), summary);
        }
    }

    if !outcome.documents.is_empty() {
        println!("Documents:");
        for write in &outcome.documents {
            println!(
                "  {}: {} ({}, {} bytes)",
                write.slot.field_name(),
                write.file.file_name,
                write.file.mime_type,
                write.file.size()
            );
        }
    }
}
