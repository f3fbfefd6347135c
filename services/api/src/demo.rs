use chrono::Datelike;
use clap::Args;
use serde::Serialize;

use clearance_flow::error::AppError;
use clearance_flow::workflows::clearance::engine::{NewSignatureRequest, ReceiptUpdate};
use clearance_flow::workflows::clearance::repository::NotificationLog;
use clearance_flow::workflows::clearance::views;
use clearance_flow::workflows::clearance::{ClearanceError, FileUpload};

use crate::infra::seeded_app;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Semester label for the demo round
    #[arg(long, default_value = "1st Semester")]
    pub(crate) semester: String,
    /// Academic year label; defaults to the year spanning today
    #[arg(long)]
    pub(crate) academic_year: Option<String>,
    /// Skip the receipt resubmission portion of the walkthrough
    #[arg(long)]
    pub(crate) skip_resubmission: bool,
}

#[derive(Debug, Serialize)]
struct TermSummary {
    semester: String,
    academic_year: String,
    round_id: u64,
    enrollment_id: u64,
    record_id: u64,
    final_status: &'static str,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        semester,
        academic_year,
        skip_resubmission,
    } = args;
    let academic_year = academic_year.unwrap_or_else(current_academic_year);

    let wiring = seeded_app();
    let student = wiring.seed.students[0].clone();
    let iron_club = wiring.seed.programs[0].clone();
    let staff = wiring.seed.staff.clone();

    println!("Clearance workflow demo ({semester}, {academic_year})");
    println!(
        "Campus: {} programs, {} students, staff signer {} {}",
        wiring.seed.programs.len(),
        wiring.seed.students.len(),
        staff.first_name,
        staff.last_name
    );

    let signature_scan = "dizon-signoff.png";
    let media_type = mime_guess::from_path(signature_scan).first_or_octet_stream();
    wiring.app.signatures.upsert_signature(
        staff.id,
        image(signature_scan),
        "Registrar desk sign-off",
    )?;
    println!("- {} uploaded an on-file signature ({signature_scan}, {media_type})", staff.last_name);

    let round = wiring.app.rounds.create_round(&semester, &academic_year)?;
    println!(
        "- Round {} opened with {} programs snapshotted from the catalog",
        round.id.0,
        round.programs.len()
    );

    let late_program = wiring
        .campus
        .add_program("Graduate Studies", "Thesis archival copy");
    println!(
        "- Catalog gained '{}' after the round opened; it joins the next round only",
        late_program.name
    );

    let enrollment = wiring.app.enrollments.request_enrollment(student.id)?;
    println!(
        "- {} {} enrolled (enrollment {}, status {})",
        student.first_name,
        student.last_name,
        enrollment.id.0,
        enrollment.status.label()
    );

    let record = wiring.app.engine.create_signature_record(
        student.id,
        iron_club.id,
        NewSignatureRequest {
            receipt: Some(image("gym-fee.jpg")),
            ..NewSignatureRequest::default()
        },
    )?;
    println!(
        "- Signature record {} created for {} with a receipt attached",
        record.id.0, iron_club.name
    );

    wiring.app.engine.transition_status(
        record.id,
        "Rejected",
        None,
        Some("Official receipt number is missing"),
    )?;
    let note = wiring
        .app
        .engine
        .latest_feedback(iron_club.id, student.id)?;
    println!("- Staff rejected it: \"{}\"", note.feedback);

    if !skip_resubmission {
        let resubmitted = wiring.app.engine.submit_receipt(
            record.id,
            ReceiptUpdate {
                receipt: Some(image("gym-fee-rescan.jpg")),
                ..ReceiptUpdate::default()
            },
        )?;
        println!(
            "- Student resubmitted the receipt; record reset to {} with feedback cleared",
            resubmitted.status.label()
        );
    }

    let approved =
        wiring
            .app
            .engine
            .transition_status(record.id, "Approved", Some(staff.id), None)?;
    println!(
        "- Staff approved; on-file signature {} attached",
        approved
            .staff_signature
            .map(|id| id.0.to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    let view = views::signature_record_view(
        &approved,
        wiring.app.identity.as_ref(),
        wiring.app.catalog.as_ref(),
        wiring.app.registry.as_ref(),
    )?;
    match serde_json::to_string_pretty(&view) {
        Ok(json) => println!("  Final record payload:\n{json}"),
        Err(err) => println!("  Final record payload unavailable: {err}"),
    }

    println!("  Student notifications (newest first):");
    let inbox = wiring
        .notifications
        .for_user(student.id)
        .map_err(ClearanceError::from)?;
    for notification in inbox {
        println!("    - {}: {}", notification.title, notification.message);
    }

    let summary = TermSummary {
        semester,
        academic_year,
        round_id: round.id.0,
        enrollment_id: enrollment.id.0,
        record_id: record.id.0,
        final_status: approved.status.label(),
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("  Term summary:\n{json}"),
        Err(err) => println!("  Term summary unavailable: {err}"),
    }

    Ok(())
}

fn image(name: &str) -> FileUpload {
    FileUpload {
        filename: name.to_string(),
        content: vec![0x89, b'P', b'N', b'G'],
    }
}

/// Academic years run June to May.
fn current_academic_year() -> String {
    let today = chrono::Local::now().date_naive();
    if today.month() >= 6 {
        format!("{}-{}", today.year(), today.year() + 1)
    } else {
        format!("{}-{}", today.year() - 1, today.year())
    }
}
