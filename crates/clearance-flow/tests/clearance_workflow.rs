//! End-to-end specifications for the clearance workflow: a full term driven
//! through the public service facade and the HTTP router, without reaching
//! into private modules.

mod common {
    use std::sync::Arc;

    use clearance_flow::workflows::clearance::memory::{
        MemoryCampus, MemoryClearanceStore, MemoryNotificationLog, MemoryReceiptVault,
        MemorySignatureRegistry,
    };
    use clearance_flow::workflows::clearance::{ClearanceApp, FileUpload, Program, UserAccount};

    pub(super) struct Campus {
        pub(super) app: Arc<ClearanceApp>,
        pub(super) catalog: Arc<MemoryCampus>,
        pub(super) notifications: Arc<MemoryNotificationLog>,
        pub(super) vault: Arc<MemoryReceiptVault>,
        pub(super) iron_club: Program,
        pub(super) fuel_club: Program,
        pub(super) student: UserAccount,
        pub(super) staff: UserAccount,
    }

    pub(super) fn campus() -> Campus {
        let store = Arc::new(MemoryClearanceStore::default());
        let catalog = Arc::new(MemoryCampus::default());
        let registry = Arc::new(MemorySignatureRegistry::default());
        let notifications = Arc::new(MemoryNotificationLog::default());
        let vault = Arc::new(MemoryReceiptVault::default());

        let iron_club = catalog.add_program("Iron Club", "Weights room equipment clearance");
        let fuel_club = catalog.add_program("Fuel Club", "Canteen account settlement");
        let student = catalog.add_student(
            "mramos",
            "Maria",
            "Ramos",
            "3rd Year",
            "Mechanical Engineering",
        );
        let staff = catalog.add_staff("adizon", "Amelia", "Dizon");

        let app = Arc::new(ClearanceApp::new(
            store,
            catalog.clone(),
            catalog.clone(),
            registry,
            notifications.clone(),
            vault.clone(),
        ));

        Campus {
            app,
            catalog,
            notifications,
            vault,
            iron_club,
            fuel_club,
            student,
            staff,
        }
    }

    pub(super) fn image(name: &str) -> FileUpload {
        FileUpload {
            filename: name.to_string(),
            content: vec![0x89, b'P', b'N', b'G'],
        }
    }
}

mod term_walkthrough {
    use super::common::*;
    use clearance_flow::workflows::clearance::engine::{NewSignatureRequest, ReceiptUpdate};
    use clearance_flow::workflows::clearance::repository::NotificationLog;
    use clearance_flow::workflows::clearance::ClearanceStatus;

    #[test]
    fn a_rejection_receipt_resubmission_and_approval_round_trip() {
        let campus = campus();

        campus
            .app
            .signatures
            .upsert_signature(campus.staff.id, image("dizon.png"), "Registrar desk")
            .expect("staff signature on file");

        campus
            .app
            .rounds
            .create_round("1st Semester", "2025-2026")
            .expect("round opened");
        campus
            .app
            .enrollments
            .request_enrollment(campus.student.id)
            .expect("student enrolled");

        let record = campus
            .app
            .engine
            .create_signature_record(
                campus.student.id,
                campus.iron_club.id,
                NewSignatureRequest {
                    receipt: Some(image("gym-fee.jpg")),
                    ..NewSignatureRequest::default()
                },
            )
            .expect("signature record created");
        assert_eq!(record.status, ClearanceStatus::Pending);

        // Staff pushes it back with a note.
        let rejected = campus
            .app
            .engine
            .transition_status(record.id, "Rejected", None, Some("Amount is unreadable"))
            .expect("rejection");
        assert_eq!(rejected.status, ClearanceStatus::Rejected);

        let note = campus
            .app
            .engine
            .latest_feedback(campus.iron_club.id, campus.student.id)
            .expect("feedback available");
        assert_eq!(note.feedback, "Amount is unreadable");

        // The student resubmits; the record re-opens clean.
        let resubmitted = campus
            .app
            .engine
            .submit_receipt(
                record.id,
                ReceiptUpdate {
                    receipt: Some(image("gym-fee-rescan.jpg")),
                    ..ReceiptUpdate::default()
                },
            )
            .expect("receipt resubmitted");
        assert_eq!(resubmitted.status, ClearanceStatus::Pending);
        assert_eq!(resubmitted.feedback, "");

        // Approval attaches the on-file signature.
        let approved = campus
            .app
            .engine
            .transition_status(record.id, "Approved", Some(campus.staff.id), None)
            .expect("approval");
        assert_eq!(approved.status, ClearanceStatus::Approved);
        assert!(approved.staff_signature.is_some());
        let receipt = approved.receipt.expect("receipt retained");
        assert!(campus.vault.contains(&receipt.key));

        // Both staff actions landed in the student's notification feed,
        // newest first.
        let inbox = campus
            .notifications
            .for_user(campus.student.id)
            .expect("inbox");
        assert_eq!(inbox.len(), 2);
        assert!(inbox[0].message.contains("Approved"));
        assert!(inbox[1].message.contains("Rejected"));
    }

    #[test]
    fn the_enrollment_status_is_tracked_independently() {
        let campus = campus();
        campus
            .app
            .rounds
            .create_round("1st Semester", "2025-2026")
            .expect("round opened");
        let enrollment = campus
            .app
            .enrollments
            .request_enrollment(campus.student.id)
            .expect("student enrolled");
        let created = campus
            .app
            .engine
            .create_signature_record(
                campus.student.id,
                campus.fuel_club.id,
                NewSignatureRequest::default(),
            )
            .expect("record created");

        campus
            .app
            .enrollments
            .set_status(enrollment.id, "Approved")
            .expect("overall status set");

        let record = campus
            .app
            .engine
            .lookup(campus.student.id, campus.fuel_club.id)
            .expect("lookup")
            .expect("record present");
        assert_eq!(record.id, created.id);
        assert_eq!(record.status, ClearanceStatus::Pending, "no cascade");
    }

    #[test]
    fn new_programs_wait_for_the_next_round() {
        let campus = campus();
        let first = campus
            .app
            .rounds
            .create_round("1st Semester", "2025-2026")
            .expect("first round");
        assert_eq!(first.programs.len(), 2);

        campus.catalog.add_program("Library", "Returned books check");

        let unchanged = campus
            .app
            .rounds
            .get_round(first.id)
            .expect("round readable");
        assert_eq!(unchanged.programs.len(), 2);

        let second = campus
            .app
            .rounds
            .create_round("2nd Semester", "2025-2026")
            .expect("second round");
        assert_eq!(second.programs.len(), 3);
    }
}

mod http_surface {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use clearance_flow::workflows::clearance::clearance_router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[tokio::test]
    async fn a_term_can_be_driven_entirely_over_http() {
        let campus = campus();
        let router = clearance_router(campus.app.clone());

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/clearance-rounds")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_vec(
                            &json!({ "semester": "1st Semester", "academic_year": "2025-2026" }),
                        )
                        .expect("serialize"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/student-clearances")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&json!({ "student_id": campus.student.id.0 }))
                            .expect("serialize"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!(
                        "/api/v1/clearance-signatures/create/{}/{}",
                        campus.student.id.0, campus.iron_club.id.0
                    ))
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&json!({})).expect("serialize"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let record: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(record["status"], json!("Pending"));
        assert_eq!(record["program"]["name"], json!("Iron Club"));

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!(
                        "/api/v1/student-clearances?student={}",
                        campus.student.id.0
                    ))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let enrollments: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(enrollments.as_array().map(Vec::len), Some(1));
    }
}
