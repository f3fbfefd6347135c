use std::sync::Arc;

use crate::workflows::clearance::domain::{
    ClearanceRound, ClearanceSignature, Program, StaffSignature, StudentClearance, UserAccount,
    UserId,
};
use crate::workflows::clearance::engine::NewSignatureRequest;
use crate::workflows::clearance::files::FileUpload;
use crate::workflows::clearance::memory::{
    MemoryCampus, MemoryClearanceStore, MemoryNotificationLog, MemoryReceiptVault,
    MemorySignatureRegistry,
};
use crate::workflows::clearance::router::ClearanceApp;

pub(super) struct TestWorld {
    pub(super) app: Arc<ClearanceApp>,
    pub(super) store: Arc<MemoryClearanceStore>,
    pub(super) campus: Arc<MemoryCampus>,
    pub(super) notifications: Arc<MemoryNotificationLog>,
    pub(super) vault: Arc<MemoryReceiptVault>,
    pub(super) iron_club: Program,
    pub(super) fuel_club: Program,
    pub(super) maria: UserAccount,
    pub(super) juan: UserAccount,
    pub(super) staff: UserAccount,
}

/// Seeded campus: two programs, two students, one staff account.
pub(super) fn world() -> TestWorld {
    let store = Arc::new(MemoryClearanceStore::default());
    let campus = Arc::new(MemoryCampus::default());
    let registry = Arc::new(MemorySignatureRegistry::default());
    let notifications = Arc::new(MemoryNotificationLog::default());
    let vault = Arc::new(MemoryReceiptVault::default());

    let iron_club = campus.add_program("Iron Club", "Weights room equipment clearance");
    let fuel_club = campus.add_program("Fuel Club", "Canteen account settlement");
    let maria = campus.add_student(
        "mramos",
        "Maria",
        "Ramos",
        "3rd Year",
        "Mechanical Engineering",
    );
    let juan = campus.add_student("jcruz", "Juan", "Cruz", "1st Year", "Physics");
    let staff = campus.add_staff("adizon", "Amelia", "Dizon");

    let app = Arc::new(ClearanceApp::new(
        store.clone(),
        campus.clone(),
        campus.clone(),
        registry.clone(),
        notifications.clone(),
        vault.clone(),
    ));

    TestWorld {
        app,
        store,
        campus,
        notifications,
        vault,
        iron_club,
        fuel_club,
        maria,
        juan,
        staff,
    }
}

pub(super) fn png(name: &str) -> FileUpload {
    FileUpload {
        filename: name.to_string(),
        content: vec![0x89, b'P', b'N', b'G'],
    }
}

pub(super) fn open_round(world: &TestWorld) -> ClearanceRound {
    world
        .app
        .rounds
        .create_round("1st Semester", "2025-2026")
        .expect("round created")
}

pub(super) fn enroll(world: &TestWorld, student: UserId) -> StudentClearance {
    world
        .app
        .enrollments
        .request_enrollment(student)
        .expect("enrollment created")
}

pub(super) fn record_for(
    world: &TestWorld,
    student: UserId,
    program: crate::workflows::clearance::domain::ProgramId,
) -> ClearanceSignature {
    world
        .app
        .engine
        .create_signature_record(student, program, NewSignatureRequest::default())
        .expect("signature record created")
}

pub(super) fn staff_signature_on_file(world: &TestWorld) -> StaffSignature {
    world
        .app
        .signatures
        .upsert_signature(world.staff.id, png("dizon-signoff.png"), "Registrar desk")
        .expect("staff signature stored")
}
