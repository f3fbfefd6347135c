use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clearance_flow::workflows::clearance::memory::{
    MemoryCampus, MemoryClearanceStore, MemoryNotificationLog, MemoryReceiptVault,
    MemorySignatureRegistry,
};
use clearance_flow::workflows::clearance::{ClearanceApp, Program, UserAccount};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Seed data registered into the in-memory campus collaborators. The
/// identity store and program catalog are external systems in production;
/// this stands in for them so the service runs end to end.
pub(crate) struct CampusSeed {
    pub(crate) programs: Vec<Program>,
    pub(crate) students: Vec<UserAccount>,
    pub(crate) staff: UserAccount,
}

pub(crate) struct Wiring {
    pub(crate) app: Arc<ClearanceApp>,
    pub(crate) campus: Arc<MemoryCampus>,
    pub(crate) notifications: Arc<MemoryNotificationLog>,
    pub(crate) seed: CampusSeed,
}

pub(crate) fn seeded_app() -> Wiring {
    let store = Arc::new(MemoryClearanceStore::default());
    let campus = Arc::new(MemoryCampus::default());
    let registry = Arc::new(MemorySignatureRegistry::default());
    let notifications = Arc::new(MemoryNotificationLog::default());
    let vault = Arc::new(MemoryReceiptVault::default());

    let programs = vec![
        campus.add_program("Iron Club", "Weights room equipment clearance"),
        campus.add_program("Fuel Club", "Canteen account settlement"),
        campus.add_program("University Library", "Returned books and fines"),
        campus.add_program("Guidance Office", "Exit interview sign-off"),
    ];
    let students = vec![
        campus.add_student(
            "mramos",
            "Maria",
            "Ramos",
            "3rd Year",
            "Mechanical Engineering",
        ),
        campus.add_student("jcruz", "Juan", "Cruz", "1st Year", "Physics"),
        campus.add_student("ltan", "Lucia", "Tan", "2nd Year", "Nursing"),
    ];
    let staff = campus.add_staff("adizon", "Amelia", "Dizon");

    let app = Arc::new(ClearanceApp::new(
        store,
        campus.clone(),
        campus.clone(),
        registry,
        notifications.clone(),
        vault,
    ));

    Wiring {
        app,
        campus,
        notifications,
        seed: CampusSeed {
            programs,
            students,
            staff,
        },
    }
}
