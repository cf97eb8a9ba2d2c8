use chrono::Utc;
use tracing::{debug, info};

use shared_store::AtomicMap;

use crate::models::{AddDoctorRequest, Doctor, DoctorError, DoctorId};

/// Registry of known doctors. Booking refuses appointments for ids that are
/// not registered here.
pub struct DoctorDirectoryService {
    doctors: AtomicMap<DoctorId, Doctor>,
}

impl DoctorDirectoryService {
    pub fn new() -> Self {
        Self {
            doctors: AtomicMap::new(),
        }
    }

    /// Register a doctor. Ids are caller-chosen and unique.
    pub async fn add_doctor(&self, request: AddDoctorRequest) -> Result<Doctor, DoctorError> {
        let doctor = Doctor {
            id: DoctorId::new(request.id),
            name: request.name,
            email: request.email,
            created_at: Utc::now(),
        };

        let inserted = self.doctors.update(doctor.id.clone(), |entry| {
            if entry.is_some() {
                false
            } else {
                *entry = Some(doctor.clone());
                true
            }
        });

        if !inserted {
            debug!("Rejected duplicate doctor id: {}", doctor.id);
            return Err(DoctorError::AlreadyExists);
        }

        info!("Registered doctor {} ({})", doctor.id, doctor.name);
        Ok(doctor)
    }

    pub async fn find_doctor(&self, id: &DoctorId) -> Result<Doctor, DoctorError> {
        self.doctors
            .read(id, |entry| entry.cloned())
            .ok_or(DoctorError::NotFound)
    }

    /// All registered doctors, sorted by id for stable output.
    pub async fn list_doctors(&self) -> Vec<Doctor> {
        let mut doctors: Vec<Doctor> = self
            .doctors
            .snapshot()
            .into_iter()
            .map(|(_, doctor)| doctor)
            .collect();
        doctors.sort_by(|a, b| a.id.cmp(&b.id));
        doctors
    }
}

impl Default for DoctorDirectoryService {
    fn default() -> Self {
        Self::new()
    }
}
