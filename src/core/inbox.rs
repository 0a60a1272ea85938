use crate::domain::model::Domain;
use crate::utils::error::{HelpDeskError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffStatus {
    pub staff: String,
    pub domain: Domain,
    pub unread: u64,
    pub last_forwarded_at: Option<DateTime<Utc>>,
}

/// Unread forwarded-question counters, one per staff member.
#[derive(Debug)]
pub struct StaffInbox {
    entries: Mutex<Vec<StaffStatus>>,
}

impl StaffInbox {
    /// A name listed under several domains gets one counter, tagged with its first domain.
    pub fn new<'a>(staff: impl IntoIterator<Item = (Domain, &'a str)>) -> Self {
        let mut entries: Vec<StaffStatus> = Vec::new();
        for (domain, name) in staff {
            if entries.iter().any(|e| e.staff == name) {
                continue;
            }
            entries.push(StaffStatus {
                staff: name.to_string(),
                domain,
                unread: 0,
                last_forwarded_at: None,
            });
        }
        Self {
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StaffStatus>> {
        // counters stay usable even if a holder panicked
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the new unread count.
    pub fn record(&self, staff: &str) -> Result<u64> {
        let mut entries = self.lock();
        let entry = find_mut(&mut entries, staff)?;
        entry.unread += 1;
        entry.last_forwarded_at = Some(Utc::now());
        Ok(entry.unread)
    }

    pub fn unread(&self, staff: &str) -> Option<u64> {
        self.lock().iter().find(|e| e.staff == staff).map(|e| e.unread)
    }

    /// Clears the counter and returns what it held.
    pub fn mark_read(&self, staff: &str) -> Result<u64> {
        let mut entries = self.lock();
        let entry = find_mut(&mut entries, staff)?;
        Ok(std::mem::take(&mut entry.unread))
    }

    pub fn snapshot(&self) -> Vec<StaffStatus> {
        self.lock().clone()
    }

    pub fn total_unread(&self) -> u64 {
        self.lock().iter().map(|e| e.unread).sum()
    }
}

fn find_mut<'a>(entries: &'a mut [StaffStatus], staff: &str) -> Result<&'a mut StaffStatus> {
    entries
        .iter_mut()
        .find(|e| e.staff == staff)
        .ok_or_else(|| HelpDeskError::UnknownStaffError {
            name: staff.to_string(),
        })
}
