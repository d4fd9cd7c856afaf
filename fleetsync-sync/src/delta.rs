//! Change event decoding.
//!
//! Cases, evaluated independently and emitted in application order:
//! 1. `CreatedAsDriver` (no before, after is a driver)
//! 2. `TransitionedToDriver` (before not a driver, after is)
//! 3. `TransitionedFromDriver` (before a driver, after not)
//! 4. `ProfileUpdated` (after is a driver and name, email or phone differ)
//!
//! Case 1 only fires without a before snapshot; 2 and 4 can fire together
//! when a role flip and a profile edit land in one write.

use fleetsync_core::{DriverProfile, UserRecord};

/// One classified consequence of a user write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaCase {
    CreatedAsDriver { profile: DriverProfile },
    TransitionedToDriver { profile: DriverProfile },
    TransitionedFromDriver,
    ProfileUpdated { old: DriverProfile, new: DriverProfile },
}

/// The classified difference between a before/after snapshot pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserDelta {
    pub cases: Vec<DeltaCase>,
}

impl UserDelta {
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Field-level changes between two profiles. Each set field holds the new
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileDiff {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ProfileDiff {
    pub fn between(old: &DriverProfile, new: &DriverProfile) -> Self {
        let changed = |a: &String, b: &String| (a != b).then(|| b.clone());
        Self {
            name: changed(&old.name, &new.name),
            email: changed(&old.email, &new.email),
            phone: changed(&old.phone, &new.phone),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// Classify a user write. Pure; `None` means the document did not exist on
/// that side of the write.
pub fn decode(before: Option<&UserRecord>, after: Option<&UserRecord>) -> UserDelta {
    let mut cases = Vec::new();

    match (before, after) {
        (None, Some(after)) if after.is_driver() => {
            cases.push(DeltaCase::CreatedAsDriver {
                profile: after.profile(),
            });
        }
        (Some(before), Some(after)) => {
            let was_driver = before.is_driver();
            let is_driver = after.is_driver();

            if !was_driver && is_driver {
                cases.push(DeltaCase::TransitionedToDriver {
                    profile: after.profile(),
                });
            }
            if was_driver && !is_driver {
                cases.push(DeltaCase::TransitionedFromDriver);
            }
            if is_driver {
                let (old, new) = (before.profile(), after.profile());
                if !ProfileDiff::between(&old, &new).is_empty() {
                    cases.push(DeltaCase::ProfileUpdated { old, new });
                }
            }
        }
        _ => {}
    }

    UserDelta { cases }
}
