//! Service requests and their lifecycle state machine.
//!
//! Lifecycle operations never mutate a request directly. Each `plan_*`
//! method checks the actor's authority first, then the current status, and
//! returns a [`Transition`]: the `(status, mechanic)` pair the caller observed
//! plus the pair to write. Repositories apply a transition as one
//! compare-and-swap, so two racing actors cannot both win.
//!
//! ```text
//! Pending(open) --select--> Pending(selected) --decline--> Pending(open)
//! Pending(*)    --accept--> Accepted --complete--> Completed
//! Pending(*)    --cancel--> Cancelled
//! Accepted      --cancel--> Cancelled
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AccountId, Coordinates, Location, Mechanic, MechanicId, OwnerName, PhoneNumber,
    ServiceRequestId, VehicleBrand, VehicleModel, VehicleNumber, VehicleYear,
};

/// Error returned when a stored or submitted enum value is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariantError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariantError {}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Stable lowercase name used in storage and payloads.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariantError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariantError {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Kind of vehicle that needs help.
    VehicleType, "vehicle type" {
        Car => "car",
        Bike => "bike",
    }
}

string_enum! {
    /// Assistance being asked for.
    ServiceType, "service type" {
        Towing => "towing",
        Fuel => "fuel",
        Battery => "battery",
        Tire => "tire",
        Other => "other",
    }
}

string_enum! {
    /// Lifecycle status of a service request.
    ServiceRequestStatus, "service request status" {
        Pending => "pending",
        Accepted => "accepted",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl ServiceRequestStatus {
    /// Completed and Cancelled requests never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Vehicle the request is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleDescriptor {
    pub vehicle_type: VehicleType,
    pub brand: VehicleBrand,
    pub model: VehicleModel,
    pub year: VehicleYear,
    pub number: VehicleNumber,
}

/// A requester's call for roadside assistance.
///
/// ## Invariants
/// - `mechanic_id` is set whenever `status` is Accepted or Completed.
/// - While Pending, `mechanic_id` is either `None` (open to any mechanic) or
///   the mechanic the requester selected.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    pub id: ServiceRequestId,
    pub requester_id: AccountId,
    pub vehicle: VehicleDescriptor,
    pub owner_name: OwnerName,
    pub phone: PhoneNumber,
    pub location: Location,
    pub coordinates: Option<Coordinates>,
    pub service_type: ServiceType,
    pub status: ServiceRequestStatus,
    pub mechanic_id: Option<MechanicId>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle operation names, used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Select,
    Accept,
    Decline,
    Complete,
    Cancel,
}

impl LifecycleAction {
    /// Lowercase verb.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Accept => "accept",
            Self::Decline => "decline",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a lifecycle operation is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Only the requester may perform this operation.
    NotOwner,
    /// Another mechanic was selected for this request.
    NotSelectedMechanic,
    /// The acting mechanic is not the one assigned to this request.
    NotAssignedMechanic,
    /// The acting mechanic has not been approved.
    MechanicNotApproved,
    /// The chosen mechanic is unapproved or not taking work.
    MechanicUnavailable,
    /// The request's status does not allow the operation.
    IllegalTransition {
        action: LifecycleAction,
        status: ServiceRequestStatus,
    },
}

impl LifecycleError {
    /// Authorization failures, as opposed to state conflicts.
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            Self::NotOwner
                | Self::NotSelectedMechanic
                | Self::NotAssignedMechanic
                | Self::MechanicNotApproved
        )
    }
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOwner => write!(f, "only the requester may do this"),
            Self::NotSelectedMechanic => {
                write!(f, "this request was assigned to another mechanic")
            }
            Self::NotAssignedMechanic => {
                write!(f, "only the assigned mechanic may do this")
            }
            Self::MechanicNotApproved => write!(f, "mechanic account is not approved"),
            Self::MechanicUnavailable => write!(f, "mechanic is not available"),
            Self::IllegalTransition { action, status } => {
                write!(f, "cannot {action} a request that is {status}")
            }
        }
    }
}

impl std::error::Error for LifecycleError {}

/// `(status, mechanic)` pair a transition expects to find in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateGuard {
    pub status: ServiceRequestStatus,
    pub mechanic_id: Option<MechanicId>,
}

/// `(status, mechanic)` pair a transition writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestChange {
    pub status: ServiceRequestStatus,
    pub mechanic_id: Option<MechanicId>,
}

/// Planned compare-and-swap for one lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub action: LifecycleAction,
    pub guard: UpdateGuard,
    pub change: RequestChange,
}

impl ServiceRequest {
    fn guard(&self) -> UpdateGuard {
        UpdateGuard {
            status: self.status,
            mechanic_id: self.mechanic_id,
        }
    }

    fn transition(
        &self,
        action: LifecycleAction,
        status: ServiceRequestStatus,
        mechanic_id: Option<MechanicId>,
    ) -> Transition {
        Transition {
            action,
            guard: self.guard(),
            change: RequestChange {
                status,
                mechanic_id,
            },
        }
    }

    fn illegal(&self, action: LifecycleAction) -> LifecycleError {
        LifecycleError::IllegalTransition {
            action,
            status: self.status,
        }
    }

    /// Whether `account` submitted this request.
    pub fn is_owned_by(&self, account: AccountId) -> bool {
        self.requester_id == account
    }

    /// Pending with no mechanic selected yet.
    pub fn is_open(&self) -> bool {
        self.status == ServiceRequestStatus::Pending && self.mechanic_id.is_none()
    }

    /// Completed requests with an assigned mechanic accept feedback.
    pub fn can_give_feedback(&self) -> bool {
        self.status == ServiceRequestStatus::Completed && self.mechanic_id.is_some()
    }

    /// Owner selects `mechanic`; the request stays Pending.
    ///
    /// Reselecting while Pending replaces the previous choice.
    pub fn plan_select(
        &self,
        actor: AccountId,
        mechanic: &Mechanic,
    ) -> Result<Transition, LifecycleError> {
        if !self.is_owned_by(actor) {
            return Err(LifecycleError::NotOwner);
        }
        if self.status != ServiceRequestStatus::Pending {
            return Err(self.illegal(LifecycleAction::Select));
        }
        if !mechanic.is_selectable() {
            return Err(LifecycleError::MechanicUnavailable);
        }
        Ok(self.transition(
            LifecycleAction::Select,
            ServiceRequestStatus::Pending,
            Some(mechanic.id),
        ))
    }

    /// Mechanic accepts the job.
    ///
    /// A selected request can only be accepted by the selected mechanic; an
    /// open request by any approved mechanic.
    pub fn plan_accept(&self, mechanic: &Mechanic) -> Result<Transition, LifecycleError> {
        if !mechanic.approved {
            return Err(LifecycleError::MechanicNotApproved);
        }
        if self.mechanic_id.is_some_and(|selected| selected != mechanic.id) {
            return Err(LifecycleError::NotSelectedMechanic);
        }
        if self.status != ServiceRequestStatus::Pending {
            return Err(self.illegal(LifecycleAction::Accept));
        }
        Ok(self.transition(
            LifecycleAction::Accept,
            ServiceRequestStatus::Accepted,
            Some(mechanic.id),
        ))
    }

    /// Selected mechanic turns the job down, reopening the request.
    pub fn plan_decline(&self, mechanic: &Mechanic) -> Result<Transition, LifecycleError> {
        if self.mechanic_id != Some(mechanic.id) {
            return Err(LifecycleError::NotSelectedMechanic);
        }
        if self.status != ServiceRequestStatus::Pending {
            return Err(self.illegal(LifecycleAction::Decline));
        }
        Ok(self.transition(
            LifecycleAction::Decline,
            ServiceRequestStatus::Pending,
            None,
        ))
    }

    /// Assigned mechanic marks the job done.
    pub fn plan_complete(&self, mechanic: &Mechanic) -> Result<Transition, LifecycleError> {
        if self.mechanic_id != Some(mechanic.id) {
            return Err(LifecycleError::NotAssignedMechanic);
        }
        if self.status != ServiceRequestStatus::Accepted {
            return Err(self.illegal(LifecycleAction::Complete));
        }
        Ok(self.transition(
            LifecycleAction::Complete,
            ServiceRequestStatus::Completed,
            Some(mechanic.id),
        ))
    }

    /// Owner withdraws a Pending or Accepted request.
    pub fn plan_cancel(&self, actor: AccountId) -> Result<Transition, LifecycleError> {
        if !self.is_owned_by(actor) {
            return Err(LifecycleError::NotOwner);
        }
        if self.status.is_terminal() {
            return Err(self.illegal(LifecycleAction::Cancel));
        }
        Ok(self.transition(
            LifecycleAction::Cancel,
            ServiceRequestStatus::Cancelled,
            self.mechanic_id,
        ))
    }

    /// Whether the stored state still matches `guard`.
    pub fn matches(&self, guard: &UpdateGuard) -> bool {
        self.status == guard.status && self.mechanic_id == guard.mechanic_id
    }

    /// Copy of this request with `change` applied.
    pub fn with_change(&self, change: &RequestChange) -> Self {
        Self {
            status: change.status,
            mechanic_id: change.mechanic_id,
            ..self.clone()
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Request builders shared by tests.

    use super::*;
    use chrono::TimeZone;

    /// Pending, open request at the given point.
    pub(crate) fn pending_request(requester: AccountId, latitude: f64, longitude: f64) -> ServiceRequest {
        ServiceRequest {
            id: ServiceRequestId::random(),
            requester_id: requester,
            vehicle: VehicleDescriptor {
                vehicle_type: VehicleType::Car,
                brand: VehicleBrand::parse("Maruti").expect("fixture brand"),
                model: VehicleModel::parse("Swift").expect("fixture model"),
                year: VehicleYear::parse(2020, 2026).expect("fixture year"),
                number: VehicleNumber::parse("KA 01 AB 1234").expect("fixture number"),
            },
            owner_name: OwnerName::parse("Asha Rao").expect("fixture owner"),
            phone: PhoneNumber::parse("9123456780").expect("fixture phone"),
            location: Location::parse("Outer Ring Road, Bengaluru").expect("fixture location"),
            coordinates: Some(Coordinates::new(latitude, longitude).expect("fixture point")),
            service_type: ServiceType::Battery,
            status: ServiceRequestStatus::Pending,
            mechanic_id: None,
            created_at: Utc
                .with_ymd_and_hms(2026, 3, 1, 8, 30, 0)
                .single()
                .expect("fixture timestamp"),
        }
    }
}
