//! Diesel row structs and their conversion to domain types.
//!
//! Rows are decoded through the same validated constructors the domain uses
//! for input, so a value that no longer satisfies a rule surfaces as a
//! [`RowDecodeError`] rather than a silently invalid aggregate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Account, AccountId, AccountRole, Coordinates, EmailAddress, Feedback, FeedbackComment,
    FeedbackId, Location, Mechanic, MechanicId, OwnerName, PasswordHash, PhoneNumber, Rating,
    ServiceCentreName, ServiceRequest, ServiceRequestId, ServiceRequestStatus, ServiceType,
    Specialization, Username, VehicleBrand, VehicleDescriptor, VehicleModel, VehicleNumber,
    VehicleType, VehicleYear,
};

use super::schema::{accounts, feedback, mechanics, service_requests};

/// A stored column failed domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RowDecodeError {
    table: &'static str,
    column: &'static str,
    reason: String,
}

impl fmt::Display for RowDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stored {}.{} is invalid: {}",
            self.table, self.column, self.reason
        )
    }
}

fn column<T, E: fmt::Display>(
    table: &'static str,
    column: &'static str,
    value: Result<T, E>,
) -> Result<T, RowDecodeError> {
    value.map_err(|err| RowDecodeError {
        table,
        column,
        reason: err.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RowDecodeError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "accounts";
        Ok(Self {
            id: AccountId::from_uuid(row.id),
            username: column(TABLE, "username", Username::parse(&row.username))?,
            email: column(TABLE, "email", EmailAddress::parse(&row.email))?,
            role: column(TABLE, "role", AccountRole::from_str(&row.role))?,
            password_hash: PasswordHash::new(row.password_hash),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Account> for NewAccountRow<'a> {
    fn from(account: &'a Account) -> Self {
        Self {
            id: *account.id.as_uuid(),
            username: account.username.as_str(),
            email: account.email.as_str(),
            role: account.role.as_str(),
            password_hash: account.password_hash.as_str(),
            created_at: account.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Mechanics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = mechanics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MechanicRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub service_centre_name: String,
    pub phone: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub specialization: Option<String>,
    pub approved: bool,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MechanicRow> for Mechanic {
    type Error = RowDecodeError;

    fn try_from(row: MechanicRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "mechanics";
        let specialization = match row.specialization.as_deref() {
            Some(raw) => column(TABLE, "specialization", Specialization::parse(raw))?,
            None => None,
        };
        Ok(Self {
            id: MechanicId::from_uuid(row.id),
            account_id: AccountId::from_uuid(row.account_id),
            service_centre_name: column(
                TABLE,
                "service_centre_name",
                ServiceCentreName::parse(&row.service_centre_name),
            )?,
            phone: column(TABLE, "phone", PhoneNumber::parse(&row.phone))?,
            address: column(TABLE, "address", Location::parse(&row.address))?,
            coordinates: column(
                TABLE,
                "latitude",
                Coordinates::from_optional(row.latitude, row.longitude),
            )?,
            specialization,
            approved: row.approved,
            available: row.available,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = mechanics)]
pub(crate) struct NewMechanicRow<'a> {
    pub id: Uuid,
    pub account_id: Uuid,
    pub service_centre_name: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub specialization: Option<&'a str>,
    pub approved: bool,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Mechanic> for NewMechanicRow<'a> {
    fn from(mechanic: &'a Mechanic) -> Self {
        Self {
            id: *mechanic.id.as_uuid(),
            account_id: *mechanic.account_id.as_uuid(),
            service_centre_name: mechanic.service_centre_name.as_str(),
            phone: mechanic.phone.as_str(),
            address: mechanic.address.as_str(),
            latitude: mechanic.coordinates.map(|point| point.latitude()),
            longitude: mechanic.coordinates.map(|point| point.longitude()),
            specialization: mechanic.specialization.as_ref().map(Specialization::as_str),
            approved: mechanic.approved,
            available: mechanic.available,
            created_at: mechanic.created_at,
        }
    }
}

/// Address and coordinates written by a location update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = mechanics)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct MechanicLocationUpdate<'a> {
    pub address: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// ---------------------------------------------------------------------------
// Service requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = service_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ServiceRequestRow {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub vehicle_type: String,
    pub vehicle_brand: String,
    pub vehicle_model: String,
    pub vehicle_year: i32,
    pub vehicle_number: String,
    pub owner_name: String,
    pub phone: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub service_type: String,
    pub status: String,
    pub mechanic_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ServiceRequestRow> for ServiceRequest {
    type Error = RowDecodeError;

    fn try_from(row: ServiceRequestRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "service_requests";
        let vehicle = VehicleDescriptor {
            vehicle_type: column(
                TABLE,
                "vehicle_type",
                VehicleType::from_str(&row.vehicle_type),
            )?,
            brand: column(TABLE, "vehicle_brand", VehicleBrand::parse(&row.vehicle_brand))?,
            model: column(TABLE, "vehicle_model", VehicleModel::parse(&row.vehicle_model))?,
            year: VehicleYear::from_stored(row.vehicle_year),
            number: column(
                TABLE,
                "vehicle_number",
                VehicleNumber::parse(&row.vehicle_number),
            )?,
        };
        Ok(Self {
            id: ServiceRequestId::from_uuid(row.id),
            requester_id: AccountId::from_uuid(row.requester_id),
            vehicle,
            owner_name: column(TABLE, "owner_name", OwnerName::parse(&row.owner_name))?,
            phone: column(TABLE, "phone", PhoneNumber::parse(&row.phone))?,
            location: column(TABLE, "location", Location::parse(&row.location))?,
            coordinates: column(
                TABLE,
                "latitude",
                Coordinates::from_optional(row.latitude, row.longitude),
            )?,
            service_type: column(
                TABLE,
                "service_type",
                ServiceType::from_str(&row.service_type),
            )?,
            status: column(
                TABLE,
                "status",
                ServiceRequestStatus::from_str(&row.status),
            )?,
            mechanic_id: row.mechanic_id.map(MechanicId::from_uuid),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = service_requests)]
pub(crate) struct NewServiceRequestRow<'a> {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub vehicle_type: &'a str,
    pub vehicle_brand: &'a str,
    pub vehicle_model: &'a str,
    pub vehicle_year: i32,
    pub vehicle_number: &'a str,
    pub owner_name: &'a str,
    pub phone: &'a str,
    pub location: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub service_type: &'a str,
    pub status: &'a str,
    pub mechanic_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a ServiceRequest> for NewServiceRequestRow<'a> {
    fn from(request: &'a ServiceRequest) -> Self {
        Self {
            id: *request.id.as_uuid(),
            requester_id: *request.requester_id.as_uuid(),
            vehicle_type: request.vehicle.vehicle_type.as_str(),
            vehicle_brand: request.vehicle.brand.as_str(),
            vehicle_model: request.vehicle.model.as_str(),
            vehicle_year: request.vehicle.year.value(),
            vehicle_number: request.vehicle.number.as_str(),
            owner_name: request.owner_name.as_str(),
            phone: request.phone.as_str(),
            location: request.location.as_str(),
            latitude: request.coordinates.map(|point| point.latitude()),
            longitude: request.coordinates.map(|point| point.longitude()),
            service_type: request.service_type.as_str(),
            status: request.status.as_str(),
            mechanic_id: request.mechanic_id.map(Uuid::from),
            created_at: request.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = feedback)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FeedbackRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub mechanic_id: Uuid,
    pub service_request_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = RowDecodeError;

    fn try_from(row: FeedbackRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "feedback";
        Ok(Self {
            id: FeedbackId::from_uuid(row.id),
            author_id: AccountId::from_uuid(row.author_id),
            mechanic_id: MechanicId::from_uuid(row.mechanic_id),
            service_request_id: ServiceRequestId::from_uuid(row.service_request_id),
            rating: column(TABLE, "rating", Rating::new(i64::from(row.rating)))?,
            comment: column(
                TABLE,
                "comment",
                FeedbackComment::parse(row.comment.as_deref()),
            )?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = feedback)]
pub(crate) struct NewFeedbackRow<'a> {
    pub id: Uuid,
    pub author_id: Uuid,
    pub mechanic_id: Uuid,
    pub service_request_id: Uuid,
    pub rating: i16,
    pub comment: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Feedback> for NewFeedbackRow<'a> {
    fn from(record: &'a Feedback) -> Self {
        Self {
            id: *record.id.as_uuid(),
            author_id: *record.author_id.as_uuid(),
            mechanic_id: *record.mechanic_id.as_uuid(),
            service_request_id: *record.service_request_id.as_uuid(),
            rating: i16::from(record.rating.value()),
            comment: record.comment.as_ref().map(FeedbackComment::as_str),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Row decoding coverage.

    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::domain::service_request::fixtures::pending_request;

    fn request_row() -> ServiceRequestRow {
        let request = pending_request(AccountId::random(), 12.97, 77.59);
        let row = NewServiceRequestRow::from(&request);
        ServiceRequestRow {
            id: row.id,
            requester_id: row.requester_id,
            vehicle_type: row.vehicle_type.to_owned(),
            vehicle_brand: row.vehicle_brand.to_owned(),
            vehicle_model: row.vehicle_model.to_owned(),
            vehicle_year: row.vehicle_year,
            vehicle_number: row.vehicle_number.to_owned(),
            owner_name: row.owner_name.to_owned(),
            phone: row.phone.to_owned(),
            location: row.location.to_owned(),
            latitude: row.latitude,
            longitude: row.longitude,
            service_type: row.service_type.to_owned(),
            status: row.status.to_owned(),
            mechanic_id: row.mechanic_id,
            created_at: row.created_at,
        }
    }

    #[test]
    fn request_rows_decode_into_the_original_request() {
        let row = request_row();
        let id = row.id;

        let request = ServiceRequest::try_from(row).expect("decodes");

        assert_eq!(*request.id.as_uuid(), id);
        assert_eq!(request.status, ServiceRequestStatus::Pending);
        assert_eq!(request.vehicle.number.as_str(), "KA 01 AB 1234");
    }

    #[rstest]
    #[case::status(|row: &mut ServiceRequestRow| row.status = "archived".to_owned(), "status")]
    #[case::phone(|row: &mut ServiceRequestRow| row.phone = "123".to_owned(), "phone")]
    #[case::latitude(|row: &mut ServiceRequestRow| row.latitude = Some(95.0), "latitude")]
    fn invalid_columns_are_named(
        #[case] corrupt: fn(&mut ServiceRequestRow),
        #[case] expected: &str,
    ) {
        let mut row = request_row();
        corrupt(&mut row);

        let err = ServiceRequest::try_from(row).expect_err("corrupt row");

        assert_eq!(err.column, expected);
        assert!(err.to_string().starts_with("stored service_requests."));
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
            .single()
            .expect("timestamp");
        let row = FeedbackRow {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            mechanic_id: Uuid::new_v4(),
            service_request_id: Uuid::new_v4(),
            rating: 9,
            comment: None,
            created_at: now,
            updated_at: now,
        };

        let err = Feedback::try_from(row).expect_err("rating 9");

        assert_eq!(err.column, "rating");
    }
}
