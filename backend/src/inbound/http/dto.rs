//! JSON response bodies shared by the HTTP handlers.
//!
//! Domain types stay free of serde and utoipa wire concerns; handlers convert
//! into these camelCase payloads at the edge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    AccountProfile, MechanicDashboard, MechanicDetail, MechanicMatch, OpenRequest,
    RequestHistoryEntry,
};
use crate::domain::{Account, Feedback, Mechanic, RatingSummary, ServiceRequest};

/// Average rating rounded to one decimal, with the number of ratings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    #[schema(example = 4.5)]
    pub average: f64,
    #[schema(example = 12)]
    pub count: u64,
}

impl From<RatingSummary> for RatingResponse {
    fn from(value: RatingSummary) -> Self {
        Self {
            average: value.average,
            count: value.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MechanicResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: String,
    #[schema(value_type = String, format = "uuid")]
    pub account_id: String,
    #[schema(example = "Speedy Motors")]
    pub service_centre_name: String,
    #[schema(example = "9876543210")]
    pub phone: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub specialization: Option<String>,
    pub approved: bool,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Mechanic> for MechanicResponse {
    fn from(value: &Mechanic) -> Self {
        Self {
            id: value.id.to_string(),
            account_id: value.account_id.to_string(),
            service_centre_name: value.service_centre_name.as_str().to_owned(),
            phone: value.phone.as_str().to_owned(),
            address: value.address.as_str().to_owned(),
            latitude: value.coordinates.map(|point| point.latitude()),
            longitude: value.coordinates.map(|point| point.longitude()),
            specialization: value
                .specialization
                .as_ref()
                .map(|specialization| specialization.as_str().to_owned()),
            approved: value.approved,
            available: value.available,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: String,
    pub username: String,
    pub email: String,
    /// `requester` or `mechanic`.
    #[schema(example = "requester")]
    pub role: String,
    pub mechanic: Option<MechanicResponse>,
}

impl AccountResponse {
    fn new(account: &Account, mechanic: Option<&Mechanic>) -> Self {
        Self {
            id: account.id.to_string(),
            username: account.username.as_str().to_owned(),
            email: account.email.as_str().to_owned(),
            role: account.role.as_str().to_owned(),
            mechanic: mechanic.map(MechanicResponse::from),
        }
    }
}

impl From<&AccountProfile> for AccountResponse {
    fn from(value: &AccountProfile) -> Self {
        Self::new(&value.account, value.mechanic.as_ref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: String,
    #[schema(value_type = String, format = "uuid")]
    pub requester_id: String,
    #[schema(example = "car")]
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
    #[schema(example = "towing")]
    pub service_type: String,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub mechanic_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&ServiceRequest> for ServiceRequestResponse {
    fn from(value: &ServiceRequest) -> Self {
        Self {
            id: value.id.to_string(),
            requester_id: value.requester_id.to_string(),
            vehicle_type: value.vehicle.vehicle_type.as_str().to_owned(),
            vehicle_brand: value.vehicle.brand.as_str().to_owned(),
            vehicle_model: value.vehicle.model.as_str().to_owned(),
            vehicle_year: value.vehicle.year.value(),
            vehicle_number: value.vehicle.number.as_str().to_owned(),
            owner_name: value.owner_name.as_str().to_owned(),
            phone: value.phone.as_str().to_owned(),
            location: value.location.as_str().to_owned(),
            latitude: value.coordinates.map(|point| point.latitude()),
            longitude: value.coordinates.map(|point| point.longitude()),
            service_type: value.service_type.as_str().to_owned(),
            status: value.status.as_str().to_owned(),
            mechanic_id: value.mechanic_id.map(|id| id.to_string()),
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: String,
    #[schema(value_type = String, format = "uuid")]
    pub author_id: String,
    #[schema(value_type = String, format = "uuid")]
    pub mechanic_id: String,
    #[schema(value_type = String, format = "uuid")]
    pub service_request_id: String,
    #[schema(minimum = 1, maximum = 5)]
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Feedback> for FeedbackResponse {
    fn from(value: &Feedback) -> Self {
        Self {
            id: value.id.to_string(),
            author_id: value.author_id.to_string(),
            mechanic_id: value.mechanic_id.to_string(),
            service_request_id: value.service_request_id.to_string(),
            rating: value.rating.value(),
            comment: value.comment.as_ref().map(|comment| comment.as_str().to_owned()),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Mechanic within the search radius, nearest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MechanicMatchResponse {
    pub mechanic: MechanicResponse,
    #[schema(example = 3.2)]
    pub distance_km: f64,
    pub rating: RatingResponse,
}

impl From<&MechanicMatch> for MechanicMatchResponse {
    fn from(value: &MechanicMatch) -> Self {
        Self {
            mechanic: MechanicResponse::from(&value.mechanic),
            distance_km: value.distance_km,
            rating: value.rating.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MechanicDetailResponse {
    pub mechanic: MechanicResponse,
    pub rating: RatingResponse,
    pub feedback: Vec<FeedbackResponse>,
}

impl From<&MechanicDetail> for MechanicDetailResponse {
    fn from(value: &MechanicDetail) -> Self {
        Self {
            mechanic: MechanicResponse::from(&value.mechanic),
            rating: value.rating.into(),
            feedback: value.feedback.iter().map(FeedbackResponse::from).collect(),
        }
    }
}

/// Requester history row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryResponse {
    pub request: ServiceRequestResponse,
    pub mechanic: Option<MechanicResponse>,
    /// Completed and not yet rated by the requester.
    pub can_give_feedback: bool,
    pub feedback: Option<FeedbackResponse>,
}

impl From<&RequestHistoryEntry> for HistoryEntryResponse {
    fn from(value: &RequestHistoryEntry) -> Self {
        Self {
            request: ServiceRequestResponse::from(&value.request),
            mechanic: value.mechanic.as_ref().map(MechanicResponse::from),
            can_give_feedback: value.can_give_feedback,
            feedback: value.feedback.as_ref().map(FeedbackResponse::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenRequestResponse {
    pub request: ServiceRequestResponse,
    /// Distance from the mechanic's workshop; absent when either side is unlocated.
    pub distance_km: Option<f64>,
}

impl From<&OpenRequest> for OpenRequestResponse {
    fn from(value: &OpenRequest) -> Self {
        Self {
            request: ServiceRequestResponse::from(&value.request),
            distance_km: value.distance_km,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub mechanic: MechanicResponse,
    pub rating: RatingResponse,
    /// Requests where this mechanic was chosen and has not answered yet.
    pub selected: Vec<ServiceRequestResponse>,
    pub open: Vec<OpenRequestResponse>,
    pub accepted: Vec<ServiceRequestResponse>,
    pub completed: Vec<ServiceRequestResponse>,
}

fn requests(values: &[ServiceRequest]) -> Vec<ServiceRequestResponse> {
    values.iter().map(ServiceRequestResponse::from).collect()
}

impl From<&MechanicDashboard> for DashboardResponse {
    fn from(value: &MechanicDashboard) -> Self {
        Self {
            mechanic: MechanicResponse::from(&value.mechanic),
            rating: value.rating.into(),
            selected: requests(&value.selected),
            open: value.open.iter().map(OpenRequestResponse::from).collect(),
            accepted: requests(&value.accepted),
            completed: requests(&value.completed),
        }
    }
}
