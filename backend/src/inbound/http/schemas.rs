//! Response envelopes shared by several resources.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::FieldError;
use crate::domain::geo::GeoPoint;

/// Bare confirmation message.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageBody {
    #[schema(example = "Profile picture removed")]
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Confirmation returned after deleting a resource.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeletedBody {
    #[schema(example = "Journey deleted")]
    pub message: String,
    #[schema(format = "uuid")]
    pub id: String,
}

impl DeletedBody {
    pub fn new(message: impl Into<String>, id: impl ToString) -> Self {
        Self {
            message: message.into(),
            id: id.to_string(),
        }
    }
}

/// Coordinate as sent by clients; bounds are checked on conversion.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PointBody {
    #[schema(example = 45.764)]
    pub lat: f64,
    #[schema(example = 4.8357)]
    pub lng: f64,
}

impl PointBody {
    pub fn into_point(self) -> Result<GeoPoint, FieldError> {
        GeoPoint::new(self.lat, self.lng)
    }
}
