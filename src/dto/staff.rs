use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::validation::validate_staff_name,
    state::staff::{Department, Staff},
};

/// Staff identity carried by every mutating request.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct StaffInput {
    #[validate(custom(function = "validate_staff_name"))]
    pub name: String,
    pub department: Department,
}

impl From<StaffInput> for Staff {
    fn from(input: StaffInput) -> Self {
        Staff::new(input.name.trim(), input.department)
    }
}
