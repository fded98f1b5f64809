use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::{validate_not_empty, validate_phone};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(custom = "validate_phone")]
    pub phone: String,

    #[validate(length(max = 500), custom = "validate_not_empty")]
    pub address: String,
}
