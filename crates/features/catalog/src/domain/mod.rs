mod brand;
mod form;

pub use brand::{BRAND_URL_PREFIX, Brand, BrandId, LOGO_URL_PREFIX, MODEL_URL_PREFIX, Model};
pub use form::{
    BrandForm, BrandInput, FieldError, FormValues, MAX_NAME_LEN, ValidationFailure, parse_founded,
};
