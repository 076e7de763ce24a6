mod conversions;
mod types;

pub use types::{
    FormDetailResponse, FormListItemResponse, FormRequest, FormResponse, PublicFormResponse,
    SetFormActiveRequest,
};
