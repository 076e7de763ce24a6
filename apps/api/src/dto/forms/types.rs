use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming field definition.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-field-request.ts"
)]
pub struct FormFieldRequest {
    pub id: String,
    #[serde(rename = "type")]
    #[ts(
        rename = "type",
        type = "\"text\" | \"email\" | \"textarea\" | \"select\" | \"checkbox\" | \"radio\" | \"number\" | \"tel\" | \"url\""
    )]
    pub field_type: String,
    pub label: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

/// Incoming presentation settings. Omitted values fall back to defaults.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-settings-request.ts"
)]
#[serde(default)]
pub struct FormSettingsRequest {
    pub submit_button_text: Option<String>,
    pub success_message: Option<String>,
    #[ts(type = "\"light\" | \"dark\" | null")]
    pub theme: Option<String>,
    pub button_color: Option<String>,
    pub notify_email: Option<String>,
}

/// Incoming payload for form creation and update.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-request.ts"
)]
pub struct FormRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FormFieldRequest>,
    #[serde(default)]
    pub settings: Option<FormSettingsRequest>,
}

/// Incoming payload for opening or closing a form.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/set-form-active-request.ts"
)]
pub struct SetFormActiveRequest {
    pub is_active: bool,
}

/// API representation of a field.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-field-response.ts"
)]
pub struct FormFieldResponse {
    pub id: String,
    #[serde(rename = "type")]
    #[ts(rename = "type")]
    pub field_type: String,
    pub label: String,
    pub placeholder: Option<String>,
    pub required: bool,
    pub options: Vec<String>,
}

/// API representation of form settings.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-settings-response.ts"
)]
pub struct FormSettingsResponse {
    pub submit_button_text: String,
    pub success_message: String,
    pub theme: String,
    pub button_color: String,
    pub notify_email: Option<String>,
}

/// API representation of an owned form.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-response.ts"
)]
pub struct FormResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub fields: Vec<FormFieldResponse>,
    pub settings: FormSettingsResponse,
    pub created_at: String,
    pub updated_at: String,
}

/// Owned form with this month's submission count.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-detail-response.ts"
)]
pub struct FormDetailResponse {
    pub form: FormResponse,
    #[ts(type = "number")]
    pub submissions_this_period: u64,
}

/// Dashboard row for one owned form.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-list-item-response.ts"
)]
pub struct FormListItemResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    #[ts(type = "number")]
    pub submission_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

/// Anonymous view of a form for rendering. Owner-only settings are omitted.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/public-form-response.ts"
)]
pub struct PublicFormResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub fields: Vec<FormFieldResponse>,
    pub submit_button_text: String,
    pub theme: String,
    pub button_color: String,
}
